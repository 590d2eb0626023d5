//! The snapshot distributor.
//!
//! Serves the aggregated and per-type discovery streams over the
//! [`SnapshotCache`]. Each stream is a small state machine: a request either
//! opens a subscription, ACKs the last response (by echoing its nonce), or
//! NACKs it (by carrying an error detail). At most one version is in flight
//! per (node, resource type); a rejected version is only resent once a newer
//! snapshot supersedes it, so the versions a node observes are monotone.

use crate::{
    generated::envoy::service::{
        cluster::v3::cluster_discovery_service_server::{
            ClusterDiscoveryService, ClusterDiscoveryServiceServer,
        },
        discovery::v3::{
            aggregated_discovery_service_server::{
                AggregatedDiscoveryService, AggregatedDiscoveryServiceServer,
            },
            DiscoveryRequest, DiscoveryResponse,
        },
        endpoint::v3::endpoint_discovery_service_server::{
            EndpointDiscoveryService, EndpointDiscoveryServiceServer,
        },
        listener::v3::listener_discovery_service_server::{
            ListenerDiscoveryService, ListenerDiscoveryServiceServer,
        },
        route::v3::route_discovery_service_server::{
            RouteDiscoveryService, RouteDiscoveryServiceServer,
        },
    },
    ResourceType, SnapshotCache,
};
use ahash::AHashMap as HashMap;
use futures::{FutureExt, Stream};
use std::{net::SocketAddr, pin::Pin, sync::Arc};
use tokio_stream::StreamExt;

/// Concurrent stream limit on the gRPC server.
const GRPC_MAX_CONCURRENT_STREAMS: u32 = 1_000_000;

type BoxDiscoveryStream =
    Pin<Box<dyn Stream<Item = Result<DiscoveryResponse, tonic::Status>> + Send>>;

/// The xDS streaming server.
#[derive(Clone)]
pub struct XdsServer {
    cache: Arc<SnapshotCache>,
}

#[derive(Default)]
struct TypeState {
    last_version: Option<String>,
    last_nonce: Option<String>,
    in_flight: bool,
}

impl XdsServer {
    pub fn new(cache: Arc<SnapshotCache>) -> Self {
        Self { cache }
    }

    /// Runs the management server until the drain signal fires, then lets
    /// open streams wind down gracefully.
    pub async fn serve(self, addr: SocketAddr, drain: drain::Watch) -> anyhow::Result<()> {
        let (close_tx, close_rx) = tokio::sync::oneshot::channel();
        tokio::pin! {
            let srv = tonic::transport::Server::builder()
                .max_concurrent_streams(GRPC_MAX_CONCURRENT_STREAMS)
                .add_service(AggregatedDiscoveryServiceServer::new(self.clone()))
                .add_service(EndpointDiscoveryServiceServer::new(self.clone()))
                .add_service(ClusterDiscoveryServiceServer::new(self.clone()))
                .add_service(RouteDiscoveryServiceServer::new(self.clone()))
                .add_service(ListenerDiscoveryServiceServer::new(self))
                .serve_with_shutdown(addr, close_rx.map(|_| {}));
        }

        tracing::info!(%addr, "xDS management server listening");
        tokio::select! {
            res = (&mut srv) => res?,
            handle = drain.signaled() => {
                let _ = close_tx.send(());
                handle.release_after(srv).await?;
            }
        }
        Ok(())
    }

    /// Handles one discovery stream. `implied_type` supplies the resource
    /// type on the singleton services, where clients may omit the type URL.
    async fn stream_resources<S>(
        &self,
        mut streaming: S,
        implied_type: Option<ResourceType>,
    ) -> Result<BoxDiscoveryStream, tonic::Status>
    where
        S: Stream<Item = Result<DiscoveryRequest, tonic::Status>> + Send + Unpin + 'static,
    {
        let first = streaming
            .next()
            .await
            .ok_or_else(|| tonic::Status::invalid_argument("no message found"))??;

        let node_id = match &first.node {
            Some(node) if !node.id.is_empty() => node.id.clone(),
            _ => return Err(tonic::Status::invalid_argument("node identifier required")),
        };

        let cache = self.cache.clone();
        // Subscribe before reading the snapshot so a publish racing with
        // stream setup is never missed.
        let mut seq = cache.watch(&node_id);
        let mut subscriptions: HashMap<ResourceType, TypeState> = HashMap::new();
        tracing::debug!(node = %node_id, "new discovery stream");

        let stream = async_stream::try_stream! {
            let resource_type = request_type(&first, implied_type)?;
            let state = subscriptions.entry(resource_type).or_default();
            if let Some(response) = maybe_send(&cache, &node_id, resource_type, state) {
                yield response;
            }

            loop {
                tokio::select! {
                    changed = seq.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        for (resource_type, state) in subscriptions.iter_mut() {
                            if let Some(response) =
                                maybe_send(&cache, &node_id, *resource_type, state)
                            {
                                yield response;
                            }
                        }
                    }
                    request = streaming.next() => {
                        let request = match request.transpose() {
                            Ok(Some(request)) => request,
                            Ok(None) => break,
                            Err(error) => {
                                tracing::debug!(node = %node_id, %error, "error receiving request");
                                break;
                            }
                        };

                        let resource_type = match request_type(&request, implied_type) {
                            Ok(resource_type) => resource_type,
                            Err(error) => {
                                tracing::warn!(node = %node_id, url = %request.type_url, %error, "unknown resource type");
                                continue;
                            }
                        };
                        let state = subscriptions.entry(resource_type).or_default();

                        if let Some(error) = &request.error_detail {
                            // NACK: the pending version stays rejected until a
                            // newer snapshot supersedes it.
                            tracing::warn!(
                                node = %node_id,
                                r#type = %resource_type.type_url(),
                                nonce = %request.response_nonce,
                                message = %error.message,
                                "update rejected",
                            );
                            state.in_flight = false;
                        } else if !request.response_nonce.is_empty() {
                            if state.last_nonce.as_deref() == Some(request.response_nonce.as_str()) {
                                tracing::trace!(node = %node_id, nonce = %request.response_nonce, "ACK");
                                state.in_flight = false;
                            } else {
                                tracing::trace!(node = %node_id, nonce = %request.response_nonce, "stale nonce");
                                continue;
                            }
                        }

                        if let Some(response) = maybe_send(&cache, &node_id, resource_type, state) {
                            yield response;
                        }
                    }
                }
            }

            tracing::debug!(node = %node_id, "discovery stream terminated");
        };

        Ok(Box::pin(stream))
    }
}

fn request_type(
    request: &DiscoveryRequest,
    implied_type: Option<ResourceType>,
) -> Result<ResourceType, tonic::Status> {
    if request.type_url.is_empty() {
        implied_type.ok_or_else(|| tonic::Status::invalid_argument("type URL required"))
    } else {
        request.type_url.parse().map_err(Into::into)
    }
}

/// Sends the node's current snapshot for a resource type unless a send is in
/// flight or the node already has (or rejected) this exact version.
fn maybe_send(
    cache: &SnapshotCache,
    node_id: &str,
    resource_type: ResourceType,
    state: &mut TypeState,
) -> Option<DiscoveryResponse> {
    if state.in_flight {
        return None;
    }
    let snapshot = cache.snapshot(node_id)?;
    if state.last_version.as_deref() == Some(snapshot.version()) {
        return None;
    }

    let response = DiscoveryResponse {
        version_info: snapshot.version().to_string(),
        resources: snapshot.resources(resource_type).to_vec(),
        type_url: resource_type.type_url().to_string(),
        nonce: uuid::Uuid::new_v4().to_string(),
        control_plane: None,
    };
    state.last_version = Some(response.version_info.clone());
    state.last_nonce = Some(response.nonce.clone());
    state.in_flight = true;
    tracing::debug!(
        node = %node_id,
        r#type = %resource_type.type_url(),
        version = %response.version_info,
        nonce = %response.nonce,
        "discovery response",
    );
    Some(response)
}

#[tonic::async_trait]
impl AggregatedDiscoveryService for XdsServer {
    type StreamAggregatedResourcesStream = BoxDiscoveryStream;

    async fn stream_aggregated_resources(
        &self,
        request: tonic::Request<tonic::Streaming<DiscoveryRequest>>,
    ) -> Result<tonic::Response<Self::StreamAggregatedResourcesStream>, tonic::Status> {
        Ok(tonic::Response::new(
            self.stream_resources(request.into_inner(), None).await?,
        ))
    }
}

#[tonic::async_trait]
impl EndpointDiscoveryService for XdsServer {
    type StreamEndpointsStream = BoxDiscoveryStream;

    async fn stream_endpoints(
        &self,
        request: tonic::Request<tonic::Streaming<DiscoveryRequest>>,
    ) -> Result<tonic::Response<Self::StreamEndpointsStream>, tonic::Status> {
        Ok(tonic::Response::new(
            self.stream_resources(request.into_inner(), Some(ResourceType::Endpoint))
                .await?,
        ))
    }
}

#[tonic::async_trait]
impl ClusterDiscoveryService for XdsServer {
    type StreamClustersStream = BoxDiscoveryStream;

    async fn stream_clusters(
        &self,
        request: tonic::Request<tonic::Streaming<DiscoveryRequest>>,
    ) -> Result<tonic::Response<Self::StreamClustersStream>, tonic::Status> {
        Ok(tonic::Response::new(
            self.stream_resources(request.into_inner(), Some(ResourceType::Cluster))
                .await?,
        ))
    }
}

#[tonic::async_trait]
impl RouteDiscoveryService for XdsServer {
    type StreamRoutesStream = BoxDiscoveryStream;

    async fn stream_routes(
        &self,
        request: tonic::Request<tonic::Streaming<DiscoveryRequest>>,
    ) -> Result<tonic::Response<Self::StreamRoutesStream>, tonic::Status> {
        Ok(tonic::Response::new(
            self.stream_resources(request.into_inner(), Some(ResourceType::Route))
                .await?,
        ))
    }
}

#[tonic::async_trait]
impl ListenerDiscoveryService for XdsServer {
    type StreamListenersStream = BoxDiscoveryStream;

    async fn stream_listeners(
        &self,
        request: tonic::Request<tonic::Streaming<DiscoveryRequest>>,
    ) -> Result<tonic::Response<Self::StreamListenersStream>, tonic::Status> {
        Ok(tonic::Response::new(
            self.stream_resources(request.into_inner(), Some(ResourceType::Listener))
                .await?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        generated::envoy::{
            config::{cluster::v3::Cluster, core::v3::Node},
            service::discovery::v3::DiscoveryRequest,
        },
        Snapshot,
    };
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::wrappers::ReceiverStream;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn snapshot(cluster_name: &str) -> Snapshot {
        Snapshot::new(
            vec![Cluster {
                name: cluster_name.to_string(),
                ..Default::default()
            }],
            vec![],
            vec![],
            vec![],
        )
    }

    fn request(type_url: &str) -> DiscoveryRequest {
        DiscoveryRequest {
            node: Some(Node {
                id: "gateway".to_string(),
                ..Default::default()
            }),
            type_url: type_url.to_string(),
            ..Default::default()
        }
    }

    fn ack(response: &DiscoveryResponse) -> DiscoveryRequest {
        DiscoveryRequest {
            version_info: response.version_info.clone(),
            type_url: response.type_url.clone(),
            response_nonce: response.nonce.clone(),
            ..Default::default()
        }
    }

    fn nack(response: &DiscoveryResponse) -> DiscoveryRequest {
        DiscoveryRequest {
            type_url: response.type_url.clone(),
            response_nonce: response.nonce.clone(),
            error_detail: Some(crate::generated::google::rpc::Status {
                code: 3,
                message: "rejected".to_string(),
                details: vec![],
            }),
            ..Default::default()
        }
    }

    async fn open_stream(
        server: &XdsServer,
        rx: tokio::sync::mpsc::Receiver<Result<DiscoveryRequest, tonic::Status>>,
    ) -> BoxDiscoveryStream {
        server
            .stream_resources(ReceiverStream::new(rx), None)
            .await
            .unwrap()
    }

    async fn next(stream: &mut BoxDiscoveryStream) -> DiscoveryResponse {
        timeout(TIMEOUT, stream.next())
            .await
            .expect("response expected")
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn sends_current_snapshot_on_subscribe() {
        let cache = Arc::new(SnapshotCache::new());
        cache.set_snapshot("gateway", snapshot("foo/")).unwrap();
        let server = XdsServer::new(cache);

        let (tx, rx) = tokio::sync::mpsc::channel(8);
        tx.send(Ok(request(ResourceType::Cluster.type_url())))
            .await
            .unwrap();
        let mut stream = open_stream(&server, rx).await;

        let response = next(&mut stream).await;
        assert_eq!(response.type_url, ResourceType::Cluster.type_url());
        assert_eq!(response.resources.len(), 1);
    }

    #[tokio::test]
    async fn acked_nodes_advance_to_newer_versions() {
        let cache = Arc::new(SnapshotCache::new());
        cache.set_snapshot("gateway", snapshot("foo/")).unwrap();
        let server = XdsServer::new(cache.clone());

        let (tx, rx) = tokio::sync::mpsc::channel(8);
        tx.send(Ok(request(ResourceType::Cluster.type_url())))
            .await
            .unwrap();
        let mut stream = open_stream(&server, rx).await;

        let v1 = next(&mut stream).await;
        tx.send(Ok(ack(&v1))).await.unwrap();

        cache.set_snapshot("gateway", snapshot("bar/")).unwrap();
        let v2 = next(&mut stream).await;
        assert_ne!(v1.version_info, v2.version_info);
    }

    #[tokio::test]
    async fn publish_during_flight_waits_for_ack() {
        let cache = Arc::new(SnapshotCache::new());
        cache.set_snapshot("gateway", snapshot("foo/")).unwrap();
        let server = XdsServer::new(cache.clone());

        let (tx, rx) = tokio::sync::mpsc::channel(8);
        tx.send(Ok(request(ResourceType::Cluster.type_url())))
            .await
            .unwrap();
        let mut stream = open_stream(&server, rx).await;
        let v1 = next(&mut stream).await;

        // Publish while v1 is unacknowledged: nothing may be sent yet.
        cache.set_snapshot("gateway", snapshot("bar/")).unwrap();
        assert!(timeout(Duration::from_millis(100), stream.next())
            .await
            .is_err());

        // The ACK releases the newer version.
        tx.send(Ok(ack(&v1))).await.unwrap();
        let v2 = next(&mut stream).await;
        assert_ne!(v1.version_info, v2.version_info);
    }

    #[tokio::test]
    async fn nacked_version_not_resent_until_superseded() {
        let cache = Arc::new(SnapshotCache::new());
        cache.set_snapshot("gateway", snapshot("foo/")).unwrap();
        let server = XdsServer::new(cache.clone());

        let (tx, rx) = tokio::sync::mpsc::channel(8);
        tx.send(Ok(request(ResourceType::Cluster.type_url())))
            .await
            .unwrap();
        let mut stream = open_stream(&server, rx).await;

        let v1 = next(&mut stream).await;
        tx.send(Ok(nack(&v1))).await.unwrap();
        assert!(timeout(Duration::from_millis(100), stream.next())
            .await
            .is_err());

        cache.set_snapshot("gateway", snapshot("bar/")).unwrap();
        let v2 = next(&mut stream).await;
        assert_ne!(v1.version_info, v2.version_info);
    }

    #[tokio::test]
    async fn nodes_may_connect_before_first_publish() {
        let cache = Arc::new(SnapshotCache::new());
        let server = XdsServer::new(cache.clone());

        let (tx, rx) = tokio::sync::mpsc::channel(8);
        tx.send(Ok(request(ResourceType::Listener.type_url())))
            .await
            .unwrap();
        let mut stream = open_stream(&server, rx).await;

        cache.set_snapshot("gateway", snapshot("foo/")).unwrap();
        let response = next(&mut stream).await;
        assert_eq!(response.type_url, ResourceType::Listener.type_url());
    }

    #[tokio::test]
    async fn singleton_streams_imply_their_type() {
        let cache = Arc::new(SnapshotCache::new());
        cache.set_snapshot("gateway", snapshot("foo/")).unwrap();
        let server = XdsServer::new(cache);

        let (tx, rx) = tokio::sync::mpsc::channel(8);
        tx.send(Ok(request(""))).await.unwrap();
        let mut stream = server
            .stream_resources(
                ReceiverStream::new(rx),
                Some(ResourceType::Cluster),
            )
            .await
            .unwrap();

        let response = next(&mut stream).await;
        assert_eq!(response.type_url, ResourceType::Cluster.type_url());
    }

    #[tokio::test]
    async fn rejects_streams_without_node_id() {
        let server = XdsServer::new(Arc::new(SnapshotCache::new()));
        let (tx, rx) = tokio::sync::mpsc::channel(8);
        tx.send(Ok(DiscoveryRequest {
            type_url: ResourceType::Cluster.type_url().to_string(),
            ..Default::default()
        }))
        .await
        .unwrap();

        let err = server
            .stream_resources(ReceiverStream::new(rx), None)
            .await
            .err()
            .expect("stream must be rejected");
        assert_eq!(err.code(), tonic::Code::InvalidArgument);
    }
}
