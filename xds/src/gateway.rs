//! HTTP/1.1 discovery gateway.
//!
//! Exposes the snapshot contents to clients that cannot hold a streaming
//! connection: each request is translated into a single discovery exchange
//! against the current snapshot. Bodies are binary protobuf
//! (`application/x-protobuf`) in both directions.

use crate::{
    generated::envoy::service::discovery::v3::{DiscoveryRequest, DiscoveryResponse},
    ResourceType, SnapshotCache,
};
use hyper::{header, Body, Method, Request, Response, StatusCode};
use prost::Message;
use std::{net::SocketAddr, sync::Arc};

/// Runs the gateway until the drain signal fires.
pub async fn serve(
    addr: SocketAddr,
    cache: Arc<SnapshotCache>,
    drain: drain::Watch,
) -> Result<(), hyper::Error> {
    let server =
        hyper::server::Server::bind(&addr).serve(hyper::service::make_service_fn(move |_conn| {
            let cache = cache.clone();
            futures::future::ok::<_, hyper::Error>(hyper::service::service_fn(
                move |req: Request<Body>| handle(cache.clone(), req),
            ))
        }));
    let addr = server.local_addr();
    tracing::info!(%addr, "HTTP discovery gateway listening");
    server
        .with_graceful_shutdown(async move {
            drain.signaled().await;
        })
        .await
}

async fn handle(
    cache: Arc<SnapshotCache>,
    req: Request<Body>,
) -> Result<Response<Body>, hyper::Error> {
    if req.method() != Method::POST {
        return Ok(text(StatusCode::METHOD_NOT_ALLOWED, "POST required\n"));
    }

    let Some(resource_type) = discovery_type(req.uri().path()) else {
        return Ok(text(StatusCode::NOT_FOUND, "unknown discovery type\n"));
    };

    let body = hyper::body::to_bytes(req.into_body()).await?;
    let request = match DiscoveryRequest::decode(body.as_ref()) {
        Ok(request) => request,
        Err(error) => {
            tracing::debug!(%error, "undecodable discovery request");
            return Ok(text(StatusCode::BAD_REQUEST, "invalid discovery request\n"));
        }
    };

    let node_id = request.node.map(|node| node.id).unwrap_or_default();
    if node_id.is_empty() {
        return Ok(text(StatusCode::BAD_REQUEST, "node identifier required\n"));
    }

    let Some(snapshot) = cache.snapshot(&node_id) else {
        return Ok(text(StatusCode::NOT_FOUND, "no snapshot for node\n"));
    };

    let response = DiscoveryResponse {
        version_info: snapshot.version().to_string(),
        resources: snapshot.resources(resource_type).to_vec(),
        type_url: resource_type.type_url().to_string(),
        nonce: uuid::Uuid::new_v4().to_string(),
        control_plane: None,
    };
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-protobuf")
        .body(response.encode_to_vec().into())
        .expect("valid response"))
}

fn discovery_type(path: &str) -> Option<ResourceType> {
    match path {
        "/v3/discovery:clusters" => Some(ResourceType::Cluster),
        "/v3/discovery:endpoints" => Some(ResourceType::Endpoint),
        "/v3/discovery:listeners" => Some(ResourceType::Listener),
        "/v3/discovery:routes" => Some(ResourceType::Route),
        _ => None,
    }
}

fn text(status: StatusCode, message: &'static str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(message.into())
        .expect("valid response")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        generated::envoy::config::{cluster::v3::Cluster, core::v3::Node},
        Snapshot,
    };

    fn cache_with_snapshot() -> Arc<SnapshotCache> {
        let cache = Arc::new(SnapshotCache::new());
        cache
            .set_snapshot(
                "gateway",
                Snapshot::new(
                    vec![Cluster {
                        name: "foo/".to_string(),
                        ..Default::default()
                    }],
                    vec![],
                    vec![],
                    vec![],
                ),
            )
            .unwrap();
        cache
    }

    fn fetch(path: &str, node_id: &str) -> Request<Body> {
        let request = DiscoveryRequest {
            node: Some(Node {
                id: node_id.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .body(request.encode_to_vec().into())
            .unwrap()
    }

    #[tokio::test]
    async fn serves_current_snapshot() {
        let response = handle(cache_with_snapshot(), fetch("/v3/discovery:clusters", "gateway"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let decoded = DiscoveryResponse::decode(body.as_ref()).unwrap();
        assert_eq!(decoded.type_url, ResourceType::Cluster.type_url());
        assert_eq!(decoded.resources.len(), 1);
    }

    #[tokio::test]
    async fn unknown_type_is_not_found() {
        let response = handle(cache_with_snapshot(), fetch("/v3/discovery:secrets", "gateway"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_node_is_not_found() {
        let response = handle(cache_with_snapshot(), fetch("/v3/discovery:clusters", "nope"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rejects_non_post() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/v3/discovery:clusters")
            .body(Body::empty())
            .unwrap();
        let response = handle(cache_with_snapshot(), request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
