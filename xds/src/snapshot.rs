use crate::{
    generated::envoy::config::{
        cluster::v3::Cluster,
        endpoint::v3::ClusterLoadAssignment,
        listener::v3::Listener,
        route::v3::{route_action, RouteConfiguration},
    },
    pack, ResourceType,
};
use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use anyhow::{bail, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

/// An immutable, versioned bundle of gateway configuration.
///
/// Snapshots are produced whole by the caches and replaced whole in the
/// [`SnapshotCache`]; readers never observe a partially-updated bundle. The
/// wire form of every resource is computed once, up front.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    version: String,
    clusters: Vec<Cluster>,
    endpoints: Vec<ClusterLoadAssignment>,
    listeners: Vec<Listener>,
    routes: Vec<RouteConfiguration>,
    resources: [Vec<prost_types::Any>; 4],
}

impl Snapshot {
    /// Bundles the given resources under a fresh, unique version.
    pub fn new(
        clusters: Vec<Cluster>,
        endpoints: Vec<ClusterLoadAssignment>,
        listeners: Vec<Listener>,
        routes: Vec<RouteConfiguration>,
    ) -> Self {
        let resources = [
            clusters
                .iter()
                .map(|c| pack("envoy.config.cluster.v3.Cluster", c))
                .collect(),
            endpoints
                .iter()
                .map(|e| pack("envoy.config.endpoint.v3.ClusterLoadAssignment", e))
                .collect(),
            listeners
                .iter()
                .map(|l| pack("envoy.config.listener.v3.Listener", l))
                .collect(),
            routes
                .iter()
                .map(|r| pack("envoy.config.route.v3.RouteConfiguration", r))
                .collect(),
        ];
        Self {
            version: uuid::Uuid::new_v4().to_string(),
            clusters,
            endpoints,
            listeners,
            routes,
            resources,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The wire form of all resources of the given type.
    pub fn resources(&self, resource_type: ResourceType) -> &[prost_types::Any] {
        &self.resources[resource_type.index()]
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn endpoints(&self) -> &[ClusterLoadAssignment] {
        &self.endpoints
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn routes(&self) -> &[RouteConfiguration] {
        &self.routes
    }

    /// Verifies that every cluster referenced from a route resolves within
    /// this snapshot. A bundle that fails this check would leave the data
    /// plane routing into the void, so it is rejected before distribution.
    pub fn consistent(&self) -> Result<()> {
        let clusters: HashSet<&str> = self.clusters.iter().map(|c| c.name.as_str()).collect();
        for config in &self.routes {
            for vhost in &config.virtual_hosts {
                for route in &vhost.routes {
                    for name in route_cluster_refs(route) {
                        if !clusters.contains(name) {
                            bail!(
                                "route {} references unknown cluster {}",
                                route.name,
                                name
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn route_cluster_refs(
    route: &crate::generated::envoy::config::route::v3::Route,
) -> Vec<&str> {
    use crate::generated::envoy::config::route::v3::route::Action;
    match &route.action {
        Some(Action::Route(action)) => match &action.cluster_specifier {
            Some(route_action::ClusterSpecifier::Cluster(name)) => vec![name.as_str()],
            Some(route_action::ClusterSpecifier::WeightedClusters(weighted)) => weighted
                .clusters
                .iter()
                .map(|w| w.name.as_str())
                .collect(),
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Holds the desired snapshot per data-plane node and wakes the node's open
/// streams when it changes.
///
/// Node ids are used verbatim as keys. Entries are created on first use, so
/// a node may connect before its first snapshot is published.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    nodes: Mutex<HashMap<String, NodeEntry>>,
}

#[derive(Debug)]
struct NodeEntry {
    snapshot: Option<Arc<Snapshot>>,
    seq: watch::Sender<u64>,
}

impl NodeEntry {
    fn new() -> Self {
        let (seq, _) = watch::channel(0);
        Self {
            snapshot: None,
            seq,
        }
    }
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `snapshot` as the desired state for `node_id` and wakes every
    /// stream open for that node. Rejects inconsistent bundles.
    pub fn set_snapshot(&self, node_id: &str, snapshot: Snapshot) -> Result<()> {
        snapshot.consistent()?;
        let mut nodes = self.nodes.lock();
        let entry = nodes
            .entry(node_id.to_string())
            .or_insert_with(NodeEntry::new);
        entry.snapshot = Some(Arc::new(snapshot));
        entry.seq.send_modify(|seq| *seq += 1);
        Ok(())
    }

    /// The current desired snapshot for a node, if one has been published.
    pub fn snapshot(&self, node_id: &str) -> Option<Arc<Snapshot>> {
        self.nodes.lock().get(node_id)?.snapshot.clone()
    }

    /// Subscribes to snapshot changes for a node.
    pub fn watch(&self, node_id: &str) -> watch::Receiver<u64> {
        self.nodes
            .lock()
            .entry(node_id.to_string())
            .or_insert_with(NodeEntry::new)
            .seq
            .subscribe()
    }
}
