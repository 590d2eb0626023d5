//! Snapshot distribution over xDS.
//!
//! The control plane assembles immutable, versioned [`Snapshot`]s of gateway
//! configuration and hands them to a [`SnapshotCache`]. The [`server`]
//! module streams the cached state to connected proxies over the aggregated
//! and per-type discovery services, tracking acknowledgements per node so a
//! proxy only advances when it has accepted the latest version. A small
//! HTTP/1.1 [`gateway`] exposes the same state to non-streaming clients.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod gateway;
pub mod generated;
mod resource;
mod snapshot;
pub mod server;

pub use self::{
    resource::ResourceType,
    server::XdsServer,
    snapshot::{Snapshot, SnapshotCache},
};

pub mod envoy {
    pub use crate::generated::envoy::*;
}

/// Fully-qualified type URL for an Envoy resource or extension message.
pub(crate) fn type_url(message: &str) -> String {
    format!("type.googleapis.com/{message}")
}

/// Packs a message into a `google.protobuf.Any`.
pub fn pack<M: prost::Message>(message_name: &str, message: &M) -> prost_types::Any {
    prost_types::Any {
        type_url: type_url(message_name),
        value: message.encode_to_vec(),
    }
}
