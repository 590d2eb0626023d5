//! The in-memory model of all configured ingresses.
//!
//! [`translate`] renders one ingress into virtual hosts and clusters using
//! live service and endpoint data; [`Caches`] merges translations into a
//! coherent whole and produces immutable [`Snapshot`]s for distribution.
//!
//! ```ignore
//! [Ingress] -> translate -> [TranslatedIngress] -> Caches -> Snapshot
//! ```
//!
//! The caches are shared behind a single readers-writer lock: mutations take
//! the writer half, snapshot production the reader half, and a reader always
//! observes a fully-committed model.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod caches;
#[cfg(test)]
mod tests;
mod translator;

pub use self::{
    caches::{Caches, SharedCaches, TlsPair},
    translator::{translate, TranslatedIngress},
};

pub(crate) use ingress_controller_xds::envoy::config::{
    accesslog::v3 as envoy_accesslog, cluster::v3 as envoy_cluster, core::v3 as envoy_core,
    endpoint::v3 as envoy_endpoint, listener::v3 as envoy_listener, route::v3 as envoy_route,
};
pub(crate) use ingress_controller_xds::envoy::extensions::{
    access_loggers::file::v3 as envoy_file_accesslog,
    filters::http::router::v3 as envoy_router,
    filters::network::http_connection_manager::v3 as envoy_hcm,
    transport_sockets::tls::v3 as envoy_tls,
};

pub(crate) fn duration_proto(duration: std::time::Duration) -> prost_types::Duration {
    prost_types::Duration {
        seconds: duration.as_secs() as i64,
        nanos: duration.subsec_nanos() as i32,
    }
}
