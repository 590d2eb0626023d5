//! Core types for the ingress gateway control plane.
//!
//! This crate models the routing declarations consumed by the control plane
//! and the lookups it performs against cluster state, independently of how
//! either is discovered. The translation pipeline turns an [`IngressSpec`]
//! into gateway configuration; the seams to the outside world are the
//! [`ServiceLookup`] and [`EndpointLookup`] traits.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod domains;
mod duration;
mod hash;
mod ingress;

pub use self::{
    duration::K8sDuration,
    hash::ingress_hash,
    ingress::{
        HttpIngressPath, IngressBackendSplit, IngressRetryPolicy, IngressRule, IngressSpec,
        ServicePort, Visibility,
    },
};
use std::{fmt, net::Ipv4Addr, time::Duration};

/// External HTTP port of the data-plane gateway.
pub const EXTERNAL_HTTP_PORT: u16 = 8080;

/// External HTTPS port, used only when TLS material is configured.
pub const EXTERNAL_HTTPS_PORT: u16 = 8443;

/// Internal (cluster-local) HTTP port of the data-plane gateway.
pub const INTERNAL_HTTP_PORT: u16 = 8081;

/// Synthetic domain serving the per-ingress status routes. Only reachable on
/// the internal listener and only meant for the status prober.
pub const PROBE_DOMAIN: &str = "internal.ingress-status";

/// Path prefix of the status routes; the per-ingress hash is appended.
pub const STATUS_PATH: &str = "/_internal/status";

/// Connect timeout applied to every generated cluster.
pub const CLUSTER_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Identifies an ingress by namespace and name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IngressKey {
    pub namespace: String,
    pub name: String,
}

impl IngressKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for IngressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// The ports exposed by a backing service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceInfo {
    pub ports: Vec<PortSpec>,
}

/// One service port: an optional name, the advertised port, and the port the
/// backing pods actually listen on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortSpec {
    pub name: Option<String>,
    pub port: u16,
    pub target_port: u16,
}

impl PortSpec {
    /// Whether the port name marks the service as HTTP/2 over cleartext.
    pub fn is_h2c(&self) -> bool {
        matches!(self.name.as_deref(), Some("http2") | Some("h2c"))
    }
}

/// The reachable addresses of a service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointSet {
    pub addresses: Vec<Ipv4Addr>,
}

/// Resolves a service's port list. Returns `None` while the service is not
/// yet visible; the caller retries on a later reconciliation.
pub trait ServiceLookup {
    fn service(&self, namespace: &str, name: &str) -> Option<ServiceInfo>;
}

/// Resolves a service's live endpoints. `None` while not yet visible.
pub trait EndpointLookup {
    fn endpoints(&self, namespace: &str, name: &str) -> Option<EndpointSet>;
}
