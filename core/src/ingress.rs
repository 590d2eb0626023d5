use crate::K8sDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declarative routing description submitted by the platform.
///
/// The same types back the custom resource and the canonical hash, so all
/// maps are ordered and serialization is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressSpec {
    #[serde(default)]
    pub rules: Vec<IngressRule>,
}

/// A (hosts, visibility, paths) unit within an ingress.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    #[serde(default)]
    pub hosts: Vec<String>,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub paths: Vec<HttpIngressPath>,
}

/// Whether a rule is exposed on the external listener or only inside the
/// cluster.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum Visibility {
    #[default]
    #[serde(rename = "ExternalIP")]
    ExternalIp,
    ClusterLocal,
}

impl Visibility {
    pub fn is_external(&self) -> bool {
        matches!(self, Self::ExternalIp)
    }
}

/// A routed path under a rule.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HttpIngressPath {
    /// Path prefix; empty means `/`.
    #[serde(default)]
    pub path: String,

    /// Per-request timeout for the whole route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<K8sDuration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<IngressRetryPolicy>,

    /// Headers added to responses served via this path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub append_headers: BTreeMap<String, String>,

    /// Weighted backends; percentages sum to 100.
    #[serde(default)]
    pub splits: Vec<IngressBackendSplit>,
}

impl HttpIngressPath {
    /// The effective match prefix.
    pub fn prefix(&self) -> &str {
        if self.path.is_empty() {
            "/"
        } else {
            &self.path
        }
    }
}

/// A weighted pointer from a path to a backend service.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressBackendSplit {
    pub service_namespace: String,
    pub service_name: String,
    pub service_port: ServicePort,

    #[serde(default)]
    pub percent: u32,

    /// Headers added to requests routed to this backend.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub append_headers: BTreeMap<String, String>,
}

/// References a service port by number or by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum ServicePort {
    Number(u16),
    Name(String),
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressRetryPolicy {
    #[serde(default)]
    pub attempts: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_try_timeout: Option<K8sDuration>,
}
