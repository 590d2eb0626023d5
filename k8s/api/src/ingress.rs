use chrono::{DateTime, Utc};
use ingress_controller_core::{IngressKey, IngressRule};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const CONDITION_READY: &str = "Ready";
pub const CONDITION_LOAD_BALANCER_READY: &str = "LoadBalancerReady";
pub const CONDITION_NETWORK_CONFIGURED: &str = "NetworkConfigured";

/// Declarative routing description for the serverless gateway.
#[derive(Clone, Debug, Default, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "networking.internal.serverless.dev",
    version = "v1alpha1",
    kind = "Ingress",
    namespaced,
    status = "IngressStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct IngressSpec {
    #[serde(default)]
    pub rules: Vec<IngressRule>,
}

impl IngressSpec {
    /// The protocol-independent form consumed by the translator and hashed
    /// for status probing.
    pub fn to_core(&self) -> ingress_controller_core::IngressSpec {
        ingress_controller_core::IngressSpec {
            rules: self.rules.clone(),
        }
    }
}

impl Ingress {
    pub fn key(&self) -> IngressKey {
        IngressKey::new(
            self.metadata.namespace.as_deref().unwrap_or_default(),
            self.metadata.name.as_deref().unwrap_or_default(),
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<IngressCondition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressCondition {
    #[serde(rename = "type")]
    pub type_: String,

    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl IngressStatus {
    /// The status written once the prober has confirmed an ingress is served
    /// by every gateway pod: conditions initialized, load balancer ready,
    /// network configured, and the generation recorded.
    pub fn ready(generation: Option<i64>) -> Self {
        let now = Utc::now();
        let condition = |type_: &str| IngressCondition {
            type_: type_.to_string(),
            status: "True".to_string(),
            reason: None,
            message: None,
            last_transition_time: Some(now),
        };
        Self {
            conditions: vec![
                condition(CONDITION_LOAD_BALANCER_READY),
                condition(CONDITION_NETWORK_CONFIGURED),
                condition(CONDITION_READY),
            ],
            observed_generation: generation,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.conditions
            .iter()
            .any(|c| c.type_ == CONDITION_READY && c.status == "True")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_status_sets_all_conditions() {
        let status = IngressStatus::ready(Some(3));
        assert!(status.is_ready());
        assert_eq!(status.observed_generation, Some(3));
        for type_ in [
            CONDITION_READY,
            CONDITION_LOAD_BALANCER_READY,
            CONDITION_NETWORK_CONFIGURED,
        ] {
            assert!(status
                .conditions
                .iter()
                .any(|c| c.type_ == type_ && c.status == "True"));
        }
    }

    #[test]
    fn spec_deserializes_camel_case() {
        let spec: IngressSpec = serde_json::from_value(serde_json::json!({
            "rules": [{
                "hosts": ["foo.default.svc.cluster.local"],
                "visibility": "ClusterLocal",
                "paths": [{
                    "splits": [{
                        "serviceNamespace": "default",
                        "serviceName": "foo",
                        "servicePort": 80,
                        "percent": 100,
                    }],
                }],
            }],
        }))
        .unwrap();
        let rule = &spec.rules[0];
        assert!(!rule.visibility.is_external());
        assert_eq!(
            rule.paths[0].splits[0].service_port,
            ingress_controller_core::ServicePort::Number(80)
        );
    }
}
