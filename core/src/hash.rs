use crate::IngressSpec;
use anyhow::Result;
use sha2::{Digest, Sha256};

/// Computes the canonical hash of an ingress: the SHA-256 of the spec's JSON
/// serialization concatenated with the namespace and name, hex-encoded.
///
/// All maps in [`IngressSpec`] are ordered, so the serialization (and thus
/// the hash) does not depend on map insertion order. The hash keys the
/// per-ingress status routes and the prober's probe paths.
pub fn ingress_hash(spec: &IngressSpec, namespace: &str, name: &str) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(spec)?);
    hasher.update(namespace.as_bytes());
    hasher.update(name.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HttpIngressPath, IngressBackendSplit, IngressRule, ServicePort};

    fn spec() -> IngressSpec {
        IngressSpec {
            rules: vec![IngressRule {
                hosts: vec!["svc.example.com".to_string()],
                visibility: Default::default(),
                paths: vec![HttpIngressPath {
                    append_headers: [
                        ("x-b".to_string(), "2".to_string()),
                        ("x-a".to_string(), "1".to_string()),
                    ]
                    .into_iter()
                    .collect(),
                    splits: vec![IngressBackendSplit {
                        service_namespace: "default".to_string(),
                        service_name: "foo".to_string(),
                        service_port: ServicePort::Number(80),
                        percent: 100,
                        append_headers: Default::default(),
                    }],
                    ..Default::default()
                }],
            }],
        }
    }

    #[test]
    fn stable_under_deep_copy() {
        let a = spec();
        let b = a.clone();
        assert_eq!(
            ingress_hash(&a, "ns", "name").unwrap(),
            ingress_hash(&b, "ns", "name").unwrap(),
        );
    }

    #[test]
    fn insensitive_to_header_insertion_order() {
        let a = spec();
        let mut b = spec();
        let headers = &mut b.rules[0].paths[0].append_headers;
        headers.clear();
        headers.insert("x-a".to_string(), "1".to_string());
        headers.insert("x-b".to_string(), "2".to_string());
        assert_eq!(
            ingress_hash(&a, "ns", "name").unwrap(),
            ingress_hash(&b, "ns", "name").unwrap(),
        );
    }

    #[test]
    fn distinguishes_namespace_and_name() {
        let spec = spec();
        let base = ingress_hash(&spec, "ns", "name").unwrap();
        assert_ne!(base, ingress_hash(&spec, "other", "name").unwrap());
        assert_ne!(base, ingress_hash(&spec, "ns", "other").unwrap());
    }
}
