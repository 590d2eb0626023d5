use crate::{duration_proto, envoy_cluster, envoy_core, envoy_endpoint, envoy_route};
use anyhow::Result;
use ingress_controller_core::{
    domains::expand_domains, ingress_hash, EndpointLookup, EndpointSet, HttpIngressPath,
    IngressBackendSplit, IngressKey, IngressSpec, ServiceLookup, ServicePort,
    CLUSTER_CONNECT_TIMEOUT,
};
use std::collections::BTreeMap;
use std::time::Duration;

/// The routing objects one ingress contributes to the model.
#[derive(Clone, Debug, PartialEq)]
pub struct TranslatedIngress {
    pub key: IngressKey,
    /// Canonical hash of the spec; keys the status routes and probe paths.
    pub hash: String,
    /// One virtual host per externally-visible rule with hosts.
    pub external_hosts: Vec<envoy_route::VirtualHost>,
    /// One virtual host per rule with hosts, present even while none of the
    /// rule's backends have resolved.
    pub internal_hosts: Vec<envoy_route::VirtualHost>,
    /// One cluster per distinct (service, path) across the ingress.
    pub clusters: Vec<envoy_cluster::Cluster>,
}

/// Renders an ingress into virtual hosts and clusters.
///
/// Pure with respect to the lookups: service and endpoint data is read, the
/// routing objects are computed, nothing is mutated. A path whose backend
/// service or endpoints are not yet visible is dropped from this translation
/// and a later reconciliation retries; the rule's virtual hosts are emitted
/// regardless, carrying whatever routes did resolve. Only a rule with no
/// hosts contributes nothing at all.
pub fn translate(
    key: &IngressKey,
    spec: &IngressSpec,
    services: &impl ServiceLookup,
    endpoints: &impl EndpointLookup,
    cluster_domain: &str,
) -> Result<TranslatedIngress> {
    let hash = ingress_hash(spec, &key.namespace, &key.name)?;

    let mut external_hosts = Vec::new();
    let mut internal_hosts = Vec::new();
    let mut clusters: Vec<envoy_cluster::Cluster> = Vec::new();

    for (rule_index, rule) in spec.rules.iter().enumerate() {
        // An unusable rule must contribute nothing, clusters included, so
        // the domain set is checked before any path is translated.
        let domains = expand_domains(rule.hosts.iter().map(String::as_str), cluster_domain);
        if domains.is_empty() {
            tracing::debug!(ingress = %key, rule = rule_index, "skipping rule without hosts");
            continue;
        }

        let mut routes = Vec::new();
        for path in &rule.paths {
            let Some(translated) = translate_path(path, services, endpoints) else {
                tracing::debug!(
                    ingress = %key,
                    path = path.prefix(),
                    "dropping path with unresolved backends",
                );
                continue;
            };
            if translated.weights.is_empty() {
                continue;
            }
            for cluster in translated.clusters {
                insert_cluster(&mut clusters, cluster);
            }
            routes.push(route_for_path(&key.name, rule_index, path, translated.weights));
        }

        let vhost = envoy_route::VirtualHost {
            name: key.name.clone(),
            domains,
            routes,
        };
        if rule.visibility.is_external() {
            external_hosts.push(vhost.clone());
        }
        // External hosts stay reachable from inside the cluster, so the
        // internal virtual host carries the full domain set; it is emitted
        // even while its route list is still empty.
        internal_hosts.push(vhost);
    }

    Ok(TranslatedIngress {
        key: key.clone(),
        hash,
        external_hosts,
        internal_hosts,
        clusters,
    })
}

struct TranslatedPath {
    weights: Vec<envoy_route::weighted_cluster::ClusterWeight>,
    clusters: Vec<envoy_cluster::Cluster>,
}

/// Resolves every split under a path. `None` if any backend lookup fails.
fn translate_path(
    path: &HttpIngressPath,
    services: &impl ServiceLookup,
    endpoints: &impl EndpointLookup,
) -> Option<TranslatedPath> {
    let mut weights = Vec::new();
    let mut clusters = Vec::new();

    for split in &path.splits {
        let service = services.service(&split.service_namespace, &split.service_name)?;
        let port = service.ports.iter().find(|port| match &split.service_port {
            ServicePort::Number(number) => port.port == *number,
            ServicePort::Name(name) => port.name.as_deref() == Some(name.as_str()),
        })?;
        let endpoint_set = endpoints.endpoints(&split.service_namespace, &split.service_name)?;

        clusters.push(cluster_for_split(
            &split.service_name,
            path.prefix(),
            lb_endpoints(&endpoint_set, port.target_port),
            port.is_h2c(),
        ));
        weights.push(weighted_cluster(split, path.prefix()));
    }

    Some(TranslatedPath { weights, clusters })
}

/// One LB endpoint per reachable address, on the chosen target port.
fn lb_endpoints(endpoint_set: &EndpointSet, target_port: u16) -> Vec<envoy_endpoint::LbEndpoint> {
    endpoint_set
        .addresses
        .iter()
        .map(|address| envoy_endpoint::LbEndpoint {
            load_balancing_weight: None,
            host_identifier: Some(envoy_endpoint::lb_endpoint::HostIdentifier::Endpoint(
                envoy_endpoint::Endpoint {
                    address: Some(envoy_core::Address {
                        address: Some(envoy_core::address::Address::SocketAddress(
                            envoy_core::SocketAddress {
                                protocol: envoy_core::socket_address::Protocol::Tcp as i32,
                                address: address.to_string(),
                                resolver_name: String::new(),
                                ipv4_compat: true,
                                port_specifier: Some(
                                    envoy_core::socket_address::PortSpecifier::PortValue(
                                        u32::from(target_port),
                                    ),
                                ),
                            },
                        )),
                    }),
                },
            )),
        })
        .collect()
}

fn cluster_for_split(
    service_name: &str,
    path: &str,
    lb_endpoints: Vec<envoy_endpoint::LbEndpoint>,
    h2c: bool,
) -> envoy_cluster::Cluster {
    let name = format!("{service_name}{path}");
    envoy_cluster::Cluster {
        name: name.clone(),
        connect_timeout: Some(duration_proto(CLUSTER_CONNECT_TIMEOUT)),
        http2_protocol_options: h2c.then(envoy_core::Http2ProtocolOptions::default),
        load_assignment: Some(envoy_endpoint::ClusterLoadAssignment {
            cluster_name: name,
            endpoints: vec![envoy_endpoint::LocalityLbEndpoints {
                locality: None,
                lb_endpoints,
                load_balancing_weight: None,
                priority: 1,
            }],
        }),
        cluster_discovery_type: Some(envoy_cluster::cluster::ClusterDiscoveryType::Type(
            envoy_cluster::cluster::DiscoveryType::StrictDns as i32,
        )),
    }
}

fn weighted_cluster(
    split: &IngressBackendSplit,
    path: &str,
) -> envoy_route::weighted_cluster::ClusterWeight {
    envoy_route::weighted_cluster::ClusterWeight {
        name: format!("{}{}", split.service_name, path),
        weight: Some(split.percent),
        request_headers_to_add: headers_to_add(&split.append_headers),
    }
}

fn route_for_path(
    ingress_name: &str,
    rule_index: usize,
    path: &HttpIngressPath,
    weights: Vec<envoy_route::weighted_cluster::ClusterWeight>,
) -> envoy_route::Route {
    let timeout = path.timeout.map(Duration::from).unwrap_or_default();

    envoy_route::Route {
        name: format!("{ingress_name}_{rule_index}"),
        r#match: Some(envoy_route::RouteMatch {
            path_specifier: Some(envoy_route::route_match::PathSpecifier::Prefix(
                path.prefix().to_string(),
            )),
        }),
        request_headers_to_add: Vec::new(),
        response_headers_to_add: headers_to_add(&path.append_headers),
        action: Some(envoy_route::route::Action::Route(envoy_route::RouteAction {
            timeout: Some(duration_proto(timeout)),
            retry_policy: retry_policy(path),
            upgrade_configs: vec![envoy_route::route_action::UpgradeConfig {
                upgrade_type: "websocket".to_string(),
                enabled: Some(true),
            }],
            cluster_specifier: Some(
                envoy_route::route_action::ClusterSpecifier::WeightedClusters(
                    envoy_route::WeightedCluster { clusters: weights },
                ),
            ),
        })),
    }
}

fn retry_policy(path: &HttpIngressPath) -> Option<envoy_route::RetryPolicy> {
    let retries = path.retries.as_ref()?;
    if retries.attempts == 0 {
        return None;
    }
    let per_try = retries.per_try_timeout.map(Duration::from).unwrap_or_default();
    Some(envoy_route::RetryPolicy {
        retry_on: "5xx".to_string(),
        num_retries: Some(retries.attempts),
        per_try_timeout: Some(duration_proto(per_try)),
    })
}

fn headers_to_add(headers: &BTreeMap<String, String>) -> Vec<envoy_core::HeaderValueOption> {
    headers
        .iter()
        .map(|(key, value)| envoy_core::HeaderValueOption {
            header: Some(envoy_core::HeaderValue {
                key: key.clone(),
                value: value.clone(),
            }),
            append: Some(true),
        })
        .collect()
}

/// Clusters are de-duplicated by name; inputs for the same name are required
/// to be identical, so the last write wins.
fn insert_cluster(clusters: &mut Vec<envoy_cluster::Cluster>, cluster: envoy_cluster::Cluster) {
    if let Some(existing) = clusters.iter_mut().find(|c| c.name == cluster.name) {
        *existing = cluster;
    } else {
        clusters.push(cluster);
    }
}
