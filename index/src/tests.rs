use crate::{translate, Caches, TlsPair};
use ahash::AHashMap as HashMap;
use ingress_controller_core::{
    EndpointLookup, EndpointSet, HttpIngressPath, IngressBackendSplit, IngressKey,
    IngressRetryPolicy, IngressRule, IngressSpec, PortSpec, ServiceInfo, ServiceLookup,
    ServicePort, Visibility, PROBE_DOMAIN, STATUS_PATH,
};
use ingress_controller_xds::envoy::config::{
    cluster::v3 as envoy_cluster, listener::v3 as envoy_listener, route::v3 as envoy_route,
};
use maplit::btreemap;
use std::net::Ipv4Addr;

const CLUSTER_DOMAIN: &str = "cluster.local";

#[derive(Default)]
struct FakeApis {
    services: HashMap<(String, String), ServiceInfo>,
    endpoints: HashMap<(String, String), EndpointSet>,
}

impl FakeApis {
    fn with_backend(
        mut self,
        namespace: &str,
        name: &str,
        port: PortSpec,
        addresses: &[Ipv4Addr],
    ) -> Self {
        let key = (namespace.to_string(), name.to_string());
        self.services.insert(
            key.clone(),
            ServiceInfo {
                ports: vec![port],
            },
        );
        self.endpoints.insert(
            key,
            EndpointSet {
                addresses: addresses.to_vec(),
            },
        );
        self
    }
}

impl ServiceLookup for FakeApis {
    fn service(&self, namespace: &str, name: &str) -> Option<ServiceInfo> {
        self.services
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }
}

impl EndpointLookup for FakeApis {
    fn endpoints(&self, namespace: &str, name: &str) -> Option<EndpointSet> {
        self.endpoints
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }
}

fn http_port(port: u16, target_port: u16) -> PortSpec {
    PortSpec {
        name: Some("http".to_string()),
        port,
        target_port,
    }
}

fn split(service: &str, percent: u32) -> IngressBackendSplit {
    IngressBackendSplit {
        service_namespace: "default".to_string(),
        service_name: service.to_string(),
        service_port: ServicePort::Number(80),
        percent,
        append_headers: Default::default(),
    }
}

fn spec_with_splits(visibility: Visibility, splits: Vec<IngressBackendSplit>) -> IngressSpec {
    IngressSpec {
        rules: vec![IngressRule {
            hosts: vec!["svc.example.com".to_string()],
            visibility,
            paths: vec![HttpIngressPath {
                splits,
                ..Default::default()
            }],
        }],
    }
}

fn key() -> IngressKey {
    IngressKey::new("default", "demo")
}

fn weighted_clusters(route: &envoy_route::Route) -> Vec<(String, u32)> {
    let Some(envoy_route::route::Action::Route(action)) = &route.action else {
        panic!("expected a forwarding action");
    };
    let Some(envoy_route::route_action::ClusterSpecifier::WeightedClusters(weighted)) =
        &action.cluster_specifier
    else {
        panic!("expected weighted clusters");
    };
    weighted
        .clusters
        .iter()
        .map(|w| (w.name.clone(), w.weight.unwrap_or_default()))
        .collect()
}

fn listener_port(listener: &envoy_listener::Listener) -> u32 {
    use ingress_controller_xds::envoy::config::core::v3 as envoy_core;
    let Some(envoy_core::address::Address::SocketAddress(socket)) =
        listener.address.as_ref().and_then(|a| a.address.as_ref())
    else {
        panic!("expected a socket address");
    };
    match socket.port_specifier {
        Some(envoy_core::socket_address::PortSpecifier::PortValue(port)) => port,
        _ => panic!("expected a port value"),
    }
}

#[test]
fn simple_ingress() {
    let apis = FakeApis::default().with_backend(
        "default",
        "foo",
        http_port(80, 80),
        &[Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)],
    );
    let spec = spec_with_splits(Visibility::ExternalIp, vec![split("foo", 100)]);

    let translation = translate(&key(), &spec, &apis, &apis, CLUSTER_DOMAIN).unwrap();

    assert_eq!(translation.external_hosts.len(), 1);
    assert_eq!(translation.internal_hosts.len(), 1);
    assert_eq!(translation.clusters.len(), 1);

    let cluster = &translation.clusters[0];
    assert_eq!(cluster.name, "foo/");
    let assignment = cluster.load_assignment.as_ref().unwrap();
    assert_eq!(assignment.endpoints[0].lb_endpoints.len(), 2);
    assert!(cluster.http2_protocol_options.is_none());

    let vhost = &translation.external_hosts[0];
    assert_eq!(vhost.name, "demo");
    assert_eq!(vhost.domains, vec!["svc.example.com"]);

    let route = &vhost.routes[0];
    assert_eq!(route.name, "demo_0");
    assert_eq!(weighted_clusters(route), vec![("foo/".to_string(), 100)]);

    let Some(envoy_route::route::Action::Route(action)) = &route.action else {
        panic!("expected a forwarding action");
    };
    assert_eq!(action.upgrade_configs[0].upgrade_type, "websocket");
    assert_eq!(action.upgrade_configs[0].enabled, Some(true));
    assert!(action.retry_policy.is_none());
}

#[test]
fn traffic_split_preserves_order_and_weights() {
    let apis = FakeApis::default()
        .with_backend("default", "foo", http_port(80, 80), &[Ipv4Addr::new(10, 0, 0, 1)])
        .with_backend("default", "bar", http_port(80, 80), &[Ipv4Addr::new(10, 0, 0, 2)]);
    let spec = spec_with_splits(
        Visibility::ExternalIp,
        vec![split("foo", 60), split("bar", 40)],
    );

    let translation = translate(&key(), &spec, &apis, &apis, CLUSTER_DOMAIN).unwrap();

    assert_eq!(translation.clusters.len(), 2);
    let route = &translation.internal_hosts[0].routes[0];
    assert_eq!(
        weighted_clusters(route),
        vec![("foo/".to_string(), 60), ("bar/".to_string(), 40)],
    );
}

#[test]
fn h2c_port_enables_http2_options() {
    let apis = FakeApis::default().with_backend(
        "default",
        "foo",
        PortSpec {
            name: Some("h2c".to_string()),
            port: 80,
            target_port: 8080,
        },
        &[Ipv4Addr::new(10, 0, 0, 1)],
    );
    let spec = spec_with_splits(Visibility::ExternalIp, vec![split("foo", 100)]);

    let translation = translate(&key(), &spec, &apis, &apis, CLUSTER_DOMAIN).unwrap();
    assert!(translation.clusters[0].http2_protocol_options.is_some());
}

#[test]
fn missing_backend_drops_only_its_path() {
    let apis = FakeApis::default().with_backend(
        "default",
        "foo",
        http_port(80, 80),
        &[Ipv4Addr::new(10, 0, 0, 1)],
    );
    let spec = IngressSpec {
        rules: vec![IngressRule {
            hosts: vec!["svc.example.com".to_string()],
            visibility: Visibility::ExternalIp,
            paths: vec![
                HttpIngressPath {
                    path: "/missing".to_string(),
                    splits: vec![split("absent", 100)],
                    ..Default::default()
                },
                HttpIngressPath {
                    splits: vec![split("foo", 100)],
                    ..Default::default()
                },
            ],
        }],
    };

    let translation = translate(&key(), &spec, &apis, &apis, CLUSTER_DOMAIN).unwrap();

    let routes = &translation.internal_hosts[0].routes;
    assert_eq!(routes.len(), 1);
    assert_eq!(weighted_clusters(&routes[0]), vec![("foo/".to_string(), 100)]);
    assert!(translation.clusters.iter().all(|c| c.name == "foo/"));
}

#[test]
fn unresolved_backends_keep_the_internal_host() {
    // No services or endpoints are visible yet; the ingress still owns its
    // virtual hosts so it stays addressable while the backends catch up.
    let apis = FakeApis::default();
    let spec = spec_with_splits(Visibility::ExternalIp, vec![split("foo", 100)]);

    let translation = translate(&key(), &spec, &apis, &apis, CLUSTER_DOMAIN).unwrap();

    assert_eq!(translation.internal_hosts.len(), 1);
    assert_eq!(translation.external_hosts.len(), 1);
    assert!(translation.internal_hosts[0].routes.is_empty());
    assert!(translation.clusters.is_empty());
    assert_eq!(translation.internal_hosts[0].domains, vec!["svc.example.com"]);
}

#[test]
fn rules_without_hosts_contribute_nothing() {
    let apis = FakeApis::default().with_backend(
        "default",
        "foo",
        http_port(80, 80),
        &[Ipv4Addr::new(10, 0, 0, 1)],
    );
    let mut spec = spec_with_splits(Visibility::ExternalIp, vec![split("foo", 100)]);
    spec.rules[0].hosts.clear();

    let translation = translate(&key(), &spec, &apis, &apis, CLUSTER_DOMAIN).unwrap();

    assert!(translation.internal_hosts.is_empty());
    assert!(translation.external_hosts.is_empty());
    // No virtual host may reference them, so no clusters are emitted either.
    assert!(translation.clusters.is_empty());
}

#[test]
fn cluster_local_rules_have_no_external_host() {
    let apis = FakeApis::default().with_backend(
        "default",
        "foo",
        http_port(80, 80),
        &[Ipv4Addr::new(10, 0, 0, 1)],
    );
    let mut spec = spec_with_splits(Visibility::ClusterLocal, vec![split("foo", 100)]);
    spec.rules[0].hosts = vec!["foo.default.svc.cluster.local".to_string()];

    let translation = translate(&key(), &spec, &apis, &apis, CLUSTER_DOMAIN).unwrap();

    assert!(translation.external_hosts.is_empty());
    assert_eq!(translation.internal_hosts.len(), 1);
    assert_eq!(
        translation.internal_hosts[0].domains,
        vec!["foo.default.svc.cluster.local", "foo.default.svc", "foo.default"],
    );
}

#[test]
fn path_headers_become_response_headers() {
    let apis = FakeApis::default().with_backend(
        "default",
        "foo",
        http_port(80, 80),
        &[Ipv4Addr::new(10, 0, 0, 1)],
    );
    let spec = IngressSpec {
        rules: vec![IngressRule {
            hosts: vec!["svc.example.com".to_string()],
            visibility: Visibility::ExternalIp,
            paths: vec![HttpIngressPath {
                append_headers: btreemap! {
                    "x-env".to_string() => "prod".to_string(),
                },
                splits: vec![IngressBackendSplit {
                    append_headers: btreemap! {
                        "x-split".to_string() => "foo".to_string(),
                    },
                    ..split("foo", 100)
                }],
                ..Default::default()
            }],
        }],
    };

    let translation = translate(&key(), &spec, &apis, &apis, CLUSTER_DOMAIN).unwrap();

    let route = &translation.internal_hosts[0].routes[0];
    assert_eq!(
        route.response_headers_to_add[0].header.as_ref().unwrap().key,
        "x-env",
    );
    assert!(route.request_headers_to_add.is_empty());

    let Some(envoy_route::route::Action::Route(action)) = &route.action else {
        panic!("expected a forwarding action");
    };
    let Some(envoy_route::route_action::ClusterSpecifier::WeightedClusters(weighted)) =
        &action.cluster_specifier
    else {
        panic!("expected weighted clusters");
    };
    assert_eq!(
        weighted.clusters[0].request_headers_to_add[0]
            .header
            .as_ref()
            .unwrap()
            .key,
        "x-split",
    );
}

#[test]
fn retries_emit_a_5xx_policy() {
    let apis = FakeApis::default().with_backend(
        "default",
        "foo",
        http_port(80, 80),
        &[Ipv4Addr::new(10, 0, 0, 1)],
    );
    let spec = IngressSpec {
        rules: vec![IngressRule {
            hosts: vec!["svc.example.com".to_string()],
            visibility: Visibility::ExternalIp,
            paths: vec![HttpIngressPath {
                retries: Some(IngressRetryPolicy {
                    attempts: 3,
                    per_try_timeout: Some(std::time::Duration::from_secs(1).into()),
                }),
                splits: vec![split("foo", 100)],
                ..Default::default()
            }],
        }],
    };

    let translation = translate(&key(), &spec, &apis, &apis, CLUSTER_DOMAIN).unwrap();
    let route = &translation.internal_hosts[0].routes[0];
    let Some(envoy_route::route::Action::Route(action)) = &route.action else {
        panic!("expected a forwarding action");
    };
    let policy = action.retry_policy.as_ref().unwrap();
    assert_eq!(policy.retry_on, "5xx");
    assert_eq!(policy.num_retries, Some(3));
    assert_eq!(policy.per_try_timeout.as_ref().unwrap().seconds, 1);
}

fn translated(name: &str, apis: &FakeApis, spec: &IngressSpec) -> crate::TranslatedIngress {
    translate(
        &IngressKey::new("default", name),
        spec,
        apis,
        apis,
        CLUSTER_DOMAIN,
    )
    .unwrap()
}

#[test]
fn deletion_leaves_no_orphans() {
    let apis = FakeApis::default().with_backend(
        "default",
        "foo",
        http_port(80, 80),
        &[Ipv4Addr::new(10, 0, 0, 1)],
    );
    let spec = spec_with_splits(Visibility::ExternalIp, vec![split("foo", 100)]);

    let mut caches = Caches::new();
    caches.upsert_ingress(translated("demo", &apis, &spec));

    let snapshot = caches.to_snapshot(None);
    assert_eq!(snapshot.clusters().len(), 1);
    assert!(snapshot
        .routes()
        .iter()
        .any(|rc| rc.virtual_hosts.iter().any(|v| v.name == "demo")));

    caches.delete_ingress(&IngressKey::new("default", "demo"));
    let snapshot = caches.to_snapshot(None);
    assert!(snapshot.clusters().is_empty());
    assert!(snapshot.endpoints().is_empty());
    assert!(!snapshot
        .routes()
        .iter()
        .any(|rc| rc.virtual_hosts.iter().any(|v| v.name == "demo")));
}

#[test]
fn shared_clusters_live_until_the_last_owner_leaves() {
    let apis = FakeApis::default().with_backend(
        "default",
        "foo",
        http_port(80, 80),
        &[Ipv4Addr::new(10, 0, 0, 1)],
    );
    let spec = spec_with_splits(Visibility::ExternalIp, vec![split("foo", 100)]);

    let mut caches = Caches::new();
    caches.upsert_ingress(translated("first", &apis, &spec));
    caches.upsert_ingress(translated("second", &apis, &spec));
    assert_eq!(caches.to_snapshot(None).clusters().len(), 1);

    caches.delete_ingress(&IngressKey::new("default", "first"));
    assert_eq!(caches.to_snapshot(None).clusters().len(), 1);

    caches.delete_ingress(&IngressKey::new("default", "second"));
    assert!(caches.to_snapshot(None).clusters().is_empty());
}

#[test]
fn snapshots_get_fresh_versions() {
    let caches = Caches::new();
    let a = caches.to_snapshot(None);
    let b = caches.to_snapshot(None);
    assert_ne!(a.version(), b.version());
}

#[test]
fn status_virtual_host_carries_probe_routes() {
    let apis = FakeApis::default().with_backend(
        "default",
        "foo",
        http_port(80, 80),
        &[Ipv4Addr::new(10, 0, 0, 1)],
    );
    let spec = spec_with_splits(Visibility::ExternalIp, vec![split("foo", 100)]);

    let mut caches = Caches::new();
    let translation = translated("demo", &apis, &spec);
    let hash = translation.hash.clone();
    caches.upsert_ingress(translation);

    let snapshot = caches.to_snapshot(None);
    let internal = snapshot
        .routes()
        .iter()
        .find(|rc| rc.name == "internal_routes")
        .unwrap();
    let status = internal
        .virtual_hosts
        .iter()
        .find(|v| v.name == PROBE_DOMAIN)
        .unwrap();
    assert_eq!(status.domains, vec![PROBE_DOMAIN]);
    assert_eq!(status.routes.len(), 2);

    let probe = &status.routes[0];
    let Some(envoy_route::route_match::PathSpecifier::Path(path)) =
        probe.r#match.as_ref().and_then(|m| m.path_specifier.as_ref())
    else {
        panic!("expected an exact path match");
    };
    assert_eq!(path, &format!("{STATUS_PATH}/{hash}"));
    assert!(matches!(
        probe.action,
        Some(envoy_route::route::Action::DirectResponse(
            envoy_route::DirectResponseAction { status: 200, .. }
        )),
    ));

    let fallback = &status.routes[1];
    let Some(envoy_route::route_match::PathSpecifier::Path(path)) = fallback
        .r#match
        .as_ref()
        .and_then(|m| m.path_specifier.as_ref())
    else {
        panic!("expected an exact path match");
    };
    assert_eq!(path, STATUS_PATH);
}

#[test]
fn tls_material_switches_the_external_listener() {
    let caches = Caches::new();

    let plain = caches.to_snapshot(None);
    let external = &plain.listeners()[0];
    assert_eq!(listener_port(external), 8080);
    assert!(external.filter_chains[0].transport_socket.is_none());

    let tls = TlsPair {
        certificate_chain: "CERT".to_string(),
        private_key: "KEY".to_string(),
    };
    let secured = caches.to_snapshot(Some(&tls));
    let external = &secured.listeners()[0];
    assert_eq!(listener_port(external), 8443);
    let socket = external.filter_chains[0].transport_socket.as_ref().unwrap();
    assert_eq!(socket.name, "envoy.transport_sockets.tls");

    let internal = &secured.listeners()[1];
    assert_eq!(listener_port(internal), 8081);
    assert!(internal.filter_chains[0].transport_socket.is_none());
}

#[test]
fn cluster_map_is_deduplicated_across_paths() {
    let apis = FakeApis::default().with_backend(
        "default",
        "foo",
        http_port(80, 80),
        &[Ipv4Addr::new(10, 0, 0, 1)],
    );
    let spec = IngressSpec {
        rules: vec![IngressRule {
            hosts: vec!["svc.example.com".to_string()],
            visibility: Visibility::ExternalIp,
            paths: vec![
                HttpIngressPath {
                    splits: vec![split("foo", 50), split("foo", 50)],
                    ..Default::default()
                },
            ],
        }],
    };

    let translation = translate(&key(), &spec, &apis, &apis, CLUSTER_DOMAIN).unwrap();
    let names: Vec<_> = translation
        .clusters
        .iter()
        .map(|c: &envoy_cluster::Cluster| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["foo/"]);
}
