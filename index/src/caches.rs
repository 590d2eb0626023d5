use crate::{
    envoy_accesslog, envoy_cluster, envoy_core, envoy_file_accesslog, envoy_hcm, envoy_listener,
    envoy_route, envoy_router, envoy_tls, TranslatedIngress,
};
use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use ingress_controller_core::{
    IngressKey, EXTERNAL_HTTPS_PORT, EXTERNAL_HTTP_PORT, INTERNAL_HTTP_PORT, PROBE_DOMAIN,
    STATUS_PATH,
};
use ingress_controller_xds::{pack, Snapshot};
use parking_lot::RwLock;
use std::{collections::BTreeMap, sync::Arc};

const EXTERNAL_LISTENER_NAME: &str = "listener_external";
const INTERNAL_LISTENER_NAME: &str = "listener_internal";
const EXTERNAL_ROUTE_CONFIG: &str = "external_routes";
const INTERNAL_ROUTE_CONFIG: &str = "internal_routes";

/// TLS material for the external listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsPair {
    pub certificate_chain: String,
    pub private_key: String,
}

pub type SharedCaches = Arc<RwLock<Caches>>;

/// The incrementally-maintained model of all configured ingresses.
///
/// Mutations go through [`Caches::upsert_ingress`] and
/// [`Caches::delete_ingress`]; both leave the top-level lists and the
/// synthetic status virtual host consistent with the per-ingress entries.
/// Callers serialize access through the shared lock.
#[derive(Debug, Default)]
pub struct Caches {
    ingresses: BTreeMap<IngressKey, TranslatedIngress>,
    /// Which ingresses reference each cluster, by cluster name. A cluster
    /// lives exactly while this set is non-empty.
    cluster_owners: HashMap<String, HashSet<IngressKey>>,
    clusters: HashMap<String, envoy_cluster::Cluster>,

    external_hosts: Vec<envoy_route::VirtualHost>,
    internal_hosts: Vec<envoy_route::VirtualHost>,
    status_vhost: envoy_route::VirtualHost,
}

impl Caches {
    pub fn new() -> Self {
        let mut caches = Self::default();
        caches.add_status_virtual_host();
        caches
    }

    pub fn shared() -> SharedCaches {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Replaces the entry for the translation's ingress, dropping any
    /// clusters only the previous entry referenced.
    pub fn upsert_ingress(&mut self, translation: TranslatedIngress) {
        let key = translation.key.clone();
        tracing::info!(ingress = %key, "updating ingress");
        self.remove(&key);

        for cluster in &translation.clusters {
            self.cluster_owners
                .entry(cluster.name.clone())
                .or_default()
                .insert(key.clone());
            self.clusters.insert(cluster.name.clone(), cluster.clone());
        }
        self.ingresses.insert(key, translation);
        self.rebuild();
    }

    /// Removes an ingress and every cluster whose owner set empties.
    pub fn delete_ingress(&mut self, key: &IngressKey) {
        tracing::info!(ingress = %key, "deleting ingress");
        self.remove(key);
        self.rebuild();
    }

    pub fn get_ingress(&self, key: &IngressKey) -> Option<&TranslatedIngress> {
        self.ingresses.get(key)
    }

    fn remove(&mut self, key: &IngressKey) {
        let Some(previous) = self.ingresses.remove(key) else {
            return;
        };
        for cluster in &previous.clusters {
            if let Some(owners) = self.cluster_owners.get_mut(&cluster.name) {
                owners.remove(key);
                if owners.is_empty() {
                    self.cluster_owners.remove(&cluster.name);
                    self.clusters.remove(&cluster.name);
                }
            }
        }
    }

    fn rebuild(&mut self) {
        self.external_hosts = self
            .ingresses
            .values()
            .flat_map(|t| t.external_hosts.iter().cloned())
            .collect();
        self.internal_hosts = self
            .ingresses
            .values()
            .flat_map(|t| t.internal_hosts.iter().cloned())
            .collect();
        self.add_status_virtual_host();
    }

    /// Rebuilds the synthetic internal virtual host carrying one direct-200
    /// route per ingress (keyed by the ingress hash) plus the bare status
    /// path, all under the probe domain.
    pub fn add_status_virtual_host(&mut self) {
        let mut routes: Vec<envoy_route::Route> = self
            .ingresses
            .values()
            .map(|t| status_route(format!("{PROBE_DOMAIN}_{}", t.hash), status_path(&t.hash)))
            .collect();
        routes.push(status_route(
            PROBE_DOMAIN.to_string(),
            STATUS_PATH.to_string(),
        ));

        self.status_vhost = envoy_route::VirtualHost {
            name: PROBE_DOMAIN.to_string(),
            domains: vec![PROBE_DOMAIN.to_string()],
            routes,
        };
    }

    /// Copies the current model into an immutable bundle under a fresh
    /// version: the two listeners, their route configurations, all live
    /// clusters and their load assignments.
    pub fn to_snapshot(&self, tls: Option<&TlsPair>) -> Snapshot {
        let mut clusters: Vec<envoy_cluster::Cluster> = self.clusters.values().cloned().collect();
        clusters.sort_by(|a, b| a.name.cmp(&b.name));
        let endpoints = clusters
            .iter()
            .filter_map(|c| c.load_assignment.clone())
            .collect();

        let external_routes = envoy_route::RouteConfiguration {
            name: EXTERNAL_ROUTE_CONFIG.to_string(),
            virtual_hosts: self.external_hosts.clone(),
        };
        let mut internal_hosts = self.internal_hosts.clone();
        internal_hosts.push(self.status_vhost.clone());
        let internal_routes = envoy_route::RouteConfiguration {
            name: INTERNAL_ROUTE_CONFIG.to_string(),
            virtual_hosts: internal_hosts,
        };

        let (external_port, external_tls) = match tls {
            Some(pair) => (EXTERNAL_HTTPS_PORT, Some(tls_transport_socket(pair))),
            None => (EXTERNAL_HTTP_PORT, None),
        };
        let listeners = vec![
            listener(
                EXTERNAL_LISTENER_NAME,
                external_port,
                external_routes.clone(),
                external_tls,
            ),
            listener(
                INTERNAL_LISTENER_NAME,
                INTERNAL_HTTP_PORT,
                internal_routes.clone(),
                None,
            ),
        ];

        Snapshot::new(
            clusters,
            endpoints,
            listeners,
            vec![external_routes, internal_routes],
        )
    }
}

fn status_path(hash: &str) -> String {
    format!("{STATUS_PATH}/{hash}")
}

fn status_route(name: String, path: String) -> envoy_route::Route {
    envoy_route::Route {
        name,
        r#match: Some(envoy_route::RouteMatch {
            path_specifier: Some(envoy_route::route_match::PathSpecifier::Path(path)),
        }),
        request_headers_to_add: Vec::new(),
        response_headers_to_add: Vec::new(),
        action: Some(envoy_route::route::Action::DirectResponse(
            envoy_route::DirectResponseAction {
                status: 200,
                body: None,
            },
        )),
    }
}

fn listener(
    name: &str,
    port: u16,
    route_config: envoy_route::RouteConfiguration,
    tls: Option<envoy_core::TransportSocket>,
) -> envoy_listener::Listener {
    let manager = http_connection_manager(route_config);
    let filter = envoy_listener::Filter {
        name: "envoy.filters.network.http_connection_manager".to_string(),
        config_type: Some(envoy_listener::filter::ConfigType::TypedConfig(pack(
            "envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager",
            &manager,
        ))),
    };

    envoy_listener::Listener {
        name: name.to_string(),
        address: Some(envoy_core::Address {
            address: Some(envoy_core::address::Address::SocketAddress(
                envoy_core::SocketAddress {
                    protocol: envoy_core::socket_address::Protocol::Tcp as i32,
                    address: "0.0.0.0".to_string(),
                    resolver_name: String::new(),
                    ipv4_compat: false,
                    port_specifier: Some(envoy_core::socket_address::PortSpecifier::PortValue(
                        u32::from(port),
                    )),
                },
            )),
        }),
        filter_chains: vec![envoy_listener::FilterChain {
            filters: vec![filter],
            transport_socket: tls,
        }],
    }
}

fn http_connection_manager(
    route_config: envoy_route::RouteConfiguration,
) -> envoy_hcm::HttpConnectionManager {
    envoy_hcm::HttpConnectionManager {
        codec_type: envoy_hcm::http_connection_manager::CodecType::Auto as i32,
        stat_prefix: "ingress_http".to_string(),
        http_filters: vec![envoy_hcm::HttpFilter {
            name: "envoy.filters.http.router".to_string(),
            config_type: Some(envoy_hcm::http_filter::ConfigType::TypedConfig(pack(
                "envoy.extensions.filters.http.router.v3.Router",
                &envoy_router::Router::default(),
            ))),
        }],
        access_log: vec![access_log()],
        route_specifier: Some(
            envoy_hcm::http_connection_manager::RouteSpecifier::RouteConfig(route_config),
        ),
    }
}

// Access entries go to the container's stdout in the default format.
fn access_log() -> envoy_accesslog::AccessLog {
    envoy_accesslog::AccessLog {
        name: "envoy.access_loggers.file".to_string(),
        config_type: Some(envoy_accesslog::access_log::ConfigType::TypedConfig(pack(
            "envoy.extensions.access_loggers.file.v3.FileAccessLog",
            &envoy_file_accesslog::FileAccessLog {
                path: "/dev/stdout".to_string(),
            },
        ))),
    }
}

fn tls_transport_socket(pair: &TlsPair) -> envoy_core::TransportSocket {
    let context = envoy_tls::DownstreamTlsContext {
        common_tls_context: Some(envoy_tls::CommonTlsContext {
            tls_certificates: vec![envoy_tls::TlsCertificate {
                certificate_chain: Some(inline_string(&pair.certificate_chain)),
                private_key: Some(inline_string(&pair.private_key)),
            }],
            alpn_protocols: Vec::new(),
        }),
        require_client_certificate: None,
    };
    envoy_core::TransportSocket {
        name: "envoy.transport_sockets.tls".to_string(),
        config_type: Some(envoy_core::transport_socket::ConfigType::TypedConfig(pack(
            "envoy.extensions.transport_sockets.tls.v3.DownstreamTlsContext",
            &context,
        ))),
    }
}

fn inline_string(value: &str) -> envoy_core::DataSource {
    envoy_core::DataSource {
        specifier: Some(envoy_core::data_source::Specifier::InlineString(
            value.to_string(),
        )),
    }
}
