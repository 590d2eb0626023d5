//! Cluster-state indexing.
//!
//! [`ApiIndex`] receives the watched resources (ingresses, services,
//! endpoints, the optional TLS secret) and maintains the in-memory views the
//! reconciler and translator read: lookup maps, the gateway pod list, and a
//! service-to-ingress dependency index so a backend change re-queues exactly
//! the ingresses that route to it.

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use ingress_controller_core::{
    EndpointLookup, EndpointSet, IngressKey, PortSpec, ServiceInfo, ServiceLookup,
};
use ingress_controller_index::TlsPair;
use ingress_controller_k8s_api::{self as k8s, IntOrString, ResourceExt};
use parking_lot::RwLock;
use std::{net::Ipv4Addr, sync::Arc};
use tokio::sync::mpsc::UnboundedSender;

pub type SharedApiIndex = Arc<RwLock<ApiIndex>>;

pub struct ApiIndex {
    queue: UnboundedSender<IngressKey>,
    /// The internal service backing the gateway fleet; its endpoints are the
    /// pods the prober must confirm.
    gateway_service: (String, String),
    /// The secret named by `CERTS_SECRET_NAMESPACE`/`CERTS_SECRET_NAME`, when
    /// HTTPS is requested.
    certs_secret: Option<(String, String)>,

    ingresses: HashMap<IngressKey, k8s::Ingress>,
    services: HashMap<(String, String), ServiceInfo>,
    endpoints: HashMap<(String, String), EndpointSet>,
    /// Which ingresses route to each (namespace, service).
    dependents: HashMap<(String, String), HashSet<IngressKey>>,
    gateway_pods: Vec<Ipv4Addr>,
    tls: Option<TlsPair>,
}

impl ApiIndex {
    pub fn shared(
        queue: UnboundedSender<IngressKey>,
        gateway_service: (String, String),
        certs_secret: Option<(String, String)>,
    ) -> SharedApiIndex {
        Arc::new(RwLock::new(Self {
            queue,
            gateway_service,
            certs_secret,
            ingresses: HashMap::new(),
            services: HashMap::new(),
            endpoints: HashMap::new(),
            dependents: HashMap::new(),
            gateway_pods: Vec::new(),
            tls: None,
        }))
    }

    pub fn get_ingress(&self, key: &IngressKey) -> Option<k8s::Ingress> {
        self.ingresses.get(key).cloned()
    }

    pub fn gateway_pods(&self) -> Vec<Ipv4Addr> {
        self.gateway_pods.clone()
    }

    /// Whether the external listener must terminate TLS.
    pub fn tls_required(&self) -> bool {
        self.certs_secret.is_some()
    }

    pub fn tls(&self) -> Option<TlsPair> {
        self.tls.clone()
    }

    fn enqueue(&self, key: IngressKey) {
        if self.queue.send(key).is_err() {
            tracing::error!("reconcile queue closed");
        }
    }

    fn enqueue_dependents(&self, service: &(String, String)) {
        if let Some(keys) = self.dependents.get(service) {
            for key in keys {
                self.enqueue(key.clone());
            }
        }
    }

    fn enqueue_all(&self) {
        for key in self.ingresses.keys() {
            self.enqueue(key.clone());
        }
    }

    fn untrack(&mut self, key: &IngressKey) {
        self.dependents.retain(|_, keys| {
            keys.remove(key);
            !keys.is_empty()
        });
    }
}

impl kubert::index::IndexNamespacedResource<k8s::Ingress> for ApiIndex {
    fn apply(&mut self, ingress: k8s::Ingress) {
        let key = ingress.key();
        tracing::debug!(ingress = %key, "indexing ingress");

        self.untrack(&key);
        for rule in &ingress.spec.rules {
            for path in &rule.paths {
                for split in &path.splits {
                    self.dependents
                        .entry((split.service_namespace.clone(), split.service_name.clone()))
                        .or_default()
                        .insert(key.clone());
                }
            }
        }
        self.ingresses.insert(key.clone(), ingress);
        self.enqueue(key);
    }

    fn delete(&mut self, namespace: String, name: String) {
        let key = IngressKey::new(namespace, name);
        tracing::debug!(ingress = %key, "removing ingress");
        self.untrack(&key);
        self.ingresses.remove(&key);
        self.enqueue(key);
    }
}

impl kubert::index::IndexNamespacedResource<k8s::Endpoints> for ApiIndex {
    fn apply(&mut self, endpoints: k8s::Endpoints) {
        let service = (
            endpoints.namespace().unwrap_or_default(),
            endpoints.name_unchecked(),
        );
        let addresses = endpoint_addresses(&endpoints);
        if self
            .endpoints
            .get(&service)
            .is_some_and(|current| current.addresses == addresses)
        {
            return;
        }

        tracing::debug!(service = %format_args!("{}/{}", service.0, service.1), count = addresses.len(), "indexing endpoints");
        if service == self.gateway_service {
            self.gateway_pods = addresses.clone();
        }
        self.endpoints
            .insert(service.clone(), EndpointSet { addresses });
        self.enqueue_dependents(&service);
    }

    fn delete(&mut self, namespace: String, name: String) {
        let service = (namespace, name);
        if service == self.gateway_service {
            self.gateway_pods.clear();
        }
        self.endpoints.remove(&service);
        self.enqueue_dependents(&service);
    }
}

impl kubert::index::IndexNamespacedResource<k8s::Service> for ApiIndex {
    fn apply(&mut self, service: k8s::Service) {
        let key = (service.namespace().unwrap_or_default(), service.name_unchecked());
        let ports = service
            .spec
            .as_ref()
            .and_then(|spec| spec.ports.as_ref())
            .map(|ports| ports.iter().map(port_spec).collect())
            .unwrap_or_default();

        let info = ServiceInfo { ports };
        if self.services.get(&key) == Some(&info) {
            return;
        }
        self.services.insert(key.clone(), info);
        self.enqueue_dependents(&key);
    }

    fn delete(&mut self, namespace: String, name: String) {
        let key = (namespace, name);
        self.services.remove(&key);
        self.enqueue_dependents(&key);
    }
}

impl kubert::index::IndexNamespacedResource<k8s::Secret> for ApiIndex {
    fn apply(&mut self, secret: k8s::Secret) {
        let Some((namespace, name)) = self.certs_secret.clone() else {
            return;
        };
        if secret.namespace().as_deref() != Some(namespace.as_str())
            || secret.name_unchecked() != name
        {
            return;
        }

        let data = secret.data.unwrap_or_default();
        let pair = match (data.get("tls.crt"), data.get("tls.key")) {
            (Some(chain), Some(key)) => TlsPair {
                certificate_chain: String::from_utf8_lossy(&chain.0).into_owned(),
                private_key: String::from_utf8_lossy(&key.0).into_owned(),
            },
            _ => {
                tracing::warn!(
                    secret = %format_args!("{namespace}/{name}"),
                    "certificate secret is missing tls.crt or tls.key",
                );
                return;
            }
        };

        if self.tls.as_ref() == Some(&pair) {
            return;
        }
        tracing::info!(secret = %format_args!("{namespace}/{name}"), "TLS material updated");
        self.tls = Some(pair);
        self.enqueue_all();
    }

    fn delete(&mut self, namespace: String, name: String) {
        if self.certs_secret == Some((namespace, name)) {
            tracing::warn!("TLS material removed");
            self.tls = None;
            self.enqueue_all();
        }
    }
}

impl ServiceLookup for ApiIndex {
    fn service(&self, namespace: &str, name: &str) -> Option<ServiceInfo> {
        self.services
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }
}

impl EndpointLookup for ApiIndex {
    fn endpoints(&self, namespace: &str, name: &str) -> Option<EndpointSet> {
        self.endpoints
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }
}

fn port_spec(port: &k8s::ServicePort) -> PortSpec {
    PortSpec {
        name: port.name.clone(),
        port: port.port as u16,
        target_port: match &port.target_port {
            Some(IntOrString::Int(value)) => *value as u16,
            // Named target ports resolve per-pod; the gateway relies on
            // numeric targets.
            _ => 0,
        },
    }
}

fn endpoint_addresses(endpoints: &k8s::Endpoints) -> Vec<Ipv4Addr> {
    let mut addresses = Vec::new();
    for subset in endpoints.subsets.iter().flatten() {
        for address in subset.addresses.iter().flatten() {
            match address.ip.parse::<Ipv4Addr>() {
                Ok(ip) => addresses.push(ip),
                Err(_) => tracing::debug!(ip = %address.ip, "skipping non-IPv4 endpoint"),
            }
        }
    }
    addresses
}
