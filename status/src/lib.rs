//! Active readiness verification.
//!
//! Installing a snapshot only means the control plane has sent it; an
//! ingress is reported ready once every live gateway pod actually serves its
//! routes. The prober confirms this through the per-ingress status routes:
//! each pod is probed at `{status path}/{ingress hash}` under the probe
//! domain, and a 200 proves that pod has installed this exact version of the
//! ingress.
//!
//! One probe context exists per ingress at a time. All of a context's
//! workers (one per pod) share a cancellation signal, so cancelling an
//! ingress is O(1) and prompt.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

use ahash::AHashMap as HashMap;
use hyper::client::HttpConnector;
use ingress_controller_core::{IngressKey, PROBE_DOMAIN, STATUS_PATH};
use parking_lot::Mutex;
use rand::Rng;
use std::{
    net::Ipv4Addr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::{mpsc::UnboundedSender, watch};

/// Probe retry tuning.
#[derive(Clone, Debug)]
pub struct ProbeConfig {
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on the retry delay.
    pub max_backoff: Duration,
    /// Attempts per pod before the probe context gives up. The next
    /// reconciliation starts a fresh context.
    pub max_attempts: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(2),
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(30),
            max_attempts: 8,
        }
    }
}

/// Verifies that gateway pods serve the routes of just-installed ingresses.
#[derive(Clone)]
pub struct StatusProber(Arc<Inner>);

struct Inner {
    client: hyper::Client<HttpConnector>,
    internal_port: u16,
    config: ProbeConfig,
    states: Mutex<HashMap<IngressKey, ProbeState>>,
    /// Ingresses whose probes completed; the reconciler re-queues these.
    ready: UnboundedSender<IngressKey>,
}

enum ProbeState {
    Probing {
        hash: String,
        // Dropping the sender cancels all workers of this context.
        #[allow(dead_code)]
        cancel: watch::Sender<bool>,
    },
    Ready {
        hash: String,
    },
}

impl StatusProber {
    pub fn new(internal_port: u16, ready: UnboundedSender<IngressKey>) -> Self {
        Self::with_config(internal_port, ready, ProbeConfig::default())
    }

    pub fn with_config(
        internal_port: u16,
        ready: UnboundedSender<IngressKey>,
        config: ProbeConfig,
    ) -> Self {
        Self(Arc::new(Inner {
            client: hyper::Client::new(),
            internal_port,
            config,
            states: Mutex::new(HashMap::new()),
            ready,
        }))
    }

    /// Whether `key` at `hash` has been verified on every pod. Starts (or,
    /// when the hash changed, restarts) probing otherwise; completion is
    /// reported on the ready channel.
    pub fn is_ready(&self, key: &IngressKey, hash: &str, pods: &[Ipv4Addr]) -> bool {
        let mut states = self.0.states.lock();
        match states.get(key) {
            Some(ProbeState::Ready { hash: current }) if current == hash => return true,
            Some(ProbeState::Probing { hash: current, .. }) if current == hash => return false,
            _ => {}
        }

        // A previous context for another spec version is cancelled by
        // dropping its signal.
        states.remove(key);

        if pods.is_empty() {
            tracing::debug!(ingress = %key, "no gateway pods to probe");
            return false;
        }

        let (cancel, _) = watch::channel(false);
        let remaining = Arc::new(AtomicUsize::new(pods.len()));
        for pod in pods {
            tokio::spawn(probe_pod(
                self.0.clone(),
                key.clone(),
                hash.to_string(),
                *pod,
                cancel.subscribe(),
                remaining.clone(),
            ));
        }
        tracing::debug!(ingress = %key, pods = pods.len(), "probing");
        states.insert(
            key.clone(),
            ProbeState::Probing {
                hash: hash.to_string(),
                cancel,
            },
        );
        false
    }

    /// Stops any in-flight probes for the ingress and frees their state.
    /// Mandatory on delete and implicit before re-probing a changed spec.
    pub fn cancel_ingress(&self, key: &IngressKey) {
        if self.0.states.lock().remove(key).is_some() {
            tracing::debug!(ingress = %key, "cancelled probes");
        }
    }
}

/// Probes one pod until it answers 200, retrying with bounded exponential
/// backoff and jitter. The last worker to succeed flips the ingress to ready.
async fn probe_pod(
    inner: Arc<Inner>,
    key: IngressKey,
    hash: String,
    pod: Ipv4Addr,
    mut cancel: watch::Receiver<bool>,
    remaining: Arc<AtomicUsize>,
) {
    let uri = format!(
        "http://{pod}:{port}{STATUS_PATH}/{hash}",
        port = inner.internal_port,
    );

    let mut delay = inner.config.initial_backoff;
    let mut attempts = 0u32;
    loop {
        let probe = probe_once(&inner.client, &uri, inner.config.request_timeout);
        let outcome = tokio::select! {
            _ = cancel.changed() => return,
            outcome = probe => outcome,
        };

        match outcome {
            Ok(()) => break,
            Err(error) => {
                attempts += 1;
                if attempts >= inner.config.max_attempts {
                    tracing::warn!(ingress = %key, %pod, %error, "giving up on probe");
                    // Drop the whole context so the next reconciliation
                    // starts over; dropping the signal stops the siblings.
                    let mut states = inner.states.lock();
                    if matches!(
                        states.get(&key),
                        Some(ProbeState::Probing { hash: current, .. }) if *current == hash,
                    ) {
                        states.remove(&key);
                    }
                    return;
                }
                tracing::debug!(ingress = %key, %pod, %error, delay_ms = delay.as_millis() as u64, "probe failed, retrying");

                let jittered = delay.mul_f64(rand::thread_rng().gen_range(0.5..1.5));
                let sleep = tokio::time::sleep(jittered);
                tokio::select! {
                    _ = cancel.changed() => return,
                    _ = sleep => {}
                }
                delay = (delay * 2).min(inner.config.max_backoff);
            }
        }
    }

    if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
        let mut states = inner.states.lock();
        if matches!(
            states.get(&key),
            Some(ProbeState::Probing { hash: current, .. }) if *current == hash,
        ) {
            states.insert(key.clone(), ProbeState::Ready { hash });
            tracing::info!(ingress = %key, "all gateway pods confirmed");
            let _ = inner.ready.send(key);
        }
    }
}

async fn probe_once(
    client: &hyper::Client<HttpConnector>,
    uri: &str,
    timeout: Duration,
) -> Result<(), ProbeError> {
    let request = hyper::Request::builder()
        .method(hyper::Method::GET)
        .uri(uri)
        .header(hyper::header::HOST, PROBE_DOMAIN)
        .body(hyper::Body::empty())
        .expect("probe request must build");

    let response = tokio::time::timeout(timeout, client.request(request))
        .await
        .map_err(|_| ProbeError::TimedOut)?
        .map_err(ProbeError::Transport)?;

    if response.status() == hyper::StatusCode::OK {
        Ok(())
    } else {
        Err(ProbeError::Status(response.status()))
    }
}

enum ProbeError {
    TimedOut,
    Transport(hyper::Error),
    Status(hyper::StatusCode),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimedOut => write!(f, "request timed out"),
            Self::Transport(error) => write!(f, "{error}"),
            Self::Status(status) => write!(f, "unexpected status {status}"),
        }
    }
}

#[cfg(test)]
mod tests;
