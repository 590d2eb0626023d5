//! The queue-driven reconcile worker.
//!
//! Keys arrive from the resource indexes and from the prober's ready
//! channel. Each key is resolved against the current cluster state: a
//! missing ingress is torn down, anything else is re-translated, committed
//! to the caches, and published as a fresh snapshot. Lookups are resolved
//! before the caches writer lock is taken; nothing blocks under it.

use crate::{apis::SharedApiIndex, status::ReadyCallback};
use anyhow::{anyhow, Context, Result};
use ingress_controller_core::IngressKey;
use ingress_controller_index::{translate, SharedCaches};
use ingress_controller_k8s_api as k8s;
use ingress_controller_status::StatusProber;
use ingress_controller_xds::SnapshotCache;
use rand::Rng;
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

const REQUEUE_DELAY: Duration = Duration::from_secs(1);

pub struct Reconciler<C> {
    apis: SharedApiIndex,
    caches: SharedCaches,
    snapshots: Arc<SnapshotCache>,
    prober: StatusProber,
    callback: C,
    requeue: UnboundedSender<IngressKey>,
    node_id: String,
    cluster_domain: String,
}

impl<C: ReadyCallback> Reconciler<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        apis: SharedApiIndex,
        caches: SharedCaches,
        snapshots: Arc<SnapshotCache>,
        prober: StatusProber,
        callback: C,
        requeue: UnboundedSender<IngressKey>,
        node_id: String,
        cluster_domain: String,
    ) -> Self {
        Self {
            apis,
            caches,
            snapshots,
            prober,
            callback,
            requeue,
            node_id,
            cluster_domain,
        }
    }

    /// Drains the reconcile queue and the prober's ready channel until both
    /// close.
    pub async fn run(
        self,
        mut queue: UnboundedReceiver<IngressKey>,
        mut ready: UnboundedReceiver<IngressKey>,
    ) {
        loop {
            tokio::select! {
                Some(key) = queue.recv() => self.step(key).await,
                Some(key) = ready.recv() => self.step(key).await,
                else => break,
            }
        }
        tracing::debug!("reconciler stopped");
    }

    async fn step(&self, key: IngressKey) {
        tracing::debug!(ingress = %key, "reconciling");
        if let Err(error) = self.reconcile(&key).await {
            tracing::warn!(ingress = %key, %error, "reconcile failed, requeueing");
            let requeue = self.requeue.clone();
            let delay = REQUEUE_DELAY.mul_f64(rand::thread_rng().gen_range(0.5..1.5));
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = requeue.send(key);
            });
        }
    }

    async fn reconcile(&self, key: &IngressKey) -> Result<()> {
        let ingress = self.apis.read().get_ingress(key);
        match ingress {
            Some(ingress) => self.update(key, ingress).await,
            None => self.delete(key),
        }
    }

    fn delete(&self, key: &IngressKey) -> Result<()> {
        // The key may refer to an ingress that never made it into the
        // caches (e.g. an event for an already-removed object).
        if self.caches.read().get_ingress(key).is_some() {
            self.prober.cancel_ingress(key);
        }
        self.caches.write().delete_ingress(key);
        self.publish()
    }

    async fn update(&self, key: &IngressKey, ingress: k8s::Ingress) -> Result<()> {
        let spec = ingress.spec.to_core();
        let translation = {
            let apis = self.apis.read();
            translate(key, &spec, &*apis, &*apis, &self.cluster_domain)?
        };
        let hash = translation.hash.clone();

        self.caches.write().upsert_ingress(translation);
        self.publish()?;

        let pods = self.apis.read().gateway_pods();
        if self.prober.is_ready(key, &hash, &pods) {
            self.callback
                .mark_ready(&ingress)
                .await
                .context("failed to update ingress status")?;
        } else {
            tracing::debug!(ingress = %key, "waiting for gateway pods to confirm");
        }
        Ok(())
    }

    fn publish(&self) -> Result<()> {
        let tls = {
            let apis = self.apis.read();
            if apis.tls_required() {
                let pair = apis
                    .tls()
                    .ok_or_else(|| anyhow!("HTTPS requested but TLS material is unavailable"))?;
                Some(pair)
            } else {
                None
            }
        };

        let snapshot = self.caches.read().to_snapshot(tls.as_ref());
        self.snapshots
            .set_snapshot(&self.node_id, snapshot)
            .context("failed to publish snapshot")
    }
}
