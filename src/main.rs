#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

use anyhow::{bail, Result};
use clap::Parser;
use ingress_controller::{ApiIndex, Reconciler, StatusWriter};
use ingress_controller_core::INTERNAL_HTTP_PORT;
use ingress_controller_index::Caches;
use ingress_controller_k8s_api as k8s;
use ingress_controller_status::StatusProber;
use ingress_controller_xds::{gateway, SnapshotCache, XdsServer};
use kube::runtime::watcher;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::mpsc;
use tracing::{info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "ingress-controller",
    about = "Control plane of the serverless ingress gateway"
)]
struct Args {
    #[clap(
        long,
        default_value = "ingress_controller=info,warn",
        env = "INGRESS_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Address of the xDS management server.
    #[clap(long, default_value = "0.0.0.0:18000")]
    xds_addr: SocketAddr,

    /// Address of the HTTP/1.1 discovery gateway.
    #[clap(long, default_value = "0.0.0.0:18001")]
    gateway_addr: SocketAddr,

    /// Node id the data-plane proxies declare on stream open.
    #[clap(long, default_value = "ingress-gateway")]
    node_id: String,

    #[clap(long, default_value = "cluster.local")]
    cluster_domain: String,

    /// Namespace of the gateway's internal service, whose endpoints are the
    /// pods the status prober confirms.
    #[clap(long, default_value = "ingress-system")]
    gateway_namespace: String,

    /// Name of the gateway's internal service.
    #[clap(long, default_value = "ingress-gateway")]
    gateway_service: String,

    /// Namespace of the secret holding the external listener's TLS material.
    /// HTTPS is enabled when both this and --certs-secret-name are set.
    #[clap(long, env = "CERTS_SECRET_NAMESPACE", default_value = "")]
    certs_secret_namespace: String,

    /// Name of the secret holding the external listener's TLS material.
    #[clap(long, env = "CERTS_SECRET_NAME", default_value = "")]
    certs_secret_name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        log_level,
        log_format,
        client,
        admin,
        xds_addr,
        gateway_addr,
        node_id,
        cluster_domain,
        gateway_namespace,
        gateway_service,
        certs_secret_namespace,
        certs_secret_name,
    } = Args::parse();

    let mut runtime = kubert::Runtime::builder()
        .with_log(log_level, log_format)
        .with_admin(admin)
        .with_client(client)
        .build()
        .await?;

    let certs_secret = (!certs_secret_namespace.is_empty() && !certs_secret_name.is_empty())
        .then(|| (certs_secret_namespace, certs_secret_name));
    let watch_secrets = certs_secret.is_some();

    let (queue_tx, queue_rx) = mpsc::unbounded_channel();
    let (ready_tx, ready_rx) = mpsc::unbounded_channel();

    // The shared model: cluster-state views feeding the translator, the
    // ingress caches, and the per-node snapshot store.
    let apis = ApiIndex::shared(
        queue_tx.clone(),
        (gateway_namespace, gateway_service),
        certs_secret,
    );
    let caches = Caches::shared();
    let snapshots = Arc::new(SnapshotCache::new());
    let prober = StatusProber::new(INTERNAL_HTTP_PORT, ready_tx);

    // Resource indexers: every watch event lands in the ApiIndex, which
    // queues the affected ingresses for reconciliation.
    let ingresses = runtime.watch_all::<k8s::Ingress>(watcher::Config::default());
    tokio::spawn(
        kubert::index::namespaced(apis.clone(), ingresses).instrument(info_span!("ingresses")),
    );

    let endpoints = runtime.watch_all::<k8s::Endpoints>(watcher::Config::default());
    tokio::spawn(
        kubert::index::namespaced(apis.clone(), endpoints).instrument(info_span!("endpoints")),
    );

    let services = runtime.watch_all::<k8s::Service>(watcher::Config::default());
    tokio::spawn(
        kubert::index::namespaced(apis.clone(), services).instrument(info_span!("services")),
    );

    if watch_secrets {
        let secrets = runtime.watch_all::<k8s::Secret>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(apis.clone(), secrets).instrument(info_span!("secrets")),
        );
    }

    let xds = XdsServer::new(snapshots.clone());
    let drain = runtime.shutdown_handle();
    tokio::spawn(
        async move {
            if let Err(error) = xds.serve(xds_addr, drain).await {
                tracing::error!(%error, "xDS server failed");
            }
        }
        .instrument(info_span!("xds")),
    );

    let gateway_cache = snapshots.clone();
    let drain = runtime.shutdown_handle();
    tokio::spawn(
        async move {
            if let Err(error) = gateway::serve(gateway_addr, gateway_cache, drain).await {
                tracing::error!(%error, "discovery gateway failed");
            }
        }
        .instrument(info_span!("gateway")),
    );

    let reconciler = Reconciler::new(
        apis,
        caches,
        snapshots,
        prober,
        StatusWriter::new(runtime.client()),
        queue_tx,
        node_id,
        cluster_domain,
    );
    tokio::spawn(
        reconciler
            .run(queue_rx, ready_rx)
            .instrument(info_span!("reconciler")),
    );

    // Block on the shutdown signal; background tasks drain before exit.
    if runtime.run().await.is_err() {
        bail!("aborted");
    }
    Ok(())
}
