use anyhow::Result;
use ingress_controller_k8s_api::{self as k8s, Api, Patch, PatchParams, ResourceExt};

/// The upstream status callback: invoked once the prober has confirmed an
/// ingress on every gateway pod.
#[async_trait::async_trait]
pub trait ReadyCallback: Send + Sync + 'static {
    async fn mark_ready(&self, ingress: &k8s::Ingress) -> Result<()>;
}

/// Writes readiness back to the cluster via a status patch.
pub struct StatusWriter {
    client: k8s::Client,
}

impl StatusWriter {
    pub fn new(client: k8s::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ReadyCallback for StatusWriter {
    async fn mark_ready(&self, ingress: &k8s::Ingress) -> Result<()> {
        let generation = ingress.metadata.generation;
        if ingress
            .status
            .as_ref()
            .is_some_and(|status| status.is_ready() && status.observed_generation == generation)
        {
            return Ok(());
        }

        let namespace = ingress.namespace().unwrap_or_default();
        let name = ingress.name_unchecked();
        let status = k8s::IngressStatus::ready(generation);
        let patch = serde_json::json!({ "status": status });

        let api = Api::<k8s::Ingress>::namespaced(self.client.clone(), &namespace);
        api.patch_status(
            &name,
            &PatchParams::apply("ingress-controller"),
            &Patch::Merge(patch),
        )
        .await?;
        tracing::info!(ingress = %format_args!("{namespace}/{name}"), "ingress ready");
        Ok(())
    }
}
