use std::sync::Arc;

use anyhow::{Context, Result};
use cd_lifecycle::store::KubeStore;
use cd_lifecycle::templates::{
    CONTROLLER_LABEL, all_provider_selectors, generate_cluster_name,
};
use cd_lifecycle::{
    LifecycleController, ScenarioContext, Teardown, TemplateResolver,
    VariableSet,
};
use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::TestConfig;
use crate::k8s_helpers;
use crate::{HOSTED_POSTFIX, HOSTED_STEP, STANDALONE_STEP};

/// One end-to-end run: a standalone deployment, optionally followed by a
/// hosted control-plane deployment on top of it.
pub struct Scenario {
    cfg: TestConfig,
    client: Client,
    store: Arc<KubeStore>,
    ctrl: LifecycleController,
    resolver: TemplateResolver,
    ctx: ScenarioContext,
    cancel: CancellationToken,
    teardowns: Vec<Teardown>,
}

impl Scenario {
    pub fn new(cfg: TestConfig, client: Client, cancel: CancellationToken) -> Self {
        let store = Arc::new(KubeStore::new(client.clone()));
        let ctrl = LifecycleController::from_config(store.clone(), &cfg.lifecycle)
            .with_cancellation(cancel.clone());
        Self {
            cfg,
            client,
            store,
            ctrl,
            resolver: TemplateResolver::new(),
            ctx: ScenarioContext::new(),
            cancel,
            teardowns: Vec::new(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let result = self.deploy_all().await;
        if let Err(e) = &result {
            error!("scenario failed: {:#}", e);
            k8s_helpers::dump_controller_logs(
                &self.client,
                &self.cfg.lifecycle.namespace,
                &all_provider_selectors(),
            )
            .await;
        }
        let cleanup = self.cleanup().await;
        result.and(cleanup)
    }

    async fn deploy_all(&mut self) -> Result<()> {
        let ns = self.cfg.lifecycle.namespace.clone();
        let ready = self.cfg.lifecycle.ready_policy();

        k8s_helpers::wait_for_pods_ready(
            &self.client,
            &ns,
            CONTROLLER_LABEL,
            ready,
            &self.cancel,
        )
        .await?;
        k8s_helpers::wait_for_templates_valid(&self.store, &ns, ready, &self.cancel)
            .await?;

        let name = generate_cluster_name(self.cfg.lifecycle.name_prefix(), "");
        let template = self.cfg.template.clone();
        self.deploy(STANDALONE_STEP, &name, &template).await?;

        if let Some(hosted) = self.cfg.hosted_template().map(str::to_string) {
            let base = self
                .ctx
                .step(STANDALONE_STEP)
                .map(|s| s.cluster_name.clone())
                .context("standalone step was not recorded")?;
            let hosted_name = generate_cluster_name(Some(base.as_str()), HOSTED_POSTFIX);
            self.deploy(HOSTED_STEP, &hosted_name, &hosted).await?;
        }
        info!("scenario passed");
        Ok(())
    }

    async fn deploy(&mut self, step: &str, name: &str, template: &str) -> Result<()> {
        info!(%step, %name, %template, "deploying");
        let vars = VariableSet::from_env()
            .with("NAMESPACE", self.cfg.lifecycle.namespace.as_str());
        let cd = self
            .resolver
            .generate(&mut self.ctx, step, name, template, &vars)
            .with_context(|| format!("resolving {template}"))?;

        let teardown = self.ctrl.submit(&cd).await?;
        let key = teardown.key().clone();
        self.teardowns.push(teardown);

        k8s_helpers::wait_for_ready(
            &self.store,
            &key,
            self.cfg.lifecycle.ready_policy(),
            &self.cancel,
        )
        .await?;
        k8s_helpers::validate_machines(&self.store, &key.namespace, name).await?;
        Ok(())
    }

    /// Tear down in reverse order of creation. Every teardown is attempted;
    /// the first failure is returned.
    async fn cleanup(&mut self) -> Result<()> {
        if self.cfg.no_cleanup {
            info!(count = self.teardowns.len(), "skipping cleanup (E2E_NO_CLEANUP is set)");
            return Ok(());
        }
        let mut first_err = None;
        while let Some(teardown) = self.teardowns.pop() {
            if let Err(e) = teardown.run().await {
                warn!(key = %teardown.key(), error = %e, "teardown failed");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}
