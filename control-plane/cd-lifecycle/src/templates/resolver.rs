use kube::ResourceExt;
use tracing::{debug, info};

use super::payloads::{EmbeddedPayloads, PayloadSource};
use super::substitute::{SubstitutionError, substitute};
use super::variables::{Layered, VariableSet, VariableSource};
use super::{
    ENV_CLUSTER_DEPLOYMENT_NAME, ENV_CLUSTER_DEPLOYMENT_TEMPLATE, TemplateType,
};
use crate::context::ScenarioContext;
use crate::crd::cluster_deployment::ClusterDeployment;
use crate::validation::first_missing_var;

pub const DEFAULT_NAME_PREFIX: &str = "e2e-test-";

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("unsupported template type: {0}")]
    UnsupportedTemplate(String),

    #[error("missing required variable {name} for template {template}")]
    MissingVariable {
        template: TemplateType,
        name: String,
    },

    #[error("no payload registered for template type {0}")]
    NoPayload(TemplateType),

    #[error("failed to substitute variables for template {template}: {source}")]
    Substitution {
        template: TemplateType,
        #[source]
        source: SubstitutionError,
    },

    #[error("failed to unmarshal ClusterDeployment for template {template}: {source}")]
    Deserialize {
        template: TemplateType,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("ClusterDeployment resolved from template {0} has an empty name")]
    EmptyName(TemplateType),
}

/// Turns a template identifier plus variables into a `ClusterDeployment`.
#[derive(Clone, Debug, Default)]
pub struct TemplateResolver<P = EmbeddedPayloads> {
    payloads: P,
}

impl TemplateResolver<EmbeddedPayloads> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: PayloadSource> TemplateResolver<P> {
    pub fn with_payloads(payloads: P) -> Self {
        Self { payloads }
    }

    /// Resolve without touching any state. Every failure here is a
    /// configuration error and should not be retried.
    pub fn resolve(
        &self,
        template_id: &str,
        vars: &dyn VariableSource,
    ) -> Result<ClusterDeployment, ResolveError> {
        let template = TemplateType::classify(template_id).ok_or_else(|| {
            ResolveError::UnsupportedTemplate(template_id.to_string())
        })?;

        // Hosted topologies depend on values exported from an earlier
        // standalone deployment, so they have no defaults in the payload.
        if let Some(name) = first_missing_var(vars, template.required_vars()) {
            return Err(ResolveError::MissingVariable {
                template,
                name: name.to_string(),
            });
        }

        let raw = self
            .payloads
            .payload(template)
            .ok_or(ResolveError::NoPayload(template))?;
        let rendered = substitute(raw, vars)
            .map_err(|source| ResolveError::Substitution { template, source })?;
        let cd: ClusterDeployment = serde_yaml::from_str(&rendered)
            .map_err(|source| ResolveError::Deserialize { template, source })?;

        if cd.metadata.name.as_deref().is_none_or(str::is_empty) {
            return Err(ResolveError::EmptyName(template));
        }
        debug!(%template, name = %cd.name_any(), "resolved template");
        Ok(cd)
    }

    /// Resolve for a named scenario step: the cluster name and template
    /// identifier are injected as `CLUSTER_DEPLOYMENT_NAME` and
    /// `CLUSTER_DEPLOYMENT_TEMPLATE` and recorded in `ctx` for later steps.
    pub fn generate(
        &self,
        ctx: &mut ScenarioContext,
        step: &str,
        cluster_name: &str,
        template_id: &str,
        vars: &dyn VariableSource,
    ) -> Result<ClusterDeployment, ResolveError> {
        let overrides = VariableSet::new()
            .with(ENV_CLUSTER_DEPLOYMENT_NAME, cluster_name)
            .with(ENV_CLUSTER_DEPLOYMENT_TEMPLATE, template_id);
        let layered = Layered {
            overrides: &overrides,
            base: vars,
        };
        let cd = self.resolve(template_id, &layered)?;
        info!(%step, name = %cluster_name, template = %template_id, "generated ClusterDeployment");
        ctx.record(step, cluster_name, template_id);
        Ok(cd)
    }
}

/// Cluster name from the caller's prefix, or `e2e-test-<8 hex>` when none is
/// given, with an optional `-<postfix>`.
pub fn generate_cluster_name(prefix: Option<&str>, postfix: &str) -> String {
    let base = match prefix.filter(|p| !p.is_empty()) {
        Some(p) => p.to_string(),
        None => {
            let id = uuid::Uuid::new_v4().simple().to_string();
            format!("{}{}", DEFAULT_NAME_PREFIX, &id[..8])
        }
    };
    if postfix.is_empty() {
        base
    } else {
        format!("{}-{}", base, postfix)
    }
}
