pub mod config;
pub mod context;
pub mod crd;
pub mod error;
pub mod lifecycle;
pub mod poll;
pub mod readiness;
pub mod store;
pub mod templates;
pub mod validation;

pub use config::LifecycleConfig;
pub use context::ScenarioContext;
pub use crd::cluster_deployment::{
    ClusterDeployment, ClusterDeploymentSpec, ClusterDeploymentStatus,
    Condition, ConditionStatus,
};
pub use error::{Error, ErrorClass};
pub use lifecycle::{LifecycleController, LifecycleError, Teardown};
pub use poll::{PollOutcome, PollPolicy, poll_until};
pub use readiness::{ConditionSource, ReadinessError, verify};
pub use store::{ObjectKey, ResourceStore, StoreError, StoreResult};
pub use templates::{
    Provider, ResolveError, TemplateResolver, TemplateType, Topology,
    VariableSet, VariableSource,
};

use tracing_subscriber::{
    EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

pub fn init_tracing(default_env: &str) {
    let filter = EnvFilter::builder()
        .with_env_var("RUST_LOG")
        .from_env_lossy()
        .add_directive(
            default_env
                .parse()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        );

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .try_init();
}
