use std::time::Duration;

use envconfig::Envconfig;

use crate::poll::PollPolicy;

/// Runtime knobs for the lifecycle controller and readiness waits.
///
/// Defaults reproduce the fixed schedules: create every 10s for 1 minute,
/// delete every minute for 30 minutes.
#[derive(Envconfig, Clone, Debug)]
pub struct LifecycleConfig {
    /// Explicit cluster name prefix. When unset a random `e2e-test-` name is
    /// generated.
    #[envconfig(from = "CLUSTER_DEPLOYMENT_PREFIX")]
    pub name_prefix: Option<String>,

    #[envconfig(from = "CD_NAMESPACE", default = "kcm-system")]
    pub namespace: String,

    #[envconfig(from = "CD_CREATE_INTERVAL_SECS", default = "10")]
    pub create_interval_secs: u64,
    #[envconfig(from = "CD_CREATE_TIMEOUT_SECS", default = "60")]
    pub create_timeout_secs: u64,

    #[envconfig(from = "CD_DELETE_INTERVAL_SECS", default = "60")]
    pub delete_interval_secs: u64,
    #[envconfig(from = "CD_DELETE_TIMEOUT_SECS", default = "1800")]
    pub delete_timeout_secs: u64,

    /// Readiness wait, used by drivers polling `verify`.
    /// Env: CD_READY_INTERVAL_SECS / CD_READY_TIMEOUT_SECS
    #[envconfig(from = "CD_READY_INTERVAL_SECS", default = "10")]
    pub ready_interval_secs: u64,
    #[envconfig(from = "CD_READY_TIMEOUT_SECS", default = "1800")]
    pub ready_timeout_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            name_prefix: None,
            namespace: "kcm-system".to_string(),
            create_interval_secs: 10,
            create_timeout_secs: 60,
            delete_interval_secs: 60,
            delete_timeout_secs: 1800,
            ready_interval_secs: 10,
            ready_timeout_secs: 1800,
        }
    }
}

fn policy(interval: u64, timeout: u64) -> PollPolicy {
    // A zero interval would spin; clamp to one second.
    PollPolicy::new(
        Duration::from_secs(interval.max(1)),
        Duration::from_secs(timeout),
    )
}

impl LifecycleConfig {
    pub fn create_policy(&self) -> PollPolicy {
        policy(self.create_interval_secs, self.create_timeout_secs)
    }

    pub fn delete_policy(&self) -> PollPolicy {
        policy(self.delete_interval_secs, self.delete_timeout_secs)
    }

    pub fn ready_policy(&self) -> PollPolicy {
        policy(self.ready_interval_secs, self.ready_timeout_secs)
    }

    /// `None` when the prefix is unset or empty.
    pub fn name_prefix(&self) -> Option<&str> {
        self.name_prefix.as_deref().filter(|p| !p.is_empty())
    }
}
