// System E2E library
// Drives ClusterDeployment scenarios against a live management cluster

pub mod k8s_helpers;
pub mod scenario;

/// Default log filter when RUST_LOG is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Step names recorded in the scenario context.
pub const STANDALONE_STEP: &str = "standalone";
pub const HOSTED_STEP: &str = "hosted";

/// Postfix appended to the standalone cluster name for the hosted cluster.
pub const HOSTED_POSTFIX: &str = "hcp";
