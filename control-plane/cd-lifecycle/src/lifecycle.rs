//! Idempotent create and delete with bounded waits.
//!
//! `submit` retries the create until it is accepted (an already-existing
//! object counts as accepted) and hands back a [`Teardown`]. Running the
//! teardown issues a single delete, then polls until the object is gone.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::LifecycleConfig;
use crate::crd::cluster_deployment::ClusterDeployment;
use crate::poll::{PollOutcome, PollPolicy, poll_until};
use crate::store::{ObjectKey, ResourceStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("failed to {operation} {key}: {source}")]
    Store {
        operation: &'static str,
        key: ObjectKey,
        #[source]
        source: StoreError,
    },

    #[error("timed out after {budget:?} waiting to {operation} {key}{}", last_suffix(.last))]
    Timeout {
        operation: &'static str,
        key: ObjectKey,
        budget: Duration,
        last: Option<StoreError>,
    },

    #[error("{operation} of {key} was cancelled")]
    Cancelled {
        operation: &'static str,
        key: ObjectKey,
    },
}

fn last_suffix(last: &Option<StoreError>) -> String {
    match last {
        Some(e) => format!(": {}", e),
        None => String::new(),
    }
}

impl LifecycleError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LifecycleError::Timeout { .. })
    }
}

#[derive(Clone)]
pub struct LifecycleController {
    store: Arc<dyn ResourceStore>,
    create: PollPolicy,
    delete: PollPolicy,
    cancel: CancellationToken,
}

impl LifecycleController {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            create: PollPolicy::create(),
            delete: PollPolicy::delete(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_config(store: Arc<dyn ResourceStore>, cfg: &LifecycleConfig) -> Self {
        Self::new(store).with_policies(cfg.create_policy(), cfg.delete_policy())
    }

    pub fn with_policies(mut self, create: PollPolicy, delete: PollPolicy) -> Self {
        self.create = create;
        self.delete = delete;
        self
    }

    /// Polls stop at their next boundary once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Ensure the object exists. Create failures are retried on the create
    /// schedule; on exhaustion the last store error is carried in
    /// [`LifecycleError::Timeout`].
    #[instrument(skip_all, fields(key = %ObjectKey::of(cd)))]
    pub async fn submit(
        &self,
        cd: &ClusterDeployment,
    ) -> Result<Teardown, LifecycleError> {
        let key = ObjectKey::of(cd);

        let store = &self.store;
        let outcome = poll_until(self.create, &self.cancel, || async move {
            match store.create(cd).await {
                Ok(()) => Ok(()),
                Err(e) if e.is_already_exists() => {
                    debug!("already exists, treating as created");
                    Ok(())
                }
                Err(e) => {
                    warn!(error = %e, "create failed, will retry");
                    Err(e)
                }
            }
        })
        .await;

        match outcome {
            PollOutcome::Converged(()) => {
                info!("created");
                Ok(Teardown {
                    store: self.store.clone(),
                    key,
                    policy: self.delete,
                    cancel: self.cancel.clone(),
                })
            }
            PollOutcome::TimedOut { attempts, last } => {
                warn!(attempts, "create did not succeed within budget");
                Err(LifecycleError::Timeout {
                    operation: "create",
                    key,
                    budget: self.create.budget,
                    last,
                })
            }
            PollOutcome::Cancelled { .. } => Err(LifecycleError::Cancelled {
                operation: "create",
                key,
            }),
        }
    }
}

/// Deferred cleanup for one submitted object. Running it more than once is
/// harmless: a delete of an absent object counts as success.
#[derive(Clone)]
pub struct Teardown {
    store: Arc<dyn ResourceStore>,
    key: ObjectKey,
    policy: PollPolicy,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Teardown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Teardown")
            .field("key", &self.key)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Teardown {
    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    /// Delete, then wait until a read reports the object absent. A delete
    /// error other than not-found is returned at once without polling.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn run(&self) -> Result<(), LifecycleError> {
        match self.store.delete(&self.key).await {
            Ok(()) => debug!("delete accepted"),
            Err(e) if e.is_not_found() => debug!("already deleted"),
            Err(source) => {
                return Err(LifecycleError::Store {
                    operation: "delete",
                    key: self.key.clone(),
                    source,
                });
            }
        }

        let store = &self.store;
        let key = &self.key;
        let outcome = poll_until(self.policy, &self.cancel, || async move {
            match store.get(key).await {
                Ok(None) => Ok(()),
                Ok(Some(_)) => {
                    debug!("still present");
                    Err(None)
                }
                Err(e) => {
                    warn!(error = %e, "read during teardown failed");
                    Err(Some(e))
                }
            }
        })
        .await;

        match outcome {
            PollOutcome::Converged(()) => {
                info!("deleted");
                Ok(())
            }
            PollOutcome::TimedOut { attempts, last } => {
                warn!(attempts, "object still present after delete budget");
                Err(LifecycleError::Timeout {
                    operation: "delete",
                    key: self.key.clone(),
                    budget: self.policy.budget,
                    last: last.flatten(),
                })
            }
            PollOutcome::Cancelled { .. } => Err(LifecycleError::Cancelled {
                operation: "delete",
                key: self.key.clone(),
            }),
        }
    }
}
