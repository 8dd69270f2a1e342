//! Resource store seam used by the lifecycle controller.
//!
//! The controller only needs three calls: `create`, `delete` and `get`. The
//! Kubernetes implementation lives in [`k8s`], an in-memory one with an
//! optional deletion lag in [`memory`].

pub mod k8s;
pub mod memory;

use std::fmt;

use kube::ResourceExt;
use async_trait::async_trait;

use crate::crd::cluster_deployment::ClusterDeployment;

pub use self::k8s::KubeStore;
pub use self::memory::MemoryStore;

pub const DEFAULT_NAMESPACE: &str = "default";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Item already exists: {0}")]
    AlreadyExists(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Identity of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn of(cd: &ClusterDeployment) -> Self {
        Self {
            namespace: cd
                .namespace()
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            name: cd.name_any(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Create the object. Duplicate creation must surface as
    /// [`StoreError::AlreadyExists`].
    async fn create(&self, cd: &ClusterDeployment) -> StoreResult<()>;

    /// Delete the object. A missing object must surface as
    /// [`StoreError::NotFound`].
    async fn delete(&self, key: &ObjectKey) -> StoreResult<()>;

    /// Fresh read of the object; `Ok(None)` when it does not exist.
    async fn get(&self, key: &ObjectKey)
    -> StoreResult<Option<ClusterDeployment>>;
}
