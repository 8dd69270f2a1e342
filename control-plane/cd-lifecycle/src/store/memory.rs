use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ObjectKey, ResourceStore, StoreError, StoreResult};
use crate::crd::cluster_deployment::{ClusterDeployment, Condition};

#[derive(Clone)]
struct Entry {
    object: ClusterDeployment,
    // Remaining reads that still observe the object after a delete call.
    terminating: Option<usize>,
}

/// In-process store. Deleted objects can be kept visible for a number of
/// reads to mimic finalizers on a real API server.
#[derive(Clone, Default)]
pub struct MemoryStore {
    store: Arc<RwLock<HashMap<ObjectKey, Entry>>>,
    deletion_lag: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects stay visible to `get` for `reads` reads after deletion.
    pub fn with_deletion_lag(mut self, reads: usize) -> Self {
        self.deletion_lag = reads;
        self
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Replace the reported conditions of a stored object, standing in for
    /// the controllers that would normally write status.
    pub async fn set_conditions(
        &self,
        key: &ObjectKey,
        conditions: Vec<Condition>,
    ) -> StoreResult<()> {
        let mut store = self.store.write().await;
        let entry = store
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        let status = entry.object.status.get_or_insert_with(Default::default);
        status.conditions = Some(conditions);
        Ok(())
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn create(&self, cd: &ClusterDeployment) -> StoreResult<()> {
        let key = ObjectKey::of(cd);
        let mut store = self.store.write().await;
        if store.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }
        store.insert(
            key,
            Entry {
                object: cd.clone(),
                terminating: None,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &ObjectKey) -> StoreResult<()> {
        let mut store = self.store.write().await;
        let Some(entry) = store.get_mut(key) else {
            return Err(StoreError::NotFound(key.to_string()));
        };
        if entry.terminating.is_none() {
            if self.deletion_lag == 0 {
                store.remove(key);
            } else {
                entry.terminating = Some(self.deletion_lag);
            }
        }
        Ok(())
    }

    async fn get(
        &self,
        key: &ObjectKey,
    ) -> StoreResult<Option<ClusterDeployment>> {
        let mut store = self.store.write().await;
        let Some(entry) = store.get_mut(key) else {
            return Ok(None);
        };
        match entry.terminating {
            Some(0) => {
                store.remove(key);
                Ok(None)
            }
            Some(n) => {
                entry.terminating = Some(n - 1);
                Ok(Some(entry.object.clone()))
            }
            None => Ok(Some(entry.object.clone())),
        }
    }
}
