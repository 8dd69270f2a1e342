#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use cd_lifecycle::store::MemoryStore;
use cd_lifecycle::{ClusterDeployment, ObjectKey, ResourceStore, StoreError, StoreResult};

/// Store wrapper whose failures are scripted up front, with call counters.
#[derive(Default)]
pub struct ScriptedStore {
    pub inner: MemoryStore,
    fail_creates: AtomicUsize,
    delete_error: Mutex<Option<String>>,
    stuck: AtomicBool,
    get_error: Mutex<Option<String>>,
    pub creates: AtomicUsize,
    pub deletes: AtomicUsize,
    pub gets: AtomicUsize,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `n` creates fail with a connection error.
    pub fn failing_creates(self, n: usize) -> Self {
        self.fail_creates.store(n, Ordering::SeqCst);
        self
    }

    /// Every delete fails with a backend error carrying `msg`.
    pub fn failing_deletes(self, msg: &str) -> Self {
        *self.delete_error.lock().unwrap() = Some(msg.to_string());
        self
    }

    /// Deletes are accepted but the object never goes away.
    pub fn stuck_deletes(self) -> Self {
        self.stuck.store(true, Ordering::SeqCst);
        self
    }

    /// Every read fails with a connection error carrying `msg`.
    pub fn failing_gets(self, msg: &str) -> Self {
        *self.get_error.lock().unwrap() = Some(msg.to_string());
        self
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceStore for ScriptedStore {
    async fn create(&self, cd: &ClusterDeployment) -> StoreResult<()> {
        let n = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        let remaining = self.fail_creates.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_creates.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Connection(format!("create attempt {n} refused")));
        }
        self.inner.create(cd).await
    }

    async fn delete(&self, key: &ObjectKey) -> StoreResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = self.delete_error.lock().unwrap().clone() {
            return Err(StoreError::Backend(msg));
        }
        if self.stuck.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.inner.delete(key).await
    }

    async fn get(&self, key: &ObjectKey) -> StoreResult<Option<ClusterDeployment>> {
        let n = self.gets.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(msg) = self.get_error.lock().unwrap().clone() {
            return Err(StoreError::Connection(format!("{msg} (read {n})")));
        }
        self.inner.get(key).await
    }
}
