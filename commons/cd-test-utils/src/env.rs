//! Process environment helpers for tests.
//!
//! Every mutation returns a guard that puts the previous value back on drop.
//! Tests touching the environment should also be `#[serial]`.

pub struct EnvGuard {
    key: String,
    prev: Option<String>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        apply(&self.key, self.prev.as_deref());
    }
}

fn apply(key: &str, val: Option<&str>) {
    unsafe {
        match val {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }
}

fn guarded(key: &str, val: Option<&str>) -> EnvGuard {
    let prev = std::env::var(key).ok();
    apply(key, val);
    EnvGuard {
        key: key.to_string(),
        prev,
    }
}

pub fn set_env_guarded(key: &str, val: &str) -> EnvGuard {
    guarded(key, Some(val))
}

/// Unset `key` for the guard's lifetime.
pub fn unset_env_guarded(key: &str) -> EnvGuard {
    guarded(key, None)
}

/// Chainable collection of guards, e.g. the variables a hosted
/// control-plane template expects.
#[derive(Default)]
pub struct Env {
    guards: Vec<EnvGuard>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, val: &str) -> Self {
        self.guards.push(set_env_guarded(key, val));
        self
    }

    pub fn unset(mut self, key: &str) -> Self {
        self.guards.push(unset_env_guarded(key));
        self
    }
}

impl Drop for Env {
    // Restore in reverse so a key touched twice ends at its first value.
    fn drop(&mut self) {
        while let Some(g) = self.guards.pop() {
            drop(g);
        }
    }
}
