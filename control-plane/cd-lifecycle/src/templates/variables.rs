use std::collections::{BTreeMap, HashMap};

/// Key/value lookup feeding both precondition checks and substitution.
pub trait VariableSource {
    fn get(&self, key: &str) -> Option<String>;

    /// Present and non-empty.
    fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }
}

/// The process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl VariableSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl VariableSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

impl VariableSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Explicit variables, optionally layered over a fallback source.
#[derive(Clone, Debug, Default)]
pub struct VariableSet {
    vars: BTreeMap<String, String>,
    inherit_env: bool,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variables not set explicitly fall back to the process environment.
    pub fn from_env() -> Self {
        Self {
            vars: BTreeMap::new(),
            inherit_env: true,
        }
    }

    pub fn with(mut self, key: impl Into<String>, val: impl Into<String>) -> Self {
        self.insert(key, val);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    pub fn extend<K, V, I>(mut self, kvs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in kvs {
            self.insert(k, v);
        }
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        VariableSet::new().extend(iter)
    }
}

impl VariableSource for VariableSet {
    fn get(&self, key: &str) -> Option<String> {
        match self.vars.get(key) {
            Some(v) => Some(v.clone()),
            None if self.inherit_env => ProcessEnv.get(key),
            None => None,
        }
    }
}

/// Overrides consulted before a base source.
pub struct Layered<'a> {
    pub overrides: &'a VariableSet,
    pub base: &'a dyn VariableSource,
}

impl VariableSource for Layered<'_> {
    fn get(&self, key: &str) -> Option<String> {
        self.overrides
            .vars
            .get(key)
            .cloned()
            .or_else(|| self.base.get(key))
    }
}
