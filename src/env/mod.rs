// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Environment variable overrides.
//!
//! An [`EnvOverrides`] maps variable names to dotted config keys, for example
//! `DATABASE_HOST -> database.host`. Variables are read through an
//! [`EnvLookup`] so callers and tests can supply their own environment.

use crate::error::LoadError;
use crate::tree::{ConfigTree, KeyPath};
use std::collections::{BTreeMap, HashMap};
use toml::Value;

/// Source of environment variable values.
pub trait EnvLookup {
    /// Return the value of `name`, or `None` if it is not set.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads the current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        match std::env::var(name) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                tracing::warn!("Ignoring environment variable {}: value is not valid Unicode", name);
                None
            }
        }
    }
}

impl<S: std::hash::BuildHasher> EnvLookup for HashMap<String, String, S> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvLookup for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<F> EnvLookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// A single mapping from an environment variable to a config key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverride {
    /// Environment variable name.
    pub var: String,
    /// Dotted config key the value is written to.
    pub key: String,
}

/// Ordered environment variable to config key mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    entries: Vec<EnvOverride>,
}

impl EnvOverrides {
    /// Create an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `var` onto the dotted config `key`.
    pub fn insert(&mut self, var: impl Into<String>, key: impl Into<String>) {
        self.entries.push(EnvOverride {
            var: var.into(),
            key: key.into(),
        });
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, var: impl Into<String>, key: impl Into<String>) -> Self {
        self.insert(var, key);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnvOverride> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a tree holding the value of every override whose variable is set.
    ///
    /// Unset variables are skipped. Fails on an invalid key path, or when two
    /// set variables target the same key or one key nests inside the other.
    pub fn to_tree(&self, env: &dyn EnvLookup) -> Result<ConfigTree, LoadError> {
        let mut tree = ConfigTree::new();
        let mut applied: Vec<KeyPath> = Vec::new();

        for entry in &self.entries {
            let Some(value) = env.lookup(&entry.var) else {
                tracing::trace!("Environment variable {} not set, skipping", entry.var);
                continue;
            };

            let path = KeyPath::parse(&entry.key).map_err(|source| LoadError::EnvOverride {
                var: entry.var.clone(),
                source,
            })?;

            if applied.iter().any(|other| other.overlaps(&path)) {
                return Err(LoadError::EnvConflict {
                    var: entry.var.clone(),
                    key: path.to_string(),
                });
            }

            tree.set_path(&path, Value::String(value))
                .map_err(|source| LoadError::EnvOverride {
                    var: entry.var.clone(),
                    source,
                })?;
            tracing::debug!("Applied environment override {} -> {}", entry.var, path);
            applied.push(path);
        }

        Ok(tree)
    }
}

impl<K, V> FromIterator<(K, V)> for EnvOverrides
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut overrides = Self::new();
        for (var, key) in iter {
            overrides.insert(var, key);
        }
        overrides
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for EnvOverrides
where
    K: Into<String> + Ord,
    V: Into<String>,
{
    /// Entries are ordered by variable name so the result never depends on
    /// hash order.
    fn from(map: HashMap<K, V, S>) -> Self {
        map.into_iter().collect::<BTreeMap<K, V>>().into()
    }
}

impl<K, V> From<BTreeMap<K, V>> for EnvOverrides
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for EnvOverrides
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
