// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! The merged configuration tree.
//!
//! A thin wrapper around a TOML table that adds dotted-path access, deep
//! merging and typed extraction.

mod key;
mod merge;

pub use key::KeyPath;
pub use merge::{deep_merge, deep_merge_all};

use crate::error::{KeyError, LoadError, Result, StackError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use toml::{Table, Value};

/// A hierarchical configuration, addressed with dotted key paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree {
    table: Table,
}

impl ConfigTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing table.
    pub fn from_table(table: Table) -> Self {
        Self { table }
    }

    /// Parse TOML text. `name` identifies the source in errors.
    pub fn parse(name: &str, content: &str) -> Result<Self> {
        let table = content.parse::<Table>().map_err(|e| LoadError::ParseFailed {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { table })
    }

    /// Look up a value by dotted key path.
    ///
    /// Invalid key paths never match.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let path = KeyPath::parse(key).ok()?;
        self.get_path(&path)
    }

    /// Look up a value by parsed key path.
    pub fn get_path(&self, path: &KeyPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let mut value = self.table.get(first)?;
        for segment in rest {
            value = value.as_table()?.get(segment)?;
        }
        Some(value)
    }

    /// Look up a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Look up an integer value.
    pub fn get_integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_integer)
    }

    /// Look up a boolean value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Whether a value exists at the key path.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a value at a dotted key path, creating intermediate tables.
    ///
    /// An existing leaf is replaced. Fails if an intermediate segment holds
    /// a value that is not a table.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> std::result::Result<(), KeyError> {
        let path = KeyPath::parse(key)?;
        self.set_path(&path, value.into())
    }

    /// Set a value at a parsed key path.
    pub fn set_path(&mut self, path: &KeyPath, value: Value) -> std::result::Result<(), KeyError> {
        let (last, parents) = path.segments().split_last().ok_or(KeyError::Empty)?;

        let mut table = &mut self.table;
        for (depth, segment) in parents.iter().enumerate() {
            let next = table
                .entry(segment.clone())
                .or_insert(Value::Table(Table::new()));
            table = match next {
                Value::Table(next) => next,
                _ => {
                    return Err(KeyError::NotATable {
                        key: path.to_string(),
                        segment: path.prefix(depth + 1),
                    });
                }
            };
        }

        table.insert(last.clone(), value);
        Ok(())
    }

    /// Remove and return the value at a dotted key path.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let path = KeyPath::parse(key).ok()?;
        let (last, parents) = path.segments().split_last()?;

        let mut table = &mut self.table;
        for segment in parents {
            table = table.get_mut(segment)?.as_table_mut()?;
        }
        table.remove(last)
    }

    /// Deep-merge `overlay` on top of this tree. The overlay wins on conflicts.
    pub fn merge(&mut self, overlay: ConfigTree) {
        deep_merge(&mut self.table, overlay.table);
    }

    /// Deserialize the value at `key` into `T`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };

        value
            .clone()
            .try_into()
            .map(Some)
            .map_err(|e| StackError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    /// Deserialize the whole tree into `T`.
    pub fn try_deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Value::Table(self.table.clone())
            .try_into()
            .map_err(|e| StackError::InvalidConfig {
                message: e.to_string(),
            })
    }

    /// Render the tree as TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(&self.table).map_err(|e| StackError::Serialize {
            message: e.to_string(),
        })
    }

    /// Top-level keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    /// Whether the tree has no keys.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn as_table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }
}

impl From<Table> for ConfigTree {
    fn from(table: Table) -> Self {
        Self::from_table(table)
    }
}

impl From<ConfigTree> for Table {
    fn from(tree: ConfigTree) -> Self {
        tree.table
    }
}

impl FromStr for ConfigTree {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse("<string>", s)
    }
}

impl fmt::Display for ConfigTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = toml::to_string(&self.table).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}
