// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Deep merge of TOML tables.
//!
//! The overlay wins: tables are merged recursively, every other value
//! (scalars, arrays, and table/scalar type changes) is replaced by the
//! overlay's. Keys only present in the base are kept.

use toml::{Table, Value};

/// Merge `overlay` into `base`, with `overlay` taking precedence.
pub fn deep_merge(base: &mut Table, overlay: Table) {
    for (key, overlay_value) in overlay {
        match overlay_value {
            Value::Table(overlay_table) => {
                if let Some(Value::Table(base_table)) = base.get_mut(&key) {
                    deep_merge(base_table, overlay_table);
                } else {
                    base.insert(key, Value::Table(overlay_table));
                }
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}

/// Merge tables in order, with later tables taking precedence.
///
/// Returns `None` when the iterator is empty.
pub fn deep_merge_all(tables: impl IntoIterator<Item = Table>) -> Option<Table> {
    tables.into_iter().fold(None, |acc, table| match acc {
        None => Some(table),
        Some(mut merged) => {
            deep_merge(&mut merged, table);
            Some(merged)
        }
    })
}
