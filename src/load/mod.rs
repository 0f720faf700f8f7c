// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Loading and merging of layered config sources.
//!
//! Sources are parsed in order and folded with [`deep_merge_all`](crate::tree::deep_merge_all),
//! so later sources override earlier ones. Environment overrides are merged
//! last and win over every file.

mod builder;

pub use builder::ConfigStack;

use crate::env::{EnvLookup, EnvOverrides, ProcessEnv};
use crate::error::{LoadError, Result};
use crate::resolve::{resolve_sources, FilesUsed, SearchPaths};
use crate::tree::{deep_merge_all, ConfigTree};
use std::io::Read;
use std::path::Path;

/// The result of loading from files.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    /// The merged configuration.
    pub config: ConfigTree,
    /// The path used for each logical filename, `None` where an optional
    /// file was not found.
    pub files_used: FilesUsed,
}

/// Load and merge config files found across search paths.
///
/// The first filename is the primary config and must exist; later files are
/// optional and override earlier ones. `env_overrides` is applied last from
/// the process environment.
pub fn load_from_files<P: AsRef<Path>>(
    filenames: &[P],
    search_paths: &SearchPaths,
    env_overrides: &EnvOverrides,
) -> Result<Loaded> {
    load_files_with_env(filenames, search_paths, env_overrides, &ProcessEnv)
}

/// Load and merge already-open readers, in order.
///
/// `None` entries stand for absent sources and are skipped. Readers are named
/// `reader#<index>` in errors.
pub fn load_from_readers<R: Read>(
    readers: Vec<Option<R>>,
    env_overrides: &EnvOverrides,
) -> Result<ConfigTree> {
    load_readers_with_env(readers, env_overrides, &ProcessEnv)
}

pub(crate) fn load_files_with_env<P: AsRef<Path>>(
    filenames: &[P],
    search_paths: &SearchPaths,
    env_overrides: &EnvOverrides,
    env: &dyn EnvLookup,
) -> Result<Loaded> {
    let resolved = resolve_sources(filenames, search_paths)?;
    let files_used = resolved.files_used();
    let config = load_sources(resolved.into_readers(), env_overrides, env)?;

    Ok(Loaded { config, files_used })
}

pub(crate) fn load_readers_with_env<R: Read>(
    readers: Vec<Option<R>>,
    env_overrides: &EnvOverrides,
    env: &dyn EnvLookup,
) -> Result<ConfigTree> {
    let sources = readers
        .into_iter()
        .enumerate()
        .map(|(index, reader)| (format!("reader#{}", index), reader))
        .collect();

    load_sources(sources, env_overrides, env)
}

/// Parse and fold named sources, then apply environment overrides.
///
/// Every reader is dropped before this returns, on success or failure.
pub fn load_sources<R: Read>(
    sources: Vec<(String, Option<R>)>,
    env_overrides: &EnvOverrides,
    env: &dyn EnvLookup,
) -> Result<ConfigTree> {
    if sources.is_empty() {
        return Err(LoadError::NoSources.into());
    }

    let mut tables = Vec::with_capacity(sources.len());

    for (name, reader) in sources {
        let Some(mut reader) = reader else {
            tracing::debug!("Skipping absent source {}", name);
            continue;
        };

        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|source| LoadError::ReadFailed {
                name: name.clone(),
                source,
            })?;
        drop(reader);

        let tree = ConfigTree::parse(&name, &content)?;
        tracing::debug!("Loaded config from {}", name);
        tables.push(tree.into_table());
    }

    let mut config = deep_merge_all(tables)
        .map(ConfigTree::from)
        .ok_or(LoadError::EmptyResult)?;

    if !env_overrides.is_empty() {
        let env_tree = env_overrides.to_tree(env)?;
        config.merge(env_tree);
    }

    Ok(config)
}
