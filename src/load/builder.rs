// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Builder for layered config loading.

use super::{load_files_with_env, load_readers_with_env, Loaded};
use crate::env::{EnvLookup, EnvOverrides, ProcessEnv};
use crate::error::Result;
use crate::resolve::SearchPaths;
use crate::tree::ConfigTree;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;

/// Collects sources, search paths and environment overrides, then loads.
///
/// ```no_run
/// use tomlstack::ConfigStack;
///
/// let loaded = ConfigStack::new()
///     .file("app.toml")
///     .file("app.local.toml")
///     .search_path("")
///     .search_path("/etc/app")
///     .env("DATABASE_HOST", "database.host")
///     .load()
///     .unwrap();
///
/// println!("{}", loaded.config);
/// ```
pub struct ConfigStack {
    filenames: Vec<PathBuf>,
    search_paths: SearchPaths,
    env_overrides: EnvOverrides,
    env: Box<dyn EnvLookup>,
}

impl ConfigStack {
    /// Create an empty stack that reads the process environment.
    pub fn new() -> Self {
        Self {
            filenames: Vec::new(),
            search_paths: SearchPaths::new(),
            env_overrides: EnvOverrides::new(),
            env: Box::new(ProcessEnv),
        }
    }

    /// Add a logical filename. The first one added is the primary config.
    pub fn file(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filenames.push(filename.into());
        self
    }

    /// Add several logical filenames, in order.
    pub fn files<I, P>(mut self, filenames: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.filenames.extend(filenames.into_iter().map(Into::into));
        self
    }

    /// Add a search path prefix. `""` uses filenames as-is.
    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path);
        self
    }

    /// Replace the search path list.
    pub fn search_paths(mut self, search_paths: impl Into<SearchPaths>) -> Self {
        self.search_paths = search_paths.into();
        self
    }

    /// Map an environment variable onto a dotted config key.
    pub fn env(mut self, var: impl Into<String>, key: impl Into<String>) -> Self {
        self.env_overrides.insert(var, key);
        self
    }

    /// Replace the environment override map.
    pub fn env_overrides(mut self, overrides: impl Into<EnvOverrides>) -> Self {
        self.env_overrides = overrides.into();
        self
    }

    /// Read environment values from `lookup` instead of the process environment.
    pub fn env_lookup(mut self, lookup: impl EnvLookup + 'static) -> Self {
        self.env = Box::new(lookup);
        self
    }

    /// Resolve the configured files and merge them.
    pub fn load(&self) -> Result<Loaded> {
        load_files_with_env(
            self.filenames.as_slice(),
            &self.search_paths,
            &self.env_overrides,
            self.env.as_ref(),
        )
    }

    /// Merge already-open readers instead of files. `None` marks an absent
    /// source. Filenames and search paths are ignored.
    pub fn load_readers<R: Read>(&self, readers: Vec<Option<R>>) -> Result<ConfigTree> {
        load_readers_with_env(readers, &self.env_overrides, self.env.as_ref())
    }
}

impl Default for ConfigStack {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConfigStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStack")
            .field("filenames", &self.filenames)
            .field("search_paths", &self.search_paths)
            .field("env_overrides", &self.env_overrides)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LoadError, StackError};
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_builder_loads_files_with_injected_env() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.toml"), "[database]\nhost = \"localhost\"\nport = 5432").unwrap();
        fs::write(dir.path().join("app.local.toml"), "[database]\nport = 6543").unwrap();

        let loaded = ConfigStack::new()
            .files(["app.toml", "app.local.toml", "app.missing.toml"])
            .search_path(dir.path())
            .env("DATABASE_HOST", "database.host")
            .env_lookup(env(&[("DATABASE_HOST", "db.internal")]))
            .load()
            .unwrap();

        assert_eq!(loaded.config.get_str("database.host"), Some("db.internal"));
        assert_eq!(loaded.config.get_integer("database.port"), Some(6543));
        assert_eq!(
            loaded.files_used,
            vec![
                Some(dir.path().join("app.toml")),
                Some(dir.path().join("app.local.toml")),
                None,
            ]
        );
    }

    #[test]
    fn test_builder_without_files_fails() {
        let err = ConfigStack::new().load().unwrap_err();
        assert!(matches!(err, StackError::Load(LoadError::NoSources)));
    }

    #[test]
    fn test_builder_load_readers() {
        let config = ConfigStack::new()
            .env_overrides([("NAME", "name")])
            .env_lookup(|name: &str| (name == "NAME").then(|| "from-env".to_string()))
            .load_readers(vec![Some("name = \"file\"\nother = 1".as_bytes())])
            .unwrap();

        assert_eq!(config.get_str("name"), Some("from-env"));
        assert_eq!(config.get_integer("other"), Some(1));
    }

    #[test]
    fn test_debug_lists_sources_and_overrides() {
        let stack = ConfigStack::new().file("app.toml").env("SECRET", "secret");
        let rendered = format!("{:?}", stack);
        assert!(rendered.contains("app.toml"));
        assert!(rendered.contains("SECRET"));
    }
}
