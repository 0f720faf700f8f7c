// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Error types for tomlstack.
//!
//! Every failure names the sub-step that failed (resolution, loading, key
//! handling) and the offending source, variable, or key.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for tomlstack operations.
#[derive(Error, Debug)]
pub enum StackError {
    // File resolution errors
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    // Read, parse and merge errors
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    // Dotted key errors
    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    // Typed extraction of a single key
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    // Typed extraction of the whole tree
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to render configuration as TOML: {message}")]
    Serialize { message: String },
}

/// Errors raised while locating configuration files.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Primary config file must exist: {filename} (searched: {searched})")]
    PrimaryMissing { filename: String, searched: String },

    #[error("Failed to open config file {}: {source}", .path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while reading, parsing and merging sources.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("At least one source required")]
    NoSources,

    #[error("Failed to read {name}: {source}")]
    ReadFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML from {name}: {message}")]
    ParseFailed { name: String, message: String },

    #[error("Invalid environment override for {var}: {source}")]
    EnvOverride {
        var: String,
        #[source]
        source: KeyError,
    },

    #[error("Environment override {var} collides with another override at '{key}'")]
    EnvConflict { var: String, key: String },

    #[error("Load resulted in an empty config: no source was present")]
    EmptyResult,
}

/// Errors raised by dotted key paths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Key path is empty")]
    Empty,

    #[error("Key path '{key}' contains an empty segment")]
    EmptySegment { key: String },

    #[error("Key path '{key}' is malformed: {message}")]
    Malformed { key: String, message: String },

    #[error("Cannot set '{key}': '{segment}' is not a table")]
    NotATable { key: String, segment: String },
}

/// Result type alias for tomlstack operations.
pub type Result<T> = std::result::Result<T, StackError>;
