// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! tomlstack - layered TOML configuration
//!
//! Loads a primary config file plus optional override files, deep-merges
//! them in order, then applies environment variable overrides onto dotted
//! keys.
//!
//! # Precedence
//!
//! - Later files override earlier files.
//! - Environment overrides beat every file.
//! - Tables merge recursively; scalars and arrays are replaced.
//!
//! # Example
//!
//! ```no_run
//! use tomlstack::{load_from_files, EnvOverrides, SearchPaths};
//!
//! let overrides = EnvOverrides::new().with("DATABASE_HOST", "database.host");
//! let loaded = load_from_files(
//!     &["app.toml", "app.local.toml"],
//!     &SearchPaths::from(["", "/etc/app"]),
//!     &overrides,
//! )
//! .unwrap();
//!
//! let host = loaded.config.get_str("database.host");
//! println!("database host: {:?}, files: {:?}", host, loaded.files_used);
//! ```

// Module declarations
pub mod env;
pub mod error;
pub mod load;
pub mod resolve;
pub mod tree;

// Re-exports for convenience
pub use env::{EnvLookup, EnvOverrides, ProcessEnv};
pub use error::{StackError, Result};
pub use load::{load_from_files, load_from_readers, ConfigStack, Loaded};
pub use resolve::{FilesUsed, SearchPaths};
pub use tree::{ConfigTree, KeyPath};
