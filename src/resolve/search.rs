// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Search path lists.

use std::path::{Path, PathBuf};

/// Ordered directory prefixes tried for every logical filename.
///
/// An empty entry means "use the filename as-is", so absolute or
/// cwd-relative filenames can be given directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths {
    paths: Vec<PathBuf>,
}

impl SearchPaths {
    /// Create an empty list. Resolving against it behaves like [`as_is`](Self::as_is).
    pub fn new() -> Self {
        Self::default()
    }

    /// A single empty prefix: filenames are used unmodified.
    pub fn as_is() -> Self {
        Self {
            paths: vec![PathBuf::new()],
        }
    }

    /// The conventional lookup order for an application: the current
    /// directory, the user's home directory, then `<config dir>/<app_name>`.
    pub fn standard(app_name: &str) -> Self {
        let mut paths = vec![PathBuf::new()];

        if let Some(home) = dirs::home_dir() {
            paths.push(home);
        }

        // XDG config directory on Linux, Application Support on macOS
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(app_name));
        }

        Self { paths }
    }

    /// Append a prefix.
    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Human-readable list for error messages.
    pub(crate) fn describe(&self) -> String {
        self.iter()
            .map(|p| {
                if p.as_os_str().is_empty() {
                    ".".to_string()
                } else {
                    p.display().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for SearchPaths {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<P: Into<PathBuf>> From<Vec<P>> for SearchPaths {
    fn from(paths: Vec<P>) -> Self {
        paths.into_iter().collect()
    }
}

impl<P: Into<PathBuf>, const N: usize> From<[P; N]> for SearchPaths {
    fn from(paths: [P; N]) -> Self {
        paths.into_iter().collect()
    }
}
