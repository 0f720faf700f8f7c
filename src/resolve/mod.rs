// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Config file resolution.
//!
//! Each logical filename is looked up in every search path, in order, and the
//! first file that opens wins. The first filename is the primary config and
//! must exist; the rest are optional overrides.

mod search;

pub use search::SearchPaths;

use crate::error::{LoadError, ResolveError, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Concrete paths used per logical filename; `None` for a missing optional file.
pub type FilesUsed = Vec<Option<PathBuf>>;

/// One logical filename and the file it resolved to, if any.
#[derive(Debug)]
pub struct ResolvedSource {
    /// The logical filename as requested.
    pub filename: PathBuf,
    /// The path the file was opened from.
    pub path: Option<PathBuf>,
    file: Option<File>,
}

impl ResolvedSource {
    /// Name used to identify this source in errors.
    pub fn name(&self) -> String {
        self.path
            .as_deref()
            .unwrap_or(&self.filename)
            .display()
            .to_string()
    }

    /// Whether a file was found.
    pub fn is_found(&self) -> bool {
        self.file.is_some()
    }
}

/// Open handles for every logical filename, parallel to the input list.
///
/// Handles are closed when this value (or the readers taken from it) is
/// dropped.
#[derive(Debug)]
pub struct ResolvedSources {
    sources: Vec<ResolvedSource>,
}

impl ResolvedSources {
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedSource> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The concrete path used for each logical filename.
    pub fn files_used(&self) -> FilesUsed {
        self.sources.iter().map(|s| s.path.clone()).collect()
    }

    /// Consume into `(name, reader)` pairs; missing optional files yield `None`.
    pub fn into_readers(self) -> Vec<(String, Option<File>)> {
        self.sources
            .into_iter()
            .map(|source| {
                let name = source.name();
                (name, source.file)
            })
            .collect()
    }
}

/// Resolve and open each logical filename against the search paths.
///
/// A "not found" error moves on to the next search path. Any other open
/// error is fatal, and files opened so far are closed before returning.
/// An empty search path list is treated as [`SearchPaths::as_is`].
pub fn resolve_sources<P: AsRef<Path>>(
    filenames: &[P],
    search_paths: &SearchPaths,
) -> Result<ResolvedSources> {
    if filenames.is_empty() {
        return Err(LoadError::NoSources.into());
    }

    let as_is;
    let search_paths = if search_paths.is_empty() {
        as_is = SearchPaths::as_is();
        &as_is
    } else {
        search_paths
    };

    let mut sources = Vec::with_capacity(filenames.len());

    for (index, filename) in filenames.iter().enumerate() {
        let filename = filename.as_ref();

        let (path, file) = match find_first(filename, search_paths)? {
            Some((path, file)) => {
                tracing::debug!("Resolved {} to {}", filename.display(), path.display());
                (Some(path), Some(file))
            }
            None if index == 0 => {
                return Err(ResolveError::PrimaryMissing {
                    filename: filename.display().to_string(),
                    searched: search_paths.describe(),
                }
                .into());
            }
            None => {
                tracing::debug!(
                    "Optional config file {} not found, skipping",
                    filename.display()
                );
                (None, None)
            }
        };

        sources.push(ResolvedSource {
            filename: filename.to_path_buf(),
            path,
            file,
        });
    }

    Ok(ResolvedSources { sources })
}

fn find_first(
    filename: &Path,
    search_paths: &SearchPaths,
) -> std::result::Result<Option<(PathBuf, File)>, ResolveError> {
    for prefix in search_paths.iter() {
        let candidate = prefix.join(filename);

        match File::open(&candidate) {
            Ok(file) => return Ok(Some((candidate, file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::trace!("No config file at {}", candidate.display());
            }
            Err(source) => {
                return Err(ResolveError::OpenFailed {
                    path: candidate,
                    source,
                });
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StackError;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_first_matching_search_path_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write(first.path(), "app.toml", "a = 1");
        write(second.path(), "app.toml", "a = 2");

        let paths = SearchPaths::from([first.path(), second.path()]);
        let resolved = resolve_sources(&["app.toml"], &paths).unwrap();

        assert_eq!(resolved.files_used(), vec![Some(first.path().join("app.toml"))]);
    }

    #[test]
    fn test_skips_missing_search_paths() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app.toml", "a = 1");

        let paths = SearchPaths::from([dir.path().join("nope"), dir.path().to_path_buf()]);
        let resolved = resolve_sources(&["app.toml"], &paths).unwrap();

        assert_eq!(resolved.files_used(), vec![Some(dir.path().join("app.toml"))]);
    }

    #[test]
    fn test_missing_optional_file_is_none() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app.toml", "a = 1");

        let paths = SearchPaths::from([dir.path()]);
        let resolved = resolve_sources(&["app.toml", "app.local.toml"], &paths).unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved.files_used()[1], None);
        let readers = resolved.into_readers();
        assert!(readers[0].1.is_some());
        assert!(readers[1].1.is_none());
        assert_eq!(readers[1].0, "app.local.toml");
    }

    #[test]
    fn test_missing_primary_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app.local.toml", "a = 1");

        let paths = SearchPaths::from([dir.path()]);
        let err = resolve_sources(&["app.toml", "app.local.toml"], &paths).unwrap_err();

        match err {
            StackError::Resolve(ResolveError::PrimaryMissing { filename, .. }) => {
                assert_eq!(filename, "app.toml");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_filenames_fails() {
        let filenames: [&str; 0] = [];
        let err = resolve_sources(&filenames, &SearchPaths::as_is()).unwrap_err();
        assert!(matches!(err, StackError::Load(LoadError::NoSources)));
    }

    #[test]
    fn test_absolute_filename_with_as_is() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app.toml", "a = 1");
        let absolute = dir.path().join("app.toml");

        let resolved = resolve_sources(&[&absolute], &SearchPaths::new()).unwrap();
        assert_eq!(resolved.files_used(), vec![Some(absolute)]);
    }

    #[test]
    fn test_non_not_found_error_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app.toml", "a = 1");
        // A regular file used as a directory fails with ENOTDIR, not ENOENT.
        write(dir.path(), "blocker", "");

        let paths = SearchPaths::from([dir.path().join("blocker"), dir.path().to_path_buf()]);
        let err = resolve_sources(&["app.toml"], &paths).unwrap_err();

        match err {
            StackError::Resolve(ResolveError::OpenFailed { path, .. }) => {
                assert_eq!(path, dir.path().join("blocker").join("app.toml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_source_name_prefers_resolved_path() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app.toml", "a = 1");

        let paths = SearchPaths::from([dir.path()]);
        let resolved = resolve_sources(&["app.toml", "other.toml"], &paths).unwrap();
        let names: Vec<String> = resolved.iter().map(ResolvedSource::name).collect();

        assert_eq!(names[0], dir.path().join("app.toml").display().to_string());
        assert_eq!(names[1], "other.toml");
        assert!(resolved.iter().next().unwrap().is_found());
    }
}
