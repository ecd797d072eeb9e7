//! Multi-root directory walker producing candidate file paths.
//!
//! # Overview
//!
//! The walker enumerates regular files under each root in a deterministic
//! (sorted) order. It owns all of the traversal policy:
//!
//! - a root that is a symbolic link is never traversed and produces a
//!   warning item distinguishing a broken link from a live one;
//! - a root that does not exist produces a warning item, unless
//!   `ignore_missing` is set, in which case it is skipped silently;
//! - a root that is a regular file is a single candidate;
//! - during descent, directories whose basename is in the ignored set are
//!   pruned, symbolic links are skipped silently, and entries that vanish
//!   mid-listing are skipped silently.
//!
//! Anomalies are yielded as `Err` items rather than stopping iteration, so
//! a single unreadable directory never aborts the scan.
//!
//! # Example
//!
//! ```no_run
//! use dupescout::scanner::{WalkOptions, Walker};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from(".")], WalkOptions::default());
//! for item in walker.walk() {
//!     match item {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("warning: {e}"),
//!     }
//! }
//! ```

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::iter;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::ScanError;

/// Traversal policy for a [`Walker`].
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Directory basenames never descended into.
    pub ignore_dirs: HashSet<OsString>,

    /// Skip nonexistent roots silently instead of warning.
    pub ignore_missing: bool,
}

/// Enumerates candidate files under a list of roots.
#[derive(Debug)]
pub struct Walker {
    roots: Vec<PathBuf>,
    options: WalkOptions,
}

impl Walker {
    /// Create a walker over the given roots.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, options: WalkOptions) -> Self {
        Self { roots, options }
    }

    /// Walk all roots, yielding candidate paths and warning items.
    ///
    /// Candidate order is deterministic for a fixed tree: roots in the
    /// order given, directory entries in sorted name order.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        self.roots.iter().flat_map(move |root| self.walk_root(root))
    }

    /// Walk a single root according to its type.
    fn walk_root<'a>(
        &'a self,
        root: &'a Path,
    ) -> Box<dyn Iterator<Item = Result<PathBuf, ScanError>> + 'a> {
        let metadata = match fs::symlink_metadata(root) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if self.options.ignore_missing {
                    log::debug!("ignoring missing root: {}", root.display());
                    return Box::new(iter::empty());
                }
                return Box::new(iter::once(Err(ScanError::MissingRoot(root.to_path_buf()))));
            }
            Err(e) => {
                return Box::new(iter::once(Err(ScanError::Io {
                    path: root.to_path_buf(),
                    source: e,
                })));
            }
        };

        if metadata.file_type().is_symlink() {
            // Roots are the only place a symlink warns; descendants skip silently.
            let err = if fs::metadata(root).is_ok() {
                ScanError::SymlinkRoot(root.to_path_buf())
            } else {
                ScanError::BrokenSymlinkRoot(root.to_path_buf())
            };
            return Box::new(iter::once(Err(err)));
        }

        if metadata.is_file() {
            return Box::new(iter::once(Ok(root.to_path_buf())));
        }

        if !metadata.is_dir() {
            log::debug!("skipping non-regular root: {}", root.display());
            return Box::new(iter::empty());
        }

        let ignore_dirs = &self.options.ignore_dirs;
        let entries = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                match entry.path().file_name() {
                    Some(name) if ignore_dirs.contains(name) => {
                        log::debug!("pruning ignored directory: {}", entry.path().display());
                        false
                    }
                    _ => true,
                }
            })
            .filter_map(move |item| match item {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_file() && !file_type.is_symlink() {
                        Some(Ok(entry.into_path()))
                    } else {
                        None
                    }
                }
                Err(e) => {
                    // Entries that vanish between listing and lookup are
                    // expected under concurrent mutation.
                    if e.io_error().is_some_and(|io| io.kind() == ErrorKind::NotFound) {
                        return None;
                    }
                    let path = e
                        .path()
                        .map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                    Some(Err(ScanError::Io { path, source }))
                }
            });
        Box::new(entries)
    }
}
