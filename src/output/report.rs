//! Plain-text report rendering.
//!
//! # Overview
//!
//! Duplicate mode prints one block per group: a header with the full
//! fingerprint, member count and per-member size, an optional `common
//! parent` annotation when the members' literal common path prefix is a
//! real directory, and one line per member in ascending modification-time
//! order. A footer totals the redundant bytes across all printed groups,
//! counting hardlinked members once per inode.
//!
//! Groups whose members all lie under one of the configured
//! ignore-contained directories are suppressed entirely.
//!
//! Inverse mode prints the flat list of candidate paths that have no
//! duplicate, one per line, in discovery order.

use std::fmt::Write as _;
use std::fs;
use std::path::{Component, Path, PathBuf};

use bytesize::ByteSize;
use chrono::{DateTime, Local};

use super::path_text::path_text;
use crate::duplicates::DuplicateGroup;

/// Options for duplicate-mode rendering.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Suppress groups fully contained under any of these directories.
    pub ignore_contained: Vec<PathBuf>,
}

/// Renders duplicate groups as a plain-text report.
///
/// Expects the groups in final order (redundant bytes descending), as
/// produced by the finder.
#[derive(Debug)]
pub struct DuplicateReport<'a> {
    groups: &'a [DuplicateGroup],
    options: ReportOptions,
}

impl<'a> DuplicateReport<'a> {
    /// Create a report over the given groups.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], options: ReportOptions) -> Self {
        Self { groups, options }
    }

    /// Render the full report.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let mut printed = 0usize;
        let mut grand_total = 0u64;

        for group in self.groups {
            if self.is_suppressed(group) {
                log::debug!(
                    "suppressing contained group {} ({} files)",
                    group.digest_hex(),
                    group.len()
                );
                continue;
            }

            let _ = writeln!(
                out,
                "{}  {} files, {} bytes each ({})",
                group.digest_hex(),
                group.len(),
                group.size,
                ByteSize::b(group.size)
            );
            if let Some(parent) = common_parent(group) {
                let _ = writeln!(out, "  common parent: {}", path_text(&parent));
            }
            for file in &group.files {
                let modified = DateTime::<Local>::from(file.modified);
                let _ = writeln!(
                    out,
                    "  {}  inode {}  {}",
                    modified.format("%Y-%m-%d %H:%M:%S"),
                    file.inode_number(),
                    path_text(&file.path)
                );
            }
            let _ = writeln!(out);

            printed += 1;
            grand_total += group.reclaimable_bytes();
        }

        let _ = writeln!(
            out,
            "{} duplicate groups, {} redundant bytes ({})",
            printed,
            grand_total,
            ByteSize::b(grand_total)
        );
        out
    }

    /// A group is suppressed when the common ancestor of its members lies
    /// under (or is) one of the ignore-contained directories.
    fn is_suppressed(&self, group: &DuplicateGroup) -> bool {
        if self.options.ignore_contained.is_empty() {
            return false;
        }
        let absolute: Vec<PathBuf> = group
            .files
            .iter()
            .map(|file| absolute_or_self(&file.path))
            .collect();
        let Some(ancestor) = common_prefix(absolute.iter().map(PathBuf::as_path)) else {
            return false;
        };
        self.options
            .ignore_contained
            .iter()
            .any(|dir| ancestor.starts_with(absolute_or_self(dir)))
    }
}

/// Render the inverse-mode output: one path per line.
#[must_use]
pub fn inverse_text(unique: &[PathBuf]) -> String {
    let mut out = String::new();
    for path in unique {
        let _ = writeln!(out, "{}", path_text(path));
    }
    out
}

/// The members' literal common path prefix, when it is a real directory.
fn common_parent(group: &DuplicateGroup) -> Option<PathBuf> {
    let prefix = common_prefix(group.files.iter().map(|file| file.path.as_path()))?;
    match fs::metadata(&prefix) {
        Ok(metadata) if metadata.is_dir() => Some(prefix),
        _ => None,
    }
}

/// Componentwise common prefix of a set of paths.
fn common_prefix<'p>(mut paths: impl Iterator<Item = &'p Path>) -> Option<PathBuf> {
    let first = paths.next()?;
    let mut prefix: Vec<Component<'p>> = first.components().collect();
    for path in paths {
        let components: Vec<Component<'p>> = path.components().collect();
        let mut shared = 0;
        while shared < prefix.len()
            && shared < components.len()
            && prefix[shared] == components[shared]
        {
            shared += 1;
        }
        prefix.truncate(shared);
        if prefix.is_empty() {
            return None;
        }
    }
    Some(prefix.iter().map(|component| component.as_os_str()).collect())
}

/// Best-effort absolute form of a path; falls back to the path itself.
fn absolute_or_self(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
