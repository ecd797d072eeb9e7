//! Command-line interface definitions for dupescout.
//!
//! All options are defined with the clap derive API. Only the options that
//! affect the core pipeline are present; there are no subcommands.
//!
//! # Example
//!
//! ```bash
//! # Report duplicate groups under the current directory
//! dupescout
//!
//! # Scan two trees, skipping VCS internals
//! dupescout ~/src ~/backup --ignore-dir .git --ignore-dir .hg
//!
//! # Print files that have no duplicate instead
//! dupescout ~/photos --inverse
//! ```

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Report-only duplicate file finder.
///
/// dupescout scans the given directory trees and reports groups of files
/// whose content is identical, using staged hashing (size, then a 4 KiB
/// prefix fingerprint, then a full-content fingerprint) so that most files
/// are never read at all.
#[derive(Debug, Parser)]
#[command(name = "dupescout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root paths to scan; files are accepted as single candidates
    ///
    /// Defaults to the current directory when none are given.
    #[arg(value_name = "PATH")]
    pub roots: Vec<PathBuf>,

    /// Suppress warnings for named roots that do not exist
    #[arg(long)]
    pub ignore_missing: bool,

    /// Exclude zero-byte files from duplicate grouping
    ///
    /// Excluded files still count as candidates and show up in
    /// inverse-mode output.
    #[arg(long)]
    pub ignore_empty: bool,

    /// Directory basename never descended into (repeatable)
    #[arg(long = "ignore-dir", value_name = "NAME")]
    pub ignore_dirs: Vec<OsString>,

    /// Suppress duplicate groups fully contained under this directory
    /// (repeatable)
    ///
    /// A group with even one member outside every such directory is still
    /// reported in full.
    #[arg(long = "ignore-contained", value_name = "DIRPATH")]
    pub ignore_contained: Vec<PathBuf>,

    /// Print the complement set: candidate files that have no duplicate
    #[arg(long)]
    pub inverse: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// The roots to scan, defaulting to the current directory.
    #[must_use]
    pub fn roots_or_default(&self) -> Vec<PathBuf> {
        if self.roots.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.roots.clone()
        }
    }
}
