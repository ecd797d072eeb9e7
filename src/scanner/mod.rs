//! Scanner module: directory traversal and file fingerprinting.
//!
//! The scanner is divided into submodules:
//! - [`walker`]: multi-root traversal and candidate discovery
//! - [`hasher`]: BLAKE3 fingerprints (4 KiB prefix and full content)
//!
//! The types shared between the traversal and grouping stages live here:
//! [`FileRecord`] for a fully materialized file, [`InodeKey`] for hardlink
//! accounting, and the error enums.

pub mod hasher;
pub mod walker;

use std::fs::Metadata;
use std::path::PathBuf;
use std::time::SystemTime;

pub use hasher::{hash_to_hex, Digest, Hasher, PREHASH_SIZE, ZERO_DIGEST};
pub use walker::{WalkOptions, Walker};

/// Identity of a file's underlying storage object.
///
/// Two paths with the same key are hardlinks to one inode and share their
/// bytes on disk. Used by the reporter to avoid counting a hardlink's size
/// twice in the redundancy total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InodeKey {
    /// Device the inode lives on
    pub device: u64,
    /// Inode number on that device
    pub inode: u64,
}

impl InodeKey {
    /// Extract the inode key from file metadata.
    ///
    /// Returns `None` on platforms without inode metadata; callers then
    /// treat every path as its own storage object.
    #[must_use]
    #[cfg(unix)]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            device: metadata.dev(),
            inode: metadata.ino(),
        })
    }

    /// Extract the inode key from file metadata.
    #[must_use]
    #[cfg(not(unix))]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

/// A fully materialized record for one regular file.
///
/// Records are created lazily: the first file of a given size is tracked by
/// path alone, and only gains a record (stat details plus the quick
/// fingerprint) once a second file of the same size shows up.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Path as discovered by the walker
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// Inode identity, when the platform exposes one
    pub inode: Option<InodeKey>,
    /// Fingerprint of the first [`PREHASH_SIZE`] bytes
    pub quick: Digest,
    /// Full-content fingerprint, computed in the final grouping stage
    pub full: Option<Digest>,
}

impl FileRecord {
    /// The inode number for display, or 0 when unknown.
    #[must_use]
    pub fn inode_number(&self) -> u64 {
        self.inode.map_or(0, |key| key.inode)
    }
}

/// Anomalies surfaced by the walker on the warning channel.
///
/// None of these stop the scan; the caller logs them and continues with the
/// remaining roots and entries.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// A named root does not exist.
    #[error("root does not exist: {0}")]
    MissingRoot(PathBuf),

    /// A named root is a symbolic link to an existing target; links are
    /// never traversed.
    #[error("root is a symbolic link (target exists), not following: {0}")]
    SymlinkRoot(PathBuf),

    /// A named root is a symbolic link whose target is gone.
    #[error("root is a broken symbolic link, skipping: {0}")]
    BrokenSymlinkRoot(PathBuf),

    /// An I/O error occurred while listing a directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while fingerprinting a file.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file vanished between discovery and hashing.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error against the path it occurred on.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match error.kind() {
            ErrorKind::NotFound => Self::NotFound(path),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }

    /// The path the failure occurred on.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}
