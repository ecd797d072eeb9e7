//! BLAKE3 file fingerprints with streaming reads.
//!
//! Two fingerprints are used by the grouping pipeline:
//!
//! - the *quick* fingerprint covers at most the first [`PREHASH_SIZE`]
//!   bytes and acts as a cheap pre-filter for same-size files;
//! - the *full* fingerprint covers the entire content and decides the
//!   final duplicate groups.
//!
//! Both stream through a fixed buffer, so memory use is independent of
//! file size, and the file handle is dropped even when a read fails
//! partway through.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::HashError;

/// Number of leading bytes covered by the quick fingerprint.
pub const PREHASH_SIZE: u64 = 4096;

/// A 32-byte BLAKE3 digest.
pub type Digest = [u8; 32];

/// Sentinel digest for files that could not be read.
///
/// Unreadable files all degrade to this value, so they can only ever group
/// with each other and never crash the run.
pub const ZERO_DIGEST: Digest = [0u8; 32];

/// Read buffer size for full-content hashing.
const READ_BUF_SIZE: usize = 64 * 1024;

/// Computes file fingerprints.
#[derive(Debug, Default)]
pub struct Hasher;

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Fingerprint of at most the first [`PREHASH_SIZE`] bytes.
    ///
    /// For files no larger than [`PREHASH_SIZE`], this equals the full
    /// fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the file cannot be opened or read.
    pub fn prehash(&self, path: &Path) -> Result<Digest, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        hash_reader(file.take(PREHASH_SIZE), path)
    }

    /// Fingerprint of the entire file content.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the file cannot be opened or read.
    pub fn full_hash(&self, path: &Path) -> Result<Digest, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        hash_reader(file, path)
    }
}

/// Stream a reader into a BLAKE3 hasher.
fn hash_reader(mut reader: impl Read, path: &Path) -> Result<Digest, HashError> {
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(*hasher.finalize().as_bytes())
}

/// Render a digest as lowercase hex.
#[must_use]
pub fn hash_to_hex(digest: &Digest) -> String {
    use std::fmt::Write as _;

    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
