//! Size grouping with deferred record materialization (stage 1).
//!
//! # Overview
//!
//! Files with different sizes cannot be duplicates, so the first stage
//! buckets candidate paths by exact byte size. In most trees the large
//! majority of files have a unique size, and fingerprinting them would be
//! wasted I/O. The bucket therefore holds a [`SizeSlot`] per path:
//!
//! - the first file seen at a given size is stored as [`SizeSlot::Pending`]
//!   with no stat details and no fingerprint;
//! - once a second file of that size arrives, the pending entry is
//!   materialized into a full [`FileRecord`] (stat plus quick fingerprint),
//!   and every later file of that size is materialized on sight.
//!
//! A path still pending when grouping ends had a unique size and was never
//! opened, which the stage statistics make observable.
//!
//! # Vanishing files
//!
//! Candidates are stat'ed here, not in the walker, so a file deleted
//! between listing and grouping is skipped silently. When the *pending*
//! entry of a bucket has vanished by the time a second file shows up, the
//! current path takes over the pending slot; the bucket must then hold
//! exactly one slot, and anything else aborts the run as an internal
//! consistency fault.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::FinderError;
use crate::scanner::{FileRecord, HashError, Hasher, InodeKey, ZERO_DIGEST};

/// Options for the size-grouping stage.
#[derive(Debug, Clone, Default)]
pub struct GroupOptions {
    /// Keep zero-byte files out of the buckets entirely. They remain
    /// discovery candidates and show up in inverse-mode output.
    pub ignore_empty: bool,
}

/// Per-path slot in a size bucket: either a path waiting for a second file
/// of its size, or a materialized record.
#[derive(Debug, Clone)]
pub enum SizeSlot {
    /// First file seen at this size; not yet worth a fingerprint.
    Pending,
    /// Stat details and quick fingerprint are in hand.
    Recorded(FileRecord),
}

/// Result of the size-grouping stage.
#[derive(Debug, Default)]
pub struct SizeGrouping {
    /// Size → path → slot. A `Pending` slot only ever exists alone in its
    /// bucket.
    pub buckets: HashMap<u64, HashMap<PathBuf, SizeSlot>>,
    /// Every candidate that stat'ed as a regular file, in discovery order.
    /// Inverse mode reports the subset of these that end up in no group.
    pub candidates: Vec<PathBuf>,
}

/// Statistics from the size-grouping stage.
#[derive(Debug, Default)]
pub struct GroupingStats {
    /// Candidates that stat'ed successfully as regular files
    pub candidates: usize,
    /// Paths that vanished between discovery and stat (or stat and read)
    pub vanished: usize,
    /// Zero-byte files excluded by [`GroupOptions::ignore_empty`]
    pub empty_excluded: usize,
    /// Records materialized, i.e. quick fingerprints attempted
    pub fingerprinted: usize,
    /// Quick fingerprints that degraded to the sentinel digest
    pub degraded: usize,
    /// The underlying fingerprint failures
    pub errors: Vec<HashError>,
}

/// Group candidate paths by exact byte size (stage 1).
///
/// Consumes the walker's candidate stream in order. See the module docs
/// for the deferred-materialization and vanishing-file behavior.
///
/// # Errors
///
/// Returns [`FinderError::BucketInvariant`] when a bucket is found in an
/// impossible state after promoting a vanished pending entry. This is a
/// logic fault, not an environmental condition, and aborts the run.
pub fn group_by_size<I>(
    paths: I,
    hasher: &Hasher,
    options: &GroupOptions,
) -> Result<(SizeGrouping, GroupingStats), FinderError>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut grouping = SizeGrouping::default();
    let mut stats = GroupingStats::default();
    let mut seen = HashSet::new();

    for path in paths {
        // Overlapping roots can surface the same path twice.
        if !seen.insert(path.clone()) {
            continue;
        }

        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("vanished before stat: {}", path.display());
                stats.vanished += 1;
                continue;
            }
            Err(e) => {
                log::warn!("cannot stat {}: {e}", path.display());
                stats.errors.push(HashError::from_io(path, e));
                continue;
            }
        };
        if !metadata.is_file() {
            log::debug!("no longer a regular file, skipping: {}", path.display());
            continue;
        }

        grouping.candidates.push(path.clone());
        stats.candidates += 1;

        let size = metadata.len();
        if options.ignore_empty && size == 0 {
            stats.empty_excluded += 1;
            continue;
        }

        let bucket = grouping.buckets.entry(size).or_default();
        if bucket.is_empty() {
            bucket.insert(path, SizeSlot::Pending);
            continue;
        }

        // A pending slot means this is the second file of its size: settle
        // the pending entry before recording the current one.
        let pending = bucket
            .iter()
            .find(|(_, slot)| matches!(slot, SizeSlot::Pending))
            .map(|(prior, _)| prior.clone());
        if let Some(prior) = pending {
            match materialize(&prior, hasher, &mut stats) {
                Some(record) => {
                    bucket.insert(prior, SizeSlot::Recorded(record));
                }
                None => {
                    // The first file of this size is gone; the current path
                    // takes over its pending slot.
                    bucket.remove(&prior);
                    bucket.insert(path.clone(), SizeSlot::Pending);
                    if bucket.len() != 1 {
                        return Err(FinderError::BucketInvariant {
                            size,
                            slots: bucket.len(),
                        });
                    }
                    drop_candidate(&mut grouping.candidates, &prior, &mut stats);
                    continue;
                }
            }
        }

        match record_from_metadata(path.clone(), &metadata, hasher, &mut stats) {
            Some(record) => {
                bucket.insert(path, SizeSlot::Recorded(record));
            }
            None => {
                drop_candidate(&mut grouping.candidates, &path, &mut stats);
            }
        }
    }

    log::info!(
        "size grouping: {} candidates, {} size buckets, {} quick fingerprints",
        stats.candidates,
        grouping.buckets.len(),
        stats.fingerprinted
    );

    Ok((grouping, stats))
}

/// Stat a path and build its record. `None` means the file vanished or
/// stopped being a regular file; it no longer counts as a candidate.
fn materialize(path: &Path, hasher: &Hasher, stats: &mut GroupingStats) -> Option<FileRecord> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => return None,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            log::warn!("cannot stat {}: {e}", path.display());
            stats.errors.push(HashError::from_io(path.to_path_buf(), e));
            return None;
        }
    };
    record_from_metadata(path.to_path_buf(), &metadata, hasher, stats)
}

/// Build a record from metadata already in hand, computing the quick
/// fingerprint. An unreadable file degrades to the sentinel digest; only a
/// file that vanished outright returns `None`.
fn record_from_metadata(
    path: PathBuf,
    metadata: &fs::Metadata,
    hasher: &Hasher,
    stats: &mut GroupingStats,
) -> Option<FileRecord> {
    stats.fingerprinted += 1;
    let quick = match hasher.prehash(&path) {
        Ok(digest) => digest,
        Err(HashError::NotFound(_)) => {
            log::debug!("vanished before fingerprint: {}", path.display());
            stats.fingerprinted -= 1;
            return None;
        }
        Err(e) => {
            log::warn!("quick fingerprint failed, using sentinel: {e}");
            stats.degraded += 1;
            stats.errors.push(e);
            ZERO_DIGEST
        }
    };
    Some(FileRecord {
        inode: InodeKey::from_metadata(metadata),
        size: metadata.len(),
        modified: metadata.modified().unwrap_or(std::time::UNIX_EPOCH),
        path,
        quick,
        full: None,
    })
}

/// Remove a vanished path from the candidate list.
fn drop_candidate(candidates: &mut Vec<PathBuf>, path: &Path, stats: &mut GroupingStats) {
    candidates.retain(|candidate| candidate != path);
    stats.candidates -= 1;
    stats.vanished += 1;
}
