//! Quick- and full-fingerprint grouping (stages 2 and 3), plus the
//! [`DuplicateFinder`] facade that runs the whole pipeline.
//!
//! # Overview
//!
//! Stage 2 regroups the records materialized by size grouping across all
//! size buckets by their quick fingerprint and discards singleton groups:
//! same size, different leading bytes, detected cheaply. Stage 3 computes
//! the full-content fingerprint for the survivors, regroups, and discards
//! singletons again; what remains are the final duplicate sets.
//!
//! Unreadable files degrade to the sentinel digest along the way. They are
//! surfaced on the warning channel and excluded from the final report,
//! duplicate and inverse alike, so a single bad file can never corrupt the
//! groups around it.
//!
//! # Example
//!
//! ```no_run
//! use dupescout::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let config = FinderConfig::new(vec![PathBuf::from(".")]);
//! let outcome = DuplicateFinder::new(config).scan().unwrap();
//! for group in &outcome.groups {
//!     println!("{} files x {} bytes", group.len(), group.size);
//! }
//! ```

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::PathBuf;

use super::groups::{group_by_size, GroupOptions, GroupingStats, SizeGrouping, SizeSlot};
use super::FinderError;
use crate::scanner::{
    hash_to_hex, Digest, FileRecord, HashError, Hasher, WalkOptions, Walker, ZERO_DIGEST,
};

/// A confirmed set of files with identical content.
///
/// All members share the full fingerprint and therefore the byte size;
/// `size` is taken from a member, never assumed up front. Members are
/// ordered by ascending modification time (ties by path).
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    /// Full-content fingerprint shared by every member
    pub digest: Digest,
    /// Byte size shared by every member
    pub size: u64,
    /// Member records, ascending by modification time
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Number of member paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Fingerprint as lowercase hex.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hash_to_hex(&self.digest)
    }

    /// Ordering key: bytes beyond the first copy, counting every path.
    #[must_use]
    pub fn redundant_bytes(&self) -> u64 {
        (self.files.len() as u64).saturating_sub(1) * self.size
    }

    /// Number of distinct storage objects among the members. Paths without
    /// inode metadata each count as their own object.
    #[must_use]
    pub fn distinct_inodes(&self) -> usize {
        let mut keys = HashSet::new();
        let mut unkeyed = 0usize;
        for file in &self.files {
            match file.inode {
                Some(key) => {
                    keys.insert(key);
                }
                None => unkeyed += 1,
            }
        }
        keys.len() + unkeyed
    }

    /// Bytes actually reclaimable by keeping one copy per distinct inode.
    /// Hardlinked members share their bytes and are counted once.
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        (self.distinct_inodes() as u64).saturating_sub(1) * self.size
    }
}

/// Statistics from the quick-fingerprint regrouping stage.
#[derive(Debug, Default)]
pub struct QuickStats {
    /// Paths left pending by size grouping: unique size, never opened
    pub size_unique: usize,
    /// Records that entered the regrouping
    pub input_records: usize,
    /// Records discarded as singletons: same size, different prefix
    pub quick_unique: usize,
    /// Quick-fingerprint groups with 2+ members
    pub groups_kept: usize,
}

/// Statistics from the full-fingerprint stage.
#[derive(Debug, Default)]
pub struct FullhashStats {
    /// Records that entered the stage
    pub input_records: usize,
    /// Full fingerprints computed successfully
    pub hashed: usize,
    /// Total bytes streamed while hashing
    pub bytes_hashed: u64,
    /// Files that vanished between stages
    pub vanished: usize,
    /// Full fingerprints that degraded to the sentinel digest
    pub degraded: usize,
    /// Unreadable files excluded from the report
    pub unreadable_excluded: usize,
    /// Records discarded as singletons: same prefix, different content
    pub full_unique: usize,
    /// The underlying fingerprint failures
    pub errors: Vec<HashError>,
    /// Final duplicate groups
    pub groups: usize,
}

/// Combined statistics for one scan.
#[derive(Debug, Default)]
pub struct ScanStats {
    /// Warnings emitted by the walker (bad roots, unreadable directories)
    pub walk_warnings: usize,
    /// Stage 1 statistics
    pub grouping: GroupingStats,
    /// Stage 2 statistics
    pub quick: QuickStats,
    /// Stage 3 statistics
    pub full: FullhashStats,
}

impl ScanStats {
    /// Whether any path was skipped or degraded along the way.
    #[must_use]
    pub fn had_warnings(&self) -> bool {
        self.walk_warnings > 0
            || self.grouping.degraded > 0
            || !self.grouping.errors.is_empty()
            || self.full.degraded > 0
    }
}

/// Result of one scan: the final duplicate groups, the candidates that
/// belong to none of them, and per-stage statistics.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Final duplicate groups, ordered by redundant bytes descending
    /// (ties by digest hex ascending)
    pub groups: Vec<DuplicateGroup>,
    /// Candidates in no group, in discovery order; the inverse-mode output
    pub unique: Vec<PathBuf>,
    /// Per-stage statistics
    pub stats: ScanStats,
}

/// Configuration for a [`DuplicateFinder`].
#[derive(Debug, Clone, Default)]
pub struct FinderConfig {
    /// Root paths to scan
    pub roots: Vec<PathBuf>,
    /// Directory basenames never descended into
    pub ignore_dirs: HashSet<OsString>,
    /// Skip nonexistent roots silently
    pub ignore_missing: bool,
    /// Keep zero-byte files out of grouping
    pub ignore_empty: bool,
}

impl FinderConfig {
    /// Create a configuration for the given roots with default policy.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            ..Default::default()
        }
    }

    /// Set the ignored directory basenames.
    #[must_use]
    pub fn with_ignore_dirs(mut self, dirs: impl IntoIterator<Item = OsString>) -> Self {
        self.ignore_dirs = dirs.into_iter().collect();
        self
    }

    /// Skip nonexistent roots silently.
    #[must_use]
    pub fn with_ignore_missing(mut self, ignore: bool) -> Self {
        self.ignore_missing = ignore;
        self
    }

    /// Keep zero-byte files out of grouping.
    #[must_use]
    pub fn with_ignore_empty(mut self, ignore: bool) -> Self {
        self.ignore_empty = ignore;
        self
    }
}

/// Runs the full pipeline: walk, size-group, quick-fingerprint,
/// full-fingerprint.
#[derive(Debug, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
        }
    }

    /// Run one scan.
    ///
    /// Walker warnings are logged and counted but never stop the scan.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] only for an internal consistency violation
    /// in the grouping tables; every environmental anomaly is recovered
    /// locally.
    pub fn scan(&self) -> Result<ScanOutcome, FinderError> {
        let walker = Walker::new(
            self.config.roots.clone(),
            WalkOptions {
                ignore_dirs: self.config.ignore_dirs.clone(),
                ignore_missing: self.config.ignore_missing,
            },
        );
        let walk_warnings = Cell::new(0usize);
        let candidates = walker.walk().filter_map(|item| match item {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("{e}");
                walk_warnings.set(walk_warnings.get() + 1);
                None
            }
        });

        let options = GroupOptions {
            ignore_empty: self.config.ignore_empty,
        };
        let (grouping, grouping_stats) = group_by_size(candidates, &self.hasher, &options)?;
        let SizeGrouping {
            buckets,
            candidates,
        } = grouping;

        let (quick_groups, quick_stats) = phase2_quickhash(buckets);
        let (groups, full_stats) = phase3_fullhash(quick_groups, &self.hasher);

        let unique = collect_unique(candidates, &groups, &grouping_stats, &full_stats);

        Ok(ScanOutcome {
            groups,
            unique,
            stats: ScanStats {
                walk_warnings: walk_warnings.get(),
                grouping: grouping_stats,
                quick: quick_stats,
                full: full_stats,
            },
        })
    }
}

/// Regroup materialized records by quick fingerprint (stage 2).
///
/// Pending slots are unique by size and drop out here; singleton quick
/// groups were false positives at the size level and drop out too.
#[must_use]
pub fn phase2_quickhash(
    buckets: HashMap<u64, HashMap<PathBuf, SizeSlot>>,
) -> (HashMap<Digest, Vec<FileRecord>>, QuickStats) {
    let mut stats = QuickStats::default();
    let mut groups: HashMap<Digest, Vec<FileRecord>> = HashMap::new();

    for bucket in buckets.into_values() {
        for slot in bucket.into_values() {
            match slot {
                SizeSlot::Pending => stats.size_unique += 1,
                SizeSlot::Recorded(record) => {
                    stats.input_records += 1;
                    groups.entry(record.quick).or_default().push(record);
                }
            }
        }
    }

    groups.retain(|digest, members| {
        if members.len() < 2 {
            log::trace!(
                "unique quick fingerprint {}: {}",
                hash_to_hex(digest),
                members[0].path.display()
            );
            stats.quick_unique += 1;
            false
        } else {
            stats.groups_kept += 1;
            true
        }
    });

    log::info!(
        "quick fingerprints: {} records in, {} possible duplicates in {} groups \
         ({} unique by size, {} unique by prefix)",
        stats.input_records,
        groups.values().map(Vec::len).sum::<usize>(),
        stats.groups_kept,
        stats.size_unique,
        stats.quick_unique
    );

    (groups, stats)
}

/// Confirm duplicates with full-content fingerprints (stage 3).
///
/// Survivors of stage 2 are fully hashed and regrouped; singleton groups
/// drop out, and the sentinel bucket of unreadable files is excluded with
/// a warning. The returned groups are sorted by redundant bytes
/// descending, ties by digest, and each group's members by ascending
/// modification time, ties by path.
#[must_use]
pub fn phase3_fullhash(
    quick_groups: HashMap<Digest, Vec<FileRecord>>,
    hasher: &Hasher,
) -> (Vec<DuplicateGroup>, FullhashStats) {
    let mut stats = FullhashStats::default();
    let mut full_groups: HashMap<Digest, Vec<FileRecord>> = HashMap::new();

    for members in quick_groups.into_values() {
        for mut record in members {
            stats.input_records += 1;
            let digest = match hasher.full_hash(&record.path) {
                Ok(digest) => {
                    stats.hashed += 1;
                    stats.bytes_hashed += record.size;
                    digest
                }
                Err(HashError::NotFound(path)) => {
                    log::debug!("vanished before full fingerprint: {}", path.display());
                    stats.vanished += 1;
                    continue;
                }
                Err(e) => {
                    log::warn!("full fingerprint failed, using sentinel: {e}");
                    stats.degraded += 1;
                    stats.errors.push(e);
                    ZERO_DIGEST
                }
            };
            record.full = Some(digest);
            full_groups.entry(digest).or_default().push(record);
        }
    }

    // The sentinel bucket holds only unreadable files. They were already
    // warned about individually and never make it into the report.
    if let Some(unreadable) = full_groups.remove(&ZERO_DIGEST) {
        log::warn!(
            "{} unreadable file(s) excluded from the report",
            unreadable.len()
        );
        stats.unreadable_excluded = unreadable.len();
    }

    let mut groups: Vec<DuplicateGroup> = full_groups
        .into_iter()
        .filter(|(_, members)| {
            if members.len() < 2 {
                stats.full_unique += 1;
                false
            } else {
                true
            }
        })
        .map(|(digest, mut members)| {
            members.sort_by(|a, b| {
                a.modified
                    .cmp(&b.modified)
                    .then_with(|| a.path.cmp(&b.path))
            });
            let size = members[0].size;
            DuplicateGroup {
                digest,
                size,
                files: members,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        b.redundant_bytes()
            .cmp(&a.redundant_bytes())
            .then_with(|| a.digest.cmp(&b.digest))
    });
    stats.groups = groups.len();

    log::info!(
        "full fingerprints: {} records in, {} duplicate groups confirmed",
        stats.input_records,
        stats.groups
    );

    (groups, stats)
}

/// The candidates that belong to no final group and did not fail
/// fingerprinting, in discovery order.
fn collect_unique(
    candidates: Vec<PathBuf>,
    groups: &[DuplicateGroup],
    grouping_stats: &GroupingStats,
    full_stats: &FullhashStats,
) -> Vec<PathBuf> {
    let grouped: HashSet<&std::path::Path> = groups
        .iter()
        .flat_map(|group| group.files.iter().map(|file| file.path.as_path()))
        .collect();
    let failed: HashSet<&std::path::Path> = grouping_stats
        .errors
        .iter()
        .chain(full_stats.errors.iter())
        .map(HashError::path)
        .collect();

    candidates
        .into_iter()
        .filter(|path| !grouped.contains(path.as_path()) && !failed.contains(path.as_path()))
        .collect()
}
