//! Duplicate detection pipeline.
//!
//! Three grouping stages, run strictly in sequence:
//! - size grouping with deferred record materialization ([`groups`])
//! - quick-fingerprint regrouping and full-fingerprint confirmation
//!   ([`finder`])

pub mod finder;
pub mod groups;

pub use finder::{
    DuplicateFinder, DuplicateGroup, FinderConfig, FullhashStats, QuickStats, ScanOutcome,
    ScanStats,
};
pub use groups::{group_by_size, GroupOptions, GroupingStats, SizeGrouping, SizeSlot};

/// Fatal faults in the grouping pipeline.
///
/// Everything environmental (vanished files, unreadable content, bad roots)
/// is recovered locally; the only way the pipeline itself fails is an
/// internal consistency violation, which indicates a logic defect and must
/// stop the run rather than produce a silently wrong report.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// A size bucket held an unexpected number of slots after promoting a
    /// vanished first entry.
    #[error(
        "size bucket for {size} bytes holds {slots} slots after pending promotion; \
         grouping state is corrupt"
    )]
    BucketInvariant {
        /// Byte size of the corrupt bucket
        size: u64,
        /// Number of slots observed
        slots: usize,
    },
}
