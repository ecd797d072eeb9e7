//! Output rendering for scan results.
//!
//! The report is plain text on stdout; diagnostics stay on the logging
//! channel. Two mutually exclusive modes:
//! - duplicate mode ([`report::DuplicateReport`]): one block per group,
//!   largest redundancy first, with a grand total footer;
//! - inverse mode ([`report::inverse_text`]): the flat list of candidate
//!   paths that have no duplicate.

pub mod path_text;
pub mod report;

pub use path_text::path_text;
pub use report::{inverse_text, DuplicateReport, ReportOptions};
