//! Exit codes for the dupescout binary.

/// Exit codes reported by the CLI layer.
///
/// - 0: Success (scan completed, duplicate groups found)
/// - 1: General error (unexpected failure, including internal consistency faults)
/// - 2: No duplicates (scan completed, nothing to report)
/// - 3: Partial success (completed, but some paths were skipped or degraded
///   to the sentinel fingerprint; details on the warning channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success: scan completed and duplicate groups were found.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: scan completed but no duplicate groups were found.
    NoDuplicates = 2,
    /// Partial success: scan completed but some paths produced warnings.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix used in error messages.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::NoDuplicates => "DS002",
            Self::PartialSuccess => "DS003",
        }
    }
}
