use thiserror::Error;

/// Failures surfaced by the pure computation components. Upstream ingestion
/// defects (unsorted input, mismatched counts) are reported as typed errors
/// so the caller can decide to skip or abort instead of unwinding.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("window must be at least 1 day")]
    EmptyWindow,

    #[error("window of {window} days exceeds series length {len}")]
    WindowTooLarge { window: usize, len: usize },

    #[error("series length mismatch: numerator has {numerator}, denominator has {denominator}")]
    LengthMismatch {
        numerator: usize,
        denominator: usize,
    },

    #[error("denominator window ending at index {index} sums to zero")]
    ZeroDenominator { index: usize },

    #[error("{context}: input not sorted ascending at index {index}")]
    UnsortedInput { context: &'static str, index: usize },

    #[error("aggregate for {day} does not align with the dense date list")]
    Misaligned { day: chrono::NaiveDate },

    #[error("no commits or pipeline runs found")]
    NoEvents,

    #[error("pipeline run {run_id} points at unknown commit {sha}")]
    UnknownCommit { run_id: u64, sha: String },

    #[error("boundary commit {sha} not found in range; history may have been rewritten")]
    HistoryDesync { sha: String },

    #[error("trigger commit {sha} has no parent; history is too shallow to find the change start")]
    ShallowHistory { sha: String },

    #[error("change deployed at {deployed_at} predates its first commit at {first_commit_at}")]
    NegativeLeadTime {
        first_commit_at: chrono::DateTime<chrono::Utc>,
        deployed_at: chrono::DateTime<chrono::Utc>,
    },
}
