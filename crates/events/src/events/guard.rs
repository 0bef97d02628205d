use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Classification of one manifest entry as surfaced to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GuardEntryOutcome {
    Passed {
        size: u64,
    },
    Failed {
        expected: String,
        actual: String,
    },
    Missing,
    Skipped {
        reason: String,
    },
}

/// Tally reported at the end of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardSummary {
    pub passed: usize,
    /// Digest mismatches plus skipped entries
    pub failed: usize,
    pub missing: usize,
    pub skipped: usize,
    pub success: bool,
}

/// Model verification events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuardEvent {
    /// Directory resolved and sized; nothing checked yet
    VerificationStarted {
        operation_id: String,
        model_dir: PathBuf,
        total_bytes: u64,
        algorithm: String,
    },

    /// Manifest parsed
    ManifestLoaded {
        operation_id: String,
        manifest: PathBuf,
        entries: usize,
        malformed_lines: usize,
    },

    /// Digest computation for an entry is about to start
    EntryHashing {
        operation_id: String,
        path: String,
    },

    /// An entry has been classified
    EntryVerified {
        operation_id: String,
        path: String,
        outcome: GuardEntryOutcome,
    },

    /// All entries processed
    VerificationCompleted {
        operation_id: String,
        summary: GuardSummary,
        duration_ms: u64,
    },
}
