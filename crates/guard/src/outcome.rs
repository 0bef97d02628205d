//! Per-entry outcomes and the run summary derived from them

use serde::Serialize;
use sov_events::{GuardEntryOutcome, GuardSummary};
use std::fmt;

/// Why an entry was not hashed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Resolved path lies outside the model directory
    PathEscape,
    /// Resolved path exists but is not a regular file
    NotAFile,
    /// An I/O error while inspecting or reading the file
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathEscape => f.write_str("path escapes model directory"),
            Self::NotAFile => f.write_str("not a regular file"),
            Self::Unreadable(message) => write!(f, "unreadable: {message}"),
        }
    }
}

/// Classification of a single manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed { size: u64 },
    Failed { expected: String, actual: String },
    Missing,
    Skipped { reason: SkipReason },
}

impl Outcome {
    pub(crate) fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }

    pub(crate) fn to_event(&self) -> GuardEntryOutcome {
        match self {
            Self::Passed { size } => GuardEntryOutcome::Passed { size: *size },
            Self::Failed { expected, actual } => GuardEntryOutcome::Failed {
                expected: expected.clone(),
                actual: actual.clone(),
            },
            Self::Missing => GuardEntryOutcome::Missing,
            Self::Skipped { reason } => GuardEntryOutcome::Skipped {
                reason: reason.to_string(),
            },
        }
    }
}

/// Counts over all outcomes of a run
///
/// `failed` includes skipped entries; `skipped` is reported separately so
/// callers can tell the two apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub missing: usize,
    pub skipped: usize,
}

impl Summary {
    /// Reduce a sequence of outcomes
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a Outcome>) -> Self {
        outcomes
            .into_iter()
            .fold(Self::default(), |mut acc, outcome| {
                match outcome {
                    Outcome::Passed { .. } => acc.passed += 1,
                    Outcome::Failed { .. } => acc.failed += 1,
                    Outcome::Missing => acc.missing += 1,
                    Outcome::Skipped { .. } => {
                        acc.failed += 1;
                        acc.skipped += 1;
                    }
                }
                acc
            })
    }

    /// True iff nothing failed and nothing is missing
    #[must_use]
    pub fn success(&self) -> bool {
        self.failed == 0 && self.missing == 0
    }

    pub(crate) fn to_event(self) -> GuardSummary {
        GuardSummary {
            passed: self.passed,
            failed: self.failed,
            missing: self.missing,
            skipped: self.skipped,
            success: self.success(),
        }
    }
}
