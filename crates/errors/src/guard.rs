//! Guard-specific error types for model verification

use std::borrow::Cow;
use std::path::PathBuf;

use crate::UserFacingError;
use thiserror::Error;

/// Errors that stop a verification run before any entry is checked.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum GuardError {
    /// The model directory could not be canonicalized.
    #[error("cannot resolve model directory {}: {reason}", path.display())]
    RootUnresolvable { path: PathBuf, reason: String },

    /// Walking the model directory for the size scan failed.
    #[error("failed to scan {}: {reason}", path.display())]
    ScanFailed { path: PathBuf, reason: String },
}

impl UserFacingError for GuardError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::RootUnresolvable { .. } => Some("Pass an existing, readable model directory."),
            Self::ScanFailed { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::RootUnresolvable { .. } => "guard.root_unresolvable",
            Self::ScanFailed { .. } => "guard.scan_failed",
        };
        Some(code)
    }
}
