//! Checksum manifest error types

use std::borrow::Cow;
use std::path::PathBuf;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ManifestError {
    /// The model directory has no manifest under the expected name.
    #[error("no {file_name} found in {}", dir.display())]
    NotFound { dir: PathBuf, file_name: String },

    #[error("failed to read manifest {}: {message}", path.display())]
    ReadFailed { path: PathBuf, message: String },

    #[error("failed to write manifest {}: {message}", path.display())]
    WriteFailed { path: PathBuf, message: String },
}

impl UserFacingError for ManifestError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Generate one first with `verify --generate <dir>`."),
            Self::ReadFailed { .. } | Self::WriteFailed { .. } => {
                Some("Check the permissions of the model directory.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "manifest.not_found",
            Self::ReadFailed { .. } => "manifest.read_failed",
            Self::WriteFailed { .. } => "manifest.write_failed",
        };
        Some(code)
    }
}
