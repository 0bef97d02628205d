//! CLI error handling

use sov_errors::UserFacingError;
use std::fmt;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(sov_errors::Error),
    /// Could not set up the client or transcript
    Setup(sov_errors::Error),
    /// Terminal I/O error
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = match self {
            CliError::Config(e) => {
                write!(f, "Configuration error: ")?;
                e
            }
            CliError::Setup(e) => e,
            CliError::Io(e) => return write!(f, "I/O error: {e}"),
        };

        write!(f, "{}", e.user_message())?;
        if let Some(code) = e.user_code() {
            write!(f, "\n  Code: {code}")?;
        }
        if let Some(hint) = e.user_hint() {
            write!(f, "\n  Hint: {hint}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) | CliError::Setup(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<sov_errors::Error> for CliError {
    fn from(e: sov_errors::Error) -> Self {
        CliError::Setup(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
