//! Command line interface definition

use clap::Parser;
use sov_hash::HashAlgorithm;
use sov_types::ColorChoice;
use std::path::PathBuf;

/// verify - check local model files against CHECKSUMS.sha256
#[derive(Parser)]
#[command(name = "verify")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify local model files against a checksum manifest")]
#[command(long_about = None)]
pub struct Cli {
    /// Model directory, e.g. ~/models/llama-3.2-3b
    #[arg(value_name = "MODEL_DIR")]
    pub model_dir: String,

    /// Digest algorithm; also selects the manifest file name
    #[arg(long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Read buffer size in bytes (minimum 4096)
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<usize>,

    /// Write a manifest for the directory instead of verifying it
    #[arg(long)]
    pub generate: bool,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to the log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Expand a leading `~` to the home directory
///
/// Returns `None` if the path needs expanding and no home directory is known.
pub fn expand_tilde(raw: &str) -> Option<PathBuf> {
    if raw == "~" {
        return dirs::home_dir();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "verify",
            "/models/x",
            "--algorithm",
            "blake3",
            "--chunk-size",
            "65536",
            "--json",
            "--color",
            "never",
        ])
        .unwrap();
        assert_eq!(cli.model_dir, "/models/x");
        assert_eq!(cli.algorithm, Some(HashAlgorithm::Blake3));
        assert_eq!(cli.chunk_size, Some(65536));
        assert!(cli.global.json);
        assert_eq!(cli.global.color, Some(ColorChoice::Never));
        assert!(!cli.generate);
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(
            expand_tilde("/abs/path"),
            Some(PathBuf::from("/abs/path"))
        );
        assert_eq!(expand_tilde("~user/x"), Some(PathBuf::from("~user/x")));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~"), Some(home.clone()));
            assert_eq!(expand_tilde("~/models/a"), Some(home.join("models/a")));
        }
    }
}
