//! Command line interface definition

use clap::Parser;
use sov_types::ColorChoice;
use std::path::PathBuf;

/// sovereign-chat - talk to a model served on this machine
#[derive(Parser)]
#[command(name = "sovereign-chat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chat with a local OpenAI-compatible inference server")]
#[command(long_about = None)]
pub struct Cli {
    /// Model to request (overrides VLLM_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// API base URL (overrides VLLM_BASE_URL)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Enable debug logging to the log directory
    #[arg(long)]
    pub debug: bool,

    /// Color output control
    #[arg(long, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
