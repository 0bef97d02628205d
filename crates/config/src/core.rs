//! Configuration sections shared by both tools

use crate::constants::{
    DEFAULT_API_KEY, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT,
};
use serde::{Deserialize, Serialize};
use sov_hash::{HashAlgorithm, DEFAULT_CHUNK_SIZE};
use sov_types::{ColorChoice, OutputFormat};
use std::path::PathBuf;

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
        }
    }
}

/// Model verification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    #[serde(default)]
    pub algorithm: HashAlgorithm,
    /// Read buffer size in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Extensions included by `verify --generate`; empty means all files
    #[serde(default = "default_generate_extensions")]
    pub generate_extensions: Vec<String>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Sha256,
            chunk_size: DEFAULT_CHUNK_SIZE,
            generate_extensions: default_generate_extensions(),
        }
    }
}

/// Chat client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Where JSONL transcripts go; defaults to `~/.local/share/sovereign-chat`
    pub transcript_dir: Option<PathBuf>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            transcript_dir: None,
        }
    }
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Where `--debug` log files go
    pub log_dir: Option<PathBuf>,
}

// Default value functions for serde
fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_generate_extensions() -> Vec<String> {
    vec!["safetensors".to_string(), "json".to_string()]
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key() -> String {
    DEFAULT_API_KEY.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retries() -> u32 {
    2
}
