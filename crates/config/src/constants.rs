//! Environment variable names and fixed defaults
//!
//! The `VLLM_*` names are shared with the inference server's own tooling,
//! so they carry no `SOV_` prefix.

pub const ENV_OUTPUT: &str = "SOV_OUTPUT";
pub const ENV_COLOR: &str = "SOV_COLOR";
pub const ENV_VERIFY_ALGORITHM: &str = "SOV_VERIFY_ALGORITHM";
pub const ENV_VERIFY_CHUNK_SIZE: &str = "SOV_VERIFY_CHUNK_SIZE";

pub const ENV_BASE_URL: &str = "VLLM_BASE_URL";
pub const ENV_API_KEY: &str = "VLLM_API_KEY";
pub const ENV_MODEL: &str = "VLLM_MODEL";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/v1";
pub const DEFAULT_API_KEY: &str = "changeme";
pub const DEFAULT_MODEL: &str = "llama-3.2-3b";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant running on sovereign infrastructure.\nNo data from this conversation leaves this machine. Be concise.";

/// Directory name under the user config dir
pub const APP_DIR: &str = "sovereign";
