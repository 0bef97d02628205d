//! sovereign-chat - chat client for a model served on localhost
//!
//! Every turn is kept in memory for context and appended to a JSONL
//! transcript; nothing is sent anywhere but the configured server.

mod cli;
mod error;
mod repl;

use crate::cli::Cli;
use crate::error::CliError;
use crate::repl::Repl;
use clap::Parser;
use sov_chat::{ChatSession, Transcript};
use sov_config::Config;
use sov_net::{ChatApi, CompletionParams, NetClient, NetConfig};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::{debug, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        debug!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = Config::load_or_default(cli.config.as_deref())
        .await
        .map_err(CliError::Config)?;
    config.merge_env().map_err(CliError::Config)?;
    apply_cli_config(&mut config, &cli);

    let colors_enabled = config
        .general
        .color
        .enabled(console::Term::stdout().features().colors_supported());
    init_tracing(colors_enabled, cli.debug, &config.log_dir());
    info!("Starting sovereign-chat v{}", env!("CARGO_PKG_VERSION"));

    let net = NetClient::new(NetConfig {
        timeout: Duration::from_secs(config.chat.timeout_secs),
        retry_count: config.chat.retries,
        ..NetConfig::default()
    })?;
    let api = ChatApi::new(net, config.chat.base_url.clone(), config.chat.api_key.clone())?;
    let params = CompletionParams {
        model: config.chat.model.clone(),
        temperature: config.chat.temperature,
        max_tokens: config.chat.max_tokens,
    };
    let transcript = Transcript::create(&config.transcript_dir()).await?;
    info!(
        server = api.base_url(),
        model = %params.model,
        transcript = %transcript.path().display(),
        "chat session ready"
    );

    let session = ChatSession::new(config.chat.system_prompt.clone());

    Repl::new(api, params, session, transcript, colors_enabled)
        .run()
        .await?;
    Ok(())
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, cli: &Cli) {
    if let Some(color) = cli.color {
        config.general.color = color;
    }
    if let Some(model) = &cli.model {
        config.chat.model.clone_from(model);
    }
    if let Some(base_url) = &cli.base_url {
        config.chat.base_url.clone_from(base_url);
    }
}

/// Initialize tracing/logging
///
/// Stderr shares the terminal with the prompt, so only warnings go there
/// unless `RUST_LOG` asks for more.
fn init_tracing(ansi: bool, debug_enabled_flag: bool, log_dir: &Path) {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("info,sov_chat=debug,sov_net=debug")
        })
    };

    if debug_enabled_flag {
        match create_log_file(log_dir) {
            Ok((file, path)) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(filter())
                    .init();
                eprintln!("Debug logging enabled: {}", path.display());
                return;
            }
            Err(e) => eprintln!("Warning: Failed to create log file: {e}"),
        }
    }

    if std::env::var("RUST_LOG").is_ok() || debug_enabled_flag {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
            .with_env_filter(filter())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
            .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
            .init();
    }
}

fn create_log_file(log_dir: &Path) -> std::io::Result<(std::fs::File, PathBuf)> {
    std::fs::create_dir_all(log_dir)?;
    let path = log_dir.join(format!(
        "sovereign-chat-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    let file = std::fs::File::create(&path)?;
    Ok((file, path))
}
