//! verify - integrity check for locally served model files
//!
//! Hashes every file listed in the model directory's checksum manifest and
//! refuses to call the model safe unless every entry matches.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{expand_tilde, Cli};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use sov_config::Config;
use sov_errors::{Error, ManifestError, StorageError};
use sov_events::EventReceiver;
use sov_guard::{VerificationReport, Verifier, VerifierConfig};
use sov_manifest::{generate, write_manifest, GenerateOptions};
use sov_types::OutputFormat;
use std::path::{Path, PathBuf};
use std::process;
use tokio::select;
use tracing::{debug, info};

#[tokio::main]
async fn main() {
    // Usage errors exit 1 like any other failure; --help and --version exit 0
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        process::exit(i32::from(e.use_stderr()));
    });
    let json_mode = cli.global.json;

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            debug!("Application error: {}", e);
            if json_mode {
                let _ = OutputRenderer::new(true, false).render_error_json(&e.to_string(), e.code());
            } else {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

/// Main application logic; `Ok(false)` means the model must not be served
async fn run(cli: Cli) -> Result<bool, CliError> {
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref())
        .await
        .map_err(CliError::Config)?;

    // 2. Merge environment variables
    config.merge_env().map_err(CliError::Config)?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli);

    let json_mode = config.general.default_output == OutputFormat::Json;
    let colors_enabled = config.general.default_output != OutputFormat::Plain
        && config
            .general
            .color
            .enabled(console::Term::stdout().features().colors_supported());
    init_tracing(json_mode, colors_enabled, cli.global.debug, &config.log_dir());
    info!("Starting verify v{}", env!("CARGO_PKG_VERSION"));

    let renderer = OutputRenderer::new(json_mode, colors_enabled);

    let model_dir = expand_tilde(&cli.model_dir).ok_or_else(|| {
        CliError::InvalidArguments(format!(
            "cannot expand {}: home directory unknown",
            cli.model_dir
        ))
    })?;

    if cli.generate {
        generate_manifest(&config, &model_dir, &renderer).await?;
        return Ok(true);
    }

    let (event_sender, event_receiver) = sov_events::channel();
    let verifier = Verifier::new(
        VerifierConfig {
            algorithm: config.verify.algorithm,
            chunk_size: config.verify.chunk_size,
        },
        event_sender,
    );
    let mut event_handler = EventHandler::new(renderer.clone());

    let result =
        verify_with_events(&verifier, &model_dir, event_receiver, &mut event_handler).await;

    match result {
        Ok(report) => {
            if renderer.is_json() {
                renderer.render_report_json(&report)?;
            } else {
                renderer.render_summary(&report.summary);
                renderer.render_banner(report.success);
            }
            info!(success = report.success, "Command completed");
            Ok(report.success)
        }
        Err(Error::Storage(StorageError::DirectoryNotFound { .. } | StorageError::NotADirectory { .. }))
            if !renderer.is_json() =>
        {
            renderer.render_not_found(&model_dir);
            Ok(false)
        }
        Err(Error::Manifest(ManifestError::NotFound { file_name, .. })) if !renderer.is_json() => {
            renderer.render_manifest_hint(&model_dir, config.verify.algorithm, &file_name);
            renderer.render_banner(false);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Run verification while rendering its events as they arrive
async fn verify_with_events(
    verifier: &Verifier,
    model_dir: &Path,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<VerificationReport, Error> {
    let mut verification = Box::pin(verifier.verify(model_dir));

    loop {
        select! {
            result = &mut verification => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

/// `--generate`: hash matching files and write the manifest
async fn generate_manifest(
    config: &Config,
    model_dir: &Path,
    renderer: &OutputRenderer,
) -> Result<(), CliError> {
    if !model_dir.is_dir() {
        return Err(CliError::Verify(
            StorageError::DirectoryNotFound {
                path: model_dir.to_path_buf(),
            }
            .into(),
        ));
    }

    let options = GenerateOptions {
        algorithm: config.verify.algorithm,
        extensions: config.verify.generate_extensions.clone(),
        chunk_size: config.verify.chunk_size,
    };
    let manifest = generate(model_dir, &options).await?;
    let path = write_manifest(model_dir, config.verify.algorithm, &manifest).await?;

    if renderer.is_json() {
        let value = serde_json::json!({
            "success": true,
            "manifest": path,
            "entries": manifest.len(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        renderer.render_generated(&path, manifest.len());
    }
    Ok(())
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, cli: &Cli) {
    if let Some(color) = cli.global.color {
        config.general.color = color;
    }
    if cli.global.json {
        config.general.default_output = OutputFormat::Json;
    }
    if let Some(algorithm) = cli.algorithm {
        config.verify.algorithm = algorithm;
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.verify.chunk_size = chunk_size;
    }
}

/// Initialize tracing/logging
///
/// Stderr only gets warnings by default; per-entry results are logged at
/// `info` and below since the console output already reports them.
fn init_tracing(json_mode: bool, ansi: bool, debug_enabled_flag: bool, log_dir: &Path) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let debug_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(
                "info,sov_verify=debug,sov_guard=debug,sov_manifest=debug",
            )
        })
    };

    if debug_enabled_flag {
        // Debug mode: structured JSON logs to file
        match create_log_file(log_dir) {
            Ok((file, path)) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_ansi(false)
                    .with_writer(file)
                    .with_env_filter(debug_filter())
                    .init();
                if !json_mode {
                    eprintln!("Debug logging enabled: {}", path.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    if json_mode && !debug_enabled {
        // JSON mode: keep stderr quiet unless asked
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else if debug_enabled {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
            .with_env_filter(debug_filter())
            .init();
    } else {
        // Normal mode: minimal logging to stderr
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
        "verify-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    let file = std::fs::File::create(&path)?;
    Ok((file, path))
}
