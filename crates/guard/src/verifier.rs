use crate::outcome::{Outcome, SkipReason, Summary};
use crate::resolve::{resolve_entry, Resolution};
use crate::scan::directory_size;
use serde::Serialize;
use sov_errors::{Error, GuardError, StorageError};
use sov_events::{AppEvent, EventEmitter, EventSender, GuardEvent};
use sov_hash::{hash_file, HashAlgorithm, DEFAULT_CHUNK_SIZE};
use sov_manifest::{Manifest, ManifestEntry};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use uuid::Uuid;

/// Knobs for a verification run
#[derive(Debug, Clone, Copy)]
pub struct VerifierConfig {
    pub algorithm: HashAlgorithm,
    pub chunk_size: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Sha256,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Outcome of one manifest entry, with the path as written in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub path: String,
    pub line: usize,
    pub outcome: Outcome,
}

/// Result of a verification run.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub operation_id: String,
    pub model_dir: PathBuf,
    pub manifest: PathBuf,
    pub algorithm: HashAlgorithm,
    pub total_bytes: u64,
    pub entries: Vec<EntryReport>,
    pub malformed_lines: Vec<usize>,
    pub summary: Summary,
    pub success: bool,
    pub duration_ms: u64,
}

/// Checks a model directory against its checksum manifest.
///
/// Entries are processed strictly one after another. Per-entry problems
/// become [`Outcome`]s; only setup failures (missing directory, missing
/// manifest) are returned as errors.
pub struct Verifier {
    config: VerifierConfig,
    tx: EventSender,
}

impl EventEmitter for Verifier {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

impl Verifier {
    #[must_use]
    pub fn new(config: VerifierConfig, tx: EventSender) -> Self {
        Self { config, tx }
    }

    /// Verify every entry of the manifest in `model_dir`
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DirectoryNotFound`] or
    /// [`StorageError::NotADirectory`] if `model_dir` is unusable, and
    /// [`sov_errors::ManifestError::NotFound`] if it holds no manifest for
    /// the configured algorithm.
    pub async fn verify(&self, model_dir: &Path) -> Result<VerificationReport, Error> {
        let start = Instant::now();
        let root = resolve_root(model_dir).await?;

        let scan_root = root.clone();
        let total_bytes = tokio::task::spawn_blocking(move || directory_size(&scan_root))
            .await
            .map_err(|e| Error::internal(format!("size scan task failed: {e}")))?;

        let operation_id = Uuid::new_v4().to_string();
        tracing::info!(
            operation_id = %operation_id,
            model_dir = %model_dir.display(),
            total_bytes,
            algorithm = %self.config.algorithm,
            "verification started"
        );
        self.emit(AppEvent::Guard(GuardEvent::VerificationStarted {
            operation_id: operation_id.clone(),
            model_dir: model_dir.to_path_buf(),
            total_bytes,
            algorithm: self.config.algorithm.to_string(),
        }));
        if root != model_dir {
            self.emit_debug(format!("model directory resolves to {}", root.display()));
        }

        let (manifest_path, manifest) =
            Manifest::load_from_dir(&root, self.config.algorithm).await?;
        self.emit(AppEvent::Guard(GuardEvent::ManifestLoaded {
            operation_id: operation_id.clone(),
            manifest: manifest_path.clone(),
            entries: manifest.len(),
            malformed_lines: manifest.malformed_lines.len(),
        }));
        if !manifest.malformed_lines.is_empty() {
            let lines = manifest
                .malformed_lines
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            tracing::debug!(lines = %lines, "ignored malformed manifest lines");
            self.emit_warning_with_context(
                format!(
                    "ignored {} malformed manifest line(s)",
                    manifest.malformed_lines.len()
                ),
                format!("line(s) {lines}"),
            );
        }

        let mut entries = Vec::with_capacity(manifest.len());
        for entry in &manifest.entries {
            let outcome = self.check_entry(&root, entry, &operation_id).await;
            self.emit(AppEvent::Guard(GuardEvent::EntryVerified {
                operation_id: operation_id.clone(),
                path: entry.relative_path.clone(),
                outcome: outcome.to_event(),
            }));
            entries.push(EntryReport {
                path: entry.relative_path.clone(),
                line: entry.line,
                outcome,
            });
        }

        let summary = Summary::from_outcomes(entries.iter().map(|e| &e.outcome));
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            operation_id = %operation_id,
            passed = summary.passed,
            failed = summary.failed,
            missing = summary.missing,
            duration_ms,
            "verification completed"
        );
        self.emit(AppEvent::Guard(GuardEvent::VerificationCompleted {
            operation_id: operation_id.clone(),
            summary: summary.to_event(),
            duration_ms,
        }));

        Ok(VerificationReport {
            operation_id,
            model_dir: model_dir.to_path_buf(),
            manifest: manifest_path,
            algorithm: self.config.algorithm,
            total_bytes,
            entries,
            malformed_lines: manifest.malformed_lines,
            success: summary.success(),
            summary,
            duration_ms,
        })
    }

    async fn check_entry(&self, root: &Path, entry: &ManifestEntry, operation_id: &str) -> Outcome {
        let path = match resolve_entry(root, &entry.relative_path) {
            Ok(Resolution::Contained(path)) => path,
            Ok(Resolution::Escapes(resolved)) => {
                tracing::debug!(
                    entry = %entry.relative_path,
                    resolved = %resolved.display(),
                    "manifest entry escapes model directory"
                );
                return Outcome::skipped(SkipReason::PathEscape);
            }
            Err(e) => return unreadable(entry, &e),
        };

        let meta = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
                ) =>
            {
                return Outcome::Missing
            }
            Err(e) => return unreadable(entry, &e),
        };
        if !meta.is_file() {
            return Outcome::skipped(SkipReason::NotAFile);
        }

        tracing::debug!(entry = %entry.relative_path, "hashing");
        self.emit(AppEvent::Guard(GuardEvent::EntryHashing {
            operation_id: operation_id.to_string(),
            path: entry.relative_path.clone(),
        }));

        match hash_file(&path, self.config.algorithm, self.config.chunk_size).await {
            Ok((actual, size)) if actual.matches_hex(&entry.expected_digest) => {
                Outcome::Passed { size }
            }
            Ok((actual, _)) => Outcome::Failed {
                expected: entry.expected_digest.clone(),
                actual: actual.to_hex(),
            },
            Err(e) => unreadable(entry, &e),
        }
    }
}

fn unreadable(entry: &ManifestEntry, err: &dyn std::fmt::Display) -> Outcome {
    tracing::debug!(entry = %entry.relative_path, error = %err, "entry could not be read");
    Outcome::skipped(SkipReason::Unreadable(err.to_string()))
}

async fn resolve_root(model_dir: &Path) -> Result<PathBuf, Error> {
    let meta = match fs::metadata(model_dir).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StorageError::DirectoryNotFound {
                path: model_dir.to_path_buf(),
            }
            .into())
        }
        Err(e) => return Err(StorageError::from_io_with_path(&e, model_dir).into()),
    };
    if !meta.is_dir() {
        return Err(StorageError::NotADirectory {
            path: model_dir.to_path_buf(),
        }
        .into());
    }

    fs::canonicalize(model_dir).await.map_err(|e| {
        Error::from(GuardError::RootUnresolvable {
            path: model_dir.to_path_buf(),
            reason: e.to_string(),
        })
    })
}
