#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Checksum manifests for model directories
//!
//! A manifest is the plain-text output of `shasum -a 256`: one
//! `<hex digest><two spaces><relative path>` entry per line, no header.
//! Lines that do not split into exactly those two fields are skipped and
//! counted so callers can warn about them.

mod generate;

pub use generate::{generate, write_manifest, GenerateOptions};

use serde::Serialize;
use sov_errors::{Error, ManifestError};
use sov_hash::HashAlgorithm;
use std::path::{Path, PathBuf};

/// Manifest name for SHA-256 digests
pub const SHA256_MANIFEST: &str = "CHECKSUMS.sha256";

/// Manifest name for BLAKE3 digests
pub const BLAKE3_MANIFEST: &str = "CHECKSUMS.b3";

/// Separator between digest and path, as written by `shasum`
pub const FIELD_DELIMITER: &str = "  ";

/// Conventional manifest file name for an algorithm
#[must_use]
pub fn manifest_file_name(algorithm: HashAlgorithm) -> &'static str {
    match algorithm {
        HashAlgorithm::Sha256 => SHA256_MANIFEST,
        HashAlgorithm::Blake3 => BLAKE3_MANIFEST,
    }
}

/// One `digest  path` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Hex digest exactly as written in the manifest
    pub expected_digest: String,
    /// Path relative to the model directory, exactly as written
    pub relative_path: String,
    /// 1-based line number in the manifest file
    pub line: usize,
}

impl ManifestEntry {
    /// Render back to manifest line form (without newline)
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{}{FIELD_DELIMITER}{}",
            self.expected_digest, self.relative_path
        )
    }
}

/// Parsed manifest, entries in file order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
    /// Line numbers of non-blank lines that were not `digest  path`
    pub malformed_lines: Vec<usize>,
}

impl Manifest {
    /// Parse manifest text
    ///
    /// Never fails: blank lines are ignored and malformed lines are
    /// recorded in [`Manifest::malformed_lines`].
    #[must_use]
    pub fn parse(contents: &str) -> Self {
        let mut manifest = Self::default();

        for (index, raw) in contents.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            match parse_line(line) {
                Some((digest, path)) => manifest.entries.push(ManifestEntry {
                    expected_digest: digest.to_string(),
                    relative_path: path.to_string(),
                    line: line_no,
                }),
                None => {
                    tracing::debug!(line = line_no, "skipping malformed manifest line");
                    manifest.malformed_lines.push(line_no);
                }
            }
        }

        manifest
    }

    /// Load and parse a manifest file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read as UTF-8 text.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ManifestError::ReadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self::parse(&contents))
    }

    /// Locate the conventional manifest inside `dir` and load it
    ///
    /// Returns the manifest path alongside the parsed manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::NotFound`] if the directory has no manifest
    /// for `algorithm`, or a read error if it cannot be loaded.
    pub async fn load_from_dir(
        dir: &Path,
        algorithm: HashAlgorithm,
    ) -> Result<(PathBuf, Self), Error> {
        let file_name = manifest_file_name(algorithm);
        let path = dir.join(file_name);

        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(ManifestError::NotFound {
                dir: dir.to_path_buf(),
                file_name: file_name.to_string(),
            }
            .into());
        }

        let manifest = Self::load(&path).await?;
        tracing::info!(
            path = %path.display(),
            entries = manifest.entries.len(),
            malformed = manifest.malformed_lines.len(),
            "loaded manifest"
        );
        Ok((path, manifest))
    }

    /// Render the manifest text, one entry per line
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_line());
            out.push('\n');
        }
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a trimmed, non-blank line at the first field delimiter
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let (digest, path) = line.split_once(FIELD_DELIMITER)?;
    if digest.is_empty() || path.is_empty() {
        return None;
    }
    Some((digest, path))
}
