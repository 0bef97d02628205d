//! Manifest generation for a model directory
//!
//! Produces the same text as
//! `find . -type f \( -name '*.safetensors' -o -name '*.json' \) -exec shasum -a 256 {} \; | sort`.

use crate::{manifest_file_name, Manifest, ManifestEntry};
use sov_errors::{Error, GuardError, ManifestError};
use sov_hash::{hash_file, HashAlgorithm, DEFAULT_CHUNK_SIZE};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What to include when generating a manifest
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub algorithm: HashAlgorithm,
    /// File extensions to include, without the dot. Empty means every file.
    pub extensions: Vec<String>,
    pub chunk_size: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Sha256,
            extensions: vec!["safetensors".to_string(), "json".to_string()],
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl GenerateOptions {
    fn includes(&self, file_name: &str) -> bool {
        self.extensions.is_empty()
            || self.extensions.iter().any(|ext| {
                file_name
                    .strip_suffix(ext.as_str())
                    .is_some_and(|stem| stem.ends_with('.') && stem.len() > 1)
            })
    }
}

/// Hash every matching regular file under `dir`, one at a time
///
/// Entries are `./`-prefixed relative paths sorted by line text. The
/// manifest file itself is never included.
///
/// # Errors
///
/// Returns an error if the directory cannot be walked or a file cannot be
/// hashed.
pub async fn generate(dir: &Path, options: &GenerateOptions) -> Result<Manifest, Error> {
    let manifest_name = manifest_file_name(options.algorithm);
    let mut files: Vec<(PathBuf, String)> = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| GuardError::ScanFailed {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if entry.depth() == 1 && file_name == manifest_name {
            continue;
        }
        if !options.includes(&file_name) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|_| Error::internal(format!("{} escaped walk root", entry.path().display())))?;
        let mut rel = String::from(".");
        for component in relative.components() {
            rel.push('/');
            rel.push_str(&component.as_os_str().to_string_lossy());
        }
        files.push((entry.path().to_path_buf(), rel));
    }

    let mut entries = Vec::with_capacity(files.len());
    for (path, relative_path) in files {
        tracing::debug!(path = %relative_path, "hashing for manifest");
        let (hash, _) = hash_file(&path, options.algorithm, options.chunk_size).await?;
        entries.push(ManifestEntry {
            expected_digest: hash.to_hex(),
            relative_path,
            line: 0,
        });
    }

    entries.sort_by_key(ManifestEntry::to_line);
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.line = index + 1;
    }

    Ok(Manifest {
        entries,
        malformed_lines: Vec::new(),
    })
}

/// Write `manifest` under the conventional name for `algorithm` in `dir`
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn write_manifest(
    dir: &Path,
    algorithm: HashAlgorithm,
    manifest: &Manifest,
) -> Result<PathBuf, Error> {
    let path = dir.join(manifest_file_name(algorithm));
    tokio::fs::write(&path, manifest.render())
        .await
        .map_err(|e| ManifestError::WriteFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
    tracing::info!(path = %path.display(), entries = manifest.len(), "wrote manifest");
    Ok(path)
}
