//! Informational size scan of a model directory

use std::path::Path;
use walkdir::WalkDir;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Sum the sizes of all regular files under `dir`
///
/// Symlinks to files count with their target's size. Symlinked directories
/// are not descended into and dangling links are ignored. Entries that
/// cannot be read are logged and left out of the total.
#[must_use]
pub fn directory_size(dir: &Path) -> u64 {
    let mut total = 0u64;

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "skipping entry during size scan");
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_file() {
            if let Ok(meta) = entry.metadata() {
                total += meta.len();
            }
        } else if file_type.is_symlink() {
            if let Ok(meta) = std::fs::metadata(entry.path()) {
                if meta.is_file() {
                    total += meta.len();
                }
            }
        }
    }

    total
}

/// Render a byte count as gibibytes with two decimals
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_gib(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / GIB)
}
