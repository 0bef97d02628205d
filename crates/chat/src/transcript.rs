//! Append-only JSONL conversation log

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use sov_errors::{Error, StorageError};
use sov_types::Role;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Serialize)]
struct Record<'a> {
    ts: String,
    role: Role,
    content: &'a str,
}

/// One transcript file per chat process
#[derive(Debug, Clone)]
pub struct Transcript {
    path: PathBuf,
}

impl Transcript {
    /// Create `dir` if needed and pick a file name from the local time
    ///
    /// Nothing is written until the first [`Transcript::append`].
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn create(dir: &Path) -> Result<Self, Error> {
        Self::create_at(dir, Local::now()).await
    }

    /// Same as [`Transcript::create`] with an explicit start time
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn create_at(dir: &Path, started: DateTime<Local>) -> Result<Self, Error> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, dir))?;
        let file_name = started.format("chat-%Y%m%d-%H%M%S.jsonl").to_string();
        Ok(Self {
            path: dir.join(file_name),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one `{"ts", "role", "content"}` line
    ///
    /// The file is opened, appended to and closed on every call.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be written.
    pub async fn append(&self, role: Role, content: &str) -> Result<(), Error> {
        let record = Record {
            ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            role,
            content,
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, &self.path))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, &self.path))?;
        file.flush()
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, &self.path))?;
        Ok(())
    }
}
