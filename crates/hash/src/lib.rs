#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Streaming content digests for model artifact verification
//!
//! Files are read in fixed-size chunks and fed through a [`Hasher`], so
//! multi-gigabyte weight shards never have to fit in memory. The default
//! scheme is SHA-256; BLAKE3 is available through [`HashAlgorithm`].

mod algorithm;

pub use algorithm::{HashAlgorithm, Hasher};

use serde::{Serialize, Serializer};
use sov_errors::Error;
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Default size of chunks for streaming hash computation
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024; // 1 MiB

/// Smallest chunk size accepted from configuration
pub const MIN_CHUNK_SIZE: usize = 4 * 1024;

/// A digest value tagged with the algorithm that produced it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hash {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

impl Hash {
    pub(crate) fn from_parts(algorithm: HashAlgorithm, bytes: Vec<u8>) -> Self {
        Self { algorithm, bytes }
    }

    /// Algorithm that produced this digest
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Get the raw bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Convert to lowercase hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Compute hash of a byte slice in one shot
    #[must_use]
    pub fn from_data(algorithm: HashAlgorithm, data: &[u8]) -> Self {
        let mut hasher = algorithm.hasher();
        hasher.update(data);
        hasher.finalize()
    }

    /// Compare against a hex digest as written in a manifest.
    ///
    /// Case is ignored; anything that is not this digest's hex form
    /// (including malformed input) compares unequal.
    #[must_use]
    pub fn matches_hex(&self, expected: &str) -> bool {
        self.to_hex().eq_ignore_ascii_case(expected.trim())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Clamp a configured chunk size to the accepted range
#[must_use]
pub fn effective_chunk_size(requested: usize) -> usize {
    requested.max(MIN_CHUNK_SIZE)
}

/// Stream a reader to EOF through the given algorithm.
///
/// Returns the digest and the number of bytes consumed. `chunk_size` is
/// only a buffer size; a zero value is treated as one byte.
///
/// # Errors
/// Returns an error if reading fails.
pub async fn hash_reader<R>(
    mut reader: R,
    algorithm: HashAlgorithm,
    chunk_size: usize,
) -> std::io::Result<(Hash, u64)>
where
    R: AsyncRead + Unpin,
{
    let mut hasher = algorithm.hasher();
    let mut buffer = vec![0; chunk_size.max(1)];
    let mut total_bytes = 0u64;

    loop {
        let n = reader.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
        total_bytes += n as u64;
    }

    Ok((hasher.finalize(), total_bytes))
}

/// Compute the digest of a file in chunks.
///
/// The file handle is dropped before returning on every path.
///
/// # Errors
/// Returns an error if the file cannot be opened or a read fails midway.
pub async fn hash_file(
    path: &Path,
    algorithm: HashAlgorithm,
    chunk_size: usize,
) -> Result<(Hash, u64), Error> {
    let file = File::open(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;

    hash_reader(file, algorithm, effective_chunk_size(chunk_size))
        .await
        .map_err(|e| Error::io_with_path(&e, path))
}
