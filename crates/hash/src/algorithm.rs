//! Digest algorithms behind a single streaming capability
//!
//! The verifier only ever talks to [`Hasher`]; which accumulator sits
//! behind it is decided by [`HashAlgorithm`].

use crate::Hash;
use serde::{Deserialize, Serialize};
use sha2::Digest as _;
use std::fmt;
use std::str::FromStr;

/// Supported digest schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256, the format written by `shasum -a 256`
    #[default]
    Sha256,
    /// BLAKE3, 256-bit output
    Blake3,
}

impl HashAlgorithm {
    /// All supported algorithms, default first
    pub const ALL: [Self; 2] = [Self::Sha256, Self::Blake3];

    /// Short lowercase name, as accepted on the command line
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }

    /// Digest length in bytes
    #[must_use]
    pub fn digest_len(self) -> usize {
        match self {
            Self::Sha256 | Self::Blake3 => 32,
        }
    }

    /// Create a fresh streaming accumulator for this algorithm
    #[must_use]
    pub fn hasher(self) -> Box<dyn Hasher> {
        match self {
            Self::Sha256 => Box::new(Sha256Hasher(sha2::Sha256::new())),
            Self::Blake3 => Box::new(Blake3Hasher(blake3::Hasher::new())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" | "b3" => Ok(Self::Blake3),
            other => Err(format!("unknown hash algorithm '{other}'")),
        }
    }
}

impl clap::ValueEnum for HashAlgorithm {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.name()))
    }
}

/// Streaming digest accumulator
///
/// Feeding the same bytes in any split produces the same [`Hash`].
pub trait Hasher: Send {
    /// Absorb the next chunk of input
    fn update(&mut self, data: &[u8]);

    /// Consume the accumulator and produce the digest
    fn finalize(self: Box<Self>) -> Hash;
}

struct Sha256Hasher(sha2::Sha256);

impl Hasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Hash {
        Hash::from_parts(HashAlgorithm::Sha256, self.0.finalize().to_vec())
    }
}

struct Blake3Hasher(blake3::Hasher);

impl Hasher for Blake3Hasher {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Hash {
        Hash::from_parts(HashAlgorithm::Blake3, self.0.finalize().as_bytes().to_vec())
    }
}
