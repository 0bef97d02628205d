#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Model directory verification against checksum manifests

pub mod outcome;
pub mod resolve;
pub mod scan;
mod verifier;

pub use outcome::{Outcome, SkipReason, Summary};
pub use resolve::{is_contained, resolve_entry, soft_canonicalize, Resolution};
pub use scan::{directory_size, format_gib};
pub use verifier::{EntryReport, VerificationReport, Verifier, VerifierConfig};
