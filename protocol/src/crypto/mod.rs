//! # Cryptographic Primitives for MedLedger
//!
//! Block integrity rests on one primitive: SHA-256 over the block's
//! canonical field concatenation. Everything here is a thin wrapper around
//! the audited `sha2` implementation.

pub mod hash;

pub use hash::{sha256, sha256_hex, sha256_hex_multi};
