//! # Hashing Utilities
//!
//! SHA-256 helpers used by the block hasher. Digests leave this module
//! either as a fixed `[u8; 32]` or as 64 lowercase hex characters; the hex
//! form is what blocks store and what the chain links on.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of `data`.
///
/// # Example
///
/// ```
/// use medledger_protocol::crypto::sha256;
///
/// let digest = sha256(b"encounter");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the SHA-256 digest of `data` as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Hash several byte slices as if they were concatenated, returning hex.
///
/// Parts are fed to the hasher in order with no separators, so
/// `sha256_hex_multi(&[b"ab", b"c"]) == sha256_hex(b"abc")`.
pub fn sha256_hex_multi(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}
