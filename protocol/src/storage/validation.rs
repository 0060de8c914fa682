//! Candidate-block validation.
//!
//! A candidate extends `previous` only if all three hold:
//!
//! 1. `candidate.index == previous.index + 1`
//! 2. `candidate.previous_hash == previous.hash`
//! 3. `candidate.hash` equals the recomputed digest of its content
//!
//! Checks run in that order and the first failure is reported. There is no
//! partial acceptance. A block at `u64::MAX` has no valid successor.

use thiserror::Error;

use super::block::Block;

/// Why a candidate block was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The candidate does not sit directly after `previous`.
    #[error("index mismatch: expected {expected}, got {got}")]
    IndexMismatch {
        /// `previous.index + 1`.
        expected: u64,
        /// The candidate's index.
        got: u64,
    },

    /// `previous` already holds the largest representable index.
    #[error("index space exhausted: no successor for index {previous}")]
    IndexExhausted { previous: u64 },

    /// The candidate links to some other block.
    #[error("previous hash mismatch at index {index}: expected {expected:?}, got {got:?}")]
    PreviousHashMismatch {
        index: u64,
        expected: String,
        got: String,
    },

    /// The stored hash does not match the block's content.
    #[error("hash mismatch at index {index}: stored {stored}, computed {computed}")]
    HashMismatch {
        index: u64,
        stored: String,
        computed: String,
    },
}

/// Validate `candidate` as the direct successor of `previous`.
pub fn validate(candidate: &Block, previous: &Block) -> Result<(), ValidationError> {
    let expected = previous
        .index
        .checked_add(1)
        .ok_or(ValidationError::IndexExhausted {
            previous: previous.index,
        })?;
    if candidate.index != expected {
        return Err(ValidationError::IndexMismatch {
            expected,
            got: candidate.index,
        });
    }

    if candidate.previous_hash != previous.hash {
        return Err(ValidationError::PreviousHashMismatch {
            index: candidate.index,
            expected: previous.hash.clone(),
            got: candidate.previous_hash.clone(),
        });
    }

    let computed = candidate.compute_hash();
    if computed != candidate.hash {
        return Err(ValidationError::HashMismatch {
            index: candidate.index,
            stored: candidate.hash.clone(),
            computed,
        });
    }

    Ok(())
}

/// Boolean form of [`validate`].
pub fn is_valid(candidate: &Block, previous: &Block) -> bool {
    validate(candidate, previous).is_ok()
}
