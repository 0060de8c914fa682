//! In-memory ledger with serialized appends.
//!
//! The block sequence sits behind a single `RwLock<Arc<Vec<Block>>>`:
//!
//! - every mutation takes the write guard for the whole
//!   "read tip → validate → push" step, so two appends can never validate
//!   against the same tip;
//! - readers clone the `Arc` under the read guard and walk their snapshot
//!   without holding any lock. Appends go through `Arc::make_mut`, which
//!   copies the vector when a snapshot is still alive, so a snapshot never
//!   changes under its holder.
//!
//! Nothing in this module performs I/O while a guard is held. An append
//! usually costs one SHA-256 and one push, but when a snapshot is alive the
//! copy in `Arc::make_mut` makes the write guard's hold time grow with the
//! chain length.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use super::block::Block;
use super::record::Record;
use super::validation::{validate, ValidationError};

/// Errors returned by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger has no blocks. Construction always seeds a genesis block,
    /// so this indicates a broken internal invariant.
    #[error("ledger is empty")]
    Empty,

    /// The candidate failed validation against the current tip.
    #[error("block rejected: {0}")]
    Rejected(#[from] ValidationError),
}

/// An integrity problem found by [`Ledger::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainFault {
    #[error("genesis block must have index 0, found {0}")]
    GenesisIndex(u64),

    #[error("genesis block must have an empty previous hash")]
    GenesisLinked,

    #[error("genesis hash mismatch: stored {stored}, computed {computed}")]
    GenesisHash { stored: String, computed: String },

    #[error("block at position {position}: {source}")]
    Link {
        position: usize,
        #[source]
        source: ValidationError,
    },
}

/// Process-wide, append-only sequence of accepted blocks.
///
/// Never empty: construction seeds a genesis block and nothing removes
/// blocks afterwards. Share it as `Arc<Ledger>`.
#[derive(Debug)]
pub struct Ledger {
    blocks: RwLock<Arc<Vec<Block>>>,
}

impl Ledger {
    /// Create a ledger holding a freshly stamped genesis block.
    pub fn new() -> Self {
        Self::with_genesis(Block::genesis())
    }

    /// Create a ledger seeded with `genesis`.
    pub fn with_genesis(genesis: Block) -> Self {
        Self {
            blocks: RwLock::new(Arc::new(vec![genesis])),
        }
    }

    /// The most recently appended block.
    pub fn tip(&self) -> Result<Block, LedgerError> {
        self.blocks.read().last().cloned().ok_or(LedgerError::Empty)
    }

    /// The full ordered sequence as an immutable shared view.
    pub fn snapshot(&self) -> Arc<Vec<Block>> {
        Arc::clone(&self.blocks.read())
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    /// Always `false` for a correctly constructed ledger.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }

    /// Validate `candidate` against the current tip and append it.
    ///
    /// Returns `false` and leaves the ledger untouched on rejection.
    pub fn try_append(&self, candidate: Block) -> bool {
        self.append(candidate).is_ok()
    }

    /// Like [`Ledger::try_append`] but reports why a candidate was
    /// rejected. On success returns the appended block's index.
    pub fn append(&self, candidate: Block) -> Result<u64, LedgerError> {
        let mut guard = self.blocks.write();
        let tip = guard.last().ok_or(LedgerError::Empty)?;
        validate(&candidate, tip)?;

        let index = candidate.index;
        Arc::make_mut(&mut *guard).push(candidate);
        Ok(index)
    }

    /// Build a block from `record` on top of the current tip and append it,
    /// all under one write guard.
    ///
    /// Concurrent callers are serialized, so each one extends the block the
    /// previous caller appended and indices stay contiguous.
    pub fn append_record(&self, record: &Record) -> Result<Block, LedgerError> {
        let mut guard = self.blocks.write();
        let tip = guard.last().ok_or(LedgerError::Empty)?;
        let candidate = Block::new(tip, record);
        validate(&candidate, tip)?;

        Arc::make_mut(&mut *guard).push(candidate.clone());
        Ok(candidate)
    }

    /// Audit the whole chain, genesis included. Works on a snapshot, so
    /// appends are not blocked while it runs.
    pub fn verify(&self) -> Result<(), Vec<ChainFault>> {
        let faults = verify_chain(&self.snapshot());
        if faults.is_empty() {
            Ok(())
        } else {
            Err(faults)
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

/// Check every linkage in `blocks`. Returns all faults found, in order.
pub fn verify_chain(blocks: &[Block]) -> Vec<ChainFault> {
    let mut faults = Vec::new();

    if let Some(genesis) = blocks.first() {
        if genesis.index != 0 {
            faults.push(ChainFault::GenesisIndex(genesis.index));
        }
        if !genesis.previous_hash.is_empty() {
            faults.push(ChainFault::GenesisLinked);
        }
        let computed = genesis.compute_hash();
        if computed != genesis.hash {
            faults.push(ChainFault::GenesisHash {
                stored: genesis.hash.clone(),
                computed,
            });
        }
    }

    for (position, pair) in blocks.windows(2).enumerate() {
        if let Err(source) = validate(&pair[1], &pair[0]) {
            faults.push(ChainFault::Link {
                position: position + 1,
                source,
            });
        }
    }

    faults
}
