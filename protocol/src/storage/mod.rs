//! # Storage Module
//!
//! The ledger's data structures. Nothing here touches disk: the ledger
//! lives exactly as long as the process.
//!
//! ## Architecture
//!
//! ```text
//! record.rs      Encounter record (block factory input) and its key schema
//! block.rs       Block structure, genesis, block factory, hashing
//! validation.rs  Successor checks for index, linkage, content hash
//! ledger.rs      Shared append-only chain with serialized appends
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! Record → Block::new(tip, record) → validate(candidate, tip) → Ledger
//! ```

pub mod block;
pub mod ledger;
pub mod record;
pub mod validation;

pub use block::Block;
pub use ledger::{ChainFault, Ledger, LedgerError};
pub use record::{Record, RecordField};
pub use validation::{is_valid, validate, ValidationError};
