// Copyright (c) 2026 MedLedger Contributors. MIT License.
// See LICENSE for details.

//! # MedLedger Protocol: Core Library
//!
//! An append-only, hash-linked ledger of patient encounter records. Each
//! block carries four free-form clinical fields (patient info, problem list,
//! consultation reports, test results) and is bound to its predecessor by
//! index and SHA-256 hash.
//!
//! ## Architecture
//!
//! - **crypto**: SHA-256 hashing helpers.
//! - **storage**: Blocks, records, validation, and the in-memory ledger.
//! - **config**: Protocol constants and server defaults.
//!
//! The HTTP surface lives in the `medledger-node` binary; this crate has no
//! knowledge of requests or rendering. It receives a [`storage::Record`] and
//! either extends the chain or rejects the candidate.

pub mod config;
pub mod crypto;
pub mod storage;

pub use storage::{Block, Ledger, LedgerError, Record, ValidationError};
