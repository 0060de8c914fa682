//! # Block Structure
//!
//! A block is one patient encounter sealed into the ledger. It carries the
//! encounter's four text fields, a link to the previous block, and a
//! SHA-256 digest over its own content.
//!
//! ## Block Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Block                                       │
//! │  ├── index: u64           (genesis = 0)      │
//! │  ├── timestamp: String    (RFC 3339, UTC)    │
//! │  ├── patient_info: String                    │
//! │  ├── problem_list: String                    │
//! │  ├── consultation_reports: String            │
//! │  ├── test_results: String                    │
//! │  ├── hash: String         (SHA-256 hex)      │
//! │  └── previous_hash: String ("" for genesis)  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Hash Computation
//!
//! The digest covers, in order and with no separators:
//!
//! ```text
//! decimal(index) || timestamp || patient_info || problem_list
//!   || consultation_reports || test_results || previous_hash
//! ```
//!
//! `index` is rendered in base 10 with no padding. The block's own `hash`
//! is never part of its preimage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::Record;
use crate::config::TIMESTAMP_FORMAT;
use crate::crypto::hash::sha256_hex_multi;

/// A sealed encounter record.
///
/// Serializes with PascalCase keys in the order
/// `Index, Timestamp, PatientInfo, ProblemList, ConsultationReports,
/// TestResults, Hash, PreviousHash`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    /// Position in the ledger. Genesis is 0.
    pub index: u64,
    /// Creation time. Informational only; never validated.
    pub timestamp: String,
    pub patient_info: String,
    pub problem_list: String,
    pub consultation_reports: String,
    pub test_results: String,
    /// SHA-256 hex of this block's content.
    pub hash: String,
    /// `hash` of the block this one extends. Empty for genesis.
    pub previous_hash: String,
}

impl Block {
    /// Construct the genesis block, stamped with the current time.
    pub fn genesis() -> Self {
        Self::genesis_at(format_timestamp(Utc::now()))
    }

    /// Construct the genesis block with an explicit timestamp.
    ///
    /// Content fields and `previous_hash` are empty. The hash is computed
    /// like any other block's so the whole chain can be audited uniformly.
    pub fn genesis_at(timestamp: impl Into<String>) -> Self {
        let mut block = Block {
            index: 0,
            timestamp: timestamp.into(),
            patient_info: String::new(),
            problem_list: String::new(),
            consultation_reports: String::new(),
            test_results: String::new(),
            hash: String::new(),
            previous_hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Build a candidate block extending `previous` with `record`.
    ///
    /// Stamps the current UTC time. Content is copied verbatim.
    pub fn new(previous: &Block, record: &Record) -> Self {
        Self::with_timestamp(previous, record, format_timestamp(Utc::now()))
    }

    /// Deterministic form of [`Block::new`] with a caller-supplied timestamp.
    ///
    /// The index saturates at `u64::MAX`; validation rejects such a block.
    pub fn with_timestamp(previous: &Block, record: &Record, timestamp: impl Into<String>) -> Self {
        let mut block = Block {
            index: previous.index.saturating_add(1),
            timestamp: timestamp.into(),
            patient_info: record.patient_info.clone(),
            problem_list: record.problem_list.clone(),
            consultation_reports: record.consultation_reports.clone(),
            test_results: record.test_results.clone(),
            hash: String::new(),
            previous_hash: previous.hash.clone(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Recompute the digest from the block's content fields.
    ///
    /// Compare against `self.hash` to detect tampering.
    pub fn compute_hash(&self) -> String {
        let index = self.index.to_string();
        sha256_hex_multi(&[
            index.as_bytes(),
            self.timestamp.as_bytes(),
            self.patient_info.as_bytes(),
            self.problem_list.as_bytes(),
            self.consultation_reports.as_bytes(),
            self.test_results.as_bytes(),
            self.previous_hash.as_bytes(),
        ])
    }

    /// True when the stored hash matches the recomputed one.
    pub fn has_valid_hash(&self) -> bool {
        self.compute_hash() == self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// The clinical content of this block as a [`Record`].
    pub fn record(&self) -> Record {
        Record::new(
            self.patient_info.clone(),
            self.problem_list.clone(),
            self.consultation_reports.clone(),
            self.test_results.clone(),
        )
    }
}

/// Render a timestamp in the ledger's canonical string form.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
