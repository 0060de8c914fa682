//! # Protocol Configuration & Constants
//!
//! Every magic number in MedLedger lives here. The hash layout and the wire
//! field names are part of the data format: change them and every existing
//! digest stops validating.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Protocol version string reported by the node binary.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Digest algorithm used for block hashes.
pub const HASH_ALGORITHM: &str = "SHA-256";

/// Raw digest length in bytes.
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// Hex-encoded digest length. Every non-genesis `hash` and `previous_hash`
/// in the ledger is exactly this long.
pub const HASH_HEX_LENGTH: usize = HASH_OUTPUT_LENGTH * 2;

/// `chrono` format for block timestamps: RFC 3339, UTC, nanosecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9fZ";

// ---------------------------------------------------------------------------
// Record Field Names
// ---------------------------------------------------------------------------

/// Form/JSON key for the patient information field.
pub const FIELD_PATIENT_INFO: &str = "PatientInfo";

/// Form/JSON key for the problem list field.
pub const FIELD_PROBLEM_LIST: &str = "ProblemList";

/// Form/JSON key for the consultation reports field.
pub const FIELD_CONSULTATION_REPORTS: &str = "ConsultationReports";

/// Form/JSON key for the test results field.
pub const FIELD_TEST_RESULTS: &str = "TestResults";

/// All record keys in hash order.
pub const RECORD_FIELDS: [&str; 4] = [
    FIELD_PATIENT_INFO,
    FIELD_PROBLEM_LIST,
    FIELD_CONSULTATION_REPORTS,
    FIELD_TEST_RESULTS,
];

// ---------------------------------------------------------------------------
// Server Defaults
// ---------------------------------------------------------------------------

/// Port used when `ADDR` is not configured.
pub const DEFAULT_PORT: u16 = 8080;

/// Upper bound on a single request, including reading the body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum accepted request body size (1 MiB).
pub const MAX_BODY_BYTES: usize = 1 << 20;
