//! Form-body decoding for the write endpoint.
//!
//! Bodies are `application/x-www-form-urlencoded`: pairs separated by `&`,
//! key and value split on the first `=`. `+` becomes a space and `%XX`
//! escapes are decoded. Keys are matched against [`RecordField`]; anything
//! else is ignored. A pair without `=` is a key with an empty value.

use std::borrow::Cow;

use percent_encoding::percent_decode;
use thiserror::Error;

use medledger_protocol::storage::{Record, RecordField};

/// A body that could not be turned into a [`Record`].
#[derive(Debug, Error)]
pub enum FormError {
    /// A recognized field's value is not UTF-8 once decoded.
    #[error("value for {field} is not valid UTF-8")]
    InvalidUtf8 {
        field: RecordField,
        /// Fields decoded before the failure.
        partial: Record,
    },
}

impl FormError {
    /// Whatever was decoded before the error, for echoing back.
    pub fn partial(&self) -> &Record {
        match self {
            FormError::InvalidUtf8 { partial, .. } => partial,
        }
    }
}

/// Decode a form body into a record.
pub fn decode_record(body: &[u8]) -> Result<Record, FormError> {
    let mut record = Record::default();

    for pair in body.split(|b| *b == b'&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = match pair.iter().position(|b| *b == b'=') {
            Some(i) => (&pair[..i], &pair[i + 1..]),
            None => (pair, &[][..]),
        };

        let key = decode_component(raw_key);
        let key = String::from_utf8_lossy(&key);
        let Some(field) = RecordField::from_key(&key) else {
            tracing::debug!(key = %key, "ignoring unknown form field");
            continue;
        };

        match String::from_utf8(decode_component(raw_value).into_owned()) {
            Ok(value) => *record.field_mut(field) = value,
            Err(_) => {
                return Err(FormError::InvalidUtf8 {
                    field,
                    partial: record,
                })
            }
        }
    }

    Ok(record)
}

/// `+` to space, then percent-decoding.
fn decode_component(raw: &[u8]) -> Cow<'_, [u8]> {
    if raw.contains(&b'+') {
        let spaced: Vec<u8> = raw
            .iter()
            .map(|b| if *b == b'+' { b' ' } else { *b })
            .collect();
        Cow::Owned(percent_decode(&spaced).collect())
    } else {
        percent_decode(raw).into()
    }
}
