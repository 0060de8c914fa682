//! # Encounter Records
//!
//! A [`Record`] is the input to the block factory: the four clinical text
//! fields of one patient encounter. How a record was parsed (form body,
//! JSON, tests) is not this module's concern; it only declares which keys
//! exist and how they map onto fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{
    FIELD_CONSULTATION_REPORTS, FIELD_PATIENT_INFO, FIELD_PROBLEM_LIST, FIELD_TEST_RESULTS,
};

/// One of the four recognized record keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    PatientInfo,
    ProblemList,
    ConsultationReports,
    TestResults,
}

impl RecordField {
    /// Every field, in hash order.
    pub const ALL: [RecordField; 4] = [
        RecordField::PatientInfo,
        RecordField::ProblemList,
        RecordField::ConsultationReports,
        RecordField::TestResults,
    ];

    /// Resolve a wire key. Accepts the PascalCase form names and their
    /// camelCase spellings; anything else is unrecognized.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "PatientInfo" | "patientInfo" => Some(RecordField::PatientInfo),
            "ProblemList" | "problemList" => Some(RecordField::ProblemList),
            "ConsultationReports" | "consultationReports" => {
                Some(RecordField::ConsultationReports)
            }
            "TestResults" | "testResults" => Some(RecordField::TestResults),
            _ => None,
        }
    }

    /// Canonical (PascalCase) key.
    pub fn key(self) -> &'static str {
        match self {
            RecordField::PatientInfo => FIELD_PATIENT_INFO,
            RecordField::ProblemList => FIELD_PROBLEM_LIST,
            RecordField::ConsultationReports => FIELD_CONSULTATION_REPORTS,
            RecordField::TestResults => FIELD_TEST_RESULTS,
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Clinical content of one encounter. Missing fields are empty strings.
///
/// Values are carried verbatim: no trimming, length limits, or
/// sanitization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Record {
    pub patient_info: String,
    pub problem_list: String,
    pub consultation_reports: String,
    pub test_results: String,
}

impl Record {
    /// Build a record from all four fields.
    pub fn new(
        patient_info: impl Into<String>,
        problem_list: impl Into<String>,
        consultation_reports: impl Into<String>,
        test_results: impl Into<String>,
    ) -> Self {
        Self {
            patient_info: patient_info.into(),
            problem_list: problem_list.into(),
            consultation_reports: consultation_reports.into(),
            test_results: test_results.into(),
        }
    }

    /// Build a record from `(key, value)` pairs. Unrecognized keys are
    /// dropped; a repeated key keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut record = Record::default();
        for (key, value) in pairs {
            record.set_key(key.as_ref(), value);
        }
        record
    }

    /// Assign `value` to the field named by `key`. Returns `false` (and
    /// leaves the record untouched) when the key is unrecognized.
    pub fn set_key(&mut self, key: &str, value: impl Into<String>) -> bool {
        match RecordField::from_key(key) {
            Some(field) => {
                *self.field_mut(field) = value.into();
                true
            }
            None => false,
        }
    }

    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::PatientInfo => &self.patient_info,
            RecordField::ProblemList => &self.problem_list,
            RecordField::ConsultationReports => &self.consultation_reports,
            RecordField::TestResults => &self.test_results,
        }
    }

    pub fn field_mut(&mut self, field: RecordField) -> &mut String {
        match field {
            RecordField::PatientInfo => &mut self.patient_info,
            RecordField::ProblemList => &mut self.problem_list,
            RecordField::ConsultationReports => &mut self.consultation_reports,
            RecordField::TestResults => &mut self.test_results,
        }
    }

    /// True when all four fields are empty.
    pub fn is_empty(&self) -> bool {
        RecordField::ALL.iter().all(|f| self.field(*f).is_empty())
    }
}
