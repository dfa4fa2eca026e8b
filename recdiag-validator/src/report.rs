//! Validation result types.

use std::path::PathBuf;

use serde::Serialize;

/// How a diagnostic run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ValidationOutcome {
    /// The record parser split the sample into zero or several records.
    ValidFormat,
    /// The record parser never matched: the sample is a single record.
    InvalidFormat,
    /// The source type or record parser is not something this tool checks.
    NotApplicable,
    /// The run stopped before a verdict (configuration, resolution or I/O failure).
    Error,
}

/// Result of diagnosing one source.
///
/// `messages` is an append-only trail of everything the run reported, in
/// order; the other fields are filled in as far as the run got.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct ValidationResult {
    /// Whether the source passed. `NotApplicable` counts as passed.
    pub passed: bool,
    pub outcome: ValidationOutcome,
    pub source_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_parser: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<usize>,
    pub messages: Vec<String>,
}

impl ValidationResult {
    pub(crate) fn new(source_id: &str) -> Self {
        Self {
            passed: false,
            outcome: ValidationOutcome::Error,
            source_id: source_id.to_owned(),
            record_parser: None,
            sample_file: None,
            record_count: None,
            messages: Vec::new(),
        }
    }

    pub(crate) fn note(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub(crate) fn conclude(&mut self, outcome: ValidationOutcome, message: impl Into<String>) {
        self.passed = matches!(
            outcome,
            ValidationOutcome::ValidFormat | ValidationOutcome::NotApplicable
        );
        self.outcome = outcome;
        self.note(message);
    }
}
