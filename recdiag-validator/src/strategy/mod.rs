//! Record-splitting strategies.
//!
//! A source's declared parser is turned into a [`BoundaryRule`] by the
//! resolver; [`detector_for`] then compiles the rule into the matching
//! [`BoundaryDetector`]. The `loader` module reads the sample the detector
//! runs over.

pub mod loader;

use serde::Serialize;

use crate::detect::BoundaryDetector;
use crate::detect::pattern::PatternDetector;
use crate::detect::timestamp::TimestampDetector;
use crate::error::DiagError;

/// Auxiliary field-extraction settings of a regex source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub pattern: String,
    /// Raw `ExtractionRegexOptions` value.
    pub options: Option<String>,
}

/// How a source says its records begin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "parser", rename_all = "PascalCase")]
pub enum BoundaryRule {
    Timestamp {
        format: String,
    },
    Regex {
        pattern: String,
        extraction: Option<Extraction>,
    },
}

impl BoundaryRule {
    /// Parser name as written in the agent configuration.
    #[must_use]
    pub fn parser_name(&self) -> &'static str {
        match self {
            Self::Timestamp { .. } => "Timestamp",
            Self::Regex { .. } => "Regex",
        }
    }
}

/// Compile the detector for `rule`.
///
/// # Errors
///
/// Returns [`DiagError::InvalidPattern`] or [`DiagError::InvalidRegexOption`]
/// when the rule's expressions do not compile.
pub fn detector_for(rule: &BoundaryRule) -> Result<Box<dyn BoundaryDetector>, DiagError> {
    Ok(match rule {
        BoundaryRule::Timestamp { format } => Box::new(TimestampDetector::new(format)?),
        BoundaryRule::Regex {
            pattern,
            extraction,
        } => Box::new(PatternDetector::new(pattern, extraction.as_ref())?),
    })
}
