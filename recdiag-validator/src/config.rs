//! Configuration types.
//!
//! Split into the tool's own options (`DiagConfig`, where to find things and
//! how much to read) and the agent configuration document being diagnosed
//! (`AgentConfig` and its `SourceDefinition` entries).

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::DiagError;

/// File name the agent reads its configuration from.
pub const DEFAULT_CONFIG_FILE: &str = "appsettings.json";

/// File name filter applied when a source does not declare one.
pub const DEFAULT_FILE_NAME_FILTER: &str = "*.*";

/// Default read limit for both the configuration file and the sample log (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10_485_760;

/// Options of a single diagnostic run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct DiagConfig {
    /// Directory holding the agent configuration file.
    pub config_dir: PathBuf,
    /// Configuration file name inside `config_dir`.
    pub config_file: String,
    /// Maximum bytes read from the configuration file or the sample log.
    pub max_file_size: u64,
    /// Expand `~`, `$VAR` and `${VAR}` in a source's `Directory`.
    pub expand_env: bool,
}

impl Default for DiagConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("."),
            config_file: DEFAULT_CONFIG_FILE.to_owned(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            expand_env: true,
        }
    }
}

impl DiagConfig {
    /// Full path of the configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(&self.config_file)
    }
}

/// Declared source type of a source entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum SourceKind {
    /// `DirectorySource`: files in a directory, the only kind this tool diagnoses.
    Directory,
    /// Any other source type, kept verbatim.
    Other(String),
}

impl From<String> for SourceKind {
    fn from(value: String) -> Self {
        if value == "DirectorySource" {
            Self::Directory
        } else {
            Self::Other(value)
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => f.write_str("DirectorySource"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Declared record parser of a source entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RecordParserKind {
    /// Records start at lines prefixed by a timestamp.
    Timestamp,
    /// Records start at lines matching a regular expression.
    Regex,
    /// Any other parser (single line, JSON, delimited...). Not diagnosed.
    Other(String),
}

impl From<String> for RecordParserKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Timestamp" => Self::Timestamp,
            "Regex" => Self::Regex,
            _ => Self::Other(value),
        }
    }
}

impl fmt::Display for RecordParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timestamp => f.write_str("Timestamp"),
            Self::Regex => f.write_str("Regex"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// One entry of the configuration's `Sources` list.
///
/// Only the fields that drive record splitting are modelled; every other key
/// of the entry is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[non_exhaustive]
pub struct SourceDefinition {
    pub id: String,
    pub source_type: SourceKind,
    pub record_parser: Option<RecordParserKind>,
    pub directory: Option<String>,
    pub file_name_filter: Option<String>,
    pub timestamp_format: Option<String>,
    pub pattern: Option<String>,
    /// The agent spells this key `ExtrationPattern`; the corrected spelling is accepted too.
    #[serde(rename = "ExtrationPattern", alias = "ExtractionPattern")]
    pub extraction_pattern: Option<String>,
    pub extraction_regex_options: Option<String>,
}

impl SourceDefinition {
    /// The declared file name filter, or [`DEFAULT_FILE_NAME_FILTER`].
    #[must_use]
    pub fn file_name_filter_or_default(&self) -> &str {
        self.file_name_filter
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(DEFAULT_FILE_NAME_FILTER)
    }
}

/// The parts of an agent configuration document this tool reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[non_exhaustive]
pub struct AgentConfig {
    #[serde(default)]
    pub sources: Vec<SourceDefinition>,
}

impl AgentConfig {
    /// Build the typed view of an already parsed configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`DiagError::ConfigLoad`] if a source entry does not have the
    /// expected shape (missing `Id`, non-string fields, ...).
    pub fn from_value(
        value: serde_json::Value,
        origin: &std::path::Path,
    ) -> Result<Self, DiagError> {
        serde_json::from_value(value).map_err(|e| DiagError::ConfigLoad {
            path: origin.to_owned(),
            cause: e.to_string(),
        })
    }
}
