//! Error types for record-boundary diagnostics.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a diagnostic run before a verdict is reached.
///
/// None of these cross the public `validate` boundary: the orchestrator turns
/// them into messages of a failed `ValidationResult`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiagError {
    /// The configuration file is missing, unreadable or not valid JSON.
    #[error("Failed to load configuration file {}: {cause}", .path.display())]
    ConfigLoad { path: PathBuf, cause: String },

    /// The configuration document does not match the agent configuration schema.
    /// The individual schema errors are kept for logging only.
    #[error("invalid configuration file format detected.")]
    SchemaValidation { errors: Vec<String> },

    /// No source with the requested id exists.
    #[error("Source ID '{id}' was not found in the configuration.")]
    SourceNotFound { id: String },

    /// No explicit log name was given and the directory listing did not yield
    /// exactly one candidate.
    #[error("{}", sample_message(.directory, .filter, .candidates))]
    AmbiguousOrMissingSample {
        directory: PathBuf,
        filter: String,
        candidates: Vec<String>,
    },

    /// A field the declared record parser needs is absent or empty.
    #[error("Source ID '{id}' is missing required field '{field}'.")]
    MissingParserField { id: String, field: &'static str },

    /// The source's directory does not exist or is not a directory.
    #[error("Directory {} does not exist or is not a directory.", .path.display())]
    MissingDirectory { path: PathBuf },

    /// The source's directory could not be expanded (undefined variable, ...).
    #[error("Cannot expand directory '{directory}': {cause}")]
    InvalidDirectory { directory: String, cause: String },

    /// The `FileNameFilter` is not a valid glob.
    #[error("Invalid file name filter '{filter}': {cause}")]
    InvalidFilter { filter: String, cause: String },

    /// A pattern (`Pattern`, `ExtrationPattern` or a translated
    /// `TimestampFormat`) does not compile.
    #[error("Invalid {field} '{pattern}': {cause}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        cause: String,
    },

    /// An `ExtractionRegexOptions` entry is not a known regex option name.
    #[error("Unknown regex option '{option}' in ExtractionRegexOptions.")]
    InvalidRegexOption { option: String },

    /// An I/O error while listing a directory or reading a file.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exceeded the configured read limit.
    #[error("File {} exceeds maximum size of {max} bytes.", .path.display())]
    FileTooLarge { path: PathBuf, max: u64 },

    /// The file content is not valid UTF-8.
    #[error("File {} is not valid UTF-8.", .path.display())]
    InvalidEncoding { path: PathBuf },
}

fn sample_message(directory: &std::path::Path, filter: &str, candidates: &[String]) -> String {
    if candidates.is_empty() {
        format!(
            "No file in {} matches filter '{filter}'. Specify the log file name to validate.",
            directory.display()
        )
    } else {
        format!(
            "{} files in {} match filter '{filter}': {}. Specify the log file name to validate.",
            candidates.len(),
            directory.display(),
            candidates.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_not_found_names_id() {
        let err = DiagError::SourceNotFound {
            id: "app1".to_owned(),
        };
        assert!(err.to_string().contains("app1"));
    }

    #[test]
    fn test_ambiguous_sample_lists_candidates() {
        let err = DiagError::AmbiguousOrMissingSample {
            directory: PathBuf::from("/var/log/app"),
            filter: "*.log".to_owned(),
            candidates: vec!["a.log".to_owned(), "b.log".to_owned()],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("2 files in /var/log/app"), "got: {msg}");
        assert!(msg.contains("a.log, b.log"), "got: {msg}");
    }

    #[test]
    fn test_missing_sample_message() {
        let err = DiagError::AmbiguousOrMissingSample {
            directory: PathBuf::from("logs"),
            filter: "*.*".to_owned(),
            candidates: vec![],
        };
        assert!(err.to_string().starts_with("No file in logs matches filter '*.*'"));
    }

    #[test]
    fn test_schema_error_message_is_generic() {
        let err = DiagError::SchemaValidation {
            errors: vec!["\"Id\" is a required property".to_owned()],
        };
        assert_eq!(err.to_string(), "invalid configuration file format detected.");
    }
}
