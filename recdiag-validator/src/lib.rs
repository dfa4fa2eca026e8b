//! # recdiag-validator
//!
//! Checks that a log agent source's declared record parser actually splits a
//! sample log file into records.
//!
//! A run loads the agent configuration, finds the requested `DirectorySource`,
//! picks its sample file, applies the declared `Timestamp` or `Regex` record
//! boundaries to it, and fails the source when the whole sample collapses into
//! a single record.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use recdiag_validator::{DiagConfig, validate_with};
//!
//! let mut config = DiagConfig::default();
//! config.config_dir = PathBuf::from("/etc/agent");
//!
//! let result = validate_with("app1", None, &config);
//! for message in &result.messages {
//!     println!("{message}");
//! }
//! println!("Passed: {}", result.passed);
//! ```

mod config;
mod detect;
mod error;
pub mod output;
mod report;
mod resolve;
mod settings;
mod strategy;

use std::path::Path;

use tracing::{debug, info, warn};

pub use config::{
    AgentConfig, DEFAULT_CONFIG_FILE, DEFAULT_FILE_NAME_FILTER, DEFAULT_MAX_FILE_SIZE, DiagConfig,
    RecordParserKind, SourceDefinition, SourceKind,
};
pub use detect::{BoundaryDetector, Record};
pub use error::DiagError;
pub use report::{ValidationOutcome, ValidationResult};
pub use resolve::{Resolution, SamplePlan, find_source, resolve};
pub use settings::{load_config_file, schema_validate};
pub use strategy::loader::load_log;
pub use strategy::{BoundaryRule, Extraction, detector_for};

/// Validate the record parser of `source_id` declared in
/// `config_dir/config_file`, using default limits.
///
/// `log_name` names the sample file inside the source's directory; without it
/// the directory must hold exactly one file matching the source's filter.
#[must_use]
pub fn validate(
    source_id: &str,
    log_name: Option<&str>,
    config_dir: &Path,
    config_file: &str,
) -> ValidationResult {
    let mut options = DiagConfig::default();
    config_dir.clone_into(&mut options.config_dir);
    config_file.clone_into(&mut options.config_file);
    validate_with(source_id, log_name, &options)
}

/// Validate the record parser of `source_id` with explicit options.
///
/// This is the primary public API. Failures never surface as `Err`: every
/// problem becomes a message of a result whose `passed` is `false`.
#[must_use]
pub fn validate_with(
    source_id: &str,
    log_name: Option<&str>,
    options: &DiagConfig,
) -> ValidationResult {
    let mut result = ValidationResult::new(source_id);
    if let Err(e) = run(source_id, log_name, options, &mut result) {
        warn!(source_id, error = %e, "validation stopped");
        result.conclude(ValidationOutcome::Error, e.to_string());
    }
    result
}

fn run(
    source_id: &str,
    log_name: Option<&str>,
    options: &DiagConfig,
    result: &mut ValidationResult,
) -> Result<(), DiagError> {
    let config_path = options.config_path();
    result.note(format!(
        "Validating source ID: {source_id} against configuration {}.",
        config_path.display()
    ));

    let document = settings::load_config_file(
        &options.config_dir,
        &options.config_file,
        options.max_file_size,
    )?;
    let (schema_ok, schema_errors) =
        settings::schema_validate(&options.config_dir, &options.config_file, &document);
    if !schema_ok {
        for error in &schema_errors {
            debug!(error = error.as_str(), "schema violation");
        }
        return Err(DiagError::SchemaValidation {
            errors: schema_errors,
        });
    }
    let config = AgentConfig::from_value(document, &config_path)?;

    let plan = match resolve::resolve(&config, source_id, log_name, options)? {
        Resolution::Inapplicable { reason } => {
            info!(source_id, "nothing to validate");
            result.conclude(ValidationOutcome::NotApplicable, reason);
            return Ok(());
        }
        Resolution::Sample(plan) => plan,
    };

    let parser = plan.rule.parser_name();
    result.record_parser = Some(parser.to_owned());
    result.sample_file = Some(plan.sample.clone());
    result.note(format!(
        "Checking {parser} record boundaries in {}.",
        plan.sample.display()
    ));

    let content = strategy::loader::load_log(&plan.sample, options.max_file_size)?;
    let detector = strategy::detector_for(&plan.rule)?;
    let records = detector.split(&content);
    result.record_count = Some(records.len());
    result.note(format!("Detected {} record(s).", records.len()));

    if let Some(matched) = detector.extraction_matches(&records) {
        result.note(format!(
            "ExtrationPattern matched {matched} of {} record(s).",
            records.len()
        ));
    }

    // A sample with no records at all is let through; only a sample that
    // collapses into exactly one record proves the boundary never matched.
    if records.is_empty() {
        warn!(source_id, sample = %plan.sample.display(), "sample file is empty");
        result.note(format!(
            "Sample file {} is empty: no records to check.",
            plan.sample.display()
        ));
    }

    if records.len() == 1 {
        info!(source_id, parser, "record parser never matched");
        result.conclude(
            ValidationOutcome::InvalidFormat,
            format!("Invalid {parser} format at source ID: {source_id}."),
        );
    } else {
        info!(source_id, parser, records = records.len(), "record parser splits sample");
        result.conclude(
            ValidationOutcome::ValidFormat,
            format!("Valid {parser} format at source ID: {source_id}."),
        );
    }
    Ok(())
}
