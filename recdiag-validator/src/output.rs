//! Shared output formatting for validation results.
//!
//! Provides JSON and plain-text formatters for `ValidationResult`.
//! Color/terminal formatting is left to the CLI layer, which can print
//! [`write_details`] and style [`verdict_line`] itself.

use std::io::Write;

use crate::report::{ValidationOutcome, ValidationResult};

/// Format a `ValidationResult` as JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(result: &ValidationResult, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Format a `ValidationResult` as human-readable plain text to a writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(result: &ValidationResult, writer: &mut dyn Write) -> anyhow::Result<()> {
    write_details(result, writer)?;
    writeln!(writer, "{}", verdict_line(result))?;
    writeln!(writer, "{}", "=".repeat(80))?;
    Ok(())
}

/// Everything [`write_human`] prints except the verdict and closing rule.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_details(result: &ValidationResult, writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer, "  RECORD BOUNDARY DIAGNOSTICS")?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer)?;
    writeln!(writer, "  Source ID:      {}", result.source_id)?;
    if let Some(parser) = &result.record_parser {
        writeln!(writer, "  Record parser:  {parser}")?;
    }
    if let Some(sample) = &result.sample_file {
        writeln!(writer, "  Sample file:    {}", sample.display())?;
    }
    if let Some(count) = result.record_count {
        writeln!(writer, "  Records found:  {count}")?;
    }
    writeln!(writer)?;

    if !result.messages.is_empty() {
        writeln!(writer, "{}", "-".repeat(80))?;
        writeln!(writer, "  MESSAGES")?;
        writeln!(writer, "{}", "-".repeat(80))?;
        for message in &result.messages {
            writeln!(writer, "{message}")?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "{}", "=".repeat(80))?;
    Ok(())
}

/// One-line summary of the verdict.
#[must_use]
pub fn verdict_line(result: &ValidationResult) -> String {
    match result.outcome {
        ValidationOutcome::ValidFormat => format!(
            "\u{2713} Source {} splits its sample into {} records",
            result.source_id,
            result.record_count.unwrap_or_default()
        ),
        ValidationOutcome::NotApplicable => {
            format!("\u{2713} Nothing to validate for source {}", result.source_id)
        }
        ValidationOutcome::InvalidFormat => format!(
            "\u{2717} Source {} does not split its sample: the record parser never matched",
            result.source_id
        ),
        ValidationOutcome::Error => {
            format!("\u{2717} Source {} could not be validated", result.source_id)
        }
    }
}
