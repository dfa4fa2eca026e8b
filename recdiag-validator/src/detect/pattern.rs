//! Regex-delimited records.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::{BoundaryDetector, Record};
use crate::error::DiagError;
use crate::strategy::Extraction;

/// Detects records whose first line matches a start-of-record pattern.
///
/// Carries the optional extraction pattern too. It never moves a boundary, but
/// an extraction pattern that does not compile is as broken as a bad `Pattern`.
#[derive(Debug)]
pub struct PatternDetector {
    start: Regex,
    extraction: Option<Regex>,
}

impl PatternDetector {
    /// Compile the start-of-record `pattern` and the optional `extraction`.
    ///
    /// # Errors
    ///
    /// - [`DiagError::InvalidPattern`] if either expression does not compile
    /// - [`DiagError::InvalidRegexOption`] if an extraction option is unknown
    pub fn new(pattern: &str, extraction: Option<&Extraction>) -> Result<Self, DiagError> {
        let start = Regex::new(pattern).map_err(|e| DiagError::InvalidPattern {
            field: "Pattern",
            pattern: pattern.to_owned(),
            cause: e.to_string(),
        })?;

        let extraction = extraction
            .map(|ex| compile_extraction(&ex.pattern, ex.options.as_deref().unwrap_or_default()))
            .transpose()?;

        debug!(
            pattern,
            has_extraction = extraction.is_some(),
            "compiled record pattern"
        );

        Ok(Self { start, extraction })
    }
}

impl BoundaryDetector for PatternDetector {
    fn is_record_start(&self, line: &str) -> bool {
        self.start.is_match(line)
    }

    fn extraction_matches(&self, records: &[Record]) -> Option<usize> {
        self.extraction
            .as_ref()
            .map(|re| records.iter().filter(|r| re.is_match(&r.text)).count())
    }
}

fn compile_extraction(pattern: &str, options: &str) -> Result<Regex, DiagError> {
    let mut builder = RegexBuilder::new(pattern);
    apply_regex_options(&mut builder, options)?;
    builder.build().map_err(|e| DiagError::InvalidPattern {
        field: "ExtrationPattern",
        pattern: pattern.to_owned(),
        cause: e.to_string(),
    })
}

/// Apply .NET `RegexOptions` names (separated by `,` or `|`) to `builder`.
///
/// Options that only tune the .NET engine are accepted and ignored.
///
/// # Errors
///
/// Returns [`DiagError::InvalidRegexOption`] for a name .NET does not define.
pub fn apply_regex_options(builder: &mut RegexBuilder, options: &str) -> Result<(), DiagError> {
    for name in options
        .split([',', '|'])
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        match name.to_ascii_lowercase().as_str() {
            "ignorecase" => {
                builder.case_insensitive(true);
            }
            "multiline" => {
                builder.multi_line(true);
            }
            "singleline" => {
                builder.dot_matches_new_line(true);
            }
            "ignorepatternwhitespace" => {
                builder.ignore_whitespace(true);
            }
            "none" | "compiled" | "cultureinvariant" | "explicitcapture" | "righttoleft"
            | "ecmascript" | "nonbacktracking" => {}
            _ => {
                return Err(DiagError::InvalidRegexOption {
                    option: name.to_owned(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extraction(pattern: &str, options: Option<&str>) -> Extraction {
        Extraction {
            pattern: pattern.to_owned(),
            options: options.map(str::to_owned),
        }
    }

    #[test]
    fn test_pattern_boundaries() {
        let d = PatternDetector::new(r"^\[\w+\]", None).unwrap();
        let records = d.split("[INFO] a\n  detail\n[WARN] b\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "[INFO] a\n  detail");
    }

    #[test]
    fn test_unanchored_pattern_matches_anywhere() {
        let d = PatternDetector::new("ERROR", None).unwrap();
        assert!(d.is_record_start("2020 ERROR disk full"));
        assert!(!d.is_record_start("2020 INFO ok"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = PatternDetector::new("(unclosed", None).unwrap_err();
        assert!(
            matches!(err, DiagError::InvalidPattern { field: "Pattern", .. }),
            "got: {err}"
        );
    }

    #[test]
    fn test_invalid_extraction_pattern() {
        let ex = extraction("[", None);
        let err = PatternDetector::new("^x", Some(&ex)).unwrap_err();
        assert!(matches!(
            err,
            DiagError::InvalidPattern {
                field: "ExtrationPattern",
                ..
            }
        ));
    }

    #[test]
    fn test_extraction_counts_matching_records() {
        let ex = extraction(r"^(?<time>\d+) (?<level>info|warn)", Some("IgnoreCase"));
        let d = PatternDetector::new(r"^\d+ ", Some(&ex)).unwrap();
        let records = d.split("1 INFO a\n2 WARN b\n3 DEBUG c\n");
        assert_eq!(records.len(), 3);
        assert_eq!(d.extraction_matches(&records), Some(2));
    }

    #[test]
    fn test_regex_options() {
        let mut builder = RegexBuilder::new("a . b");
        apply_regex_options(&mut builder, "IgnorePatternWhitespace, Singleline|Compiled").unwrap();
        let re = builder.build().unwrap();
        assert!(re.is_match("a\nb"));

        let err = apply_regex_options(&mut RegexBuilder::new("a"), "Fast").unwrap_err();
        assert!(matches!(err, DiagError::InvalidRegexOption { ref option } if option == "Fast"));
    }

    #[test]
    fn test_no_extraction_reports_none() {
        let d = PatternDetector::new("^x", None).unwrap();
        assert_eq!(d.extraction_matches(&[]), None);
    }
}
