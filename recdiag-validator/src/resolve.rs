//! Source resolution.
//!
//! Finds the requested source, decides whether it can be diagnosed at all and,
//! if so, which boundary rule applies and which file is the sample.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::{AgentConfig, DiagConfig, RecordParserKind, SourceDefinition, SourceKind};
use crate::error::DiagError;
use crate::strategy::{BoundaryRule, Extraction};

/// File name filters follow the agent's Windows semantics.
const FILTER_MATCH: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// What the resolver decided about a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing to check for this source; carries the explanation.
    Inapplicable { reason: String },
    /// The sample to split and the rule to split it with.
    Sample(SamplePlan),
}

/// A resolved diagnostic target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePlan {
    pub sample: PathBuf,
    pub rule: BoundaryRule,
}

/// First source whose id equals `id` exactly, in document order.
#[must_use]
pub fn find_source<'a>(config: &'a AgentConfig, id: &str) -> Option<&'a SourceDefinition> {
    config.sources.iter().find(|s| s.id == id)
}

/// Resolve `source_id` into a sample plan.
///
/// With `log_name` the sample is `Directory/log_name` and the directory is
/// not listed. Otherwise exactly one file in `Directory` must match the
/// source's `FileNameFilter`.
///
/// # Errors
///
/// - [`DiagError::SourceNotFound`] if no source has that id
/// - [`DiagError::MissingParserField`] if the parser or `Directory` fields are absent
/// - [`DiagError::AmbiguousOrMissingSample`] if the listing yields zero or several files
/// - [`DiagError::MissingDirectory`], [`DiagError::InvalidDirectory`],
///   [`DiagError::InvalidFilter`] or [`DiagError::Io`] for directory problems
pub fn resolve(
    config: &AgentConfig,
    source_id: &str,
    log_name: Option<&str>,
    options: &DiagConfig,
) -> Result<Resolution, DiagError> {
    let source = find_source(config, source_id).ok_or_else(|| DiagError::SourceNotFound {
        id: source_id.to_owned(),
    })?;

    if source.source_type != SourceKind::Directory {
        return Ok(Resolution::Inapplicable {
            reason: format!(
                "Source ID {source_id} has source type {}: this tool only diagnoses DirectorySource source types.",
                source.source_type
            ),
        });
    }

    let Some(rule) = boundary_rule(source)? else {
        let parser = source
            .record_parser
            .as_ref()
            .map_or_else(|| "(none)".to_owned(), ToString::to_string);
        return Ok(Resolution::Inapplicable {
            reason: format!(
                "Source ID {source_id} uses record parser {parser}: no validation needed, only Timestamp and Regex parsers are diagnosed."
            ),
        });
    };

    let directory = source_directory(source, options.expand_env)?;
    let sample = match log_name {
        Some(name) => directory.join(name),
        None => sole_match(&directory, source.file_name_filter_or_default())?,
    };

    debug!(
        source_id,
        parser = rule.parser_name(),
        sample = %sample.display(),
        "resolved source"
    );
    Ok(Resolution::Sample(SamplePlan { sample, rule }))
}

/// The boundary rule a source declares, or `None` for parsers this tool
/// does not diagnose.
///
/// # Errors
///
/// Returns [`DiagError::MissingParserField`] if a Timestamp source has no
/// `TimestampFormat` or a Regex source has no `Pattern`.
pub fn boundary_rule(source: &SourceDefinition) -> Result<Option<BoundaryRule>, DiagError> {
    let rule = match source.record_parser {
        Some(RecordParserKind::Timestamp) => BoundaryRule::Timestamp {
            format: required(source, source.timestamp_format.as_deref(), "TimestampFormat")?,
        },
        Some(RecordParserKind::Regex) => BoundaryRule::Regex {
            pattern: required(source, source.pattern.as_deref(), "Pattern")?,
            extraction: source
                .extraction_pattern
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| Extraction {
                    pattern: p.to_owned(),
                    options: source.extraction_regex_options.clone(),
                }),
        },
        Some(RecordParserKind::Other(_)) | None => return Ok(None),
    };
    Ok(Some(rule))
}

fn required(
    source: &SourceDefinition,
    value: Option<&str>,
    field: &'static str,
) -> Result<String, DiagError> {
    value
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| DiagError::MissingParserField {
            id: source.id.clone(),
            field,
        })
}

fn source_directory(source: &SourceDefinition, expand_env: bool) -> Result<PathBuf, DiagError> {
    let raw = required(source, source.directory.as_deref(), "Directory")?;
    let directory = if expand_env {
        shellexpand::full(&raw)
            .map_err(|e| DiagError::InvalidDirectory {
                directory: raw.clone(),
                cause: e.to_string(),
            })?
            .into_owned()
    } else {
        raw
    };
    Ok(PathBuf::from(directory))
}

/// Compile a `FileNameFilter`. Several globs may be joined with `|`; `*.*`
/// matches every file, extension or not.
///
/// # Errors
///
/// Returns [`DiagError::InvalidFilter`] if any glob is malformed.
pub fn compile_filter(filter: &str) -> Result<Vec<Pattern>, DiagError> {
    filter
        .split('|')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|f| {
            let glob = if f == "*.*" { "*" } else { f };
            Pattern::new(glob).map_err(|e| DiagError::InvalidFilter {
                filter: filter.to_owned(),
                cause: e.to_string(),
            })
        })
        .collect()
}

/// Names of the regular files directly inside `directory` that match `filter`,
/// sorted.
///
/// # Errors
///
/// See [`resolve`].
pub fn list_candidates(directory: &Path, filter: &str) -> Result<Vec<String>, DiagError> {
    if !directory.is_dir() {
        return Err(DiagError::MissingDirectory {
            path: directory.to_owned(),
        });
    }
    let patterns = compile_filter(filter)?;
    let in_filter = |name: &str| patterns.iter().any(|p| p.matches_with(name, FILTER_MATCH));

    let mut names = Vec::new();
    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Unreadable entries only matter when they could be the sample.
                let path = e
                    .path()
                    .map_or_else(|| directory.to_owned(), Path::to_path_buf);
                let candidate = e.depth() == 0
                    || path
                        .file_name()
                        .is_some_and(|name| in_filter(&*name.to_string_lossy()));
                if !candidate {
                    debug!(path = %path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
                return Err(DiagError::Io {
                    path,
                    source: e.into(),
                });
            }
        };
        let name = entry.file_name().to_string_lossy();
        if in_filter(&*name) && entry.file_type().is_file() {
            names.push(name.into_owned());
        }
    }
    Ok(names)
}

fn sole_match(directory: &Path, filter: &str) -> Result<PathBuf, DiagError> {
    let mut candidates = list_candidates(directory, filter)?;
    debug!(
        directory = %directory.display(),
        filter,
        candidates = candidates.len(),
        "listed sample candidates"
    );
    if candidates.len() == 1
        && let Some(name) = candidates.pop()
    {
        return Ok(directory.join(name));
    }
    Err(DiagError::AmbiguousOrMissingSample {
        directory: directory.to_owned(),
        filter: filter.to_owned(),
        candidates,
    })
}
