//! Agent configuration loading and structural validation.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::DiagError;
use crate::strategy::loader::read_text_bounded;

/// JSON schema of the agent configuration, limited to what sources look like.
const CONFIG_SCHEMA: &str = include_str!("../schema/appsettings.schema.json");

/// Read and parse `base_dir/file_name` as a JSON document.
///
/// # Errors
///
/// Returns [`DiagError::ConfigLoad`] if the file is missing, unreadable,
/// larger than `max_file_size` or not valid JSON.
pub fn load_config_file(
    base_dir: &Path,
    file_name: &str,
    max_file_size: u64,
) -> Result<Value, DiagError> {
    let path = base_dir.join(file_name);
    debug!(path = %path.display(), "loading configuration");

    let text = read_text_bounded(&path, max_file_size).map_err(|e| DiagError::ConfigLoad {
        path: path.clone(),
        cause: match e {
            DiagError::Io { source, .. } => source.to_string(),
            other => other.to_string(),
        },
    })?;

    serde_json::from_str(&text).map_err(|e| DiagError::ConfigLoad {
        path,
        cause: format!("JSON parse error: {e}"),
    })
}

/// Check `document` against the agent configuration schema.
///
/// Returns whether the document is valid and one message per schema error,
/// prefixed with the configuration file path.
#[must_use]
pub fn schema_validate(base_dir: &Path, file_name: &str, document: &Value) -> (bool, Vec<String>) {
    let origin = base_dir.join(file_name);

    let schema: Value = match serde_json::from_str(CONFIG_SCHEMA) {
        Ok(schema) => schema,
        Err(e) => return (false, vec![format!("Configuration schema is not valid JSON: {e}")]),
    };
    let validator = match jsonschema::validator_for(&schema) {
        Ok(validator) => validator,
        Err(e) => return (false, vec![format!("Failed to compile configuration schema: {e}")]),
    };

    let messages: Vec<String> = validator
        .iter_errors(document)
        .map(|error| format!("{}: {error}", origin.display()))
        .collect();
    (messages.is_empty(), messages)
}
