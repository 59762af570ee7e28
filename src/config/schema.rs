//! JSON Schema validation for slack-butler configuration

use anyhow::{Result, anyhow};
use serde_json::Value;

/// Embedded JSON schema for the configuration file
const SCHEMA: &str = include_str!("../../docs/schema.json");

/// Compile the embedded JSON schema
///
/// # Errors
///
/// Returns an error if:
/// - The embedded schema is not valid JSON or not a valid draft-07 schema
#[inline]
pub fn get_schema() -> Result<jsonschema::Validator> {
    let schema: Value = serde_json::from_str(SCHEMA)
        .map_err(|e| anyhow!("Failed to parse embedded JSON schema: {e}"))?;

    jsonschema::draft7::new(&schema).map_err(|e| anyhow!("Failed to compile JSON schema: {e}"))
}

/// Validate a configuration value against the schema
///
/// # Errors
///
/// Returns an error if:
/// - The value violates the schema; every violation is listed
#[inline]
pub fn validate_against_schema(config: &Value) -> Result<()> {
    let schema = get_schema()?;

    let error_messages: Vec<String> = schema
        .iter_errors(config)
        .map(|e| format!("  - {e}"))
        .collect();

    if !error_messages.is_empty() {
        return Err(anyhow!(
            "Configuration validation failed:\n{}",
            error_messages.join("\n")
        ));
    }

    Ok(())
}
