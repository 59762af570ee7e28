//! YAML configuration loading and parsing

use crate::config::Config;
use crate::error::ButlerError;
use crate::system::System;
use anyhow::Result;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Load and parse YAML configuration from file
///
/// The raw document is checked against the JSON schema before it is
/// converted, so unknown keys are reported instead of silently ignored.
///
/// # Errors
///
/// Returns a configuration error if:
/// - The file cannot be read
/// - The file is not valid YAML
/// - The document violates the schema or the semantic validation rules
#[inline]
pub fn load_config(system: &dyn System, path: &Path) -> Result<Config> {
    let shown = path.display();

    let content = system.read_to_string(path).map_err(|e| {
        ButlerError::configuration(format!("Failed to read configuration file {shown}: {e}"))
    })?;

    if content.trim().is_empty() {
        debug!("Configuration file {shown} is empty, using defaults");
        return Ok(Config::default());
    }

    let raw: Value = serde_yaml::from_str(&content).map_err(|e| {
        ButlerError::configuration(format!(
            "Failed to parse YAML configuration in file: {shown}\n{e}"
        ))
    })?;

    if raw.is_null() {
        return Ok(Config::default());
    }

    crate::config::schema::validate_against_schema(&raw)
        .map_err(|e| ButlerError::configuration(format!("{shown}: {e}")))?;

    let config: Config = serde_json::from_value(raw).map_err(|e| {
        ButlerError::configuration(format!("Invalid configuration in {shown}: {e}"))
    })?;

    crate::config::validation::validate_config(&config)
        .map_err(|e| ButlerError::configuration(format!("{shown}: {e}")))?;

    debug!("Loaded configuration from {shown}");
    Ok(config)
}
