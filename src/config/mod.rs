//! Configuration management module
//!
//! Handles YAML configuration parsing, JSON schema validation, and resolving
//! settings from CLI flags, environment variables, the config file and defaults
//! (in that order of precedence).

pub mod schema;
pub mod validation;
pub mod yaml;

use crate::cli::GlobalArgs;
use crate::error::ButlerError;
use crate::slack::DEFAULT_API_URL;
use crate::system::System;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Environment variable holding the Slack token
pub const TOKEN_ENV: &str = "SLACK_TOKEN";

/// Environment variable overriding the Web API base URL
pub const API_URL_ENV: &str = "SLACK_API_URL";

/// Environment variable pointing at a configuration file
pub const CONFIG_ENV: &str = "SLACK_BUTLER_CONFIG";

/// Default look-back window for `channels detect`
pub const DEFAULT_SINCE_DAYS: u32 = 8;

/// Default inactivity window before a warning is posted
pub const DEFAULT_WARN_DAYS: u32 = 30;

/// Default grace period between warning and archival
pub const DEFAULT_ARCHIVE_DAYS: u32 = 30;

/// Settings for `channels detect`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetectConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since_days: Option<u32>,

    /// Channel that receives new-channel announcements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announce_to: Option<String>,
}

/// Settings for `channels archive`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warn_days: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_days: Option<u32>,

    /// Channel names never warned or archived
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Channel name prefixes never warned or archived
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_prefixes: Vec<String>,

    /// Replaces the default inactivity warning text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_message: Option<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Slack token; prefer `SLACK_TOKEN`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Web API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default)]
    pub detect: DetectConfig,

    #[serde(default)]
    pub archive: ArchiveConfig,
}

impl Config {
    /// Locate and load the configuration file
    ///
    /// An explicitly named file (`--config` or `SLACK_BUTLER_CONFIG`) must
    /// exist; a missing default file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    /// - An explicitly named file does not exist
    /// - The file cannot be loaded or fails validation
    #[inline]
    pub fn discover(system: &dyn System, explicit: Option<&str>) -> Result<Self> {
        let explicit = explicit
            .map(str::to_owned)
            .or_else(|| non_empty_env(system, CONFIG_ENV));

        if let Some(path) = explicit {
            let path = PathBuf::from(path);
            if !system.is_file(&path) {
                return Err(ButlerError::configuration(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
                .into());
            }
            return yaml::load_config(system, &path);
        }

        match default_config_path(system) {
            Some(path) if system.is_file(&path) => yaml::load_config(system, &path),
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any value is invalid
    #[inline]
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

/// `<config dir>/slack-butler/config.yaml`
#[must_use]
#[inline]
pub fn default_config_path(system: &dyn System) -> Option<PathBuf> {
    system
        .config_dir()
        .map(|dir| dir.join("slack-butler").join("config.yaml"))
}

fn non_empty_env(system: &dyn System, key: &str) -> Option<String> {
    system
        .env_var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Everything a Slack-facing command needs, fully resolved
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Settings {
    pub token: String,
    pub api_url: String,
    pub config: Config,
}

impl Settings {
    /// Resolve settings from global CLI flags, environment and config file
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    /// - The config file cannot be loaded
    /// - No token is available, or the token or API URL is malformed
    #[inline]
    pub fn resolve(system: &dyn System, global: &GlobalArgs) -> Result<Self> {
        let config = Config::discover(system, global.config.as_deref())?;

        let token = global
            .token
            .clone()
            .or_else(|| non_empty_env(system, TOKEN_ENV))
            .or_else(|| config.token.clone())
            .ok_or_else(|| {
                ButlerError::configuration(
                    "No Slack token found\n\
                    Pass --token, set SLACK_TOKEN, or add 'token' to the config file",
                )
            })?;
        validation::validate_token(&token).map_err(|e| ButlerError::configuration(e.to_string()))?;

        let api_url = global
            .api_url
            .clone()
            .or_else(|| non_empty_env(system, API_URL_ENV))
            .or_else(|| config.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        validation::validate_api_url(&api_url)
            .map_err(|e| ButlerError::configuration(e.to_string()))?;

        debug!("Using Slack API at {api_url}");
        Ok(Self {
            token,
            api_url,
            config,
        })
    }
}
