//! Configuration validation logic

use crate::config::Config;
use anyhow::{Result, anyhow};
use regex::Regex;
use std::fmt;

/// Smallest accepted day window
pub const MIN_DAYS: u32 = 1;

/// Largest accepted day window (ten years)
pub const MAX_DAYS: u32 = 3650;

/// A reference to a channel given by the user
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChannelRef {
    /// Channel ID such as `C01ABCDEF`
    Id(String),
    /// Channel name without the leading `#`
    Name(String),
}

impl fmt::Display for ChannelRef {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Id(ref id) => write!(f, "{id}"),
            Self::Name(ref name) => write!(f, "#{name}"),
        }
    }
}

/// Validate a complete configuration
///
/// # Errors
///
/// Returns an error if:
/// - The token or API URL has an invalid format
/// - The announce channel is not a valid channel reference
/// - A day window is outside the accepted range
/// - An excluded channel name is invalid
#[inline]
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(token) = config.token.as_ref() {
        validate_token(token)?;
    }

    if let Some(url) = config.api_url.as_ref() {
        validate_api_url(url)?;
    }

    if let Some(days) = config.detect.since_days {
        validate_days("detect.since_days", days)?;
    }

    if let Some(channel) = config.detect.announce_to.as_ref() {
        parse_channel_ref(channel).map_err(|e| anyhow!("detect.announce_to: {e}"))?;
    }

    if let Some(days) = config.archive.warn_days {
        validate_days("archive.warn_days", days)?;
    }

    if let Some(days) = config.archive.archive_days {
        validate_days("archive.archive_days", days)?;
    }

    for (index, name) in config.archive.exclude.iter().enumerate() {
        validate_channel_name(name.trim_start_matches('#'))
            .map_err(|e| anyhow!("archive.exclude #{}: {e}", index + 1))?;
    }

    for (index, prefix) in config.archive.exclude_prefixes.iter().enumerate() {
        if prefix.trim().is_empty() {
            return Err(anyhow!(
                "archive.exclude_prefixes #{}: Prefix cannot be empty",
                index + 1
            ));
        }
    }

    if let Some(message) = config.archive.warning_message.as_ref()
        && message.trim().is_empty()
    {
        return Err(anyhow!("archive.warning_message cannot be empty"));
    }

    Ok(())
}

/// Validate the shape of a Slack token
///
/// # Errors
///
/// Returns an error if:
/// - The token does not look like a Slack bot, user or app token
#[inline]
pub fn validate_token(token: &str) -> Result<()> {
    let regex = Regex::new(r"^xox[abpors]-[A-Za-z0-9-]+$")?;
    if regex.is_match(token) {
        return Ok(());
    }

    Err(anyhow!(
        "Invalid Slack token format\n\
        Expected a bot token (xoxb-...) or user token (xoxp-...)"
    ))
}

/// Validate the Slack Web API base URL
///
/// # Errors
///
/// Returns an error if:
/// - The URL is not an http(s) URL
#[inline]
pub fn validate_api_url(url: &str) -> Result<()> {
    let regex = Regex::new(r"^https?://[^\s/]+(/\S*)?$")?;
    if regex.is_match(url) {
        return Ok(());
    }

    Err(anyhow!(
        "Invalid API URL: '{url}'. Expected an http:// or https:// URL"
    ))
}

/// Validate a day window
///
/// # Errors
///
/// Returns an error if:
/// - The value is outside `MIN_DAYS..=MAX_DAYS`
#[inline]
pub fn validate_days(field: &str, days: u32) -> Result<()> {
    if (MIN_DAYS..=MAX_DAYS).contains(&days) {
        return Ok(());
    }

    Err(anyhow!(
        "{field} must be between {MIN_DAYS} and {MAX_DAYS} days, got {days}"
    ))
}

/// Validate a Slack channel name (without `#`)
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty, too long, or contains characters Slack does not allow
#[inline]
pub fn validate_channel_name(name: &str) -> Result<()> {
    let regex = Regex::new(r"^[a-z0-9][a-z0-9._-]{0,79}$")?;
    if regex.is_match(name) {
        return Ok(());
    }

    Err(anyhow!(
        "Invalid channel name: '{name}'\n\
        Channel names are lowercase letters, numbers, hyphens, underscores and periods (max 80)"
    ))
}

/// Parse `#name`, `name` or a channel ID into a `ChannelRef`
///
/// # Errors
///
/// Returns an error if:
/// - The value is neither a channel ID nor a valid channel name
#[inline]
pub fn parse_channel_ref(value: &str) -> Result<ChannelRef> {
    let value = value.trim();
    let id_regex = Regex::new(r"^[CG][A-Z0-9]{8,}$")?;
    if id_regex.is_match(value) {
        return Ok(ChannelRef::Id(value.to_owned()));
    }

    let name = value.strip_prefix('#').unwrap_or(value);
    validate_channel_name(name)?;
    Ok(ChannelRef::Name(name.to_owned()))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::config::{ArchiveConfig, DetectConfig};

    #[test]
    fn channel_ref_forms() {
        assert_eq!(
            parse_channel_ref("#general").unwrap(),
            ChannelRef::Name("general".to_owned())
        );
        assert_eq!(
            parse_channel_ref("dev-ops").unwrap(),
            ChannelRef::Name("dev-ops".to_owned())
        );
        assert_eq!(
            parse_channel_ref("C01ABCDEF2").unwrap(),
            ChannelRef::Id("C01ABCDEF2".to_owned())
        );
        assert!(parse_channel_ref("#General Chat").is_err());
        assert!(parse_channel_ref("#").is_err());
    }

    #[test]
    fn channel_ref_display() {
        assert_eq!(ChannelRef::Name("general".to_owned()).to_string(), "#general");
        assert_eq!(ChannelRef::Id("C01ABCDEF2".to_owned()).to_string(), "C01ABCDEF2");
    }

    #[test]
    fn config_with_bad_exclude_fails() {
        let config = Config {
            archive: ArchiveConfig {
                exclude: vec!["Not Valid".to_owned()],
                ..ArchiveConfig::default()
            },
            ..Config::default()
        };
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("archive.exclude #1"));
    }

    #[test]
    fn config_with_bad_announce_channel_fails() {
        let config = Config {
            detect: DetectConfig {
                since_days: Some(7),
                announce_to: Some("#Announcements!".to_owned()),
            },
            ..Config::default()
        };
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("detect.announce_to"));
    }

    #[test]
    fn default_config_is_valid() {
        validate_config(&Config::default()).unwrap();
    }
}
