//! `channels list`

use crate::slack::{Channel, SlackApi};
use crate::utils::time::format_date;
use anyhow::{Context as _, Result};
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// Output formats for channel listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutputFormat {
    /// Aligned, human readable columns
    Table,
    /// JSON array of channel objects
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {s}. Use 'table' or 'json'")),
        }
    }
}

/// Longest purpose shown in table output
const PURPOSE_WIDTH: usize = 50;

/// Fetch every public channel, sorted by name
///
/// # Errors
///
/// Returns an error if:
/// - Listing channels fails
#[inline]
pub async fn list_channels(slack: &dyn SlackApi, include_archived: bool) -> Result<Vec<Channel>> {
    let mut channels = slack
        .list_channels(include_archived)
        .await
        .context("Failed to list channels")?;
    channels.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(channels)
}

/// Render channels in the requested format
///
/// # Errors
///
/// Returns an error if:
/// - JSON serialization fails
#[inline]
pub fn render_channels(channels: &[Channel], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(channels).context("Failed to serialize channels to JSON")
        }
        OutputFormat::Table => {
            render_table(channels).context("Failed to render channel table")
        }
    }
}

fn render_table(channels: &[Channel]) -> Result<String, fmt::Error> {
    if channels.is_empty() {
        return Ok("No channels found.".to_owned());
    }

    let name_width = channels
        .iter()
        .map(|c| c.name.len() + 1)
        .max()
        .unwrap_or(0)
        .max("NAME".len());
    let id_width = channels
        .iter()
        .map(|c| c.id.len())
        .max()
        .unwrap_or(0)
        .max("ID".len());

    let mut out = String::new();
    writeln!(
        out,
        "{:<name_width$}  {:<id_width$}  {:>7}  {:<10}  PURPOSE",
        "NAME", "ID", "MEMBERS", "CREATED"
    )?;

    for channel in channels {
        let name = if channel.is_archived {
            format!("#{} (archived)", channel.name)
        } else {
            format!("#{}", channel.name)
        };
        let members = channel
            .num_members
            .map_or_else(|| "-".to_owned(), |n| n.to_string());
        writeln!(
            out,
            "{name:<name_width$}  {:<id_width$}  {members:>7}  {:<10}  {}",
            channel.id,
            format_date(channel.created),
            truncate(&channel.purpose.value, PURPOSE_WIDTH)
        )?;
    }

    write!(out, "\n{} channel(s)", channels.len())?;
    Ok(out)
}

/// Shorten to `max` characters on a char boundary, marking the cut
fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let kept: String = single_line.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
