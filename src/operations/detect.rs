//! `channels detect`
//!
//! Finds channels created within a look-back window and optionally announces
//! them in another channel.

use crate::config::validation::ChannelRef;
use crate::operations::resolve_channel;
use crate::slack::{Channel, SlackApi};
use crate::utils::time::{days_ago, format_date};
use anyhow::{Context as _, Result};
use std::fmt;
use tracing::{debug, info};

/// Options for a detect run
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct DetectOptions {
    pub since_days: u32,
    pub announce_to: Option<ChannelRef>,
    pub dry_run: bool,
}

impl DetectOptions {
    /// Create detect options
    #[must_use]
    #[inline]
    pub const fn new(since_days: u32, announce_to: Option<ChannelRef>, dry_run: bool) -> Self {
        Self {
            since_days,
            announce_to,
            dry_run,
        }
    }
}

/// What happened to the announcement
///
/// `channel` is `#name`, or the bare ID for channels outside the public list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Announcement {
    /// No announce channel configured
    NotRequested,
    /// Announce channel configured but no new channels found
    NothingToAnnounce,
    /// Dry run: the message that would have been posted
    DryRun { channel: String, text: String },
    /// Message posted
    Posted { channel: String, ts: String },
}

/// Result of a detect run
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct DetectReport {
    pub since_days: u32,
    pub channels: Vec<Channel>,
    pub announcement: Announcement,
}

impl fmt::Display for DetectReport {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.channels.is_empty() {
            write!(
                f,
                "No new channels created in the last {} days.",
                self.since_days
            )?;
        } else {
            writeln!(
                f,
                "Found {} new channel(s) created in the last {} days:",
                self.channels.len(),
                self.since_days
            )?;
            for channel in &self.channels {
                write!(f, "  #{}  (created {})", channel.name, format_date(channel.created))?;
                if !channel.purpose.value.is_empty() {
                    write!(f, "  {}", channel.purpose.value)?;
                }
                writeln!(f)?;
            }
        }

        match self.announcement {
            Announcement::NotRequested | Announcement::NothingToAnnounce => Ok(()),
            Announcement::DryRun {
                ref channel,
                ref text,
            } => write!(f, "\nDry run preview: would post to {channel}:\n{text}"),
            Announcement::Posted { ref channel, .. } => {
                write!(f, "\nAnnouncement posted to {channel}.")
            }
        }
    }
}

/// Where the announcement goes
#[derive(Debug, Clone, PartialEq, Eq)]
struct AnnounceTarget {
    id: String,
    /// `#name` for listed channels, the bare ID otherwise
    label: String,
    needs_join: bool,
}

/// Resolve the announce channel against the public channel list
///
/// Names must be listed. IDs missing from the list (private channels the
/// token already belongs to) are posted to directly.
fn announce_target(channels: &[Channel], target: &ChannelRef) -> Result<AnnounceTarget> {
    if let ChannelRef::Id(ref id) = *target
        && !channels.iter().any(|c| c.id == *id)
    {
        return Ok(AnnounceTarget {
            id: id.clone(),
            label: id.clone(),
            needs_join: false,
        });
    }

    let channel = resolve_channel(channels, target)?;
    Ok(AnnounceTarget {
        id: channel.id.clone(),
        label: format!("#{}", channel.name),
        needs_join: !channel.is_member,
    })
}

/// Channels created at or after `now - since_days`, newest first
#[must_use]
#[inline]
pub fn find_new_channels(channels: &[Channel], now: i64, since_days: u32) -> Vec<Channel> {
    let cutoff = days_ago(now, since_days);
    let mut recent: Vec<Channel> = channels
        .iter()
        .filter(|c| !c.is_archived && c.created >= cutoff)
        .cloned()
        .collect();
    recent.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.name.cmp(&b.name)));
    recent
}

/// Announcement text listing the new channels
#[must_use]
#[inline]
pub fn announcement_text(channels: &[Channel], since_days: u32) -> String {
    let mut text = format!(
        ":wave: {} new channel(s) created in the last {} days:",
        channels.len(),
        since_days
    );
    for channel in channels {
        text.push_str("\n• ");
        text.push_str(&channel.mention());
        if !channel.purpose.value.is_empty() {
            text.push_str(": ");
            text.push_str(&channel.purpose.value);
        }
    }
    text
}

/// Detect new channels and announce them when requested
///
/// # Errors
///
/// Returns an error if:
/// - Listing channels fails
/// - The announce channel is given by name and does not exist
/// - Joining or posting to the announce channel fails
#[inline]
pub async fn detect_new_channels(
    slack: &dyn SlackApi,
    now: i64,
    options: &DetectOptions,
) -> Result<DetectReport> {
    let all = slack
        .list_channels(false)
        .await
        .context("Failed to list channels")?;
    let channels = find_new_channels(&all, now, options.since_days);
    info!(
        "Found {} channel(s) created in the last {} days",
        channels.len(),
        options.since_days
    );

    let target = options
        .announce_to
        .as_ref()
        .map(|target| announce_target(&all, target))
        .transpose()?;

    let announcement = match target {
        None => Announcement::NotRequested,
        Some(_) if channels.is_empty() => Announcement::NothingToAnnounce,
        Some(target) => {
            let text = announcement_text(&channels, options.since_days);

            if options.dry_run {
                Announcement::DryRun {
                    channel: target.label,
                    text,
                }
            } else {
                if target.needs_join {
                    debug!("Joining {} to post the announcement", target.label);
                    slack
                        .join_channel(&target.id)
                        .await
                        .with_context(|| format!("Failed to join {}", target.label))?;
                }
                let ts = slack
                    .post_message(&target.id, &text)
                    .await
                    .with_context(|| format!("Failed to post announcement to {}", target.label))?;
                info!("Announcement posted to {}", target.label);
                Announcement::Posted {
                    channel: target.label,
                    ts,
                }
            }
        }
    };

    Ok(DetectReport {
        since_days: options.since_days,
        channels,
        announcement,
    })
}
