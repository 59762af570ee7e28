//! `channels archive`
//!
//! Inactive channels first receive a warning message carrying
//! [`WARNING_MARKER`]. A channel whose latest warning is still the newest
//! activity after `archive_days` is archived. Any real message posted after a
//! warning resets the cycle.

use crate::error::ButlerError;
use crate::slack::{AuthInfo, Channel, Message, SlackApi};
use crate::utils::time::days_between;
use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use tracing::{debug, info, warn};

/// Tag identifying inactivity warnings posted by slack-butler
pub const WARNING_MARKER: &str = "[slack-butler:inactivity-warning]";

/// Messages fetched per history page
pub const HISTORY_LIMIT: u32 = 100;

/// History pages read per channel before giving up on finding activity
pub const MAX_HISTORY_PAGES: usize = 10;

/// Thresholds and exclusions for the archive run
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct ArchivePolicy {
    pub warn_days: u32,
    pub archive_days: u32,
    pub exclude: Vec<String>,
    pub exclude_prefixes: Vec<String>,
    pub warning_message: Option<String>,
}

impl ArchivePolicy {
    /// Create a policy with no exclusions and the default warning text
    #[must_use]
    #[inline]
    pub const fn new(warn_days: u32, archive_days: u32) -> Self {
        Self {
            warn_days,
            archive_days,
            exclude: Vec::new(),
            exclude_prefixes: Vec::new(),
            warning_message: None,
        }
    }

    /// Never touch channels with these names (a leading `#` is ignored)
    #[must_use]
    #[inline]
    pub fn with_exclude(mut self, names: Vec<String>) -> Self {
        self.exclude = names
            .into_iter()
            .map(|n| n.trim_start_matches('#').to_owned())
            .collect();
        self
    }

    /// Never touch channels whose names start with one of these prefixes
    #[must_use]
    #[inline]
    pub fn with_exclude_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.exclude_prefixes = prefixes;
        self
    }

    /// Replace the default warning text
    #[must_use]
    #[inline]
    pub fn with_warning_message(mut self, message: Option<String>) -> Self {
        self.warning_message = message;
        self
    }

    /// Why a channel is exempt from the policy, if it is
    #[must_use]
    #[inline]
    pub fn exclusion_reason(&self, channel: &Channel) -> Option<String> {
        if channel.is_general {
            return Some("workspace general channel".to_owned());
        }
        if self.exclude.iter().any(|name| *name == channel.name) {
            return Some("excluded by name".to_owned());
        }
        self.exclude_prefixes
            .iter()
            .find(|prefix| channel.name.starts_with(prefix.as_str()))
            .map(|prefix| format!("excluded by prefix '{prefix}'"))
    }

    /// Text of the inactivity warning, always ending with the marker
    #[must_use]
    #[inline]
    pub fn warning_text(&self) -> String {
        let body = self.warning_message.clone().unwrap_or_else(|| {
            format!(
                ":warning: This channel has had no activity for {} days. \
                It will be archived in {} days unless someone posts a message.",
                self.warn_days, self.archive_days
            )
        });
        format!("{body}\n{WARNING_MARKER}")
    }
}

/// Decision for one channel
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChannelAction {
    /// Exempt from the policy
    Excluded { reason: String },
    /// Could not be evaluated
    Skipped { reason: String },
    /// Recent activity
    Active { idle_days: i64 },
    /// Idle past `warn_days`: post a warning
    Warn { idle_days: i64 },
    /// Warning posted, grace period still running
    Warned { days_left: i64 },
    /// Grace period over: archive
    Archive { days_since_warning: i64 },
}

impl fmt::Display for ChannelAction {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Excluded { ref reason } => write!(f, "excluded ({reason})"),
            Self::Skipped { ref reason } => write!(f, "skipped ({reason})"),
            Self::Active { idle_days } => write!(f, "active (idle {idle_days} days)"),
            Self::Warn { idle_days } => write!(f, "warn (idle {idle_days} days)"),
            Self::Warned { days_left } => {
                write!(f, "warned ({days_left} days until archival)")
            }
            Self::Archive { days_since_warning } => {
                write!(f, "archive (warned {days_since_warning} days ago)")
            }
        }
    }
}

/// Whether `message` is an inactivity warning posted by the butler itself
#[must_use]
#[inline]
pub fn is_own_warning(message: &Message, identity: &AuthInfo) -> bool {
    if !message.text.contains(WARNING_MARKER) {
        return false;
    }
    let by_user = message.user.as_deref() == Some(identity.user_id.as_str());
    let by_bot = identity.bot_id.is_some() && message.bot_id == identity.bot_id;
    by_user || by_bot
}

/// Whether `message` counts as channel activity
fn is_activity(message: &Message, identity: &AuthInfo) -> bool {
    !is_own_warning(message, identity) && !message.is_membership_event()
}

/// Recent messages of a channel, newest first
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ChannelHistory {
    pub messages: Vec<Message>,
    /// False when older messages exist that were not read
    pub complete: bool,
}

impl ChannelHistory {
    /// History that reaches back to the channel's creation
    #[must_use]
    #[inline]
    pub const fn complete(messages: Vec<Message>) -> Self {
        Self {
            messages,
            complete: true,
        }
    }

    /// History cut off before the channel's creation
    #[must_use]
    #[inline]
    pub const fn truncated(messages: Vec<Message>) -> Self {
        Self {
            messages,
            complete: false,
        }
    }
}

/// Classify one channel from its recent history
///
/// Without any activity in a complete history the creation time counts as
/// the last activity. In a truncated history the oldest message read is used
/// instead, since anything older is unknown.
#[must_use]
#[inline]
pub fn classify_channel(
    now: i64,
    channel: &Channel,
    history: &ChannelHistory,
    identity: &AuthInfo,
    policy: &ArchivePolicy,
) -> ChannelAction {
    let messages = &history.messages;
    let fallback = if history.complete {
        channel.created
    } else {
        messages
            .iter()
            .filter_map(Message::timestamp)
            .min()
            .map_or(channel.created, |oldest| oldest.max(channel.created))
    };

    let last_activity = messages
        .iter()
        .filter(|m| is_activity(m, identity))
        .filter_map(Message::timestamp)
        .max()
        .unwrap_or(fallback);

    let last_warning = messages
        .iter()
        .filter(|m| is_own_warning(m, identity))
        .filter_map(Message::timestamp)
        .max();

    if let Some(warned_at) = last_warning
        && warned_at > last_activity
    {
        let days_since_warning = days_between(warned_at, now);
        let archive_days = i64::from(policy.archive_days);
        if days_since_warning >= archive_days {
            return ChannelAction::Archive { days_since_warning };
        }
        return ChannelAction::Warned {
            days_left: archive_days - days_since_warning,
        };
    }

    let idle_days = days_between(last_activity, now);
    if idle_days >= i64::from(policy.warn_days) {
        ChannelAction::Warn { idle_days }
    } else {
        ChannelAction::Active { idle_days }
    }
}

/// Options for an archive run
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ArchiveOptions {
    pub policy: ArchivePolicy,
    pub dry_run: bool,
}

impl ArchiveOptions {
    /// Create archive options
    #[must_use]
    #[inline]
    pub const fn new(policy: ArchivePolicy, dry_run: bool) -> Self {
        Self { policy, dry_run }
    }
}

/// What happened to one channel
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ChannelOutcome {
    pub channel: Channel,
    pub action: ChannelAction,
    /// Failure while evaluating or acting on the channel
    pub error: Option<String>,
}

/// Result of an archive run
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ArchiveReport {
    pub dry_run: bool,
    pub outcomes: Vec<ChannelOutcome>,
}

impl ArchiveReport {
    fn count(&self, pred: impl Fn(&ChannelAction) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.error.is_none() && pred(&o.action))
            .count()
    }

    /// Channels warned (or that would be warned in a dry run)
    #[must_use]
    #[inline]
    pub fn warned(&self) -> usize {
        self.count(|a| matches!(a, ChannelAction::Warn { .. }))
    }

    /// Channels archived (or that would be archived in a dry run)
    #[must_use]
    #[inline]
    pub fn archived(&self) -> usize {
        self.count(|a| matches!(a, ChannelAction::Archive { .. }))
    }

    /// Channels whose evaluation or action failed
    #[must_use]
    #[inline]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }

    /// Turn per-channel failures into an API error
    ///
    /// # Errors
    ///
    /// Returns an API error if:
    /// - Any channel failed
    #[inline]
    pub fn into_result(self) -> Result<Self> {
        let failed = self.failed();
        if failed > 0 {
            return Err(ButlerError::api(format!(
                "{failed} channel(s) could not be processed"
            ))
            .into());
        }
        Ok(self)
    }
}

impl fmt::Display for ArchiveReport {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            writeln!(f, "Dry run preview - no channels will be modified:")?;
        }

        for outcome in &self.outcomes {
            write!(f, "  #{:<30} {}", outcome.channel.name, outcome.action)?;
            if let Some(error) = outcome.error.as_ref() {
                write!(f, "  FAILED: {error}")?;
            }
            writeln!(f)?;
        }

        let (warn_verb, archive_verb) = if self.dry_run {
            ("would warn", "would archive")
        } else {
            ("warned", "archived")
        };
        write!(
            f,
            "\n{} channel(s) checked: {} {}, {} {}, {} failed",
            self.outcomes.len(),
            warn_verb,
            self.warned(),
            archive_verb,
            self.archived(),
            self.failed()
        )?;

        if self.dry_run {
            write!(f, "\nRun without --dry-run to apply these changes.")?;
        }
        Ok(())
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let progress = ProgressBar::new(u64::try_from(len).unwrap_or(u64::MAX));
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
        progress.set_style(style.progress_chars("=> "));
    }
    progress
}

/// Read history pages until real activity shows up or the history ends
///
/// Pages come newest first, so any warning newer than the first activity
/// found is already included.
async fn read_history(
    slack: &dyn SlackApi,
    channel: &Channel,
    identity: &AuthInfo,
) -> Result<ChannelHistory> {
    let mut messages = Vec::new();
    let mut cursor: Option<String> = None;

    for page_number in 1..=MAX_HISTORY_PAGES {
        let page = slack
            .channel_history(&channel.id, HISTORY_LIMIT, cursor.as_deref())
            .await
            .context("Failed to read channel history")?;
        let found_activity = page.messages.iter().any(|m| is_activity(m, identity));
        messages.extend(page.messages);

        match page.next_cursor {
            None => return Ok(ChannelHistory::complete(messages)),
            Some(_) if found_activity => return Ok(ChannelHistory::truncated(messages)),
            Some(next) => {
                debug!("#{}: no activity in history page {page_number}", channel.name);
                cursor = Some(next);
            }
        }
    }

    debug!(
        "#{}: stopped after {MAX_HISTORY_PAGES} history pages without activity",
        channel.name
    );
    Ok(ChannelHistory::truncated(messages))
}

/// Evaluate one channel and, unless dry-running, act on the decision
async fn process_channel(
    slack: &dyn SlackApi,
    now: i64,
    channel: &Channel,
    identity: &AuthInfo,
    options: &ArchiveOptions,
) -> Result<ChannelAction> {
    if let Some(reason) = options.policy.exclusion_reason(channel) {
        return Ok(ChannelAction::Excluded { reason });
    }

    if !channel.is_member {
        if options.dry_run {
            return Ok(ChannelAction::Skipped {
                reason: "not a member; history needs a live run to join".to_owned(),
            });
        }
        debug!("Joining #{} to read its history", channel.name);
        slack
            .join_channel(&channel.id)
            .await
            .context("Failed to join channel")?;
    }

    let history = read_history(slack, channel, identity).await?;
    let action = classify_channel(now, channel, &history, identity, &options.policy);

    if options.dry_run {
        return Ok(action);
    }

    match action {
        ChannelAction::Warn { idle_days } => {
            slack
                .post_message(&channel.id, &options.policy.warning_text())
                .await
                .context("Failed to post inactivity warning")?;
            info!("Warned #{} (idle {idle_days} days)", channel.name);
        }
        ChannelAction::Archive { .. } => {
            slack
                .archive_channel(&channel.id)
                .await
                .context("Failed to archive channel")?;
            info!("Archived #{}", channel.name);
        }
        ChannelAction::Excluded { .. }
        | ChannelAction::Skipped { .. }
        | ChannelAction::Active { .. }
        | ChannelAction::Warned { .. } => {}
    }

    Ok(action)
}

/// Warn about and archive inactive channels
///
/// Per-channel failures are recorded in the report; only failures that
/// prevent the run from starting are returned as errors.
///
/// # Errors
///
/// Returns an error if:
/// - The token identity cannot be determined
/// - Listing channels fails
#[inline]
pub async fn archive_inactive_channels(
    slack: &dyn SlackApi,
    now: i64,
    options: &ArchiveOptions,
) -> Result<ArchiveReport> {
    let identity = slack
        .auth_test()
        .await
        .context("Failed to identify the token owner")?;
    let mut channels = slack
        .list_channels(false)
        .await
        .context("Failed to list channels")?;
    channels.sort_by(|a, b| a.name.cmp(&b.name));

    info!(
        "Checking {} channel(s): warn after {} days, archive {} days after warning",
        channels.len(),
        options.policy.warn_days,
        options.policy.archive_days
    );

    let progress = progress_bar(channels.len());
    let mut outcomes = Vec::with_capacity(channels.len());

    for channel in channels {
        progress.set_message(format!("#{}", channel.name));
        let (action, error) =
            match process_channel(slack, now, &channel, &identity, options).await {
                Ok(action) => (action, None),
                Err(err) => {
                    warn!("#{}: {err:#}", channel.name);
                    (
                        ChannelAction::Skipped {
                            reason: "error".to_owned(),
                        },
                        Some(format!("{err:#}")),
                    )
                }
            };
        outcomes.push(ChannelOutcome {
            channel,
            action,
            error,
        });
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(ArchiveReport {
        dry_run: options.dry_run,
        outcomes,
    })
}
