//! Operations module
//!
//! Implements the channel and health commands against any `SlackApi`

pub mod archive;
pub mod detect;
pub mod health;
pub mod list;

pub use archive::{ArchiveOptions, ArchivePolicy, ArchiveReport, archive_inactive_channels};
pub use detect::{DetectOptions, DetectReport, detect_new_channels};
pub use health::{HealthReport, run_health_checks};
pub use list::{OutputFormat, list_channels, render_channels};

use crate::config::validation::ChannelRef;
use crate::error::ButlerError;
use crate::slack::Channel;
use anyhow::Result;

/// Find the channel a user reference points at
///
/// # Errors
///
/// Returns a configuration error if:
/// - No listed channel matches the reference
#[inline]
pub fn resolve_channel<'ch>(channels: &'ch [Channel], target: &ChannelRef) -> Result<&'ch Channel> {
    let found = match *target {
        ChannelRef::Id(ref id) => channels.iter().find(|c| c.id == *id),
        ChannelRef::Name(ref name) => channels.iter().find(|c| c.name == *name),
    };

    found.ok_or_else(|| {
        ButlerError::configuration(format!(
            "Channel {target} not found among public, non-archived channels"
        ))
        .into()
    })
}
