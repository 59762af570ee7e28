//! Slack Web API access
//!
//! `SlackApi` is the seam between the channel/health operations and Slack.
//! `SlackClient` talks to the real Web API over HTTPS; `MockSlack` keeps an
//! in-memory workspace for tests.

pub mod client;
pub mod mock;
pub mod types;

pub use client::SlackClient;
pub use mock::MockSlack;
pub use types::{AuthInfo, Channel, ChannelText, Message, MessagePage};

use anyhow::Result;
use async_trait::async_trait;

/// Default Slack Web API base URL
pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Operations slack-butler performs against a workspace
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// Check connectivity (`api.test`)
    async fn api_test(&self) -> Result<()>;

    /// Identify the token owner (`auth.test`)
    async fn auth_test(&self) -> Result<AuthInfo>;

    /// List all public channels, following pagination (`conversations.list`)
    async fn list_channels(&self, include_archived: bool) -> Result<Vec<Channel>>;

    /// One page of a channel's messages, newest first (`conversations.history`)
    ///
    /// Pass the previous page's `next_cursor` to continue further back.
    async fn channel_history(
        &self,
        channel_id: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<MessagePage>;

    /// Join a public channel (`conversations.join`)
    async fn join_channel(&self, channel_id: &str) -> Result<()>;

    /// Post a message, returning its timestamp (`chat.postMessage`)
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<String>;

    /// Archive a channel (`conversations.archive`)
    async fn archive_channel(&self, channel_id: &str) -> Result<()>;
}
