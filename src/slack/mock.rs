//! Mock Slack workspace for testing

use super::SlackApi;
use super::client::AUTH_ERROR_CODES;
use super::types::{AuthInfo, Channel, Message, MessagePage};
use crate::error::ButlerError;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory implementation of `SlackApi` for testing
///
/// Every write (join, post, archive) is recorded so tests can assert on what
/// an operation did. Failures can be injected per Web API method.
///
/// # Example
/// ```
/// use slack_butler::slack::{Channel, MockSlack};
///
/// let slack = MockSlack::new()
///     .with_channel(Channel::new("C1", "general", 1_600_000_000))
///     .unwrap();
///
/// assert!(slack.posted().unwrap().is_empty());
/// ```
#[derive(Clone)]
pub struct MockSlack {
    state: Arc<RwLock<MockSlackState>>,
}

struct MockSlackState {
    auth: AuthInfo,
    reachable: bool,
    channels: Vec<Channel>,
    histories: HashMap<String, Vec<Message>>,
    failures: HashMap<String, String>,
    joined: Vec<String>,
    posted: Vec<(String, String)>,
    archived: Vec<String>,
    next_ts: i64,
}

impl MockSlack {
    /// Create an empty workspace with a valid bot identity `UBOT`
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockSlackState {
                auth: AuthInfo {
                    url: "https://example.slack.com/".to_owned(),
                    team: "Example".to_owned(),
                    team_id: "T0001".to_owned(),
                    user: "butler".to_owned(),
                    user_id: "UBOT".to_owned(),
                    bot_id: Some("BBOT".to_owned()),
                    scopes: Vec::new(),
                },
                reachable: true,
                channels: Vec::new(),
                histories: HashMap::new(),
                failures: HashMap::new(),
                joined: Vec::new(),
                posted: Vec::new(),
                archived: Vec::new(),
                next_ts: 1_800_000_000,
            })),
        }
    }

    fn write_state(&self) -> Result<std::sync::RwLockWriteGuard<'_, MockSlackState>> {
        self.state
            .write()
            .map_err(|e| anyhow!("MockSlack state poisoned: {e}"))
    }

    fn read_state(&self) -> Result<std::sync::RwLockReadGuard<'_, MockSlackState>> {
        self.state
            .read()
            .map_err(|e| anyhow!("MockSlack state poisoned: {e}"))
    }

    /// Add a channel (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn with_channel(self, channel: Channel) -> Result<Self> {
        self.write_state()?.channels.push(channel);
        Ok(self)
    }

    /// Set the history of a channel, newest message first (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn with_history(self, channel_id: &str, messages: Vec<Message>) -> Result<Self> {
        self.write_state()?
            .histories
            .insert(channel_id.to_owned(), messages);
        Ok(self)
    }

    /// Replace the `auth.test` identity (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn with_auth(self, auth: AuthInfo) -> Result<Self> {
        self.write_state()?.auth = auth;
        Ok(self)
    }

    /// Set the OAuth scopes reported by `auth.test` (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn with_scopes(self, scopes: &[&str]) -> Result<Self> {
        self.write_state()?.auth.scopes = scopes.iter().map(|s| (*s).to_owned()).collect();
        Ok(self)
    }

    /// Make `api.test` fail as if Slack were unreachable (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn unreachable(self) -> Result<Self> {
        self.write_state()?.reachable = false;
        Ok(self)
    }

    /// Make every call to `method` fail with the Slack error `code` (builder pattern)
    ///
    /// Authentication codes such as `invalid_auth` produce authentication errors.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn with_failure(self, method: &str, code: &str) -> Result<Self> {
        self.write_state()?
            .failures
            .insert(method.to_owned(), code.to_owned());
        Ok(self)
    }

    /// Channels joined so far
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn joined(&self) -> Result<Vec<String>> {
        Ok(self.read_state()?.joined.clone())
    }

    /// Messages posted so far as `(channel_id, text)`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn posted(&self) -> Result<Vec<(String, String)>> {
        Ok(self.read_state()?.posted.clone())
    }

    /// Channels archived so far
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn archived(&self) -> Result<Vec<String>> {
        Ok(self.read_state()?.archived.clone())
    }

    fn check_failure(&self, method: &str, channel_id: Option<&str>) -> Result<()> {
        let state = self.read_state()?;
        let key = channel_id.map(|id| format!("{method}:{id}"));
        let code = key
            .and_then(|k| state.failures.get(&k))
            .or_else(|| state.failures.get(method));

        match code.map(String::as_str) {
            None => Ok(()),
            Some(code) if AUTH_ERROR_CODES.contains(&code) => {
                Err(ButlerError::authentication(format!("{method}: {code}")).into())
            }
            Some(code) => Err(ButlerError::api(format!("{method}: {code}")).into()),
        }
    }

    fn channel_exists(state: &MockSlackState, channel_id: &str) -> bool {
        state.channels.iter().any(|c| c.id == channel_id)
    }
}

impl Default for MockSlack {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SlackApi for MockSlack {
    async fn api_test(&self) -> Result<()> {
        if !self.read_state()?.reachable {
            return Err(ButlerError::api("api.test: request failed: connection refused").into());
        }
        self.check_failure("api.test", None)
    }

    async fn auth_test(&self) -> Result<AuthInfo> {
        self.check_failure("auth.test", None)?;
        Ok(self.read_state()?.auth.clone())
    }

    async fn list_channels(&self, include_archived: bool) -> Result<Vec<Channel>> {
        self.check_failure("conversations.list", None)?;
        Ok(self
            .read_state()?
            .channels
            .iter()
            .filter(|c| include_archived || !c.is_archived)
            .cloned()
            .collect())
    }

    async fn channel_history(
        &self,
        channel_id: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<MessagePage> {
        self.check_failure("conversations.history", Some(channel_id))?;
        let state = self.read_state()?;
        if !Self::channel_exists(&state, channel_id) {
            return Err(ButlerError::api("conversations.history: channel_not_found").into());
        }

        // Cursors are offsets into the stored history
        let start = match cursor {
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| ButlerError::api("conversations.history: invalid_cursor"))?,
            None => 0,
        };
        let limit = usize::try_from(limit).unwrap_or(usize::MAX).max(1);
        let history = state.histories.get(channel_id).map_or(&[][..], Vec::as_slice);
        let end = start.saturating_add(limit).min(history.len());
        let messages = history.get(start..end).unwrap_or_default().to_vec();
        let next_cursor = (end < history.len()).then(|| end.to_string());

        Ok(MessagePage {
            messages,
            next_cursor,
        })
    }

    async fn join_channel(&self, channel_id: &str) -> Result<()> {
        self.check_failure("conversations.join", Some(channel_id))?;
        let mut state = self.write_state()?;
        if !Self::channel_exists(&state, channel_id) {
            return Err(ButlerError::api("conversations.join: channel_not_found").into());
        }
        for channel in state.channels.iter_mut().filter(|c| c.id == channel_id) {
            channel.is_member = true;
        }
        state.joined.push(channel_id.to_owned());
        Ok(())
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<String> {
        self.check_failure("chat.postMessage", Some(channel_id))?;
        let mut state = self.write_state()?;
        if !Self::channel_exists(&state, channel_id) {
            return Err(ButlerError::api("chat.postMessage: channel_not_found").into());
        }
        state.next_ts += 1;
        let ts = format!("{}.000100", state.next_ts);
        state.posted.push((channel_id.to_owned(), text.to_owned()));
        Ok(ts)
    }

    async fn archive_channel(&self, channel_id: &str) -> Result<()> {
        self.check_failure("conversations.archive", Some(channel_id))?;
        let mut state = self.write_state()?;
        if !Self::channel_exists(&state, channel_id) {
            return Err(ButlerError::api("conversations.archive: channel_not_found").into());
        }
        for channel in state.channels.iter_mut().filter(|c| c.id == channel_id) {
            channel.is_archived = true;
        }
        state.archived.push(channel_id.to_owned());
        Ok(())
    }
}
