//! Slack Web API data types

use serde::{Deserialize, Serialize};

/// Free-text field attached to a channel (purpose or topic)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelText {
    #[serde(default)]
    pub value: String,
}

/// A public Slack channel as returned by `conversations.list`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    pub name: String,
    /// Creation time in seconds since the Unix epoch
    #[serde(default)]
    pub created: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_general: bool,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_members: Option<u64>,
    #[serde(default)]
    pub purpose: ChannelText,
    #[serde(default)]
    pub topic: ChannelText,
}

impl Channel {
    /// Create a channel with only the fields every test fixture needs
    #[must_use]
    #[inline]
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N, created: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created,
            creator: None,
            is_archived: false,
            is_general: false,
            is_member: true,
            num_members: None,
            purpose: ChannelText::default(),
            topic: ChannelText::default(),
        }
    }

    /// Slack mrkdwn link to the channel
    #[must_use]
    #[inline]
    pub fn mention(&self) -> String {
        format!("<#{}|{}>", self.id, self.name)
    }
}

/// A message from `conversations.history`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Slack timestamp, e.g. `1700000000.000100`
    pub ts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl Message {
    /// Create a plain user message
    #[must_use]
    #[inline]
    pub fn new<U: Into<String>, T: Into<String>>(ts_secs: i64, user: U, text: T) -> Self {
        Self {
            ts: format!("{ts_secs}.000100"),
            user: Some(user.into()),
            bot_id: None,
            subtype: None,
            text: text.into(),
        }
    }

    /// Message time in whole seconds since the Unix epoch
    ///
    /// Returns `None` when the Slack timestamp is malformed.
    #[must_use]
    #[inline]
    pub fn timestamp(&self) -> Option<i64> {
        let secs = self.ts.split('.').next()?;
        secs.parse::<i64>().ok()
    }

    /// Membership notices do not count as channel activity
    #[must_use]
    #[inline]
    pub fn is_membership_event(&self) -> bool {
        matches!(
            self.subtype.as_deref(),
            Some("channel_join" | "channel_leave")
        )
    }
}

/// One page of `conversations.history`, newest message first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    /// Cursor for the next (older) page; `None` on the last page
    pub next_cursor: Option<String>,
}

/// Identity behind the token, from `auth.test` plus granted scopes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthInfo {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    /// Scopes from the `x-oauth-scopes` response header
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;

    #[test]
    fn message_timestamp_drops_fraction() {
        let message = Message::new(1_700_000_000, "U1", "hi");
        assert_eq!(message.timestamp(), Some(1_700_000_000));
    }

    #[test]
    fn malformed_timestamp_is_none() {
        let mut message = Message::new(1, "U1", "hi");
        message.ts = "not-a-ts".to_owned();
        assert_eq!(message.timestamp(), None);
    }

    #[test]
    fn channel_deserializes_with_missing_fields() {
        let channel: Channel =
            serde_json::from_str(r#"{"id":"C1","name":"general","is_general":true}"#).unwrap();
        assert_eq!(channel.created, 0);
        assert!(channel.is_general);
        assert!(!channel.is_member);
        assert_eq!(channel.purpose.value, "");
    }

    #[test]
    fn membership_events_are_recognised() {
        let mut message = Message::new(1, "U1", "joined");
        message.subtype = Some("channel_join".to_owned());
        assert!(message.is_membership_event());
        message.subtype = Some("bot_message".to_owned());
        assert!(!message.is_membership_event());
    }
}
