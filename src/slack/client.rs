//! HTTP client for the Slack Web API

use super::types::{AuthInfo, Channel, Message, MessagePage};
use super::SlackApi;
use crate::build_info;
use crate::error::ButlerError;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

/// Channels requested per `conversations.list` page
const PAGE_SIZE: u32 = 200;

/// Upper bound for a single `Retry-After` wait
const MAX_RETRY_AFTER_SECS: u64 = 60;

/// Error codes meaning the token itself is unusable
pub(crate) const AUTH_ERROR_CODES: [&str; 5] = [
    "invalid_auth",
    "not_authed",
    "account_inactive",
    "token_revoked",
    "token_expired",
];

/// Header listing the OAuth scopes granted to the token
const SCOPES_HEADER: &str = "x-oauth-scopes";

/// Shape of a request to a Web API method
#[derive(Clone, Copy)]
enum Request<'req> {
    Get(&'req [(&'req str, String)]),
    Post(&'req Value),
}

/// Decoded response body plus the headers slack-butler cares about
struct ApiResponse {
    payload: Value,
    scopes: Vec<String>,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Deserialize)]
struct ChannelPage {
    #[serde(default)]
    channels: Vec<Channel>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    messages: Vec<Message>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct PostedMessage {
    ts: String,
}

/// Slack Web API client authenticated with a bot or user token
#[derive(Debug, Clone)]
pub struct SlackClient {
    http: Client,
    base_url: String,
    token: String,
    max_retries: u32,
}

impl SlackClient {
    /// Create a client for the given API base URL and token
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying HTTP client cannot be constructed
    #[inline]
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("slack-butler/{}", build_info::VERSION))
            .build()
            .map_err(|e| ButlerError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
            max_retries: 3,
        })
    }

    /// Override how many times a rate-limited call is retried
    #[must_use]
    #[inline]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    /// Call a Web API method, retrying while Slack answers 429
    ///
    /// Error codes listed in `tolerated` are treated as success.
    async fn call(
        &self,
        method: &str,
        request: Request<'_>,
        tolerated: &[&str],
    ) -> Result<ApiResponse> {
        let url = self.endpoint(method);
        let mut attempt = 0;

        loop {
            let builder = match request {
                Request::Get(query) => self.http.get(&url).query(query),
                Request::Post(body) => self.http.post(&url).json(body),
            };

            debug!("Calling {method} (attempt {})", attempt + 1);
            let response = builder
                .bearer_auth(&self.token)
                .send()
                .await
                .map_err(|e| ButlerError::api(format!("{method}: request failed: {e}")))?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt >= self.max_retries {
                    return Err(ButlerError::rate_limited(format!(
                        "{method} still rate limited after {} retries",
                        self.max_retries
                    ))
                    .into());
                }
                attempt += 1;
                let wait = retry_after(response.headers());
                warn!(
                    "{method} rate limited, retrying in {}s ({attempt}/{})",
                    wait.as_secs(),
                    self.max_retries
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if !status.is_success() {
                return Err(ButlerError::api(format!("{method} returned HTTP {status}")).into());
            }

            let scopes = granted_scopes(response.headers());
            let payload: Value = response
                .json()
                .await
                .map_err(|e| ButlerError::api(format!("{method}: invalid JSON response: {e}")))?;

            check_envelope(method, &payload, tolerated)?;

            return Ok(ApiResponse { payload, scopes });
        }
    }
}

/// Seconds to wait according to `Retry-After`, capped
fn retry_after(headers: &HeaderMap) -> Duration {
    let secs = headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(1);
    Duration::from_secs(secs.min(MAX_RETRY_AFTER_SECS))
}

/// Parse the comma separated scope header
fn granted_scopes(headers: &HeaderMap) -> Vec<String> {
    headers
        .get(SCOPES_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|scope| !scope.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Map `ok: false` envelopes to typed errors
fn check_envelope(method: &str, payload: &Value, tolerated: &[&str]) -> Result<()> {
    if payload.get("ok").and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }

    let code = payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown_error");

    if tolerated.contains(&code) {
        debug!("{method} answered '{code}', treating as success");
        return Ok(());
    }

    if AUTH_ERROR_CODES.contains(&code) {
        return Err(ButlerError::authentication(format!("{method}: {code}")).into());
    }

    Err(ButlerError::api(format!("{method}: {code}")).into())
}

fn decode<T: DeserializeOwned>(method: &str, payload: Value) -> Result<T> {
    serde_json::from_value(payload)
        .map_err(|e| ButlerError::api(format!("{method}: unexpected response shape: {e}")).into())
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn api_test(&self) -> Result<()> {
        self.call("api.test", Request::Get(&[]), &[]).await?;
        Ok(())
    }

    async fn auth_test(&self) -> Result<AuthInfo> {
        let response = self.call("auth.test", Request::Get(&[]), &[]).await?;
        let mut info: AuthInfo = decode("auth.test", response.payload)?;
        info.scopes = response.scopes;
        Ok(info)
    }

    async fn list_channels(&self, include_archived: bool) -> Result<Vec<Channel>> {
        let mut channels = Vec::new();
        let mut cursor = String::new();

        loop {
            let mut query = vec![
                ("types", "public_channel".to_owned()),
                ("limit", PAGE_SIZE.to_string()),
                ("exclude_archived", (!include_archived).to_string()),
            ];
            if !cursor.is_empty() {
                query.push(("cursor", cursor.clone()));
            }

            let response = self
                .call("conversations.list", Request::Get(&query), &[])
                .await?;
            let page: ChannelPage = decode("conversations.list", response.payload)?;
            debug!("Fetched {} channels", page.channels.len());
            channels.extend(page.channels);

            cursor = page
                .response_metadata
                .map(|metadata| metadata.next_cursor)
                .unwrap_or_default();
            if cursor.is_empty() {
                break;
            }
        }

        Ok(channels)
    }

    async fn channel_history(
        &self,
        channel_id: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<MessagePage> {
        let mut query = vec![
            ("channel", channel_id.to_owned()),
            ("limit", limit.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_owned()));
        }

        let response = self
            .call("conversations.history", Request::Get(&query), &[])
            .await?;
        let page: HistoryResponse = decode("conversations.history", response.payload)?;
        Ok(MessagePage {
            messages: page.messages,
            next_cursor: page
                .response_metadata
                .map(|metadata| metadata.next_cursor)
                .filter(|cursor| !cursor.is_empty()),
        })
    }

    async fn join_channel(&self, channel_id: &str) -> Result<()> {
        let body = json!({ "channel": channel_id });
        self.call("conversations.join", Request::Post(&body), &[])
            .await?;
        Ok(())
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<String> {
        let body = json!({
            "channel": channel_id,
            "text": text,
            "unfurl_links": false,
        });
        let response = self
            .call("chat.postMessage", Request::Post(&body), &[])
            .await?;
        let posted: PostedMessage = decode("chat.postMessage", response.payload)?;
        Ok(posted.ts)
    }

    async fn archive_channel(&self, channel_id: &str) -> Result<()> {
        let body = json!({ "channel": channel_id });
        self.call(
            "conversations.archive",
            Request::Post(&body),
            &["already_archived"],
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn retry_after_defaults_and_caps() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), Duration::from_secs(1));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("5"));
        assert_eq!(retry_after(&headers), Duration::from_secs(5));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("3600"));
        assert_eq!(retry_after(&headers), Duration::from_secs(60));
    }

    #[test]
    fn scopes_are_split_and_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            SCOPES_HEADER,
            HeaderValue::from_static("channels:read, chat:write,,channels:history"),
        );
        assert_eq!(
            granted_scopes(&headers),
            vec!["channels:read", "chat:write", "channels:history"]
        );
    }

    #[test]
    fn envelope_maps_auth_errors() {
        let err = check_envelope("auth.test", &json!({"ok": false, "error": "invalid_auth"}), &[])
            .unwrap_err();
        assert_eq!(crate::error::exit_code_for(&err), 2);

        let err = check_envelope(
            "conversations.archive",
            &json!({"ok": false, "error": "cant_archive_general"}),
            &[],
        )
        .unwrap_err();
        assert_eq!(crate::error::exit_code_for(&err), 3);
        assert!(err.to_string().contains("cant_archive_general"));
    }

    #[test]
    fn envelope_tolerates_listed_codes() {
        check_envelope(
            "conversations.archive",
            &json!({"ok": false, "error": "already_archived"}),
            &["already_archived"],
        )
        .unwrap();
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = SlackClient::new("http://localhost:1234/api/", "xoxb-1").unwrap();
        assert_eq!(
            client.endpoint("auth.test"),
            "http://localhost:1234/api/auth.test"
        );
    }
}
