use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::json;

use leadloop_core::{Account, ActionType, Comment};

use crate::error::LinkedinError;
use crate::rate_limit::retry_with_backoff;
use crate::types::{CommentsResponse, ConnectionResponse, CreatedResponse};

/// Page size for comment fetches.
const COMMENT_PAGE_SIZE: u32 = 100;

/// HTTP client for the LinkedIn REST API.
///
/// Handles rate limiting (429) and auth rejections (401/403) as typed
/// errors. Transient errors (429, network failures) are automatically
/// retried with exponential backoff up to `max_retries` additional attempts.
pub struct LinkedinClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl LinkedinClient {
    /// Creates a `LinkedinClient` with configured timeout, `User-Agent`, and
    /// retry policy.
    ///
    /// `base_url` is the API origin (production: `https://api.linkedin.com`);
    /// tests point it at a local mock server.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedinError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, LinkedinError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches comments on `post_urn`, oldest first.
    ///
    /// When `since` names a comment urn present in the response, only
    /// comments after it are returned; when the urn is absent (e.g. the
    /// page has rolled past it) the full page is returned and the caller's
    /// uniqueness handling absorbs any repeats.
    ///
    /// # Errors
    ///
    /// - [`LinkedinError::RateLimited`] after all retries are exhausted.
    /// - [`LinkedinError::Unauthorized`] on 401/403 (not retried).
    /// - [`LinkedinError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`LinkedinError::Http`] on network failure after all retries.
    /// - [`LinkedinError::Deserialize`] if the body does not parse.
    pub async fn fetch_comments(
        &self,
        account: &Account,
        post_urn: &str,
        since: Option<&str>,
    ) -> Result<Vec<Comment>, LinkedinError> {
        let url = format!(
            "{}/rest/socialActions/{post_urn}/comments?count={COMMENT_PAGE_SIZE}",
            self.base_url
        );

        let response: CommentsResponse = self
            .get_json(account, &url, &format!("comments on {post_urn}"))
            .await?;

        let mut comments: Vec<Comment> = response
            .elements
            .into_iter()
            .map(|raw| Comment {
                urn: raw.urn,
                text: raw.message.text,
                author_urn: raw.actor.urn,
                author_name: raw.actor.name,
                author_headline: raw.actor.headline,
                created_at: millis_to_datetime(raw.created_at),
            })
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.urn.cmp(&b.urn)));

        if let Some(checkpoint) = since {
            if let Some(pos) = comments.iter().position(|c| c.urn == checkpoint) {
                comments.drain(..=pos);
            }
        }

        Ok(comments)
    }

    /// Whether `profile_urn` is a first-degree connection of the account.
    /// An unknown relationship (404) counts as not connected.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::fetch_comments`].
    pub async fn check_connection_degree(
        &self,
        account: &Account,
        profile_urn: &str,
    ) -> Result<bool, LinkedinError> {
        let url = format!("{}/rest/connections/{profile_urn}", self.base_url);
        let max_retries = self.max_retries;
        let backoff_base_secs = self.backoff_base_secs;

        retry_with_backoff(max_retries, backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .bearer_auth(&account.access_token)
                    .send()
                    .await?;

                let status = response.status();
                if status == StatusCode::NOT_FOUND {
                    return Ok(false);
                }
                Self::check_status(status, &url, &response)?;

                let body = response.text().await?;
                let parsed: ConnectionResponse =
                    serde_json::from_str(&body).map_err(|e| LinkedinError::Deserialize {
                        context: format!("connection degree for {url}"),
                        source: e,
                    })?;

                Ok(parsed.distance.as_deref() == Some("DISTANCE_1"))
            }
        })
        .await
    }

    /// Performs one social action against `target` and returns the external
    /// action id.
    ///
    /// `target` is a comment urn for likes and replies, a profile urn for
    /// dms and invites. `content` carries the resolved text for replies and
    /// dms and must be `None` for likes and invites.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::fetch_comments`], plus
    /// [`LinkedinError::MissingActionId`] when a 2xx response carries no id
    /// in either the body or the `x-restli-id` header.
    pub async fn perform_action(
        &self,
        account: &Account,
        action_type: ActionType,
        target: &str,
        content: Option<&str>,
    ) -> Result<String, LinkedinError> {
        let (url, body) = self.action_request(action_type, target, content);
        let max_retries = self.max_retries;
        let backoff_base_secs = self.backoff_base_secs;

        retry_with_backoff(max_retries, backoff_base_secs, || {
            let url = url.clone();
            let body = body.clone();
            async move {
                let response = self
                    .client
                    .post(&url)
                    .bearer_auth(&account.access_token)
                    .json(&body)
                    .send()
                    .await?;

                let status = response.status();
                Self::check_status(status, &url, &response)?;

                let header_id = response
                    .headers()
                    .get("x-restli-id")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);

                let body_text = response.text().await?;
                let body_id = serde_json::from_str::<CreatedResponse>(&body_text)
                    .ok()
                    .and_then(|r| r.id);

                body_id
                    .or(header_id)
                    .ok_or(LinkedinError::MissingActionId { url })
            }
        })
        .await
    }

    /// Builds the endpoint and JSON body for one action type.
    fn action_request(
        &self,
        action_type: ActionType,
        target: &str,
        content: Option<&str>,
    ) -> (String, serde_json::Value) {
        let base = &self.base_url;
        match action_type {
            ActionType::Like => (
                format!("{base}/rest/socialActions/{target}/likes"),
                json!({}),
            ),
            ActionType::Reply => (
                format!("{base}/rest/socialActions/{target}/comments"),
                json!({ "message": { "text": content.unwrap_or_default() } }),
            ),
            ActionType::Dm => (
                format!("{base}/rest/messages"),
                json!({
                    "recipients": [target],
                    "body": { "text": content.unwrap_or_default() },
                }),
            ),
            ActionType::Invite => (
                format!("{base}/rest/invitations"),
                json!({ "invitee": target }),
            ),
        }
    }

    /// GET with bearer auth, retry, and typed deserialization.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        account: &Account,
        url: &str,
        context: &str,
    ) -> Result<T, LinkedinError> {
        let max_retries = self.max_retries;
        let backoff_base_secs = self.backoff_base_secs;

        retry_with_backoff(max_retries, backoff_base_secs, || {
            let url = url.to_owned();
            let context = context.to_owned();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .bearer_auth(&account.access_token)
                    .send()
                    .await?;

                Self::check_status(response.status(), &url, &response)?;

                let body = response.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| LinkedinError::Deserialize {
                    context,
                    source: e,
                })
            }
        })
        .await
    }

    /// Maps non-2xx statuses to typed errors.
    fn check_status(
        status: StatusCode,
        url: &str,
        response: &reqwest::Response,
    ) -> Result<(), LinkedinError> {
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(LinkedinError::RateLimited { retry_after_secs });
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LinkedinError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(LinkedinError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        Ok(())
    }
}

/// Converts epoch milliseconds to a UTC timestamp, clamping invalid values
/// to the epoch.
fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH)
}
