//! OpenAI-compatible chat completions client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use leadloop_core::ports::{OutreachError, OutreachGenerator};
use leadloop_core::{OutreachContext, OutreachCopy};

use crate::error::OutreachClientError;
use crate::prompt;

const TEMPERATURE: f32 = 0.7;

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct OutreachClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

impl OutreachClient {
    /// Create a new `OutreachClient`.
    ///
    /// # Errors
    ///
    /// Returns [`OutreachClientError::Http`] if the underlying HTTP client
    /// cannot be built.
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, OutreachClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Generate reply and DM copy for one captured comment.
    ///
    /// # Errors
    ///
    /// Returns [`OutreachClientError`] if the request fails, the API returns
    /// a non-success status, or the response cannot be parsed into copy.
    pub async fn generate_copy(
        &self,
        context: &OutreachContext,
    ) -> Result<OutreachCopy, OutreachClientError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::system_prompt(context),
                },
                ChatMessage {
                    role: "user",
                    content: prompt::user_prompt(context),
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OutreachClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| OutreachClientError::Parse {
                    reason: e.to_string(),
                })?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(OutreachClientError::EmptyResponse)?
            .message
            .content;

        debug!(model = %self.model, content_len = content.len(), "generated outreach copy");

        let copy: OutreachCopy = serde_json::from_str(prompt::strip_code_fence(&content))
            .map_err(|e| OutreachClientError::Parse {
                reason: e.to_string(),
            })?;
        if copy.reply.trim().is_empty() || copy.dm.trim().is_empty() {
            return Err(OutreachClientError::Parse {
                reason: "reply or dm was empty".to_string(),
            });
        }
        Ok(copy)
    }
}

#[async_trait]
impl OutreachGenerator for OutreachClient {
    async fn generate(&self, context: &OutreachContext) -> Result<OutreachCopy, OutreachError> {
        Ok(self.generate_copy(context).await?)
    }
}
