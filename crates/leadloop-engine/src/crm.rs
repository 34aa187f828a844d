//! CRM sync implementations.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use leadloop_core::ports::{CrmError, CrmSync};

/// CRM sink for deployments without a webhook configured.
pub struct NoopCrm;

#[async_trait]
impl CrmSync for NoopCrm {
    async fn sync_lead(&self, lead_id: i64) -> Result<(), CrmError> {
        debug!(lead_id, "crm sync disabled, skipping");
        Ok(())
    }
}

/// Posts completed leads to a configured webhook URL.
pub struct WebhookCrm {
    client: reqwest::Client,
    url: String,
}

impl WebhookCrm {
    /// Create a new `WebhookCrm`.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::Sync`] if the HTTP client cannot be built.
    pub fn new(webhook_url: &str, timeout_secs: u64) -> Result<Self, CrmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CrmError::Sync(e.to_string()))?;
        Ok(Self {
            client,
            url: webhook_url.to_string(),
        })
    }
}

#[async_trait]
impl CrmSync for WebhookCrm {
    async fn sync_lead(&self, lead_id: i64) -> Result<(), CrmError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "event": "lead_completed", "lead_id": lead_id }))
            .send()
            .await
            .map_err(|e| CrmError::Sync(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrmError::Sync(format!("webhook returned status {status}")));
        }
        debug!(lead_id, "lead synced to crm webhook");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn webhook_posts_lead_completed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks/leads"))
            .and(body_json(json!({ "event": "lead_completed", "lead_id": 42 })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let crm = WebhookCrm::new(&format!("{}/hooks/leads", server.uri()), 5).unwrap();
        crm.sync_lead(42).await.expect("sync should succeed");
    }

    #[tokio::test]
    async fn webhook_failure_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks/leads"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let crm = WebhookCrm::new(&format!("{}/hooks/leads", server.uri()), 5).unwrap();
        let result = crm.sync_lead(42).await;
        assert!(matches!(result, Err(CrmError::Sync(_))));
    }
}
