//! `SocialNetwork` port implementation for [`LinkedinClient`].

use async_trait::async_trait;

use leadloop_core::ports::{SocialError, SocialNetwork};
use leadloop_core::{Account, ActionType, Comment};

use crate::client::LinkedinClient;
use crate::error::LinkedinError;

impl From<LinkedinError> for SocialError {
    fn from(err: LinkedinError) -> Self {
        match err {
            LinkedinError::RateLimited { retry_after_secs } => {
                SocialError::RateLimited { retry_after_secs }
            }
            LinkedinError::Unauthorized { .. } => SocialError::Unauthorized,
            LinkedinError::UnexpectedStatus { status, url } => SocialError::Api {
                status,
                message: format!("unexpected status from {url}"),
            },
            other => SocialError::Transport(other.to_string()),
        }
    }
}

#[async_trait]
impl SocialNetwork for LinkedinClient {
    async fn fetch_comments(
        &self,
        account: &Account,
        post_urn: &str,
        since: Option<&str>,
    ) -> Result<Vec<Comment>, SocialError> {
        Ok(LinkedinClient::fetch_comments(self, account, post_urn, since).await?)
    }

    async fn check_connection_degree(
        &self,
        account: &Account,
        profile_urn: &str,
    ) -> Result<bool, SocialError> {
        Ok(LinkedinClient::check_connection_degree(self, account, profile_urn).await?)
    }

    async fn perform_action(
        &self,
        account: &Account,
        action_type: ActionType,
        target: &str,
        content: Option<&str>,
    ) -> Result<String, SocialError> {
        Ok(LinkedinClient::perform_action(self, account, action_type, target, content).await?)
    }
}
