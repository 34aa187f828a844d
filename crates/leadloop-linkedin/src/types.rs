//! Wire shapes for the LinkedIn REST endpoints the client talks to.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct CommentsResponse {
    pub elements: Vec<RawComment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawComment {
    pub urn: String,
    pub message: RawMessage,
    pub actor: RawActor,
    /// Epoch milliseconds.
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawMessage {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawActor {
    pub urn: String,
    pub name: String,
    pub headline: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConnectionResponse {
    pub distance: Option<String>,
}

/// Response body of action-creating POSTs. Some endpoints return the created
/// entity id in the body, others only in the `x-restli-id` header.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedResponse {
    pub id: Option<String>,
}
