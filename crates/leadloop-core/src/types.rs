//! Domain types shared across the workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error returned when a stored status/mode string does not match any variant.
#[derive(Debug, Error)]
#[error("invalid enum value: {0:?}")]
pub struct InvalidEnumValue(pub String);

macro_rules! str_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(InvalidEnumValue(other.to_string())),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
}

str_enum!(CampaignStatus {
    Draft => "draft",
    Active => "active",
    Paused => "paused",
    Completed => "completed",
});

/// How commenters are selected for capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Capture every commenter with non-empty text.
    Any,
    /// Capture only commenters whose text matches a configured keyword.
    Keyword,
}

str_enum!(CaptureMode {
    Any => "any",
    Keyword => "keyword",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Pending,
    Approved,
    Executing,
    Completed,
    Skipped,
    Error,
}

str_enum!(LeadStatus {
    Pending => "pending",
    Approved => "approved",
    Executing => "executing",
    Completed => "completed",
    Skipped => "skipped",
    Error => "error",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Queued,
    Executing,
    Done,
    Failed,
    Skipped,
}

str_enum!(ActionStatus {
    Queued => "queued",
    Executing => "executing",
    Done => "done",
    Failed => "failed",
    Skipped => "skipped",
});

/// The four social operations a campaign can run against a lead, in the
/// fixed priority order the scheduler uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Like,
    Reply,
    Dm,
    Invite,
}

str_enum!(ActionType {
    Like => "like",
    Reply => "reply",
    Dm => "dm",
    Invite => "invite",
});

/// Audit event kinds appended to `campaign_events`. Append-only from the
/// engine's perspective; the activity UI reads them elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PollError,
    ActionError,
    LeadCaptured,
    LeadCompleted,
    CampaignExpired,
}

str_enum!(EventKind {
    PollError => "poll_error",
    ActionError => "action_error",
    LeadCaptured => "lead_captured",
    LeadCompleted => "lead_completed",
    CampaignExpired => "campaign_expired",
});

/// Inclusive delay bounds in seconds for one action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: i64,
    pub max_secs: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDelays {
    pub like: DelayRange,
    pub reply: DelayRange,
    pub dm: DelayRange,
    /// Stored for symmetry but ignored by the scheduler: invites always use
    /// a fixed 1-2 hour range.
    pub invite: DelayRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFlags {
    pub like: bool,
    pub reply: bool,
    pub dm: bool,
    pub invite: bool,
}

/// A monitoring+automation unit bound to one LinkedIn post.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub id: i64,
    pub public_id: Uuid,
    pub user_id: i64,
    pub name: String,
    pub status: CampaignStatus,
    pub post_url: String,
    pub post_urn: String,
    /// Snapshot of the post body, cached at campaign creation.
    pub post_text: Option<String>,
    pub post_author: Option<String>,
    pub capture_mode: CaptureMode,
    pub keywords: Vec<String>,
    pub actions: ActionFlags,
    pub delays: ActionDelays,
    pub require_approval: bool,
    pub window_days: i32,
    /// Fixed at creation as `created_at + window_days`; never recomputed.
    pub expires_at: DateTime<Utc>,
    pub reply_template: Option<String>,
    pub dm_template: Option<String>,
    pub persona_prompt: Option<String>,
    pub lead_magnet: Option<String>,
    /// Poll checkpoint: the last comment urn already processed.
    pub last_comment_urn: Option<String>,
    pub last_polled_at: Option<DateTime<Utc>>,
    pub total_captured: i32,
    pub total_approved: i32,
    pub total_completed: i32,
    pub created_at: DateTime<Utc>,
}

/// A captured commenter, owned by exactly one campaign.
#[derive(Debug, Clone)]
pub struct Lead {
    pub id: i64,
    pub campaign_id: i64,
    pub profile_urn: String,
    pub profile_name: String,
    pub profile_headline: Option<String>,
    pub comment_urn: String,
    pub comment_text: String,
    pub commented_at: DateTime<Utc>,
    pub keyword_matched: Option<String>,
    pub intent_score: i32,
    pub is_connection: bool,
    pub status: LeadStatus,
    pub generated_reply: Option<String>,
    pub generated_dm: Option<String>,
    pub skipped_reason: Option<String>,
    pub error_message: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Insert payload for a new lead produced by the poller.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub campaign_id: i64,
    pub profile_urn: String,
    pub profile_name: String,
    pub profile_headline: Option<String>,
    pub comment_urn: String,
    pub comment_text: String,
    pub commented_at: DateTime<Utc>,
    pub keyword_matched: Option<String>,
    pub intent_score: i32,
    pub is_connection: bool,
    pub status: LeadStatus,
    pub generated_reply: Option<String>,
    pub generated_dm: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
}

/// One scheduled social operation owned by a lead.
#[derive(Debug, Clone)]
pub struct Action {
    pub id: i64,
    pub lead_id: i64,
    pub action_type: ActionType,
    pub status: ActionStatus,
    pub content: Option<String>,
    pub scheduled_for: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub external_id: Option<String>,
    pub error_message: Option<String>,
    pub retry_count: i32,
}

/// Scheduler output: an action type with its absolute scheduled time.
/// Content is resolved later, when the plan is persisted for a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedAction {
    pub action_type: ActionType,
    pub scheduled_for: DateTime<Utc>,
}

/// Insert payload for one action of a lead's plan.
#[derive(Debug, Clone)]
pub struct NewAction {
    pub action_type: ActionType,
    pub scheduled_for: DateTime<Utc>,
    pub content: Option<String>,
}

/// A comment fetched from the social network, ordered oldest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub urn: String,
    pub text: String,
    pub author_urn: String,
    pub author_name: String,
    pub author_headline: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An outbound LinkedIn account owned by a user.
#[derive(Clone)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub label: String,
    pub access_token: String,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("label", &self.label)
            .field("access_token", &"[redacted]")
            .finish()
    }
}

/// Inputs for the AI outreach generator, assembled by the poller.
#[derive(Debug, Clone, Serialize)]
pub struct OutreachContext {
    pub campaign_name: String,
    pub post_text: Option<String>,
    pub comment_text: String,
    pub lead_name: String,
    pub persona_prompt: Option<String>,
    pub reply_template: Option<String>,
    pub dm_template: Option<String>,
    pub lead_magnet: Option<String>,
}

/// Result of one outreach generation call.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OutreachCopy {
    pub reply: String,
    pub dm: String,
}
