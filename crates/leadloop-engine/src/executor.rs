//! Execute cycle: claiming and performing due actions.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use leadloop_core::ports::{CrmSync, SocialNetwork, Store, StoreError};
use leadloop_core::{Action, ActionType, EventKind};

use crate::error::EngineError;

/// Retry policy for failed actions: linear backoff, bounded attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts allowed per action.
    pub max_retries: i32,
    /// Backoff grows linearly: `backoff_base_secs * attempt`.
    pub backoff_base_secs: i64,
}

/// Summary of one execute cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteReport {
    pub actions_due: usize,
    pub executed: usize,
    pub requeued: usize,
    pub failed: usize,
    pub skipped: usize,
    pub leads_completed: usize,
}

/// Runs one execute cycle over at most `batch_size` due actions.
///
/// Each action is claimed with a conditional status update before anything
/// touches the network, so overlapping cycles never double-execute. A
/// failure inside one action is isolated: it feeds that action's retry
/// policy and the cycle moves on.
///
/// # Errors
///
/// Returns [`EngineError::Store`] only when the due-action listing itself
/// fails.
pub async fn run_execute_cycle<S, N, C>(
    store: &S,
    social: &N,
    crm: &C,
    batch_size: i64,
    retry: RetryPolicy,
    now: DateTime<Utc>,
) -> Result<ExecuteReport, EngineError>
where
    S: Store + ?Sized,
    N: SocialNetwork + ?Sized,
    C: CrmSync + ?Sized,
{
    let due = store.list_due_actions(batch_size, now).await?;
    let mut report = ExecuteReport {
        actions_due: due.len(),
        ..ExecuteReport::default()
    };

    if due.is_empty() {
        debug!("no actions due");
        return Ok(report);
    }
    info!(due = due.len(), "execute cycle starting");

    for action in due {
        match execute_one(store, social, crm, &action, retry, now).await {
            Ok(Outcome::Done { lead_completed }) => {
                report.executed += 1;
                if lead_completed {
                    report.leads_completed += 1;
                }
            }
            Ok(Outcome::Requeued) => report.requeued += 1,
            Ok(Outcome::Failed) => report.failed += 1,
            Ok(Outcome::NotClaimed) => report.skipped += 1,
            Err(e) => {
                warn!(action_id = action.id, error = %e, "action processing aborted");
                report.failed += 1;
            }
        }
    }

    info!(
        executed = report.executed,
        requeued = report.requeued,
        failed = report.failed,
        skipped = report.skipped,
        leads_completed = report.leads_completed,
        "execute cycle finished"
    );

    Ok(report)
}

enum Outcome {
    Done { lead_completed: bool },
    Requeued,
    Failed,
    NotClaimed,
}

async fn execute_one<S, N, C>(
    store: &S,
    social: &N,
    crm: &C,
    action: &Action,
    retry: RetryPolicy,
    now: DateTime<Utc>,
) -> Result<Outcome, EngineError>
where
    S: Store + ?Sized,
    N: SocialNetwork + ?Sized,
    C: CrmSync + ?Sized,
{
    if !store.claim_action(action.id).await? {
        debug!(action_id = action.id, "action no longer queued, skipping");
        return Ok(Outcome::NotClaimed);
    }

    // The claim moved the action out of `queued`. From here on, a store
    // error must release the claim or the action is stranded in `executing`
    // with nothing left to sweep it.
    let context = async {
        let lead = store.get_lead(action.lead_id).await?;
        let campaign = store.get_campaign(lead.campaign_id).await?;
        store.mark_lead_executing(lead.id).await?;
        Ok::<_, StoreError>((lead, campaign))
    }
    .await;

    let (lead, campaign) = match context {
        Ok(pair) => pair,
        Err(e) => {
            release_claim(store, action, retry, now, &e.to_string()).await;
            return Err(e.into());
        }
    };

    // Likes and replies target the captured comment; DMs and invites target
    // the commenter's profile.
    let target = match action.action_type {
        ActionType::Like | ActionType::Reply => lead.comment_urn.as_str(),
        ActionType::Dm | ActionType::Invite => lead.profile_urn.as_str(),
    };

    let result = match store.active_account(campaign.user_id).await? {
        Some(account) => social
            .perform_action(
                &account,
                action.action_type,
                target,
                action.content.as_deref(),
            )
            .await
            .map_err(|e| e.to_string()),
        None => Err(format!(
            "no active account for user {}",
            campaign.user_id
        )),
    };

    match result {
        Ok(external_id) => {
            store.mark_action_done(action.id, &external_id, now).await?;
            info!(
                action_id = action.id,
                lead_id = lead.id,
                action_type = %action.action_type,
                external_id = %external_id,
                "action executed"
            );

            if store.count_queued_actions(lead.id).await? == 0 {
                match store.complete_lead(lead.id, now).await {
                    Ok(()) => {
                        info!(lead_id = lead.id, campaign_id = campaign.id, "lead completed");
                        store
                            .append_event(
                                campaign.id,
                                Some(lead.id),
                                EventKind::LeadCompleted,
                                json!({ "profile_urn": lead.profile_urn }),
                            )
                            .await?;
                        if let Err(e) = crm.sync_lead(lead.id).await {
                            warn!(lead_id = lead.id, error = %e, "crm sync failed");
                        }
                        return Ok(Outcome::Done {
                            lead_completed: true,
                        });
                    }
                    // The lead left `executing` through another path, e.g.
                    // an earlier action of the plan failed permanently.
                    Err(StoreError::InvalidTransition { .. }) => {
                        debug!(lead_id = lead.id, "lead not completable, leaving as is");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Ok(Outcome::Done {
                lead_completed: false,
            })
        }
        Err(message) => {
            let attempt = action.retry_count + 1;
            if attempt < retry.max_retries {
                let scheduled_for =
                    now + Duration::seconds(retry.backoff_base_secs * i64::from(attempt));
                store
                    .requeue_action(action.id, scheduled_for, &message)
                    .await?;
                warn!(
                    action_id = action.id,
                    lead_id = lead.id,
                    attempt,
                    retry_at = %scheduled_for,
                    error = %message,
                    "action failed, requeued"
                );
                store
                    .append_event(
                        campaign.id,
                        Some(lead.id),
                        EventKind::ActionError,
                        json!({
                            "action_id": action.id,
                            "action_type": action.action_type.as_str(),
                            "attempt": attempt,
                            "will_retry": true,
                            "error": message,
                        }),
                    )
                    .await?;
                Ok(Outcome::Requeued)
            } else {
                store.fail_action(action.id, &message).await?;
                store.record_lead_error(lead.id, &message).await?;
                warn!(
                    action_id = action.id,
                    lead_id = lead.id,
                    attempt,
                    error = %message,
                    "action failed permanently"
                );
                store
                    .append_event(
                        campaign.id,
                        Some(lead.id),
                        EventKind::ActionError,
                        json!({
                            "action_id": action.id,
                            "action_type": action.action_type.as_str(),
                            "attempt": attempt,
                            "will_retry": false,
                            "error": message,
                        }),
                    )
                    .await?;
                Ok(Outcome::Failed)
            }
        }
    }
}

/// Puts a claimed action back in the queue, or fails it once the retry
/// budget is spent. Used when an error strikes between the claim and the
/// network call.
async fn release_claim<S>(
    store: &S,
    action: &Action,
    retry: RetryPolicy,
    now: DateTime<Utc>,
    message: &str,
) where
    S: Store + ?Sized,
{
    let attempt = action.retry_count + 1;
    let released = if attempt < retry.max_retries {
        let scheduled_for = now + Duration::seconds(retry.backoff_base_secs * i64::from(attempt));
        store.requeue_action(action.id, scheduled_for, message).await
    } else {
        store.fail_action(action.id, message).await
    };
    if let Err(e) = released {
        warn!(action_id = action.id, error = %e, "failed to release claimed action");
    }
}
