//! Lead approval: the transition from captured to scheduled.

use chrono::{DateTime, Utc};
use tracing::info;

use leadloop_core::ports::Store;
use leadloop_core::scheduler::schedule_actions;
use leadloop_core::{ActionType, Lead, NewAction, PlannedAction};

use crate::error::EngineError;

/// Approves a pending lead and queues its action plan.
///
/// The plan is drawn at approval time, anchored at `now`. Reply and DM
/// actions carry the copy generated at capture.
///
/// # Errors
///
/// Returns [`EngineError::Store`] if the lead is not `pending` or a store
/// call fails. The approval itself is committed before the plan is written,
/// so a failure here can leave an approved lead without actions; re-running
/// approval on such a lead fails the status guard and needs manual repair.
pub async fn approve_and_plan<S>(
    store: &S,
    lead_id: i64,
    now: DateTime<Utc>,
) -> Result<Lead, EngineError>
where
    S: Store + ?Sized,
{
    let lead = store.approve_lead(lead_id, now).await?;
    let campaign = store.get_campaign(lead.campaign_id).await?;

    let plan = schedule_actions(&campaign, now);
    let actions = plan_to_new_actions(
        &plan,
        lead.generated_reply.as_deref(),
        lead.generated_dm.as_deref(),
    );
    store.create_action_plan(lead.id, &actions).await?;

    info!(
        lead_id = lead.id,
        campaign_id = campaign.id,
        actions = actions.len(),
        "lead approved and plan queued"
    );

    Ok(lead)
}

/// Attaches generated copy to the planned actions that need it. Likes and
/// invites carry no content.
pub(crate) fn plan_to_new_actions(
    plan: &[PlannedAction],
    generated_reply: Option<&str>,
    generated_dm: Option<&str>,
) -> Vec<NewAction> {
    plan.iter()
        .map(|planned| {
            let content = match planned.action_type {
                ActionType::Reply => generated_reply.map(ToString::to_string),
                ActionType::Dm => generated_dm.map(ToString::to_string),
                ActionType::Like | ActionType::Invite => None,
            };
            NewAction {
                action_type: planned.action_type,
                scheduled_for: planned.scheduled_for,
                content,
            }
        })
        .collect()
}
