//! Poll cycle: comment ingestion and lead capture.

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use leadloop_core::classifier::{classify_comment, compute_intent_score};
use leadloop_core::ports::{OutreachGenerator, SocialNetwork, Store};
use leadloop_core::scheduler::schedule_actions;
use leadloop_core::{
    Account, Campaign, CampaignStatus, Comment, EventKind, LeadStatus, NewLead, OutreachContext,
};

use crate::approval::plan_to_new_actions;
use crate::error::EngineError;

/// Summary of one poll cycle across all active campaigns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    pub campaigns_polled: usize,
    pub campaigns_failed: usize,
    pub campaigns_expired: usize,
    pub comments_seen: usize,
    pub leads_captured: usize,
}

/// Runs one poll cycle: expires stale campaigns, then polls each active
/// campaign for new comments past its checkpoint.
///
/// A failure inside one campaign is recorded as a `poll_error` event and
/// does not touch the others. The failed campaign's checkpoint is left
/// where it was, so the next cycle refetches the same comments; duplicate
/// captures are absorbed by the lead uniqueness invariant.
///
/// # Errors
///
/// Returns [`EngineError::Store`] only when the cycle cannot run at all
/// (the expiry sweep or the campaign listing fails).
pub async fn run_poll_cycle<S, N, G>(
    store: &S,
    social: &N,
    outreach: &G,
    now: DateTime<Utc>,
) -> Result<PollReport, EngineError>
where
    S: Store + ?Sized,
    N: SocialNetwork + ?Sized,
    G: OutreachGenerator + ?Sized,
{
    let mut report = PollReport::default();

    let expired = store.expire_due_campaigns(now).await?;
    report.campaigns_expired = expired.len();
    for campaign_id in expired {
        info!(campaign_id, "campaign window passed, marked completed");
        if let Err(e) = store
            .append_event(campaign_id, None, EventKind::CampaignExpired, json!({}))
            .await
        {
            warn!(campaign_id, error = %e, "failed to record expiry event");
        }
    }

    let campaigns = store.list_active_campaigns().await?;
    info!(campaigns = campaigns.len(), "poll cycle starting");

    for campaign in campaigns {
        match poll_campaign(store, social, outreach, &campaign, now).await {
            Ok(stats) => {
                report.campaigns_polled += 1;
                report.comments_seen += stats.comments_seen;
                report.leads_captured += stats.leads_captured;
            }
            Err(e) => {
                warn!(campaign_id = campaign.id, error = %e, "campaign poll failed");
                report.campaigns_failed += 1;
                if let Err(event_err) = store
                    .append_event(
                        campaign.id,
                        None,
                        EventKind::PollError,
                        json!({ "error": e.to_string() }),
                    )
                    .await
                {
                    warn!(campaign_id = campaign.id, error = %event_err, "failed to record poll error");
                }
            }
        }
    }

    info!(
        polled = report.campaigns_polled,
        failed = report.campaigns_failed,
        expired = report.campaigns_expired,
        captured = report.leads_captured,
        "poll cycle finished"
    );

    Ok(report)
}

/// Polls a single campaign by id, bypassing the listing and the expiry
/// sweep. Used by the CLI's `--campaign` filter.
///
/// # Errors
///
/// Returns [`EngineError`] if the campaign cannot be loaded or its poll
/// fails; unlike [`run_poll_cycle`] the failure is not swallowed, since the
/// caller asked about this campaign specifically.
pub async fn run_poll_one<S, N, G>(
    store: &S,
    social: &N,
    outreach: &G,
    campaign_id: i64,
    now: DateTime<Utc>,
) -> Result<PollReport, EngineError>
where
    S: Store + ?Sized,
    N: SocialNetwork + ?Sized,
    G: OutreachGenerator + ?Sized,
{
    let campaign = store.get_campaign(campaign_id).await?;
    if campaign.status != CampaignStatus::Active {
        warn!(campaign_id, status = %campaign.status, "campaign is not active, nothing to poll");
        return Ok(PollReport::default());
    }

    let stats = poll_campaign(store, social, outreach, &campaign, now).await?;
    Ok(PollReport {
        campaigns_polled: 1,
        comments_seen: stats.comments_seen,
        leads_captured: stats.leads_captured,
        ..PollReport::default()
    })
}

struct CampaignPollStats {
    comments_seen: usize,
    leads_captured: usize,
}

/// Polls a single campaign: fetch, classify, capture, advance checkpoint.
///
/// The checkpoint is written once, after every fetched comment has been
/// processed. An error mid-batch therefore persists nothing for this
/// campaign and the whole batch is refetched next cycle.
async fn poll_campaign<S, N, G>(
    store: &S,
    social: &N,
    outreach: &G,
    campaign: &Campaign,
    now: DateTime<Utc>,
) -> Result<CampaignPollStats, EngineError>
where
    S: Store + ?Sized,
    N: SocialNetwork + ?Sized,
    G: OutreachGenerator + ?Sized,
{
    let Some(account) = store.active_account(campaign.user_id).await? else {
        warn!(
            campaign_id = campaign.id,
            user_id = campaign.user_id,
            "no active account, skipping campaign"
        );
        return Ok(CampaignPollStats {
            comments_seen: 0,
            leads_captured: 0,
        });
    };

    let comments = social
        .fetch_comments(
            &account,
            &campaign.post_urn,
            campaign.last_comment_urn.as_deref(),
        )
        .await?;

    let Some(last_comment) = comments.last() else {
        debug!(campaign_id = campaign.id, "no new comments");
        return Ok(CampaignPollStats {
            comments_seen: 0,
            leads_captured: 0,
        });
    };
    let last_comment_urn = last_comment.urn.clone();

    let comments_seen = comments.len();
    let mut leads_captured = 0i32;

    for comment in comments {
        if capture_comment(store, social, outreach, campaign, &account, &comment, now).await? {
            leads_captured += 1;
        }
    }

    store
        .advance_checkpoint(campaign.id, &last_comment_urn, leads_captured, now)
        .await?;

    debug!(
        campaign_id = campaign.id,
        comments_seen,
        leads_captured,
        last_comment_urn = %last_comment_urn,
        "campaign polled"
    );

    Ok(CampaignPollStats {
        comments_seen,
        leads_captured: usize::try_from(leads_captured).unwrap_or_default(),
    })
}

/// Classifies one comment and captures it as a lead when it qualifies.
/// Returns `true` only when a new lead row was actually created.
async fn capture_comment<S, N, G>(
    store: &S,
    social: &N,
    outreach: &G,
    campaign: &Campaign,
    account: &Account,
    comment: &Comment,
    now: DateTime<Utc>,
) -> Result<bool, EngineError>
where
    S: Store + ?Sized,
    N: SocialNetwork + ?Sized,
    G: OutreachGenerator + ?Sized,
{
    let classification = classify_comment(&comment.text, campaign.capture_mode, &campaign.keywords);
    if !classification.should_capture {
        return Ok(false);
    }

    let intent_score = compute_intent_score(&comment.text);
    let is_connection = social
        .check_connection_degree(account, &comment.author_urn)
        .await?;

    let copy = outreach
        .generate(&OutreachContext {
            campaign_name: campaign.name.clone(),
            post_text: campaign.post_text.clone(),
            comment_text: comment.text.clone(),
            lead_name: comment.author_name.clone(),
            persona_prompt: campaign.persona_prompt.clone(),
            reply_template: campaign.reply_template.clone(),
            dm_template: campaign.dm_template.clone(),
            lead_magnet: campaign.lead_magnet.clone(),
        })
        .await?;

    let (status, approved_at) = if campaign.require_approval {
        (LeadStatus::Pending, None)
    } else {
        (LeadStatus::Approved, Some(now))
    };

    let new_lead = NewLead {
        campaign_id: campaign.id,
        profile_urn: comment.author_urn.clone(),
        profile_name: comment.author_name.clone(),
        profile_headline: comment.author_headline.clone(),
        comment_urn: comment.urn.clone(),
        comment_text: comment.text.clone(),
        commented_at: comment.created_at,
        keyword_matched: classification.keyword_matched.clone(),
        intent_score: i32::from(intent_score),
        is_connection,
        status,
        generated_reply: Some(copy.reply.clone()),
        generated_dm: Some(copy.dm.clone()),
        approved_at,
    };

    let Some(lead_id) = store.insert_lead_if_absent(&new_lead).await? else {
        info!(
            campaign_id = campaign.id,
            profile_urn = %comment.author_urn,
            "commenter already captured, skipping"
        );
        return Ok(false);
    };

    info!(
        campaign_id = campaign.id,
        lead_id,
        profile_urn = %comment.author_urn,
        intent_score,
        keyword = classification.keyword_matched.as_deref().unwrap_or(""),
        auto_approved = !campaign.require_approval,
        "lead captured"
    );

    store
        .append_event(
            campaign.id,
            Some(lead_id),
            EventKind::LeadCaptured,
            json!({
                "profile_urn": comment.author_urn,
                "intent_score": intent_score,
                "keyword_matched": classification.keyword_matched,
            }),
        )
        .await?;

    // Auto-approval campaigns queue the action plan the moment the lead
    // lands, anchored at capture time.
    if !campaign.require_approval {
        let plan = schedule_actions(campaign, now);
        let actions = plan_to_new_actions(&plan, Some(&copy.reply), Some(&copy.dm));
        store.create_action_plan(lead_id, &actions).await?;
    }

    Ok(true)
}
