//! Action plan scheduling with randomized, human-like delays.
//!
//! Actions are planned in the fixed order like, reply, dm, invite. The like
//! and the public reply are both offset from the base time (a like is
//! allowed to land after the reply); the dm chains after the reply, and the
//! invite chains last. This cadence is part of the product contract: like
//! soonest, then a public reply, then a private dm, then an optional invite.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::types::{ActionType, Campaign, DelayRange, PlannedAction};

/// Invites ignore the configured delay range and always land 1-2 hours
/// after the previous action.
const INVITE_DELAY: DelayRange = DelayRange {
    min_secs: 3_600,
    max_secs: 7_200,
};

/// Computes the ordered action plan for one lead of `campaign`, with
/// scheduled times relative to `base_time`.
///
/// Delegates to [`schedule_actions_with_rng`] with the thread RNG.
#[must_use]
pub fn schedule_actions(campaign: &Campaign, base_time: DateTime<Utc>) -> Vec<PlannedAction> {
    schedule_actions_with_rng(campaign, base_time, &mut rand::rng())
}

/// Computes the ordered action plan using the provided RNG.
///
/// Each enabled action draws a uniform delay in its configured inclusive
/// range. `like` and `reply` are both offset from `base_time`; the anchor
/// then advances through `reply` and `dm` so later actions always follow
/// earlier ones. A completed like never shifts the anchor.
#[must_use]
pub fn schedule_actions_with_rng<R: Rng + ?Sized>(
    campaign: &Campaign,
    base_time: DateTime<Utc>,
    rng: &mut R,
) -> Vec<PlannedAction> {
    let mut plan = Vec::new();
    let mut anchor = base_time;

    if campaign.actions.like {
        plan.push(PlannedAction {
            action_type: ActionType::Like,
            scheduled_for: base_time + draw_delay(rng, campaign.delays.like),
        });
    }

    if campaign.actions.reply {
        let at = base_time + draw_delay(rng, campaign.delays.reply);
        plan.push(PlannedAction {
            action_type: ActionType::Reply,
            scheduled_for: at,
        });
        anchor = at;
    }

    if campaign.actions.dm {
        let at = anchor + draw_delay(rng, campaign.delays.dm);
        plan.push(PlannedAction {
            action_type: ActionType::Dm,
            scheduled_for: at,
        });
        anchor = at;
    }

    if campaign.actions.invite {
        plan.push(PlannedAction {
            action_type: ActionType::Invite,
            scheduled_for: anchor + draw_delay(rng, INVITE_DELAY),
        });
    }

    plan
}

/// Draws a uniform delay within `range`, inclusive on both ends.
fn draw_delay<R: Rng + ?Sized>(rng: &mut R, range: DelayRange) -> Duration {
    // delay_min <= delay_max is a campaign invariant; a misordered range
    // from a hand-edited row still must not panic here.
    let hi = range.max_secs.max(range.min_secs);
    Duration::seconds(rng.random_range(range.min_secs..=hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionDelays, ActionFlags, CampaignStatus, CaptureMode};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn fixed(secs: i64) -> DelayRange {
        DelayRange {
            min_secs: secs,
            max_secs: secs,
        }
    }

    fn campaign(actions: ActionFlags, delays: ActionDelays) -> Campaign {
        Campaign {
            id: 1,
            public_id: Uuid::new_v4(),
            user_id: 1,
            name: "test".to_string(),
            status: CampaignStatus::Active,
            post_url: "https://www.linkedin.com/posts/x".to_string(),
            post_urn: "urn:li:share:1".to_string(),
            post_text: None,
            post_author: None,
            capture_mode: CaptureMode::Any,
            keywords: Vec::new(),
            actions,
            delays,
            require_approval: false,
            window_days: 7,
            expires_at: Utc::now() + Duration::days(7),
            reply_template: None,
            dm_template: None,
            persona_prompt: None,
            lead_magnet: None,
            last_comment_urn: None,
            last_polled_at: None,
            total_captured: 0,
            total_approved: 0,
            total_completed: 0,
            created_at: Utc::now(),
        }
    }

    fn all_enabled() -> ActionFlags {
        ActionFlags {
            like: true,
            reply: true,
            dm: true,
            invite: true,
        }
    }

    fn default_delays() -> ActionDelays {
        ActionDelays {
            like: DelayRange {
                min_secs: 30,
                max_secs: 120,
            },
            reply: DelayRange {
                min_secs: 120,
                max_secs: 600,
            },
            dm: DelayRange {
                min_secs: 600,
                max_secs: 2700,
            },
            invite: fixed(5),
        }
    }

    #[test]
    fn plan_preserves_priority_order() {
        let c = campaign(all_enabled(), default_delays());
        let mut rng = StdRng::seed_from_u64(7);
        let plan = schedule_actions_with_rng(&c, Utc::now(), &mut rng);
        let types: Vec<ActionType> = plan.iter().map(|p| p.action_type).collect();
        assert_eq!(
            types,
            vec![
                ActionType::Like,
                ActionType::Reply,
                ActionType::Dm,
                ActionType::Invite
            ]
        );
    }

    #[test]
    fn disabled_actions_are_absent() {
        let c = campaign(
            ActionFlags {
                like: true,
                reply: false,
                dm: true,
                invite: false,
            },
            default_delays(),
        );
        let mut rng = StdRng::seed_from_u64(7);
        let plan = schedule_actions_with_rng(&c, Utc::now(), &mut rng);
        let types: Vec<ActionType> = plan.iter().map(|p| p.action_type).collect();
        assert_eq!(types, vec![ActionType::Like, ActionType::Dm]);
    }

    #[test]
    fn dm_chains_after_reply_when_reply_enabled() {
        let c = campaign(all_enabled(), default_delays());
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let plan = schedule_actions_with_rng(&c, Utc::now(), &mut rng);
            let reply = plan
                .iter()
                .find(|p| p.action_type == ActionType::Reply)
                .unwrap();
            let dm = plan.iter().find(|p| p.action_type == ActionType::Dm).unwrap();
            assert!(dm.scheduled_for >= reply.scheduled_for);
        }
    }

    #[test]
    fn dm_chains_off_base_when_reply_disabled() {
        let mut delays = default_delays();
        // If dm wrongly chained off a phantom reply, this range would show up.
        delays.reply = fixed(1_000_000);
        delays.dm = fixed(5);
        let c = campaign(
            ActionFlags {
                like: false,
                reply: false,
                dm: true,
                invite: false,
            },
            delays,
        );
        let base = Utc::now();
        let mut rng = StdRng::seed_from_u64(1);
        let plan = schedule_actions_with_rng(&c, base, &mut rng);
        assert_eq!(plan[0].scheduled_for, base + Duration::seconds(5));
    }

    #[test]
    fn reply_is_anchored_at_base_not_after_like() {
        let mut delays = default_delays();
        delays.like = fixed(500);
        delays.reply = fixed(10);
        let c = campaign(
            ActionFlags {
                like: true,
                reply: true,
                dm: false,
                invite: false,
            },
            delays,
        );
        let base = Utc::now();
        let mut rng = StdRng::seed_from_u64(1);
        let plan = schedule_actions_with_rng(&c, base, &mut rng);
        // The reply lands before the like: both are offset from base.
        assert_eq!(plan[0].scheduled_for, base + Duration::seconds(500));
        assert_eq!(plan[1].scheduled_for, base + Duration::seconds(10));
    }

    #[test]
    fn invite_ignores_configured_range_and_uses_one_to_two_hours() {
        let mut delays = default_delays();
        delays.invite = fixed(1); // must be ignored
        let c = campaign(
            ActionFlags {
                like: false,
                reply: false,
                dm: false,
                invite: true,
            },
            delays,
        );
        let base = Utc::now();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let plan = schedule_actions_with_rng(&c, base, &mut rng);
            let delta = (plan[0].scheduled_for - base).num_seconds();
            assert!((3_600..=7_200).contains(&delta), "invite delay {delta}s");
        }
    }

    #[test]
    fn drawn_delays_respect_inclusive_bounds() {
        let range = DelayRange {
            min_secs: 30,
            max_secs: 120,
        };
        let mut rng = StdRng::seed_from_u64(99);
        let mut saw_min = false;
        let mut saw_max = false;
        for _ in 0..10_000 {
            let d = draw_delay(&mut rng, range).num_seconds();
            assert!((30..=120).contains(&d), "delay {d}s out of range");
            saw_min |= d == 30;
            saw_max |= d == 120;
        }
        assert!(saw_min, "min bound never drawn in 10k draws");
        assert!(saw_max, "max bound never drawn in 10k draws");
    }

    #[test]
    fn misordered_range_does_not_panic() {
        let range = DelayRange {
            min_secs: 100,
            max_secs: 10,
        };
        let mut rng = StdRng::seed_from_u64(5);
        let d = draw_delay(&mut rng, range).num_seconds();
        assert_eq!(d, 100);
    }
}
