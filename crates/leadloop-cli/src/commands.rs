//! Command handlers, called from `main` after config is loaded.

use anyhow::Context;
use chrono::Utc;
use tracing::{error, info};

use leadloop_core::ports::{CrmSync, Store};
use leadloop_core::AppConfig;
use leadloop_db::{PgStore, PoolConfig};
use leadloop_engine::{
    approve_and_plan, run_execute_cycle, run_poll_cycle, run_poll_one, NoopCrm, RetryPolicy,
    WebhookCrm,
};
use leadloop_linkedin::LinkedinClient;
use leadloop_outreach::OutreachClient;

/// Generation calls are slower than plain API calls; give them more room.
const OUTREACH_TIMEOUT_SECS: u64 = 60;
const CRM_TIMEOUT_SECS: u64 = 10;

struct Engine {
    store: PgStore,
    linkedin: LinkedinClient,
    outreach: OutreachClient,
    crm: Box<dyn CrmSync>,
}

async fn build_store(config: &AppConfig) -> anyhow::Result<PgStore> {
    let pool = leadloop_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config))
        .await
        .context("failed to connect to Postgres")?;
    Ok(PgStore::new(pool))
}

async fn build_engine(config: &AppConfig) -> anyhow::Result<Engine> {
    let store = build_store(config).await?;

    let linkedin = LinkedinClient::new(
        &config.linkedin_base_url,
        config.linkedin_request_timeout_secs,
        &config.linkedin_user_agent,
        config.linkedin_max_retries,
        config.linkedin_backoff_base_secs,
    )
    .context("failed to build LinkedIn client")?;

    let outreach = OutreachClient::new(
        &config.outreach_base_url,
        &config.outreach_api_key,
        &config.outreach_model,
        OUTREACH_TIMEOUT_SECS,
    )
    .context("failed to build outreach client")?;

    let crm: Box<dyn CrmSync> = match &config.crm_webhook_url {
        Some(url) => Box::new(
            WebhookCrm::new(url, CRM_TIMEOUT_SECS).context("failed to build CRM webhook client")?,
        ),
        None => Box::new(NoopCrm),
    };

    Ok(Engine {
        store,
        linkedin,
        outreach,
        crm,
    })
}

pub(crate) async fn run_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let store = build_store(config).await?;
    leadloop_db::run_migrations(store.pool())
        .await
        .context("migration failed")?;
    println!("migrations applied");
    Ok(())
}

pub(crate) async fn run_poll(config: &AppConfig, campaign: Option<i64>) -> anyhow::Result<()> {
    let engine = build_engine(config).await?;
    let report = match campaign {
        Some(campaign_id) => {
            run_poll_one(
                &engine.store,
                &engine.linkedin,
                &engine.outreach,
                campaign_id,
                Utc::now(),
            )
            .await?
        }
        None => {
            run_poll_cycle(&engine.store, &engine.linkedin, &engine.outreach, Utc::now()).await?
        }
    };
    println!(
        "polled {} campaigns ({} failed, {} expired): {} comments seen, {} leads captured",
        report.campaigns_polled,
        report.campaigns_failed,
        report.campaigns_expired,
        report.comments_seen,
        report.leads_captured
    );
    Ok(())
}

pub(crate) async fn run_execute(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    if dry_run {
        let store = build_store(config).await?;
        let due = store
            .list_due_actions(config.executor_batch_size, Utc::now())
            .await?;
        println!("dry-run: {} actions due", due.len());
        for action in due {
            println!(
                "  action {} ({}) for lead {}: scheduled {}, retries {}",
                action.id,
                action.action_type,
                action.lead_id,
                action.scheduled_for,
                action.retry_count
            );
        }
        return Ok(());
    }

    let engine = build_engine(config).await?;
    let report = run_execute_cycle(
        &engine.store,
        &engine.linkedin,
        engine.crm.as_ref(),
        config.executor_batch_size,
        RetryPolicy {
            max_retries: config.executor_max_retries,
            backoff_base_secs: config.executor_backoff_base_secs,
        },
        Utc::now(),
    )
    .await?;
    println!(
        "{} actions due: {} executed, {} requeued, {} failed, {} skipped, {} leads completed",
        report.actions_due,
        report.executed,
        report.requeued,
        report.failed,
        report.skipped,
        report.leads_completed
    );
    Ok(())
}

pub(crate) async fn run_once(config: &AppConfig) -> anyhow::Result<()> {
    run_poll(config, None).await?;
    run_execute(config, false).await
}

/// Runs poll+execute cycles forever. A failed cycle is logged and the loop
/// keeps going; only startup wiring errors abort the daemon.
pub(crate) async fn run_daemon(
    config: &AppConfig,
    interval_secs: Option<u64>,
) -> anyhow::Result<()> {
    let engine = build_engine(config).await?;
    let interval = interval_secs.unwrap_or(config.poll_interval_secs);
    let retry = RetryPolicy {
        max_retries: config.executor_max_retries,
        backoff_base_secs: config.executor_backoff_base_secs,
    };
    info!(interval_secs = interval, "daemon starting");

    loop {
        let now = Utc::now();
        match run_poll_cycle(&engine.store, &engine.linkedin, &engine.outreach, now).await {
            Ok(report) => info!(
                polled = report.campaigns_polled,
                captured = report.leads_captured,
                "poll cycle done"
            ),
            Err(e) => error!(error = %e, "poll cycle failed"),
        }
        match run_execute_cycle(
            &engine.store,
            &engine.linkedin,
            engine.crm.as_ref(),
            config.executor_batch_size,
            retry,
            Utc::now(),
        )
        .await
        {
            Ok(report) => info!(
                executed = report.executed,
                completed = report.leads_completed,
                "execute cycle done"
            ),
            Err(e) => error!(error = %e, "execute cycle failed"),
        }
        tokio::time::sleep(std::time::Duration::from_secs(interval)).await;
    }
}

pub(crate) async fn run_approve(config: &AppConfig, lead_id: i64) -> anyhow::Result<()> {
    let store = build_store(config).await?;
    let lead = approve_and_plan(&store, lead_id, Utc::now())
        .await
        .with_context(|| format!("failed to approve lead {lead_id}"))?;
    println!("lead {lead_id} ({}) approved", lead.profile_name);
    Ok(())
}

pub(crate) async fn run_skip(config: &AppConfig, lead_id: i64, reason: &str) -> anyhow::Result<()> {
    let store = build_store(config).await?;
    store
        .skip_lead(lead_id, reason)
        .await
        .with_context(|| format!("failed to skip lead {lead_id}"))?;
    println!("lead {lead_id} skipped: {reason}");
    Ok(())
}
