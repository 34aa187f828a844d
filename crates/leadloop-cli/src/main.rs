//! `leadloop` command line interface.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "leadloop")]
#[command(about = "LinkedIn comment-to-lead campaign engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations.
    Migrate,
    /// Run one poll cycle over all active campaigns.
    Poll {
        /// Poll only this campaign.
        #[arg(long)]
        campaign: Option<i64>,
    },
    /// Run one execute cycle over due actions.
    Execute {
        /// Print due actions without claiming or executing them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Run one poll cycle followed by one execute cycle.
    Run,
    /// Run poll+execute cycles forever on an interval.
    Daemon {
        /// Seconds between cycles; overrides LEADLOOP_POLL_INTERVAL_SECS.
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Approve a pending lead and queue its action plan.
    Approve { lead_id: i64 },
    /// Skip a pending or approved lead.
    Skip { lead_id: i64, reason: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = leadloop_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Migrate => commands::run_migrate(&config).await,
        Commands::Poll { campaign } => commands::run_poll(&config, campaign).await,
        Commands::Execute { dry_run } => commands::run_execute(&config, dry_run).await,
        Commands::Run => commands::run_once(&config).await,
        Commands::Daemon { interval_secs } => commands::run_daemon(&config, interval_secs).await,
        Commands::Approve { lead_id } => commands::run_approve(&config, lead_id).await,
        Commands::Skip { lead_id, reason } => commands::run_skip(&config, lead_id, &reason).await,
    }
}
