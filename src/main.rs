mod config;
mod github;
mod policy;
mod report;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

use policy::{Delivery, SystemClock};
use report::Outcome;

/// Concierge: bumps stale pull requests and reminds authors of newly opened
/// ones about CHANGES.md and third-party licenses.
#[derive(Parser, Debug)]
#[command(name = "concierge", version, about)]
struct Cli {
    /// Configuration file (defaults to ./concierge.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Decide comments without posting them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Optional output file path for a markdown report
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remind every configured repository's idle pull requests
    Stale,

    /// Evaluate one `pull_request` webhook payload
    Opened {
        /// Repository the event belongs to (owner/name)
        #[arg(short, long)]
        repository: String,

        /// Path to the webhook JSON payload
        #[arg(short, long)]
        event: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;
    let client = github::ReqwestClient::new()?;
    let (delivery, outcome) = if cli.dry_run {
        (Delivery::DryRun, Outcome::DryRun)
    } else {
        (Delivery::Post, Outcome::Posted)
    };

    let built_report = match &cli.command {
        Command::Stale => {
            let _span = info_span!("stale").entered();
            let repositories = config.repository_settings()?;
            debug!(repositories = repositories.len(), "validated repository settings");

            let summary = policy::stale_pull_request_job(
                &client,
                config.api_url(),
                &repositories,
                config.bot_login(),
                &SystemClock,
                delivery,
            )
            .await?;
            report::from_summary(summary, outcome)
        }
        Command::Opened { repository, event } => {
            let _span = info_span!("opened", repository = %repository).entered();
            let settings = config.settings_for(repository)?;

            info!(path = %event.display(), "reading webhook event");
            let payload: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(event)?)?;

            let intents = policy::opened_pull_request_handler(
                &client,
                &payload,
                &settings.headers,
                &settings.third_party_folders,
                settings.check_changes_md,
            )
            .await?;
            if delivery == Delivery::Post {
                policy::post_intents(&client, &settings.headers, &intents).await?;
            }
            report::from_intents(format!("opened pull request in {repository}"), intents, outcome)
        }
    };

    report::output(&built_report, cli.output.as_deref())?;
    info!(comments = built_report.intents.len(), "done");

    Ok(())
}
