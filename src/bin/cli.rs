//! orgwatch CLI
//!
//! Scheduled entry point for the organization watch jobs.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use orgwatch::{
    config::Credentials,
    error::Result,
    models::Config,
    pipeline,
    services::{GitHubClient, HttpFetcher, LogNotifier, Notifier, WebhookNotifier},
    storage::LocalStorage,
    utils::http,
};

/// orgwatch - GitHub organization change notifier
#[derive(Parser, Debug)]
#[command(
    name = "orgwatch",
    version,
    about = "Detect repository changes in a GitHub organization and notify a team channel"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "orgwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Alert on repositories created since the last run
    Repos {
        /// Watch preset to run
        #[arg(long, default_value = "all-repos")]
        preset: String,

        /// Log the alert instead of posting it
        #[arg(long)]
        dry_run: bool,
    },

    /// Alert on project pages still showing the template
    Sweep {
        /// Log the alerts instead of posting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Rebuild the registry project status report
    Status,

    /// Collect related repositories linked from project pages
    Links,

    /// Validate configuration file
    Validate,

    /// Show presets and snapshot info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Webhook notifier for the given variable, or the log notifier on dry runs.
fn notifier(
    config: &Config,
    credentials: &Credentials,
    webhook_env: &str,
    dry_run: bool,
) -> Result<Box<dyn Notifier>> {
    if dry_run {
        return Ok(Box::new(LogNotifier));
    }
    let url = credentials.webhook(webhook_env)?;
    let client = http::create_async_client(&config.github.user_agent, config.github.timeout_secs)?;
    Ok(Box::new(WebhookNotifier::new(client, url)))
}

fn github(config: &Config, credentials: &Credentials) -> Result<GitHubClient> {
    let token = credentials.github_token().map(str::to_string);
    if token.is_none() {
        log::warn!(
            "No GitHub token in {}, using unauthenticated requests",
            config.github.token_env.join(", ")
        );
    }
    GitHubClient::new(&config.github, token)
}

fn web(config: &Config) -> Result<HttpFetcher> {
    let client = http::create_async_client(&config.github.user_agent, config.github.timeout_secs)?;
    Ok(HttpFetcher::new(client, config.links.head_timeout_secs))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("orgwatch starting...");

    let config = Config::load_or_default(&cli.config);
    config.validate()?;
    log::info!("Loaded configuration from {}", cli.config.display());

    let credentials = Credentials::from_env(&config);
    let storage = LocalStorage::new(&config.storage.dir);

    match cli.command {
        Command::Repos { preset, dry_run } => {
            let preset = config.preset(&preset)?;
            let notifier = notifier(&config, &credentials, &preset.webhook_env, dry_run)?;
            let api = github(&config, &credentials)?;

            let summary =
                pipeline::run_repo_watch(&config, preset, &api, notifier.as_ref(), &storage).await?;
            log::info!(
                "{} new of {} tracked, snapshot at {}",
                summary.new_repos.len(),
                summary.tracked,
                summary.snapshot
            );
        }

        Command::Sweep { dry_run } => {
            let notifier = notifier(&config, &credentials, &config.sweep.webhook_env, dry_run)?;
            let api = github(&config, &credentials)?;

            let summary = pipeline::run_sweep(&config, &api, notifier.as_ref(), Utc::now()).await?;
            log::info!(
                "{} stale of {} checked",
                summary.findings.len(),
                summary.checked
            );
        }

        Command::Status => {
            let api = github(&config, &credentials)?;
            let web = web(&config)?;

            let summary = pipeline::run_status_report(&config, &web, &api, &storage).await?;
            log::info!(
                "Wrote {} records ({} failed) to {}",
                summary.written,
                summary.failed,
                summary.output
            );
        }

        Command::Links => {
            let web = web(&config)?;

            let summary = pipeline::run_link_scan(&config, &web, &storage).await?;
            log::info!(
                "{} projects with related repositories written to {}",
                summary.projects.len(),
                summary.output
            );
        }

        Command::Validate => {
            // Already validated above; reaching here means it passed
            log::info!("✓ Config OK ({} presets)", config.presets.len());
            match credentials.require_token(&config) {
                Ok(_) => log::info!("✓ GitHub token found"),
                Err(e) => log::warn!("{}", e),
            }
            for preset in &config.presets {
                if credentials.webhook(&preset.webhook_env).is_err() {
                    log::warn!("Preset '{}': {} not set", preset.name, preset.webhook_env);
                }
            }
            if credentials.webhook(&config.sweep.webhook_env).is_err() {
                log::warn!("Sweep: {} not set", config.sweep.webhook_env);
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Organization: {}", config.github.org);
            log::info!("Storage directory: {}", config.storage.dir);

            for preset in &config.presets {
                let path = config.storage_path(&preset.snapshot);
                log::info!(
                    "Preset '{}' ({:?}): {} {}",
                    preset.name,
                    preset.filter,
                    path.display(),
                    if path.exists() { "exists" } else { "not found" }
                );
            }
            for file in [&config.status.output, &config.links.output] {
                let path = config.storage_path(file);
                log::info!(
                    "Report {}: {}",
                    path.display(),
                    if path.exists() { "exists" } else { "not found" }
                );
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
