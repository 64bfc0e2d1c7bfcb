// src/pipeline/repos.rs

//! New-repository watch.

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, Repository, WatchPreset};
use crate::pipeline::collect::{Pagination, collect_org_repos};
use crate::pipeline::diff::calculate_diff;
use crate::services::{HostingApi, Message, Notifier};
use crate::storage::{SnapshotStore, load_snapshot, save_snapshot};

/// Outcome of one watch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSummary {
    /// Repositories kept by the preset filter
    pub tracked: usize,
    /// Newly detected repositories, in listing order
    pub new_repos: Vec<String>,
    pub notified: bool,
    pub snapshot: String,
}

/// Detect repositories not seen in the preset's snapshot and alert on them.
///
/// The snapshot is only rewritten after the alert went out, so a failed
/// delivery is retried with the same diff on the next run.
pub async fn run_repo_watch(
    config: &Config,
    preset: &WatchPreset,
    api: &dyn HostingApi,
    notifier: &dyn Notifier,
    store: &dyn SnapshotStore,
) -> Result<WatchSummary> {
    let start_time = Utc::now();
    log::info!(
        "Watching {} for new repositories (preset '{}')",
        config.github.org,
        preset.name
    );

    let pagination = Pagination::from(&config.github);
    let listing = collect_org_repos(api, &config.github.org, pagination).await?;
    let current = preset.filter.apply(listing);
    log::info!("{} repositories match preset '{}'", current.len(), preset.name);

    let prior: Option<Vec<Repository>> = load_snapshot(store, &preset.snapshot).await?;
    let diff = calculate_diff(&current, prior.as_deref());

    let notified = if diff.has_new() {
        let message = Message::new_repositories(&preset.header, &diff.added, preset.style);
        notifier.send(&message).await?;
        true
    } else {
        log::info!("No new repositories found");
        false
    };
    let new_repos: Vec<String> = diff.added.iter().map(|r| r.full_name.clone()).collect();

    let meta = save_snapshot(store, &preset.snapshot, &current).await?;

    let elapsed = Utc::now().signed_duration_since(start_time);
    log::info!(
        "Watch complete in {:.2}s: {} new of {} tracked",
        elapsed.num_milliseconds() as f64 / 1000.0,
        new_repos.len(),
        current.len()
    );

    Ok(WatchSummary {
        tracked: current.len(),
        new_repos,
        notified,
        snapshot: meta.location,
    })
}
