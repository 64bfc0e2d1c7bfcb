// src/pipeline/sweep.rs

//! Staleness sweep over project page repositories.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Config, StaleFinding};
use crate::pipeline::collect::{Pagination, collect_org_repos};
use crate::services::{DocEnricher, HostingApi, Message, Notifier, enrich_all};

/// Outcome of one sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSummary {
    /// Repositories kept by the sweep filter
    pub checked: usize,
    /// Repositories whose lookups failed
    pub failed: usize,
    /// Every checked repository failed, so no findings means nothing
    pub all_failed: bool,
    pub findings: Vec<StaleFinding>,
}

/// Alert on every repository whose tracked file still carries the template
/// marker and has not been touched within the allowed age.
///
/// One message is sent per finding. A failed delivery aborts the sweep.
pub async fn run_sweep(
    config: &Config,
    api: &dyn HostingApi,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> Result<SweepSummary> {
    let sweep = &config.sweep;
    log::info!(
        "Sweeping {} for stale {} files",
        config.github.org,
        sweep.rule.path
    );

    let pagination = Pagination::from(&config.github);
    let listing = collect_org_repos(api, &config.github.org, pagination).await?;
    let repos = sweep.filter.apply(listing);
    log::info!("{} repositories to check", repos.len());

    let enricher = DocEnricher::new(api, &sweep.rule);
    let report = enrich_all(&enricher, &repos, sweep.on_failure).await;
    let all_failed = report.all_failed();
    if all_failed {
        log::error!("All {} repositories failed lookup", repos.len());
    }
    let failed = report.failure_count();

    let findings: Vec<StaleFinding> = report
        .into_records()
        .iter()
        .filter_map(|record| record.staleness(&sweep.rule, now))
        .collect();

    for finding in &findings {
        log::info!(
            "{} last modified {} ({} days ago)",
            finding.full_name,
            finding.last_modified.format("%Y-%m-%d"),
            finding.age_days
        );
        notifier
            .send(&Message::stale(finding, sweep.rule.max_age_days))
            .await?;
    }

    log::info!(
        "Sweep complete: {} stale of {} checked ({} failed)",
        findings.len(),
        repos.len(),
        failed
    );

    Ok(SweepSummary {
        checked: repos.len(),
        failed,
        all_failed,
        findings,
    })
}
