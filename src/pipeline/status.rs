// src/pipeline/status.rs

//! Repository status report for registry projects.

use crate::error::Result;
use crate::models::{Config, ProjectDescriptor, StatusRecord};
use crate::pipeline::diff::calculate_diff;
use crate::services::{HostingApi, StatusEnricher, WebFetch, enrich_all, fetch_registry};
use crate::storage::{SnapshotStore, load_snapshot, save_snapshot};

/// Outcome of one status report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    /// Registry projects hosted on GitHub
    pub hosted: usize,
    /// Records written to the report
    pub written: usize,
    pub failed: usize,
    /// Every project failed enrichment
    pub all_failed: bool,
    /// Repositories not in the previous report
    pub new_repos: Vec<String>,
    pub output: String,
}

/// Enrich every GitHub-hosted registry project and rewrite the status report.
pub async fn run_status_report(
    config: &Config,
    web: &dyn WebFetch,
    api: &dyn HostingApi,
    store: &dyn SnapshotStore,
) -> Result<StatusSummary> {
    let status = &config.status;

    let projects: Vec<ProjectDescriptor> = fetch_registry(web, &status.registry_url)
        .await?
        .into_iter()
        .filter(ProjectDescriptor::is_github_hosted)
        .collect();
    log::info!("{} projects hosted on GitHub", projects.len());

    let enricher = StatusEnricher::new(api, status.list_per_page);
    let report = enrich_all(&enricher, &projects, status.on_failure).await;
    let all_failed = report.all_failed();
    if all_failed {
        log::error!("All {} projects failed enrichment", projects.len());
    }
    for (label, reason) in report.skipped() {
        log::warn!("Skipped {}: {}", label, reason);
    }
    let failed = report.failure_count();
    let records = report.into_records();

    let prior: Option<Vec<StatusRecord>> = load_snapshot(store, &status.output).await?;
    let diff = calculate_diff(&records, prior.as_deref());
    let new_repos: Vec<String> = diff.added.iter().map(|r| r.repo_name.clone()).collect();
    if diff.had_baseline {
        for name in &new_repos {
            log::info!("New in report: {}", name);
        }
    }

    let meta = save_snapshot(store, &status.output, &records).await?;

    Ok(StatusSummary {
        hosted: projects.len(),
        written: meta.count,
        failed,
        all_failed,
        new_repos,
        output: meta.location,
    })
}
