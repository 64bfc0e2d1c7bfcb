// src/services/enrich.rs

//! Per-entity enrichment with supplementary lookups.
//!
//! Each lookup may fail on its own and only blanks its field. A failure
//! of the entity as a whole is recorded in the [`EnrichReport`] and the
//! batch moves on.

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{
    DocRecord, FailurePolicy, ProjectDescriptor, Repository, StalenessRule, StatusRecord,
};
use crate::services::{CommitQuery, HostingApi, RepoList};
use crate::utils::http::is_transport_failure;

/// Turns one entity into one enriched record.
#[async_trait]
pub trait Enricher: Send + Sync {
    type Input: Sync;
    type Output: Send;

    /// Identifies the entity in log lines and skip reasons.
    fn label(&self, entity: &Self::Input) -> String;

    async fn enrich(&self, entity: &Self::Input) -> Result<Self::Output>;

    /// Record with every enrichment field absent.
    fn fallback(&self, entity: &Self::Input) -> Self::Output;
}

/// What happened to one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichOutcome<T> {
    Enriched(T),
    /// Enrichment failed; the fallback record stands in
    Degraded { record: T, reason: String },
    /// Enrichment failed; the entity is left out
    Skipped { label: String, reason: String },
}

/// Outcomes of a batch, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichReport<T> {
    pub outcomes: Vec<EnrichOutcome<T>>,
}

impl<T> Default for EnrichReport<T> {
    fn default() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }
}

impl<T> EnrichReport<T> {
    /// Entities that failed, whether skipped or degraded.
    pub fn failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o, EnrichOutcome::Enriched(_)))
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            EnrichOutcome::Skipped { label, reason } => Some((label.as_str(), reason.as_str())),
            _ => None,
        })
    }

    /// True when there was input and none of it enriched cleanly.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.failure_count() == self.outcomes.len()
    }

    /// Emitted records (enriched and degraded), in input order.
    pub fn into_records(self) -> Vec<T> {
        self.outcomes
            .into_iter()
            .filter_map(|o| match o {
                EnrichOutcome::Enriched(record) | EnrichOutcome::Degraded { record, .. } => {
                    Some(record)
                }
                EnrichOutcome::Skipped { .. } => None,
            })
            .collect()
    }
}

/// Enrich entities one after another. Never fails as a whole.
pub async fn enrich_all<E>(
    enricher: &E,
    entities: &[E::Input],
    policy: FailurePolicy,
) -> EnrichReport<E::Output>
where
    E: Enricher + ?Sized,
{
    let mut report = EnrichReport::default();

    for entity in entities {
        let label = enricher.label(entity);
        log::info!("Processing {}", label);

        let outcome = match enricher.enrich(entity).await {
            Ok(record) => EnrichOutcome::Enriched(record),
            Err(e) => {
                log::error!("Error enriching {}: {} ({})", label, e.kind(), e);
                let reason = e.to_string();
                match policy {
                    FailurePolicy::Skip => EnrichOutcome::Skipped { label, reason },
                    FailurePolicy::Degrade => EnrichOutcome::Degraded {
                        record: enricher.fallback(entity),
                        reason,
                    },
                }
            }
        };
        report.outcomes.push(outcome);
    }

    report
}

/// A lookup result where only an unreachable remote is an error.
fn optional<T>(result: Result<T>, what: &str, context: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if is_transport_failure(&e) => Err(e),
        Err(e) => {
            log::debug!("{} lookup for {} absent: {}", what, context, e);
            Ok(None)
        }
    }
}

/// First element of a list lookup; an empty list counts as absent.
fn head<T>(result: Result<Vec<T>>, what: &str, context: &str) -> Result<Option<T>> {
    Ok(optional(result, what, context)?.and_then(|items| items.into_iter().next()))
}

/// Builds repository status records for registry projects.
pub struct StatusEnricher<'a> {
    api: &'a dyn HostingApi,
    list_per_page: Option<u32>,
}

impl<'a> StatusEnricher<'a> {
    pub fn new(api: &'a dyn HostingApi, list_per_page: Option<u32>) -> Self {
        Self { api, list_per_page }
    }

    async fn count(&self, repo_name: &str, list: RepoList) -> Result<Option<usize>> {
        optional(
            self.api.count_list(repo_name, list, self.list_per_page).await,
            &format!("{list:?}"),
            repo_name,
        )
    }
}

#[async_trait]
impl Enricher for StatusEnricher<'_> {
    type Input = ProjectDescriptor;
    type Output = StatusRecord;

    fn label(&self, project: &ProjectDescriptor) -> String {
        let code_url = project.code_url();
        if code_url.is_empty() {
            project.name.clone()
        } else {
            code_url.to_string()
        }
    }

    async fn enrich(&self, project: &ProjectDescriptor) -> Result<StatusRecord> {
        let repo_name = project.repo_name()?;
        let mut record = StatusRecord::from_project(project, repo_name.as_str());

        match self.api.repo_metadata(&repo_name).await {
            Ok(meta) => {
                record.github_status = "success".to_string();
                record.stars = meta.stargazers_count;
                record.forks = meta.forks_count;
                record.top_language = meta.language;
                record.license = meta.license.and_then(|l| l.name);
            }
            Err(AppError::Api { message, .. }) => record.github_status = message,
            Err(e) => return Err(e),
        }

        let last_commit = head(
            self.api.commits(&repo_name, &CommitQuery::default()).await,
            "commits",
            &repo_name,
        )?;
        record.last_commit = last_commit.and_then(|c| c.committer_date().map(str::to_string));

        let release = head(self.api.releases(&repo_name).await, "releases", &repo_name)?;
        if let Some(release) = release {
            record.date_released = release.published_at;
            record.release_version = release.tag_name;
        }

        record.committers = self.count(&repo_name, RepoList::Contributors).await?;
        record.prs = self.count(&repo_name, RepoList::Pulls).await?;
        record.issues = self.count(&repo_name, RepoList::Issues).await?;

        Ok(record)
    }

    fn fallback(&self, project: &ProjectDescriptor) -> StatusRecord {
        let repo_name = project
            .repo_name()
            .unwrap_or_else(|_| project.code_url().to_string());
        let mut record = StatusRecord::from_project(project, repo_name);
        record.github_status = "error".to_string();
        record
    }
}

/// Reads a tracked file and its last-modified date for each repository.
pub struct DocEnricher<'a> {
    api: &'a dyn HostingApi,
    rule: &'a StalenessRule,
}

impl<'a> DocEnricher<'a> {
    pub fn new(api: &'a dyn HostingApi, rule: &'a StalenessRule) -> Self {
        Self { api, rule }
    }
}

#[async_trait]
impl Enricher for DocEnricher<'_> {
    type Input = Repository;
    type Output = DocRecord;

    fn label(&self, repo: &Repository) -> String {
        repo.full_name.clone()
    }

    async fn enrich(&self, repo: &Repository) -> Result<DocRecord> {
        let full_name = repo.full_name.as_str();
        let mut record = DocRecord::empty(full_name, repo.html_url.as_str());

        let file = optional(
            self.api.file_content(full_name, &self.rule.path).await,
            &self.rule.path,
            full_name,
        )?;
        record.content = file.map(|f| f.decode()).transpose()?;

        // The commit date only matters for pages still carrying the marker
        if record.has_marker(&self.rule.marker) {
            let query = CommitQuery {
                path: Some(self.rule.path.clone()),
                per_page: Some(1),
            };
            let last = head(
                self.api.commits(full_name, &query).await,
                "file commits",
                full_name,
            )?;
            record.last_modified = last.and_then(|c| c.committed_at());
        }

        Ok(record)
    }

    fn fallback(&self, repo: &Repository) -> DocRecord {
        DocRecord::empty(repo.full_name.as_str(), repo.html_url.as_str())
    }
}
