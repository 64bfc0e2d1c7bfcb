//! Service layer for orgwatch.
//!
//! This module contains the remote-facing logic for:
//! - GitHub API access (`HostingApi`, `GitHubClient`)
//! - Web pages and feeds (`WebFetch`, `HttpFetcher`)
//! - Team channel notifications (`Notifier`, `WebhookNotifier`)
//! - Entity enrichment (`Enricher`, `StatusEnricher`, `DocEnricher`)
//! - Project page link extraction and registry loading

mod enrich;
mod github;
mod links;
mod notify;
mod registry;
mod web;

pub use enrich::{DocEnricher, EnrichOutcome, EnrichReport, Enricher, StatusEnricher, enrich_all};
pub use github::{
    CommitEntry, CommitQuery, FileContent, GitHubClient, HostingApi, License, Release, RepoList,
    RepoMetadata,
};
pub use links::{candidate_links, extract_repo_links, link_exists};
pub use notify::{LogNotifier, Message, Notifier, WebhookNotifier};
pub use registry::fetch_registry;
pub use web::{HttpFetcher, WebFetch};
