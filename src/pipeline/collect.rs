// src/pipeline/collect.rs

//! Paginated collection of listing endpoints.

use std::future::Future;

use crate::error::Result;
use crate::models::{GithubConfig, Repository};
use crate::services::HostingApi;

/// Page size and ceiling for a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub per_page: u32,
    /// Pages fetched at most, so a listing that never runs dry still ends
    pub max_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            per_page: 100,
            max_pages: 100,
        }
    }
}

impl From<&GithubConfig> for Pagination {
    fn from(config: &GithubConfig) -> Self {
        Self {
            per_page: config.per_page,
            max_pages: config.max_pages,
        }
    }
}

/// Fetch pages starting at 1 until an empty page or the ceiling.
///
/// `fetch` receives the page number. The first error aborts collection.
pub async fn collect_pages<T, F, Fut>(pagination: Pagination, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut items = Vec::new();

    for page in 1..=pagination.max_pages {
        let batch = fetch(page).await?;
        if batch.is_empty() {
            log::debug!("Page {} empty, listing complete", page);
            return Ok(items);
        }
        log::debug!("Page {}: {} items", page, batch.len());
        items.extend(batch);
    }

    log::warn!(
        "Stopped after page ceiling of {} ({} items collected)",
        pagination.max_pages,
        items.len()
    );
    Ok(items)
}

/// List every repository of an organization.
pub async fn collect_org_repos(
    api: &dyn HostingApi,
    org: &str,
    pagination: Pagination,
) -> Result<Vec<Repository>> {
    let repos = collect_pages(pagination, |page| {
        api.list_org_repos(org, page, pagination.per_page)
    })
    .await?;
    log::info!("Fetched {} repositories from {}", repos.len(), org);
    Ok(repos)
}
