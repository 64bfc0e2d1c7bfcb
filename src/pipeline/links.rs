// src/pipeline/links.rs

//! Related-repository scan of project web pages.

use crate::error::{AppError, Result};
use crate::models::{Config, ProjectLinks, Repository};
use crate::services::{WebFetch, extract_repo_links};
use crate::storage::{SnapshotStore, load_snapshot, save_snapshot};
use crate::utils::rewrite_url;

/// Outcome of one link scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkScanSummary {
    /// Projects read from the repository snapshot
    pub scanned: usize,
    /// Projects whose page could not be fetched
    pub unreachable: usize,
    pub projects: Vec<ProjectLinks>,
    pub output: String,
}

/// Scan each project's web page for links to other GitHub repositories.
///
/// Projects come from the repository watch snapshot. Only projects with at
/// least one surviving link are written.
pub async fn run_link_scan(
    config: &Config,
    web: &dyn WebFetch,
    store: &dyn SnapshotStore,
) -> Result<LinkScanSummary> {
    let links = &config.links;

    let repos: Vec<Repository> = load_snapshot(store, &links.input).await?.ok_or_else(|| {
        AppError::config(format!(
            "Repository snapshot {} not found, run `repos` first",
            store.location(&links.input)
        ))
    })?;

    let mut projects = Vec::new();
    let mut unreachable = 0;

    for repo in &repos {
        let page_url = rewrite_url(&repo.html_url, &links.rewrite_from, &links.rewrite_to);
        log::info!("Processing {} ({})", repo.name, page_url);

        let found = extract_repo_links(web, &page_url, &repo.name, &repo.html_url).await;
        let repo_links = match found {
            Ok(found) => found,
            Err(e) => {
                log::warn!("Failed to fetch {}: {}", page_url, e);
                unreachable += 1;
                continue;
            }
        };

        if repo_links.is_empty() {
            log::debug!("No related repositories on {}", page_url);
            continue;
        }
        projects.push(ProjectLinks {
            project_name: repo.name.clone(),
            repo_links,
        });
    }

    let meta = save_snapshot(store, &links.output, &projects).await?;
    log::info!(
        "Link scan complete: {} of {} projects link other repositories",
        projects.len(),
        repos.len()
    );

    Ok(LinkScanSummary {
        scanned: repos.len(),
        unreachable,
        projects,
        output: meta.location,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::storage::LocalStorage;
    use crate::test_support::FakeWeb;

    const WIDGET_PAGE: &str = r#"<html><body>
        <a href="https://github.com/OWASP/www-project-example">Project repo</a>
        <a href="https://github.com/acme/widget">Widget</a>
        <a href="https://github.com/acme/widget#readme">Widget docs</a>
        <a href="https://github.com/acme/removed">Removed</a>
        <a href="https://example.com/elsewhere">Elsewhere</a>
    </body></html>"#;

    async fn seed(store: &LocalStorage, config: &Config, repos: &[Repository]) {
        save_snapshot(store, &config.links.input, repos).await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_finds_related_repositories() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStorage::new(tmp.path());
        let config = Config::default();
        seed(
            &store,
            &config,
            &[
                Repository::new(1, "OWASP", "www-project-example"),
                Repository::new(2, "OWASP", "www-project-empty"),
            ],
        )
        .await;

        let web = FakeWeb::default()
            .page("https://owasp.org/www-project-example", WIDGET_PAGE)
            .page("https://owasp.org/www-project-empty", "<html><body>nothing</body></html>")
            .head("https://github.com/acme/widget", Ok(200))
            .head("https://github.com/acme/removed", Ok(404));

        let summary = run_link_scan(&config, &web, &store).await.unwrap();

        assert_eq!(summary.scanned, 2);
        assert_eq!(summary.unreachable, 0);
        assert_eq!(
            summary.projects,
            vec![ProjectLinks {
                project_name: "www-project-example".to_string(),
                repo_links: vec!["https://github.com/acme/widget".to_string()],
            }]
        );

        let written: Vec<ProjectLinks> = load_snapshot(&store, &config.links.output)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(written, summary.projects);
    }

    #[tokio::test]
    async fn test_unreachable_page_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStorage::new(tmp.path());
        let config = Config::default();
        seed(
            &store,
            &config,
            &[
                Repository::new(1, "OWASP", "www-project-gone"),
                Repository::new(2, "OWASP", "www-project-example"),
            ],
        )
        .await;
        let web = FakeWeb::default().page("https://owasp.org/www-project-example", WIDGET_PAGE);

        let summary = run_link_scan(&config, &web, &store).await.unwrap();

        assert_eq!(summary.unreachable, 1);
        assert_eq!(summary.projects.len(), 1);
        assert_eq!(summary.projects[0].project_name, "www-project-example");
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_a_config_error() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStorage::new(tmp.path());

        let err = run_link_scan(&Config::default(), &FakeWeb::default(), &store)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "Config");
        assert!(err.to_string().contains("run `repos` first"));
    }
}
