// src/services/links.rs

//! Related-repository link extraction from project web pages.

use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::services::WebFetch;
use crate::utils::github_repo_root;

/// Repository root links on a page, excluding links back to the project itself.
///
/// A link is self-referential when its text contains the project name,
/// ignoring case, or when it resolves to the project's own repository
/// `own_repo`. Results are deduplicated in document order.
pub fn candidate_links(html: &str, project_name: &str, own_repo: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let anchor_sel = parse_selector("a[href]")?;
    let name = project_name.trim().to_lowercase();
    let own_root = github_repo_root(own_repo);

    let mut links: Vec<String> = Vec::new();
    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(root) = github_repo_root(href) else {
            continue;
        };

        let text: String = anchor.text().collect();
        let names_project = !name.is_empty() && text.to_lowercase().contains(&name);
        if names_project || own_root.as_deref() == Some(root.as_str()) {
            log::debug!("Ignoring self link {}", href);
            continue;
        }

        if !links.contains(&root) {
            links.push(root);
        }
    }
    Ok(links)
}

/// Whether a link should be kept: only a definite 404 rejects it.
pub async fn link_exists(web: &dyn WebFetch, url: &str) -> bool {
    match web.head_status(url).await {
        Ok(404) => false,
        Ok(_) => true,
        Err(e) => {
            log::warn!("Could not validate URL {}: {}", url, e.kind());
            true
        }
    }
}

/// Fetch a project page and return its validated repository links.
pub async fn extract_repo_links(
    web: &dyn WebFetch,
    page_url: &str,
    project_name: &str,
    own_repo: &str,
) -> Result<Vec<String>> {
    let html = web.get_text(page_url).await?;
    let candidates = candidate_links(&html, project_name, own_repo)?;

    let mut links = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if link_exists(web, &candidate).await {
            links.push(candidate);
        } else {
            log::info!("Skipping 404 URL: {}", candidate);
        }
    }
    Ok(links)
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeWeb;

    const PAGE: &str = r##"
        <html><body>
          <a href="https://github.com/acme/widget">Widget source</a>
          <a href="https://github.com/acme/widget/issues">Issues</a>
          <a href="https://github.com/OWASP/www-project-gizmo">www-project-gizmo on GitHub</a>
          <a href="https://github.com/acme/other#readme">Docs</a>
          <a href="https://github.com/acme">Org</a>
          <a href="/local">Local</a>
          <a name="anchor-only">No href</a>
        </body></html>
    "##;

    const GIZMO_REPO: &str = "https://github.com/OWASP/www-project-gizmo";

    #[test]
    fn test_candidates_exclude_self_and_dedupe() {
        let links = candidate_links(PAGE, "www-project-gizmo", GIZMO_REPO).unwrap();
        assert_eq!(
            links,
            vec![
                "https://github.com/acme/widget".to_string(),
                "https://github.com/acme/other".to_string(),
            ]
        );
    }

    #[test]
    fn test_self_match_on_link_text() {
        let html = r#"<a href="https://github.com/acme/repo">The Gizmo repo</a>"#;
        assert!(candidate_links(html, "GIZMO", GIZMO_REPO).unwrap().is_empty());
    }

    #[test]
    fn test_name_in_href_alone_is_not_self() {
        let html = r#"<a href="https://github.com/acme/gizmo-tools">Companion tools</a>"#;
        assert_eq!(
            candidate_links(html, "gizmo", GIZMO_REPO).unwrap(),
            vec!["https://github.com/acme/gizmo-tools".to_string()]
        );
    }

    #[test]
    fn test_own_repository_is_excluded_whatever_the_text() {
        let html = r#"
            <a href="https://github.com/owasp/www-project-gizmo/blob/main/index.md">Edit page</a>
            <a href="https://github.com/OWASP/www-project-gizmo.git">Clone</a>
        "#;
        assert!(candidate_links(html, "Gizmo", GIZMO_REPO).unwrap().is_empty());
    }

    #[test]
    fn test_query_variants_collapse_to_one_root() {
        let html = r#"
            <a href="https://github.com/acme/widget">Widget</a>
            <a href="https://github.com/acme/widget?tab=readme">Widget readme</a>
        "#;
        assert_eq!(
            candidate_links(html, "gizmo", GIZMO_REPO).unwrap(),
            vec!["https://github.com/acme/widget".to_string()]
        );
    }

    #[test]
    fn test_empty_project_name_excludes_only_own_repo() {
        let links = candidate_links(PAGE, "", GIZMO_REPO).unwrap();
        assert_eq!(links.len(), 2);
        let links = candidate_links(PAGE, "", "").unwrap();
        assert_eq!(links.len(), 3);
    }

    #[tokio::test]
    async fn test_validation_drops_only_not_found() {
        let web = FakeWeb::default()
            .page("https://owasp.org/www-project-gizmo", PAGE)
            .head("https://github.com/acme/widget", Ok(200))
            .head("https://github.com/acme/other", Ok(404));

        let page_url = "https://owasp.org/www-project-gizmo";
        let links = extract_repo_links(&web, page_url, "www-project-gizmo", GIZMO_REPO)
            .await
            .unwrap();
        assert_eq!(links, vec!["https://github.com/acme/widget".to_string()]);
    }

    #[tokio::test]
    async fn test_validation_error_keeps_link() {
        let web = FakeWeb::default()
            .page("https://owasp.org/p", r#"<a href="https://github.com/acme/widget">x</a>"#)
            .head(
                "https://github.com/acme/widget",
                Err(AppError::validation("connection reset")),
            );

        let links = extract_repo_links(&web, "https://owasp.org/p", "gizmo", GIZMO_REPO)
            .await
            .unwrap();
        assert_eq!(links, vec!["https://github.com/acme/widget".to_string()]);
    }
}
