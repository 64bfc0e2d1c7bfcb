//! Utility functions and helpers.

pub mod http;

use std::sync::LazyLock;

use regex::Regex;

static GITHUB_REPO_ROOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://github\.com/[^/]+/[^/#?]+").expect("static regex is valid")
});

/// Canonical `https://github.com/{owner}/{repo}` prefix of a link, if it has one.
///
/// The link is lowercased first, so the result is always lowercase. Query
/// strings, fragments and a trailing `.git` are dropped.
pub fn github_repo_root(href: &str) -> Option<String> {
    let lower = href.trim().to_lowercase();
    let root = GITHUB_REPO_ROOT.find(&lower)?.as_str();
    let root = root.strip_suffix(".git").unwrap_or(root);
    Some(root.to_string())
}

/// Web page URL for a repository, by substring rewrite of its browser URL.
pub fn rewrite_url(html_url: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return html_url.to_string();
    }
    html_url.replace(from, to)
}
