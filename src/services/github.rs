// src/services/github.rs

//! GitHub REST API client.

use async_trait::async_trait;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::{GithubConfig, Repository};
use crate::utils::http::{check_response, create_async_client};

/// Per-repository list endpoints that are only counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoList {
    Contributors,
    Pulls,
    Issues,
}

impl RepoList {
    fn segment(self) -> &'static str {
        match self {
            Self::Contributors => "contributors",
            Self::Pulls => "pulls",
            Self::Issues => "issues",
        }
    }
}

/// Query parameters for the commit listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitQuery {
    /// Only commits touching this path
    pub path: Option<String>,
    pub per_page: Option<u32>,
}

/// Repository metadata (`GET /repos/{owner}/{repo}`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RepoMetadata {
    #[serde(default)]
    pub stargazers_count: Option<u64>,
    #[serde(default)]
    pub forks_count: Option<u64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub license: Option<License>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct License {
    #[serde(default)]
    pub name: Option<String>,
}

/// One entry of the commit listing.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CommitEntry {
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CommitDetail {
    #[serde(default)]
    pub committer: Option<Signature>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Signature {
    #[serde(default)]
    pub date: Option<String>,
}

impl CommitEntry {
    /// Commit with the given committer date.
    #[cfg(test)]
    pub fn dated(date: &str) -> Self {
        Self {
            commit: CommitDetail {
                committer: Some(Signature {
                    date: Some(date.to_string()),
                }),
            },
        }
    }

    /// Raw committer date string.
    pub fn committer_date(&self) -> Option<&str> {
        self.commit.committer.as_ref()?.date.as_deref()
    }

    /// Committer date parsed as UTC.
    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.committer_date()?;
        match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(e) => {
                log::debug!("Unparseable commit date '{}': {}", raw, e);
                None
            }
        }
    }
}

/// One entry of the release listing.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Release {
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// File payload from the contents endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FileContent {
    pub content: String,
    #[serde(default)]
    pub encoding: Option<String>,
}

impl FileContent {
    /// Wrap plain text the way the contents endpoint would.
    #[cfg(test)]
    pub fn from_text(text: &str) -> Self {
        Self {
            content: base64::engine::general_purpose::STANDARD.encode(text),
            encoding: Some("base64".to_string()),
        }
    }

    /// Decode the payload into UTF-8 text.
    ///
    /// GitHub wraps base64 content at 60 columns, so whitespace is dropped
    /// before decoding.
    pub fn decode(&self) -> Result<String> {
        if let Some(encoding) = self.encoding.as_deref() {
            if encoding != "base64" {
                return Err(AppError::validation(format!(
                    "unsupported content encoding '{encoding}'"
                )));
            }
        }
        let compact: String = self
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::validation(format!("file content is not UTF-8: {e}")))
    }
}

/// The hosting API operations the pipelines depend on.
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// One page of an organization's repositories.
    async fn list_org_repos(&self, org: &str, page: u32, per_page: u32)
    -> Result<Vec<Repository>>;

    async fn repo_metadata(&self, full_name: &str) -> Result<RepoMetadata>;

    /// Commits, newest first.
    async fn commits(&self, full_name: &str, query: &CommitQuery) -> Result<Vec<CommitEntry>>;

    /// Releases, newest first.
    async fn releases(&self, full_name: &str) -> Result<Vec<Release>>;

    /// Number of entries on the first page of a list endpoint.
    async fn count_list(
        &self,
        full_name: &str,
        list: RepoList,
        per_page: Option<u32>,
    ) -> Result<usize>;

    async fn file_content(&self, full_name: &str, path: &str) -> Result<FileContent>;
}

/// [`HostingApi`] backed by the GitHub REST API.
pub struct GitHubClient {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client from configuration and an optional token.
    pub fn new(config: &GithubConfig, token: Option<String>) -> Result<Self> {
        let client = create_async_client(&config.user_agent, config.timeout_secs)?;
        Ok(Self::with_client(client, &config.api_url, token))
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: Client, api_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self
            .client
            .get(self.url(path))
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .query(query);
        if let Some(token) = &self.token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("token {token}"));
        }

        let resp = check_response(request.send().await?).await?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl HostingApi for GitHubClient {
    async fn list_org_repos(
        &self,
        org: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>> {
        log::debug!("Listing {} repositories, page {}", org, page);
        self.get_json(
            &format!("orgs/{org}/repos"),
            &[("per_page", per_page.to_string()), ("page", page.to_string())],
        )
        .await
    }

    async fn repo_metadata(&self, full_name: &str) -> Result<RepoMetadata> {
        self.get_json(&format!("repos/{full_name}"), &[]).await
    }

    async fn commits(&self, full_name: &str, query: &CommitQuery) -> Result<Vec<CommitEntry>> {
        let mut params = Vec::new();
        if let Some(path) = &query.path {
            params.push(("path", path.clone()));
        }
        if let Some(per_page) = query.per_page {
            params.push(("per_page", per_page.to_string()));
        }
        self.get_json(&format!("repos/{full_name}/commits"), &params)
            .await
    }

    async fn releases(&self, full_name: &str) -> Result<Vec<Release>> {
        self.get_json(&format!("repos/{full_name}/releases"), &[])
            .await
    }

    async fn count_list(
        &self,
        full_name: &str,
        list: RepoList,
        per_page: Option<u32>,
    ) -> Result<usize> {
        let params: Vec<(&str, String)> = per_page
            .map(|n| vec![("per_page", n.to_string())])
            .unwrap_or_default();
        let entries: Vec<serde_json::Value> = self
            .get_json(&format!("repos/{full_name}/{}", list.segment()), &params)
            .await?;
        Ok(entries.len())
    }

    async fn file_content(&self, full_name: &str, path: &str) -> Result<FileContent> {
        self.get_json(&format!("repos/{full_name}/contents/{path}"), &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wrapped_content() {
        // GitHub breaks the payload into lines
        let file = FileContent {
            content: "VGhpcyBpcyBhbiBleGFtcGxl\nIG9mIGEgUHJvamVjdA==\n".to_string(),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(file.decode().unwrap(), "This is an example of a Project");
    }

    #[test]
    fn test_decode_round_trips_from_text() {
        let file = FileContent::from_text("# Title\n\nBody");
        assert_eq!(file.decode().unwrap(), "# Title\n\nBody");
    }

    #[test]
    fn test_decode_rejects_unknown_encoding() {
        let file = FileContent {
            content: "abc".to_string(),
            encoding: Some("none".to_string()),
        };
        assert!(matches!(file.decode(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let file = FileContent {
            content: "***".to_string(),
            encoding: None,
        };
        assert!(matches!(file.decode(), Err(AppError::Base64(_))));
    }

    #[test]
    fn test_commit_entry_dates() {
        let json = r#"[{"sha":"abc",
            "commit":{"committer":{"name":"x","date":"2026-01-02T03:04:05Z"}}}]"#;
        let commits: Vec<CommitEntry> = serde_json::from_str(json).unwrap();
        let head = commits.into_iter().next().unwrap();
        assert_eq!(head.committer_date(), Some("2026-01-02T03:04:05Z"));
        assert_eq!(
            head.committed_at().unwrap().to_rfc3339(),
            "2026-01-02T03:04:05+00:00"
        );
        assert!(CommitEntry::dated("yesterday").committed_at().is_none());
    }

    #[test]
    fn test_repo_metadata_tolerates_null_license() {
        let json = r#"{"stargazers_count":5,"forks_count":1,"language":null,"license":null}"#;
        let meta: RepoMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.stargazers_count, Some(5));
        assert!(meta.license.is_none());
    }

    #[test]
    fn test_url_building() {
        let client = GitHubClient::with_client(Client::new(), "https://api.github.com/", None);
        assert_eq!(
            client.url("/repos/acme/widget"),
            "https://api.github.com/repos/acme/widget"
        );
    }
}
