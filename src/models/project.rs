// src/models/project.rs

//! Project registry entries and the enriched status records built from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::Keyed;

/// A project descriptor from the published project registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectDescriptor {
    pub name: String,
    pub url: Option<String>,

    /// One or more tab-separated code URLs
    pub codeurl: Option<String>,

    pub created: Option<String>,
    pub updated: Option<String>,
    pub build: Option<Value>,
    pub title: Option<String>,
    pub level: Option<Value>,

    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub region: Option<String>,
    pub pitch: Option<String>,

    #[serde(rename = "meetup-group")]
    pub meetup_group: Option<String>,
}

impl ProjectDescriptor {
    /// First code URL, trimmed. Empty when the project lists none.
    pub fn code_url(&self) -> &str {
        self.codeurl
            .as_deref()
            .and_then(|s| s.split('\t').next())
            .map(str::trim)
            .unwrap_or("")
    }

    /// Whether the project's code lives on GitHub.
    pub fn is_github_hosted(&self) -> bool {
        self.code_url().contains("github.com")
    }

    /// `owner/repo` derived from the last two segments of the code URL.
    pub fn repo_name(&self) -> Result<String> {
        let code_url = self.code_url();
        let parsed = url::Url::parse(code_url)?;
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [.., owner, repo] => {
                let repo = repo.strip_suffix(".git").unwrap_or(repo);
                Ok(format!("{owner}/{repo}"))
            }
            _ => Err(AppError::enrich(
                code_url,
                "code URL does not name an owner/repo pair",
            )),
        }
    }
}

/// A registry project merged with the repository status lookups.
///
/// Every lookup field is optional on its own: `None` means "no data",
/// never zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusRecord {
    pub name: String,
    pub repo_name: String,
    pub url: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub build: Option<Value>,
    pub codeurl: String,
    pub title: Option<String>,
    pub level: Option<Value>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub region: Option<String>,
    pub pitch: Option<String>,
    #[serde(rename = "meetup-group")]
    pub meetup_group: Option<String>,

    /// "success" or the API's error message for the repository lookup
    pub github_status: String,
    pub last_commit: Option<String>,
    pub date_released: Option<String>,
    pub release_version: Option<String>,
    pub committers: Option<usize>,
    pub stars: Option<u64>,
    pub top_language: Option<String>,
    pub license: Option<String>,
    pub forks: Option<u64>,
    pub prs: Option<usize>,
    pub issues: Option<usize>,
}

impl StatusRecord {
    /// Record with registry fields copied and every lookup field absent.
    pub fn from_project(project: &ProjectDescriptor, repo_name: impl Into<String>) -> Self {
        Self {
            name: project.name.clone(),
            repo_name: repo_name.into(),
            url: project.url.clone(),
            created: project.created.clone(),
            updated: project.updated.clone(),
            build: project.build.clone(),
            codeurl: project.code_url().to_string(),
            title: project.title.clone(),
            level: project.level.clone(),
            kind: project.kind.clone(),
            region: project.region.clone(),
            pitch: project.pitch.clone(),
            meetup_group: project.meetup_group.clone(),
            github_status: "unknown".to_string(),
            last_commit: None,
            date_released: None,
            release_version: None,
            committers: None,
            stars: None,
            top_language: None,
            license: None,
            forks: None,
            prs: None,
            issues: None,
        }
    }
}

impl Keyed for StatusRecord {
    type Key = String;

    fn key(&self) -> String {
        self.repo_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(codeurl: &str) -> ProjectDescriptor {
        ProjectDescriptor {
            name: "OWASP Widget".to_string(),
            codeurl: Some(codeurl.to_string()),
            ..ProjectDescriptor::default()
        }
    }

    #[test]
    fn test_code_url_takes_first_tab_separated() {
        let p = project("https://github.com/acme/widget\thttps://gitlab.com/acme/other");
        assert_eq!(p.code_url(), "https://github.com/acme/widget");
        assert!(p.is_github_hosted());
    }

    #[test]
    fn test_repo_name_from_code_url() {
        assert_eq!(
            project("https://github.com/acme/widget").repo_name().unwrap(),
            "acme/widget"
        );
        assert_eq!(
            project("https://github.com/acme/widget/").repo_name().unwrap(),
            "acme/widget"
        );
        assert_eq!(
            project("https://github.com/acme/widget.git").repo_name().unwrap(),
            "acme/widget"
        );
    }

    #[test]
    fn test_repo_name_rejects_org_only_url() {
        assert!(project("https://github.com/acme").repo_name().is_err());
        assert!(project("not a url").repo_name().is_err());
    }

    #[test]
    fn test_missing_codeurl_is_not_github() {
        let p = ProjectDescriptor {
            name: "Docs".to_string(),
            ..ProjectDescriptor::default()
        };
        assert_eq!(p.code_url(), "");
        assert!(!p.is_github_hosted());
    }

    #[test]
    fn test_registry_entry_parses_with_numeric_level() {
        let json = r#"{
            "name": "OWASP Widget",
            "url": "https://owasp.org/www-project-widget/",
            "codeurl": "https://github.com/acme/widget",
            "level": 3.5,
            "type": "tool",
            "meetup-group": "owasp-widget"
        }"#;
        let p: ProjectDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(p.kind.as_deref(), Some("tool"));
        assert_eq!(p.meetup_group.as_deref(), Some("owasp-widget"));
        assert!(p.created.is_none());
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let record =
            StatusRecord::from_project(&project("https://github.com/acme/widget"), "acme/widget");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["stars"].is_null());
        assert!(json["last_commit"].is_null());
        assert_eq!(json["meetup-group"], Value::Null);
    }
}
