//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::pipeline::RepoFilter;

/// Root application configuration.
///
/// Holds no secrets; tokens and webhook URLs come from the environment
/// through [`crate::config::Credentials`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// GitHub API access settings
    #[serde(default)]
    pub github: GithubConfig,

    /// Where snapshots and reports are written
    #[serde(default)]
    pub storage: StorageConfig,

    /// Named new-repository alert presets
    #[serde(default = "defaults::presets")]
    pub presets: Vec<WatchPreset>,

    /// Stale project page sweep
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Registry status report
    #[serde(default)]
    pub status: StatusConfig,

    /// Project page link scan
    #[serde(default)]
    pub links: LinksConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.github.org.trim().is_empty() {
            return Err(AppError::validation("github.org is empty"));
        }
        if self.github.user_agent.trim().is_empty() {
            return Err(AppError::validation("github.user_agent is empty"));
        }
        if self.github.per_page == 0 || self.github.per_page > 100 {
            return Err(AppError::validation("github.per_page must be in 1..=100"));
        }
        if self.github.max_pages == 0 {
            return Err(AppError::validation("github.max_pages must be > 0"));
        }
        if self.github.timeout_secs == 0 {
            return Err(AppError::validation("github.timeout_secs must be > 0"));
        }
        if self.github.token_env.is_empty() {
            return Err(AppError::validation("github.token_env lists no variables"));
        }
        url::Url::parse(&self.github.api_url)?;
        url::Url::parse(&self.status.registry_url)?;

        if self.presets.is_empty() {
            return Err(AppError::validation("No presets defined"));
        }
        for (i, preset) in self.presets.iter().enumerate() {
            if preset.name.trim().is_empty() {
                return Err(AppError::validation(format!("presets[{i}].name is empty")));
            }
            if self.presets[..i].iter().any(|p| p.name == preset.name) {
                return Err(AppError::validation(format!(
                    "Duplicate preset name '{}'",
                    preset.name
                )));
            }
            if preset.snapshot.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "presets[{i}].snapshot is empty"
                )));
            }
        }

        if self.sweep.rule.path.trim().is_empty() {
            return Err(AppError::validation("sweep.rule.path is empty"));
        }
        if self.sweep.rule.max_age_days < 0 {
            return Err(AppError::validation("sweep.rule.max_age_days must be >= 0"));
        }
        if self.links.head_timeout_secs == 0 {
            return Err(AppError::validation("links.head_timeout_secs must be > 0"));
        }
        Ok(())
    }

    /// Look up a preset by name.
    pub fn preset(&self, name: &str) -> Result<&WatchPreset> {
        self.presets.iter().find(|p| p.name == name).ok_or_else(|| {
            let known: Vec<&str> = self.presets.iter().map(|p| p.name.as_str()).collect();
            AppError::config(format!(
                "Unknown preset '{name}' (known: {})",
                known.join(", ")
            ))
        })
    }

    /// Resolve a snapshot/report file name against the storage directory.
    pub fn storage_path(&self, file: &str) -> PathBuf {
        Path::new(&self.storage.dir).join(file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github: GithubConfig::default(),
            storage: StorageConfig::default(),
            presets: defaults::presets(),
            sweep: SweepConfig::default(),
            status: StatusConfig::default(),
            links: LinksConfig::default(),
        }
    }
}

/// GitHub API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// REST API base URL
    #[serde(default = "defaults::api_url")]
    pub api_url: String,

    /// Organization whose repositories are watched
    #[serde(default = "defaults::org")]
    pub org: String,

    /// Page size for paginated listings (GitHub caps this at 100)
    #[serde(default = "defaults::per_page")]
    pub per_page: u32,

    /// Hard ceiling on pages fetched per listing
    #[serde(default = "defaults::max_pages")]
    pub max_pages: u32,

    /// User-Agent header (GitHub rejects requests without one)
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Environment variables checked, in order, for the API token
    #[serde(default = "defaults::token_env")]
    pub token_env: Vec<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::api_url(),
            org: defaults::org(),
            per_page: defaults::per_page(),
            max_pages: defaults::max_pages(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            token_env: defaults::token_env(),
        }
    }
}

/// Snapshot storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "defaults::storage_dir")]
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: defaults::storage_dir(),
        }
    }
}

/// How a new-repository alert is laid out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertStyle {
    /// Plain `text` payload, one line per repository with full name
    #[default]
    Text,
    /// Slack `blocks` payload, one line per repository with short name
    Blocks,
}

/// A named "fetch repos, diff, alert" configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchPreset {
    pub name: String,

    #[serde(default)]
    pub filter: RepoFilter,

    #[serde(default)]
    pub style: AlertStyle,

    /// First line of the alert
    #[serde(default = "defaults::header")]
    pub header: String,

    /// Snapshot file, relative to `storage.dir`
    pub snapshot: String,

    /// Environment variable holding the webhook URL
    #[serde(default = "defaults::repo_webhook_env")]
    pub webhook_env: String,
}

/// What to do with an entity whose enrichment failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Leave the entity out of the output
    #[default]
    Skip,
    /// Emit the entity with every enrichment field absent
    Degrade,
}

/// Staleness condition for a tracked file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StalenessRule {
    /// File path inside each repository
    #[serde(default = "defaults::tracked_path")]
    pub path: String,

    /// Text that marks an unedited template page
    #[serde(default = "defaults::marker")]
    pub marker: String,

    #[serde(default = "defaults::max_age_days")]
    pub max_age_days: i64,
}

impl Default for StalenessRule {
    fn default() -> Self {
        Self {
            path: defaults::tracked_path(),
            marker: defaults::marker(),
            max_age_days: defaults::max_age_days(),
        }
    }
}

/// Stale project page sweep settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "defaults::www_filter")]
    pub filter: RepoFilter,

    #[serde(default)]
    pub rule: StalenessRule,

    #[serde(default = "defaults::sweep_webhook_env")]
    pub webhook_env: String,

    #[serde(default)]
    pub on_failure: FailurePolicy,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            filter: defaults::www_filter(),
            rule: StalenessRule::default(),
            webhook_env: defaults::sweep_webhook_env(),
            on_failure: FailurePolicy::Skip,
        }
    }
}

/// Registry status report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    #[serde(default = "defaults::registry_url")]
    pub registry_url: String,

    #[serde(default = "defaults::status_output")]
    pub output: String,

    /// `per_page` sent with list lookups (contributors, pulls, issues)
    #[serde(default)]
    pub list_per_page: Option<u32>,

    #[serde(default)]
    pub on_failure: FailurePolicy,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            registry_url: defaults::registry_url(),
            output: defaults::status_output(),
            list_per_page: None,
            on_failure: FailurePolicy::Skip,
        }
    }
}

/// Project page link scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Repository snapshot to read projects from
    #[serde(default = "defaults::all_repos_snapshot")]
    pub input: String,

    #[serde(default = "defaults::links_output")]
    pub output: String,

    /// Substring of `html_url` replaced to get the project web page
    #[serde(default = "defaults::rewrite_from")]
    pub rewrite_from: String,

    #[serde(default = "defaults::rewrite_to")]
    pub rewrite_to: String,

    /// Timeout for HEAD validation of candidate links
    #[serde(default = "defaults::head_timeout")]
    pub head_timeout_secs: u64,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            input: defaults::all_repos_snapshot(),
            output: defaults::links_output(),
            rewrite_from: defaults::rewrite_from(),
            rewrite_to: defaults::rewrite_to(),
            head_timeout_secs: defaults::head_timeout(),
        }
    }
}

mod defaults {
    use super::{AlertStyle, WatchPreset};
    use crate::pipeline::RepoFilter;

    // GitHub defaults
    pub fn api_url() -> String {
        "https://api.github.com".into()
    }
    pub fn org() -> String {
        "owasp".into()
    }
    pub fn per_page() -> u32 {
        100
    }
    pub fn max_pages() -> u32 {
        100
    }
    pub fn user_agent() -> String {
        "orgwatch/0.1".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn token_env() -> Vec<String> {
        vec!["GITHUB_TOKEN".into(), "ACCESS_TOKEN".into()]
    }

    pub fn storage_dir() -> String {
        ".".into()
    }

    // Preset defaults
    pub fn header() -> String {
        "New repositories detected:".into()
    }
    pub fn repo_webhook_env() -> String {
        "SLACK_WEBHOOK_URL".into()
    }
    pub fn all_repos_snapshot() -> String {
        "www_project_repos.json".into()
    }
    pub fn www_filter() -> RepoFilter {
        RepoFilter::AllOf(vec![
            RepoFilter::NamePrefix("www-project".into()),
            RepoFilter::NotArchived,
        ])
    }
    pub fn presets() -> Vec<WatchPreset> {
        vec![
            WatchPreset {
                name: "all-repos".into(),
                filter: RepoFilter::All,
                style: AlertStyle::Text,
                header: header(),
                snapshot: all_repos_snapshot(),
                webhook_env: repo_webhook_env(),
            },
            WatchPreset {
                name: "www-projects".into(),
                filter: www_filter(),
                style: AlertStyle::Blocks,
                header: "New project pages created:".into(),
                snapshot: "www_projects.json".into(),
                webhook_env: repo_webhook_env(),
            },
        ]
    }

    // Sweep defaults
    pub fn tracked_path() -> String {
        "index.md".into()
    }
    pub fn marker() -> String {
        "This is an example of a Project or Chapter Page".into()
    }
    pub fn max_age_days() -> i64 {
        30
    }
    pub fn sweep_webhook_env() -> String {
        "SLACK_WEBHOOK_URL_SWEEP".into()
    }

    // Status defaults
    pub fn registry_url() -> String {
        "https://raw.githubusercontent.com/OWASP/owasp.github.io/main/_data/projects.json".into()
    }
    pub fn status_output() -> String {
        "repo_status.json".into()
    }

    // Links defaults
    pub fn links_output() -> String {
        "project_repos_links.json".into()
    }
    pub fn rewrite_from() -> String {
        "github.com/OWASP/".into()
    }
    pub fn rewrite_to() -> String {
        "owasp.org/".into()
    }
    pub fn head_timeout() -> u64 {
        10
    }
}
