// src/models/repository.rs

//! GitHub repository records as returned by the org listing endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::Keyed;

/// A repository in the watched organization.
///
/// Only the fields the pipeline reads are typed; everything else the API
/// returns is kept in `extra` so a snapshot holds the full upstream object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Repository {
    /// Stable numeric identifier (diff key)
    pub id: u64,

    /// Short repository name (e.g., "www-project-zap")
    pub name: String,

    /// `owner/name`
    pub full_name: String,

    /// Browser URL of the repository
    pub html_url: String,

    #[serde(default)]
    pub archived: bool,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Repository {
    /// Build a repository with only the typed fields populated.
    pub fn new(id: u64, owner: &str, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            full_name: format!("{owner}/{name}"),
            html_url: format!("https://github.com/{owner}/{name}"),
            archived: false,
            description: None,
            extra: Map::new(),
        }
    }

    /// Description for display, with a placeholder when absent or blank.
    pub fn description_or_default(&self) -> &str {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or("No description")
    }
}

impl Keyed for Repository {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}
