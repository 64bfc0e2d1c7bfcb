// src/models/links.rs

use serde::{Deserialize, Serialize};

/// Related GitHub repositories found on a project's web page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectLinks {
    pub project_name: String,
    pub repo_links: Vec<String>,
}
