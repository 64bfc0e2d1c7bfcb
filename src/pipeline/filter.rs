// src/pipeline/filter.rs

//! Repository selection predicates.

use serde::{Deserialize, Serialize};

use crate::models::Repository;

/// A composable predicate over repositories.
///
/// In TOML: `"all"`, `"not_archived"`, `{ name_prefix = "www-project" }`,
/// or `{ all_of = [ ... ] }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RepoFilter {
    /// Accept every repository
    #[default]
    All,
    /// Name starts with the given prefix
    NamePrefix(String),
    /// Repository is not archived
    NotArchived,
    /// Every inner filter accepts
    AllOf(Vec<RepoFilter>),
}

impl RepoFilter {
    pub fn matches(&self, repo: &Repository) -> bool {
        match self {
            Self::All => true,
            Self::NamePrefix(prefix) => repo.name.starts_with(prefix.as_str()),
            Self::NotArchived => !repo.archived,
            Self::AllOf(filters) => filters.iter().all(|f| f.matches(repo)),
        }
    }

    /// Keep the matching repositories, preserving order.
    pub fn apply(&self, repos: Vec<Repository>) -> Vec<Repository> {
        repos.into_iter().filter(|r| self.matches(r)).collect()
    }

    /// Combine with another filter.
    pub fn and(self, other: RepoFilter) -> Self {
        match self {
            Self::All => other,
            Self::AllOf(mut filters) => {
                filters.push(other);
                Self::AllOf(filters)
            }
            first => Self::AllOf(vec![first, other]),
        }
    }
}
