// src/models/document.rs

//! Tracked-file records for the staleness sweep.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::models::StalenessRule;

/// A repository's tracked file, as far as it could be looked up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocRecord {
    pub full_name: String,
    pub html_url: String,

    /// Decoded file text
    pub content: Option<String>,

    /// Committer date of the most recent commit touching the file
    pub last_modified: Option<DateTime<Utc>>,
}

impl DocRecord {
    /// Record with nothing known about the file.
    pub fn empty(full_name: impl Into<String>, html_url: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            html_url: html_url.into(),
            content: None,
            last_modified: None,
        }
    }

    /// Whether the file still carries the template marker.
    pub fn has_marker(&self, marker: &str) -> bool {
        self.content.as_deref().is_some_and(|c| c.contains(marker))
    }

    /// Evaluate the rule against this record at `now`.
    pub fn staleness(&self, rule: &StalenessRule, now: DateTime<Utc>) -> Option<StaleFinding> {
        if !self.has_marker(&rule.marker) {
            return None;
        }
        let last_modified = self.last_modified?;
        // An allowance too large to represent never expires
        let max_age = TimeDelta::try_days(rule.max_age_days)?;
        let age = now.signed_duration_since(last_modified);
        if age <= max_age {
            return None;
        }

        Some(StaleFinding {
            full_name: self.full_name.clone(),
            html_url: self.html_url.clone(),
            path: rule.path.clone(),
            last_modified,
            age_days: age.num_days(),
        })
    }
}

/// A repository whose tracked file is older than the rule allows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaleFinding {
    pub full_name: String,
    pub html_url: String,
    pub path: String,
    pub last_modified: DateTime<Utc>,
    pub age_days: i64,
}
