// src/config.rs

//! Secrets loading.
//!
//! Tokens and webhook URLs never live in the TOML file. They are read from
//! the environment once at startup and handed to the jobs that need them.

use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::models::Config;

/// Secrets resolved from the environment.
#[derive(Clone, Default)]
pub struct Credentials {
    github_token: Option<String>,
    /// Webhook URL by environment variable name
    webhooks: HashMap<String, String>,
}

impl Credentials {
    /// Read every secret the configuration refers to from the process environment.
    pub fn from_env(config: &Config) -> Self {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Read secrets through `lookup`. Empty values count as unset.
    pub fn from_lookup(config: &Config, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let github_token = config.github.token_env.iter().find_map(|name| {
            let token = read(name.as_str());
            if token.is_some() {
                log::debug!("Using GitHub token from {}", name);
            }
            token
        });

        let mut webhooks = HashMap::new();
        let names = config
            .presets
            .iter()
            .map(|p| p.webhook_env.as_str())
            .chain(std::iter::once(config.sweep.webhook_env.as_str()));
        for name in names {
            if let Some(url) = read(name) {
                webhooks.insert(name.to_string(), url);
            }
        }

        Self {
            github_token,
            webhooks,
        }
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref()
    }

    /// The GitHub token, or a configuration error naming where it was looked for.
    pub fn require_token(&self, config: &Config) -> Result<String> {
        self.github_token.clone().ok_or_else(|| {
            AppError::config(format!(
                "GitHub token not set (checked {})",
                config.github.token_env.join(", ")
            ))
        })
    }

    /// Webhook URL held in the given environment variable.
    pub fn webhook(&self, var: &str) -> Result<&str> {
        self.webhooks
            .get(var)
            .map(String::as_str)
            .ok_or_else(|| AppError::config(format!("Webhook URL not set: {var}")))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut hooks: Vec<&str> = self.webhooks.keys().map(String::as_str).collect();
        hooks.sort_unstable();
        f.debug_struct("Credentials")
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("webhooks", &hooks)
            .finish()
    }
}
