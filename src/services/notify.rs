// src/services/notify.rs

//! Chat notifications.
//!
//! Messages are Slack webhook payloads: either a plain `text` body or a
//! `blocks` array of mrkdwn sections.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::Result;
use crate::models::{AlertStyle, Repository, StaleFinding};
use crate::utils::http::check_response;

/// A webhook payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Message {
    Text { text: String },
    Blocks { blocks: Vec<Block> },
}

/// A Slack layout block.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: BlockText,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BlockText {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// A single mrkdwn section block.
    pub fn section(markdown: impl Into<String>) -> Self {
        Self::Blocks {
            blocks: vec![Block {
                kind: "section".to_string(),
                text: BlockText {
                    kind: "mrkdwn".to_string(),
                    text: markdown.into(),
                },
            }],
        }
    }

    /// Alert listing newly detected repositories.
    pub fn new_repositories(header: &str, repos: &[&Repository], style: AlertStyle) -> Self {
        match style {
            AlertStyle::Text => {
                let mut body = format!("{header}\n");
                for repo in repos {
                    body.push_str(&format!(
                        "- <{}|{}> - {}\n",
                        repo.html_url,
                        repo.full_name,
                        repo.description_or_default()
                    ));
                }
                Self::text(body)
            }
            AlertStyle::Blocks => {
                let lines: Vec<String> = repos
                    .iter()
                    .map(|repo| {
                        format!(
                            "• <{}|{}> - {}",
                            repo.html_url,
                            repo.name,
                            repo.description_or_default()
                        )
                    })
                    .collect();
                Self::section(format!("*{header}*\n{}", lines.join("\n")))
            }
        }
    }

    /// Alert for one stale tracked file.
    pub fn stale(finding: &StaleFinding, max_age_days: i64) -> Self {
        Self::section(format!(
            "Repo *<{}|{}>* has not been updated in over {} days. Check {}.",
            finding.html_url, finding.full_name, max_age_days, finding.path
        ))
    }

    /// Concatenated human-readable text of the payload.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Blocks { blocks } => blocks
                .iter()
                .map(|b| b.text.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Delivery of messages to a team channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &Message) -> Result<()>;
}

/// Posts messages to an incoming webhook.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &Message) -> Result<()> {
        let resp = self.client.post(&self.url).json(message).send().await?;
        check_response(resp).await?;
        log::info!("Notification delivered");
        Ok(())
    }
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &Message) -> Result<()> {
        log::info!("[dry-run] would notify:\n{}", message.plain_text());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn repos() -> Vec<Repository> {
        let mut a = Repository::new(1, "OWASP", "www-project-a");
        a.description = Some("Project A".to_string());
        let b = Repository::new(2, "OWASP", "tool-b");
        vec![a, b]
    }

    #[test]
    fn test_text_payload_shape() {
        let repos = repos();
        let refs: Vec<&Repository> = repos.iter().collect();
        let message =
            Message::new_repositories("New repositories detected:", &refs, AlertStyle::Text);

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "text": "New repositories detected:\n\
                         - <https://github.com/OWASP/www-project-a|OWASP/www-project-a> - Project A\n\
                         - <https://github.com/OWASP/tool-b|OWASP/tool-b> - No description\n"
            })
        );
    }

    #[test]
    fn test_blocks_payload_shape() {
        let repos = repos();
        let refs: Vec<&Repository> = repos.iter().take(1).collect();
        let message = Message::new_repositories("New pages:", &refs, AlertStyle::Blocks);

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "blocks": [{
                    "type": "section",
                    "text": {
                        "type": "mrkdwn",
                        "text": "*New pages:*\n• <https://github.com/OWASP/www-project-a|www-project-a> - Project A"
                    }
                }]
            })
        );
    }

    #[test]
    fn test_stale_message() {
        let finding = StaleFinding {
            full_name: "OWASP/www-project-a".to_string(),
            html_url: "https://github.com/OWASP/www-project-a".to_string(),
            path: "index.md".to_string(),
            last_modified: Utc::now(),
            age_days: 40,
        };
        assert_eq!(
            Message::stale(&finding, 30).plain_text(),
            "Repo *<https://github.com/OWASP/www-project-a|OWASP/www-project-a>* has not been updated in over 30 days. Check index.md."
        );
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        assert!(LogNotifier.send(&Message::text("hello")).await.is_ok());
    }
}
