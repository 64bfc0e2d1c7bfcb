// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::{AppError, Result};

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(user_agent: &str, timeout_secs: u64) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// Pass a success response through; turn anything else into [`AppError::Api`].
///
/// GitHub error bodies are `{"message": "..."}`; that message is preferred
/// over the raw body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let url = resp.url().to_string();
    let body = resp.text().await.unwrap_or_default();
    Err(AppError::api(status.as_u16(), url, error_message(&body, status)))
}

fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

/// Whether an error means the remote could not be reached at all.
pub fn is_transport_failure(error: &AppError) -> bool {
    matches!(error, AppError::Http(e) if e.is_connect() || e.is_timeout())
}
