// src/error.rs

//! Unified error handling for orgwatch.

use std::fmt;

use thiserror::Error;

/// Result type alias for orgwatch operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Base64 payload could not be decoded
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Upstream returned a non-success status
    #[error("API error ({status}) for {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Enrichment of a single entity failed
    #[error("Enrichment error for {context}: {message}")]
    Enrich { context: String, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create an API status error.
    pub fn api(status: u16, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an enrichment error with context.
    pub fn enrich(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Enrich {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Short, stable name of the error kind, used in per-entity log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "Io",
            Self::Http(_) => "Http",
            Self::Json(_) => "Json",
            Self::Toml(_) => "Toml",
            Self::Url(_) => "Url",
            Self::Base64(_) => "Base64",
            Self::Selector { .. } => "Selector",
            Self::Api { .. } => "Api",
            Self::Config(_) => "Config",
            Self::Validation(_) => "Validation",
            Self::Enrich { .. } => "Enrich",
        }
    }

    /// HTTP status carried by an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
