//! Error types for the YouTube client

use dmsource::{Provider, SourceError};

/// Result type alias for YouTube operations
pub type Result<T> = std::result::Result<T, YouTubeError>;

/// Errors that can occur when using the YouTube client
#[derive(Debug, thiserror::Error)]
pub enum YouTubeError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Page answered with an error status
    #[error("YouTube returned status {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Video or playlist does not exist (or is private)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The page did not contain the expected data
    #[error("Scraping failed: {0}")]
    ScrapingError(String),

    /// Configuration error (from dmconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl YouTubeError {
    pub fn from_status_code(status: u16, message: impl Into<String>) -> Self {
        match status {
            404 => Self::NotFound(message.into()),
            _ => Self::ApiError {
                status,
                message: message.into(),
            },
        }
    }

    pub fn scraping_error(msg: impl Into<String>) -> Self {
        Self::ScrapingError(msg.into())
    }
}

impl From<YouTubeError> for SourceError {
    fn from(err: YouTubeError) -> Self {
        match err {
            YouTubeError::NotFound(what) => SourceError::NotFound(what),
            other => SourceError::upstream(Provider::YouTube, other.to_string()),
        }
    }
}
