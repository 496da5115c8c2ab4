//! Error taxonomy shared by every catalog resolver

use crate::model::Provider;
use thiserror::Error;

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors surfaced by classification and catalog resolution
///
/// Provider crates keep their own detailed error types and convert into
/// this one at the crate boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The query matched no known pattern and free-text search found nothing
    #[error("No match found for \"{0}\"")]
    ClassificationMiss(String),

    /// The identifier was well-formed but the provider has no such item
    #[error("Not found: {0}")]
    NotFound(String),

    /// The credential could not be obtained or was rejected after a refresh
    #[error("{provider} authentication failed: {message}")]
    UpstreamAuth { provider: Provider, message: String },

    /// Provider unreachable, timed out or answered with something unusable
    #[error("{provider} error: {message}")]
    Upstream { provider: Provider, message: String },

    /// A collection lookup failed outright
    #[error("Failed to fetch {provider} collection: {message}")]
    CollectionFetchPartialFailure { provider: Provider, message: String },

    /// The request itself is malformed (foreign URL, missing field...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The resolver does not implement this operation
    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl SourceError {
    pub fn upstream(provider: Provider, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider,
            message: message.into(),
        }
    }

    pub fn auth(provider: Provider, message: impl Into<String>) -> Self {
        Self::UpstreamAuth {
            provider,
            message: message.into(),
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::UpstreamAuth { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Short human-readable text sent to clients in `error` events
    pub fn user_message(&self) -> String {
        match self {
            Self::ClassificationMiss(_) => "No results found for your query".to_string(),
            Self::NotFound(_) => "Track or playlist not found".to_string(),
            Self::UpstreamAuth { provider, .. } => {
                format!("Could not authenticate with {}", provider)
            }
            Self::Upstream { provider, .. } => {
                format!("{} is not responding, please try again", provider)
            }
            Self::CollectionFetchPartialFailure { provider, .. } => {
                format!("Failed to fetch {} playlist", provider)
            }
            Self::InvalidRequest(message) => message.clone(),
            Self::NotSupported(message) => format!("Not supported: {}", message),
        }
    }
}
