//! Gestion des erreurs pour le client Spotify

use dmsource::{AuthSignal, Provider, SourceError};
use thiserror::Error;

/// Type Result personnalisé pour dmspotify
pub type Result<T> = std::result::Result<T, SpotifyError>;

/// Erreurs possibles lors de l'utilisation du client Spotify
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Token refusé ou expiré ("The access token expired")
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Ressource non trouvée (track, playlist, album)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Erreur HTTP
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur de parsing JSON
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Client ID / secret absents
    #[error("Spotify configuration error: {0}")]
    Configuration(String),

    /// Erreur de l'API Spotify
    #[error("Spotify API error (code {code}): {message}")]
    ApiError { code: u16, message: String },

    /// Quota dépassé (rate limiting)
    #[error("Rate limit exceeded, please try again later")]
    RateLimitExceeded,

    /// Erreur remontée par le cache de credentials
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl SpotifyError {
    /// Crée une erreur API depuis un code de statut HTTP et un message
    pub fn from_status_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            401 => Self::Unauthorized(message.into()),
            404 => Self::NotFound(message.into()),
            429 => Self::RateLimitExceeded,
            _ => Self::ApiError {
                code,
                message: message.into(),
            },
        }
    }

    /// Vérifie si l'erreur impose un rafraîchissement du token
    pub fn is_auth_error(&self) -> bool {
        match self {
            SpotifyError::Unauthorized(_) => true,
            SpotifyError::ApiError { message, .. } => message.contains("access token expired"),
            _ => false,
        }
    }
}

impl AuthSignal for SpotifyError {
    fn is_auth_error(&self) -> bool {
        SpotifyError::is_auth_error(self)
    }
}

impl From<SpotifyError> for SourceError {
    fn from(err: SpotifyError) -> Self {
        match err {
            SpotifyError::Source(inner) => inner,
            SpotifyError::NotFound(what) => SourceError::NotFound(what),
            SpotifyError::Unauthorized(message) | SpotifyError::Configuration(message) => {
                SourceError::auth(Provider::Spotify, message)
            }
            other => SourceError::upstream(Provider::Spotify, other.to_string()),
        }
    }
}
