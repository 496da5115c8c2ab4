//! Gestion des erreurs pour le client Apple Music

use dmsource::{AuthSignal, Provider, SourceError};
use thiserror::Error;

/// Type Result personnalisé pour dmapplemusic
pub type Result<T> = std::result::Result<T, AppleMusicError>;

/// Erreurs possibles lors de l'utilisation du client Apple Music
#[derive(Error, Debug)]
pub enum AppleMusicError {
    /// Erreur HTTP
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur de parsing JSON
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Token web refusé ou expiré
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Ressource non trouvée (song, playlist, album)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Erreur de l'API catalogue
    #[error("Apple Music API error (code {code}): {message}")]
    ApiError { code: u16, message: String },

    /// Le token n'a pas pu être extrait du client web
    #[error("Web token extraction failed: {0}")]
    Token(String),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Erreur remontée par le cache de credentials
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl AppleMusicError {
    /// Crée une erreur API depuis un code de statut HTTP
    pub fn from_status_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            401 | 403 => Self::Unauthorized(message.into()),
            404 => Self::NotFound(message.into()),
            _ => Self::ApiError {
                code,
                message: message.into(),
            },
        }
    }

    pub fn token(message: impl Into<String>) -> Self {
        Self::Token(message.into())
    }

    /// Vérifie si l'erreur impose de renouveler le token
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::Unauthorized(_) => true,
            Self::Source(err) => err.is_auth_error(),
            _ => false,
        }
    }
}

impl AuthSignal for AppleMusicError {
    fn is_auth_error(&self) -> bool {
        AppleMusicError::is_auth_error(self)
    }
}

impl From<AppleMusicError> for SourceError {
    fn from(err: AppleMusicError) -> Self {
        match err {
            AppleMusicError::Source(inner) => inner,
            AppleMusicError::NotFound(what) => SourceError::NotFound(what),
            AppleMusicError::Unauthorized(message) | AppleMusicError::Token(message) => {
                SourceError::auth(Provider::AppleMusic, message)
            }
            other => SourceError::upstream(Provider::AppleMusic, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(AppleMusicError::from_status_code(401, "expired").is_auth_error());
        assert!(matches!(
            AppleMusicError::from_status_code(404, "gone"),
            AppleMusicError::NotFound(_)
        ));
        assert!(!AppleMusicError::from_status_code(500, "boom").is_auth_error());
    }

    #[test]
    fn test_conversion_to_source_error() {
        let err: SourceError = AppleMusicError::token("no bundle").into();
        assert!(err.is_auth_error());

        let err: SourceError = AppleMusicError::from_status_code(502, "bad gateway").into();
        assert!(matches!(
            err,
            SourceError::Upstream {
                provider: Provider::AppleMusic,
                ..
            }
        ));
    }
}
