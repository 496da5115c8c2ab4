//! Extension pour intégrer la configuration Spotify dans dmconfig
//!
//! Ce module fournit le trait `SpotifyConfigExt` qui ajoute à `dmconfig::Config`
//! la gestion des credentials applicatifs Spotify (section `accounts.spotify`).
//! Le secret peut être stocké chiffré (`encrypted:...`), voir
//! `dmconfig::encryption`.

use crate::api::DEFAULT_MARKET;
use anyhow::{anyhow, Result};
use dmconfig::encryption::get_secret;
use dmconfig::Config;
use serde_yaml::Value;

/// Trait d'extension pour gérer la configuration Spotify dans dmconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use dmconfig::get_config;
/// use dmspotify::SpotifyConfigExt;
///
/// let config = get_config();
/// if config.is_spotify_configured() {
///     let (client_id, _) = config.get_spotify_credentials()?;
///     println!("Spotify app: {}", client_id);
/// }
/// ```
pub trait SpotifyConfigExt {
    /// Client ID de l'application Spotify
    fn get_spotify_client_id(&self) -> Result<String>;

    fn set_spotify_client_id(&self, client_id: &str) -> Result<()>;

    /// Client secret, déchiffré si nécessaire
    fn get_spotify_client_secret(&self) -> Result<String>;

    fn set_spotify_client_secret(&self, secret: &str) -> Result<()>;

    /// Les deux credentials; erreur si l'un manque
    fn get_spotify_credentials(&self) -> Result<(String, String)>;

    /// Marché utilisé pour la disponibilité des titres (défaut "US")
    fn get_spotify_market(&self) -> Result<String>;

    fn set_spotify_market(&self, market: &str) -> Result<()>;

    /// Vrai si client ID et secret sont renseignés
    fn is_spotify_configured(&self) -> bool {
        self.get_spotify_credentials().is_ok()
    }
}

impl SpotifyConfigExt for Config {
    fn get_spotify_client_id(&self) -> Result<String> {
        self.get_string(&["accounts", "spotify", "client_id"])
            .ok_or_else(|| anyhow!("Spotify client_id not configured"))
    }

    fn set_spotify_client_id(&self, client_id: &str) -> Result<()> {
        self.set_value(
            &["accounts", "spotify", "client_id"],
            Value::String(client_id.to_string()),
        )
    }

    fn get_spotify_client_secret(&self) -> Result<String> {
        let stored = self
            .get_string(&["accounts", "spotify", "client_secret"])
            .ok_or_else(|| anyhow!("Spotify client_secret not configured"))?;
        get_secret(&stored)
    }

    fn set_spotify_client_secret(&self, secret: &str) -> Result<()> {
        self.set_value(
            &["accounts", "spotify", "client_secret"],
            Value::String(secret.to_string()),
        )
    }

    fn get_spotify_credentials(&self) -> Result<(String, String)> {
        Ok((self.get_spotify_client_id()?, self.get_spotify_client_secret()?))
    }

    fn get_spotify_market(&self) -> Result<String> {
        Ok(self
            .get_string(&["accounts", "spotify", "market"])
            .map(|m| m.to_uppercase())
            .unwrap_or_else(|| DEFAULT_MARKET.to_string()))
    }

    fn set_spotify_market(&self, market: &str) -> Result<()> {
        self.set_value(
            &["accounts", "spotify", "market"],
            Value::String(market.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_by_default() {
        let config = Config::from_yaml_str("").unwrap();
        assert!(!config.is_spotify_configured());
        assert_eq!(config.get_spotify_market().unwrap(), "US");
    }

    #[test]
    fn test_credentials() {
        let config = Config::from_yaml_str(
            "accounts:\n  spotify:\n    client_id: abc\n    client_secret: s3cr3t\n    market: fr\n",
        )
        .unwrap();
        assert!(config.is_spotify_configured());
        assert_eq!(
            config.get_spotify_credentials().unwrap(),
            ("abc".to_string(), "s3cr3t".to_string())
        );
        assert_eq!(config.get_spotify_market().unwrap(), "FR");
    }
}
