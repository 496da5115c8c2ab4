//! Extension pour intégrer la configuration Apple Music dans dmconfig
//!
//! Section `accounts.applemusic`:
//!
//! ```yaml
//! accounts:
//!   applemusic:
//!     storefront: us
//!     artwork_size: 300
//!     playback: native   # ou youtube
//! ```

use crate::client::{PlaybackPolicy, DEFAULT_ARTWORK_SIZE, DEFAULT_STOREFRONT};
use anyhow::Result;
use dmconfig::Config;
use serde_yaml::{Number, Value};
use tracing::warn;

/// Trait d'extension pour la section `accounts.applemusic`
pub trait AppleMusicConfigExt {
    /// Storefront par défaut (code pays en minuscules)
    fn get_applemusic_storefront(&self) -> Result<String>;

    fn set_applemusic_storefront(&self, storefront: &str) -> Result<()>;

    /// Taille des pochettes en pixels
    fn get_applemusic_artwork_size(&self) -> Result<u32>;

    fn set_applemusic_artwork_size(&self, size: u32) -> Result<()>;

    /// Politique de lecture (`native` si absente ou invalide)
    fn get_applemusic_playback(&self) -> Result<PlaybackPolicy>;

    fn set_applemusic_playback(&self, playback: PlaybackPolicy) -> Result<()>;
}

impl AppleMusicConfigExt for Config {
    fn get_applemusic_storefront(&self) -> Result<String> {
        Ok(self
            .get_string(&["accounts", "applemusic", "storefront"])
            .map(|sf| sf.to_lowercase())
            .unwrap_or_else(|| DEFAULT_STOREFRONT.to_string()))
    }

    fn set_applemusic_storefront(&self, storefront: &str) -> Result<()> {
        self.set_value(
            &["accounts", "applemusic", "storefront"],
            Value::String(storefront.to_lowercase()),
        )
    }

    fn get_applemusic_artwork_size(&self) -> Result<u32> {
        match self.get_value(&["accounts", "applemusic", "artwork_size"]) {
            Ok(Value::Number(n)) => Ok(n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_ARTWORK_SIZE)),
            _ => Ok(DEFAULT_ARTWORK_SIZE),
        }
    }

    fn set_applemusic_artwork_size(&self, size: u32) -> Result<()> {
        self.set_value(
            &["accounts", "applemusic", "artwork_size"],
            Value::Number(Number::from(size)),
        )
    }

    fn get_applemusic_playback(&self) -> Result<PlaybackPolicy> {
        match self.get_string(&["accounts", "applemusic", "playback"]) {
            Some(value) => Ok(value.parse().unwrap_or_else(|_| {
                warn!("Invalid accounts.applemusic.playback '{}', using native", value);
                PlaybackPolicy::Native
            })),
            None => Ok(PlaybackPolicy::Native),
        }
    }

    fn set_applemusic_playback(&self, playback: PlaybackPolicy) -> Result<()> {
        self.set_value(
            &["accounts", "applemusic", "playback"],
            Value::String(playback.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml_str("").unwrap();
        assert_eq!(config.get_applemusic_storefront().unwrap(), "us");
        assert_eq!(config.get_applemusic_artwork_size().unwrap(), 300);
        assert_eq!(config.get_applemusic_playback().unwrap(), PlaybackPolicy::Native);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_yaml_str(
            "accounts:\n  applemusic:\n    storefront: FR\n    artwork_size: 600\n    playback: youtube\n",
        )
        .unwrap();
        assert_eq!(config.get_applemusic_storefront().unwrap(), "fr");
        assert_eq!(config.get_applemusic_artwork_size().unwrap(), 600);
        assert_eq!(config.get_applemusic_playback().unwrap(), PlaybackPolicy::YouTube);

        config.set_applemusic_playback(PlaybackPolicy::Native).unwrap();
        assert_eq!(config.get_applemusic_playback().unwrap(), PlaybackPolicy::Native);
    }

    #[test]
    fn test_invalid_playback_falls_back() {
        let config =
            Config::from_yaml_str("accounts:\n  applemusic:\n    playback: vinyl\n").unwrap();
        assert_eq!(config.get_applemusic_playback().unwrap(), PlaybackPolicy::Native);
    }
}
