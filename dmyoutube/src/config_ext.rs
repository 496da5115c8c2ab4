//! Extension pour intégrer la configuration YouTube dans dmconfig
//!
//! ```no_run
//! use dmconfig::get_config;
//! use dmyoutube::YouTubeConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! println!("Playlist pages hold {} videos", config.get_youtube_playlist_limit()?);
//! # Ok(())
//! # }
//! ```

use crate::client::DEFAULT_PLAYLIST_LIMIT;
use anyhow::Result;
use dmconfig::Config;
use serde_yaml::{Number, Value};

/// Trait d'extension pour la section `accounts.youtube`
pub trait YouTubeConfigExt {
    /// Nombre maximum de vidéos lues dans une playlist (défaut 100)
    fn get_youtube_playlist_limit(&self) -> Result<usize>;

    fn set_youtube_playlist_limit(&self, limit: usize) -> Result<()>;
}

impl YouTubeConfigExt for Config {
    fn get_youtube_playlist_limit(&self) -> Result<usize> {
        match self.get_value(&["accounts", "youtube", "playlist_limit"]) {
            Ok(Value::Number(n)) => Ok(n
                .as_u64()
                .map(|v| v as usize)
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_PLAYLIST_LIMIT)),
            _ => Ok(DEFAULT_PLAYLIST_LIMIT),
        }
    }

    fn set_youtube_playlist_limit(&self, limit: usize) -> Result<()> {
        self.set_value(
            &["accounts", "youtube", "playlist_limit"],
            Value::Number(Number::from(limit)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_limit() {
        let config = Config::from_yaml_str("").unwrap();
        assert_eq!(config.get_youtube_playlist_limit().unwrap(), 100);

        let config = Config::from_yaml_str("accounts:\n  youtube:\n    playlist_limit: 25\n").unwrap();
        assert_eq!(config.get_youtube_playlist_limit().unwrap(), 25);

        config.set_youtube_playlist_limit(0).unwrap();
        assert_eq!(config.get_youtube_playlist_limit().unwrap(), 100);
    }
}
