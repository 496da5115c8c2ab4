//! Client principal pour interagir avec l'API Spotify
//!
//! Ce module fournit un client haut-niveau avec token applicatif et cache intégré.
//! Un appel refusé pour token expiré déclenche un seul rafraîchissement suivi
//! d'un seul nouvel essai.

use crate::api::auth::ClientCredentials;
use crate::api::SpotifyApi;
use crate::cache::SpotifyCache;
use crate::config_ext::SpotifyConfigExt;
use crate::error::Result;
use crate::models::SpotifyCollection;
use dmconfig::Config;
use dmsource::{CredentialCache, Provider, Track};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Client Spotify haut-niveau avec cache
pub struct SpotifyClient {
    /// API bas-niveau
    api: Arc<SpotifyApi>,
    /// Token applicatif partagé par toutes les sessions
    credentials: CredentialCache,
    /// Cache en mémoire
    cache: SpotifyCache,
}

impl SpotifyClient {
    /// Crée un client à partir de l'API bas-niveau
    pub fn new(api: SpotifyApi) -> Self {
        let api = Arc::new(api);
        let credentials = CredentialCache::new(
            Provider::Spotify,
            Arc::new(ClientCredentials::new(api.clone())),
        );
        Self {
            api,
            credentials,
            cache: SpotifyCache::new(),
        }
    }

    /// Crée un client depuis la configuration (`accounts.spotify`)
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// use dmspotify::SpotifyClient;
    ///
    /// let config = dmconfig::get_config();
    /// let client = SpotifyClient::from_config(&config)?;
    /// # Ok::<(), dmspotify::SpotifyError>(())
    /// ```
    pub fn from_config(config: &Config) -> Result<Self> {
        let (client_id, client_secret) = config.get_spotify_credentials()?;
        let timeout = Duration::from_secs(config.get_resolver_timeout_secs()? as u64);

        let mut api = SpotifyApi::with_timeout(client_id, client_secret, timeout)?;
        api.set_market(config.get_spotify_market()?);
        info!("Spotify client configured (market {})", api.market());

        Ok(Self::new(api))
    }

    pub fn api(&self) -> &SpotifyApi {
        &self.api
    }

    pub fn credentials(&self) -> &CredentialCache {
        &self.credentials
    }

    /// Récupère une track par son ID
    pub async fn get_track(&self, track_id: &str) -> Result<Track> {
        if let Some(track) = self.cache.get_track(track_id).await {
            debug!("Track {} found in cache", track_id);
            return Ok(track);
        }

        let track = self
            .credentials
            .authorized(|token| async move { self.api.get_track(track_id, &token).await })
            .await?;

        self.cache.put_track(track_id.to_string(), track.clone()).await;
        Ok(track)
    }

    /// Récupère une playlist complète
    pub async fn get_playlist(&self, playlist_id: &str) -> Result<SpotifyCollection> {
        let key = format!("playlist:{}", playlist_id);
        if let Some(playlist) = self.cache.get_collection(&key).await {
            debug!("Playlist {} found in cache", playlist_id);
            return Ok(playlist);
        }

        let playlist = self
            .credentials
            .authorized(|token| async move { self.api.get_playlist(playlist_id, &token).await })
            .await?;

        self.cache.put_collection(key, playlist.clone()).await;
        Ok(playlist)
    }

    /// Récupère un album complet
    pub async fn get_album(&self, album_id: &str) -> Result<SpotifyCollection> {
        let key = format!("album:{}", album_id);
        if let Some(album) = self.cache.get_collection(&key).await {
            debug!("Album {} found in cache", album_id);
            return Ok(album);
        }

        let album = self
            .credentials
            .authorized(|token| async move { self.api.get_album(album_id, &token).await })
            .await?;

        self.cache.put_collection(key, album.clone()).await;
        Ok(album)
    }

    /// Meilleure track pour un texte libre
    pub async fn search_track(&self, query: &str) -> Result<Option<Track>> {
        if let Some(result) = self.cache.get_search(query).await {
            return Ok(result);
        }

        let result = self
            .credentials
            .authorized(|token| async move { self.api.search_track(query, &token).await })
            .await?;

        self.cache.put_search(query, result.clone()).await;
        Ok(result)
    }
}
