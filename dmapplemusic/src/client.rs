//! Client principal pour le catalogue Apple Music
//!
//! Le catalogue est lu avec le token du client web (voir [`crate::token`]),
//! partagé par toutes les sessions via un `CredentialCache`. Un 401 force
//! un seul renouvellement du token suivi d'un seul nouvel essai.
//!
//! # Exemple
//!
//! ```no_run
//! use dmapplemusic::AppleMusicClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AppleMusicClient::new()?;
//!     let track = client.get_song("1440857781", None).await?;
//!     println!("{} - {}", track.title, track.artist_name());
//!     Ok(())
//! }
//! ```

use crate::cache::AppleMusicCache;
use crate::error::{AppleMusicError, Result};
use crate::models::{CatalogCollection, DataResponse, Song};
use crate::token::WebTokenSource;
use dmsource::{Collection, CredentialCache, Provider, Track};
use reqwest::header::ORIGIN;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Client web dont on extrait le token, et origine exigée par l'API
pub const DEFAULT_WEB_URL: &str = "https://music.apple.com";

/// Hôte de l'API catalogue
pub const DEFAULT_API_HOST: &str = "https://amp-api.music.apple.com";

/// Storefront utilisé quand l'URL n'en précise pas
pub const DEFAULT_STOREFRONT: &str = "us";

/// Taille (carrée) des pochettes
pub const DEFAULT_ARTWORK_SIZE: u32 = 300;

/// Timeout par défaut des requêtes HTTP
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Nombre maximum de pages de tracks suivies pour une collection
pub const MAX_PAGES: usize = 10;

/// Comment les titres Apple Music sont joués
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPolicy {
    /// Le lien Apple Music est ouvert par le lecteur Apple Music
    #[default]
    Native,
    /// Un substitut YouTube est cherché pour chaque titre
    YouTube,
}

impl FromStr for PlaybackPolicy {
    type Err = AppleMusicError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "native" | "applemusic" => Ok(Self::Native),
            "youtube" => Ok(Self::YouTube),
            other => Err(AppleMusicError::Config(anyhow::anyhow!(
                "Unknown Apple Music playback policy: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for PlaybackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::YouTube => write!(f, "youtube"),
        }
    }
}

/// Client Apple Music haut-niveau avec cache
pub struct AppleMusicClient {
    client: Client,
    api_host: String,
    storefront: String,
    artwork_size: u32,
    playback: PlaybackPolicy,
    credentials: CredentialCache,
    cache: AppleMusicCache,
}

impl AppleMusicClient {
    /// Crée un client avec les paramètres par défaut
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Crée un client depuis la section `accounts.applemusic`
    pub fn from_config(config: &dmconfig::Config) -> Result<Self> {
        use crate::config_ext::AppleMusicConfigExt;
        Self::builder()
            .storefront(config.get_applemusic_storefront()?)
            .artwork_size(config.get_applemusic_artwork_size()?)
            .playback(config.get_applemusic_playback()?)
            .timeout(Duration::from_secs(config.get_resolver_timeout_secs()? as u64))
            .build()
    }

    pub fn storefront(&self) -> &str {
        &self.storefront
    }

    pub fn playback(&self) -> PlaybackPolicy {
        self.playback
    }

    pub fn credentials(&self) -> &CredentialCache {
        &self.credentials
    }

    fn storefront_or_default<'a>(&'a self, storefront: Option<&'a str>) -> &'a str {
        storefront
            .filter(|sf| !sf.is_empty())
            .unwrap_or(&self.storefront)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T> {
        let url = format!("{}{}", self.api_host, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(ORIGIN, DEFAULT_WEB_URL)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Apple Music API error ({}): {} bytes", status, body.len());
            return Err(AppleMusicError::from_status_code(
                status.as_u16(),
                status.canonical_reason().unwrap_or("error").to_string(),
            ));
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Lit une ressource du catalogue avec le token partagé
    async fn catalog<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.credentials
            .authorized(|token| async move { self.get(path, &token).await })
            .await
    }

    /// Récupère un titre (`songs/{id}`)
    pub async fn get_song(&self, id: &str, storefront: Option<&str>) -> Result<Track> {
        let storefront = self.storefront_or_default(storefront);
        if let Some(track) = self.cache.get_song(storefront, id).await {
            debug!("Song {} found in cache", id);
            return Ok(track);
        }

        let path = format!("/v1/catalog/{}/songs/{}", storefront, id);
        let response: DataResponse<Song> = self.catalog(&path).await?;
        let song = response
            .data
            .first()
            .ok_or_else(|| AppleMusicError::NotFound(format!("song {}", id)))?;

        let track = song.to_track(self.artwork_size, self.playback == PlaybackPolicy::Native);
        self.cache.put_song(storefront, id, track.clone()).await;
        Ok(track)
    }

    /// Récupère une playlist (`playlists/pl.xxx`) avec toutes ses tracks
    pub async fn get_playlist(&self, id: &str, storefront: Option<&str>) -> Result<Collection> {
        self.get_collection("playlists", id, storefront).await
    }

    /// Récupère un album avec toutes ses tracks
    pub async fn get_album(&self, id: &str, storefront: Option<&str>) -> Result<Collection> {
        self.get_collection("albums", id, storefront).await
    }

    async fn get_collection(
        &self,
        kind: &str,
        id: &str,
        storefront: Option<&str>,
    ) -> Result<Collection> {
        let storefront = self.storefront_or_default(storefront);
        let key = format!("{}:{}:{}", kind, storefront, id);
        if let Some(collection) = self.cache.get_collection(&key).await {
            debug!("{} {} found in cache", kind, id);
            return Ok(collection);
        }

        let path = format!("/v1/catalog/{}/{}/{}", storefront, kind, id);
        let response: DataResponse<CatalogCollection> = self.catalog(&path).await?;
        let collection = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AppleMusicError::NotFound(format!("{} {}", kind, id)))?;

        let native = self.playback == PlaybackPolicy::Native;
        let mut songs: Vec<Song> = collection.songs().to_vec();
        let mut next = collection.next_tracks().map(str::to_string);
        let mut pages = 1;
        while let Some(path) = next.take() {
            if pages >= MAX_PAGES {
                debug!("{} {} truncated after {} pages", kind, id, pages);
                break;
            }
            let page: DataResponse<Song> = self.catalog(&path).await?;
            songs.extend(page.data);
            next = page.next;
            pages += 1;
        }

        let tracks = songs
            .iter()
            .filter(|song| song.attributes.is_some())
            .map(|song| song.to_track(self.artwork_size, native))
            .collect();

        let collection = Collection {
            name: collection.attributes.name,
            provider: Provider::AppleMusic,
            tracks,
        };
        self.cache.put_collection(key, collection.clone()).await;
        Ok(collection)
    }
}

/// Builder pour [`AppleMusicClient`]
pub struct ClientBuilder {
    client: Option<Client>,
    web_url: String,
    api_host: String,
    timeout: Duration,
    storefront: String,
    artwork_size: u32,
    playback: PlaybackPolicy,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            web_url: DEFAULT_WEB_URL.to_string(),
            api_host: DEFAULT_API_HOST.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            storefront: DEFAULT_STOREFRONT.to_string(),
            artwork_size: DEFAULT_ARTWORK_SIZE,
            playback: PlaybackPolicy::default(),
        }
    }
}

impl ClientBuilder {
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Page d'accueil dont le token est extrait (tests: serveur mock)
    pub fn web_url(mut self, url: impl Into<String>) -> Self {
        self.web_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_host(mut self, url: impl Into<String>) -> Self {
        self.api_host = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn storefront(mut self, storefront: impl Into<String>) -> Self {
        self.storefront = storefront.into().to_lowercase();
        self
    }

    pub fn artwork_size(mut self, size: u32) -> Self {
        self.artwork_size = size.max(1);
        self
    }

    pub fn playback(mut self, playback: PlaybackPolicy) -> Self {
        self.playback = playback;
        self
    }

    pub fn build(self) -> Result<AppleMusicClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout)
                .user_agent(concat!("DisMusic/", env!("CARGO_PKG_VERSION")))
                .build()?,
        };

        let credentials = CredentialCache::new(
            Provider::AppleMusic,
            Arc::new(WebTokenSource::new(client.clone(), self.web_url)),
        );

        Ok(AppleMusicClient {
            client,
            api_host: self.api_host,
            storefront: self.storefront,
            artwork_size: self.artwork_size,
            playback: self.playback,
            credentials,
            cache: AppleMusicCache::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_policy_parse() {
        assert_eq!("native".parse::<PlaybackPolicy>().unwrap(), PlaybackPolicy::Native);
        assert_eq!(" YouTube ".parse::<PlaybackPolicy>().unwrap(), PlaybackPolicy::YouTube);
        assert!("spotify".parse::<PlaybackPolicy>().is_err());
        assert_eq!(PlaybackPolicy::YouTube.to_string(), "youtube");
    }

    #[test]
    fn test_builder_defaults() {
        let client = AppleMusicClient::builder().storefront("FR").build().unwrap();
        assert_eq!(client.storefront(), "fr");
        assert_eq!(client.playback(), PlaybackPolicy::Native);
        assert_eq!(client.storefront_or_default(Some("gb")), "gb");
        assert_eq!(client.storefront_or_default(Some("")), "fr");
        assert_eq!(client.storefront_or_default(None), "fr");
    }

    #[tokio::test]
    #[ignore = "Integration test - calls real Apple Music endpoints"]
    async fn test_live_song() {
        let client = AppleMusicClient::new().unwrap();
        let track = client.get_song("1440857781", None).await.unwrap();
        assert!(!track.title.is_empty());
    }
}
