//! HTTP client for YouTube pages
//!
//! YouTube has no keyless metadata API, so the client reads the public
//! search, watch and playlist pages and extracts their embedded JSON.
//!
//! # Example
//!
//! ```no_run
//! use dmyoutube::YouTubeClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = YouTubeClient::new().await?;
//!
//!     let videos = client.search("daft punk one more time").await?;
//!     if let Some(best) = videos.first() {
//!         println!("{} -> {}", best.title, best.url());
//!     }
//!     Ok(())
//! }
//! ```

use crate::cache::YouTubeCache;
use crate::error::{Result, YouTubeError};
use crate::extract;
use crate::models::{Playlist, Video};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, COOKIE};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, warn};

/// Default YouTube base URL
pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

/// Default timeout for HTTP requests (15 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Pages are only served with their embedded data to browsers
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Maximum number of playlist entries returned
pub const DEFAULT_PLAYLIST_LIMIT: usize = 100;

/// Search results kept per query
pub const SEARCH_RESULTS: usize = 5;

/// YouTube page client with an in-memory cache
#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    base_url: String,
    playlist_limit: usize,
    cache: YouTubeCache,
}

impl YouTubeClient {
    /// Create a new client with default settings
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Build a client from the `accounts.youtube` configuration section
    pub async fn from_config(config: &dmconfig::Config) -> Result<Self> {
        use crate::config_ext::YouTubeConfigExt;
        Self::builder()
            .playlist_limit(config.get_youtube_playlist_limit()?)
            .timeout(Duration::from_secs(config.get_resolver_timeout_secs()? as u64))
            .build()
            .await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn playlist_limit(&self) -> usize {
        self.playlist_limit
    }

    async fn get_page(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self.client.get(&url).query(query).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response(&self, response: Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("YouTube page error ({}): {} bytes", status, body.len());
            return Err(YouTubeError::from_status_code(
                status.as_u16(),
                status.canonical_reason().unwrap_or("error").to_string(),
            ));
        }
        Ok(response.text().await?)
    }

    /// Search videos, best match first (at most [`SEARCH_RESULTS`])
    pub async fn search(&self, query: &str) -> Result<Vec<Video>> {
        if let Some(videos) = self.cache.get_search(query).await {
            debug!("Search '{}' served from cache", query);
            return Ok(videos);
        }

        let html = self
            .get_page("/results", &[("search_query", query)])
            .await?;
        let data = extract::embedded_json(&html, extract::INITIAL_DATA)?;
        let videos = extract::search_results(&data, SEARCH_RESULTS);
        debug!("Search '{}' returned {} videos", query, videos.len());

        self.cache.put_search(query, videos.clone()).await;
        Ok(videos)
    }

    /// Metadata of one video
    pub async fn video(&self, id: &str) -> Result<Video> {
        if let Some(video) = self.cache.get_video(id).await {
            return Ok(video);
        }

        let html = self.get_page("/watch", &[("v", id)]).await?;
        let response = extract::embedded_json(&html, extract::INITIAL_PLAYER_RESPONSE)?;
        let video = extract::video_details(&response, id)?;

        self.cache.put_video(video.clone()).await;
        Ok(video)
    }

    /// First page of a playlist, capped at the configured limit
    pub async fn playlist(&self, id: &str) -> Result<Playlist> {
        if let Some(playlist) = self.cache.get_playlist(id).await {
            return Ok(playlist);
        }

        let html = self.get_page("/playlist", &[("list", id)]).await?;
        let data = extract::embedded_json(&html, extract::INITIAL_DATA)?;
        let playlist = extract::playlist(&data, id, self.playlist_limit)?;
        debug!(
            "Playlist {} '{}' has {} videos",
            id,
            playlist.title,
            playlist.videos.len()
        );

        self.cache.put_playlist(playlist.clone()).await;
        Ok(playlist)
    }
}

/// Builder for [`YouTubeClient`]
pub struct ClientBuilder {
    client: Option<Client>,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    playlist_limit: usize,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            playlist_limit: DEFAULT_PLAYLIST_LIMIT,
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the base URL (tests point it at a mock server)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn playlist_limit(mut self, limit: usize) -> Self {
        self.playlist_limit = limit.max(1);
        self
    }

    /// Build the client
    pub async fn build(self) -> Result<YouTubeClient> {
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut headers = HeaderMap::new();
                headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
                // Skips the EU consent interstitial
                headers.insert(COOKIE, HeaderValue::from_static("CONSENT=YES+1"));

                Client::builder()
                    .user_agent(&self.user_agent)
                    .timeout(self.timeout)
                    .default_headers(headers)
                    .build()?
            }
        };

        Ok(YouTubeClient {
            client,
            base_url: self.base_url,
            playlist_limit: self.playlist_limit,
            cache: YouTubeCache::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::default();
        assert_eq!(builder.base_url, DEFAULT_BASE_URL);
        assert_eq!(builder.playlist_limit, DEFAULT_PLAYLIST_LIMIT);
        assert_eq!(
            builder.timeout,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_builder_normalizes() {
        let builder = ClientBuilder::new().base_url("http://127.0.0.1:1234/").playlist_limit(0);
        assert_eq!(builder.base_url, "http://127.0.0.1:1234");
        assert_eq!(builder.playlist_limit, 1);
    }

    #[tokio::test]
    #[ignore = "Integration test - calls real YouTube pages"]
    async fn test_live_search() {
        let client = YouTubeClient::new().await.unwrap();
        let videos = client.search("rick astley never gonna give you up").await.unwrap();
        assert!(!videos.is_empty());
    }
}
