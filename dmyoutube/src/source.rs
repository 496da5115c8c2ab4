//! `CatalogResolver` and `SurrogateFinder` implementations

use crate::client::YouTubeClient;
use async_trait::async_trait;
use dmsource::{
    CatalogRef, CatalogResolver, Collection, FoundSurrogate, Provider, Result, SourceError,
    SurrogateFinder, Track,
};
use tracing::debug;

#[async_trait]
impl CatalogResolver for YouTubeClient {
    fn provider(&self) -> Provider {
        Provider::YouTube
    }

    async fn resolve_track(&self, reference: &CatalogRef) -> Result<Track> {
        let video = self.video(&reference.id).await?;
        Ok(video.to_track())
    }

    async fn resolve_collection(&self, reference: &CatalogRef) -> Result<Collection> {
        let playlist = self.playlist(&reference.id).await?;
        Ok(Collection {
            name: playlist.title,
            provider: Provider::YouTube,
            tracks: playlist.videos.iter().map(|v| v.to_track()).collect(),
        })
    }

    async fn search_track(&self, text: &str) -> Result<Option<Track>> {
        let videos = self.search(text).await?;
        Ok(videos.first().map(|v| v.to_track()))
    }
}

#[async_trait]
impl SurrogateFinder for YouTubeClient {
    async fn find_playable_surrogate(&self, text: &str) -> Result<FoundSurrogate> {
        let videos = self.search(text).await?;
        let best = videos
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::NotFound(format!("no YouTube video for \"{}\"", text)))?;

        debug!("Surrogate for '{}': {} ({})", text, best.title, best.id);
        Ok(FoundSurrogate {
            url: best.url(),
            duration_seconds: best.duration_seconds,
        })
    }
}
