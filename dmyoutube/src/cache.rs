//! In-memory TTL cache for YouTube lookups

use crate::models::{Playlist, Video};
use moka::future::Cache as MokaCache;
use std::time::Duration;

#[derive(Clone)]
pub struct YouTubeCache {
    /// Watch pages (TTL: 1 hour)
    videos: MokaCache<String, Video>,
    /// Playlist pages (TTL: 30 minutes)
    playlists: MokaCache<String, Playlist>,
    /// First results of a search (TTL: 15 minutes)
    searches: MokaCache<String, Vec<Video>>,
}

impl Default for YouTubeCache {
    fn default() -> Self {
        Self::with_capacity(1000)
    }
}

impl YouTubeCache {
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            videos: MokaCache::builder()
                .max_capacity(max_capacity)
                .time_to_live(Duration::from_secs(3600))
                .build(),
            playlists: MokaCache::builder()
                .max_capacity(max_capacity / 4)
                .time_to_live(Duration::from_secs(1800))
                .build(),
            searches: MokaCache::builder()
                .max_capacity(max_capacity)
                .time_to_live(Duration::from_secs(900))
                .build(),
        }
    }

    pub async fn get_video(&self, id: &str) -> Option<Video> {
        self.videos.get(id).await
    }

    pub async fn put_video(&self, video: Video) {
        self.videos.insert(video.id.clone(), video).await;
    }

    pub async fn get_playlist(&self, id: &str) -> Option<Playlist> {
        self.playlists.get(id).await
    }

    pub async fn put_playlist(&self, playlist: Playlist) {
        self.playlists.insert(playlist.id.clone(), playlist).await;
    }

    pub async fn get_search(&self, query: &str) -> Option<Vec<Video>> {
        self.searches.get(&search_key(query)).await
    }

    pub async fn put_search(&self, query: &str, videos: Vec<Video>) {
        self.searches.insert(search_key(query), videos).await;
    }
}

fn search_key(query: &str) -> String {
    query.trim().to_lowercase()
}
