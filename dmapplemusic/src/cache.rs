//! Cache en mémoire pour les lectures du catalogue Apple Music

use dmsource::{Collection, Track};
use moka::future::Cache as MokaCache;
use std::time::Duration;

#[derive(Clone)]
pub struct AppleMusicCache {
    /// Titres, par `storefront:id` (TTL: 1 heure)
    songs: MokaCache<String, Track>,
    /// Playlists et albums (TTL: 30 minutes)
    collections: MokaCache<String, Collection>,
}

impl Default for AppleMusicCache {
    fn default() -> Self {
        Self::with_capacity(1000)
    }
}

impl AppleMusicCache {
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            songs: MokaCache::builder()
                .max_capacity(max_capacity)
                .time_to_live(Duration::from_secs(3600))
                .build(),
            collections: MokaCache::builder()
                .max_capacity(max_capacity / 4)
                .time_to_live(Duration::from_secs(1800))
                .build(),
        }
    }

    pub async fn get_song(&self, storefront: &str, id: &str) -> Option<Track> {
        self.songs.get(&format!("{}:{}", storefront, id)).await
    }

    pub async fn put_song(&self, storefront: &str, id: &str, track: Track) {
        self.songs.insert(format!("{}:{}", storefront, id), track).await;
    }

    pub async fn get_collection(&self, key: &str) -> Option<Collection> {
        self.collections.get(key).await
    }

    pub async fn put_collection(&self, key: String, collection: Collection) {
        self.collections.insert(key, collection).await;
    }
}
