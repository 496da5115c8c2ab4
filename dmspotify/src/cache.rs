//! Cache mémoire des lectures du catalogue Spotify
//!
//! Best-effort: une entrée expirée est simplement relue depuis l'API.

use crate::models::SpotifyCollection;
use dmsource::Track;
use moka::future::Cache as MokaCache;
use std::time::Duration;

const TRACK_TTL: Duration = Duration::from_secs(60 * 60);
const COLLECTION_TTL: Duration = Duration::from_secs(30 * 60);
const SEARCH_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Clone)]
pub struct SpotifyCache {
    tracks: MokaCache<String, Track>,
    /// Playlists et albums
    collections: MokaCache<String, SpotifyCollection>,
    /// Résultat `None` mémorisé aussi: une recherche vide n'est pas rejouée
    searches: MokaCache<String, Option<Track>>,
}

impl SpotifyCache {
    pub fn new() -> Self {
        Self::sized(1000)
    }

    /// `entries` dimensionne les trois caches (tracks x2, collections /4, recherches /2)
    pub fn sized(entries: u64) -> Self {
        Self {
            tracks: MokaCache::builder()
                .max_capacity(entries * 2)
                .time_to_live(TRACK_TTL)
                .build(),
            collections: MokaCache::builder()
                .max_capacity((entries / 4).max(1))
                .time_to_live(COLLECTION_TTL)
                .build(),
            searches: MokaCache::builder()
                .max_capacity((entries / 2).max(1))
                .time_to_live(SEARCH_TTL)
                .build(),
        }
    }

    pub async fn get_track(&self, id: &str) -> Option<Track> {
        self.tracks.get(id).await
    }

    pub async fn put_track(&self, id: String, track: Track) {
        self.tracks.insert(id, track).await;
    }

    /// Clé: `playlist:<id>` ou `album:<id>`
    pub async fn get_collection(&self, key: &str) -> Option<SpotifyCollection> {
        self.collections.get(key).await
    }

    pub async fn put_collection(&self, key: String, collection: SpotifyCollection) {
        self.collections.insert(key, collection).await;
    }

    pub async fn get_search(&self, query: &str) -> Option<Option<Track>> {
        self.searches.get(&query.trim().to_lowercase()).await
    }

    pub async fn put_search(&self, query: &str, result: Option<Track>) {
        self.searches.insert(query.trim().to_lowercase(), result).await;
    }
}

impl Default for SpotifyCache {
    fn default() -> Self {
        Self::new()
    }
}
