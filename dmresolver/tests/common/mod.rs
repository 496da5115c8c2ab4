//! In-process catalogs driving the resolution chain

#![allow(dead_code)]

use async_trait::async_trait;
use dmsource::{
    CatalogRef, CatalogResolver, Collection, FoundSurrogate, Provider, Result, SourceError,
    Surrogate, SurrogateFinder, Track,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn track(provider: Provider, title: &str, artist: &str) -> Track {
    let surrogate = match provider {
        Provider::YouTube => Some(Surrogate::youtube(format!(
            "https://www.youtube.com/watch?v={}",
            title
        ))),
        _ => None,
    };
    Track {
        title: title.to_string(),
        artists: vec![artist.to_string()],
        album_cover_url: format!("https://img.example/{}.jpg", title),
        duration_seconds: None,
        surrogate,
        provider,
        catalog_url: None,
    }
}

pub struct FakeCatalog {
    provider: Provider,
    tracks: HashMap<String, Track>,
    collections: HashMap<String, Collection>,
    searches: HashMap<String, Track>,
    search_error: Option<SourceError>,
    collection_error: Option<SourceError>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            tracks: HashMap::new(),
            collections: HashMap::new(),
            searches: HashMap::new(),
            search_error: None,
            collection_error: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_track(mut self, id: &str, track: Track) -> Self {
        self.tracks.insert(id.to_string(), track);
        self
    }

    pub fn with_collection(mut self, id: &str, name: &str, tracks: Vec<Track>) -> Self {
        self.collections.insert(
            id.to_string(),
            Collection {
                name: name.to_string(),
                provider: self.provider,
                tracks,
            },
        );
        self
    }

    pub fn with_search(mut self, text: &str, track: Track) -> Self {
        self.searches.insert(text.to_string(), track);
        self
    }

    pub fn failing_search(mut self, err: SourceError) -> Self {
        self.search_error = Some(err);
        self
    }

    pub fn failing_collections(mut self, err: SourceError) -> Self {
        self.collection_error = Some(err);
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl CatalogResolver for FakeCatalog {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn resolve_track(&self, reference: &CatalogRef) -> Result<Track> {
        self.enter().await;
        self.tracks
            .get(&reference.id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(reference.id.clone()))
    }

    async fn resolve_collection(&self, reference: &CatalogRef) -> Result<Collection> {
        self.enter().await;
        if let Some(err) = &self.collection_error {
            return Err(err.clone());
        }
        self.collections
            .get(&reference.id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(reference.id.clone()))
    }

    async fn search_track(&self, text: &str) -> Result<Option<Track>> {
        self.enter().await;
        if let Some(err) = &self.search_error {
            return Err(err.clone());
        }
        Ok(self.searches.get(text).cloned())
    }
}

/// Answers every search with a watch URL derived from the text
#[derive(Default)]
pub struct FakeFinder {
    pub queries: Mutex<Vec<String>>,
    pub missing: bool,
}

#[async_trait]
impl SurrogateFinder for FakeFinder {
    async fn find_playable_surrogate(&self, text: &str) -> Result<FoundSurrogate> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(text.to_string());
        }
        if self.missing {
            return Err(SourceError::NotFound(text.to_string()));
        }
        Ok(FoundSurrogate {
            url: format!("https://www.youtube.com/watch?v={}", text.replace(' ', "+")),
            duration_seconds: Some(200),
        })
    }
}
