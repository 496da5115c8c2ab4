//! Resolution chain
//!
//! Classified identifiers go to the catalog that owns them; unclassified
//! text goes through the search order (Spotify, then YouTube). Every
//! provider call is bounded by the resolver timeout.

use crate::classifier::{Classification, Classifier};
use crate::query::{InHousePlaylist, Query};
use dmconfig::Config;
use dmsource::{
    CatalogRef, CatalogResolver, Collection, DisplayTrack, Provider, Result, SourceError,
    Surrogate, SurrogateFinder, Track,
};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default bound for one provider call
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Tracks produced by one query, in queue order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Collection name, when the query named one
    pub name: Option<String>,
    pub tracks: Vec<Track>,
}

impl Resolution {
    pub fn single(track: Track) -> Self {
        Self {
            name: None,
            tracks: vec![track],
        }
    }
}

impl From<Collection> for Resolution {
    fn from(collection: Collection) -> Self {
        Self {
            name: Some(collection.name),
            tracks: collection.tracks,
        }
    }
}

/// Collection as returned by the lookup endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "dmserver", derive(utoipa::ToSchema))]
pub struct CollectionView {
    pub name: String,
    /// First four non-empty covers
    pub covers: Vec<String>,
    pub tracks: Vec<DisplayTrack>,
}

impl From<&Collection> for CollectionView {
    fn from(collection: &Collection) -> Self {
        Self {
            name: collection.name.clone(),
            covers: collection.covers(),
            tracks: collection.tracks.iter().map(Track::to_display).collect(),
        }
    }
}

/// Result of a one-shot lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "dmserver", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum Lookup {
    Collection(CollectionView),
    Track(DisplayTrack),
}

/// Multi-catalog resolver shared by every session
pub struct Resolver {
    classifier: Classifier,
    catalogs: HashMap<Provider, Arc<dyn CatalogResolver>>,
    search_order: Vec<Provider>,
    surrogates: Option<Arc<dyn SurrogateFinder>>,
    timeout: Duration,
}

impl Resolver {
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn has_catalog(&self, provider: Provider) -> bool {
        self.catalogs.contains_key(&provider)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn catalog(&self, provider: Provider) -> Result<&Arc<dyn CatalogResolver>> {
        self.catalogs
            .get(&provider)
            .ok_or_else(|| SourceError::NotSupported(format!("{} is not configured", provider)))
    }

    async fn timed<T, F>(&self, provider: Provider, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(%provider, "Provider call timed out after {:?}", self.timeout);
                Err(SourceError::upstream(
                    provider,
                    format!("no answer within {}s", self.timeout.as_secs()),
                ))
            }
        }
    }

    /// Resolves a raw query or an in-app playlist
    pub async fn resolve(&self, query: &Query) -> Result<Resolution> {
        match query {
            Query::Text(text) => self.resolve_text(text).await,
            Query::InHouse(playlist) => self.resolve_inhouse(playlist).await,
        }
    }

    /// Classifies `text` and resolves it
    ///
    /// A collection that cannot be fetched falls back to the single item
    /// named by the same input, when there is one.
    pub async fn resolve_text(&self, text: &str) -> Result<Resolution> {
        match self.classifier.classify(text) {
            Classification::Catalog(reference) if reference.kind.is_collection() => {
                match self.resolve_collection(&reference).await {
                    Ok(collection) => Ok(collection.into()),
                    Err(err) => self.collection_fallback(text, &reference, err).await,
                }
            }
            Classification::Catalog(reference) => {
                Ok(Resolution::single(self.resolve_track(&reference).await?))
            }
            Classification::Unclassified(text) => Ok(Resolution::single(self.search(&text).await?)),
        }
    }

    async fn collection_fallback(
        &self,
        text: &str,
        reference: &CatalogRef,
        err: SourceError,
    ) -> Result<Resolution> {
        warn!(
            provider = %reference.provider,
            id = %reference.id,
            "Collection lookup failed: {}",
            err
        );

        if let Some(item) = self.classifier.classify_item(text) {
            info!(provider = %item.provider, id = %item.id, "Falling back to single item");
            return Ok(Resolution::single(self.resolve_track(&item).await?));
        }

        Err(match err {
            SourceError::Upstream { provider, message } => {
                SourceError::CollectionFetchPartialFailure { provider, message }
            }
            other => other,
        })
    }

    /// In-app playlists: every entry is classified on its own, failures skipped
    ///
    /// Objects without `inhouse: true` are rejected with `InvalidRequest`.
    async fn resolve_inhouse(&self, playlist: &InHousePlaylist) -> Result<Resolution> {
        if !playlist.inhouse {
            return Err(SourceError::InvalidRequest(
                "Playlist objects must set \"inhouse\": true".to_string(),
            ));
        }
        let results = join_all(playlist.tracks.iter().map(|entry| self.resolve_text(entry))).await;

        let mut tracks = Vec::new();
        let mut first_error = None;
        for (entry, result) in playlist.tracks.iter().zip(results) {
            match result {
                Ok(resolution) => tracks.extend(resolution.tracks),
                Err(err) => {
                    warn!("Skipping in-house entry {:?}: {}", entry, err);
                    first_error.get_or_insert(err);
                }
            }
        }

        if tracks.is_empty() {
            if let Some(err) = first_error {
                return Err(err);
            }
        }
        debug!(
            "In-house playlist {:?} resolved to {} tracks",
            playlist.name,
            tracks.len()
        );
        Ok(Resolution {
            name: playlist.name.clone(),
            tracks,
        })
    }

    pub async fn resolve_track(&self, reference: &CatalogRef) -> Result<Track> {
        let catalog = self.catalog(reference.provider)?;
        self.timed(reference.provider, catalog.resolve_track(reference))
            .await
    }

    pub async fn resolve_collection(&self, reference: &CatalogRef) -> Result<Collection> {
        let catalog = self.catalog(reference.provider)?;
        self.timed(reference.provider, catalog.resolve_collection(reference))
            .await
    }

    /// Best match for free text along the search order
    ///
    /// # Errors
    ///
    /// `ClassificationMiss` when every catalog answered with no match; the
    /// last provider failure when a catalog could not be searched.
    pub async fn search(&self, text: &str) -> Result<Track> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SourceError::ClassificationMiss(String::new()));
        }

        let mut failure = None;
        for provider in &self.search_order {
            let Some(catalog) = self.catalogs.get(provider) else {
                continue;
            };
            match self.timed(*provider, catalog.search_track(text)).await {
                Ok(Some(track)) => {
                    debug!(%provider, "Search {:?} matched {:?}", text, track.title);
                    return Ok(track);
                }
                Ok(None) => debug!(%provider, "No match for {:?}", text),
                Err(SourceError::NotSupported(_)) => {}
                Err(err) => {
                    warn!(%provider, "Search failed: {}", err);
                    failure = Some(err);
                }
            }
        }

        Err(failure.unwrap_or_else(|| SourceError::ClassificationMiss(text.to_string())))
    }

    /// Gives `track` a playable surrogate if it has none
    ///
    /// The surrogate search uses `"{title} {primary artist}"`. A duration
    /// unknown to the catalog is taken from the surrogate.
    pub async fn ensure_surrogate(&self, track: &mut Track) -> Result<()> {
        if track.surrogate.is_some() {
            return Ok(());
        }
        let finder = self
            .surrogates
            .as_ref()
            .ok_or_else(|| SourceError::NotSupported("playable surrogate search".to_string()))?;

        let text = track.search_text();
        let found = self
            .timed(Provider::YouTube, finder.find_playable_surrogate(&text))
            .await?;
        debug!("Surrogate for {:?}: {}", text, found.url);

        track.surrogate = Some(Surrogate::youtube(found.url));
        if track.duration_seconds.is_none() {
            track.duration_seconds = found.duration_seconds;
        }
        Ok(())
    }

    /// One-shot lookup of a catalog URL that must belong to `provider`
    pub async fn lookup(&self, provider: Provider, url: &str) -> Result<Lookup> {
        let reference = match self.classifier.classify(url) {
            Classification::Catalog(reference) if reference.provider == provider => reference,
            _ => {
                return Err(SourceError::InvalidRequest(format!(
                    "Invalid {} track or playlist URL",
                    provider
                )));
            }
        };

        if reference.kind.is_collection() {
            let collection = self.resolve_collection(&reference).await?;
            Ok(Lookup::Collection(CollectionView::from(&collection)))
        } else {
            let track = self.resolve_track(&reference).await?;
            Ok(Lookup::Track(track.to_display()))
        }
    }
}

/// Builder for [`Resolver`]
pub struct ResolverBuilder {
    catalogs: Vec<Arc<dyn CatalogResolver>>,
    surrogates: Option<Arc<dyn SurrogateFinder>>,
    search_order: Vec<Provider>,
    timeout: Duration,
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self {
            catalogs: Vec::new(),
            surrogates: None,
            search_order: vec![Provider::Spotify, Provider::YouTube],
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ResolverBuilder {
    /// Builder with the timeout from `resolver.timeout_secs`
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let secs = config.get_resolver_timeout_secs()?.max(1);
        Ok(Self::default().timeout(Duration::from_secs(secs as u64)))
    }

    /// Registers a catalog; a later catalog for the same provider replaces it
    pub fn catalog(mut self, catalog: Arc<dyn CatalogResolver>) -> Self {
        self.catalogs.push(catalog);
        self
    }

    pub fn surrogate_finder(mut self, finder: Arc<dyn SurrogateFinder>) -> Self {
        self.surrogates = Some(finder);
        self
    }

    pub fn search_order(mut self, order: Vec<Provider>) -> Self {
        self.search_order = order;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> anyhow::Result<Resolver> {
        let classifier = Classifier::new()?;
        let catalogs: HashMap<_, _> = self
            .catalogs
            .into_iter()
            .map(|catalog| (catalog.provider(), catalog))
            .collect();

        info!(
            "Resolver ready with catalogs {:?} (timeout {:?})",
            catalogs.keys().map(Provider::as_str).collect::<Vec<_>>(),
            self.timeout
        );
        Ok(Resolver {
            classifier,
            catalogs,
            search_order: self.search_order,
            surrogates: self.surrogates,
            timeout: self.timeout,
        })
    }
}
