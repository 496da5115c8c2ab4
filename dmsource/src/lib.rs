//! # DMSource
//!
//! Common track model, error taxonomy and resolver traits for DisMusic catalogs.
//!
//! Every catalog crate (`dmspotify`, `dmapplemusic`, `dmyoutube`) implements
//! [`CatalogResolver`]; the secondary catalog also implements
//! [`SurrogateFinder`], which turns a `"{title} {artist}"` query into a URL
//! the embedded player can open.
//!
//! ## Modules
//!
//! - [`model`]: canonical [`Track`], [`Provider`], [`CatalogRef`], [`Collection`]
//! - [`normalize`]: provider records to [`Track`], duration and artwork coercion
//! - [`credentials`]: [`CredentialCache`] with injectable source and clock
//! - [`error`]: [`SourceError`] taxonomy
//!
//! ## Implementing a resolver
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use dmsource::{CatalogRef, CatalogResolver, Collection, Provider, Result, Track};
//!
//! struct MyCatalog;
//!
//! #[async_trait]
//! impl CatalogResolver for MyCatalog {
//!     fn provider(&self) -> Provider {
//!         Provider::Spotify
//!     }
//!
//!     async fn resolve_track(&self, reference: &CatalogRef) -> Result<Track> {
//!         todo!()
//!     }
//!
//!     async fn resolve_collection(&self, reference: &CatalogRef) -> Result<Collection> {
//!         todo!()
//!     }
//! }
//! ```

pub mod credentials;
pub mod error;
pub mod model;
pub mod normalize;

pub use credentials::{AuthSignal, Clock, Credential, CredentialCache, CredentialSource, SystemClock};
pub use error::{Result, SourceError};
pub use model::{
    CatalogRef, Collection, DisplayTrack, EntityKind, FoundSurrogate, Provider, Surrogate,
    SurrogateKind, Track,
};
pub use normalize::{format_duration, normalize, RawDuration, RawTrack};

use async_trait::async_trait;

/// A catalog able to resolve classified identifiers into tracks
#[async_trait]
pub trait CatalogResolver: Send + Sync {
    /// The catalog this resolver serves
    fn provider(&self) -> Provider;

    /// Resolves a single item
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Upstream`/`UpstreamAuth` for provider failures.
    async fn resolve_track(&self, reference: &CatalogRef) -> Result<Track>;

    /// Resolves a playlist or album, tracks in catalog order
    async fn resolve_collection(&self, reference: &CatalogRef) -> Result<Collection>;

    /// Best single match for free text, `None` when the search is empty
    ///
    /// Catalogs without text search keep the default.
    async fn search_track(&self, _text: &str) -> Result<Option<Track>> {
        Err(SourceError::NotSupported(format!(
            "{} text search",
            self.provider()
        )))
    }
}

/// Finds a playable surrogate for a track known only by its metadata
#[async_trait]
pub trait SurrogateFinder: Send + Sync {
    /// Single best-ranked result for `text`
    ///
    /// # Errors
    ///
    /// `NotFound` when the search returns nothing playable.
    async fn find_playable_surrogate(&self, text: &str) -> Result<FoundSurrogate>;
}
