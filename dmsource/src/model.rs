//! Canonical track model

use crate::normalize::format_duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Artist name used when a provider returns none
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// External catalog a track or query belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Primary streaming-metadata catalog
    Spotify,
    /// Secondary video catalog, source of playable surrogates
    YouTube,
    /// Token-gated collection catalog
    AppleMusic,
    /// In-app playlist built by the user
    InHouse,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Spotify => "spotify",
            Provider::YouTube => "youtube",
            Provider::AppleMusic => "applemusic",
            Provider::InHouse => "inhouse",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Spotify => "Spotify",
            Provider::YouTube => "YouTube",
            Provider::AppleMusic => "Apple Music",
            Provider::InHouse => "Playlist",
        };
        f.write_str(name)
    }
}

/// Entity type designated by a classified query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Track,
    Playlist,
    Album,
}

impl EntityKind {
    pub fn is_collection(&self) -> bool {
        !matches!(self, EntityKind::Track)
    }
}

/// A classified catalog identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogRef {
    pub provider: Provider,
    pub kind: EntityKind,
    pub id: String,
    /// Apple Music storefront taken from the URL, if any
    pub storefront: Option<String>,
}

impl CatalogRef {
    pub fn new(provider: Provider, kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            id: id.into(),
            storefront: None,
        }
    }

    pub fn with_storefront(mut self, storefront: impl Into<String>) -> Self {
        self.storefront = Some(storefront.into());
        self
    }
}

/// Which player opens a surrogate URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurrogateKind {
    YouTube,
    AppleMusic,
}

/// The resource the embedded player actually opens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surrogate {
    pub url: String,
    pub kind: SurrogateKind,
}

impl Surrogate {
    pub fn youtube(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: SurrogateKind::YouTube,
        }
    }

    pub fn apple_music(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: SurrogateKind::AppleMusic,
        }
    }
}

/// Result of a surrogate search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundSurrogate {
    pub url: String,
    pub duration_seconds: Option<u32>,
}

/// Canonical playable unit
///
/// Tracks are rebuilt on every resolution and never outlive the session
/// that holds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    /// Primary artist first
    pub artists: Vec<String>,
    /// Empty when the provider has no artwork
    pub album_cover_url: String,
    pub duration_seconds: Option<u32>,
    /// `None` until a playable resource is known
    pub surrogate: Option<Surrogate>,
    pub provider: Provider,
    /// Page of the track in its own catalog
    pub catalog_url: Option<String>,
}

impl Track {
    pub fn artist_name(&self) -> &str {
        self.artists
            .first()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_ARTIST)
    }

    /// `"{title} {primary artist}"`, the query used to find a surrogate
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.artist_name())
    }

    pub fn is_playable(&self) -> bool {
        self.surrogate.is_some()
    }

    pub fn to_display(&self) -> DisplayTrack {
        DisplayTrack {
            title: self.title.clone(),
            artist: self.artist_name().to_string(),
            album_cover: self.album_cover_url.clone(),
            duration: format_duration(self.duration_seconds),
            provider: self.provider,
            playable: self.is_playable(),
        }
    }
}

/// Track shape sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DisplayTrack {
    pub title: String,
    pub artist: String,
    pub album_cover: String,
    /// `m:ss`, or `-` when unknown
    pub duration: String,
    pub provider: Provider,
    pub playable: bool,
}

/// An ordered group of tracks (playlist or album)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub provider: Provider,
    pub tracks: Vec<Track>,
}

impl Collection {
    /// Covers of the first four tracks, empty ones left out
    pub fn covers(&self) -> Vec<String> {
        self.tracks
            .iter()
            .take(4)
            .map(|t| t.album_cover_url.as_str())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(title: &str, artists: &[&str], cover: &str) -> Track {
        Track {
            title: title.to_string(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            album_cover_url: cover.to_string(),
            duration_seconds: Some(65),
            surrogate: None,
            provider: Provider::Spotify,
            catalog_url: None,
        }
    }

    #[test]
    fn test_search_text_uses_primary_artist() {
        let t = track("Song", &["Main", "Feat"], "");
        assert_eq!(t.search_text(), "Song Main");

        let t = track("Song", &[], "");
        assert_eq!(t.search_text(), "Song Unknown Artist");
    }

    #[test]
    fn test_display_shape() {
        let mut t = track("Song", &["Main"], "http://img");
        let display = t.to_display();
        assert_eq!(display.duration, "1:05");
        assert!(!display.playable);

        t.surrogate = Some(Surrogate::youtube("https://www.youtube.com/watch?v=abcdefghijk"));
        let json = serde_json::to_value(t.to_display()).unwrap();
        assert_eq!(json["albumCover"], "http://img");
        assert_eq!(json["provider"], "spotify");
        assert_eq!(json["playable"], true);
    }

    #[test]
    fn test_collection_covers() {
        let collection = Collection {
            name: "Mix".into(),
            provider: Provider::Spotify,
            tracks: vec![
                track("a", &["x"], "1"),
                track("b", &["x"], ""),
                track("c", &["x"], "2"),
                track("d", &["x"], "3"),
                track("e", &["x"], "4"),
                track("f", &["x"], "5"),
            ],
        };
        assert_eq!(collection.covers(), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_entity_kind() {
        assert!(EntityKind::Playlist.is_collection());
        assert!(EntityKind::Album.is_collection());
        assert!(!EntityKind::Track.is_collection());
    }
}
