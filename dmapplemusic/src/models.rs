//! Structures de réponse de l'API catalogue Apple Music

use dmsource::normalize::{apple_artwork, Artwork as RawArtwork, RawDuration, RawTrack};
use dmsource::{normalize, Provider, Surrogate, Track};
use serde::Deserialize;

/// Enveloppe `{"data": [...], "next": "..."}` commune à toutes les réponses
#[derive(Debug, Clone, Deserialize)]
pub struct DataResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Pochette sous forme de gabarit (`.../{w}x{h}bb.jpg`)
#[derive(Debug, Clone, Deserialize)]
pub struct Artwork {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub artwork: Option<Artwork>,
    #[serde(default)]
    pub duration_in_millis: Option<u64>,
    /// Lien `music.apple.com` du titre
    #[serde(default)]
    pub url: Option<String>,
}

/// Ressource `songs`
#[derive(Debug, Clone, Deserialize)]
pub struct Song {
    pub id: String,
    #[serde(default)]
    pub attributes: Option<SongAttributes>,
}

impl Song {
    /// Convertit en track canonique
    ///
    /// Avec `native`, le lien Apple Music sert lui-même de substitut jouable.
    pub fn to_track(&self, artwork_size: u32, native: bool) -> Track {
        let Some(attributes) = &self.attributes else {
            return normalize(RawTrack::default(), Provider::AppleMusic);
        };

        let mut raw = RawTrack {
            title: attributes.name.clone(),
            ..Default::default()
        };
        if let Some(artist) = &attributes.artist_name {
            raw = raw.artist(artist.clone());
        }
        if let Some(artwork) = &attributes.artwork {
            raw = raw.artwork(RawArtwork::new(
                apple_artwork(&artwork.url, artwork_size),
                Some(artwork_size),
                Some(artwork_size),
            ));
        }
        if let Some(ms) = attributes.duration_in_millis {
            raw = raw.duration(RawDuration::Millis(ms));
        }
        if let Some(url) = &attributes.url {
            raw = raw.catalog_url(url.clone());
            if native {
                raw = raw.surrogate(Surrogate::apple_music(url.clone()));
            }
        }
        normalize(raw, Provider::AppleMusic)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionAttributes {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artwork: Option<Artwork>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Relationships {
    #[serde(default)]
    pub tracks: Option<DataResponse<Song>>,
}

/// Ressource `playlists` ou `albums`, avec ses tracks en relation
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogCollection {
    pub id: String,
    pub attributes: CollectionAttributes,
    #[serde(default)]
    pub relationships: Option<Relationships>,
}

impl CatalogCollection {
    /// Tracks de la première page de la relation `tracks`
    pub fn songs(&self) -> &[Song] {
        self.relationships
            .as_ref()
            .and_then(|r| r.tracks.as_ref())
            .map(|t| t.data.as_slice())
            .unwrap_or_default()
    }

    /// Lien vers la page suivante des tracks, si la relation est tronquée
    pub fn next_tracks(&self) -> Option<&str> {
        self.relationships
            .as_ref()
            .and_then(|r| r.tracks.as_ref())
            .and_then(|t| t.next.as_deref())
    }
}
