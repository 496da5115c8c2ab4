//! Structures de réponse de l'API Web Spotify et conversion vers `dmsource::Track`

use dmsource::normalize::{Artwork, RawDuration, RawTrack};
use dmsource::{Provider, Track, normalize};
use serde::{Deserialize, Serialize};

/// Réponse de `POST /api/token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// Album tel qu'embarqué dans une track
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Track complète (`/tracks/{id}`, playlists, recherche) ou simplifiée (albums)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrack {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    /// "track" ou "episode"
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl SpotifyTrack {
    pub fn is_episode(&self) -> bool {
        self.kind.as_deref() == Some("episode")
    }

    /// Convertit en track canonique; `fallback_images` sert pour les tracks
    /// d'album, qui n'embarquent pas leur pochette.
    pub fn to_track(&self, fallback_images: &[Image]) -> Track {
        let mut raw = RawTrack::titled(self.name.clone());
        for artist in &self.artists {
            raw = raw.artist(artist.name.clone());
        }

        let images = match &self.album {
            Some(album) if !album.images.is_empty() => album.images.as_slice(),
            _ => fallback_images,
        };
        for image in images {
            raw = raw.artwork(Artwork::new(image.url.clone(), image.width, image.height));
        }

        if let Some(ms) = self.duration_ms {
            raw = raw.duration(RawDuration::Millis(ms));
        }
        if let Some(url) = &self.external_urls.spotify {
            raw = raw.catalog_url(url.clone());
        }
        normalize(raw, Provider::Spotify)
    }
}

/// Page d'un objet paginé (`next` est une URL absolue)
#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
}

/// Entrée de playlist; `track` est null pour les titres retirés
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<SpotifyTrack>,
}

/// Réponse de `/playlists/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistResponse {
    pub name: String,
    pub tracks: Paging<PlaylistItem>,
}

/// Réponse de `/albums/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct AlbumResponse {
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub tracks: Paging<SpotifyTrack>,
}

/// Réponse de `/search?type=track`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Paging<SpotifyTrack>,
}

/// Playlist ou album résolu, toutes pages confondues
#[derive(Debug, Clone)]
pub struct SpotifyCollection {
    pub name: String,
    pub tracks: Vec<Track>,
}
