//! Module d'accès au catalogue Spotify (tracks, playlists, albums, recherche)

use super::SpotifyApi;
use crate::error::Result;
use crate::models::*;
use dmsource::Track;
use tracing::debug;

/// Nombre maximum de pages suivies pour une playlist ou un album
pub const MAX_PAGES: usize = 10;

impl SpotifyApi {
    /// Récupère une track par son ID
    pub async fn get_track(&self, track_id: &str, token: &str) -> Result<Track> {
        let track: SpotifyTrack = self
            .get(&format!("/tracks/{}", track_id), token, &[("market", self.market.as_str())])
            .await?;
        Ok(track.to_track(&[]))
    }

    /// Récupère une playlist et toutes ses pages (dans la limite de `MAX_PAGES`)
    pub async fn get_playlist(&self, playlist_id: &str, token: &str) -> Result<SpotifyCollection> {
        let playlist: PlaylistResponse = self
            .get(
                &format!("/playlists/{}", playlist_id),
                token,
                &[("market", self.market.as_str())],
            )
            .await?;

        let mut tracks = Vec::new();
        let mut page = playlist.tracks;
        let mut pages = 1;
        loop {
            tracks.extend(
                page.items
                    .iter()
                    .filter_map(|item| item.track.as_ref())
                    .filter(|t| !t.is_episode())
                    .map(|t| t.to_track(&[])),
            );

            match page.next.take() {
                Some(next) if pages < MAX_PAGES => {
                    debug!("Following playlist page {}: {}", pages + 1, next);
                    page = self.get_url(&next, token, &[]).await?;
                    pages += 1;
                }
                _ => break,
            }
        }

        Ok(SpotifyCollection {
            name: playlist.name,
            tracks,
        })
    }

    /// Récupère un album et ses tracks
    pub async fn get_album(&self, album_id: &str, token: &str) -> Result<SpotifyCollection> {
        let album: AlbumResponse = self
            .get(&format!("/albums/{}", album_id), token, &[("market", self.market.as_str())])
            .await?;

        let mut tracks = Vec::new();
        let mut page = album.tracks;
        let mut pages = 1;
        loop {
            tracks.extend(page.items.iter().map(|t| t.to_track(&album.images)));

            match page.next.take() {
                Some(next) if pages < MAX_PAGES => {
                    page = self.get_url(&next, token, &[]).await?;
                    pages += 1;
                }
                _ => break,
            }
        }

        Ok(SpotifyCollection {
            name: album.name,
            tracks,
        })
    }

    /// Recherche la meilleure track correspondant au texte
    pub async fn search_track(&self, query: &str, token: &str) -> Result<Option<Track>> {
        let response: SearchResponse = self
            .get(
                "/search",
                token,
                &[
                    ("q", query),
                    ("type", "track"),
                    ("limit", "1"),
                    ("market", self.market.as_str()),
                ],
            )
            .await?;

        Ok(response.tracks.items.first().map(|t| t.to_track(&[])))
    }
}
