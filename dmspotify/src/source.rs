//! Implémentation de `CatalogResolver` pour Spotify
//!
//! Les tracks Spotify n'ont pas de substitut jouable: la chaîne de
//! résolution le cherche ensuite via le `SurrogateFinder`.

use crate::client::SpotifyClient;
use async_trait::async_trait;
use dmsource::{
    CatalogRef, CatalogResolver, Collection, EntityKind, Provider, Result, SourceError, Track,
};

#[async_trait]
impl CatalogResolver for SpotifyClient {
    fn provider(&self) -> Provider {
        Provider::Spotify
    }

    async fn resolve_track(&self, reference: &CatalogRef) -> Result<Track> {
        Ok(self.get_track(&reference.id).await?)
    }

    async fn resolve_collection(&self, reference: &CatalogRef) -> Result<Collection> {
        let collection = match reference.kind {
            EntityKind::Playlist => self.get_playlist(&reference.id).await?,
            EntityKind::Album => self.get_album(&reference.id).await?,
            EntityKind::Track => {
                return Err(SourceError::InvalidRequest(format!(
                    "{} is a track, not a collection",
                    reference.id
                )));
            }
        };

        Ok(Collection {
            name: collection.name,
            provider: Provider::Spotify,
            tracks: collection.tracks,
        })
    }

    async fn search_track(&self, text: &str) -> Result<Option<Track>> {
        Ok(SpotifyClient::search_track(self, text).await?)
    }
}
