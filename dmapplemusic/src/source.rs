//! Implémentation de `CatalogResolver` pour Apple Music
//!
//! Le storefront de la référence (extrait de l'URL) prime sur celui
//! de la configuration.

use crate::client::AppleMusicClient;
use async_trait::async_trait;
use dmsource::{
    CatalogRef, CatalogResolver, Collection, EntityKind, Provider, Result, SourceError, Track,
};

#[async_trait]
impl CatalogResolver for AppleMusicClient {
    fn provider(&self) -> Provider {
        Provider::AppleMusic
    }

    async fn resolve_track(&self, reference: &CatalogRef) -> Result<Track> {
        Ok(self
            .get_song(&reference.id, reference.storefront.as_deref())
            .await?)
    }

    async fn resolve_collection(&self, reference: &CatalogRef) -> Result<Collection> {
        let storefront = reference.storefront.as_deref();
        match reference.kind {
            EntityKind::Playlist => Ok(self.get_playlist(&reference.id, storefront).await?),
            EntityKind::Album => Ok(self.get_album(&reference.id, storefront).await?),
            EntityKind::Track => Err(SourceError::InvalidRequest(format!(
                "{} is a song, not a collection",
                reference.id
            ))),
        }
    }
}
