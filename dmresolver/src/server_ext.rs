//! Extension de dmserver::Server pour les endpoints de lookup
//!
//! `dmserver` ne dépend pas de `dmresolver` : ce trait ajoute les routes
//! depuis l'extérieur, comme les autres extensions de serveur.

use crate::api_rest::{ApiDoc, create_router};
use crate::resolver::Resolver;
use anyhow::Result;
use dmserver::Server;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

/// Trait d'extension pour ajouter l'API de lookup à un serveur dmserver
pub trait ResolverServerExt {
    /// Enregistre les endpoints de lookup et leur documentation
    ///
    /// # Routes enregistrées
    ///
    /// - `POST /api/spotify` - Piste, playlist ou album Spotify
    /// - `POST /api/applemusic` - Morceau, playlist ou album Apple Music
    /// - `POST /api/youtube` - Vidéo ou playlist YouTube
    /// - `GET /swagger-ui/lookup` - Documentation interactive
    async fn init_lookup_api(&mut self, resolver: Arc<Resolver>) -> Result<()>;
}

impl ResolverServerExt for Server {
    async fn init_lookup_api(&mut self, resolver: Arc<Resolver>) -> Result<()> {
        let router = create_router(resolver);
        self.add_openapi(router, ApiDoc::openapi(), "lookup").await;

        info!("Lookup API available at /api/{{spotify,applemusic,youtube}}");
        Ok(())
    }
}
