//! Extension de dmserver::Server pour le canal temps réel

use crate::dispatcher::QueueDispatcher;
use crate::ws::create_router;
use anyhow::Result;
use dmserver::Server;
use tracing::info;

/// Trait d'extension pour ajouter le canal WebSocket à un serveur dmserver
pub trait QueueServerExt {
    /// Enregistre `GET /ws`
    ///
    /// Chaque connexion ouvre une session avec sa propre file de lecture,
    /// détruite à la déconnexion.
    async fn init_queue_channel(&mut self, dispatcher: QueueDispatcher) -> Result<()>;
}

impl QueueServerExt for Server {
    async fn init_queue_channel(&mut self, dispatcher: QueueDispatcher) -> Result<()> {
        self.add_router("/", create_router(dispatcher)).await;
        info!("Real-time channel available at /ws");
        Ok(())
    }
}
