//! Sessions and their registry
//!
//! A session binds one live connection to one queue. It is inserted when
//! the connection opens and removed when it closes; queues are never
//! shared between sessions.

use crate::events::ServerEvent;
use crate::queue::Queue;
use crate::sequencer::Sequencer;
use dmsource::DisplayTrack;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, info};
use uuid::Uuid;

pub struct Session {
    id: Uuid,
    pub(crate) queue: Mutex<Queue>,
    pub(crate) sequencer: Sequencer,
    outbound: mpsc::UnboundedSender<ServerEvent>,
}

impl Session {
    pub fn new(outbound: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            queue: Mutex::new(Queue::new()),
            sequencer: Sequencer::new(),
            outbound,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Sends an event to the owning connection
    ///
    /// Returns `false` once the connection is gone.
    pub fn send(&self, event: ServerEvent) -> bool {
        match self.outbound.send(event) {
            Ok(()) => true,
            Err(_) => {
                debug!(session = %self.id, "Connection closed, event dropped");
                false
            }
        }
    }

    /// Current queue as clients see it
    pub async fn snapshot(&self) -> Vec<DisplayTrack> {
        self.queue.lock().await.to_display()
    }
}

/// Live sessions keyed by id
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connect(&self, outbound: mpsc::UnboundedSender<ServerEvent>) -> Arc<Session> {
        let session = Arc::new(Session::new(outbound));
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id(), session.clone());
        info!(session = %session.id(), active = sessions.len(), "Session opened");
        session
    }

    pub async fn disconnect(&self, id: Uuid) -> Option<Arc<Session>> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(&id);
        if removed.is_some() {
            info!(session = %id, active = sessions.len(), "Session closed");
        }
        removed
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lifecycle() {
        let registry = SessionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let first = registry.connect(tx.clone()).await;
        let second = registry.connect(tx).await;
        assert_ne!(first.id(), second.id());
        assert_eq!(registry.len().await, 2);

        assert!(registry.disconnect(first.id()).await.is_some());
        assert!(registry.get(first.id()).await.is_none());
        assert!(registry.disconnect(first.id()).await.is_none());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_send_after_close() {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::new(tx);
        assert!(session.send(ServerEvent::QueueEnded));
        drop(rx);
        assert!(!session.send(ServerEvent::QueueEnded));
    }
}
