//! Event dispatcher
//!
//! One task per inbound event. Resolution runs concurrently; queue changes
//! commit inside the session's turn, in dispatch order, and only once
//! resolution has fully succeeded. The one exception is the surrogate found
//! after a `next`, which is patched onto its entry by id.

use crate::error::{QueueError, Result};
use crate::events::{ClientEvent, ServerEvent};
use crate::queue::{Advance, Queue};
use crate::sequencer::{Ticket, Turn};
use crate::session::{Session, SessionRegistry};
use dmresolver::{Query, Resolver};
use dmsource::SourceError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct QueueDispatcher {
    resolver: Arc<Resolver>,
    sessions: Arc<SessionRegistry>,
}

impl QueueDispatcher {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self {
            resolver,
            sessions: Arc::new(SessionRegistry::new()),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Opens a session and sends it the empty queue
    pub async fn connect(&self, outbound: mpsc::UnboundedSender<ServerEvent>) -> Arc<Session> {
        let session = self.sessions.connect(outbound).await;
        session.send(ServerEvent::QueueUpdate { queue: Vec::new() });
        session
    }

    pub async fn disconnect(&self, session: &Session) {
        self.sessions.disconnect(session.id()).await;
    }

    /// Takes the session's next ticket and handles `event` on its own task
    pub fn dispatch(&self, session: &Arc<Session>, event: ClientEvent) -> JoinHandle<()> {
        let ticket = session.sequencer.ticket();
        let dispatcher = self.clone();
        let session = session.clone();
        tokio::spawn(async move { dispatcher.handle(&session, event, ticket).await })
    }

    /// Runs one event; failures become an `error` event
    pub async fn handle(&self, session: &Session, event: ClientEvent, ticket: Ticket) {
        let name = event.name();
        debug!(session = %session.id(), event = name, "Handling event");

        let result = match event {
            ClientEvent::Play { query } => self.play(session, &query, ticket).await,
            ClientEvent::AddToQueue { query } => self.add_to_queue(session, &query, ticket).await,
            ClientEvent::Next => self.next(session, ticket).await,
            ClientEvent::Remove { index } => {
                self.mutate(session, ticket, |queue| queue.remove(index).map(drop))
                    .await
            }
            ClientEvent::MoveTrack {
                from_index,
                to_index,
            } => {
                self.mutate(session, ticket, |queue| queue.move_track(from_index, to_index))
                    .await
            }
            ClientEvent::PlayNext { index } => {
                self.mutate(session, ticket, |queue| queue.play_next(index))
                    .await
            }
        };

        if let Err(err) = result {
            match &err {
                QueueError::Resolution(source) => {
                    warn!(session = %session.id(), event = name, "Resolution failed: {}", source)
                }
                other => debug!(session = %session.id(), event = name, "Rejected: {}", other),
            }
            session.send(ServerEvent::error(err.user_message()));
        }
    }

    /// Replaces the queue and starts its first track
    ///
    /// The head's surrogate is looked up before the commit. When that lookup
    /// fails the queue is still committed and an error replaces the directive.
    async fn play(&self, session: &Session, query: &Query, ticket: Ticket) -> Result<()> {
        let mut resolution = self.resolver.resolve(query).await?;
        let Some(head) = resolution.tracks.first_mut() else {
            return Err(SourceError::NotFound(query.describe()).into());
        };
        let surrogate_error = self.resolver.ensure_surrogate(head).await.err();

        let _turn = ticket.turn().await;
        let (snapshot, surrogate) = {
            let mut queue = session.queue.lock().await;
            queue.replace(resolution.tracks);
            (
                queue.to_display(),
                queue.current().and_then(|entry| entry.track.surrogate.clone()),
            )
        };
        info!(
            session = %session.id(),
            tracks = snapshot.len(),
            "Playing {}",
            query.describe()
        );

        session.send(ServerEvent::QueueUpdate { queue: snapshot });
        match (surrogate, surrogate_error) {
            (Some(surrogate), _) => {
                session.send(ServerEvent::directive(&surrogate));
            }
            (None, Some(err)) => {
                warn!(session = %session.id(), "No playable surrogate: {}", err);
                session.send(ServerEvent::error(err.user_message()));
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Appends without touching the current track
    async fn add_to_queue(&self, session: &Session, query: &Query, ticket: Ticket) -> Result<()> {
        let resolution = self.resolver.resolve(query).await?;
        if resolution.tracks.is_empty() {
            return Err(SourceError::NotFound(query.describe()).into());
        }

        let _turn = ticket.turn().await;
        let snapshot = {
            let mut queue = session.queue.lock().await;
            queue.append(resolution.tracks);
            queue.to_display()
        };
        debug!(session = %session.id(), tracks = snapshot.len(), "Queue extended");
        session.send(ServerEvent::QueueUpdate { queue: snapshot });
        Ok(())
    }

    /// Advances playback
    ///
    /// The turn is released once the advance is committed: the new head's
    /// surrogate is looked up outside it, so later events for the session
    /// never wait on that search. The result is patched in by entry id and
    /// the directive is sent only if that entry is still playing.
    async fn next(&self, session: &Session, ticket: Ticket) -> Result<()> {
        let turn = ticket.turn().await;
        let (advance, snapshot, head) = {
            let mut queue = session.queue.lock().await;
            let advance = queue.advance();
            (advance, queue.to_display(), queue.current().cloned())
        };
        session.send(ServerEvent::QueueUpdate { queue: snapshot });
        drop(turn);

        let head = match (advance, head) {
            (Advance::Next, Some(head)) => head,
            _ => {
                info!(session = %session.id(), "Queue ended");
                session.send(ServerEvent::QueueEnded);
                return Ok(());
            }
        };

        if let Some(surrogate) = &head.track.surrogate {
            session.send(ServerEvent::directive(surrogate));
            return Ok(());
        }

        let mut track = head.track;
        self.resolver.ensure_surrogate(&mut track).await?;
        let Some(surrogate) = track.surrogate.clone() else {
            return Ok(());
        };

        let (snapshot, still_playing) = {
            let mut queue = session.queue.lock().await;
            let Some(entry) = queue.get_mut(head.id) else {
                debug!(session = %session.id(), "Track left the queue during its lookup");
                return Ok(());
            };
            entry.track = track;
            let still_playing = queue.current().is_some_and(|entry| entry.id == head.id);
            (queue.to_display(), still_playing)
        };

        session.send(ServerEvent::QueueUpdate { queue: snapshot });
        if still_playing {
            session.send(ServerEvent::directive(&surrogate));
        }
        Ok(())
    }

    /// Local reordering; no directive
    async fn mutate<F>(&self, session: &Session, ticket: Ticket, op: F) -> Result<()>
    where
        F: FnOnce(&mut Queue) -> Result<()>,
    {
        let _turn: Turn = ticket.turn().await;
        let snapshot = {
            let mut queue = session.queue.lock().await;
            op(&mut queue)?;
            queue.to_display()
        };
        session.send(ServerEvent::QueueUpdate { queue: snapshot });
        Ok(())
    }
}
