//! # DMQueue
//!
//! Session-scoped playback queues driven by client events.
//!
//! - [`queue`]: the queue and its mutations (`queue[0]` is the current track)
//! - [`sequencer`]: per-session commit turnstile
//! - [`session`]: sessions and their registry
//! - [`events`]: wire events (`play`, `addToQueue`, `queueUpdate`...)
//! - [`dispatcher`]: one task per event, resolution then ordered commit
//! - `ws` (feature `dmserver`): WebSocket transport at `/ws`

pub mod dispatcher;
pub mod error;
pub mod events;
pub mod queue;
pub mod sequencer;
pub mod session;

#[cfg(feature = "dmserver")]
pub mod ws;
#[cfg(feature = "dmserver")]
mod server_ext;

pub use dispatcher::QueueDispatcher;
pub use error::{QueueError, Result};
pub use events::{ClientEvent, ServerEvent};
pub use queue::{Advance, Queue, QueueEntry};
pub use session::{Session, SessionRegistry};

#[cfg(feature = "dmserver")]
pub use server_ext::QueueServerExt;
