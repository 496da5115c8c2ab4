//! Per-session commit turnstile
//!
//! Handlers take a [`Ticket`] when their event is dispatched, resolve
//! concurrently, then wait for their [`Turn`] before mutating the queue.
//! Turns are granted in ticket order.

use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;

#[derive(Debug, Default)]
pub struct Sequencer {
    tail: Mutex<Option<oneshot::Receiver<()>>>,
}

/// Place in line, taken at dispatch time
#[derive(Debug)]
pub struct Ticket {
    previous: Option<oneshot::Receiver<()>>,
    done: oneshot::Sender<()>,
}

/// Exclusive commit window; dropping it lets the next ticket through
#[derive(Debug)]
pub struct Turn {
    _done: oneshot::Sender<()>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> Ticket {
        let (done, released) = oneshot::channel();
        let mut tail = self.tail.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = tail.replace(released);
        Ticket { previous, done }
    }
}

impl Ticket {
    /// Waits until every earlier ticket has released its turn
    pub async fn turn(mut self) -> Turn {
        if let Some(previous) = self.previous.take() {
            // Completes when the previous turn's sender is dropped
            let _ = previous.await;
        }
        Turn { _done: self.done }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_turns_follow_ticket_order() {
        let sequencer = Sequencer::new();
        let order = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for (label, delay) in [("first", 30), ("second", 10), ("third", 0)] {
            let ticket = sequencer.ticket();
            let order = order.clone();
            handles.push(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                let _turn = ticket.turn().await;
                order.lock().await.push(label);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*order.lock().await, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_dropped_ticket_releases_successor() {
        let sequencer = Sequencer::new();
        let abandoned = sequencer.ticket();
        let next = sequencer.ticket();
        drop(abandoned);
        tokio_test::assert_ready!(tokio_test::task::spawn(next.turn()).poll());
    }
}
