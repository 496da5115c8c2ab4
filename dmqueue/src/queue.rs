//! Session queue and its mutations
//!
//! `entries[0]`, when present, is the track currently playing. Only
//! [`Queue::replace`] and [`Queue::advance`] change it.

use crate::error::{QueueError, Result};
use dmsource::{DisplayTrack, Track};
use uuid::Uuid;

/// A track held by a queue, with a stable identity across moves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: Uuid,
    pub track: Track,
}

impl QueueEntry {
    pub fn new(track: Track) -> Self {
        Self {
            id: Uuid::new_v4(),
            track,
        }
    }
}

/// Outcome of [`Queue::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A new track is at the head
    Next,
    /// The queue had one track or none and is now empty
    Ended,
}

#[derive(Debug, Clone, Default)]
pub struct Queue {
    entries: Vec<QueueEntry>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.entries.iter().map(|entry| &entry.track)
    }

    pub fn current(&self) -> Option<&QueueEntry> {
        self.entries.first()
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut QueueEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    /// Normalized snapshot sent in `queueUpdate`
    pub fn to_display(&self) -> Vec<DisplayTrack> {
        self.tracks().map(Track::to_display).collect()
    }

    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.entries = tracks.into_iter().map(QueueEntry::new).collect();
    }

    pub fn append(&mut self, tracks: Vec<Track>) {
        self.entries.extend(tracks.into_iter().map(QueueEntry::new));
    }

    /// Drops the head; a queue of one track (or none) is cleared
    pub fn advance(&mut self) -> Advance {
        if self.entries.len() > 1 {
            self.entries.remove(0);
            Advance::Next
        } else {
            self.entries.clear();
            Advance::Ended
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index == 0 {
            return Err(QueueError::ActiveTrackLocked);
        }
        if index >= self.entries.len() {
            return Err(QueueError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Track> {
        self.check_index(index)?;
        Ok(self.entries.remove(index).track)
    }

    /// Moves the track at `from` to `to`; neither may be the head
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        Ok(())
    }

    /// Moves the track at `index` right after the head
    pub fn play_next(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        if index > 1 {
            self.move_track(index, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmsource::Provider;

    fn track(title: &str) -> Track {
        Track {
            title: title.to_string(),
            artists: vec!["Artist".to_string()],
            album_cover_url: String::new(),
            duration_seconds: Some(65),
            surrogate: None,
            provider: Provider::YouTube,
            catalog_url: None,
        }
    }

    fn queue(titles: &[&str]) -> Queue {
        let mut queue = Queue::new();
        queue.replace(titles.iter().map(|t| track(t)).collect());
        queue
    }

    fn titles(queue: &Queue) -> Vec<&str> {
        queue.tracks().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_append_keeps_head() {
        let mut q = queue(&["a"]);
        q.append(vec![track("b"), track("c")]);
        assert_eq!(titles(&q), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_advance() {
        let mut q = queue(&["a", "b"]);
        assert_eq!(q.advance(), Advance::Next);
        assert_eq!(titles(&q), vec!["b"]);
        assert_eq!(q.advance(), Advance::Ended);
        assert!(q.is_empty());
        assert_eq!(q.advance(), Advance::Ended);
    }

    #[test]
    fn test_head_is_locked() {
        let mut q = queue(&["a", "b", "c"]);
        assert_eq!(q.remove(0), Err(QueueError::ActiveTrackLocked));
        assert_eq!(q.move_track(0, 2), Err(QueueError::ActiveTrackLocked));
        assert_eq!(q.move_track(2, 0), Err(QueueError::ActiveTrackLocked));
        assert_eq!(q.play_next(0), Err(QueueError::ActiveTrackLocked));
        assert_eq!(titles(&q), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_out_of_range() {
        let mut q = queue(&["a", "b"]);
        assert_eq!(
            q.remove(2),
            Err(QueueError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert!(q.move_track(1, 5).is_err());
        assert_eq!(titles(&q), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_and_move() {
        let mut q = queue(&["a", "b", "c", "d"]);
        assert_eq!(q.remove(2).unwrap().title, "c");
        assert_eq!(titles(&q), vec!["a", "b", "d"]);

        q.move_track(1, 2).unwrap();
        assert_eq!(titles(&q), vec!["a", "d", "b"]);
    }

    #[test]
    fn test_play_next() {
        let mut q = queue(&["a", "b", "c", "d"]);
        q.play_next(3).unwrap();
        assert_eq!(titles(&q), vec!["a", "d", "b", "c"]);
        q.play_next(1).unwrap();
        assert_eq!(titles(&q), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_entry_ids_follow_moves() {
        let mut q = queue(&["a", "b", "c"]);
        let id = q.entries()[2].id;
        q.play_next(2).unwrap();
        assert_eq!(q.entries()[1].id, id);
        assert_eq!(q.get_mut(id).unwrap().track.title, "c");
    }

    #[test]
    fn test_display_snapshot() {
        let q = queue(&["a"]);
        let snapshot = q.to_display();
        assert_eq!(snapshot[0].duration, "1:05");
        assert!(!snapshot[0].playable);
    }
}
