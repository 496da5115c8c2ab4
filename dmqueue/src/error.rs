//! Queue mutation errors

use dmsource::SourceError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueueError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Position 0 only changes through `play` and `next`
    #[error("The current track cannot be moved or removed")]
    ActiveTrackLocked,

    #[error("Index {index} is out of range (queue has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid message: {0}")]
    InvalidEvent(String),

    #[error(transparent)]
    Resolution(#[from] SourceError),
}

impl QueueError {
    /// Text sent in `error` events
    pub fn user_message(&self) -> String {
        match self {
            Self::ActiveTrackLocked => self.to_string(),
            Self::IndexOutOfRange { .. } => "No track at this position".to_string(),
            Self::InvalidEvent(_) => "Invalid message".to_string(),
            Self::Resolution(err) => err.user_message(),
        }
    }
}
