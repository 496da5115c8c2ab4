//! Wire events of the real-time channel
//!
//! JSON text frames, internally tagged by `event`:
//!
//! ```json
//! {"event": "play", "query": "https://youtu.be/dQw4w9WgXcQ"}
//! {"event": "moveTrack", "fromIndex": 1, "toIndex": 3}
//! {"event": "queueUpdate", "queue": [...]}
//! ```

use dmresolver::Query;
use dmsource::{DisplayTrack, Surrogate, SurrogateKind};
use serde::{Deserialize, Serialize};

/// Inbound events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientEvent {
    Play {
        query: Query,
    },
    AddToQueue {
        query: Query,
    },
    Next,
    Remove {
        index: usize,
    },
    #[serde(rename_all = "camelCase")]
    MoveTrack {
        from_index: usize,
        to_index: usize,
    },
    PlayNext {
        index: usize,
    },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play { .. } => "play",
            Self::AddToQueue { .. } => "addToQueue",
            Self::Next => "next",
            Self::Remove { .. } => "remove",
            Self::MoveTrack { .. } => "moveTrack",
            Self::PlayNext { .. } => "playNext",
        }
    }
}

/// Outbound events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ServerEvent {
    QueueUpdate { queue: Vec<DisplayTrack> },
    PlayYouTube { url: String },
    PlayAppleMusic { url: String },
    QueueEnded,
    Error { message: String },
}

impl ServerEvent {
    /// "Start playback" directive for the player that opens `surrogate`
    pub fn directive(surrogate: &Surrogate) -> Self {
        match surrogate.kind {
            SurrogateKind::YouTube => Self::PlayYouTube {
                url: surrogate.url.clone(),
            },
            SurrogateKind::AppleMusic => Self::PlayAppleMusic {
                url: surrogate.url.clone(),
            },
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_directive(&self) -> bool {
        matches!(self, Self::PlayYouTube { .. } | Self::PlayAppleMusic { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmresolver::InHousePlaylist;
    use serde_json::json;

    #[test]
    fn test_inbound_frames() {
        let event: ClientEvent =
            serde_json::from_value(json!({"event": "play", "query": "daft punk"})).unwrap();
        assert_eq!(
            event,
            ClientEvent::Play {
                query: Query::from("daft punk")
            }
        );

        let event: ClientEvent =
            serde_json::from_value(json!({"event": "moveTrack", "fromIndex": 1, "toIndex": 3}))
                .unwrap();
        assert_eq!(
            event,
            ClientEvent::MoveTrack {
                from_index: 1,
                to_index: 3
            }
        );

        let event: ClientEvent = serde_json::from_value(json!({"event": "next"})).unwrap();
        assert_eq!(event, ClientEvent::Next);

        let event: ClientEvent = serde_json::from_value(json!({
            "event": "addToQueue",
            "query": {"inhouse": true, "tracks": ["a", "b"], "name": "Mine"}
        }))
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::AddToQueue {
                query: Query::InHouse(InHousePlaylist {
                    inhouse: true,
                    tracks: vec!["a".into(), "b".into()],
                    name: Some("Mine".into()),
                })
            }
        );
    }

    #[test]
    fn test_unknown_or_incomplete_frames_fail() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"shuffle"}"#).is_err());
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"remove"}"#).is_err());
        assert!(serde_json::from_str::<ClientEvent>("not json").is_err());
    }

    #[test]
    fn test_outbound_frames() {
        let directive = ServerEvent::directive(&Surrogate::youtube("https://youtu.be/x"));
        assert_eq!(
            serde_json::to_value(&directive).unwrap(),
            json!({"event": "playYouTube", "url": "https://youtu.be/x"})
        );

        let directive = ServerEvent::directive(&Surrogate::apple_music("https://music.apple.com/x"));
        assert_eq!(
            serde_json::to_value(&directive).unwrap()["event"],
            "playAppleMusic"
        );

        assert_eq!(
            serde_json::to_value(ServerEvent::QueueEnded).unwrap(),
            json!({"event": "queueEnded"})
        );
        assert_eq!(
            serde_json::to_value(ServerEvent::QueueUpdate { queue: vec![] }).unwrap(),
            json!({"event": "queueUpdate", "queue": []})
        );
    }
}
