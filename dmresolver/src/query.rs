//! Inbound query shapes

use serde::{Deserialize, Serialize};

/// What a client asks to play or enqueue
///
/// Either a raw string (catalog URL or search text) or an in-app playlist
/// whose entries are classified one by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Query {
    Text(String),
    InHouse(InHousePlaylist),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InHousePlaylist {
    /// Always `true` on the wire
    #[serde(default)]
    pub inhouse: bool,
    #[serde(default)]
    pub tracks: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Query {
    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::InHouse(playlist) => format!(
                "in-house playlist {:?} ({} entries)",
                playlist.name.as_deref().unwrap_or(""),
                playlist.tracks.len()
            ),
        }
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shapes() {
        let query: Query = serde_json::from_value(json!("daft punk")).unwrap();
        assert_eq!(query, Query::Text("daft punk".into()));

        let query: Query = serde_json::from_value(json!({
            "inhouse": true,
            "tracks": ["https://youtu.be/dQw4w9WgXcQ", "daft punk"],
            "name": "Mine"
        }))
        .unwrap();
        match query {
            Query::InHouse(playlist) => {
                assert!(playlist.inhouse);
                assert_eq!(playlist.tracks.len(), 2);
                assert_eq!(playlist.name.as_deref(), Some("Mine"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
