//! Data models extracted from YouTube pages

use dmsource::normalize::{Artwork, RawDuration, RawTrack};
use dmsource::{normalize, Provider, Surrogate, Track};
use serde::{Deserialize, Serialize};

/// Canonical watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// A thumbnail candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// One video, from a search result, a playlist entry or a watch page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    /// Channel name
    pub author: String,
    /// `None` for live streams
    pub duration_seconds: Option<u32>,
    pub thumbnails: Vec<Thumbnail>,
}

impl Video {
    pub fn url(&self) -> String {
        watch_url(&self.id)
    }

    /// Videos are their own surrogate
    pub fn to_track(&self) -> Track {
        let url = self.url();
        let mut raw = RawTrack::titled(self.title.clone())
            .artist(self.author.clone())
            .surrogate(Surrogate::youtube(url.clone()))
            .catalog_url(url);
        if let Some(secs) = self.duration_seconds {
            raw = raw.duration(RawDuration::Seconds(f64::from(secs)));
        }
        for thumb in &self.thumbnails {
            raw = raw.artwork(Artwork::new(thumb.url.clone(), thumb.width, thumb.height));
        }
        normalize(raw, Provider::YouTube)
    }
}

/// A playlist page, truncated to the client's page limit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub videos: Vec<Video>,
}
