//! Metadata normalization
//!
//! Providers disagree on record shapes: durations come as seconds,
//! milliseconds or preformatted strings, artists as a list or a single
//! name, artwork as a size list or a URL template. [`normalize`] maps a
//! [`RawTrack`] onto the canonical [`Track`].

use crate::model::{Provider, Surrogate, Track, UNKNOWN_ARTIST};

/// Title used when a provider returns none
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Duration as reported by a provider
#[derive(Debug, Clone, PartialEq)]
pub enum RawDuration {
    Seconds(f64),
    Millis(u64),
    /// `"m:ss"`, `"h:mm:ss"` or a bare number of seconds
    Formatted(String),
}

/// Coerces a provider duration into whole seconds.
///
/// Returns `None` for negative, non-finite or unparseable values.
pub fn normalize_duration(raw: &RawDuration) -> Option<u32> {
    match raw {
        RawDuration::Seconds(secs) if secs.is_finite() && *secs >= 0.0 => {
            u32::try_from(secs.round() as u64).ok()
        }
        RawDuration::Seconds(_) => None,
        RawDuration::Millis(ms) => u32::try_from(ms.saturating_add(500) / 1000).ok(),
        RawDuration::Formatted(text) => parse_clock(text),
    }
}

fn parse_clock(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let mut total: u32 = 0;
    for part in text.split(':') {
        let value: u32 = part.trim().parse().ok()?;
        total = total.checked_mul(60)?.checked_add(value)?;
    }
    Some(total)
}

/// Renders seconds as `m:ss` (minutes are not folded into hours).
///
/// Unknown durations render as `-`.
pub fn format_duration(seconds: Option<u32>) -> String {
    match seconds {
        Some(secs) => format!("{}:{:02}", secs / 60, secs % 60),
        None => "-".to_string(),
    }
}

/// One artwork candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Artwork {
    pub fn new(url: impl Into<String>, width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            url: url.into(),
            width,
            height,
        }
    }

    fn area(&self) -> u64 {
        u64::from(self.width.unwrap_or(0)) * u64::from(self.height.unwrap_or(0))
    }
}

/// Highest-resolution artwork URL, or empty when none is usable.
///
/// Candidates without dimensions only win when nothing else is sized; ties
/// keep the first candidate.
pub fn pick_artwork(candidates: &[Artwork]) -> String {
    let mut best: Option<&Artwork> = None;
    for candidate in candidates.iter().filter(|a| !a.url.trim().is_empty()) {
        match best {
            Some(current) if candidate.area() <= current.area() => {}
            _ => best = Some(candidate),
        }
    }
    best.map(|a| a.url.clone()).unwrap_or_default()
}

/// Fills an Apple-style artwork template (`{w}x{h}bb.{f}`) with a square size.
pub fn apple_artwork(template: &str, size: u32) -> String {
    template
        .replace("{w}", &size.to_string())
        .replace("{h}", &size.to_string())
        .replace("{f}", "jpg")
}

/// Provider record before normalization
#[derive(Debug, Clone, Default)]
pub struct RawTrack {
    pub title: Option<String>,
    pub artists: Vec<String>,
    pub artwork: Vec<Artwork>,
    pub duration: Option<RawDuration>,
    pub surrogate: Option<Surrogate>,
    pub catalog_url: Option<String>,
}

impl RawTrack {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn artist(mut self, name: impl Into<String>) -> Self {
        self.artists.push(name.into());
        self
    }

    pub fn artwork(mut self, artwork: Artwork) -> Self {
        self.artwork.push(artwork);
        self
    }

    pub fn duration(mut self, duration: RawDuration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn surrogate(mut self, surrogate: Surrogate) -> Self {
        self.surrogate = Some(surrogate);
        self
    }

    pub fn catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_url = Some(url.into());
        self
    }
}

/// Maps a provider record onto the canonical [`Track`]
pub fn normalize(raw: RawTrack, provider: Provider) -> Track {
    let title = raw
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let mut artists: Vec<String> = raw
        .artists
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    if artists.is_empty() {
        artists.push(UNKNOWN_ARTIST.to_string());
    }

    Track {
        title,
        artists,
        album_cover_url: pick_artwork(&raw.artwork),
        duration_seconds: raw.duration.as_ref().and_then(normalize_duration),
        surrogate: raw.surrogate,
        provider,
        catalog_url: raw.catalog_url,
    }
}
