//! Query classification
//!
//! A query is tested against an ordered table of URL patterns; the first
//! rule that matches decides the catalog and entity kind. Collections come
//! before single items so that a watch URL carrying a `list=` parameter is
//! treated as the playlist.

use dmsource::{CatalogRef, EntityKind, Provider};
use regex::Regex;
use tracing::debug;

/// Outcome of [`Classifier::classify`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A recognized catalog identifier
    Catalog(CatalogRef),
    /// No pattern matched: free-text search
    Unclassified(String),
}

struct Rule {
    name: &'static str,
    provider: Provider,
    kind: EntityKind,
    /// Must capture `id`; may capture `sf` (storefront)
    pattern: Regex,
    /// The rule is skipped when this also matches
    unless: Option<Regex>,
}

impl Rule {
    fn new(
        name: &'static str,
        provider: Provider,
        kind: EntityKind,
        pattern: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            provider,
            kind,
            pattern: Regex::new(pattern)?,
            unless: None,
        })
    }

    fn unless(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.unless = Some(Regex::new(pattern)?);
        Ok(self)
    }

    fn apply(&self, input: &str) -> Option<CatalogRef> {
        if self.unless.as_ref().is_some_and(|re| re.is_match(input)) {
            return None;
        }
        let captures = self.pattern.captures(input)?;
        let id = captures.name("id")?.as_str();

        let mut reference = CatalogRef::new(self.provider, self.kind, id);
        if let Some(storefront) = captures.name("sf") {
            reference = reference.with_storefront(storefront.as_str().to_lowercase());
        }
        Some(reference)
    }
}

const SPOTIFY_WEB: &str = r"open\.spotify\.com/(?:intl-[\w-]+/)?(?:embed/)?";
const APPLE_WEB: &str = r"music\.apple\.com/(?:(?P<sf>[a-zA-Z]{2})/)?";

/// Ordered pattern table
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    pub fn new() -> Result<Self, regex::Error> {
        let rules = vec![
            // 1. YouTube playlist
            Rule::new(
                "youtube-playlist",
                Provider::YouTube,
                EntityKind::Playlist,
                r"(?:youtube\.com|youtu\.be)/\S*[?&]list=(?P<id>[\w-]+)",
            )?,
            // 2. YouTube video
            Rule::new(
                "youtube-video",
                Provider::YouTube,
                EntityKind::Track,
                r"(?:youtube\.com/(?:watch\?(?:\S*&)?v=|shorts/|embed/|live/)|youtu\.be/)(?P<id>[\w-]{11})",
            )?,
            // 3. Spotify playlist, then album
            Rule::new(
                "spotify-playlist",
                Provider::Spotify,
                EntityKind::Playlist,
                &format!(
                    r"(?:{}(?:user/[^/\s]+/)?playlist/|spotify:(?:user:[^:\s]+:)?playlist:)(?P<id>[A-Za-z0-9]+)",
                    SPOTIFY_WEB
                ),
            )?,
            Rule::new(
                "spotify-album",
                Provider::Spotify,
                EntityKind::Album,
                &format!(r"(?:{}album/|spotify:album:)(?P<id>[A-Za-z0-9]+)", SPOTIFY_WEB),
            )?,
            // 4. Apple Music playlist, then album without a selected song
            Rule::new(
                "applemusic-playlist",
                Provider::AppleMusic,
                EntityKind::Playlist,
                &format!(r"{}playlist/(?:[^/\s]+/)?(?P<id>pl\.[\w-]+)", APPLE_WEB),
            )?,
            Rule::new(
                "applemusic-album",
                Provider::AppleMusic,
                EntityKind::Album,
                &format!(r"{}album/(?:[^/\s?]+/)?(?P<id>\d+)", APPLE_WEB),
            )?
            .unless(r"music\.apple\.com/\S*[?&]i=\d+")?,
            // 5. Apple Music song (album link with ?i= or song link)
            Rule::new(
                "applemusic-album-song",
                Provider::AppleMusic,
                EntityKind::Track,
                &format!(r"{}album/[^?\s]*\?(?:\S*&)?i=(?P<id>\d+)", APPLE_WEB),
            )?,
            Rule::new(
                "applemusic-song",
                Provider::AppleMusic,
                EntityKind::Track,
                &format!(r"{}song/(?:[^/\s]+/)?(?P<id>\d+)", APPLE_WEB),
            )?,
            // 6. Spotify track
            Rule::new(
                "spotify-track",
                Provider::Spotify,
                EntityKind::Track,
                &format!(r"(?:{}track/|spotify:track:)(?P<id>[A-Za-z0-9]+)", SPOTIFY_WEB),
            )?,
        ];
        Ok(Self { rules })
    }

    /// First matching rule wins; otherwise the trimmed text is a search
    pub fn classify(&self, input: &str) -> Classification {
        let input = input.trim();
        for rule in &self.rules {
            if let Some(reference) = rule.apply(input) {
                debug!(rule = rule.name, id = %reference.id, "Query classified");
                return Classification::Catalog(reference);
            }
        }
        Classification::Unclassified(input.to_string())
    }

    /// First single-item identifier in `input`, ignoring collection rules
    ///
    /// Used when a collection lookup fails and the same input also names one
    /// item (a watch URL with both `v=` and `list=`).
    pub fn classify_item(&self, input: &str) -> Option<CatalogRef> {
        let input = input.trim();
        self.rules
            .iter()
            .filter(|rule| !rule.kind.is_collection())
            .find_map(|rule| rule.apply(input))
    }
}
