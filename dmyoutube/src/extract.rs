//! Extraction of the JSON blobs embedded in YouTube pages
//!
//! Search, watch and playlist pages carry their data as JavaScript
//! assignments (`var ytInitialData = {...};`) inside `<script>` tags. We
//! locate the script with `scraper`, then let `serde_json` read exactly one
//! JSON value after the assignment, ignoring whatever follows.

use crate::error::{Result, YouTubeError};
use crate::models::{Playlist, Thumbnail, Video};
use dmsource::normalize::{normalize_duration, RawDuration};
use scraper::{Html, Selector};
use serde_json::Value;

pub const INITIAL_DATA: &str = "ytInitialData";
pub const INITIAL_PLAYER_RESPONSE: &str = "ytInitialPlayerResponse";

/// Finds `marker = {...}` in the page scripts and parses the object.
pub fn embedded_json(html: &str, marker: &str) -> Result<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script")
        .map_err(|e| YouTubeError::scraping_error(format!("Invalid selector: {:?}", e)))?;

    for script in document.select(&selector) {
        let text: String = script.text().collect();
        let mut rest = text.as_str();

        while let Some(pos) = rest.find(marker) {
            let after = &rest[pos + marker.len()..];
            if let Some(start) = after.find('{') {
                let between = &after[..start];
                let is_assignment = between.contains('=')
                    && between
                        .chars()
                        .all(|c| c.is_whitespace() || matches!(c, '=' | '"' | '\'' | ']'));
                if is_assignment {
                    let mut values =
                        serde_json::Deserializer::from_str(&after[start..]).into_iter::<Value>();
                    if let Some(value) = values.next() {
                        return Ok(value?);
                    }
                }
            }
            rest = after;
        }
    }

    Err(YouTubeError::scraping_error(format!(
        "{} not found in page",
        marker
    )))
}

/// Text of a `{simpleText}` or `{runs: [{text}]}` node
pub fn text_of(node: &Value) -> Option<String> {
    if let Some(text) = node.get("simpleText").and_then(Value::as_str) {
        return Some(text.to_string());
    }
    let runs = node.get("runs")?.as_array()?;
    let text: String = runs
        .iter()
        .filter_map(|run| run.get("text").and_then(Value::as_str))
        .collect();
    (!text.is_empty()).then_some(text)
}

fn thumbnails(node: Option<&Value>) -> Vec<Thumbnail> {
    node.and_then(|n| n.get("thumbnails"))
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|t| {
                    let url = t.get("url")?.as_str()?;
                    Some(Thumbnail {
                        url: url.to_string(),
                        width: t.get("width").and_then(Value::as_u64).map(|w| w as u32),
                        height: t.get("height").and_then(Value::as_u64).map(|h| h as u32),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn seconds_field(node: &Value) -> Option<u32> {
    match node {
        Value::String(s) => normalize_duration(&RawDuration::Formatted(s.clone())),
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        _ => None,
    }
}

/// Collects every object stored under `key`, depth first, in page order.
fn collect_renderers<'a>(value: &'a Value, key: &str, limit: usize, out: &mut Vec<&'a Value>) {
    if out.len() >= limit {
        return;
    }
    match value {
        Value::Object(map) => {
            if let Some(renderer) = map.get(key) {
                out.push(renderer);
                return;
            }
            for child in map.values() {
                collect_renderers(child, key, limit, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_renderers(child, key, limit, out);
            }
        }
        _ => {}
    }
}

fn video_from_renderer(renderer: &Value) -> Option<Video> {
    let id = renderer.get("videoId")?.as_str()?.to_string();
    let title = renderer.get("title").and_then(text_of).unwrap_or_default();
    let author = ["ownerText", "longBylineText", "shortBylineText"]
        .iter()
        .find_map(|k| renderer.get(*k).and_then(text_of))
        .unwrap_or_default();
    let duration_seconds = renderer
        .get("lengthSeconds")
        .and_then(seconds_field)
        .or_else(|| {
            renderer
                .get("lengthText")
                .and_then(text_of)
                .and_then(|t| normalize_duration(&RawDuration::Formatted(t)))
        });

    Some(Video {
        id,
        title,
        author,
        duration_seconds,
        thumbnails: thumbnails(renderer.get("thumbnail")),
    })
}

/// Videos of a search results page, best match first
pub fn search_results(data: &Value, limit: usize) -> Vec<Video> {
    let mut renderers = Vec::new();
    collect_renderers(data, "videoRenderer", limit, &mut renderers);
    renderers
        .into_iter()
        .filter_map(video_from_renderer)
        .collect()
}

/// Playlist page content, at most `limit` playable entries
pub fn playlist(data: &Value, id: &str, limit: usize) -> Result<Playlist> {
    let title = data
        .pointer("/metadata/playlistMetadataRenderer/title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            data.pointer("/header/playlistHeaderRenderer/title")
                .and_then(text_of)
        });

    // Entries marked unplayable (deleted/private) still count towards the page.
    let mut renderers = Vec::new();
    collect_renderers(data, "playlistVideoRenderer", limit, &mut renderers);
    let videos: Vec<Video> = renderers
        .into_iter()
        .filter(|r| r.get("isPlayable").and_then(Value::as_bool) != Some(false))
        .filter_map(video_from_renderer)
        .collect();

    match title {
        None if videos.is_empty() => Err(YouTubeError::NotFound(format!("playlist {}", id))),
        title => Ok(Playlist {
            id: id.to_string(),
            title: title.unwrap_or_else(|| "YouTube Playlist".to_string()),
            videos,
        }),
    }
}

/// Video described by a watch page player response
pub fn video_details(player_response: &Value, id: &str) -> Result<Video> {
    let status = player_response
        .pointer("/playabilityStatus/status")
        .and_then(Value::as_str)
        .unwrap_or("OK");
    let details = player_response.get("videoDetails");

    match (status, details) {
        ("ERROR", _) | (_, None) => Err(YouTubeError::NotFound(format!("video {}", id))),
        (_, Some(details)) => Ok(Video {
            id: details
                .get("videoId")
                .and_then(Value::as_str)
                .unwrap_or(id)
                .to_string(),
            title: details
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            author: details
                .get("author")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            duration_seconds: details
                .get("lengthSeconds")
                .and_then(seconds_field)
                .filter(|secs| *secs > 0),
            thumbnails: thumbnails(details.get("thumbnail")),
        }),
    }
}
