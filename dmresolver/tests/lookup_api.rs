mod common;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use common::{FakeCatalog, track};
use dmresolver::{Resolver, api_rest::create_router};
use dmsource::{Provider, SourceError};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn router() -> axum::Router {
    let spotify = FakeCatalog::new(Provider::Spotify)
        .with_track("4uLU6hMCjMI75M1A2tKUQC", track(Provider::Spotify, "Solo", "Artist"))
        .with_collection(
            "37i9dQZF1DXcBWIGoYBM5M",
            "Hits",
            vec![
                track(Provider::Spotify, "One", "A"),
                track(Provider::Spotify, "Two", "B"),
            ],
        );
    let youtube = FakeCatalog::new(Provider::YouTube)
        .failing_collections(SourceError::upstream(Provider::YouTube, "no initial data"));
    let resolver = Resolver::builder()
        .catalog(Arc::new(spotify))
        .catalog(Arc::new(youtube))
        .build()
        .unwrap();
    create_router(Arc::new(resolver))
}

async fn post(path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn spotify_playlist_lookup() {
    let (status, body) = post(
        "/api/spotify",
        json!({"url": "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Hits");
    assert_eq!(body["covers"].as_array().unwrap().len(), 2);
    assert_eq!(body["tracks"][0]["title"], "One");
    assert_eq!(body["tracks"][0]["albumCover"], "https://img.example/One.jpg");
    assert_eq!(body["tracks"][0]["playable"], false);
}

#[tokio::test]
async fn spotify_track_lookup() {
    let (status, body) = post(
        "/api/spotify",
        json!({"url": "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Solo");
    assert_eq!(body["artist"], "Artist");
    assert_eq!(body["provider"], "spotify");
}

#[tokio::test]
async fn foreign_url_is_bad_request() {
    let (status, body) = post(
        "/api/applemusic",
        json!({"url": "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid Apple Music track or playlist URL"}));
}

#[tokio::test]
async fn missing_url_is_bad_request() {
    let (status, _) = post("/api/youtube", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_track_is_not_found() {
    let (status, body) = post(
        "/api/spotify",
        json!({"url": "spotify:track:0000000000000000000000"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Track or playlist not found");
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway() {
    let (status, body) = post(
        "/api/youtube",
        json!({"url": "https://www.youtube.com/playlist?list=PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "YouTube is not responding, please try again");
}
