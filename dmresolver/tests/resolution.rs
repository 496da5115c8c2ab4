mod common;

use common::{FakeCatalog, FakeFinder, track};
use dmresolver::{InHousePlaylist, Lookup, Query, Resolver};
use dmsource::{Provider, SourceError, Surrogate, SurrogateKind};
use std::sync::Arc;
use std::time::Duration;

const VIDEO: &str = "dQw4w9WgXcQ";

fn spotify_playlist() -> FakeCatalog {
    FakeCatalog::new(Provider::Spotify).with_collection(
        "abc123",
        "Road Trip",
        vec![
            track(Provider::Spotify, "One", "A"),
            track(Provider::Spotify, "Two", "B"),
            track(Provider::Spotify, "Three", "C"),
        ],
    )
}

#[tokio::test]
async fn spotify_playlist_keeps_catalog_order() {
    let resolver = Resolver::builder()
        .catalog(Arc::new(spotify_playlist()))
        .build()
        .unwrap();

    let resolution = resolver
        .resolve(&Query::from("https://open.spotify.com/playlist/abc123"))
        .await
        .unwrap();

    assert_eq!(resolution.name.as_deref(), Some("Road Trip"));
    let titles: Vec<_> = resolution.tracks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["One", "Two", "Three"]);
    assert!(resolution.tracks.iter().all(|t| !t.is_playable()));
}

#[tokio::test]
async fn failed_playlist_falls_back_to_video_in_same_url() {
    let youtube = FakeCatalog::new(Provider::YouTube)
        .with_track(VIDEO, track(Provider::YouTube, "Never", "Rick"))
        .failing_collections(SourceError::upstream(Provider::YouTube, "playlist page changed"));
    let resolver = Resolver::builder()
        .catalog(Arc::new(youtube))
        .build()
        .unwrap();

    let url = format!("https://www.youtube.com/watch?v={}&list=PLbroken", VIDEO);
    let resolution = resolver.resolve(&Query::from(url)).await.unwrap();

    assert_eq!(resolution.name, None);
    assert_eq!(resolution.tracks.len(), 1);
    assert_eq!(resolution.tracks[0].title, "Never");
}

#[tokio::test]
async fn failed_playlist_without_item_is_collection_failure() {
    let spotify = spotify_playlist()
        .failing_collections(SourceError::upstream(Provider::Spotify, "503 Service Unavailable"));
    let resolver = Resolver::builder()
        .catalog(Arc::new(spotify))
        .build()
        .unwrap();

    let err = resolver
        .resolve(&Query::from("https://open.spotify.com/playlist/abc123"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SourceError::CollectionFetchPartialFailure {
            provider: Provider::Spotify,
            ..
        }
    ));
}

#[tokio::test]
async fn missing_playlist_stays_not_found() {
    let resolver = Resolver::builder()
        .catalog(Arc::new(spotify_playlist()))
        .build()
        .unwrap();

    let err = resolver
        .resolve(&Query::from("https://open.spotify.com/playlist/nope"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn free_text_prefers_spotify() {
    let spotify = FakeCatalog::new(Provider::Spotify)
        .with_search("daft punk", track(Provider::Spotify, "One More Time", "Daft Punk"));
    let youtube = FakeCatalog::new(Provider::YouTube)
        .with_search("daft punk", track(Provider::YouTube, "Daft Punk live", "Channel"));
    let youtube = Arc::new(youtube);
    let resolver = Resolver::builder()
        .catalog(Arc::new(spotify))
        .catalog(youtube.clone())
        .build()
        .unwrap();

    let resolution = resolver.resolve(&Query::from("  daft punk ")).await.unwrap();

    assert_eq!(resolution.tracks[0].provider, Provider::Spotify);
    assert_eq!(resolution.tracks[0].title, "One More Time");
    assert_eq!(youtube.calls(), 0);
}

#[tokio::test]
async fn free_text_falls_back_to_youtube() {
    let spotify = FakeCatalog::new(Provider::Spotify);
    let youtube = FakeCatalog::new(Provider::YouTube)
        .with_search("obscure b-side", track(Provider::YouTube, "B-Side", "Uploader"));
    let resolver = Resolver::builder()
        .catalog(Arc::new(spotify))
        .catalog(Arc::new(youtube))
        .build()
        .unwrap();

    let resolution = resolver.resolve(&Query::from("obscure b-side")).await.unwrap();
    let found = &resolution.tracks[0];
    assert_eq!(found.provider, Provider::YouTube);
    assert!(found.is_playable());
}

#[tokio::test]
async fn free_text_without_spotify_uses_youtube() {
    let youtube = FakeCatalog::new(Provider::YouTube)
        .with_search("lofi", track(Provider::YouTube, "Lofi radio", "Girl"));
    let resolver = Resolver::builder()
        .catalog(Arc::new(youtube))
        .build()
        .unwrap();

    let resolution = resolver.resolve(&Query::from("lofi")).await.unwrap();
    assert_eq!(resolution.tracks[0].title, "Lofi radio");
}

#[tokio::test]
async fn free_text_without_any_match_is_classification_miss() {
    let resolver = Resolver::builder()
        .catalog(Arc::new(FakeCatalog::new(Provider::Spotify)))
        .catalog(Arc::new(FakeCatalog::new(Provider::YouTube)))
        .build()
        .unwrap();

    let err = resolver
        .resolve(&Query::from("some obscure text with no matches"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SourceError::ClassificationMiss("some obscure text with no matches".to_string())
    );
}

#[tokio::test]
async fn search_failure_is_reported_when_nothing_matches() {
    let spotify = FakeCatalog::new(Provider::Spotify)
        .failing_search(SourceError::upstream(Provider::Spotify, "connection reset"));
    let resolver = Resolver::builder()
        .catalog(Arc::new(spotify))
        .catalog(Arc::new(FakeCatalog::new(Provider::YouTube)))
        .build()
        .unwrap();

    let err = resolver.resolve(&Query::from("anything")).await.unwrap_err();
    assert_eq!(err, SourceError::upstream(Provider::Spotify, "connection reset"));
}

#[tokio::test(start_paused = true)]
async fn slow_provider_times_out_as_upstream() {
    let youtube = FakeCatalog::new(Provider::YouTube)
        .with_track(VIDEO, track(Provider::YouTube, "Late", "Slow"))
        .slow(Duration::from_secs(60));
    let resolver = Resolver::builder()
        .catalog(Arc::new(youtube))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let err = resolver
        .resolve(&Query::from(format!("https://youtu.be/{}", VIDEO)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SourceError::Upstream {
            provider: Provider::YouTube,
            ..
        }
    ));
}

#[tokio::test]
async fn unregistered_catalog_is_not_supported() {
    let resolver = Resolver::builder().build().unwrap();
    let err = resolver
        .resolve(&Query::from("https://music.apple.com/us/song/x/123"))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::NotSupported(_)));
}

#[tokio::test]
async fn inhouse_playlist_skips_failed_entries() {
    let youtube = FakeCatalog::new(Provider::YouTube)
        .with_track(VIDEO, track(Provider::YouTube, "Kept", "Rick"));
    let resolver = Resolver::builder()
        .catalog(Arc::new(spotify_playlist()))
        .catalog(Arc::new(youtube))
        .build()
        .unwrap();

    let query = Query::InHouse(InHousePlaylist {
        inhouse: true,
        tracks: vec![
            format!("https://youtu.be/{}", VIDEO),
            "https://youtu.be/xxxxxxxxxxx".to_string(),
            "https://open.spotify.com/playlist/abc123".to_string(),
        ],
        name: Some("Mine".to_string()),
    });
    let resolution = resolver.resolve(&query).await.unwrap();

    assert_eq!(resolution.name.as_deref(), Some("Mine"));
    let titles: Vec<_> = resolution.tracks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Kept", "One", "Two", "Three"]);
}

#[tokio::test]
async fn inhouse_playlist_with_only_failures_reports_first_error() {
    let resolver = Resolver::builder()
        .catalog(Arc::new(FakeCatalog::new(Provider::YouTube)))
        .build()
        .unwrap();

    let query = Query::InHouse(InHousePlaylist {
        inhouse: true,
        tracks: vec![format!("https://youtu.be/{}", VIDEO)],
        name: None,
    });
    let err = resolver.resolve(&query).await.unwrap_err();
    assert_eq!(err, SourceError::NotFound(VIDEO.to_string()));
}

#[tokio::test]
async fn object_query_without_inhouse_flag_is_rejected() {
    let resolver = Resolver::builder()
        .catalog(Arc::new(spotify_playlist()))
        .build()
        .unwrap();

    for body in [
        serde_json::json!({"inhouse": false, "tracks": ["https://open.spotify.com/playlist/abc123"]}),
        serde_json::json!({"url": "https://open.spotify.com/playlist/abc123"}),
    ] {
        let query: Query = serde_json::from_value(body).unwrap();
        let err = resolver.resolve(&query).await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidRequest(_)), "{:?}", err);
    }
}

#[tokio::test]
async fn ensure_surrogate_searches_title_and_primary_artist() {
    let finder = Arc::new(FakeFinder::default());
    let resolver = Resolver::builder()
        .surrogate_finder(finder.clone())
        .build()
        .unwrap();

    let mut pending = track(Provider::Spotify, "Digital Love", "Daft Punk");
    resolver.ensure_surrogate(&mut pending).await.unwrap();

    let surrogate = pending.surrogate.clone().unwrap();
    assert_eq!(surrogate.kind, SurrogateKind::YouTube);
    assert_eq!(surrogate.url, "https://www.youtube.com/watch?v=Digital+Love+Daft+Punk");
    assert_eq!(pending.duration_seconds, Some(200));
    assert_eq!(
        *finder.queries.lock().unwrap(),
        vec!["Digital Love Daft Punk".to_string()]
    );

    // Already playable: no new search
    let mut native = track(Provider::AppleMusic, "Alone", "Air");
    native.surrogate = Some(Surrogate::apple_music("https://music.apple.com/us/song/alone/1"));
    resolver.ensure_surrogate(&mut native).await.unwrap();
    assert_eq!(finder.queries.lock().unwrap().len(), 1);
    assert_eq!(native.surrogate.unwrap().kind, SurrogateKind::AppleMusic);
}

#[tokio::test]
async fn ensure_surrogate_failure_leaves_track_pending() {
    let finder = Arc::new(FakeFinder {
        missing: true,
        ..Default::default()
    });
    let resolver = Resolver::builder().surrogate_finder(finder).build().unwrap();

    let mut pending = track(Provider::Spotify, "Unknown", "Nobody");
    let err = resolver.ensure_surrogate(&mut pending).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!pending.is_playable());
}

#[tokio::test]
async fn lookup_rejects_foreign_urls() {
    let resolver = Resolver::builder()
        .catalog(Arc::new(spotify_playlist()))
        .build()
        .unwrap();

    let err = resolver
        .lookup(Provider::Spotify, &format!("https://youtu.be/{}", VIDEO))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SourceError::InvalidRequest("Invalid Spotify track or playlist URL".to_string())
    );
}

#[tokio::test]
async fn lookup_collection_view() {
    let resolver = Resolver::builder()
        .catalog(Arc::new(spotify_playlist()))
        .build()
        .unwrap();

    let result = resolver
        .lookup(Provider::Spotify, "https://open.spotify.com/playlist/abc123")
        .await
        .unwrap();
    match result {
        Lookup::Collection(view) => {
            assert_eq!(view.name, "Road Trip");
            assert_eq!(view.covers.len(), 3);
            assert_eq!(view.tracks[1].title, "Two");
            assert_eq!(view.tracks[1].duration, "-");
        }
        other => panic!("expected a collection, got {:?}", other),
    }
}
