use async_trait::async_trait;
use dmsource::{
    CatalogRef, CatalogResolver, Collection, EntityKind, FoundSurrogate, Provider, RawDuration,
    RawTrack, Result, SourceError, SurrogateFinder, Track, normalize,
};

struct StaticCatalog;

#[async_trait]
impl CatalogResolver for StaticCatalog {
    fn provider(&self) -> Provider {
        Provider::AppleMusic
    }

    async fn resolve_track(&self, reference: &CatalogRef) -> Result<Track> {
        if reference.id == "missing" {
            return Err(SourceError::NotFound(reference.id.clone()));
        }
        Ok(normalize(
            RawTrack::titled(format!("Track {}", reference.id))
                .artist("Artist")
                .duration(RawDuration::Millis(180_000)),
            Provider::AppleMusic,
        ))
    }

    async fn resolve_collection(&self, reference: &CatalogRef) -> Result<Collection> {
        let first = self
            .resolve_track(&CatalogRef::new(Provider::AppleMusic, EntityKind::Track, "1"))
            .await?;
        Ok(Collection {
            name: reference.id.clone(),
            provider: Provider::AppleMusic,
            tracks: vec![first],
        })
    }
}

struct EchoFinder;

#[async_trait]
impl SurrogateFinder for EchoFinder {
    async fn find_playable_surrogate(&self, text: &str) -> Result<FoundSurrogate> {
        Ok(FoundSurrogate {
            url: format!("https://www.youtube.com/watch?v={}", text.len()),
            duration_seconds: None,
        })
    }
}

#[tokio::test]
async fn default_search_is_not_supported() {
    let err = StaticCatalog.search_track("anything").await.unwrap_err();
    assert!(matches!(err, SourceError::NotSupported(_)));
}

#[tokio::test]
async fn resolver_can_be_used_as_trait_object() {
    let resolver: Box<dyn CatalogResolver> = Box::new(StaticCatalog);
    let reference = CatalogRef::new(Provider::AppleMusic, EntityKind::Playlist, "pl.abc")
        .with_storefront("fr");

    let collection = resolver.resolve_collection(&reference).await.unwrap();
    assert_eq!(collection.name, "pl.abc");
    assert_eq!(collection.tracks[0].to_display().duration, "3:00");

    let missing = CatalogRef::new(Provider::AppleMusic, EntityKind::Track, "missing");
    assert!(resolver.resolve_track(&missing).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn surrogate_finder_uses_search_text() {
    let track = StaticCatalog
        .resolve_track(&CatalogRef::new(Provider::AppleMusic, EntityKind::Track, "7"))
        .await
        .unwrap();
    let found = EchoFinder
        .find_playable_surrogate(&track.search_text())
        .await
        .unwrap();
    assert_eq!(found.url, "https://www.youtube.com/watch?v=14");
}
