//! One-shot lookup endpoints
//!
//! Stateless: each request classifies one catalog URL and returns the
//! normalized collection or track, without touching any session.

use crate::resolver::{CollectionView, Lookup, Resolver};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use dmsource::{DisplayTrack, Provider, SourceError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::OpenApi;

/// Request body shared by the three endpoints
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LookupRequest {
    /// Catalog URL of a track, playlist or album
    #[serde(default)]
    pub url: String,
}

/// Router with absolute paths under `/api`
pub fn create_router(resolver: Arc<Resolver>) -> Router {
    Router::new()
        .route("/api/spotify", post(lookup_spotify))
        .route("/api/applemusic", post(lookup_applemusic))
        .route("/api/youtube", post(lookup_youtube))
        .with_state(resolver)
}

async fn lookup(
    resolver: &Resolver,
    provider: Provider,
    request: LookupRequest,
) -> Result<Json<Lookup>, AppError> {
    debug!(%provider, url = %request.url, "Lookup request");
    let result = resolver.lookup(provider, &request.url).await?;
    Ok(Json(result))
}

/// POST /api/spotify - Track, playlist or album from a Spotify URL
#[utoipa::path(
    post,
    path = "/api/spotify",
    tag = "lookup",
    request_body = LookupRequest,
    responses(
        (status = 200, description = "Collection or single track", body = Lookup),
        (status = 400, description = "Not a Spotify track or playlist URL"),
        (status = 404, description = "Unknown identifier"),
        (status = 502, description = "Spotify failure")
    )
)]
async fn lookup_spotify(
    State(resolver): State<Arc<Resolver>>,
    Json(request): Json<LookupRequest>,
) -> Result<Json<Lookup>, AppError> {
    lookup(&resolver, Provider::Spotify, request).await
}

/// POST /api/applemusic - Song, playlist or album from an Apple Music URL
#[utoipa::path(
    post,
    path = "/api/applemusic",
    tag = "lookup",
    request_body = LookupRequest,
    responses(
        (status = 200, description = "Collection or single track", body = Lookup),
        (status = 400, description = "Not an Apple Music track or playlist URL"),
        (status = 404, description = "Unknown identifier"),
        (status = 502, description = "Apple Music failure")
    )
)]
async fn lookup_applemusic(
    State(resolver): State<Arc<Resolver>>,
    Json(request): Json<LookupRequest>,
) -> Result<Json<Lookup>, AppError> {
    lookup(&resolver, Provider::AppleMusic, request).await
}

/// POST /api/youtube - Video or playlist from a YouTube URL
#[utoipa::path(
    post,
    path = "/api/youtube",
    tag = "lookup",
    request_body = LookupRequest,
    responses(
        (status = 200, description = "Collection or single track", body = Lookup),
        (status = 400, description = "Not a YouTube video or playlist URL"),
        (status = 404, description = "Unknown identifier"),
        (status = 502, description = "YouTube failure")
    )
)]
async fn lookup_youtube(
    State(resolver): State<Arc<Resolver>>,
    Json(request): Json<LookupRequest>,
) -> Result<Json<Lookup>, AppError> {
    lookup(&resolver, Provider::YouTube, request).await
}

// ============ Errors ============

pub(crate) struct AppError(SourceError);

impl AppError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            SourceError::InvalidRequest(_) | SourceError::ClassificationMiss(_) => {
                StatusCode::BAD_REQUEST
            }
            SourceError::NotFound(_) => StatusCode::NOT_FOUND,
            SourceError::Upstream { .. }
            | SourceError::UpstreamAuth { .. }
            | SourceError::CollectionFetchPartialFailure { .. } => StatusCode::BAD_GATEWAY,
            SourceError::NotSupported(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Lookup failed: {}", self.0);
        }

        let body = Json(serde_json::json!({
            "error": self.0.user_message()
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<SourceError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DisMusic Lookup API",
        version = "0.1.0",
        description = "Résolution ponctuelle d'URLs Spotify, Apple Music et YouTube"
    ),
    paths(lookup_spotify, lookup_applemusic, lookup_youtube),
    components(schemas(LookupRequest, Lookup, CollectionView, DisplayTrack, Provider)),
    tags(
        (name = "lookup", description = "Lookup de pistes et playlists sans session")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (SourceError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (SourceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                SourceError::upstream(Provider::YouTube, "x"),
                StatusCode::BAD_GATEWAY,
            ),
            (
                SourceError::auth(Provider::Spotify, "x"),
                StatusCode::BAD_GATEWAY,
            ),
            (
                SourceError::NotSupported("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError(err).status(), status);
        }
    }

    #[test]
    fn test_openapi_lists_endpoints() {
        let doc = ApiDoc::openapi();
        for path in ["/api/spotify", "/api/applemusic", "/api/youtube"] {
            assert!(doc.paths.paths.contains_key(path), "{} missing", path);
        }
    }
}
