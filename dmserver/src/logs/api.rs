//! HTTP access to the log buffer

use super::{LEVELS, LogEntry, LogState};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio::sync::broadcast::error::RecvError;
use tracing::{Level, info};
use utoipa::OpenApi;

/// Filters of `GET /log-sse`
///
/// Without any level flag every level passes; `search` matches the message
/// or the target.
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub warn: bool,
    #[serde(default)]
    pub info: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub trace: bool,
    #[serde(default)]
    pub search: Option<String>,
}

impl LogQuery {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        let flags = [
            ("ERROR", self.error),
            ("WARN", self.warn),
            ("INFO", self.info),
            ("DEBUG", self.debug),
            ("TRACE", self.trace),
        ];
        let any_flag = flags.iter().any(|(_, on)| *on);
        let level_ok = !any_flag
            || flags
                .iter()
                .any(|(name, on)| *on && entry.level.eq_ignore_ascii_case(name));

        let search_ok = self.search.as_deref().is_none_or(|needle| {
            entry.message.contains(needle) || entry.target.contains(needle)
        });

        level_ok && search_ok
    }
}

fn sse_event(entry: &LogEntry) -> Option<Event> {
    serde_json::to_string(entry)
        .ok()
        .map(|json| Event::default().data(json))
}

/// GET /log-sse - buffered entries, then live ones
pub async fn log_sse(
    State(state): State<LogState>,
    Query(params): Query<LogQuery>,
) -> impl IntoResponse {
    let mut rx = state.subscribe();
    let history = state.dump();

    let stream = async_stream::stream! {
        for entry in history {
            if state.admits(&entry) && params.matches(&entry) {
                if let Some(event) = sse_event(&entry) {
                    yield Ok::<_, axum::Error>(event);
                }
            }
        }

        loop {
            match rx.recv().await {
                Ok(entry) => {
                    if state.admits(&entry) && params.matches(&entry) {
                        if let Some(event) = sse_event(&entry) {
                            yield Ok::<_, axum::Error>(event);
                        }
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// GET /log-dump - the whole buffer as JSON
pub async fn log_dump(State(state): State<LogState>) -> Json<Vec<LogEntry>> {
    Json(state.dump())
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LogSetupRequest {
    pub level: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LogSetupResponse {
    pub current_level: String,
    pub available_levels: Vec<String>,
}

impl LogSetupResponse {
    fn new(level: Level) -> Self {
        Self {
            current_level: level.to_string(),
            available_levels: LEVELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// GET /api/log_setup - current level
#[utoipa::path(
    get,
    path = "/api/log_setup",
    responses(
        (status = 200, description = "Current log level", body = LogSetupResponse)
    ),
    tag = "logs"
)]
pub async fn log_setup_get(State(state): State<LogState>) -> Json<LogSetupResponse> {
    Json(LogSetupResponse::new(state.max_level()))
}

/// POST /api/log_setup - change the live level
#[utoipa::path(
    post,
    path = "/api/log_setup",
    request_body = LogSetupRequest,
    responses(
        (status = 200, description = "Log level updated", body = LogSetupResponse),
        (status = 400, description = "Unknown log level"),
        (status = 500, description = "Filter reload failed")
    ),
    tag = "logs"
)]
pub async fn log_setup_post(
    State(state): State<LogState>,
    Json(payload): Json<LogSetupRequest>,
) -> Response {
    let level = match Level::from_str(payload.level.trim()) {
        Ok(level) => level,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": format!("Invalid log level. Must be one of: {}", LEVELS.join(", "))
                })),
            )
                .into_response();
        }
    };

    if let Err(err) = state.set_max_level(level) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": err.to_string() })),
        )
            .into_response();
    }
    info!("Log level changed to {}", level);

    Json(LogSetupResponse::new(level)).into_response()
}

/// Router for `/api/log_setup`
pub fn create_logs_router(state: LogState) -> Router {
    Router::new()
        .route("/api/log_setup", get(log_setup_get).post(log_setup_post))
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(log_setup_get, log_setup_post),
    components(schemas(LogSetupRequest, LogSetupResponse)),
    tags(
        (name = "logs", description = "Log level configuration")
    )
)]
pub struct LogsApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(level: &str, target: &str, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level: level.to_string(),
            target: target.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_no_flag_admits_every_level() {
        let query = LogQuery::default();
        assert!(query.matches(&entry("TRACE", "t", "m")));
        assert!(query.matches(&entry("ERROR", "t", "m")));
    }

    #[test]
    fn test_level_flags() {
        let query = LogQuery {
            warn: true,
            error: true,
            ..Default::default()
        };
        assert!(query.matches(&entry("WARN", "t", "m")));
        assert!(!query.matches(&entry("INFO", "t", "m")));
    }

    #[test]
    fn test_search_on_message_or_target() {
        let query = LogQuery {
            search: Some("spotify".to_string()),
            ..Default::default()
        };
        assert!(query.matches(&entry("INFO", "dmspotify::client", "token")));
        assert!(query.matches(&entry("INFO", "dmresolver", "spotify timed out")));
        assert!(!query.matches(&entry("INFO", "dmyoutube", "search")));
    }
}
