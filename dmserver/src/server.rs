//! # Server
//!
//! Thin layer over Axum: routes are registered while the server is being
//! assembled, then [`Server::start`] binds the listener and serves them
//! until Ctrl+C.

use crate::logs::{
    LogState, LoggingOptions, LogsApiDoc, create_logs_router, init_logging, log_dump, log_sse,
};
use anyhow::{Context, Result};
use axum::handler::Handler;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Json, Router};
use dmconfig::{Config, get_config};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{signal, sync::RwLock, task::JoinHandle};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub const DEFAULT_SERVER_NAME: &str = "DisMusic";

/// Served at `GET /info`
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub bind_address: String,
    pub http_port: u16,
}

pub struct Server {
    name: String,
    bind_address: String,
    http_port: u16,
    cors_origins: Vec<String>,
    router: Arc<RwLock<Router>>,
    join_handle: Option<JoinHandle<()>>,
    log_state: Option<LogState>,
}

impl Server {
    pub fn new(name: impl Into<String>, bind_address: impl Into<String>, http_port: u16) -> Self {
        let mut server = Self {
            name: name.into(),
            bind_address: bind_address.into(),
            http_port,
            cors_origins: vec!["*".to_string()],
            router: Arc::new(RwLock::new(Router::new())),
            join_handle: None,
            log_state: None,
        };
        let info = server.info();
        server.router = Arc::new(RwLock::new(
            Router::new().route("/info", get(move || async move { Json(info) })),
        ));
        server
    }

    pub fn new_configured() -> Self {
        ServerBuilder::from_config(&get_config()).build()
    }

    /// GET handler with its own state
    pub async fn add_handler_with_state<H, T, S>(&mut self, path: &str, handler: H, state: S)
    where
        H: Handler<T, S> + Clone + Send + Sync + 'static,
        T: 'static,
        S: Clone + Send + Sync + 'static,
    {
        let route = Router::new().route(path, get(handler)).with_state(state);
        self.merge(route).await;
    }

    /// Adds a sub-router
    ///
    /// `"/"` merges it as is (its routes keep their own paths); any other
    /// path nests it.
    pub async fn add_router(&mut self, path: &str, sub_router: Router) {
        if path == "/" {
            self.merge(sub_router).await;
        } else {
            let normalized = format!("/{}", path.trim_matches('/'));
            let mut router = self.router.write().await;
            *router = std::mem::take(&mut *router).nest(&normalized, sub_router);
        }
    }

    /// Merges a documented API and its Swagger UI
    ///
    /// The API routes keep their absolute paths. The documentation is served
    /// at `/swagger-ui/{name}` from `/api-docs/{name}.json`.
    pub async fn add_openapi(
        &mut self,
        api_router: Router,
        openapi: utoipa::openapi::OpenApi,
        name: &str,
    ) {
        let swagger_path: &'static str = Box::leak(format!("/swagger-ui/{}", name).into_boxed_str());
        let json_path: &'static str = Box::leak(format!("/api-docs/{}.json", name).into_boxed_str());
        let swagger = SwaggerUi::new(swagger_path).url(json_path, openapi);

        self.merge(api_router.merge(swagger)).await;
        info!("API documentation for {} at {}", name, swagger_path);
    }

    async fn merge(&mut self, routes: Router) {
        let mut router = self.router.write().await;
        *router = std::mem::take(&mut *router).merge(routes);
    }

    pub fn set_cors_origins(&mut self, origins: Vec<String>) {
        self.cors_origins = origins;
    }

    fn cors_layer(&self) -> CorsLayer {
        if self.cors_origins.iter().any(|origin| origin == "*") {
            return CorsLayer::permissive();
        }
        let origins: Vec<HeaderValue> = self
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }

    /// The assembled router with CORS and request tracing
    pub async fn router(&self) -> Router {
        self.router
            .read()
            .await
            .clone()
            .layer(self.cors_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// Binds the listener and serves until Ctrl+C
    ///
    /// # Errors
    ///
    /// Fails when the address is invalid or the port cannot be bound.
    pub async fn start(&mut self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.bind_address, self.http_port)
            .parse()
            .with_context(|| format!("Invalid bind address {}", self.bind_address))?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Cannot bind {}", addr))?;
        info!("Server {} listening on http://{}", self.name, addr);

        let app = self.router().await;
        let server_task = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                error!("HTTP server stopped: {}", err);
            }
        });

        let shutdown_task = tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => info!("Ctrl+C received, shutting down"),
                Err(err) => error!("Cannot listen for Ctrl+C: {}", err),
            }
        });

        self.join_handle = Some(tokio::spawn(async move {
            tokio::select! {
                _ = server_task => {},
                _ = shutdown_task => {},
            }
        }));
        Ok(())
    }

    /// Waits until the server stops
    pub async fn wait(&mut self) {
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.await;
        }
    }

    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            name: self.name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            bind_address: self.bind_address.clone(),
            http_port: self.http_port,
        }
    }

    pub fn log_state(&self) -> Option<&LogState> {
        self.log_state.as_ref()
    }

    /// Installs the global subscriber and registers the log routes
    ///
    /// Routes: `GET /log-sse`, `GET /log-dump`, `GET|POST /api/log_setup`.
    pub async fn init_logging(&mut self, options: LoggingOptions) -> Result<()> {
        let state = init_logging(options)?;
        self.add_log_routes(state).await;
        Ok(())
    }

    /// Registers the log routes over an existing state
    pub async fn add_log_routes(&mut self, state: LogState) {
        self.add_handler_with_state("/log-sse", log_sse, state.clone())
            .await;
        self.add_handler_with_state("/log-dump", log_dump, state.clone())
            .await;
        self.add_openapi(create_logs_router(state.clone()), LogsApiDoc::openapi(), "logs")
            .await;
        self.log_state = Some(state);
    }
}

pub struct ServerBuilder {
    name: String,
    bind_address: String,
    http_port: u16,
    cors_origins: Vec<String>,
}

impl ServerBuilder {
    pub fn new(name: impl Into<String>, bind_address: impl Into<String>, http_port: u16) -> Self {
        Self {
            name: name.into(),
            bind_address: bind_address.into(),
            http_port,
            cors_origins: vec!["*".to_string()],
        }
    }

    /// Address, port and CORS origins from `host.*`
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            DEFAULT_SERVER_NAME,
            config.get_bind_address(),
            config.get_http_port(),
        )
        .cors_origins(config.get_cors_origins())
    }

    pub fn new_configured() -> Self {
        Self::from_config(&get_config())
    }

    pub fn cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    pub fn build(self) -> Server {
        let mut server = Server::new(self.name, self.bind_address, self.http_port);
        server.set_cors_origins(self.cors_origins);
        server
    }
}
