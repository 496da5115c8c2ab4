//! # dmserver - Serveur HTTP de DisMusic
//!
//! Surcouche Axum utilisée par l'application et étendue par les autres
//! crates via des traits d'extension (`ResolverServerExt`, `QueueServerExt`).
//!
//! - [`server`] : [`Server`] et [`ServerBuilder`] (routes, OpenAPI, CORS, arrêt sur Ctrl+C)
//! - [`logs`] : subscriber `tracing`, buffer en mémoire, routes `/log-sse`,
//!   `/log-dump` et `/api/log_setup`
//!
//! ## Exemple
//!
//! ```rust,no_run
//! use dmserver::{ServerBuilder, logs::LoggingOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new("DisMusic", "127.0.0.1", 3000).build();
//!     server.init_logging(LoggingOptions::default()).await?;
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogState, LoggingOptions, SseLayer};
pub use server::{Server, ServerBuilder, ServerInfo};
