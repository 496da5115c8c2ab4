//! YouTube client library for DisMusic
//!
//! This crate reads public YouTube pages to provide:
//!
//! - **Video lookup**: title, channel, duration and thumbnails of a watch page
//! - **Playlists**: the first page of a playlist (100 entries by default)
//! - **Search**: best matches for free text, used both as a last-resort
//!   catalog and to find a playable surrogate for tracks coming from
//!   metadata-only catalogs
//!
//! [`YouTubeClient`] implements both [`dmsource::CatalogResolver`] and
//! [`dmsource::SurrogateFinder`]. YouTube tracks are their own surrogate.
//!
//! # Configuration Extension
//!
//! [`YouTubeConfigExt`] adds `accounts.youtube.playlist_limit` to
//! [`dmconfig::Config`].

mod cache;
pub mod client;
pub mod config_ext;
pub mod error;
pub mod extract;
pub mod models;
mod source;

pub use client::{ClientBuilder, YouTubeClient, DEFAULT_PLAYLIST_LIMIT};
pub use config_ext::YouTubeConfigExt;
pub use error::{Result, YouTubeError};
pub use models::{watch_url, Playlist, Thumbnail, Video};
