//! # DMSpotify
//!
//! Client de l'API Web Spotify pour DisMusic.
//!
//! Spotify est le catalogue de métadonnées principal: tracks, playlists,
//! albums et recherche texte. L'accès se fait avec un token applicatif
//! (grant `client_credentials`), sans utilisateur.
//!
//! ## Architecture
//!
//! - [`api`]: appels HTTP bas-niveau, le token est passé explicitement
//! - [`SpotifyClient`]: cache moka + `CredentialCache` + un seul nouvel
//!   essai après un 401
//! - [`SpotifyConfigExt`]: section `accounts.spotify` de `dmconfig`
//!
//! ## Exemple
//!
//! ```rust,no_run
//! use dmspotify::SpotifyClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SpotifyClient::from_config(&dmconfig::get_config())?;
//!     let playlist = client.get_playlist("37i9dQZF1DXcBWIGoYBM5M").await?;
//!     println!("{}: {} tracks", playlist.name, playlist.tracks.len());
//!     Ok(())
//! }
//! ```

pub mod api;
mod cache;
pub mod client;
pub mod config_ext;
pub mod error;
pub mod models;
mod source;

pub use api::SpotifyApi;
pub use client::SpotifyClient;
pub use config_ext::SpotifyConfigExt;
pub use error::{Result, SpotifyError};
