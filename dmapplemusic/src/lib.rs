//! # DMAppleMusic
//!
//! Client du catalogue Apple Music pour DisMusic.
//!
//! Aucun compte développeur n'est nécessaire: le token est celui du client
//! web public, extrait de son bundle JavaScript et renouvelé quelques
//! secondes avant son expiration (`exp` du JWT) ou après un 401.
//!
//! ## Fonctionnalités
//!
//! - Titres (`songs`), playlists et albums, pour n'importe quel storefront
//! - Pochettes générées depuis le gabarit `{w}x{h}bb` à taille fixe
//! - Politique de lecture: lien Apple Music natif ou substitut YouTube
//! - Cache moka des métadonnées
//!
//! ## Exemple
//!
//! ```no_run
//! use dmapplemusic::AppleMusicClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = AppleMusicClient::from_config(&dmconfig::get_config())?;
//!     let playlist = client.get_playlist("pl.f4d106fed2bd41149aaacabb233eb5eb", None).await?;
//!     println!("{} ({} tracks)", playlist.name, playlist.tracks.len());
//!     Ok(())
//! }
//! ```

mod cache;
pub mod client;
pub mod config_ext;
pub mod error;
pub mod models;
mod source;
pub mod token;

pub use client::{AppleMusicClient, ClientBuilder, PlaybackPolicy};
pub use config_ext::AppleMusicConfigExt;
pub use error::{AppleMusicError, Result};
