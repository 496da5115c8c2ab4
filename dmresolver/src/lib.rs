//! # DMResolver
//!
//! Turns what a user typed into tracks:
//!
//! - [`classifier`]: ordered URL pattern table (`Classifier::classify`)
//! - [`resolver`]: resolution chain over the registered catalogs, free-text
//!   search fallback, playable surrogates, bounded provider calls
//! - [`query`]: inbound query shapes (raw text or in-app playlist)
//! - `api_rest` (feature `dmserver`): stateless lookup endpoints
//!
//! ## Example
//!
//! ```rust,ignore
//! use dmresolver::{Query, Resolver};
//! use std::sync::Arc;
//!
//! let resolver = Resolver::builder()
//!     .catalog(Arc::new(youtube.clone()))
//!     .surrogate_finder(Arc::new(youtube))
//!     .build()?;
//!
//! let resolution = resolver.resolve(&Query::from("daft punk one more time")).await?;
//! ```

pub mod classifier;
pub mod query;
pub mod resolver;

#[cfg(feature = "dmserver")]
pub mod api_rest;
#[cfg(feature = "dmserver")]
mod server_ext;

pub use classifier::{Classification, Classifier};
pub use query::{InHousePlaylist, Query};
pub use resolver::{
    CollectionView, DEFAULT_TIMEOUT_SECS, Lookup, Resolution, Resolver, ResolverBuilder,
};

#[cfg(feature = "dmserver")]
pub use server_ext::ResolverServerExt;
