//! # PMOJellyfin
//!
//! Backend Jellyfin pour la navigation dans le catalogue.
//!
//! - [`JellyfinApi`] : client REST bas-niveau (authentification, listings paginés)
//! - [`JellyfinProvider`] : [`pmocatalog::CatalogProvider`] qui traduit ordres de
//!   tri et filtres en requêtes Jellyfin
//! - [`JellyfinServer`] / [`JellyfinClientFactory`] : branchent Jellyfin sur
//!   [`pmoconnect::ConnectionArbitrator`] et [`pmoconnect::ServerManager`]
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use pmocatalog::{CatalogFilter, CatalogProvider, ItemIterator};
//! use pmoconnect::{ConnectionArbitrator, ConnectionDescriptor};
//! use pmojellyfin::JellyfinClientFactory;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let descriptor = ConnectionDescriptor::new("http://192.168.1.10:8096", "alice")
//!         .with_alternate("https://music.example.org");
//!     let server = ConnectionArbitrator::new(JellyfinClientFactory::default())
//!         .resolve(&descriptor, "password")
//!         .await?
//!         .into_authenticated()?;
//!
//!     let mut albums = server.iterate_albums("Recently Added", &CatalogFilter::default());
//!     if let Some(page) = albums.next(20).await? {
//!         for album in page {
//!             println!("{}", album.name);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config_ext;
pub mod error;
pub mod models;
pub mod provider;

pub use api::auth::AuthInfo;
pub use api::items::{ItemKind, QueryOpts, Sort, SortMode};
pub use api::{DeviceInfo, JellyfinApi};
pub use client::{JellyfinClientFactory, JellyfinServer};
pub use config_ext::JellyfinConfigExt;
pub use error::{JellyfinError, Result};
pub use models::BaseItemDto;
pub use provider::{
    JellyfinProvider, ListingFetcher, ALBUM_SORT_ARTIST_AZ, ALBUM_SORT_RANDOM, ALBUM_SORT_RECENTLY_ADDED,
    ALBUM_SORT_TITLE_AZ, ALBUM_SORT_YEAR_ASCENDING, ALBUM_SORT_YEAR_DESCENDING,
    ARTIST_SORT_NAME_AZ,
};
