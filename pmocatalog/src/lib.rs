//! # PMOCatalog
//!
//! Navigation indépendante du fournisseur dans de gros catalogues musicaux distants.
//!
//! Les serveurs exposent albums, morceaux et artistes sous forme de listings
//! paginés et filtrables. Cette crate en fait des séquences paresseuses :
//!
//! - **Traduction des filtres** ([`translate`]) : découpe un [`CatalogFilter`]
//!   en une partie appliquée par le serveur ([`ProviderFilter`]) et un
//!   résiduel vérifié côté client.
//! - **Itération du catalogue** ([`CatalogIterator`]) : pagination vers
//!   l'avant sur un [`PageFetcher`], sûre en cas d'échec de requête, avec un
//!   [`ItemHook`] optionnel lancé en tâche de fond (préchargement des pochettes).
//! - **Itération aléatoire** ([`RandomCatalogIterator`]) : ordre aléatoire,
//!   chaque élément renvoyé une seule fois, même si le serveur remélange
//!   entre les pages.
//! - **Réordonnancement** ([`reorder`]) : déplace une sélection d'une liste
//!   en tête, en fin, vers le haut ou vers le bas.
//!
//! Les backends implémentent [`CatalogProvider`] et fournissent des
//! [`ItemIterator`] boxés.
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use pmocatalog::{CatalogFilter, CatalogIterator, ItemIterator, translate_now};
//!
//! # async fn example() -> pmocatalog::Result<()> {
//! let filter = CatalogFilter { min_year: Some(1990), ..Default::default() };
//! let (server_filter, residual) = translate_now(&filter);
//!
//! let fetcher = move |offset: usize, limit: usize| {
//!     let server_filter = server_filter.clone();
//!     async move {
//!         // interroger le serveur avec `server_filter`, `offset` et `limit`
//!         Ok::<Vec<pmocatalog::Album>, anyhow::Error>(Vec::new())
//!     }
//! };
//! let mut albums = CatalogIterator::new(fetcher, 50)
//!     .with_filter(std::sync::Arc::new(move |a: &pmocatalog::Album| residual.matches_album(a)));
//! while let Some(page) = albums.next(20).await? {
//!     println!("{} albums", page.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fetch;
pub mod filter;
pub mod iterator;
pub mod models;
pub mod provider;
pub mod random;
pub mod reorder;

pub use error::{CatalogError, Result};
pub use fetch::{
    CoverPrefetchFn, HookFuture, ItemFilter, ItemHook, PageFetcher, SharedFetcher,
};
pub use filter::{current_year, translate, translate_now, CatalogFilter, ProviderFilter, EARLIEST_YEAR};
pub use iterator::{CatalogIterator, Cursor, ItemIterator, DEFAULT_PAGE_SIZE};
pub use models::{Album, Artist, CatalogItem, Track};
pub use provider::{BoxedIterator, CatalogProvider, ProviderCapabilities};
pub use random::RandomCatalogIterator;
pub use reorder::{reorder, ReorderOp};
