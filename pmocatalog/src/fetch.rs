//! Contrat de récupération des pages et hooks par élément pilotés par les itérateurs

use crate::models::CatalogItem;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fonction de récupération paginée pilotée par les itérateurs
///
/// `fetch(offset, limit)` renvoie au plus `limit` éléments à partir de
/// `offset` ; en renvoyer moins que `limit` signale la fin de la collection.
/// Les implémentations ne gardent aucun état de position.
///
/// Toute closure `Fn(usize, usize) -> impl Future<Output = anyhow::Result<Vec<T>>>`
/// implémente ce trait :
///
/// ```rust
/// use pmocatalog::{CatalogIterator, ItemIterator};
///
/// # async fn example() -> pmocatalog::Result<()> {
/// let data: Vec<u32> = (0..10).collect();
/// let fetcher = move |offset: usize, limit: usize| {
///     let page: Vec<u32> = data.iter().skip(offset).take(limit).copied().collect();
///     async move { Ok::<_, anyhow::Error>(page) }
/// };
/// let mut iter = CatalogIterator::new(fetcher, 4);
/// let first = iter.next(3).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch(&self, offset: usize, limit: usize) -> anyhow::Result<Vec<T>>;

    /// Taille du listing complet, quand la source peut la donner en une requête
    ///
    /// `None` signifie inconnue : les appelants qui en ont besoin parcourent
    /// alors le listing.
    async fn count(&self) -> anyhow::Result<Option<usize>> {
        Ok(None)
    }
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for F
where
    T: Send + 'static,
    F: Fn(usize, usize) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Vec<T>>> + Send + 'static,
{
    async fn fetch(&self, offset: usize, limit: usize) -> anyhow::Result<Vec<T>> {
        (self)(offset, limit).await
    }
}

/// Référence partagée sur une source de pages
pub type SharedFetcher<T> = Arc<dyn PageFetcher<T>>;

/// Prédicat côté client appliqué aux éléments récupérés
pub type ItemFilter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Future exécutée en tâche de fond par un hook
pub type HookFuture = BoxFuture<'static, anyhow::Result<()>>;

/// Callback de préchargement des pochettes installé par la couche de navigation, indexé par identifiant de pochette
pub type CoverPrefetchFn = Arc<dyn Fn(String) -> HookFuture + Send + Sync>;

/// Effet de bord lancé sans attente, une fois par élément produit
///
/// Le hook construit une future lancée sur le runtime tokio courant ;
/// l'itérateur ne l'attend jamais et son échec est seulement journalisé.
pub struct ItemHook<T> {
    inner: Arc<dyn Fn(&T) -> Option<HookFuture> + Send + Sync>,
}

impl<T> Clone for ItemHook<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> ItemHook<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T) -> Option<HookFuture> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    pub(crate) fn fire(&self, item: &T) {
        let Some(task) = (self.inner)(item) else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = task.await {
                        debug!("Item hook failed: {}", e);
                    }
                });
            }
            Err(_) => warn!("No tokio runtime available, item hook dropped"),
        }
    }
}

impl<T: CatalogItem + 'static> ItemHook<T> {
    /// Hook appelant `prefetch` avec l'identifiant de pochette de chaque élément qui en a une
    pub fn prefetch_cover(prefetch: CoverPrefetchFn) -> Self {
        Self::new(move |item: &T| item.cover_art_id().map(|id| prefetch(id.to_string())))
    }

    /// Comme [`ItemHook::prefetch_cover`], à partir d'une simple closure async
    pub fn prefetch_cover_with<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::prefetch_cover(Arc::new(move |id: String| -> HookFuture { f(id).boxed() }))
    }
}
