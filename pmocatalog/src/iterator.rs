//! Itération paresseuse, vers l'avant uniquement, sur une collection distante paginée

use crate::error::{CatalogError, Result};
use crate::fetch::{ItemFilter, ItemHook, PageFetcher, SharedFetcher};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Nombre d'éléments demandés par page par défaut
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Itération asynchrone sur les éléments du catalogue
///
/// Les implémentations n'ont qu'un consommateur : chaque méthode prend
/// `&mut self`, les appelants concurrents doivent sérialiser leurs appels.
#[async_trait]
pub trait ItemIterator<T: Send>: Send {
    /// Renvoie jusqu'à `count` éléments, ou `None` une fois la collection épuisée
    ///
    /// Un `FetchFailure` laisse l'itérateur intact ; un nouvel appel réessaie.
    async fn next(&mut self, count: usize) -> Result<Option<Vec<T>>>;

    /// Vrai une fois la fin de la collection atteinte et le tampon vidé
    fn is_exhausted(&self) -> bool;

    /// Renvoie l'élément suivant
    async fn next_item(&mut self) -> Result<Option<T>> {
        Ok(self.next(1).await?.and_then(|mut items| items.pop()))
    }

    /// Vide l'itérateur
    ///
    /// Récupère toutes les pages restantes ; préférer [`ItemIterator::next`]
    /// pour les gros catalogues.
    async fn collect_all(&mut self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        while let Some(items) = self.next(DEFAULT_PAGE_SIZE).await? {
            all.extend(items);
        }
        Ok(all)
    }
}

/// Position d'un itérateur dans la collection distante
///
/// `offset` ne fait que croître, du nombre d'éléments réellement reçus, et
/// `exhausted` ne repasse jamais à faux.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    offset: usize,
    exhausted: bool,
}

impl Cursor {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Enregistre une page de `received` éléments reçue pour une demande de `requested`
    pub(crate) fn advance(&mut self, received: usize, requested: usize) {
        self.offset += received;
        if received < requested {
            self.exhausted = true;
        }
    }
}

/// Itérateur sur une collection servie par un [`PageFetcher`]
///
/// Les éléments sont mis en tampon page par page. Un filtre résiduel
/// optionnel écarte ce que le fournisseur n'a pas pu exclure côté serveur, et
/// un [`ItemHook`] optionnel est déclenché pour chaque élément mis en tampon.
pub struct CatalogIterator<T> {
    fetcher: SharedFetcher<T>,
    page_size: usize,
    cursor: Cursor,
    buffer: VecDeque<T>,
    filter: Option<ItemFilter<T>>,
    hook: Option<ItemHook<T>>,
}

impl<T: Send + 'static> CatalogIterator<T> {
    pub fn new(fetcher: impl PageFetcher<T> + 'static, page_size: usize) -> Self {
        Self::from_shared(Arc::new(fetcher), page_size)
    }

    /// Construit un itérateur sur une source partagée avec d'autres itérateurs
    pub fn from_shared(fetcher: SharedFetcher<T>, page_size: usize) -> Self {
        Self {
            fetcher,
            page_size: page_size.max(1),
            cursor: Cursor::default(),
            buffer: VecDeque::new(),
            filter: None,
            hook: None,
        }
    }

    /// Ne garde que les éléments acceptés par `filter`
    pub fn with_filter(mut self, filter: ItemFilter<T>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_hook(mut self, hook: ItemHook<T>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn with_optional_hook(mut self, hook: Option<ItemHook<T>>) -> Self {
        self.hook = hook;
        self
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let offset = self.cursor.offset();
        debug!(offset, limit = self.page_size, "Fetching catalog page");

        let items = self
            .fetcher
            .fetch(offset, self.page_size)
            .await
            .map_err(|e| {
                warn!(offset, "Catalog page fetch failed: {}", e);
                CatalogError::fetch_failure(offset, e)
            })?;

        let received = items.len();
        self.cursor.advance(received, self.page_size);
        if self.cursor.is_exhausted() {
            debug!(offset = self.cursor.offset(), "Catalog exhausted");
        }

        for item in items {
            if self.filter.as_ref().is_some_and(|keep| !keep(&item)) {
                continue;
            }
            if let Some(hook) = &self.hook {
                hook.fire(&item);
            }
            self.buffer.push_back(item);
        }
        Ok(())
    }
}

#[async_trait]
impl<T: Send + 'static> ItemIterator<T> for CatalogIterator<T> {
    async fn next(&mut self, count: usize) -> Result<Option<Vec<T>>> {
        while self.buffer.len() < count && !self.cursor.is_exhausted() {
            self.fetch_page().await?;
        }

        if self.buffer.is_empty() && self.cursor.is_exhausted() {
            return Ok(None);
        }

        let n = count.min(self.buffer.len());
        Ok(Some(self.buffer.drain(..n).collect()))
    }

    fn is_exhausted(&self) -> bool {
        self.cursor.is_exhausted() && self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn numbers(n: u32) -> Vec<u32> {
        (0..n).collect()
    }

    fn paged(
        data: Vec<u32>,
    ) -> impl Fn(usize, usize) -> std::future::Ready<anyhow::Result<Vec<u32>>> + Send + Sync {
        move |offset, limit| {
            std::future::ready(Ok(data.iter().skip(offset).take(limit).copied().collect()))
        }
    }

    #[tokio::test]
    async fn test_serves_pages_in_order() {
        let mut iter = CatalogIterator::new(paged(numbers(10)), 4);

        assert_eq!(iter.next(3).await.unwrap(), Some(vec![0, 1, 2]));
        assert_eq!(iter.next(3).await.unwrap(), Some(vec![3, 4, 5]));
        assert_eq!(iter.cursor().offset(), 8);
        assert_eq!(iter.next(10).await.unwrap(), Some(vec![6, 7, 8, 9]));
        assert!(iter.is_exhausted());
        assert_eq!(iter.next(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_count_returns_empty_page() {
        let mut iter = CatalogIterator::new(paged(vec![1]), 4);
        assert_eq!(iter.next(0).await.unwrap(), Some(vec![]));
        assert_eq!(iter.cursor().offset(), 0);
    }

    #[tokio::test]
    async fn test_residual_filter_is_applied() {
        let mut iter = CatalogIterator::new(paged(numbers(10)), 3)
            .with_filter(Arc::new(|n: &u32| n % 2 == 0));

        assert_eq!(iter.collect_all().await.unwrap(), vec![0, 2, 4, 6, 8]);
        // les offsets suivent les éléments reçus, pas ceux conservés
        assert_eq!(iter.cursor().offset(), 10);
    }

    #[tokio::test]
    async fn test_hook_fires_once_per_item() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let hook = ItemHook::new(move |n: &u32| {
            let recorder = recorder.clone();
            let n = *n;
            Some(Box::pin(async move {
                recorder.lock().unwrap().push(n);
                Ok::<(), anyhow::Error>(())
            }) as crate::fetch::HookFuture)
        });

        let mut iter = CatalogIterator::new(paged(vec![1, 2]), 2).with_hook(hook);
        assert_eq!(iter.collect_all().await.unwrap(), vec![1, 2]);

        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_failing_hook_does_not_fail_iteration() {
        let hook = ItemHook::new(|_: &u32| {
            Some(Box::pin(async { Err::<(), _>(anyhow::anyhow!("cover cache offline")) })
                as crate::fetch::HookFuture)
        });
        let mut iter = CatalogIterator::new(paged(vec![7]), 5).with_hook(hook);
        assert_eq!(iter.next(5).await.unwrap(), Some(vec![7]));
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_cursor() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fetcher = move |offset: usize, limit: usize| {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    anyhow::bail!("connection reset");
                }
                Ok((offset as u32..(offset + limit) as u32).take(2).collect::<Vec<_>>())
            }
        };
        let mut iter = CatalogIterator::new(fetcher, 5);

        let err = iter.next(2).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(iter.cursor(), Cursor::default());

        assert_eq!(iter.next(2).await.unwrap(), Some(vec![0, 1]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
