//! Itération aléatoire où chaque élément est visité exactement une fois
//!
//! Les serveurs implémentent le tri « aléatoire » en remélangeant à chaque
//! requête : des pages consécutives peuvent répéter ou sauter des éléments, et
//! on ne peut pas se fier au listing aléatoire pour s'arrêter au bon endroit.
//! [`RandomCatalogIterator`] associe la source aléatoire à une source
//! déterministe sur le même filtre :
//!
//! 1. la taille de la collection est demandée à la source déterministe
//!    ([`PageFetcher::count`]) ; si elle ne sait pas la donner, ou si un
//!    filtre côté client est actif, la source déterministe est parcourue une
//!    fois pour compter les éléments atteints par le filtre ;
//! 2. les pages aléatoires sont servies sans les identifiants déjà émis ;
//! 3. si la source aléatoire s'épuise avant que tout ait été émis, la source
//!    déterministe est balayée pour récupérer les éléments manquants.
//!
//! L'itérateur est épuisé dès que le nombre d'identifiants distincts émis
//! atteint le total. Un catalogue modifié pendant un long parcours n'est pas
//! recompté.

use crate::error::{CatalogError, Result};
use crate::fetch::{ItemFilter, ItemHook, PageFetcher, SharedFetcher};
use crate::iterator::{CatalogIterator, ItemIterator};
use crate::models::CatalogItem;
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};

/// Itérateur en ordre aléatoire sur une collection paginée
pub struct RandomCatalogIterator<T> {
    random: SharedFetcher<T>,
    deterministic: SharedFetcher<T>,
    page_size: usize,
    filter: Option<ItemFilter<T>>,
    hook: Option<ItemHook<T>>,

    seen: HashSet<String>,
    buffer: VecDeque<T>,
    random_offset: usize,
    random_exhausted: bool,

    /// Passe sur la source déterministe qui compte les éléments atteignables
    counter: Option<(CatalogIterator<T>, usize)>,
    total: Option<usize>,
    /// Taille non filtrée du listing déterministe ; un offset aléatoire
    /// au-delà est après la fin de la collection
    random_limit: usize,
    /// Passe déterministe qui émet ce que la source aléatoire n'a jamais renvoyé
    sweep: Option<CatalogIterator<T>>,
    sweep_exhausted: bool,
}

impl<T: CatalogItem + Send + 'static> RandomCatalogIterator<T> {
    pub fn new(
        deterministic: impl PageFetcher<T> + 'static,
        random: impl PageFetcher<T> + 'static,
        page_size: usize,
    ) -> Self {
        Self {
            random: Arc::new(random),
            deterministic: Arc::new(deterministic),
            page_size: page_size.max(1),
            filter: None,
            hook: None,
            seen: HashSet::new(),
            buffer: VecDeque::new(),
            random_offset: 0,
            random_exhausted: false,
            counter: None,
            total: None,
            random_limit: 0,
            sweep: None,
            sweep_exhausted: false,
        }
    }

    /// Ne garde que les éléments acceptés par `filter`, sur les deux sources
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

    /// Nombre d'éléments distincts émis jusqu'ici
    pub fn emitted(&self) -> usize {
        self.seen.len()
    }

    /// Taille de la collection atteignable, une fois connue
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    fn deterministic_iter(&self) -> CatalogIterator<T> {
        let iter = CatalogIterator::from_shared(self.deterministic.clone(), self.page_size);
        match &self.filter {
            Some(filter) => iter.with_filter(filter.clone()),
            None => iter,
        }
    }

    /// Compte une seule fois les éléments atteignables par la source déterministe
    async fn ensure_total(&mut self) -> Result<usize> {
        if let Some(total) = self.total {
            return Ok(total);
        }

        // une taille rapportée ignore le filtre côté client
        if self.filter.is_none() && self.counter.is_none() {
            let reported = self.deterministic.count().await.map_err(|e| {
                warn!("Catalog count failed: {}", e);
                CatalogError::fetch_failure(0, e)
            })?;
            if let Some(total) = reported {
                debug!(total, "Random iteration bounded by reported count");
                self.random_limit = total;
                self.total = Some(total);
                return Ok(total);
            }
        }

        if self.counter.is_none() {
            self.counter = Some((self.deterministic_iter(), 0));
        }
        if let Some((iter, count)) = self.counter.as_mut() {
            while let Some(items) = iter.next(self.page_size).await? {
                *count += items.len();
            }
        }

        let (total, raw) = self
            .counter
            .take()
            .map(|(iter, count)| (count, iter.cursor().offset()))
            .unwrap_or_default();
        debug!(total, raw, "Random iteration bounded by deterministic count");
        self.random_limit = raw;
        self.total = Some(total);
        Ok(total)
    }

    fn done(&self, total: usize) -> bool {
        self.seen.len() >= total || (self.random_exhausted && self.sweep_exhausted)
    }

    /// Met `item` en tampon sauf s'il a déjà été émis ou si le total est atteint
    fn accept(&mut self, item: T, total: usize) {
        if self.seen.len() >= total {
            return;
        }
        if self.filter.as_ref().is_some_and(|keep| !keep(&item)) {
            return;
        }
        if !self.seen.insert(item.id().to_string()) {
            return;
        }
        if let Some(hook) = &self.hook {
            hook.fire(&item);
        }
        self.buffer.push_back(item);
    }

    async fn fetch_random_page(&mut self, total: usize) -> Result<()> {
        let offset = self.random_offset;
        debug!(offset, limit = self.page_size, "Fetching random page");

        let items = self
            .random
            .fetch(offset, self.page_size)
            .await
            .map_err(|e| {
                warn!(offset, "Random page fetch failed: {}", e);
                CatalogError::fetch_failure(offset, e)
            })?;

        let received = items.len();
        self.random_offset += received;
        if received < self.page_size || self.random_offset >= self.random_limit {
            debug!(
                emitted = self.seen.len(),
                total, "Random source exhausted, sweeping deterministic source"
            );
            self.random_exhausted = true;
        }

        for item in items {
            self.accept(item, total);
        }
        Ok(())
    }

    async fn sweep_page(&mut self, total: usize) -> Result<()> {
        if self.sweep.is_none() {
            self.sweep = Some(self.deterministic_iter());
        }
        let page = match self.sweep.as_mut() {
            Some(sweep) => sweep.next(self.page_size).await?,
            None => None,
        };

        match page {
            Some(items) => {
                for item in items {
                    self.accept(item, total);
                }
            }
            None => {
                if self.seen.len() < total {
                    warn!(
                        emitted = self.seen.len(),
                        total, "Catalog shrank during random iteration"
                    );
                }
                self.sweep_exhausted = true;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<T: CatalogItem + Send + 'static> ItemIterator<T> for RandomCatalogIterator<T> {
    async fn next(&mut self, count: usize) -> Result<Option<Vec<T>>> {
        let total = self.ensure_total().await?;

        while self.buffer.len() < count && !self.done(total) {
            if self.random_exhausted {
                self.sweep_page(total).await?;
            } else {
                self.fetch_random_page(total).await?;
            }
        }

        if self.buffer.is_empty() && self.done(total) {
            return Ok(None);
        }

        let n = count.min(self.buffer.len());
        Ok(Some(self.buffer.drain(..n).collect()))
    }

    fn is_exhausted(&self) -> bool {
        self.buffer.is_empty() && self.total.is_some_and(|total| self.done(total))
    }
}
