//! Implémentation de `CatalogProvider` au-dessus de l'API Jellyfin

use crate::api::items::{
    ItemKind, QueryOpts, Sort, SORT_BY_ARTIST, SORT_BY_DATE_CREATED, SORT_BY_NAME, SORT_BY_YEAR,
};
use crate::api::JellyfinApi;
use crate::models::BaseItemDto;
use async_trait::async_trait;
use pmocatalog::{
    translate_now, Album, Artist, BoxedIterator, CatalogFilter, CatalogItem, CatalogIterator,
    CatalogProvider, CoverPrefetchFn, ItemFilter, ItemHook, PageFetcher, ProviderCapabilities,
    RandomCatalogIterator, Track,
};
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};
use tracing::debug;

pub const ALBUM_SORT_RECENTLY_ADDED: &str = "Recently Added";
pub const ALBUM_SORT_RANDOM: &str = "Random";
pub const ALBUM_SORT_TITLE_AZ: &str = "Title (A-Z)";
pub const ALBUM_SORT_ARTIST_AZ: &str = "Artist (A-Z)";
pub const ALBUM_SORT_YEAR_ASCENDING: &str = "Year (ascending)";
pub const ALBUM_SORT_YEAR_DESCENDING: &str = "Year (descending)";

pub const ARTIST_SORT_NAME_AZ: &str = "Name (A-Z)";

/// Tri serveur d'un ordre de tri d'albums, `None` pour un ordre inconnu
fn album_sort(sort_order: &str) -> Option<Sort> {
    match sort_order {
        ALBUM_SORT_RECENTLY_ADDED => Some(Sort::desc(SORT_BY_DATE_CREATED)),
        ALBUM_SORT_RANDOM => Some(Sort::random()),
        ALBUM_SORT_TITLE_AZ => Some(Sort::asc(SORT_BY_NAME)),
        ALBUM_SORT_ARTIST_AZ => Some(Sort::asc(SORT_BY_ARTIST)),
        ALBUM_SORT_YEAR_ASCENDING => Some(Sort::asc(SORT_BY_YEAR)),
        ALBUM_SORT_YEAR_DESCENDING => Some(Sort::desc(SORT_BY_YEAR)),
        other => {
            debug!("Unknown album sort order {:?}, using server order", other);
            None
        }
    }
}

fn album_filter(filter: CatalogFilter) -> Option<ItemFilter<Album>> {
    if filter.is_empty() {
        return None;
    }
    Some(Arc::new(move |album: &Album| filter.matches_album(album)))
}

/// Pages d'un listing Jellyfin, converties en éléments du catalogue
pub struct ListingFetcher<T> {
    api: Arc<JellyfinApi>,
    kind: ItemKind,
    opts: QueryOpts,
    _item: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T> PageFetcher<T> for ListingFetcher<T>
where
    T: From<BaseItemDto> + Send + 'static,
{
    async fn fetch(&self, offset: usize, limit: usize) -> anyhow::Result<Vec<T>> {
        let opts = self.opts.clone().page(offset, limit);
        let items = self.api.list_items(self.kind, &opts).await?.items;
        Ok(items.into_iter().map(T::from).collect())
    }

    /// Une seule requête `Limit=0` qui lit `TotalRecordCount`
    async fn count(&self) -> anyhow::Result<Option<usize>> {
        Ok(Some(self.api.count_items(self.kind, &self.opts).await?))
    }
}

/// Navigation dans le catalogue d'un serveur Jellyfin authentifié
pub struct JellyfinProvider {
    api: Arc<JellyfinApi>,
    page_size: usize,
    prefetch_cover: RwLock<Option<CoverPrefetchFn>>,
}

impl JellyfinProvider {
    pub fn new(api: Arc<JellyfinApi>, page_size: usize) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            prefetch_cover: RwLock::new(None),
        }
    }

    pub fn api(&self) -> &Arc<JellyfinApi> {
        &self.api
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn hook<T: CatalogItem + 'static>(&self) -> Option<ItemHook<T>> {
        self.prefetch_cover
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .map(ItemHook::prefetch_cover)
    }

    /// Source de pages exécutant `opts` sur le listing `kind`
    fn fetcher<T>(&self, kind: ItemKind, opts: QueryOpts) -> ListingFetcher<T> {
        ListingFetcher {
            api: self.api.clone(),
            kind,
            opts,
            _item: PhantomData,
        }
    }
}

impl CatalogProvider for JellyfinProvider {
    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_random_sort: true,
            supports_favorite_filter: true,
            supports_year_filter: true,
            supports_genre_filter: true,
            supports_search: true,
        }
    }

    fn album_sort_orders(&self) -> Vec<&'static str> {
        vec![
            ALBUM_SORT_RECENTLY_ADDED,
            ALBUM_SORT_RANDOM,
            ALBUM_SORT_TITLE_AZ,
            ALBUM_SORT_ARTIST_AZ,
            ALBUM_SORT_YEAR_ASCENDING,
            ALBUM_SORT_YEAR_DESCENDING,
        ]
    }

    fn artist_sort_orders(&self) -> Vec<&'static str> {
        vec![ARTIST_SORT_NAME_AZ]
    }

    fn iterate_albums(&self, sort_order: &str, filter: &CatalogFilter) -> BoxedIterator<Album> {
        let (server_filter, residual) = translate_now(filter);
        let opts = QueryOpts {
            sort: album_sort(sort_order),
            filter: server_filter,
            ..Default::default()
        };
        let residual = album_filter(residual);
        debug!(sort_order, filter = ?opts.filter, "Iterating albums");

        if sort_order == ALBUM_SORT_RANDOM {
            // même filtre, ordre stable : borne et complète la passe aléatoire
            let deterministic = QueryOpts {
                sort: Some(Sort::asc(SORT_BY_NAME)),
                ..opts.clone()
            };
            let mut iter = RandomCatalogIterator::new(
                self.fetcher::<Album>(ItemKind::Album, deterministic),
                self.fetcher::<Album>(ItemKind::Album, opts),
                self.page_size,
            )
            .with_optional_hook(self.hook());
            if let Some(residual) = residual {
                iter = iter.with_filter(residual);
            }
            return Box::new(iter);
        }

        let mut iter = CatalogIterator::new(self.fetcher::<Album>(ItemKind::Album, opts), self.page_size)
            .with_optional_hook(self.hook());
        if let Some(residual) = residual {
            iter = iter.with_filter(residual);
        }
        Box::new(iter)
    }

    fn search_albums(&self, query: &str, filter: &CatalogFilter) -> BoxedIterator<Album> {
        // les résultats de recherche ne sont pas filtrés côté serveur
        let opts = QueryOpts {
            search: Some(query.to_string()),
            ..Default::default()
        };
        let mut iter = CatalogIterator::new(self.fetcher::<Album>(ItemKind::Album, opts), self.page_size)
            .with_optional_hook(self.hook());
        if let Some(filter) = album_filter(filter.clone()) {
            iter = iter.with_filter(filter);
        }
        Box::new(iter)
    }

    fn iterate_tracks(&self, query: &str) -> BoxedIterator<Track> {
        let opts = QueryOpts {
            search: (!query.is_empty()).then(|| query.to_string()),
            ..Default::default()
        };
        Box::new(
            CatalogIterator::new(self.fetcher::<Track>(ItemKind::Song, opts), self.page_size)
                .with_optional_hook(self.hook()),
        )
    }

    fn iterate_artists(&self, sort_order: &str) -> BoxedIterator<Artist> {
        let sort = match sort_order {
            "" | ARTIST_SORT_NAME_AZ => Some(Sort::asc(SORT_BY_NAME)),
            other => {
                debug!("Unknown artist sort order {:?}, using server order", other);
                None
            }
        };
        let opts = QueryOpts {
            sort,
            ..Default::default()
        };
        Box::new(CatalogIterator::new(
            self.fetcher::<Artist>(ItemKind::AlbumArtist, opts),
            self.page_size,
        ))
    }

    fn set_prefetch_cover_callback(&self, callback: Option<CoverPrefetchFn>) {
        *self
            .prefetch_cover
            .write()
            .unwrap_or_else(|e| e.into_inner()) = callback;
    }
}
