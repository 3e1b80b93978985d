//! Interface implémentée par les backends de catalogue (Jellyfin, ...)

use crate::fetch::CoverPrefetchFn;
use crate::filter::CatalogFilter;
use crate::iterator::ItemIterator;
use crate::models::{Album, Artist, Track};

/// Itérateur renvoyé par les fournisseurs
pub type BoxedIterator<T> = Box<dyn ItemIterator<T>>;

/// Fonctionnalités d'un fournisseur, déterminées à sa construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCapabilities {
    /// Tri aléatoire côté serveur (servi par un itérateur aléatoire)
    pub supports_random_sort: bool,
    /// Filtre des favoris côté serveur
    pub supports_favorite_filter: bool,
    /// Filtre de plage d'années côté serveur
    pub supports_year_filter: bool,
    /// Filtre de genres côté serveur
    pub supports_genre_filter: bool,
    /// Recherche plein texte des albums et morceaux
    pub supports_search: bool,
}

/// Point d'entrée de navigation d'un serveur connecté
///
/// Les ordres de tri sont des identifiants opaques comme `"Recently Added"` ou
/// `"Random"` ; leur correspondance avec les champs de tri du serveur relève
/// du fournisseur.
pub trait CatalogProvider: Send + Sync {
    fn capabilities(&self) -> ProviderCapabilities;

    fn album_sort_orders(&self) -> Vec<&'static str>;

    fn artist_sort_orders(&self) -> Vec<&'static str>;

    /// Albums dans l'ordre `sort_order`, restreints à `filter`
    ///
    /// Les critères que le serveur ne sait pas appliquer sont vérifiés côté client.
    fn iterate_albums(&self, sort_order: &str, filter: &CatalogFilter) -> BoxedIterator<Album>;

    fn search_albums(&self, query: &str, filter: &CatalogFilter) -> BoxedIterator<Album>;

    /// Tous les morceaux si `query` est vide, sinon les résultats de recherche
    fn iterate_tracks(&self, query: &str) -> BoxedIterator<Track>;

    /// Artistes d'album dans l'ordre `sort_order` ; un ordre vide choisit celui par défaut
    fn iterate_artists(&self, sort_order: &str) -> BoxedIterator<Artist>;

    /// Installe le callback de préchargement des pochettes déclenché pendant l'itération
    fn set_prefetch_cover_callback(&self, callback: Option<CoverPrefetchFn>);
}
