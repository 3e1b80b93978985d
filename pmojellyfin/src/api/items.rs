//! Listings paginés : albums, morceaux, artistes d'album et recherche

use super::JellyfinApi;
use crate::error::Result;
use crate::models::{BaseItemDto, ItemsResponse};
use pmocatalog::ProviderFilter;
use tracing::debug;

pub const SORT_BY_DATE_CREATED: &str = "DateCreated";
pub const SORT_BY_RANDOM: &str = "Random";
pub const SORT_BY_NAME: &str = "SortName";
pub const SORT_BY_ARTIST: &str = "AlbumArtist,SortName";
pub const SORT_BY_YEAR: &str = "ProductionYear,SortName";

/// Type de listing interrogé
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Album,
    Song,
    AlbumArtist,
}

impl ItemKind {
    fn include_item_types(self) -> Option<&'static str> {
        match self {
            ItemKind::Album => Some("MusicAlbum"),
            ItemKind::Song => Some("Audio"),
            ItemKind::AlbumArtist => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Ascending,
    Descending,
}

impl SortMode {
    fn as_str(self) -> &'static str {
        match self {
            SortMode::Ascending => "Ascending",
            SortMode::Descending => "Descending",
        }
    }
}

/// Tri côté serveur
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: &'static str,
    /// `None` laisse le sens au serveur (tri aléatoire)
    pub mode: Option<SortMode>,
}

impl Sort {
    pub const fn asc(field: &'static str) -> Self {
        Self {
            field,
            mode: Some(SortMode::Ascending),
        }
    }

    pub const fn desc(field: &'static str) -> Self {
        Self {
            field,
            mode: Some(SortMode::Descending),
        }
    }

    pub const fn random() -> Self {
        Self {
            field: SORT_BY_RANDOM,
            mode: None,
        }
    }
}

/// Paramètres d'une requête de listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOpts {
    pub sort: Option<Sort>,
    pub filter: ProviderFilter,
    pub search: Option<String>,
    pub start_index: usize,
    /// `Some(0)` ne demande aucun élément, seulement `TotalRecordCount`
    pub limit: Option<usize>,
}

impl QueryOpts {
    /// Même requête pour la page `[offset, offset + limit)`
    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.start_index = offset;
        self.limit = Some(limit);
        self
    }

    fn params(&self, current_year: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![("StartIndex", self.start_index.to_string())];
        if let Some(limit) = self.limit {
            params.push(("Limit", limit.to_string()));
        }
        if let Some(sort) = &self.sort {
            params.push(("SortBy", sort.field.to_string()));
            if let Some(mode) = sort.mode {
                params.push(("SortOrder", mode.as_str().to_string()));
            }
        }
        if self.filter.favorite {
            params.push(("Filters", "IsFavorite".to_string()));
        }
        if let Some(years) = self.filter.years(current_year).filter(|y| !y.is_empty()) {
            let years = years
                .iter()
                .map(|y| y.to_string())
                .collect::<Vec<_>>()
                .join(",");
            params.push(("Years", years));
        }
        if !self.filter.genres.is_empty() {
            params.push(("Genres", self.filter.genres.join("|")));
        }
        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            params.push(("SearchTerm", term.to_string()));
        }
        params
    }
}

impl JellyfinApi {
    /// Une page du listing `kind` pour l'utilisateur connecté
    ///
    /// Une requête dont la plage d'années exclut tout élément reçoit une page
    /// vide sans contacter le serveur.
    pub async fn list_items(&self, kind: ItemKind, opts: &QueryOpts) -> Result<ItemsResponse> {
        let user_id = self.user_id()?;
        let current_year = pmocatalog::current_year();
        if opts.filter.matches_nothing(current_year) {
            debug!(range = ?opts.filter.year_range, "Empty year range, no request sent");
            return Ok(ItemsResponse::default());
        }
        let mut params = opts.params(current_year);

        match kind.include_item_types() {
            Some(types) => {
                params.push(("IncludeItemTypes", types.to_string()));
                params.push(("Recursive", "true".to_string()));
                params.push(("Fields", "Genres,ChildCount".to_string()));
                self.get(&format!("/Users/{}/Items", user_id), &params).await
            }
            None => {
                params.push(("UserId", user_id));
                self.get("/Artists/AlbumArtists", &params).await
            }
        }
    }

    /// Taille du listing, lue dans le `TotalRecordCount` d'une page vide
    pub async fn count_items(&self, kind: ItemKind, opts: &QueryOpts) -> Result<usize> {
        let opts = opts.clone().page(0, 0);
        Ok(self.list_items(kind, &opts).await?.total_record_count)
    }

    pub async fn get_albums(&self, opts: &QueryOpts) -> Result<Vec<BaseItemDto>> {
        Ok(self.list_items(ItemKind::Album, opts).await?.items)
    }

    pub async fn get_songs(&self, opts: &QueryOpts) -> Result<Vec<BaseItemDto>> {
        Ok(self.list_items(ItemKind::Song, opts).await?.items)
    }

    pub async fn get_album_artists(&self, opts: &QueryOpts) -> Result<Vec<BaseItemDto>> {
        Ok(self.list_items(ItemKind::AlbumArtist, opts).await?.items)
    }

    /// Recherche plein texte restreinte à `kind`
    pub async fn search(
        &self,
        query: &str,
        kind: ItemKind,
        start_index: usize,
        limit: usize,
    ) -> Result<Vec<BaseItemDto>> {
        let opts = QueryOpts {
            search: Some(query.to_string()),
            ..Default::default()
        }
        .page(start_index, limit);
        Ok(self.list_items(kind, &opts).await?.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_query_params() {
        let opts = QueryOpts {
            sort: Some(Sort::desc(SORT_BY_DATE_CREATED)),
            filter: ProviderFilter {
                favorite: true,
                year_range: Some((1998, 2000)),
                genres: vec!["Rock".into(), "Jazz".into()],
            },
            ..Default::default()
        }
        .page(40, 20);

        let params = opts.params(2026);
        assert_eq!(param(&params, "StartIndex"), Some("40"));
        assert_eq!(param(&params, "Limit"), Some("20"));
        assert_eq!(param(&params, "SortBy"), Some("DateCreated"));
        assert_eq!(param(&params, "SortOrder"), Some("Descending"));
        assert_eq!(param(&params, "Filters"), Some("IsFavorite"));
        assert_eq!(param(&params, "Years"), Some("1998,1999,2000"));
        assert_eq!(param(&params, "Genres"), Some("Rock|Jazz"));
        assert_eq!(param(&params, "SearchTerm"), None);
    }

    #[test]
    fn test_random_sort_has_no_direction() {
        let opts = QueryOpts {
            sort: Some(Sort::random()),
            search: Some(String::new()),
            ..Default::default()
        };
        let params = opts.params(2026);
        assert_eq!(param(&params, "Limit"), None);
        assert_eq!(param(&params, "SortBy"), Some("Random"));
        assert_eq!(param(&params, "SortOrder"), None);
        assert_eq!(param(&params, "Filters"), None);
        assert_eq!(param(&params, "SearchTerm"), None);
    }

    #[test]
    fn test_open_year_range_is_clamped() {
        let opts = QueryOpts {
            filter: ProviderFilter {
                year_range: Some((pmocatalog::EARLIEST_YEAR, u32::MAX)),
                ..Default::default()
            },
            ..Default::default()
        };
        let params = opts.params(2026);
        let years = param(&params, "Years").unwrap();
        assert!(years.starts_with("1900,1901,"));
        assert!(years.ends_with(",2025,2026"));
        assert_eq!(years.split(',').count(), 127);
    }

    #[test]
    fn test_count_query_asks_for_no_item() {
        let params = QueryOpts::default().page(0, 0).params(2026);
        assert_eq!(param(&params, "StartIndex"), Some("0"));
        assert_eq!(param(&params, "Limit"), Some("0"));
    }
}
