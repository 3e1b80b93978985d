//! Filtres du catalogue et leur traduction en filtres natifs des fournisseurs
//!
//! Un [`CatalogFilter`] est ce que demande la couche de navigation. Les
//! fournisseurs peuvent en appliquer une partie côté serveur ; [`translate`]
//! découpe le filtre en un [`ProviderFilter`] envoyé avec chaque requête de
//! page et un [`CatalogFilter`] *résiduel* qui ne garde que les critères
//! restant à vérifier côté client.

use crate::models::{Album, Track};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Borne basse utilisée quand seule une année maximale est demandée
pub const EARLIEST_YEAR: u32 = 1900;

/// Filtre demandé par la couche de navigation
///
/// Une borne d'année `None` ou `Some(0)` est considérée comme absente.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    #[serde(default)]
    pub exclude_unfavorited: bool,
    #[serde(default)]
    pub min_year: Option<u32>,
    #[serde(default)]
    pub max_year: Option<u32>,
    #[serde(default)]
    pub genres: BTreeSet<String>,
}

/// Filtre natif du fournisseur, opaque pour les itérateurs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFilter {
    pub favorite: bool,
    /// Plage d'années `(min, max)` inclusive
    pub year_range: Option<(u32, u32)>,
    pub genres: Vec<String>,
}

impl CatalogFilter {
    pub fn min_year(&self) -> Option<u32> {
        self.min_year.filter(|y| *y > 0)
    }

    pub fn max_year(&self) -> Option<u32> {
        self.max_year.filter(|y| *y > 0)
    }

    /// Vrai quand aucun critère n'est positionné
    pub fn is_empty(&self) -> bool {
        !self.exclude_unfavorited
            && self.min_year().is_none()
            && self.max_year().is_none()
            && self.genres.is_empty()
    }

    fn matches(&self, favorite: bool, year: u32, genres: &[String]) -> bool {
        if self.exclude_unfavorited && !favorite {
            return false;
        }
        if self.min_year().is_some_and(|min| year < min) {
            return false;
        }
        if self.max_year().is_some_and(|max| year > max) {
            return false;
        }
        if !self.genres.is_empty() && !genres.iter().any(|g| self.genres.contains(g)) {
            return false;
        }
        true
    }

    /// Vérification côté client d'un album
    pub fn matches_album(&self, album: &Album) -> bool {
        self.matches(album.favorite, album.year, &album.genres)
    }

    /// Vérification côté client d'un morceau
    pub fn matches_track(&self, track: &Track) -> bool {
        self.matches(track.favorite, track.year, &track.genres)
    }
}

impl ProviderFilter {
    pub fn is_empty(&self) -> bool {
        !self.favorite && self.year_range.is_none() && self.genres.is_empty()
    }

    /// Années de `year_range` sous forme de liste, `None` sans plage
    ///
    /// La liste est bornée à `[EARLIEST_YEAR, current_year]` et reste courte
    /// quelles que soient les bornes demandées.
    pub fn years(&self, current_year: u32) -> Option<Vec<u32>> {
        self.year_range
            .map(|(min, max)| (min.max(EARLIEST_YEAR)..=max.min(current_year)).collect())
    }

    /// Vrai quand la plage d'années exclut tout élément
    ///
    /// Une telle requête ne doit pas atteindre le serveur : une liste d'années
    /// vide y serait lue comme « pas de contrainte d'année ».
    pub fn matches_nothing(&self, current_year: u32) -> bool {
        self.years(current_year).is_some_and(|years| years.is_empty())
    }
}

/// Découpe `filter` en filtre fournisseur et filtre résiduel côté client
///
/// `current_year` ferme une plage qui n'a qu'un minimum. Le résiduel ne
/// reprend jamais un critère appliqué par le fournisseur : traduire un
/// résiduel donne un filtre fournisseur vide et le même résiduel.
pub fn translate(filter: &CatalogFilter, current_year: u32) -> (ProviderFilter, CatalogFilter) {
    let mut provider = ProviderFilter::default();
    let mut residual = filter.clone();

    if filter.exclude_unfavorited {
        provider.favorite = true;
        residual.exclude_unfavorited = false;
    }

    provider.year_range = match (filter.min_year(), filter.max_year()) {
        (Some(min), Some(max)) => Some((min, max)),
        (Some(min), None) => Some((min, current_year)),
        (None, Some(max)) => Some((EARLIEST_YEAR, max)),
        (None, None) => None,
    };
    if provider.year_range.is_some() {
        residual.min_year = None;
        residual.max_year = None;
    }

    if !filter.genres.is_empty() {
        provider.genres = filter.genres.iter().cloned().collect();
        residual.genres.clear();
    }

    (provider, residual)
}

/// Année calendaire locale
pub fn current_year() -> u32 {
    chrono::Local::now().year().max(0) as u32
}

/// [`translate`] avec l'année calendaire locale
pub fn translate_now(filter: &CatalogFilter) -> (ProviderFilter, CatalogFilter) {
    translate(filter, current_year())
}
