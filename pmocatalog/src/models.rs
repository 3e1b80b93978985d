//! Éléments du catalogue produits par les itérateurs
//!
//! Les fournisseurs convertissent leur représentation réseau vers ces types ;
//! les itérateurs n'ont besoin que de la vue [`CatalogItem`] (identifiant et
//! pochette).

use serde::{Deserialize, Serialize};

/// Vue commune des albums, morceaux et artistes
pub trait CatalogItem {
    /// Identifiant unique chez le fournisseur, utilisé pour le dédoublonnage
    fn id(&self) -> &str;

    /// Identifiant de la pochette, s'il y en a une
    fn cover_art_id(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cover_art_id: Option<String>,
    #[serde(default)]
    pub artist_ids: Vec<String>,
    #[serde(default)]
    pub artist_names: Vec<String>,
    /// Année de sortie, 0 si inconnue
    #[serde(default)]
    pub year: u32,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub track_count: u32,
    /// Durée totale en secondes
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub favorite: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub cover_art_id: Option<String>,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub album_id: String,
    #[serde(default)]
    pub artist_ids: Vec<String>,
    #[serde(default)]
    pub artist_names: Vec<String>,
    #[serde(default)]
    pub track_number: u32,
    #[serde(default)]
    pub disc_number: u32,
    /// Durée en secondes
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub year: u32,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub favorite: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cover_art_id: Option<String>,
    #[serde(default)]
    pub album_count: u32,
    #[serde(default)]
    pub favorite: bool,
}

impl CatalogItem for Album {
    fn id(&self) -> &str {
        &self.id
    }

    fn cover_art_id(&self) -> Option<&str> {
        self.cover_art_id.as_deref()
    }
}

impl CatalogItem for Track {
    fn id(&self) -> &str {
        &self.id
    }

    fn cover_art_id(&self) -> Option<&str> {
        self.cover_art_id.as_deref()
    }
}

impl CatalogItem for Artist {
    fn id(&self) -> &str {
        &self.id
    }

    fn cover_art_id(&self) -> Option<&str> {
        self.cover_art_id.as_deref()
    }
}
