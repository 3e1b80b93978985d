//! Représentation des éléments Jellyfin et conversion en modèles du catalogue

use pmocatalog::{Album, Artist, Track};
use serde::Deserialize;
use std::collections::HashMap;

/// Les `RunTimeTicks` sont en unités de 100 ns
const TICKS_PER_SECOND: u64 = 10_000_000;

/// Sous-ensemble du `BaseItemDto` Jellyfin utilisé pour les albums, morceaux et artistes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BaseItemDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "Type")]
    pub item_type: String,
    pub album: Option<String>,
    pub album_id: Option<String>,
    pub album_primary_image_tag: Option<String>,
    pub album_artists: Vec<NameIdPair>,
    pub artist_items: Vec<NameIdPair>,
    pub production_year: Option<u32>,
    pub genres: Vec<String>,
    pub run_time_ticks: Option<u64>,
    pub index_number: Option<u32>,
    pub parent_index_number: Option<u32>,
    pub child_count: Option<u32>,
    pub album_count: Option<u32>,
    pub image_tags: HashMap<String, String>,
    pub user_data: Option<UserItemData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NameIdPair {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserItemData {
    pub is_favorite: bool,
}

/// Réponse paginée des endpoints de listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ItemsResponse {
    pub items: Vec<BaseItemDto>,
    pub total_record_count: usize,
    pub start_index: usize,
}

impl BaseItemDto {
    fn is_favorite(&self) -> bool {
        self.user_data.as_ref().is_some_and(|d| d.is_favorite)
    }

    fn duration_secs(&self) -> u32 {
        self.run_time_ticks
            .map_or(0, |ticks| (ticks / TICKS_PER_SECOND) as u32)
    }

    /// Image principale propre, son identifiant étant celui de l'élément
    fn primary_image(&self) -> Option<String> {
        self.image_tags
            .contains_key("Primary")
            .then(|| self.id.clone())
    }
}

fn split(pairs: Vec<NameIdPair>) -> (Vec<String>, Vec<String>) {
    pairs.into_iter().map(|p| (p.id, p.name)).unzip()
}

impl From<BaseItemDto> for Album {
    fn from(item: BaseItemDto) -> Self {
        let cover_art_id = item.primary_image();
        let favorite = item.is_favorite();
        let duration = item.duration_secs();
        let (artist_ids, artist_names) = split(item.album_artists);
        Album {
            id: item.id,
            name: item.name,
            cover_art_id,
            artist_ids,
            artist_names,
            year: item.production_year.unwrap_or(0),
            genres: item.genres,
            track_count: item.child_count.unwrap_or(0),
            duration,
            favorite,
        }
    }
}

impl From<BaseItemDto> for Track {
    fn from(item: BaseItemDto) -> Self {
        // les morceaux ont rarement leur propre image, on prend celle de l'album
        let cover_art_id = item.primary_image().or_else(|| {
            item.album_primary_image_tag
                .as_ref()
                .and(item.album_id.clone())
        });
        let favorite = item.is_favorite();
        let duration = item.duration_secs();
        let (artist_ids, artist_names) = split(item.artist_items);
        Track {
            id: item.id,
            title: item.name,
            cover_art_id,
            album: item.album.unwrap_or_default(),
            album_id: item.album_id.unwrap_or_default(),
            artist_ids,
            artist_names,
            track_number: item.index_number.unwrap_or(0),
            disc_number: item.parent_index_number.unwrap_or(0),
            duration,
            year: item.production_year.unwrap_or(0),
            genres: item.genres,
            favorite,
        }
    }
}

impl From<BaseItemDto> for Artist {
    fn from(item: BaseItemDto) -> Self {
        Artist {
            cover_art_id: item.primary_image(),
            favorite: item.is_favorite(),
            album_count: item.album_count.or(item.child_count).unwrap_or(0),
            id: item.id,
            name: item.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_conversion() {
        let item: BaseItemDto = serde_json::from_value(serde_json::json!({
            "Id": "a1",
            "Name": "Kind of Blue",
            "Type": "MusicAlbum",
            "ProductionYear": 1959,
            "Genres": ["Jazz"],
            "AlbumArtists": [{"Id": "ar1", "Name": "Miles Davis"}],
            "ChildCount": 5,
            "RunTimeTicks": 27_540_000_000u64,
            "ImageTags": {"Primary": "f00"},
            "UserData": {"IsFavorite": true, "PlayCount": 3}
        }))
        .unwrap();

        let album = Album::from(item);
        assert_eq!(album.id, "a1");
        assert_eq!(album.cover_art_id.as_deref(), Some("a1"));
        assert_eq!(album.artist_names, vec!["Miles Davis"]);
        assert_eq!(album.artist_ids, vec!["ar1"]);
        assert_eq!(album.year, 1959);
        assert_eq!(album.track_count, 5);
        assert_eq!(album.duration, 2754);
        assert!(album.favorite);
    }

    #[test]
    fn test_track_uses_album_cover() {
        let item: BaseItemDto = serde_json::from_value(serde_json::json!({
            "Id": "t1",
            "Name": "So What",
            "Type": "Audio",
            "Album": "Kind of Blue",
            "AlbumId": "a1",
            "AlbumPrimaryImageTag": "f00",
            "ArtistItems": [{"Id": "ar1", "Name": "Miles Davis"}],
            "IndexNumber": 1,
            "ParentIndexNumber": 1
        }))
        .unwrap();

        let track = Track::from(item);
        assert_eq!(track.cover_art_id.as_deref(), Some("a1"));
        assert_eq!(track.album_id, "a1");
        assert_eq!(track.track_number, 1);
        assert!(!track.favorite);
    }

    #[test]
    fn test_missing_fields_default() {
        let item: BaseItemDto =
            serde_json::from_value(serde_json::json!({"Id": "x", "Name": "Unknown"})).unwrap();
        let artist = Artist::from(item);
        assert_eq!(artist.cover_art_id, None);
        assert_eq!(artist.album_count, 0);
    }
}
