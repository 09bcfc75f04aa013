use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::media::{MediaItem, MediaType};

/// A denormalized snapshot of a catalog item taken at the moment it was
/// added. Descriptive fields are never refreshed afterwards, so they can go
/// stale relative to the catalog. `title` is set for movies and `name` for
/// shows, exactly as the catalog spelled them; the stored layout keeps both
/// field names so existing slots stay readable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    pub media_type: MediaType,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub watched: bool,
}

impl WatchlistEntry {
    /// Build the snapshot for a freshly added item. `added_at` is assigned
    /// here, once; `watched` starts false.
    pub fn from_media(item: &MediaItem, added_at: DateTime<Utc>) -> Self {
        match item {
            MediaItem::Movie(m) => Self {
                id: m.id,
                title: Some(m.title.clone()),
                name: None,
                overview: m.overview.clone(),
                poster_path: m.poster_path.clone(),
                backdrop_path: m.backdrop_path.clone(),
                release_date: m.release_date.clone(),
                first_air_date: None,
                vote_average: m.vote_average,
                vote_count: m.vote_count,
                popularity: m.popularity,
                genre_ids: m.genre_ids.clone(),
                media_type: MediaType::Movie,
                added_at,
                watched: false,
            },
            MediaItem::Tv(t) => Self {
                id: t.id,
                title: None,
                name: Some(t.name.clone()),
                overview: t.overview.clone(),
                poster_path: t.poster_path.clone(),
                backdrop_path: t.backdrop_path.clone(),
                release_date: None,
                first_air_date: t.first_air_date.clone(),
                vote_average: t.vote_average,
                vote_count: t.vote_count,
                popularity: t.popularity,
                genre_ids: t.genre_ids.clone(),
                media_type: MediaType::Tv,
                added_at,
                watched: false,
            },
        }
    }

    /// The composite identity: the same numeric id can exist once as a movie
    /// entry and once as a tv entry.
    pub fn key(&self) -> (i64, MediaType) {
        (self.id, self.media_type)
    }

    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Untitled")
    }

    pub fn date(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
    }
}
