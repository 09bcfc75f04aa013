use serde::{Deserialize, Serialize};

use crate::genre::Genre;
use crate::media::{MediaItem, MediaType, Movie, TvShow};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

/// Full detail record for a single title, assembled from the catalog's
/// detail, credits, and videos endpoints. Movie-only and TV-only fields are
/// all optional; `media_type` is filled in by the client since the detail
/// endpoints do not echo it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaDetails {
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_seasons: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_episodes: Option<u32>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub videos: Vec<Video>,
}

impl MediaDetails {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Untitled")
    }

    /// Collapse the detail record back into a list-shaped item, deriving
    /// `genre_ids` from the genre objects. This is what the watchlist
    /// snapshots when a title is added from its detail page.
    pub fn to_media_item(&self, media_type: MediaType) -> MediaItem {
        let genre_ids: Vec<i64> = self.genres.iter().map(|g| g.id).collect();
        match media_type {
            MediaType::Movie => MediaItem::Movie(Movie {
                id: self.id,
                title: self.display_title().to_string(),
                overview: self.overview.clone(),
                poster_path: self.poster_path.clone(),
                backdrop_path: self.backdrop_path.clone(),
                release_date: self.release_date.clone(),
                vote_average: self.vote_average,
                vote_count: self.vote_count,
                popularity: self.popularity,
                genre_ids,
            }),
            MediaType::Tv => MediaItem::Tv(TvShow {
                id: self.id,
                name: self.display_title().to_string(),
                overview: self.overview.clone(),
                poster_path: self.poster_path.clone(),
                backdrop_path: self.backdrop_path.clone(),
                first_air_date: self.first_air_date.clone(),
                vote_average: self.vote_average,
                vote_count: self.vote_count,
                popularity: self.popularity,
                genre_ids,
            }),
        }
    }
}
