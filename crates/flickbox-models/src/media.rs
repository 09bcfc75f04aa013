use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvShow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

/// A catalog item, either a movie or a TV show. The `media_type` field on the
/// wire selects the variant, so a payload with an unknown or missing
/// discriminator fails to decode instead of producing a half-formed item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum MediaItem {
    Movie(Movie),
    Tv(TvShow),
}

impl MediaItem {
    pub fn id(&self) -> i64 {
        match self {
            MediaItem::Movie(m) => m.id,
            MediaItem::Tv(t) => t.id,
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self {
            MediaItem::Movie(_) => MediaType::Movie,
            MediaItem::Tv(_) => MediaType::Tv,
        }
    }

    pub fn display_title(&self) -> &str {
        match self {
            MediaItem::Movie(m) => &m.title,
            MediaItem::Tv(t) => &t.name,
        }
    }

    /// Release date for movies, first air date for shows.
    pub fn date(&self) -> Option<&str> {
        match self {
            MediaItem::Movie(m) => m.release_date.as_deref(),
            MediaItem::Tv(t) => t.first_air_date.as_deref(),
        }
    }

    /// Four-digit year extracted from the date, if present.
    pub fn year(&self) -> Option<&str> {
        self.date().and_then(|d| d.get(0..4)).filter(|y| !y.is_empty())
    }

    pub fn vote_average(&self) -> f64 {
        match self {
            MediaItem::Movie(m) => m.vote_average,
            MediaItem::Tv(t) => t.vote_average,
        }
    }

    pub fn overview(&self) -> &str {
        match self {
            MediaItem::Movie(m) => &m.overview,
            MediaItem::Tv(t) => &t.overview,
        }
    }

    pub fn genre_ids(&self) -> &[i64] {
        match self {
            MediaItem::Movie(m) => &m.genre_ids,
            MediaItem::Tv(t) => &t.genre_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_item_decodes_by_discriminator() {
        let movie: MediaItem = serde_json::from_str(
            r#"{"media_type":"movie","id":550,"title":"Fight Club","vote_average":8.4}"#,
        )
        .unwrap();
        assert_eq!(movie.media_type(), MediaType::Movie);
        assert_eq!(movie.display_title(), "Fight Club");

        let show: MediaItem = serde_json::from_str(
            r#"{"media_type":"tv","id":1399,"name":"Game of Thrones","first_air_date":"2011-04-17"}"#,
        )
        .unwrap();
        assert_eq!(show.media_type(), MediaType::Tv);
        assert_eq!(show.year(), Some("2011"));
    }

    #[test]
    fn media_item_rejects_unknown_discriminator() {
        let result = serde_json::from_str::<MediaItem>(
            r#"{"media_type":"person","id":287,"name":"Brad Pitt"}"#,
        );
        assert!(result.is_err());
    }
}
