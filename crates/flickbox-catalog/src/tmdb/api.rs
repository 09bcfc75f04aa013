use anyhow::{anyhow, Result};
use flickbox_models::{Genre, MediaDetails, MediaItem, MediaType, Movie, Page, TvShow, Video};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Filters for the discover endpoints.
#[derive(Debug, Clone)]
pub struct DiscoverFilters {
    pub genres: Vec<i64>,
    pub sort_by: Option<String>,
    pub page: u32,
    pub year: Option<u32>,
    /// Minimum vote average.
    pub min_rating: Option<f64>,
}

impl Default for DiscoverFilters {
    fn default() -> Self {
        Self {
            genres: Vec::new(),
            sort_by: None,
            page: 1,
            year: None,
            min_rating: None,
        }
    }
}

impl DiscoverFilters {
    pub fn sort_key(&self) -> &str {
        self.sort_by.as_deref().unwrap_or("popularity.desc")
    }

    /// Stable cache key covering every parameter that changes the response.
    pub fn cache_key(&self, media_type: MediaType) -> String {
        let genres = self
            .genres
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "discover-{}-{}-{}-{}-{}-{}",
            media_type,
            genres,
            self.sort_key(),
            self.page,
            self.year.map_or_else(|| "any".to_string(), |y| y.to_string()),
            self.min_rating
                .map_or_else(|| "any".to_string(), |r| r.to_string()),
        )
    }
}

/// One GET against the catalog. Returns `None` for a 404 so list callers can
/// soften it to an empty page. Rate limiting gets a single one-second retry.
async fn fetch(
    client: &Client,
    base_url: &str,
    api_key: &str,
    path: &str,
    params: &[(&str, String)],
) -> Result<Option<Value>> {
    let url = format!("{}{}", base_url, path);
    let mut retried = false;

    loop {
        let response = client
            .get(&url)
            .query(&[("api_key", api_key)])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS && !retried {
            warn!("Catalog rate limited on {}, retrying in 1s", path);
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            retried = true;
            continue;
        }
        if status == StatusCode::NOT_FOUND {
            warn!("Catalog 404: {}", path);
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Catalog API error: {} - {}", status, body));
        }

        return Ok(Some(response.json().await?));
    }
}

#[derive(Deserialize)]
struct RawPage {
    #[serde(default = "first_page")]
    page: u32,
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_results: u64,
}

fn first_page() -> u32 {
    1
}

/// Shape a raw response into a typed page, skipping results that don't
/// decode (the multi-search endpoint mixes in people, for example).
fn parse_page<T: DeserializeOwned>(value: Option<Value>, what: &str) -> Page<T> {
    let Some(value) = value else {
        return Page::empty();
    };
    let raw: RawPage = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Unexpected catalog response shape for {}: {}", what, e);
            return Page::empty();
        }
    };

    let results: Vec<T> = raw
        .results
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!("Skipping {} result: {}", what, e);
                None
            }
        })
        .collect();

    Page {
        page: raw.page,
        results,
        total_pages: raw.total_pages,
        total_results: raw.total_results,
    }
}

fn list_results<T: DeserializeOwned>(value: Option<Value>, what: &str) -> Vec<T> {
    parse_page(value, what).results
}

pub async fn trending_movies(client: &Client, base_url: &str, api_key: &str) -> Result<Vec<Movie>> {
    let value = fetch(client, base_url, api_key, "/trending/movie/week", &[]).await?;
    Ok(list_results(value, "trending movies"))
}

pub async fn trending_tv(client: &Client, base_url: &str, api_key: &str) -> Result<Vec<TvShow>> {
    let value = fetch(client, base_url, api_key, "/trending/tv/week", &[]).await?;
    Ok(list_results(value, "trending tv"))
}

pub async fn popular_movies(client: &Client, base_url: &str, api_key: &str) -> Result<Vec<Movie>> {
    let value = fetch(client, base_url, api_key, "/movie/popular", &[]).await?;
    Ok(list_results(value, "popular movies"))
}

pub async fn top_rated_movies(
    client: &Client,
    base_url: &str,
    api_key: &str,
) -> Result<Vec<Movie>> {
    let value = fetch(client, base_url, api_key, "/movie/top_rated", &[]).await?;
    Ok(list_results(value, "top rated movies"))
}

pub async fn top_rated_tv(client: &Client, base_url: &str, api_key: &str) -> Result<Vec<TvShow>> {
    let value = fetch(client, base_url, api_key, "/tv/top_rated", &[]).await?;
    Ok(list_results(value, "top rated tv"))
}

pub async fn search_movies(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
    page: u32,
) -> Result<Page<Movie>> {
    let params = [("query", query.to_string()), ("page", page.to_string())];
    let value = fetch(client, base_url, api_key, "/search/movie", &params).await?;
    Ok(parse_page(value, "movie search"))
}

pub async fn search_tv(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
    page: u32,
) -> Result<Page<TvShow>> {
    let params = [("query", query.to_string()), ("page", page.to_string())];
    let value = fetch(client, base_url, api_key, "/search/tv", &params).await?;
    Ok(parse_page(value, "tv search"))
}

/// Mixed movie/TV search. Person results are dropped at the decode boundary.
pub async fn search_multi(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
    page: u32,
) -> Result<Page<MediaItem>> {
    let params = [("query", query.to_string()), ("page", page.to_string())];
    let value = fetch(client, base_url, api_key, "/search/multi", &params).await?;
    Ok(parse_page(value, "multi search"))
}

pub async fn discover(
    client: &Client,
    base_url: &str,
    api_key: &str,
    media_type: MediaType,
    filters: &DiscoverFilters,
) -> Result<Page<MediaItem>> {
    let path = match media_type {
        MediaType::Movie => "/discover/movie",
        MediaType::Tv => "/discover/tv",
    };

    let mut params: Vec<(&str, String)> = vec![
        ("sort_by", filters.sort_key().to_string()),
        ("page", filters.page.to_string()),
    ];
    if !filters.genres.is_empty() {
        let genres = filters
            .genres
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        params.push(("with_genres", genres));
    }
    if let Some(year) = filters.year {
        let key = match media_type {
            MediaType::Movie => "primary_release_year",
            MediaType::Tv => "first_air_date_year",
        };
        params.push((key, year.to_string()));
    }
    if let Some(rating) = filters.min_rating {
        params.push(("vote_average.gte", rating.to_string()));
    }

    let value = fetch(client, base_url, api_key, path, &params).await?;
    let page = match media_type {
        MediaType::Movie => parse_page::<Movie>(value, "discover movies").map(MediaItem::Movie),
        MediaType::Tv => parse_page::<TvShow>(value, "discover tv").map(MediaItem::Tv),
    };
    Ok(page)
}

#[derive(Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

pub async fn movie_genres(client: &Client, base_url: &str, api_key: &str) -> Result<Vec<Genre>> {
    genre_list(client, base_url, api_key, "/genre/movie/list").await
}

pub async fn tv_genres(client: &Client, base_url: &str, api_key: &str) -> Result<Vec<Genre>> {
    genre_list(client, base_url, api_key, "/genre/tv/list").await
}

/// Movie and TV genres combined. Both endpoints share most ids, so the merge
/// keeps the first occurrence of each id.
pub async fn all_genres(client: &Client, base_url: &str, api_key: &str) -> Result<Vec<Genre>> {
    let (movie, tv) = tokio::try_join!(
        movie_genres(client, base_url, api_key),
        tv_genres(client, base_url, api_key),
    )?;
    let mut combined = movie;
    combined.extend(tv);
    Ok(dedup_genres(combined))
}

async fn genre_list(
    client: &Client,
    base_url: &str,
    api_key: &str,
    path: &str,
) -> Result<Vec<Genre>> {
    let Some(value) = fetch(client, base_url, api_key, path, &[]).await? else {
        return Ok(Vec::new());
    };
    let list: GenreList = serde_json::from_value(value)?;
    Ok(list.genres)
}

pub fn dedup_genres(genres: Vec<Genre>) -> Vec<Genre> {
    let mut seen = std::collections::HashSet::new();
    genres
        .into_iter()
        .filter(|genre| seen.insert(genre.id))
        .collect()
}

#[derive(Deserialize)]
struct VideoList {
    #[serde(default)]
    results: Vec<Video>,
}

pub async fn movie_details(
    client: &Client,
    base_url: &str,
    api_key: &str,
    id: i64,
) -> Result<MediaDetails> {
    details(client, base_url, api_key, MediaType::Movie, id).await
}

pub async fn tv_details(
    client: &Client,
    base_url: &str,
    api_key: &str,
    id: i64,
) -> Result<MediaDetails> {
    details(client, base_url, api_key, MediaType::Tv, id).await
}

/// Detail, credits, and videos fetched concurrently and merged into one
/// record. A missing title is an error here; missing credits or videos are
/// not.
async fn details(
    client: &Client,
    base_url: &str,
    api_key: &str,
    media_type: MediaType,
    id: i64,
) -> Result<MediaDetails> {
    let base = format!("/{}/{}", media_type, id);
    let credits_path = format!("{}/credits", base);
    let videos_path = format!("{}/videos", base);

    let (detail, credits, videos) = tokio::try_join!(
        fetch(client, base_url, api_key, &base, &[]),
        fetch(client, base_url, api_key, &credits_path, &[]),
        fetch(client, base_url, api_key, &videos_path, &[]),
    )?;

    let detail = detail.ok_or_else(|| anyhow!("No {} with id {}", media_type, id))?;
    let mut details: MediaDetails = serde_json::from_value(detail)?;
    details.media_type = Some(media_type);

    if let Some(credits) = credits {
        details.credits = serde_json::from_value(credits).unwrap_or_default();
    }
    if let Some(videos) = videos {
        details.videos = serde_json::from_value::<VideoList>(videos)
            .map(|list| list.results)
            .unwrap_or_default();
    }

    Ok(details)
}
