use std::sync::Arc;

use async_trait::async_trait;
use flickbox_models::{Genre, MediaDetails, MediaItem, MediaType, Movie, Page, TvShow};
use reqwest::Client;

use crate::error::CatalogError;
use crate::tmdb::api::{self, DiscoverFilters};
use crate::traits::Catalog;

pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

#[derive(Clone)]
pub struct TmdbClient {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, TMDB_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn source_err(e: anyhow::Error) -> CatalogError {
    CatalogError::new(format!("{}", e))
}

#[async_trait]
impl Catalog for TmdbClient {
    async fn trending_movies(&self) -> Result<Vec<Movie>, CatalogError> {
        api::trending_movies(&self.client, &self.base_url, &self.api_key)
            .await
            .map_err(source_err)
    }

    async fn trending_tv(&self) -> Result<Vec<TvShow>, CatalogError> {
        api::trending_tv(&self.client, &self.base_url, &self.api_key)
            .await
            .map_err(source_err)
    }

    async fn popular_movies(&self) -> Result<Vec<Movie>, CatalogError> {
        api::popular_movies(&self.client, &self.base_url, &self.api_key)
            .await
            .map_err(source_err)
    }

    async fn top_rated_movies(&self) -> Result<Vec<Movie>, CatalogError> {
        api::top_rated_movies(&self.client, &self.base_url, &self.api_key)
            .await
            .map_err(source_err)
    }

    async fn top_rated_tv(&self) -> Result<Vec<TvShow>, CatalogError> {
        api::top_rated_tv(&self.client, &self.base_url, &self.api_key)
            .await
            .map_err(source_err)
    }

    async fn search_movies(&self, query: &str, page: u32) -> Result<Page<Movie>, CatalogError> {
        api::search_movies(&self.client, &self.base_url, &self.api_key, query, page)
            .await
            .map_err(source_err)
    }

    async fn search_tv(&self, query: &str, page: u32) -> Result<Page<TvShow>, CatalogError> {
        api::search_tv(&self.client, &self.base_url, &self.api_key, query, page)
            .await
            .map_err(source_err)
    }

    async fn search_multi(&self, query: &str, page: u32) -> Result<Page<MediaItem>, CatalogError> {
        api::search_multi(&self.client, &self.base_url, &self.api_key, query, page)
            .await
            .map_err(source_err)
    }

    async fn discover(
        &self,
        media_type: MediaType,
        filters: &DiscoverFilters,
    ) -> Result<Page<MediaItem>, CatalogError> {
        api::discover(
            &self.client,
            &self.base_url,
            &self.api_key,
            media_type,
            filters,
        )
        .await
        .map_err(source_err)
    }

    async fn movie_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        api::movie_genres(&self.client, &self.base_url, &self.api_key)
            .await
            .map_err(source_err)
    }

    async fn tv_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        api::tv_genres(&self.client, &self.base_url, &self.api_key)
            .await
            .map_err(source_err)
    }

    async fn all_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        api::all_genres(&self.client, &self.base_url, &self.api_key)
            .await
            .map_err(source_err)
    }

    async fn movie_details(&self, id: i64) -> Result<MediaDetails, CatalogError> {
        api::movie_details(&self.client, &self.base_url, &self.api_key, id)
            .await
            .map_err(source_err)
    }

    async fn tv_details(&self, id: i64) -> Result<MediaDetails, CatalogError> {
        api::tv_details(&self.client, &self.base_url, &self.api_key, id)
            .await
            .map_err(source_err)
    }
}
