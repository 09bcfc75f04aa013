use async_trait::async_trait;
use flickbox_models::{Genre, MediaDetails, MediaItem, MediaType, Movie, Page, TvShow};

use crate::error::CatalogError;
use crate::tmdb::DiscoverFilters;

/// The catalog seam. The watchlist core never talks to the network itself;
/// it only accepts already-fetched items, so this trait is the boundary the
/// rest of the application sees.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn trending_movies(&self) -> Result<Vec<Movie>, CatalogError>;
    async fn trending_tv(&self) -> Result<Vec<TvShow>, CatalogError>;
    async fn popular_movies(&self) -> Result<Vec<Movie>, CatalogError>;
    async fn top_rated_movies(&self) -> Result<Vec<Movie>, CatalogError>;
    async fn top_rated_tv(&self) -> Result<Vec<TvShow>, CatalogError>;

    async fn search_movies(&self, query: &str, page: u32) -> Result<Page<Movie>, CatalogError>;
    async fn search_tv(&self, query: &str, page: u32) -> Result<Page<TvShow>, CatalogError>;
    async fn search_multi(&self, query: &str, page: u32) -> Result<Page<MediaItem>, CatalogError>;

    async fn discover(
        &self,
        media_type: MediaType,
        filters: &DiscoverFilters,
    ) -> Result<Page<MediaItem>, CatalogError>;

    async fn movie_genres(&self) -> Result<Vec<Genre>, CatalogError>;
    async fn tv_genres(&self) -> Result<Vec<Genre>, CatalogError>;
    /// Movie and TV genres merged, deduplicated by id.
    async fn all_genres(&self) -> Result<Vec<Genre>, CatalogError>;

    async fn movie_details(&self, id: i64) -> Result<MediaDetails, CatalogError>;
    async fn tv_details(&self, id: i64) -> Result<MediaDetails, CatalogError>;
}
