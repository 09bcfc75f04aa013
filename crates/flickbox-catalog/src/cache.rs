use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use flickbox_models::{Genre, MediaDetails, MediaItem, MediaType, Movie, Page, TvShow};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::CatalogError;
use crate::tmdb::DiscoverFilters;
use crate::traits::Catalog;

/// Time-windowed response cache keyed by request parameters. Values are kept
/// as JSON so one map serves every response type.
pub struct TtlCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, Value)>>,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => {
                debug!("Cache hit: {}", key);
                serde_json::from_value(value.clone()).ok()
            }
            Some(_) => {
                debug!("Cache expired: {}", key);
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert<T: Serialize>(&self, key: &str, value: &T) {
        // A value that can't be re-serialized just isn't cached.
        if let Ok(value) = serde_json::to_value(value) {
            let mut entries = self
                .entries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            entries.insert(key.to_string(), (Instant::now(), value));
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Caching wrapper over any catalog. List, search, and discover responses
/// share one window (30 minutes by default); genres get a much longer one
/// (24 hours) since they barely ever change. Details are a passthrough.
pub struct CachedCatalog<C> {
    inner: C,
    lists: TtlCache,
    genres: TtlCache,
}

impl<C: Catalog> CachedCatalog<C> {
    pub fn new(inner: C, list_ttl: Duration, genre_ttl: Duration) -> Self {
        Self {
            inner,
            lists: TtlCache::new(list_ttl),
            genres: TtlCache::new(genre_ttl),
        }
    }
}

#[async_trait]
impl<C: Catalog> Catalog for CachedCatalog<C> {
    async fn trending_movies(&self) -> Result<Vec<Movie>, CatalogError> {
        if let Some(hit) = self.lists.get("trending-movie") {
            return Ok(hit);
        }
        let fresh = self.inner.trending_movies().await?;
        self.lists.insert("trending-movie", &fresh);
        Ok(fresh)
    }

    async fn trending_tv(&self) -> Result<Vec<TvShow>, CatalogError> {
        if let Some(hit) = self.lists.get("trending-tv") {
            return Ok(hit);
        }
        let fresh = self.inner.trending_tv().await?;
        self.lists.insert("trending-tv", &fresh);
        Ok(fresh)
    }

    async fn popular_movies(&self) -> Result<Vec<Movie>, CatalogError> {
        if let Some(hit) = self.lists.get("popular-movie") {
            return Ok(hit);
        }
        let fresh = self.inner.popular_movies().await?;
        self.lists.insert("popular-movie", &fresh);
        Ok(fresh)
    }

    async fn top_rated_movies(&self) -> Result<Vec<Movie>, CatalogError> {
        if let Some(hit) = self.lists.get("top-rated-movie") {
            return Ok(hit);
        }
        let fresh = self.inner.top_rated_movies().await?;
        self.lists.insert("top-rated-movie", &fresh);
        Ok(fresh)
    }

    async fn top_rated_tv(&self) -> Result<Vec<TvShow>, CatalogError> {
        if let Some(hit) = self.lists.get("top-rated-tv") {
            return Ok(hit);
        }
        let fresh = self.inner.top_rated_tv().await?;
        self.lists.insert("top-rated-tv", &fresh);
        Ok(fresh)
    }

    async fn search_movies(&self, query: &str, page: u32) -> Result<Page<Movie>, CatalogError> {
        let key = format!("search-movie-{}-{}", query, page);
        if let Some(hit) = self.lists.get(&key) {
            return Ok(hit);
        }
        let fresh = self.inner.search_movies(query, page).await?;
        self.lists.insert(&key, &fresh);
        Ok(fresh)
    }

    async fn search_tv(&self, query: &str, page: u32) -> Result<Page<TvShow>, CatalogError> {
        let key = format!("search-tv-{}-{}", query, page);
        if let Some(hit) = self.lists.get(&key) {
            return Ok(hit);
        }
        let fresh = self.inner.search_tv(query, page).await?;
        self.lists.insert(&key, &fresh);
        Ok(fresh)
    }

    async fn search_multi(&self, query: &str, page: u32) -> Result<Page<MediaItem>, CatalogError> {
        let key = format!("search-multi-{}-{}", query, page);
        if let Some(hit) = self.lists.get(&key) {
            return Ok(hit);
        }
        let fresh = self.inner.search_multi(query, page).await?;
        self.lists.insert(&key, &fresh);
        Ok(fresh)
    }

    async fn discover(
        &self,
        media_type: MediaType,
        filters: &DiscoverFilters,
    ) -> Result<Page<MediaItem>, CatalogError> {
        let key = filters.cache_key(media_type);
        if let Some(hit) = self.lists.get(&key) {
            return Ok(hit);
        }
        let fresh = self.inner.discover(media_type, filters).await?;
        self.lists.insert(&key, &fresh);
        Ok(fresh)
    }

    async fn movie_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        if let Some(hit) = self.genres.get("genres-movie") {
            return Ok(hit);
        }
        let fresh = self.inner.movie_genres().await?;
        self.genres.insert("genres-movie", &fresh);
        Ok(fresh)
    }

    async fn tv_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        if let Some(hit) = self.genres.get("genres-tv") {
            return Ok(hit);
        }
        let fresh = self.inner.tv_genres().await?;
        self.genres.insert("genres-tv", &fresh);
        Ok(fresh)
    }

    async fn all_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        if let Some(hit) = self.genres.get("genres-all") {
            return Ok(hit);
        }
        let fresh = self.inner.all_genres().await?;
        self.genres.insert("genres-all", &fresh);
        Ok(fresh)
    }

    async fn movie_details(&self, id: i64) -> Result<MediaDetails, CatalogError> {
        self.inner.movie_details(id).await
    }

    async fn tv_details(&self, id: i64) -> Result<MediaDetails, CatalogError> {
        self.inner.tv_details(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn cache_hits_within_the_window() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("genres-all", &vec![Genre { id: 18, name: "Drama".to_string() }]);

        let hit: Option<Vec<Genre>> = cache.get("genres-all");
        assert_eq!(hit.unwrap()[0].id, 18);
        // Different key, no hit.
        assert!(cache.get::<Vec<Genre>>("genres-movie").is_none());
    }

    #[test]
    fn expired_entries_are_evicted_on_read() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert("trending-movie", &Vec::<Movie>::new());
        assert_eq!(cache.len(), 1);

        assert!(cache.get::<Vec<Movie>>("trending-movie").is_none());
        assert!(cache.is_empty());
    }

    /// Counts upstream calls so the tests can tell a hit from a miss.
    struct CountingCatalog {
        calls: AtomicUsize,
    }

    impl CountingCatalog {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl Catalog for CountingCatalog {
        async fn trending_movies(&self) -> Result<Vec<Movie>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
        async fn trending_tv(&self) -> Result<Vec<TvShow>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
        async fn popular_movies(&self) -> Result<Vec<Movie>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
        async fn top_rated_movies(&self) -> Result<Vec<Movie>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
        async fn top_rated_tv(&self) -> Result<Vec<TvShow>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
        async fn search_movies(&self, _: &str, _: u32) -> Result<Page<Movie>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Page::empty())
        }
        async fn search_tv(&self, _: &str, _: u32) -> Result<Page<TvShow>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Page::empty())
        }
        async fn search_multi(&self, _: &str, _: u32) -> Result<Page<MediaItem>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Page::empty())
        }
        async fn discover(
            &self,
            _: MediaType,
            _: &DiscoverFilters,
        ) -> Result<Page<MediaItem>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Page::empty())
        }
        async fn movie_genres(&self) -> Result<Vec<Genre>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
        async fn tv_genres(&self) -> Result<Vec<Genre>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
        async fn all_genres(&self) -> Result<Vec<Genre>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Genre { id: 18, name: "Drama".to_string() }])
        }
        async fn movie_details(&self, id: i64) -> Result<MediaDetails, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CatalogError::new(format!("no movie {id}")))
        }
        async fn tv_details(&self, id: i64) -> Result<MediaDetails, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CatalogError::new(format!("no show {id}")))
        }
    }

    #[tokio::test]
    async fn repeated_requests_are_served_from_cache() {
        let cached = CachedCatalog::new(
            CountingCatalog::new(),
            Duration::from_secs(60),
            Duration::from_secs(60),
        );

        cached.all_genres().await.unwrap();
        let second = cached.all_genres().await.unwrap();
        assert_eq!(second[0].name, "Drama");
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);

        // Distinct parameters miss independently.
        cached.search_movies("fight club", 1).await.unwrap();
        cached.search_movies("fight club", 2).await.unwrap();
        cached.search_movies("fight club", 1).await.unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn an_expired_window_goes_back_upstream() {
        let cached = CachedCatalog::new(
            CountingCatalog::new(),
            Duration::ZERO,
            Duration::from_secs(60),
        );

        cached.trending_movies().await.unwrap();
        cached.trending_movies().await.unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }
}
