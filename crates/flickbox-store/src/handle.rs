use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use flickbox_models::{MediaItem, MediaType, WatchlistEntry};

use crate::error::StoreError;
use crate::store::{Notice, WatchlistStore};

/// Shared handle to the one watchlist instance. Created once at startup and
/// cloned into every consumer; clones all observe the same store, so a
/// mutation is visible to every reader as soon as its notice is returned.
#[derive(Clone)]
pub struct Watchlist {
    inner: Arc<RwLock<WatchlistStore>>,
}

impl Watchlist {
    pub fn new(store: WatchlistStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    // A poisoned lock only means another holder panicked mid-operation; the
    // store itself is still consistent (mutations roll back on failure), so
    // recover the guard instead of propagating the panic.
    fn read(&self) -> RwLockReadGuard<'_, WatchlistStore> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, WatchlistStore> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add(&self, item: &MediaItem) -> Result<Notice, StoreError> {
        self.write().add(item)
    }

    pub fn remove(&self, id: i64, media_type: MediaType) -> Result<Notice, StoreError> {
        self.write().remove(id, media_type)
    }

    pub fn toggle_watched(&self, id: i64, media_type: MediaType) -> Result<Notice, StoreError> {
        self.write().toggle_watched(id, media_type)
    }

    pub fn clear(&self) -> Result<Notice, StoreError> {
        self.write().clear()
    }

    pub fn contains(&self, id: i64, media_type: MediaType) -> bool {
        self.read().contains(id, media_type)
    }

    pub fn entries(&self) -> Vec<WatchlistEntry> {
        self.read().entries().to_vec()
    }

    pub fn watched_items(&self) -> Vec<WatchlistEntry> {
        self.read().filter_by_watched(true)
    }

    pub fn unwatched_items(&self) -> Vec<WatchlistEntry> {
        self.read().filter_by_watched(false)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn watched_count(&self) -> usize {
        self.read().watched_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::WatchlistStorage;
    use anyhow::Result;
    use flickbox_models::Movie;
    use std::sync::Mutex;

    struct MemoryStorage {
        saved: Mutex<Vec<WatchlistEntry>>,
    }

    impl WatchlistStorage for MemoryStorage {
        fn load(&self) -> Vec<WatchlistEntry> {
            self.saved.lock().unwrap().clone()
        }

        fn save(&self, entries: &[WatchlistEntry]) -> Result<()> {
            *self.saved.lock().unwrap() = entries.to_vec();
            Ok(())
        }
    }

    fn open_handle() -> Watchlist {
        let storage = MemoryStorage {
            saved: Mutex::new(Vec::new()),
        };
        Watchlist::new(WatchlistStore::open(Box::new(storage)))
    }

    fn movie(id: i64, title: &str) -> MediaItem {
        MediaItem::Movie(Movie {
            id,
            title: title.to_string(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            vote_average: 0.0,
            vote_count: 0,
            popularity: 0.0,
            genre_ids: Vec::new(),
        })
    }

    #[test]
    fn clones_observe_the_same_state() {
        let handle = open_handle();
        let other = handle.clone();

        handle.add(&movie(550, "Fight Club")).unwrap();
        assert!(other.contains(550, MediaType::Movie));
        assert_eq!(other.len(), 1);

        other.toggle_watched(550, MediaType::Movie).unwrap();
        assert_eq!(handle.watched_count(), 1);
        assert_eq!(handle.watched_items().len(), 1);
        assert!(handle.unwatched_items().is_empty());
    }
}
