use chrono::Utc;
use flickbox_models::{MediaItem, MediaType, WatchlistEntry};
use tracing::debug;

use crate::error::StoreError;
use crate::storage::WatchlistStorage;

/// What a mutation did, rendered to the user as a notice. `NotFound` and
/// `AlreadyInWatchlist` are informational, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Added { title: String },
    AlreadyInWatchlist { title: String },
    Removed { title: String },
    MarkedWatched { title: String },
    MarkedUnwatched { title: String },
    NotFound,
    Cleared,
}

/// Sole owner and sole writer of the watchlist collection. Entries are kept
/// in display order, newest first; (`id`, `media_type`) is the identity.
/// Every successful mutation is written through to storage before the notice
/// is returned; a failed write rolls the mutation back.
pub struct WatchlistStore {
    entries: Vec<WatchlistEntry>,
    storage: Box<dyn WatchlistStorage>,
}

impl WatchlistStore {
    /// Hydrate from the persisted slot. A missing or corrupt slot degrades to
    /// an empty watchlist rather than an error.
    pub fn open(storage: Box<dyn WatchlistStorage>) -> Self {
        let entries = storage.load();
        Self { entries, storage }
    }

    /// Snapshot `item` into the watchlist. A duplicate composite key leaves
    /// the collection untouched and reports `AlreadyInWatchlist`.
    pub fn add(&mut self, item: &MediaItem) -> Result<Notice, StoreError> {
        let title = item.display_title().to_string();
        if self.contains(item.id(), item.media_type()) {
            debug!(
                "{} ({} {}) is already in the watchlist",
                title,
                item.media_type(),
                item.id()
            );
            return Ok(Notice::AlreadyInWatchlist { title });
        }

        self.entries
            .insert(0, WatchlistEntry::from_media(item, Utc::now()));
        match self.persist() {
            Ok(()) => Ok(Notice::Added { title }),
            Err(e) => {
                self.entries.remove(0);
                Err(e)
            }
        }
    }

    pub fn remove(&mut self, id: i64, media_type: MediaType) -> Result<Notice, StoreError> {
        let Some(pos) = self.position(id, media_type) else {
            debug!("No watchlist entry for {} {}", media_type, id);
            return Ok(Notice::NotFound);
        };

        let entry = self.entries.remove(pos);
        match self.persist() {
            Ok(()) => Ok(Notice::Removed {
                title: entry.display_title().to_string(),
            }),
            Err(e) => {
                self.entries.insert(pos, entry);
                Err(e)
            }
        }
    }

    /// Flip the watched flag, the only field mutable after creation.
    pub fn toggle_watched(&mut self, id: i64, media_type: MediaType) -> Result<Notice, StoreError> {
        let Some(pos) = self.position(id, media_type) else {
            debug!("No watchlist entry for {} {}", media_type, id);
            return Ok(Notice::NotFound);
        };

        self.entries[pos].watched = !self.entries[pos].watched;
        match self.persist() {
            Ok(()) => {
                let entry = &self.entries[pos];
                let title = entry.display_title().to_string();
                if entry.watched {
                    Ok(Notice::MarkedWatched { title })
                } else {
                    Ok(Notice::MarkedUnwatched { title })
                }
            }
            Err(e) => {
                self.entries[pos].watched = !self.entries[pos].watched;
                Err(e)
            }
        }
    }

    pub fn clear(&mut self) -> Result<Notice, StoreError> {
        let previous = std::mem::take(&mut self.entries);
        match self.persist() {
            Ok(()) => Ok(Notice::Cleared),
            Err(e) => {
                self.entries = previous;
                Err(e)
            }
        }
    }

    pub fn contains(&self, id: i64, media_type: MediaType) -> bool {
        self.position(id, media_type).is_some()
    }

    /// Display order: newest first.
    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn filter_by_watched(&self, watched: bool) -> Vec<WatchlistEntry> {
        self.entries
            .iter()
            .filter(|e| e.watched == watched)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn watched_count(&self) -> usize {
        self.entries.iter().filter(|e| e.watched).count()
    }

    fn position(&self, id: i64, media_type: MediaType) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.id == id && e.media_type == media_type)
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.storage
            .save(&self.entries)
            .map_err(|e| StoreError::Persist(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use flickbox_models::{Movie, TvShow};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory adapter whose saved state the tests can inspect, with a
    /// switch to make every save fail.
    #[derive(Default)]
    struct MemoryStorage {
        saved: Mutex<Vec<WatchlistEntry>>,
        fail_saves: AtomicBool,
    }

    impl WatchlistStorage for Arc<MemoryStorage> {
        fn load(&self) -> Vec<WatchlistEntry> {
            self.saved.lock().unwrap().clone()
        }

        fn save(&self, entries: &[WatchlistEntry]) -> Result<()> {
            if self.fail_saves.load(Ordering::SeqCst) {
                anyhow::bail!("quota exceeded");
            }
            *self.saved.lock().unwrap() = entries.to_vec();
            Ok(())
        }
    }

    fn movie(id: i64, title: &str) -> MediaItem {
        MediaItem::Movie(Movie {
            id,
            title: title.to_string(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: Some("1999-10-15".to_string()),
            vote_average: 8.4,
            vote_count: 26000,
            popularity: 61.4,
            genre_ids: vec![18],
        })
    }

    fn tv(id: i64, name: &str) -> MediaItem {
        MediaItem::Tv(TvShow {
            id,
            name: name.to_string(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            first_air_date: Some("2011-04-17".to_string()),
            vote_average: 9.2,
            vote_count: 21000,
            popularity: 300.0,
            genre_ids: vec![10765],
        })
    }

    fn open_store() -> (WatchlistStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::default());
        let store = WatchlistStore::open(Box::new(storage.clone()));
        (store, storage)
    }

    #[test]
    fn distinct_adds_are_all_retrievable() {
        let (mut store, _) = open_store();
        for id in 1..=5 {
            store.add(&movie(id, &format!("Movie {id}"))).unwrap();
        }
        assert_eq!(store.len(), 5);
        for id in 1..=5 {
            assert!(store.contains(id, MediaType::Movie));
        }
    }

    #[test]
    fn add_inserts_newest_first() {
        let (mut store, _) = open_store();
        store.add(&movie(1, "First")).unwrap();
        store.add(&movie(2, "Second")).unwrap();
        assert_eq!(store.entries()[0].id, 2);
        assert_eq!(store.entries()[1].id, 1);
    }

    #[test]
    fn duplicate_add_is_a_noop_with_notice() {
        let (mut store, _) = open_store();
        store.add(&movie(550, "Fight Club")).unwrap();
        let notice = store.add(&movie(550, "Fight Club")).unwrap();
        assert_eq!(
            notice,
            Notice::AlreadyInWatchlist {
                title: "Fight Club".to_string()
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_makes_contains_false() {
        let (mut store, _) = open_store();
        store.add(&movie(550, "Fight Club")).unwrap();
        let notice = store.remove(550, MediaType::Movie).unwrap();
        assert_eq!(
            notice,
            Notice::Removed {
                title: "Fight Club".to_string()
            }
        );
        assert!(!store.contains(550, MediaType::Movie));
    }

    #[test]
    fn remove_missing_reports_not_found_and_changes_nothing() {
        let (mut store, _) = open_store();
        store.add(&movie(550, "Fight Club")).unwrap();
        assert_eq!(store.remove(551, MediaType::Movie).unwrap(), Notice::NotFound);
        // Same id, other media type: still not found.
        assert_eq!(store.remove(550, MediaType::Tv).unwrap(), Notice::NotFound);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn toggle_watched_is_its_own_inverse() {
        let (mut store, _) = open_store();
        store.add(&movie(550, "Fight Club")).unwrap();

        let notice = store.toggle_watched(550, MediaType::Movie).unwrap();
        assert_eq!(
            notice,
            Notice::MarkedWatched {
                title: "Fight Club".to_string()
            }
        );
        assert!(store.entries()[0].watched);

        let notice = store.toggle_watched(550, MediaType::Movie).unwrap();
        assert_eq!(
            notice,
            Notice::MarkedUnwatched {
                title: "Fight Club".to_string()
            }
        );
        assert!(!store.entries()[0].watched);
    }

    #[test]
    fn toggle_missing_reports_not_found() {
        let (mut store, _) = open_store();
        assert_eq!(
            store.toggle_watched(550, MediaType::Movie).unwrap(),
            Notice::NotFound
        );
    }

    #[test]
    fn watched_filters_partition_the_collection() {
        let (mut store, _) = open_store();
        for id in 1..=4 {
            store.add(&movie(id, &format!("Movie {id}"))).unwrap();
        }
        store.toggle_watched(1, MediaType::Movie).unwrap();
        store.toggle_watched(3, MediaType::Movie).unwrap();

        let watched = store.filter_by_watched(true);
        let unwatched = store.filter_by_watched(false);
        assert_eq!(watched.len() + unwatched.len(), store.len());
        assert_eq!(store.watched_count(), 2);
        assert!(watched.iter().all(|e| e.watched));
        assert!(unwatched.iter().all(|e| !e.watched));
    }

    #[test]
    fn same_id_is_distinct_across_media_types() {
        let (mut store, storage) = open_store();
        store.add(&movie(550, "Fight Club")).unwrap();
        store.toggle_watched(550, MediaType::Movie).unwrap();
        store.add(&tv(550, "Some Show")).unwrap();
        assert_eq!(store.len(), 2);

        store.remove(550, MediaType::Movie).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.entries()[0].media_type, MediaType::Tv);

        store.clear().unwrap();
        assert!(store.is_empty());
        // The slot reflects the empty collection too.
        assert!(storage.saved.lock().unwrap().is_empty());
    }

    #[test]
    fn every_mutation_writes_through() {
        let (mut store, storage) = open_store();
        store.add(&movie(550, "Fight Club")).unwrap();
        assert_eq!(storage.saved.lock().unwrap().len(), 1);

        store.toggle_watched(550, MediaType::Movie).unwrap();
        assert!(storage.saved.lock().unwrap()[0].watched);

        store.remove(550, MediaType::Movie).unwrap();
        assert!(storage.saved.lock().unwrap().is_empty());
    }

    #[test]
    fn reopen_hydrates_from_storage() {
        let (mut store, storage) = open_store();
        store.add(&movie(550, "Fight Club")).unwrap();
        store.add(&tv(1399, "Game of Thrones")).unwrap();
        drop(store);

        let reopened = WatchlistStore::open(Box::new(storage));
        assert_eq!(reopened.len(), 2);
        assert!(reopened.contains(550, MediaType::Movie));
        assert!(reopened.contains(1399, MediaType::Tv));
    }

    #[test]
    fn failed_writes_roll_back_every_mutation() {
        let (mut store, storage) = open_store();
        store.add(&movie(550, "Fight Club")).unwrap();
        store.add(&movie(680, "Pulp Fiction")).unwrap();
        let before = store.entries().to_vec();

        storage.fail_saves.store(true, Ordering::SeqCst);

        assert!(store.add(&movie(11, "Star Wars")).is_err());
        assert_eq!(store.entries(), before.as_slice());

        assert!(store.remove(550, MediaType::Movie).is_err());
        assert_eq!(store.entries(), before.as_slice());

        assert!(store.toggle_watched(550, MediaType::Movie).is_err());
        assert_eq!(store.entries(), before.as_slice());

        assert!(store.clear().is_err());
        assert_eq!(store.entries(), before.as_slice());

        // Storage never saw the failed mutations either.
        assert_eq!(storage.saved.lock().unwrap().as_slice(), before.as_slice());
    }
}
