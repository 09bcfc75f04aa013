use anyhow::{Context, Result};
use flickbox_models::WatchlistEntry;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Storage seam for the watchlist slot. The store is the only caller; the
/// adapter never initiates a mutation of its own.
pub trait WatchlistStorage: Send + Sync {
    /// Read the persisted collection. Never fails: an absent, unreadable, or
    /// corrupt slot degrades to an empty collection.
    fn load(&self) -> Vec<WatchlistEntry>;

    /// Replace the persisted collection. Write failures are surfaced to the
    /// caller, never swallowed.
    fn save(&self, entries: &[WatchlistEntry]) -> Result<()>;
}

/// The production adapter: one JSON array in a single file.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move a corrupt slot aside rather than deleting it. The watchlist is
    /// user data, not a rebuildable cache.
    fn quarantine(&self) {
        let backup = self.path.with_extension("json.bak");
        match std::fs::rename(&self.path, &backup) {
            Ok(()) => warn!("Moved corrupt watchlist slot to {:?}", backup),
            Err(e) => warn!("Failed to move corrupt watchlist slot aside: {}", e),
        }
    }
}

impl WatchlistStorage for JsonFileStorage {
    fn load(&self) -> Vec<WatchlistEntry> {
        if !self.path.exists() {
            debug!("Watchlist slot does not exist yet: {:?}", self.path);
            return Vec::new();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read watchlist slot {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        let raw: Vec<Value> = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Watchlist slot is corrupt ({}), starting with an empty watchlist",
                    e
                );
                self.quarantine();
                return Vec::new();
            }
        };

        // Decode entry by entry so one malformed entry doesn't take the
        // whole collection down with it.
        let total = raw.len();
        let entries: Vec<WatchlistEntry> = raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping malformed watchlist entry: {}", e);
                    None
                }
            })
            .collect();

        debug!(
            "Loaded {} of {} watchlist entries from {:?}",
            entries.len(),
            total,
            self.path
        );
        entries
    }

    fn save(&self, entries: &[WatchlistEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating watchlist directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(entries).context("serializing watchlist")?;

        // Atomic write: write to temp file, then rename. A concurrent writer
        // can lose the race but can never tear the slot.
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)
            .with_context(|| format!("writing watchlist to {:?}", temp_path))?;
        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("replacing watchlist slot {:?}", self.path))?;

        debug!("Saved {} watchlist entries to {:?}", entries.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flickbox_models::{MediaItem, Movie};

    fn entry(id: i64, title: &str) -> WatchlistEntry {
        let item = MediaItem::Movie(Movie {
            id,
            title: title.to_string(),
            overview: "overview".to_string(),
            poster_path: Some("/poster.jpg".to_string()),
            backdrop_path: None,
            release_date: Some("1999-10-15".to_string()),
            vote_average: 8.4,
            vote_count: 26000,
            popularity: 61.4,
            genre_ids: vec![18, 53],
        });
        WatchlistEntry::from_media(&item, Utc::now())
    }

    #[test]
    fn missing_slot_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("watchlist.json"));
        assert!(storage.load().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("watchlist.json"));

        let entries = vec![entry(550, "Fight Club"), entry(680, "Pulp Fiction")];
        storage.save(&entries).unwrap();
        let loaded = storage.load();
        assert_eq!(loaded, entries);

        // Serializing a just-loaded collection changes nothing.
        storage.save(&loaded).unwrap();
        assert_eq!(storage.load(), entries);
    }

    #[test]
    fn save_replaces_the_whole_slot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("watchlist.json"));

        storage
            .save(&[entry(550, "Fight Club"), entry(680, "Pulp Fiction")])
            .unwrap();
        storage.save(&[entry(550, "Fight Club")]).unwrap();

        let loaded = storage.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 550);
    }

    #[test]
    fn corrupt_slot_degrades_to_empty_and_is_quarantined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.json");
        std::fs::write(&path, "this is not json").unwrap();

        let storage = JsonFileStorage::new(path.clone());
        assert!(storage.load().is_empty());
        assert!(!path.exists());
        assert!(path.with_extension("json.bak").exists());
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.json");

        let good = serde_json::to_value(entry(550, "Fight Club")).unwrap();
        let slot = serde_json::json!([good, {"bogus": true}, 42]);
        std::fs::write(&path, serde_json::to_string(&slot).unwrap()).unwrap();

        let loaded = JsonFileStorage::new(path.clone()).load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 550);
        // Only whole-slot corruption is quarantined.
        assert!(path.exists());
    }

    #[test]
    fn stored_form_is_a_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.json");
        let storage = JsonFileStorage::new(path.clone());

        storage.save(&[entry(550, "Fight Club")]).unwrap();
        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let array = raw.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["id"], 550);
        assert_eq!(array[0]["media_type"], "movie");
        assert_eq!(array[0]["watched"], false);
    }
}
