use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long list, search, and discover responses stay fresh.
    #[serde(default = "default_list_ttl_minutes")]
    pub list_ttl_minutes: u64,
    /// How long genre responses stay fresh. Genres barely ever change.
    #[serde(default = "default_genre_ttl_hours")]
    pub genre_ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            list_ttl_minutes: default_list_ttl_minutes(),
            genre_ttl_hours: default_genre_ttl_hours(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_list_ttl_minutes() -> u64 {
    30
}

fn default_genre_ttl_hours() -> u64 {
    24
}

impl Config {
    /// Load from the config file, falling back to defaults when it does not
    /// exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.cache.list_ttl_minutes, 30);
        assert_eq!(config.cache.genre_ttl_hours, 24);
        assert_eq!(config.catalog.base_url, "https://api.themoviedb.org/3");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cache]\nlist_ttl_minutes = 5\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.cache.list_ttl_minutes, 5);
        assert_eq!(config.cache.genre_ttl_hours, 24);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.cache.list_ttl_minutes = 10;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.cache.list_ttl_minutes, 10);
    }
}
