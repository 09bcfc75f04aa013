use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Flat key-value credential file, kept separate from config.toml so the
/// settings file can be shared or committed without leaking secrets.
pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    pub fn get_tmdb_api_key(&self) -> Option<&String> {
        self.get("tmdb_api_key")
    }

    pub fn set_tmdb_api_key(&mut self, key: String) {
        self.set("tmdb_api_key".to_string(), key);
    }
}

/// Resolve the catalog API key: the TMDB_API_KEY environment variable wins,
/// then the credential store.
pub fn resolve_api_key(store: &CredentialStore) -> Option<String> {
    std::env::var("TMDB_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .or_else(|| store.get_tmdb_api_key().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_save_load_get() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");

        let mut store = CredentialStore::new(path.clone());
        store.set_tmdb_api_key("abc123".to_string());
        store.save().unwrap();

        let mut reloaded = CredentialStore::new(path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.get_tmdb_api_key(), Some(&"abc123".to_string()));
    }

    #[test]
    fn load_is_a_noop_when_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CredentialStore::new(dir.path().join("credentials.toml"));
        store.load().unwrap();
        assert!(store.get_tmdb_api_key().is_none());
    }
}
