use anyhow::Result;
use std::path::{Path, PathBuf};

pub struct Paths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl Paths {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("flickbox");
        Ok(Self::from_base(base_dir))
    }

    /// Root everything under an explicit base directory. Used for the
    /// FLICKBOX_BASE_PATH override and in tests.
    pub fn from_base(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("credentials.toml")
    }

    /// The single storage slot holding the serialized watchlist.
    pub fn watchlist_file(&self) -> PathBuf {
        self.data_dir.join("watchlist.json")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        if let Ok(base) = std::env::var("FLICKBOX_BASE_PATH") {
            return Self::from_base(PathBuf::from(base));
        }
        Self::new().unwrap_or_else(|_| Self::from_base(PathBuf::from(".flickbox")))
    }
}
