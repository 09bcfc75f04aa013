pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{CacheConfig, CatalogConfig, Config};
pub use credentials::{resolve_api_key, CredentialStore};
pub use paths::Paths;
