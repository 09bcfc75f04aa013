pub mod cache;
pub mod error;
pub mod tmdb;
pub mod traits;

pub use cache::{CachedCatalog, TtlCache};
pub use error::CatalogError;
pub use tmdb::{DiscoverFilters, TmdbClient, TMDB_BASE_URL};
pub use traits::Catalog;
