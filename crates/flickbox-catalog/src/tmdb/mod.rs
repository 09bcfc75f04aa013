pub mod api;
pub mod client;

pub use api::DiscoverFilters;
pub use client::{TmdbClient, TMDB_BASE_URL};
