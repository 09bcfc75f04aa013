pub mod error;
pub mod handle;
pub mod storage;
pub mod store;

pub use error::StoreError;
pub use handle::Watchlist;
pub use storage::{JsonFileStorage, WatchlistStorage};
pub use store::{Notice, WatchlistStore};
