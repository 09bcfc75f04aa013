pub mod details;
pub mod genre;
pub mod media;
pub mod page;
pub mod watchlist;

pub use details::{CastMember, Credits, CrewMember, MediaDetails, Video};
pub use genre::Genre;
pub use media::{MediaItem, MediaType, Movie, TvShow};
pub use page::Page;
pub use watchlist::WatchlistEntry;
