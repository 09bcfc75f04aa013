use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage write failed. The in-memory mutation has been rolled back,
    /// so memory and storage still agree.
    #[error("failed to persist watchlist: {0}")]
    Persist(String),
}
