//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Backing-store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Store could not serve the query
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Fixture file could not be read
    #[error("Failed to read fixture: {0}")]
    FixtureIo(String),

    /// Fixture content is invalid
    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),
}
