//! Error types for the object pool

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A caller-supplied error (from a seeder or resetter), shared so that
/// [`PoolError`] stays `Clone`.
///
/// The original value can be recovered with `downcast_ref`.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug, Clone)]
pub enum PoolError {
    #[error("Pool size must be at least one")]
    InvalidSize,

    #[error("Seeding a pool resource failed: {0}")]
    Seed(#[source] SharedError),

    #[error("Resetting a released resource failed: {0}")]
    Reset(#[source] SharedError),

    #[error("Pool is at maximum capacity")]
    PoolFull,

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Operation was cancelled")]
    Cancelled,
}

impl PoolError {
    /// The caller's error wrapped by `Seed` or `Reset`, if any.
    pub fn caller_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            PoolError::Seed(err) | PoolError::Reset(err) => Some(&**err),
            _ => None,
        }
    }
}

pub(crate) fn share<E>(err: E) -> SharedError
where
    E: std::error::Error + Send + Sync + 'static,
{
    Arc::new(err)
}

pub type PoolResult<T> = Result<T, PoolError>;
