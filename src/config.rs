//! Pool configuration options

use crate::errors::{share, SharedError};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Reconditions a resource before it re-enters the pool.
pub(crate) type Resetter<T> = dyn Fn(&mut T) -> Result<(), SharedError> + Send + Sync;

/// Configuration for object pool behavior
///
/// # Examples
///
/// ```
/// use fixedpool::PoolConfiguration;
/// use std::time::Duration;
///
/// let config = PoolConfiguration::<Vec<u8>>::new(4)
///     .with_timeout(Duration::from_secs(5))
///     .with_resetter(|buf: &mut Vec<u8>| {
///         buf.clear();
///         Ok::<_, std::io::Error>(())
///     });
///
/// assert_eq!(config.pool_size, 4);
/// assert_eq!(config.operation_timeout, Some(Duration::from_secs(5)));
/// assert!(config.has_resetter());
/// ```
pub struct PoolConfiguration<T> {
    /// Number of objects seeded into the pool; fixed for its lifetime
    pub pool_size: usize,

    /// Timeout used by `take_default`; `None` waits indefinitely
    pub operation_timeout: Option<Duration>,

    pub(crate) resetter: Option<Arc<Resetter<T>>>,
}

impl<T> Default for PoolConfiguration<T> {
    fn default() -> Self {
        Self {
            pool_size: 10,
            operation_timeout: Some(Duration::from_secs(30)),
            resetter: None,
        }
    }
}

impl<T> fmt::Debug for PoolConfiguration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfiguration")
            .field("pool_size", &self.pool_size)
            .field("operation_timeout", &self.operation_timeout)
            .field("resetter", &self.resetter.as_ref().map(|_| "Fn(&mut T)"))
            .finish()
    }
}

impl<T> Clone for PoolConfiguration<T> {
    fn clone(&self) -> Self {
        Self {
            pool_size: self.pool_size,
            operation_timeout: self.operation_timeout,
            resetter: self.resetter.clone(),
        }
    }
}

impl<T: 'static> PoolConfiguration<T> {
    /// Create a configuration for a pool of `pool_size` objects
    pub fn new(pool_size: usize) -> Self {
        Self::default().with_pool_size(pool_size)
    }

    /// Set the pool size
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Set the timeout used by `take_default`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Make `take_default` wait indefinitely
    pub fn without_timeout(mut self) -> Self {
        self.operation_timeout = None;
        self
    }

    /// Set the function applied to every object on release.
    ///
    /// A failing resetter does not shrink the pool: the object is still
    /// returned and the error is reported to the releasing caller.
    pub fn with_resetter<R, E>(mut self, resetter: R) -> Self
    where
        R: Fn(&mut T) -> Result<(), E> + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.resetter = Some(Arc::new(move |item: &mut T| resetter(item).map_err(share)));
        self
    }

    /// Whether a resetter is configured
    pub fn has_resetter(&self) -> bool {
        self.resetter.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfiguration::<u32>::default();
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.operation_timeout, Some(Duration::from_secs(30)));
        assert!(!config.has_resetter());
    }

    #[test]
    fn test_builder_chain() {
        let config = PoolConfiguration::<u32>::new(3)
            .with_timeout(Duration::from_millis(250))
            .without_timeout()
            .with_pool_size(7);

        assert_eq!(config.pool_size, 7);
        assert_eq!(config.operation_timeout, None);
    }

    #[test]
    fn test_resetter_errors_are_shared() {
        let config = PoolConfiguration::<u32>::new(1).with_resetter(|n: &mut u32| {
            if *n > 1 {
                Err(std::io::Error::other("too large"))
            } else {
                *n = 0;
                Ok(())
            }
        });

        let reset = config.resetter.as_ref().unwrap();
        let mut small = 1;
        assert!(reset(&mut small).is_ok());
        assert_eq!(small, 0);

        let mut big = 5;
        let err = reset(&mut big).unwrap_err();
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn test_debug_hides_closure() {
        let config = PoolConfiguration::<u32>::new(2)
            .with_resetter(|_: &mut u32| Ok::<_, std::io::Error>(()));
        let debug = format!("{:?}", config);
        assert!(debug.contains("pool_size: 2"));
        assert!(debug.contains("Fn(&mut T)"));
    }
}
