//! Checked-out objects that return themselves to the pool

use crate::errors::PoolResult;
use crate::pool::ObjectPool;

use log::warn;
use std::ops::{Deref, DerefMut};

/// A pooled object that automatically returns to the pool when dropped
///
/// # Examples
///
/// ```
/// use fixedpool::ObjectPool;
///
/// let pool = ObjectPool::new(1, || Ok::<_, std::io::Error>(String::from("conn"))).unwrap();
/// {
///     let conn = pool.try_checkout().unwrap();
///     assert_eq!(conn.as_str(), "conn");
///     assert_eq!(pool.available_count(), 0);
/// }
/// assert_eq!(pool.available_count(), 1);
/// ```
pub struct PooledObject<T> {
    value: Option<T>,
    pool: ObjectPool<T>,
}

impl<T> PooledObject<T> {
    pub(crate) fn new(value: T, pool: ObjectPool<T>) -> Self {
        Self {
            value: Some(value),
            pool,
        }
    }

    /// Return the object now, reporting a reset failure to the caller
    pub fn release(mut self) -> PoolResult<()> {
        match self.value.take() {
            Some(value) => self.pool.release(value),
            None => Ok(()),
        }
    }
}

impl<T> Deref for PooledObject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.value.as_ref().expect("Value already released")
    }
}

impl<T> DerefMut for PooledObject<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.value.as_mut().expect("Value already released")
    }
}

impl<T> Drop for PooledObject<T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take()
            && let Err(err) = self.pool.release(value)
        {
            warn!("pooled object released on drop: {}", err);
        }
    }
}
