//! Core object pool implementation

use crate::config::{PoolConfiguration, Resetter};
use crate::errors::{share, PoolError, PoolResult};
use crate::guard::PooledObject;
use crate::waiters::{Registration, WaiterQueue};

use crossbeam::queue::ArrayQueue;
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub(crate) struct PoolInner<T> {
    available: ArrayQueue<T>,
    waiters: WaiterQueue<T>,
    resetter: Option<Arc<Resetter<T>>>,
    operation_timeout: Option<Duration>,
    capacity: usize,
}

/// Thread-safe pool over a fixed set of pre-seeded objects.
///
/// Cloning the pool is cheap and yields another handle to the same objects.
///
/// # Examples
///
/// ```
/// use fixedpool::ObjectPool;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut next = 0;
/// let pool = ObjectPool::new(2, || {
///     next += 1;
///     Ok::<_, std::io::Error>(next)
/// })
/// .unwrap();
///
/// let cancel = CancellationToken::new();
/// let first = pool.take(&cancel).await.unwrap();
/// let _second = pool.take(&cancel).await.unwrap();
/// assert_eq!(pool.available_count(), 0);
///
/// pool.release(first).unwrap();
/// assert_eq!(pool.take(&cancel).await.unwrap(), first);
/// # }
/// ```
pub struct ObjectPool<T> {
    inner: Arc<PoolInner<T>>,
}

impl<T> Clone for ObjectPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> ObjectPool<T> {
    /// Take an object if one is available right now
    pub fn try_take(&self) -> Option<T> {
        self.inner.available.pop()
    }

    /// Return an object to the pool.
    ///
    /// The resetter runs first. If it fails the object is still returned and
    /// the failure is reported as [`PoolError::Reset`]. Releasing into a pool
    /// that already holds `capacity` objects drops the surplus object and
    /// fails with [`PoolError::PoolFull`]; that takes precedence over a reset
    /// failure, which is then only logged. Never blocks.
    pub fn release(&self, mut item: T) -> PoolResult<()> {
        let reset = match self.inner.resetter {
            Some(ref reset) => reset(&mut item),
            None => Ok(()),
        };

        if self.inner.waiters.hand_off(item, &self.inner.available).is_err() {
            if let Err(err) = reset {
                warn!("surplus object failed to reset before being dropped: {}", err);
            }
            return Err(PoolError::PoolFull);
        }

        reset.map_err(PoolError::Reset)
    }

    /// Number of objects the pool was seeded with
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Number of objects currently in the pool
    pub fn available_count(&self) -> usize {
        self.inner.available.len()
    }

    /// Number of takers currently blocked on an empty pool
    pub fn waiting_count(&self) -> usize {
        self.inner.waiters.live_count()
    }
}

impl<T: Send + 'static> ObjectPool<T> {
    /// Create a pool of `size` objects produced by `seeder`, without a resetter
    pub fn new<S, E>(size: usize, seeder: S) -> PoolResult<Self>
    where
        S: FnMut() -> Result<T, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::with_config(PoolConfiguration::new(size), seeder)
    }

    /// Create a pool from a configuration.
    ///
    /// `seeder` is called exactly `config.pool_size` times, in order. The first
    /// failure aborts construction with [`PoolError::Seed`].
    pub fn with_config<S, E>(config: PoolConfiguration<T>, mut seeder: S) -> PoolResult<Self>
    where
        S: FnMut() -> Result<T, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let capacity = config.pool_size;
        if capacity == 0 {
            return Err(PoolError::InvalidSize);
        }

        let available = ArrayQueue::new(capacity);
        for _ in 0..capacity {
            let item = seeder().map_err(|err| PoolError::Seed(share(err)))?;
            let pushed = available.push(item);
            debug_assert!(pushed.is_ok(), "seeded past pool capacity");
        }
        debug!("seeded object pool with {} objects", capacity);

        Ok(Self {
            inner: Arc::new(PoolInner {
                available,
                waiters: WaiterQueue::new(),
                resetter: config.resetter,
                operation_timeout: config.operation_timeout,
                capacity,
            }),
        })
    }

    /// Take an object, waiting for a release if the pool is empty.
    ///
    /// Fails with [`PoolError::Cancelled`] if `cancel` fires first. An
    /// object that is available when called is returned even if `cancel`
    /// has already fired.
    pub async fn take(&self, cancel: &CancellationToken) -> PoolResult<T> {
        if let Some(item) = self.try_take() {
            return Ok(item);
        }
        if cancel.is_cancelled() {
            return Err(PoolError::Cancelled);
        }
        self.wait_for_handoff(cancel.cancelled(), PoolError::Cancelled)
            .await
    }

    /// Take an object, failing with [`PoolError::Timeout`] after `timeout`
    pub async fn take_timeout(&self, timeout: Duration) -> PoolResult<T> {
        if let Some(item) = self.try_take() {
            return Ok(item);
        }
        self.wait_for_handoff(tokio::time::sleep(timeout), PoolError::Timeout(timeout))
            .await
    }

    /// Take an object using the configured operation timeout.
    ///
    /// Waits indefinitely when the pool was configured without one.
    pub async fn take_default(&self) -> PoolResult<T> {
        match self.inner.operation_timeout {
            Some(timeout) => self.take_timeout(timeout).await,
            None => self.take(&CancellationToken::new()).await,
        }
    }

    /// Take an object wrapped in a guard that releases it when dropped
    pub async fn checkout(&self, cancel: &CancellationToken) -> PoolResult<PooledObject<T>> {
        let item = self.take(cancel).await?;
        Ok(PooledObject::new(item, self.clone()))
    }

    /// Guarded form of [`try_take`](Self::try_take)
    pub fn try_checkout(&self) -> Option<PooledObject<T>> {
        self.try_take().map(|item| PooledObject::new(item, self.clone()))
    }

    async fn wait_for_handoff<F>(&self, abort: F, abort_error: PoolError) -> PoolResult<T>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(abort);

        loop {
            // Dropping the slot, here or with this future, passes on an
            // object delivered after the taker stopped listening.
            let mut slot = match self.inner.waiters.register(&self.inner.available) {
                Registration::Ready(item) => return Ok(item),
                Registration::Waiting(slot) => slot,
            };

            tokio::select! {
                biased;

                delivered = slot.recv() => {
                    // Senders are only dropped unsent once the receiver is
                    // closed, so an error here means registering again.
                    if let Ok(item) = delivered {
                        return Ok(item);
                    }
                }
                _ = &mut abort => return Err(abort_error),
            }
        }
    }
}
