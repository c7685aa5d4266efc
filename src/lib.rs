//! # fixedpool
//!
//! Fixed-capacity, thread-safe object pool for Rust. A pool is seeded once
//! with a fixed number of objects; callers take them out, wait when none are
//! left, and release them back, optionally resetting them on the way in.
//!
//! ## Features
//!
//! - Pre-seeded pools built from a fallible seeder function
//! - Async `take` that waits for a release, with cancellation or timeout
//! - Direct handoff from a release to the oldest waiting taker
//! - Optional resetter applied to every released object
//! - Automatic return of objects via RAII (Drop trait)
//!
//! ## Quick Start
//!
//! ```rust
//! use fixedpool::ObjectPool;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = ObjectPool::new(1, || Ok::<_, std::io::Error>("test")).unwrap();
//!     let cancel = CancellationToken::new();
//!
//!     let first = pool.take(&cancel).await.unwrap();
//!
//!     let waiter = {
//!         let pool = pool.clone();
//!         tokio::spawn(async move { pool.take(&CancellationToken::new()).await })
//!     };
//!
//!     pool.release(first).unwrap();
//!     assert_eq!(waiter.await.unwrap().unwrap(), "test");
//! }
//! ```

mod pool;
mod config;
mod guard;
mod waiters;
mod errors;

pub use pool::ObjectPool;
pub use config::PoolConfiguration;
pub use guard::PooledObject;
pub use errors::{PoolError, PoolResult, SharedError};
