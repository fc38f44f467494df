//! Synchronization primitives.
//!
//! Async-aware primitives from `tokio::sync`. All are `Send + Sync` and can be
//! shared across threads; the locks never block the executor.
//!
//! The toolkit relies on:
//! - `watch` for polling the latest job progress
//! - `broadcast` for the event bus
//! - `Semaphore` for bounding concurrently running jobs
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::watch;
//!
//! let (tx, rx) = watch::channel(0.0f64);
//! tx.send(0.5).unwrap();
//! assert_eq!(*rx.borrow(), 0.5);
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, AcquireError, Mutex, MutexGuard, Notify, OwnedSemaphorePermit,
    RwLock, RwLockReadGuard, RwLockWriteGuard, Semaphore, SemaphorePermit,
};
