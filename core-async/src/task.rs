//! Task spawning and execution abstractions.
//!
//! - `spawn`: async tasks on the Tokio runtime
//! - `spawn_blocking`: CPU-bound work (decoding, encoding, waveform passes)
//!   on Tokio's blocking thread pool so the async executor is never stalled
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! async fn example() {
//!     let handle = task::spawn(async { 42 });
//!     assert_eq!(handle.await.unwrap(), 42);
//!
//!     let frames = task::spawn_blocking(|| 4096usize).await.unwrap();
//!     assert_eq!(frames, 4096);
//! }
//! ```

pub use tokio::task::{spawn_blocking, yield_now, JoinError, JoinHandle};

/// Spawns a new asynchronous task using the Tokio runtime.
///
/// The spawned task may run on a different thread.
///
/// # Examples
///
/// ```rust
/// use core_async::task::spawn;
///
/// # async fn example() {
/// let handle = spawn(async { 42 });
/// let result = handle.await.unwrap();
/// assert_eq!(result, 42);
/// # }
/// ```
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
