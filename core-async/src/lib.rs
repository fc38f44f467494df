//! Runtime abstraction layer for the audio toolkit.
//!
//! All core-* crates depend on this crate instead of naming Tokio directly,
//! which keeps the executor choice in a single place.
//!
//! # Modules
//!
//! - `task`: Task spawning, including the blocking pool used for decode/encode work
//! - `sync`: Synchronization primitives (channels, semaphores, locks)
//! - `cancel`: Cooperative cancellation tokens
//! - `runtime`: Runtime construction and `block_on`
//!
//! # Examples
//!
//! ```rust
//! use core_async::{cancel::CancellationToken, task};
//!
//! async fn example() {
//!     let token = CancellationToken::new();
//!     let worker_token = token.clone();
//!
//!     let handle = task::spawn_blocking(move || {
//!         let mut blocks = 0;
//!         while !worker_token.is_cancelled() && blocks < 8 {
//!             blocks += 1;
//!         }
//!         blocks
//!     });
//!
//!     token.cancel();
//!     let _blocks = handle.await.unwrap();
//! }
//! ```

pub mod cancel;
pub mod runtime;
pub mod sync;
pub mod task;

pub use cancel::CancellationToken;
pub use task::{spawn, spawn_blocking};
