//! Runtime utilities that abstract over the underlying async executor.
//!
//! Downstream crates never need to depend on Tokio directly: hosts that do
//! not run their own executor can use [`block_on`] or build a runtime through
//! the re-exported [`Builder`].

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion using a lightweight runtime.
///
/// # Panics
///
/// Panics if the current-thread runtime cannot be constructed, or if called
/// from inside another runtime.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}

/// Returns `true` if the caller is running inside a Tokio runtime.
pub fn in_runtime() -> bool {
    Handle::try_current().is_ok()
}
