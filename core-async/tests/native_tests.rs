//! Integration tests for core-async.
//!
//! These tests verify that the async abstraction works correctly with Tokio.

use core_async::{cancel::CancellationToken, runtime, sync, task};
use std::sync::Arc;

#[tokio::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    let result = handle.await.unwrap();
    assert_eq!(result, 42);
}

#[tokio::test]
async fn test_task_spawn_blocking() {
    let handle = task::spawn_blocking(|| {
        std::thread::sleep(std::time::Duration::from_millis(10));
        100
    });
    let result = handle.await.unwrap();
    assert_eq!(result, 100);
}

#[tokio::test]
async fn test_blocking_worker_observes_cancellation() {
    let token = CancellationToken::new();
    let worker_token = token.clone();
    let (started_tx, started_rx) = sync::oneshot::channel();

    let handle = task::spawn_blocking(move || {
        let _ = started_tx.send(());
        let mut iterations = 0u64;
        while !worker_token.is_cancelled() {
            iterations += 1;
            std::thread::yield_now();
        }
        iterations
    });

    started_rx.await.unwrap();
    token.cancel();

    // The worker exits once it sees the token; the count itself is irrelevant.
    let _ = handle.await.unwrap();
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn test_watch_latest_value() {
    let (tx, mut rx) = sync::watch::channel(0.0f64);

    task::spawn(async move {
        for step in 1..=4 {
            tx.send(step as f64 / 4.0).unwrap();
        }
    })
    .await
    .unwrap();

    rx.changed().await.ok();
    assert_eq!(*rx.borrow(), 1.0);
}

#[tokio::test]
async fn test_semaphore_bounds_concurrency() {
    let semaphore = Arc::new(sync::Semaphore::new(2));

    let first = semaphore.clone().acquire_owned().await.unwrap();
    let _second = semaphore.clone().acquire_owned().await.unwrap();
    assert_eq!(semaphore.available_permits(), 0);
    assert!(semaphore.clone().try_acquire_owned().is_err());

    drop(first);
    assert_eq!(semaphore.available_permits(), 1);
}

#[tokio::test]
async fn test_mutex() {
    let mutex = Arc::new(sync::Mutex::new(0));
    let mutex_clone = mutex.clone();

    let handle = task::spawn(async move {
        let mut guard = mutex_clone.lock().await;
        *guard += 1;
    });

    handle.await.unwrap();

    let guard = mutex.lock().await;
    assert_eq!(*guard, 1);
}

#[test]
fn test_block_on_outside_runtime() {
    assert!(!runtime::in_runtime());
    let value = runtime::block_on(async { 7 });
    assert_eq!(value, 7);
}
