//! Concurrent storage access tests
//!
//! The CLI and a long-running host may open the same wallet directory at the
//! same time, each with its own `FileStorage` and `LoggingService`. These
//! tests check that concurrent writers never leave a torn snapshot or a lost
//! log line behind.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;

use rust_decimal::Decimal;
use tempfile::TempDir;

use wallet_core::adapters::file_storage::FileStorage;
use wallet_core::ports::KeyValueStorage;
use wallet_core::services::{EntryPoint, LoggingService};
use wallet_core::store::persist::{rehydrate, snapshot_json};
use wallet_core::{Action, PersistConfig, RehydrationOutcome, Store, User};

/// Number of concurrent threads for stress tests.
/// Keep this realistic: at most a few processes (host + CLI + maybe another
/// CLI command) share a wallet directory.
const THREAD_COUNT: usize = 6;

/// Number of iterations per thread
const ITERATIONS_PER_THREAD: usize = 10;

/// Snapshot of a signed-in user whose balance identifies the writer
fn snapshot_for(thread_id: usize, iteration: usize) -> String {
    let store = Store::default();
    store.dispatch(Action::LoginSuccess(
        User::new(format!("u-{}", thread_id), "Writer", "9876543210")
            .with_balance(Decimal::from((thread_id * 1000 + iteration) as u64)),
    ));
    store
        .with_state(|state| snapshot_json(state, &PersistConfig::default()))
        .unwrap()
}

/// Test: multiple storage instances writing and reading the same key.
///
/// Every read must see one complete snapshot, never a mix of two writes.
#[test]
fn test_concurrent_storage_instances_writing() {
    let temp_dir = TempDir::new().unwrap();
    let dir = Arc::new(temp_dir.path().to_path_buf());

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let success_count = Arc::new(AtomicUsize::new(0));
    let error_count = Arc::new(AtomicUsize::new(0));

    let mut handles = vec![];

    for thread_id in 0..THREAD_COUNT {
        let barrier = Arc::clone(&barrier);
        let dir = Arc::clone(&dir);
        let success_count = Arc::clone(&success_count);
        let error_count = Arc::clone(&error_count);

        let handle = thread::spawn(move || {
            barrier.wait();
            let start = Instant::now();

            // Each thread opens its OWN storage (simulating separate processes)
            let storage = FileStorage::new(dir.as_path()).unwrap();
            for i in 0..ITERATIONS_PER_THREAD {
                let write = storage.set_item("root", &snapshot_for(thread_id, i));
                let read = storage.get_item("root");

                match (write, read) {
                    (Ok(()), Ok(Some(raw))) if serde_json::from_str::<serde_json::Value>(&raw).is_ok() => {
                        success_count.fetch_add(1, Ordering::SeqCst);
                    }
                    (write, read) => {
                        eprintln!(
                            "Thread {}: iteration {} failed: write={:?} read={:?}",
                            thread_id, i, write, read
                        );
                        error_count.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
            println!(
                "Thread {}: Completed {} iterations in {:?}",
                thread_id,
                ITERATIONS_PER_THREAD,
                start.elapsed()
            );
        });

        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let total_errors = error_count.load(Ordering::SeqCst);
    assert_eq!(
        total_errors, 0,
        "Expected 0 errors but got {}. This indicates torn writes.",
        total_errors
    );
    assert_eq!(
        success_count.load(Ordering::SeqCst),
        THREAD_COUNT * ITERATIONS_PER_THREAD
    );

    // The surviving snapshot is one of the written ones and restores cleanly
    let storage = FileStorage::new(dir.as_path()).unwrap();
    let restored = rehydrate(&storage, &PersistConfig::default());
    assert_eq!(restored.outcome, RehydrationOutcome::Restored);
    assert!(restored.state.auth.is_authenticated());

    // No temp files left behind
    let leftovers: Vec<_> = std::fs::read_dir(dir.as_path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left: {:?}", leftovers);
}

/// Test: concurrent loggers appending to the same log file.
///
/// With the file lock in place every line survives intact.
#[test]
fn test_concurrent_loggers_appending() {
    let temp_dir = TempDir::new().unwrap();
    let dir = Arc::new(temp_dir.path().to_path_buf());
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|thread_id| {
            let dir = Arc::clone(&dir);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let logger = LoggingService::new(dir.as_path(), EntryPoint::Cli, "test").unwrap();
                barrier.wait();
                for i in 0..ITERATIONS_PER_THREAD {
                    logger
                        .log_event(&format!("event_{}_{}", thread_id, i))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let logger = LoggingService::new(dir.as_path(), EntryPoint::Cli, "test").unwrap();
    assert_eq!(
        logger.count().unwrap(),
        (THREAD_COUNT * ITERATIONS_PER_THREAD) as u64
    );
}
