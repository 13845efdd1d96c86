#![cfg(not(target_vendor = "apple"))]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use cthreads::sem::SEM_VALUE_MAX;
use cthreads::{Semaphore, ThreadError, thread};

#[test]
fn count_of_two_admits_two_then_blocks_until_post() {
    let sem = Arc::new(Semaphore::init(2).unwrap());
    sem.wait().unwrap();
    sem.wait().unwrap();
    assert_eq!(sem.try_wait(), Err(ThreadError::WouldBlock));

    let passed = Arc::new(AtomicUsize::new(0));
    let waiters: Vec<_> = (0..2)
        .map(|_| {
            let sem = Arc::clone(&sem);
            let passed = Arc::clone(&passed);
            thread::spawn(None, move || match sem.timed_wait(2_000) {
                Ok(()) => {
                    passed.fetch_add(1, Ordering::SeqCst);
                    1
                }
                Err(_) => 0,
            })
            .unwrap()
        })
        .collect();

    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(passed.load(Ordering::SeqCst), 0, "a waiter passed without a post");

    sem.post().unwrap();
    let deadline = Instant::now() + Duration::from_secs(1);
    while passed.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        std::thread::yield_now();
    }
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(passed.load(Ordering::SeqCst), 1, "one post must release exactly one waiter");

    sem.post().unwrap();
    let total: usize = waiters.into_iter().map(|w| w.join().unwrap()).sum();
    assert_eq!(total, 2);
}

#[test]
fn timed_wait_on_empty_semaphore_times_out() {
    let sem = Semaphore::init(0).unwrap();
    let started = Instant::now();
    assert_eq!(sem.timed_wait(50), Err(ThreadError::TimedOut));
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(45), "returned early after {elapsed:?}");
    assert!(elapsed < Duration::from_millis(550), "overslept: {elapsed:?}");
}

#[test]
fn post_then_try_wait_succeeds() {
    let sem = Semaphore::init(0).unwrap();
    sem.post().unwrap();
    sem.try_wait().unwrap();
    assert_eq!(sem.try_wait(), Err(ThreadError::WouldBlock));
    sem.destroy().unwrap();
}

#[cfg(unix)]
#[test]
fn value_tracks_count() {
    let sem = Semaphore::init(3).unwrap();
    assert_eq!(sem.value(), Some(3));
    sem.wait().unwrap();
    assert_eq!(sem.value(), Some(2));
}

#[test]
fn initial_count_above_maximum_is_rejected() {
    assert!(matches!(
        Semaphore::init(SEM_VALUE_MAX + 1),
        Err(ThreadError::InitFailed(_))
    ));
}
