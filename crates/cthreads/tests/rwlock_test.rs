use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use cthreads::{ErrorKind, RwLock, ThreadError, thread};

#[test]
fn readers_hold_the_lock_together() {
    const READERS: usize = 4;
    let lock = Arc::new(RwLock::init().unwrap());
    // Every reader waits here while holding its read lock, so the barrier
    // only opens if all of them are inside at once.
    let all_inside = Arc::new(Barrier::new(READERS));
    let readers_now = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..READERS)
        .map(|_| {
            let lock = Arc::clone(&lock);
            let all_inside = Arc::clone(&all_inside);
            let readers_now = Arc::clone(&readers_now);
            let peak = Arc::clone(&peak);
            thread::spawn(None, move || {
                let guard = lock.read().unwrap();
                let now = readers_now.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                all_inside.wait();
                readers_now.fetch_sub(1, Ordering::SeqCst);
                guard.unlock().unwrap();
                0
            })
            .unwrap()
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(peak.load(Ordering::SeqCst), READERS);
}

#[test]
fn writer_is_always_alone() {
    const THREADS: usize = 6;
    const ROUNDS: usize = 500;
    let lock = Arc::new(RwLock::init().unwrap());
    let readers = Arc::new(AtomicUsize::new(0));
    let writers = Arc::new(AtomicUsize::new(0));
    let violations = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..THREADS)
        .map(|index| {
            let lock = Arc::clone(&lock);
            let readers = Arc::clone(&readers);
            let writers = Arc::clone(&writers);
            let violations = Arc::clone(&violations);
            thread::spawn(None, move || {
                for round in 0..ROUNDS {
                    if (index + round) % 3 == 0 {
                        lock.write_lock().unwrap();
                        let w = writers.fetch_add(1, Ordering::SeqCst) + 1;
                        if w != 1 || readers.load(Ordering::SeqCst) != 0 {
                            violations.fetch_add(1, Ordering::SeqCst);
                        }
                        writers.fetch_sub(1, Ordering::SeqCst);
                    } else {
                        lock.read_lock().unwrap();
                        readers.fetch_add(1, Ordering::SeqCst);
                        if writers.load(Ordering::SeqCst) != 0 {
                            violations.fetch_add(1, Ordering::SeqCst);
                        }
                        readers.fetch_sub(1, Ordering::SeqCst);
                    }
                    // SAFETY: acquired in one of the branches above.
                    unsafe { lock.unlock() }.unwrap();
                }
                0
            })
            .unwrap()
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(violations.load(Ordering::SeqCst), 0);
}

#[test]
fn try_variants_report_contention() {
    let lock = Arc::new(RwLock::init().unwrap());

    let reader = lock.read().unwrap();
    let other = Arc::clone(&lock);
    let outcome = thread::spawn(None, move || {
        let write_blocked = other.try_write_lock() == Err(ThreadError::WouldBlock);
        let read_ok = other.try_read_lock().is_ok();
        if read_ok {
            // SAFETY: read lock taken just above.
            unsafe { other.unlock() }.unwrap();
        }
        usize::from(write_blocked) + 2 * usize::from(read_ok)
    })
    .unwrap()
    .join()
    .unwrap();
    assert_eq!(outcome, 3, "writer must be refused while readers may share");
    reader.unlock().unwrap();

    let writer = lock.write().unwrap();
    let other = Arc::clone(&lock);
    let outcome = thread::spawn(None, move || {
        usize::from(other.try_read_lock() == Err(ThreadError::WouldBlock))
            + usize::from(other.try_write_lock() == Err(ThreadError::WouldBlock))
    })
    .unwrap()
    .join()
    .unwrap();
    assert_eq!(outcome, 2);
    writer.unlock().unwrap();

    let lock = Arc::into_inner(lock).unwrap();
    lock.destroy().unwrap();
}

#[test]
fn interleaved_shared_releases_keep_lock_consistent() {
    let lock = RwLock::init().unwrap();
    lock.read_lock().unwrap();
    lock.read_lock().unwrap();
    // SAFETY: two read holds taken above.
    unsafe {
        lock.unlock().unwrap();
        lock.unlock().unwrap();
    }
    lock.write_lock().unwrap();
    // SAFETY: write hold taken above.
    unsafe { lock.unlock() }.unwrap();
    lock.destroy().unwrap();
}

#[test]
fn destroying_held_rwlock_reports_busy() {
    let lock = RwLock::init().unwrap();
    lock.read_lock().unwrap();
    assert_eq!(lock.destroy().map_err(|e| e.kind()), Err(ErrorKind::DestroyFailed));

    let lock = RwLock::init().unwrap();
    lock.write_lock().unwrap();
    assert_eq!(lock.destroy().map_err(|e| e.kind()), Err(ErrorKind::DestroyFailed));
}

#[test]
fn destroy_after_release_succeeds() {
    let lock = RwLock::init().unwrap();
    lock.read().unwrap().unlock().unwrap();
    lock.write().unwrap().unlock().unwrap();
    lock.destroy().unwrap();
}
