use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cthreads::{ErrorKind, Mutex, MutexAttr, MutexKind, ThreadError, thread};

#[test]
fn at_most_one_thread_inside_critical_section() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 2_000;

    let mutex = Arc::new(Mutex::new().unwrap());
    let inside = Arc::new(AtomicUsize::new(0));
    let max_inside = Arc::new(AtomicUsize::new(0));
    let total = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let mutex = Arc::clone(&mutex);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            let total = Arc::clone(&total);
            thread::spawn(None, move || {
                for _ in 0..ROUNDS {
                    mutex.lock().unwrap();
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    total.fetch_add(1, Ordering::Relaxed);
                    inside.fetch_sub(1, Ordering::SeqCst);
                    // SAFETY: locked above by this thread.
                    unsafe { mutex.unlock() }.unwrap();
                }
                0
            })
            .unwrap()
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    assert_eq!(total.load(Ordering::Relaxed), THREADS * ROUNDS);
}

#[test]
fn try_lock_on_held_mutex_would_block() {
    let mutex = Arc::new(Mutex::new().unwrap());
    let guard = mutex.guard().unwrap();

    let contender = Arc::clone(&mutex);
    let result = thread::spawn(None, move || match contender.try_lock() {
        Err(ThreadError::WouldBlock) => 1,
        Ok(()) => 2,
        Err(_) => 3,
    })
    .unwrap()
    .join()
    .unwrap();
    assert_eq!(result, 1, "try_lock must report WouldBlock, not succeed or fail");

    guard.unlock().unwrap();
    let contender = Arc::clone(&mutex);
    let result = thread::spawn(None, move || {
        let acquired = contender.try_guard().is_ok();
        usize::from(acquired)
    })
    .unwrap()
    .join()
    .unwrap();
    assert_eq!(result, 1);
}

#[test]
fn recursive_mutex_relocks_from_owner() {
    let mutex = Arc::new(Mutex::init(Some(&MutexAttr::recursive())).unwrap());
    mutex.lock().unwrap();
    mutex.lock().unwrap();
    mutex.try_lock().unwrap();

    let contender = Arc::clone(&mutex);
    let blocked = thread::spawn(None, move || {
        usize::from(contender.try_lock() == Err(ThreadError::WouldBlock))
    })
    .unwrap()
    .join()
    .unwrap();
    assert_eq!(blocked, 1);

    for _ in 0..3 {
        // SAFETY: one unlock per acquisition above.
        unsafe { mutex.unlock() }.unwrap();
    }
    let mutex = Arc::into_inner(mutex).unwrap();
    mutex.destroy().unwrap();
}

#[test]
fn attribute_kinds_initialize() {
    for kind in [MutexKind::Normal, MutexKind::Recursive, MutexKind::ErrorCheck] {
        let attr = MutexAttr::new().kind(kind).robust(true);
        let mutex = Mutex::init(Some(&attr)).unwrap();
        let guard = mutex.guard().unwrap();
        drop(guard);
        mutex.destroy().unwrap();
    }
}

#[test]
fn malformed_attributes_fail_init() {
    let mut attr = MutexAttr::new();
    attr.priority_ceiling = Some(5);
    assert!(matches!(Mutex::init(Some(&attr)), Err(ThreadError::InitFailed(_))));
}

#[test]
fn unsupported_knobs_are_dropped_not_rejected() {
    let attr = MutexAttr::new().priority_inherit().process_shared(true);
    let mutex = Mutex::init(Some(&attr)).unwrap();
    mutex.lock().unwrap();
    // SAFETY: locked above.
    unsafe { mutex.unlock() }.unwrap();
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
#[test]
fn destroying_held_mutex_reports_busy() {
    let mutex = Mutex::new().unwrap();
    mutex.lock().unwrap();
    assert_eq!(mutex.destroy(), Err(ThreadError::DestroyFailed(libc::EBUSY)));
}

#[cfg(any(all(target_os = "linux", target_env = "gnu"), windows))]
#[test]
fn destroying_held_recursive_mutex_reports_busy() {
    let mutex = Mutex::init(Some(&MutexAttr::recursive())).unwrap();
    mutex.lock().unwrap();
    mutex.lock().unwrap();
    assert_eq!(mutex.destroy().map_err(|e| e.kind()), Err(ErrorKind::DestroyFailed));
}
