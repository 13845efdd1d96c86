use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use cthreads::thread::{self, CANCELED};
use cthreads::{ThreadAttr, ThreadError};

fn double(x: usize) -> usize {
    x * 2
}

#[test]
fn create_passes_argument_and_join_returns_result() {
    let worker = thread::create(None, double, 21).unwrap();
    assert!(worker.is_joinable());
    assert_eq!(worker.join().unwrap(), 42);
}

#[test]
fn join_waits_for_completion() {
    let done = Arc::new(AtomicBool::new(false));
    let done_clone = Arc::clone(&done);
    let worker = thread::spawn(None, move || {
        std::thread::sleep(Duration::from_millis(30));
        done_clone.store(true, Ordering::Release);
        7
    })
    .unwrap();

    assert_eq!(worker.join().unwrap(), 7);
    assert!(done.load(Ordering::Acquire), "join returned before the thread finished");
}

#[test]
fn exit_value_reaches_join() {
    let worker = thread::spawn(None, || {
        thread::exit(0xBEEF);
    })
    .unwrap();
    assert_eq!(worker.join().unwrap(), 0xBEEF);
}

#[test]
fn self_is_equal_to_self_and_distinct_across_threads() {
    let (tx, rx) = mpsc::channel();
    let mut workers = Vec::new();
    for _ in 0..2 {
        let tx = tx.clone();
        workers.push(
            thread::spawn(None, move || {
                let me = thread::current();
                let same = thread::equal(&me, &thread::current());
                tx.send((me, same)).unwrap();
                0
            })
            .unwrap(),
        );
    }
    drop(tx);

    let (first, first_same) = rx.recv().unwrap();
    let (second, second_same) = rx.recv().unwrap();
    assert!(first_same);
    assert!(second_same);
    assert!(!thread::equal(&first, &second));
    assert!(!thread::equal(&first, &thread::current()));

    let handles: Vec<_> = workers.iter().map(|w| w.handle().clone()).collect();
    assert!(handles.contains(&first));
    assert!(handles.contains(&second));
    for worker in workers {
        worker.join().unwrap();
    }
}

#[test]
fn live_threads_have_distinct_ids() {
    let gate = Arc::new(std::sync::Barrier::new(3));
    let spawn_waiter = |gate: Arc<std::sync::Barrier>| {
        thread::spawn(None, move || {
            gate.wait();
            0
        })
        .unwrap()
    };
    let a = spawn_waiter(Arc::clone(&gate));
    let b = spawn_waiter(Arc::clone(&gate));
    assert_ne!(a.handle().id(), b.handle().id());
    gate.wait();
    a.join().unwrap();
    b.join().unwrap();
}

#[test]
fn detached_thread_runs_and_cannot_be_joined() {
    let (tx, rx) = mpsc::channel();
    let attr = ThreadAttr::new().detached();
    let worker = thread::spawn(Some(&attr), move || {
        tx.send(thread::current().id()).unwrap();
        0
    })
    .unwrap();
    assert!(!worker.is_joinable());
    let id = worker.handle().id();

    let reported = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(reported, id);
    assert!(matches!(worker.join(), Err(ThreadError::JoinFailed(_))));
}

#[test]
fn detach_releases_join_right() {
    let worker = thread::spawn(None, || 0).unwrap();
    worker.detach().unwrap();
}

#[test]
fn explicit_stack_size_is_accepted() {
    let attr = ThreadAttr::new().stack_size(256 * 1024).guard_size(4096);
    let worker = thread::spawn(Some(&attr), || {
        let buf = [1u8; 64 * 1024];
        buf.iter().map(|&b| usize::from(b)).sum()
    })
    .unwrap();
    assert_eq!(worker.join().unwrap(), 64 * 1024);
}

#[cfg(any(target_os = "linux", windows))]
#[test]
fn cancelled_thread_joins_with_canceled() {
    let started = Arc::new(AtomicBool::new(false));
    let started_clone = Arc::clone(&started);
    let worker = thread::spawn(None, move || {
        started_clone.store(true, Ordering::Release);
        // Only `testcancel` may act on the request: sleeping would put a
        // cancellation point inside std.
        loop {
            thread::testcancel();
            std::thread::yield_now();
        }
    })
    .unwrap();

    while !started.load(Ordering::Acquire) {
        std::thread::yield_now();
    }
    thread::cancel(worker.handle()).unwrap();
    assert_eq!(worker.join().unwrap(), CANCELED);
}

#[test]
fn testcancel_without_pending_cancel_returns() {
    let worker = thread::spawn(None, || {
        thread::testcancel();
        5
    })
    .unwrap();
    assert_eq!(worker.join().unwrap(), 5);
}

#[test]
fn refused_scheduling_hints_are_dropped() {
    use cthreads::SchedPolicy;

    // Priority 0 is out of range for the real-time policies, and 5 is out of
    // range for the default one. FIFO at priority 1 may need privileges.
    for (policy, priority) in [
        (SchedPolicy::Fifo, 0),
        (SchedPolicy::RoundRobin, 0),
        (SchedPolicy::Other, 5),
        (SchedPolicy::Fifo, 1),
    ] {
        let attr = ThreadAttr::new().explicit_scheduling(policy, priority);
        let worker = thread::spawn(Some(&attr), || 1)
            .unwrap_or_else(|err| panic!("{policy:?}/{priority}: {err}"));
        assert_eq!(worker.join().unwrap(), 1, "{policy:?}/{priority}");
    }
}

#[test]
fn valid_default_policy_schedules_normally() {
    use cthreads::SchedPolicy;

    let attr = ThreadAttr::new().explicit_scheduling(SchedPolicy::Other, 0);
    let worker = thread::spawn(Some(&attr), || double(21)).unwrap();
    assert_eq!(worker.join().unwrap(), 42);
}
