use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use cthreads::{Once, thread};

static INIT: Once = Once::new();
static RUNS: AtomicUsize = AtomicUsize::new(0);

#[test]
fn runs_exactly_once_across_threads() {
    const THREADS: usize = 8;
    let start = Arc::new(Barrier::new(THREADS));
    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let start = Arc::clone(&start);
            thread::spawn(None, move || {
                start.wait();
                INIT.call_once(|| {
                    RUNS.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
                RUNS.load(Ordering::SeqCst)
            })
            .unwrap()
        })
        .collect();

    for worker in workers {
        // Everyone returns after the single run completed.
        assert_eq!(worker.join().unwrap(), 1);
    }
    assert_eq!(RUNS.load(Ordering::SeqCst), 1);
}

#[test]
fn nested_once_runs_its_own_closure() {
    let outer = Once::new();
    let inner = Once::new();
    let mut order = Vec::new();
    outer
        .call_once(|| {
            order.push("outer");
            inner.call_once(|| order.push("inner")).unwrap();
        })
        .unwrap();
    assert_eq!(order, ["outer", "inner"]);
}

#[test]
fn later_calls_are_skipped() {
    let once = Once::new();
    let mut hits = 0;
    once.call_once(|| hits += 1).unwrap();
    once.call_once(|| hits += 1).unwrap();
    assert_eq!(hits, 1);
}
