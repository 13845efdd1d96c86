//! Observable guarantees of each primitive, checked against the live backend.
//!
//! Every property runs real threads and blocking calls. A property either
//! passes, is violated (`Fail`), is cut short by an unexpected primitive
//! error (`Error`), or does not apply to the host (`Skip`).

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, mpsc};
use std::time::{Duration, Instant};

use cthreads::{
    ClockSource, CondAttr, Condvar, ErrorKind, Mutex, MutexKind, Once, RwLock, ThreadError, errors,
    thread,
};
use cthreads_core::mutex::{Expected, MutexOp, MutexState, expected_outcome};
use serde::Serialize;

use crate::config::{HarnessConfig, profile};
use crate::structured_log::{HarnessError, LogEmitter, LogEntry, LogLevel, Outcome, Primitive};

const JOIN_VALUE: usize = 0x5EED;
const EXIT_VALUE: usize = 0xC0DE;
// ENOENT on POSIX, ERROR_FILE_NOT_FOUND on Win32; both have long messages.
const SAMPLE_ERROR_CODE: i32 = 2;
const SMALL_CAPACITY: usize = 8;
const TRY_LOCK_ROUNDS: usize = 16;
// Bound on how long a property waits for peers before calling it a violation.
const RENDEZVOUS: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    SelfEquality,
    JoinExitValue,
    MutexExclusion,
    TryLockContention,
    TimedWaitTimeout,
    RwLockSharing,
    SemaphoreCount,
    OnceSingleRun,
    ErrorStringTruncation,
}

impl Property {
    pub const ALL: [Self; 9] = [
        Self::SelfEquality,
        Self::JoinExitValue,
        Self::MutexExclusion,
        Self::TryLockContention,
        Self::TimedWaitTimeout,
        Self::RwLockSharing,
        Self::SemaphoreCount,
        Self::OnceSingleRun,
        Self::ErrorStringTruncation,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SelfEquality => "self_equality",
            Self::JoinExitValue => "join_exit_value",
            Self::MutexExclusion => "mutex_exclusion",
            Self::TryLockContention => "try_lock_contention",
            Self::TimedWaitTimeout => "timed_wait_timeout",
            Self::RwLockSharing => "rwlock_sharing",
            Self::SemaphoreCount => "semaphore_count",
            Self::OnceSingleRun => "once_single_run",
            Self::ErrorStringTruncation => "error_string_truncation",
        }
    }

    #[must_use]
    pub const fn primitive(self) -> Primitive {
        match self {
            Self::SelfEquality | Self::JoinExitValue => Primitive::Thread,
            Self::MutexExclusion | Self::TryLockContention => Primitive::Mutex,
            Self::TimedWaitTimeout => Primitive::Cond,
            Self::RwLockSharing => Primitive::Rwlock,
            Self::SemaphoreCount => Primitive::Semaphore,
            Self::OnceSingleRun => Primitive::Once,
            Self::ErrorStringTruncation => Primitive::Errors,
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::SelfEquality => {
                "current() equals itself; two live threads have different handles"
            }
            Self::JoinExitValue => "join returns after the thread ends, with its exact exit value",
            Self::MutexExclusion => "at most one thread is ever inside the critical section",
            Self::TryLockContention => "try_lock on a held mutex fails with WouldBlock at once",
            Self::TimedWaitTimeout => "an unsignalled timed wait ends with TimedOut near its deadline",
            Self::RwLockSharing => "readers overlap; a writer never overlaps anyone",
            Self::SemaphoreCount => "a semaphore of 2 admits two, then one per post",
            Self::OnceSingleRun => "call_once runs its closure exactly once under contention",
            Self::ErrorStringTruncation => {
                "error_string truncates, terminates, and reports the full length"
            }
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// Outcome of one property run.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyResult {
    pub property: Property,
    pub outcome: Outcome,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip)]
    pub error: Option<ThreadError>,
}

impl PropertyResult {
    fn to_log_entry(&self) -> LogEntry {
        let level = match self.outcome {
            Outcome::Pass => LogLevel::Info,
            Outcome::Skip => LogLevel::Debug,
            Outcome::Fail | Outcome::Error => LogLevel::Error,
        };
        let mut entry = LogEntry::new(String::new(), level, "property_result")
            .with_property(self.property.primitive(), self.property.name())
            .with_outcome(self.outcome)
            .with_duration_ms(self.duration_ms);
        if let Some(err) = self.error {
            entry = entry.with_error(err);
        }
        if let Some(detail) = &self.detail {
            entry = entry.with_details(serde_json::json!({ "detail": detail }));
        }
        entry
    }
}

/// Aggregate of one suite run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub run_id: String,
    pub config: HarnessConfig,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
    pub results: Vec<PropertyResult>,
}

impl SuiteReport {
    /// True when nothing failed or errored; skips do not count against a run.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }

    pub fn to_json(&self) -> Result<String, HarnessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct ConformanceSuite {
    config: HarnessConfig,
}

impl ConformanceSuite {
    pub fn new(config: HarnessConfig) -> Result<Self, HarnessError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Properties the configured filter lets through, in run order.
    #[must_use]
    pub fn selected(&self) -> Vec<Property> {
        Property::ALL
            .into_iter()
            .filter(|p| self.config.selects(p.name()))
            .collect()
    }

    pub fn run(&self, emitter: &mut LogEmitter) -> Result<SuiteReport, HarnessError> {
        let selected = self.selected();
        let start = LogEntry::new(String::new(), LogLevel::Info, "suite_start").with_details(
            serde_json::json!({
                "profile": profile(),
                "threads": self.config.threads,
                "iterations": self.config.iterations,
                "properties": selected.iter().map(|p| p.name()).collect::<Vec<_>>(),
            }),
        );
        emitter.emit_entry(start)?;

        let mut report = SuiteReport {
            run_id: emitter.run_id().to_string(),
            config: self.config.clone(),
            passed: 0,
            failed: 0,
            errored: 0,
            skipped: 0,
            results: Vec::with_capacity(selected.len()),
        };
        for property in selected {
            let result = run_property(property, &self.config);
            match result.outcome {
                Outcome::Pass => report.passed += 1,
                Outcome::Fail => report.failed += 1,
                Outcome::Error => report.errored += 1,
                Outcome::Skip => report.skipped += 1,
            }
            emitter.emit_entry(result.to_log_entry())?;
            report.results.push(result);
        }

        let level = if report.is_clean() {
            LogLevel::Info
        } else {
            LogLevel::Error
        };
        let end = LogEntry::new(String::new(), level, "suite_end").with_details(serde_json::json!({
            "passed": report.passed,
            "failed": report.failed,
            "errored": report.errored,
            "skipped": report.skipped,
        }));
        emitter.emit_entry(end)?;
        emitter.flush()?;
        Ok(report)
    }
}

enum Violation {
    Broken(String),
    Primitive(ThreadError),
}

impl From<ThreadError> for Violation {
    fn from(err: ThreadError) -> Self {
        Self::Primitive(err)
    }
}

type Check = Result<(), Violation>;

fn broken(message: impl Into<String>) -> Violation {
    Violation::Broken(message.into())
}

/// Runs one property and times it.
#[must_use]
pub fn run_property(property: Property, config: &HarnessConfig) -> PropertyResult {
    let started = Instant::now();
    let checked = match property {
        Property::SelfEquality => self_equality(),
        Property::JoinExitValue => join_exit_value(),
        Property::MutexExclusion => mutex_exclusion(config),
        Property::TryLockContention => try_lock_contention(),
        Property::TimedWaitTimeout => timed_wait_timeout(config),
        Property::RwLockSharing => rwlock_sharing(config),
        #[cfg(not(target_vendor = "apple"))]
        Property::SemaphoreCount => semaphore_count(),
        #[cfg(target_vendor = "apple")]
        Property::SemaphoreCount => {
            return PropertyResult {
                property,
                outcome: Outcome::Skip,
                duration_ms: 0,
                detail: Some("no unnamed semaphores on this target".to_string()),
                error: None,
            };
        }
        Property::OnceSingleRun => once_single_run(config),
        Property::ErrorStringTruncation => error_string_truncation(),
    };
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (outcome, detail, error) = match checked {
        Ok(()) => (Outcome::Pass, None, None),
        Err(Violation::Broken(message)) => (Outcome::Fail, Some(message), None),
        Err(Violation::Primitive(err)) => (Outcome::Error, Some(err.to_string()), Some(err)),
    };
    PropertyResult {
        property,
        outcome,
        duration_ms,
        detail,
        error,
    }
}

/// First primitive error seen by any worker thread.
#[derive(Default)]
struct FirstError(parking_lot::Mutex<Option<ThreadError>>);

impl FirstError {
    fn record(&self, err: ThreadError) {
        let mut slot = self.0.lock();
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    fn check(&self) -> Check {
        match *self.0.lock() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

fn join_all(workers: Vec<cthreads::Thread>) -> Result<Vec<usize>, ThreadError> {
    workers.into_iter().map(cthreads::Thread::join).collect()
}

fn wait_until(deadline: Instant, mut ready: impl FnMut() -> bool) -> bool {
    while !ready() {
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::yield_now();
    }
    true
}

// ---------------------------------------------------------------------------
// Threads
// ---------------------------------------------------------------------------

fn self_equality() -> Check {
    let me = thread::current();
    if !thread::equal(&me, &thread::current()) {
        return Err(broken("current() is not equal to itself"));
    }

    // The barrier keeps both workers alive until each has reported.
    let gate = Arc::new(Barrier::new(2));
    let (tx, rx) = mpsc::channel();
    let mut workers = Vec::with_capacity(2);
    for _ in 0..2 {
        let gate = Arc::clone(&gate);
        let tx = tx.clone();
        workers.push(thread::spawn(None, move || {
            let me = thread::current();
            let stable = thread::equal(&me, &thread::current());
            let _ = tx.send((me, stable));
            gate.wait();
            0
        })?);
    }
    drop(tx);
    let reports: Vec<_> = rx.iter().collect();
    join_all(workers)?;

    let [(first, first_stable), (second, second_stable)] = reports.as_slice() else {
        return Err(broken(format!("expected 2 reports, got {}", reports.len())));
    };
    if !first_stable || !second_stable {
        return Err(broken("a worker's current() is not equal to itself"));
    }
    if thread::equal(first, second) {
        return Err(broken(format!(
            "two live threads share a handle: {first:?}"
        )));
    }
    if thread::equal(first, &me) || thread::equal(second, &me) {
        return Err(broken("a worker's handle equals the caller's"));
    }
    Ok(())
}

fn join_exit_value() -> Check {
    let finished = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&finished);
    let worker = thread::spawn(None, move || {
        std::thread::sleep(Duration::from_millis(10));
        flag.store(true, Ordering::Release);
        JOIN_VALUE
    })?;
    let value = worker.join()?;
    if !finished.load(Ordering::Acquire) {
        return Err(broken("join returned before the entry finished"));
    }
    if value != JOIN_VALUE {
        return Err(broken(format!("join gave {value:#x}, entry returned {JOIN_VALUE:#x}")));
    }

    let value = thread::spawn(None, || thread::exit(EXIT_VALUE))?.join()?;
    if value != EXIT_VALUE {
        return Err(broken(format!("join gave {value:#x}, exit passed {EXIT_VALUE:#x}")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Mutex
// ---------------------------------------------------------------------------

struct Contention {
    mutex: Mutex,
    inside: AtomicUsize,
    peak: AtomicUsize,
    // Updated with a plain load/store pair, so overlapping holders lose increments.
    total: AtomicUsize,
    error: FirstError,
}

fn mutex_exclusion(config: &HarnessConfig) -> Check {
    let shared = Arc::new(Contention {
        mutex: Mutex::new()?,
        inside: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
        total: AtomicUsize::new(0),
        error: FirstError::default(),
    });
    let rounds = config.iterations as usize;

    let mut workers = Vec::with_capacity(config.threads);
    for _ in 0..config.threads {
        let shared = Arc::clone(&shared);
        workers.push(thread::spawn(None, move || {
            for _ in 0..rounds {
                let guard = match shared.mutex.guard() {
                    Ok(guard) => guard,
                    Err(err) => {
                        shared.error.record(err);
                        break;
                    }
                };
                let now = shared.inside.fetch_add(1, Ordering::SeqCst) + 1;
                shared.peak.fetch_max(now, Ordering::SeqCst);
                let seen = shared.total.load(Ordering::Relaxed);
                std::hint::spin_loop();
                shared.total.store(seen + 1, Ordering::Relaxed);
                shared.inside.fetch_sub(1, Ordering::SeqCst);
                if let Err(err) = guard.unlock() {
                    shared.error.record(err);
                    break;
                }
            }
            0
        })?);
    }
    join_all(workers)?;
    shared.error.check()?;

    let peak = shared.peak.load(Ordering::SeqCst);
    if peak != 1 {
        return Err(broken(format!("{peak} threads were inside at once")));
    }
    let expected = rounds * config.threads;
    let total = shared.total.load(Ordering::Relaxed);
    if total != expected {
        return Err(broken(format!("lost updates: {total} of {expected}")));
    }
    Ok(())
}

const PROBE_BLOCKED: usize = 0;
const PROBE_ACQUIRED: usize = 1;
const PROBE_FAILED: usize = 2;
const PROBE_SLOW: usize = 4;

fn try_lock_contention() -> Check {
    let held = expected_outcome(MutexKind::Normal, MutexState::LockedByOther, MutexOp::TryLock);
    let free = expected_outcome(MutexKind::Normal, MutexState::Unlocked, MutexOp::TryLock);

    let mutex = Arc::new(Mutex::new()?);
    for round in 0..TRY_LOCK_ROUNDS {
        let guard = mutex.guard()?;
        let other = Arc::clone(&mutex);
        let probe = thread::spawn(None, move || {
            let started = Instant::now();
            let status = match other.try_guard() {
                Err(ThreadError::WouldBlock) => PROBE_BLOCKED,
                Ok(stolen) => {
                    drop(stolen);
                    PROBE_ACQUIRED
                }
                Err(_) => PROBE_FAILED,
            };
            let slow = if started.elapsed() > Duration::from_millis(250) {
                PROBE_SLOW
            } else {
                0
            };
            status | slow
        })?;
        let probed = probe.join()?;
        guard.unlock()?;

        if probed & PROBE_SLOW != 0 {
            return Err(broken(format!("round {round}: try_lock blocked")));
        }
        let observed = match probed & !PROBE_SLOW {
            PROBE_BLOCKED => Expected::Fails(ErrorKind::WouldBlock),
            PROBE_ACQUIRED => Expected::Ok(MutexState::LockedBySelf),
            _ => Expected::Undefined,
        };
        if observed != held {
            return Err(broken(format!(
                "round {round}: try_lock on a held mutex gave {observed:?}, expected {held:?}"
            )));
        }
    }

    let observed = match mutex.try_guard() {
        Ok(guard) => {
            guard.unlock()?;
            Expected::Ok(MutexState::LockedBySelf)
        }
        Err(err) => Expected::Fails(err.kind()),
    };
    if observed != free {
        return Err(broken(format!(
            "try_lock on a free mutex gave {observed:?}, expected {free:?}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Condition variable
// ---------------------------------------------------------------------------

fn timed_wait_timeout(config: &HarnessConfig) -> Check {
    let mutex = Mutex::new()?;
    let timeout = Duration::from_millis(config.timeout_ms);
    let ceiling = timeout + Duration::from_millis(config.slack_ms);
    // Some backends round the deadline down to their tick.
    let floor = timeout.mul_f64(0.9);

    for clock in [ClockSource::Realtime, ClockSource::Monotonic] {
        let cond = Condvar::init(Some(&CondAttr::new().clock_source(clock)))?;
        let guard = mutex.guard()?;
        let started = Instant::now();
        let deadline = started + timeout;
        let ended = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let remaining_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX);
            match cond.timed_wait_guard(&guard, remaining_ms.max(1)) {
                // Spurious wakeup.
                Ok(()) => continue,
                Err(err) => break err,
            }
        };
        let elapsed = started.elapsed();
        guard.unlock()?;
        cond.destroy()?;

        if ended != ThreadError::TimedOut {
            return Err(ended.into());
        }
        if elapsed < floor {
            return Err(broken(format!("{clock:?}: timed out early after {elapsed:?}")));
        }
        if elapsed > ceiling {
            return Err(broken(format!("{clock:?}: timed out late after {elapsed:?}")));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// RW lock
// ---------------------------------------------------------------------------

struct Sharing {
    lock: RwLock,
    readers: AtomicUsize,
    writers: AtomicUsize,
    peak_readers: AtomicUsize,
    overlaps: AtomicUsize,
    error: FirstError,
}

fn rwlock_sharing(config: &HarnessConfig) -> Check {
    let shared = Arc::new(Sharing {
        lock: RwLock::init()?,
        readers: AtomicUsize::new(0),
        writers: AtomicUsize::new(0),
        peak_readers: AtomicUsize::new(0),
        overlaps: AtomicUsize::new(0),
        error: FirstError::default(),
    });

    // Readers hold the lock until every reader is inside, or the rendezvous lapses.
    let mut workers = Vec::with_capacity(config.threads);
    for _ in 0..config.threads {
        let shared = Arc::clone(&shared);
        let expected = config.threads;
        workers.push(thread::spawn(None, move || {
            let guard = match shared.lock.read() {
                Ok(guard) => guard,
                Err(err) => {
                    shared.error.record(err);
                    return 0;
                }
            };
            let now = shared.readers.fetch_add(1, Ordering::SeqCst) + 1;
            shared.peak_readers.fetch_max(now, Ordering::SeqCst);
            wait_until(Instant::now() + RENDEZVOUS, || {
                shared.peak_readers.load(Ordering::SeqCst) >= expected
            });
            shared.readers.fetch_sub(1, Ordering::SeqCst);
            if let Err(err) = guard.unlock() {
                shared.error.record(err);
            }
            0
        })?);
    }
    join_all(workers)?;
    shared.error.check()?;
    let peak = shared.peak_readers.load(Ordering::SeqCst);
    if peak < 2 {
        return Err(broken("readers never held the lock together"));
    }

    let rounds = config.iterations as usize;
    let mut workers = Vec::with_capacity(config.threads);
    for index in 0..config.threads {
        let shared = Arc::clone(&shared);
        workers.push(thread::spawn(None, move || {
            for round in 0..rounds {
                let writing = (index + round) % 4 == 0;
                let held = if writing {
                    shared.lock.write()
                } else {
                    shared.lock.read()
                };
                let guard = match held {
                    Ok(guard) => guard,
                    Err(err) => {
                        shared.error.record(err);
                        break;
                    }
                };
                if writing {
                    let writers = shared.writers.fetch_add(1, Ordering::SeqCst) + 1;
                    if writers != 1 || shared.readers.load(Ordering::SeqCst) != 0 {
                        shared.overlaps.fetch_add(1, Ordering::SeqCst);
                    }
                    shared.writers.fetch_sub(1, Ordering::SeqCst);
                } else {
                    shared.readers.fetch_add(1, Ordering::SeqCst);
                    if shared.writers.load(Ordering::SeqCst) != 0 {
                        shared.overlaps.fetch_add(1, Ordering::SeqCst);
                    }
                    shared.readers.fetch_sub(1, Ordering::SeqCst);
                }
                if let Err(err) = guard.unlock() {
                    shared.error.record(err);
                    break;
                }
            }
            0
        })?);
    }
    join_all(workers)?;
    shared.error.check()?;

    let overlaps = shared.overlaps.load(Ordering::SeqCst);
    if overlaps != 0 {
        return Err(broken(format!("a writer overlapped other holders {overlaps} times")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Semaphore
// ---------------------------------------------------------------------------

#[cfg(not(target_vendor = "apple"))]
fn semaphore_count() -> Check {
    use cthreads::Semaphore;

    let sem = Arc::new(Semaphore::init(2)?);
    sem.wait()?;
    sem.wait()?;
    match sem.try_wait() {
        Err(ThreadError::WouldBlock) => {}
        Ok(()) => return Err(broken("a third unit was available from a count of 2")),
        Err(err) => return Err(err.into()),
    }

    let passed = Arc::new(AtomicUsize::new(0));
    let error = Arc::new(FirstError::default());
    let mut waiters = Vec::with_capacity(2);
    for _ in 0..2 {
        let sem = Arc::clone(&sem);
        let passed = Arc::clone(&passed);
        let error = Arc::clone(&error);
        waiters.push(thread::spawn(None, move || {
            let wait_ms = u64::try_from(RENDEZVOUS.as_millis() * 2).unwrap_or(u64::MAX);
            match sem.timed_wait(wait_ms) {
                Ok(()) => {
                    passed.fetch_add(1, Ordering::SeqCst);
                }
                Err(err) => error.record(err),
            }
            0
        })?);
    }

    std::thread::sleep(Duration::from_millis(30));
    let early = passed.load(Ordering::SeqCst);
    sem.post()?;
    wait_until(Instant::now() + RENDEZVOUS, || passed.load(Ordering::SeqCst) > 0);
    std::thread::sleep(Duration::from_millis(30));
    let after_one_post = passed.load(Ordering::SeqCst);
    sem.post()?;
    join_all(waiters)?;
    error.check()?;

    if early != 0 {
        return Err(broken(format!("{early} waiters passed without a post")));
    }
    if after_one_post != 1 {
        return Err(broken(format!("one post released {after_one_post} waiters")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Once
// ---------------------------------------------------------------------------

fn once_single_run(config: &HarnessConfig) -> Check {
    let once = Arc::new(Once::new());
    let runs = Arc::new(AtomicUsize::new(0));
    let start = Arc::new(Barrier::new(config.threads));
    let error = Arc::new(FirstError::default());

    let mut workers = Vec::with_capacity(config.threads);
    for _ in 0..config.threads {
        let once = Arc::clone(&once);
        let runs = Arc::clone(&runs);
        let start = Arc::clone(&start);
        let error = Arc::clone(&error);
        workers.push(thread::spawn(None, move || {
            start.wait();
            let outcome = once.call_once(|| {
                std::thread::sleep(Duration::from_millis(5));
                runs.fetch_add(1, Ordering::SeqCst);
            });
            if let Err(err) = outcome {
                error.record(err);
            }
            // What this thread saw once call_once returned.
            runs.load(Ordering::SeqCst)
        })?);
    }
    let seen = join_all(workers)?;
    error.check()?;

    let runs = runs.load(Ordering::SeqCst);
    if runs != 1 {
        return Err(broken(format!("closure ran {runs} times")));
    }
    if let Some(early) = seen.iter().find(|&&n| n != 1) {
        return Err(broken(format!("a caller returned having seen {early} runs")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Error strings
// ---------------------------------------------------------------------------

fn error_string_truncation() -> Check {
    let full = errors::error_message(SAMPLE_ERROR_CODE);
    let (short, required) = errors::error_string(SAMPLE_ERROR_CODE, SMALL_CAPACITY);
    if required != full.len() {
        return Err(broken(format!(
            "reported length {required}, message is {} bytes",
            full.len()
        )));
    }
    if required <= SMALL_CAPACITY {
        return Err(broken(format!("message {full:?} is too short to exercise truncation")));
    }
    if short.len() >= SMALL_CAPACITY || !full.starts_with(&short) {
        return Err(broken(format!("{short:?} is not a fitting prefix of {full:?}")));
    }

    let (retried, _) = errors::error_string(SAMPLE_ERROR_CODE, required + 1);
    if retried != full {
        return Err(broken(format!("retry gave {retried:?}, expected {full:?}")));
    }

    let mut buf = [0xFF_u8; SMALL_CAPACITY];
    let reported = errors::error_string_into(SAMPLE_ERROR_CODE, &mut buf);
    if reported != required {
        return Err(broken(format!("buffer form reported {reported}, expected {required}")));
    }
    if !buf.contains(&0) {
        return Err(broken("buffer form left no terminator"));
    }
    if full.contains(['\r', '\n']) || full != full.trim_end() {
        return Err(broken(format!("message keeps trailing whitespace: {full:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_and_are_unique() {
        for property in Property::ALL {
            assert_eq!(Property::from_name(property.name()), Some(property));
        }
        let mut names: Vec<_> = Property::ALL.iter().map(|p| p.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Property::ALL.len());
        assert_eq!(Property::from_name("nope"), None);
    }

    #[test]
    fn primitive_errors_become_error_outcomes() {
        let err: Violation = ThreadError::LockFailed(11).into();
        assert!(matches!(err, Violation::Primitive(ThreadError::LockFailed(11))));
    }

    #[test]
    fn result_log_entry_carries_error_code() {
        let result = PropertyResult {
            property: Property::MutexExclusion,
            outcome: Outcome::Error,
            duration_ms: 3,
            detail: Some("lock acquisition failed".to_string()),
            error: Some(ThreadError::LockFailed(35)),
        };
        let entry = result.to_log_entry();
        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.property.as_deref(), Some("mutex_exclusion"));
        assert_eq!(entry.primitive, Some(Primitive::Mutex));
        assert_eq!(entry.error_kind.as_deref(), Some("lock_failed"));
        assert_eq!(entry.code, Some(35));
    }

    #[test]
    fn filter_narrows_selection() {
        let config = HarnessConfig {
            filter: Some("rwlock".to_string()),
            ..HarnessConfig::for_profile(crate::config::Profile::Quick)
        };
        let suite = ConformanceSuite::new(config).unwrap();
        assert_eq!(suite.selected(), vec![Property::RwLockSharing]);
    }
}
