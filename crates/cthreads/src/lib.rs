//! # cthreads
//!
//! One API for threads, mutexes, condition variables, read-write locks,
//! counting semaphores and one-time initialization, backed by pthreads on
//! Unix targets and by Win32 on Windows. The backend is picked at build
//! time; there is no runtime dispatch.
//!
//! The layer is deliberately thin. It never retries, never logs, and does not
//! guard against use of destroyed primitives or unlocking a lock the caller
//! does not own; those are caller obligations, spelled out on the `unsafe`
//! entry points. Every fallible call returns a [`ThreadError`] carrying the
//! backend's raw code, which [`errors::error_message`] turns into text.

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_vendor = "apple",
    windows
)))]
compile_error!("cthreads supports Linux, Android, Apple targets and Windows");

mod sys;

pub mod cond;
pub mod errors;
pub mod mutex;
pub mod once;
pub mod rwlock;
#[cfg(not(target_vendor = "apple"))]
pub mod sem;
pub mod thread;

pub use cond::Condvar;
pub use mutex::{Mutex, MutexGuard};
pub use once::Once;
pub use rwlock::{RwLock, RwLockGuard};
#[cfg(not(target_vendor = "apple"))]
pub use sem::Semaphore;
pub use thread::{Thread, ThreadHandle};

pub use cthreads_core::{
    ClockSource, CondAttr, ContentionScope, DetachState, ErrorKind, MutexAttr, MutexKind,
    PriorityProtocol, Result, SchedPolicy, ThreadAttr, ThreadError,
};
