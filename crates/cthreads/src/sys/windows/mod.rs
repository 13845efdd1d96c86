//! Win32 backend.
//!
//! Win32 has no attribute objects: the knobs it can express are passed to
//! the creating call directly and the rest are dropped. Failures carry the
//! `GetLastError` value.

mod cond;
mod error;
mod ffi;
mod mutex;
mod once;
mod rwlock;
mod sem;
mod thread;

pub(crate) use cond::Condvar;
pub(crate) use error::Errors;
pub(crate) use mutex::Mutex;
pub(crate) use once::Once;
pub(crate) use rwlock::RwLock;
pub(crate) use sem::Semaphore;
pub(crate) use thread::{Handle, Thread};

/// Code attached to errors the wrapper raises itself.
pub(crate) const EINVAL: i32 = ffi::ERROR_INVALID_PARAMETER;

pub(crate) fn last_error() -> i32 {
    // SAFETY: always callable.
    unsafe { ffi::GetLastError() as i32 }
}
