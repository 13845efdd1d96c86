//! pthreads backend.
//!
//! pthread calls report failure through their return value rather than
//! `errno`; that value is carried unchanged in the resulting `ThreadError`.

mod cond;
mod error;
mod ffi;
mod mutex;
mod once;
mod rwlock;
#[cfg(not(target_vendor = "apple"))]
mod sem;
mod thread;

pub(crate) use cond::Condvar;
pub(crate) use error::Errors;
pub(crate) use mutex::Mutex;
pub(crate) use once::Once;
pub(crate) use rwlock::RwLock;
#[cfg(not(target_vendor = "apple"))]
pub(crate) use sem::Semaphore;
pub(crate) use thread::{Handle, Thread};

use core::ffi::c_int;

/// Code attached to errors the wrapper raises itself.
pub(crate) const EINVAL: i32 = libc::EINVAL;

/// Maps a pthread return value to `Ok` or `err(rc)`.
#[inline]
pub(crate) fn check<E>(rc: c_int, err: impl FnOnce(i32) -> E) -> Result<(), E> {
    if rc == 0 { Ok(()) } else { Err(err(rc)) }
}

/// Reads `clock` as a [`cthreads_core::Timespec`].
pub(crate) fn clock_now(clock: libc::clockid_t) -> cthreads_core::Timespec {
    // SAFETY: all-zero is a valid `timespec`.
    let mut ts: libc::timespec = unsafe { core::mem::zeroed() };
    // SAFETY: `ts` is a valid out-pointer; the clocks used here always exist.
    unsafe { libc::clock_gettime(clock, &mut ts) };
    cthreads_core::Timespec::new(i64::from(ts.tv_sec), i64::from(ts.tv_nsec))
}

/// Absolute `clock` deadline `timeout_ms` from now, in native form.
pub(crate) fn deadline(clock: libc::clockid_t, timeout_ms: u64) -> libc::timespec {
    let at = cthreads_core::deadline_after(clock_now(clock), timeout_ms);
    // SAFETY: all-zero is a valid `timespec`.
    let mut ts: libc::timespec = unsafe { core::mem::zeroed() };
    ts.tv_sec = libc::time_t::try_from(at.tv_sec).unwrap_or(libc::time_t::MAX);
    // Normalized, so always below one billion.
    ts.tv_nsec = at.tv_nsec as _;
    ts
}
