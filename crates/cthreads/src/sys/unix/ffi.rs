//! pthread entry points not bound (or not bound on every target) by `libc`.

#![allow(non_camel_case_types)]

use core::ffi::{c_int, c_void};

#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) type pthread_once_t = c_int;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) const PTHREAD_ONCE_INIT: pthread_once_t = 0;

#[cfg(target_vendor = "apple")]
#[repr(C)]
pub(crate) struct pthread_once_t {
    sig: core::ffi::c_long,
    opaque: [core::ffi::c_char; 8],
}
#[cfg(target_vendor = "apple")]
pub(crate) const PTHREAD_ONCE_INIT: pthread_once_t = pthread_once_t {
    sig: 0x30B1_BCBA,
    opaque: [0; 8],
};

pub(crate) const PTHREAD_PRIO_NONE: c_int = 0;
pub(crate) const PTHREAD_PRIO_INHERIT: c_int = 1;
pub(crate) const PTHREAD_PRIO_PROTECT: c_int = 2;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) const PTHREAD_MUTEX_ROBUST: c_int = 1;

#[cfg(any(target_os = "linux", target_os = "android"))]
mod sched {
    use core::ffi::c_int;
    pub(crate) const PTHREAD_SCOPE_SYSTEM: c_int = 0;
    pub(crate) const PTHREAD_SCOPE_PROCESS: c_int = 1;
    pub(crate) const PTHREAD_INHERIT_SCHED: c_int = 0;
    pub(crate) const PTHREAD_EXPLICIT_SCHED: c_int = 1;
}
#[cfg(target_vendor = "apple")]
mod sched {
    use core::ffi::c_int;
    pub(crate) const PTHREAD_SCOPE_SYSTEM: c_int = 1;
    pub(crate) const PTHREAD_SCOPE_PROCESS: c_int = 2;
    pub(crate) const PTHREAD_INHERIT_SCHED: c_int = 1;
    pub(crate) const PTHREAD_EXPLICIT_SCHED: c_int = 2;
}
pub(crate) use sched::*;

// Cancellation points and thread exit unwind the calling thread, so they are
// declared with an ABI that permits it.
unsafe extern "C-unwind" {
    pub(crate) fn pthread_exit(value: *mut c_void) -> !;
    pub(crate) fn pthread_testcancel();
    pub(crate) fn pthread_join(thread: libc::pthread_t, value: *mut *mut c_void) -> c_int;
    pub(crate) fn pthread_cond_wait(
        cond: *mut libc::pthread_cond_t,
        mutex: *mut libc::pthread_mutex_t,
    ) -> c_int;
    pub(crate) fn pthread_cond_timedwait(
        cond: *mut libc::pthread_cond_t,
        mutex: *mut libc::pthread_mutex_t,
        abstime: *const libc::timespec,
    ) -> c_int;
}

#[cfg(not(target_vendor = "apple"))]
unsafe extern "C-unwind" {
    pub(crate) fn sem_wait(sem: *mut libc::sem_t) -> c_int;
    pub(crate) fn sem_timedwait(sem: *mut libc::sem_t, abstime: *const libc::timespec) -> c_int;
}

unsafe extern "C" {
    pub(crate) fn pthread_cancel(thread: libc::pthread_t) -> c_int;
    pub(crate) fn pthread_once(
        once: *mut pthread_once_t,
        init: unsafe extern "C" fn(),
    ) -> c_int;

    pub(crate) fn pthread_attr_setstack(
        attr: *mut libc::pthread_attr_t,
        stackaddr: *mut c_void,
        stacksize: libc::size_t,
    ) -> c_int;
    pub(crate) fn pthread_attr_setguardsize(
        attr: *mut libc::pthread_attr_t,
        guardsize: libc::size_t,
    ) -> c_int;
    pub(crate) fn pthread_attr_setinheritsched(
        attr: *mut libc::pthread_attr_t,
        inherit: c_int,
    ) -> c_int;
    pub(crate) fn pthread_attr_setschedpolicy(
        attr: *mut libc::pthread_attr_t,
        policy: c_int,
    ) -> c_int;
    pub(crate) fn pthread_attr_setschedparam(
        attr: *mut libc::pthread_attr_t,
        param: *const libc::sched_param,
    ) -> c_int;
    pub(crate) fn pthread_attr_setscope(attr: *mut libc::pthread_attr_t, scope: c_int) -> c_int;

    pub(crate) fn pthread_mutexattr_setprotocol(
        attr: *mut libc::pthread_mutexattr_t,
        protocol: c_int,
    ) -> c_int;
    pub(crate) fn pthread_mutexattr_setprioceiling(
        attr: *mut libc::pthread_mutexattr_t,
        ceiling: c_int,
    ) -> c_int;
}

#[cfg(any(target_os = "linux", target_os = "android"))]
unsafe extern "C" {
    pub(crate) fn pthread_mutexattr_setrobust(
        attr: *mut libc::pthread_mutexattr_t,
        robustness: c_int,
    ) -> c_int;
    pub(crate) fn pthread_mutex_consistent(mutex: *mut libc::pthread_mutex_t) -> c_int;
    pub(crate) fn pthread_condattr_setclock(
        attr: *mut libc::pthread_condattr_t,
        clock: libc::clockid_t,
    ) -> c_int;
}
