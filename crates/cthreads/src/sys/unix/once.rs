//! `pthread_once` takes a routine without arguments, so the closure to run
//! is parked in a thread-local for the duration of the call. `pthread_once`
//! always runs the routine on the calling thread.

use core::cell::{Cell, UnsafeCell};
use core::ffi::c_void;
use core::ptr;

use cthreads_core::{Result, ThreadError};

use super::{check, ffi};
use crate::sys::RawOnce;

thread_local! {
    /// Points at a `&mut dyn FnMut()` on the caller's stack while
    /// `call_once` is inside `pthread_once`.
    static PENDING: Cell<*mut c_void> = const { Cell::new(ptr::null_mut()) };
}

unsafe extern "C" fn run_pending() {
    let pending = PENDING.with(Cell::get);
    if pending.is_null() {
        return;
    }
    // SAFETY: set by `call_once` on this thread, which is blocked in
    // `pthread_once` until this routine returns.
    let f = unsafe { &mut *pending.cast::<&mut dyn FnMut()>() };
    f();
}

pub(crate) struct Once(UnsafeCell<ffi::pthread_once_t>);

// SAFETY: `pthread_once` serializes all access to the control word.
unsafe impl Sync for Once {}
// SAFETY: the control word holds no thread-bound state.
unsafe impl Send for Once {}

impl Once {
    pub(crate) const fn new() -> Self {
        Self(UnsafeCell::new(ffi::PTHREAD_ONCE_INIT))
    }
}

impl RawOnce for Once {
    fn call_once(&self, mut f: &mut dyn FnMut()) -> Result<()> {
        let slot = (&raw mut f).cast::<c_void>();
        // Nested `call_once` from inside `f` must see its own closure.
        let previous = PENDING.with(|pending| pending.replace(slot));
        // SAFETY: the control word lives as long as `self`; `run_pending`
        // only runs during this call.
        let rc = unsafe { ffi::pthread_once(self.0.get(), run_pending) };
        PENDING.with(|pending| pending.set(previous));
        check(rc, ThreadError::InitFailed)
    }
}
