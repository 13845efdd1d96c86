use core::ffi::{c_int, c_void};
use core::mem::MaybeUninit;
use core::ptr;

use cthreads_core::{ContentionScope, Result, SchedPolicy, ThreadAttr, ThreadError};

use super::{EINVAL, check, ffi};
use crate::sys::{Entry, RawThread};

/// A `pthread_t` that is only compared with `pthread_equal`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Handle(libc::pthread_t);

// SAFETY: a `pthread_t` is an identifier, never dereferenced by this crate.
unsafe impl Send for Handle {}
// SAFETY: as above.
unsafe impl Sync for Handle {}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        // SAFETY: both values came from `pthread_create` or `pthread_self`.
        unsafe { libc::pthread_equal(self.0, other.0) != 0 }
    }
}

impl Eq for Handle {}

/// Joinable thread; consumed by `join` or `detach`.
pub(crate) struct Thread {
    native: libc::pthread_t,
}

// SAFETY: the join right may be exercised from any thread.
unsafe impl Send for Thread {}

/// Owns an initialized `pthread_attr_t`.
struct NativeAttr(libc::pthread_attr_t);

impl NativeAttr {
    fn new() -> Result<Self> {
        let mut raw = MaybeUninit::<libc::pthread_attr_t>::uninit();
        // SAFETY: `raw` is a valid out-pointer.
        check(unsafe { libc::pthread_attr_init(raw.as_mut_ptr()) }, ThreadError::CreationFailed)?;
        // SAFETY: initialized by the successful call above.
        Ok(Self(unsafe { raw.assume_init() }))
    }

    fn as_mut_ptr(&mut self) -> *mut libc::pthread_attr_t {
        &mut self.0
    }

    /// Applies `attr`. Stack and detach settings must stick; the scheduling
    /// hints are dropped if the platform refuses them. Returns whether
    /// explicit scheduling ended up in effect.
    fn apply(&mut self, attr: &ThreadAttr) -> Result<bool> {
        let raw = self.as_mut_ptr();
        let detach = if attr.is_detached() {
            libc::PTHREAD_CREATE_DETACHED
        } else {
            libc::PTHREAD_CREATE_JOINABLE
        };
        // SAFETY: `raw` points to an initialized attribute object.
        check(unsafe { libc::pthread_attr_setdetachstate(raw, detach) }, ThreadError::CreationFailed)?;

        match (attr.stack_address(), attr.effective_stack_size()) {
            (Some(base), Some(size)) => {
                // SAFETY: `ThreadAttr::set_stack` made the caller vouch for the region.
                let rc = unsafe { ffi::pthread_attr_setstack(raw, base.as_ptr().cast(), size) };
                check(rc, ThreadError::CreationFailed)?;
            }
            (None, Some(size)) => {
                // SAFETY: as above.
                let rc = unsafe { libc::pthread_attr_setstacksize(raw, size) };
                check(rc, ThreadError::CreationFailed)?;
            }
            _ => {}
        }

        // Advisory from here on.
        // SAFETY: `raw` is initialized; every call only writes into it.
        unsafe {
            if let Some(guard) = attr.guard_size {
                ffi::pthread_attr_setguardsize(raw, guard);
            }
            let scope = match attr.contention_scope {
                ContentionScope::System => ffi::PTHREAD_SCOPE_SYSTEM,
                ContentionScope::Process => ffi::PTHREAD_SCOPE_PROCESS,
            };
            ffi::pthread_attr_setscope(raw, scope);
        }
        if attr.inherit_scheduling {
            return Ok(false);
        }
        let explicit = self.set_explicit_scheduling(attr);
        if !explicit {
            self.inherit_scheduling();
        }
        Ok(explicit)
    }

    /// All three settings or none: a policy left behind without a valid
    /// priority makes `pthread_create` fail.
    fn set_explicit_scheduling(&mut self, attr: &ThreadAttr) -> bool {
        let raw = self.as_mut_ptr();
        // SAFETY: `raw` is initialized; every call only writes into it.
        unsafe {
            if ffi::pthread_attr_setinheritsched(raw, ffi::PTHREAD_EXPLICIT_SCHED) != 0
                || ffi::pthread_attr_setschedpolicy(raw, native_policy(attr.scheduling_policy)) != 0
            {
                return false;
            }
            // SAFETY: all-zero is a valid `sched_param`.
            let mut param: libc::sched_param = core::mem::zeroed();
            param.sched_priority = attr.scheduling_priority;
            ffi::pthread_attr_setschedparam(raw, &param) == 0
        }
    }

    fn inherit_scheduling(&mut self) {
        let raw = self.as_mut_ptr();
        // SAFETY: `raw` points to an initialized attribute object.
        unsafe { ffi::pthread_attr_setinheritsched(raw, ffi::PTHREAD_INHERIT_SCHED) };
    }
}

impl Drop for NativeAttr {
    fn drop(&mut self) {
        // SAFETY: initialized in `new` and destroyed exactly once.
        unsafe { libc::pthread_attr_destroy(&mut self.0) };
    }
}

fn native_policy(policy: SchedPolicy) -> c_int {
    match policy {
        SchedPolicy::Other => libc::SCHED_OTHER,
        SchedPolicy::Fifo => libc::SCHED_FIFO,
        SchedPolicy::RoundRobin => libc::SCHED_RR,
    }
}

/// Aborts if a Rust panic reaches the native thread boundary. Forced
/// unwinding from `pthread_exit`/`pthread_cancel` is not a panic and passes.
struct AbortOnPanic;

impl Drop for AbortOnPanic {
    fn drop(&mut self) {
        if std::thread::panicking() {
            std::process::abort();
        }
    }
}

extern "C-unwind" fn thread_start(arg: *mut c_void) -> *mut c_void {
    let guard = AbortOnPanic;
    // SAFETY: `arg` is the `Box<Entry>` leaked by `spawn`, handed over once.
    let entry = unsafe { Box::from_raw(arg.cast::<Entry>()) };
    let value = entry();
    drop(guard);
    ptr::without_provenance_mut(value)
}

type StartRoutine = extern "C" fn(*mut c_void) -> *mut c_void;

impl RawThread for Thread {
    type Handle = Handle;

    fn spawn(attr: &ThreadAttr, entry: Entry) -> Result<(Option<Self>, Handle)> {
        attr.validate().map_err(|_| ThreadError::CreationFailed(EINVAL))?;
        let mut native_attr = NativeAttr::new()?;
        let explicit = native_attr.apply(attr)?;

        let arg = Box::into_raw(Box::new(entry));
        // SAFETY: same ABI and signature apart from the unwind permission.
        let start = unsafe {
            core::mem::transmute::<extern "C-unwind" fn(*mut c_void) -> *mut c_void, StartRoutine>(
                thread_start,
            )
        };
        let mut native = MaybeUninit::<libc::pthread_t>::uninit();
        // SAFETY: all pointers are valid; `arg` ownership moves to the thread on success.
        let mut rc = unsafe {
            libc::pthread_create(native.as_mut_ptr(), native_attr.as_mut_ptr(), start, arg.cast())
        };
        // Real-time policies need privileges the caller may lack.
        if explicit && (rc == libc::EPERM || rc == libc::EINVAL) {
            native_attr.inherit_scheduling();
            // SAFETY: as above; the failed call did not take `arg`.
            rc = unsafe {
                libc::pthread_create(native.as_mut_ptr(), native_attr.as_mut_ptr(), start, arg.cast())
            };
        }
        if rc != 0 {
            // SAFETY: the thread was not created, so `arg` is still ours.
            drop(unsafe { Box::from_raw(arg) });
            return Err(ThreadError::CreationFailed(rc));
        }
        // SAFETY: written by the successful `pthread_create`.
        let native = unsafe { native.assume_init() };
        let handle = Handle(native);
        if attr.is_detached() {
            Ok((None, handle))
        } else {
            Ok((Some(Self { native }), handle))
        }
    }

    fn join(self) -> Result<usize> {
        let mut value: *mut c_void = ptr::null_mut();
        // SAFETY: `self.native` is joinable and consumed here.
        let rc = unsafe { ffi::pthread_join(self.native, &mut value) };
        check(rc, ThreadError::JoinFailed)?;
        // glibc, musl and bionic report cancellation as (void*)-1, which is
        // `CANCELED`. Darwin uses (void*)1 and is passed through as-is.
        Ok(value.addr())
    }

    fn detach(self) -> Result<()> {
        // SAFETY: `self.native` is joinable and consumed here.
        check(unsafe { libc::pthread_detach(self.native) }, ThreadError::DetachFailed)
    }

    fn current() -> Handle {
        // SAFETY: always callable.
        Handle(unsafe { libc::pthread_self() })
    }

    fn id(handle: &Handle) -> u64 {
        handle.0 as usize as u64
    }

    fn exit(value: usize) -> ! {
        // SAFETY: terminates only the calling thread.
        unsafe { ffi::pthread_exit(ptr::without_provenance_mut(value)) }
    }

    fn cancel(handle: &Handle) -> Result<()> {
        // SAFETY: `handle` names a thread that has not been joined yet.
        check(unsafe { ffi::pthread_cancel(handle.0) }, ThreadError::CancelFailed)
    }

    fn testcancel() {
        // SAFETY: always callable.
        unsafe { ffi::pthread_testcancel() }
    }
}
