use core::cell::UnsafeCell;
use core::ffi::c_void;
use core::ptr;

use cthreads_core::{Result, ThreadError};

use super::{ffi, last_error};
use crate::sys::RawOnce;

pub(crate) struct Once(UnsafeCell<ffi::INIT_ONCE>);

// SAFETY: `InitOnceExecuteOnce` serializes all access to the control word.
unsafe impl Sync for Once {}
// SAFETY: the control word holds no thread-bound state.
unsafe impl Send for Once {}

unsafe extern "system" fn run_once(
    _once: *mut ffi::INIT_ONCE,
    param: *mut c_void,
    _context: *mut *mut c_void,
) -> ffi::BOOL {
    // SAFETY: `param` points at the `&mut dyn FnMut()` owned by `call_once`,
    // which is blocked until this returns.
    let f = unsafe { &mut *param.cast::<&mut dyn FnMut()>() };
    f();
    1
}

impl Once {
    pub(crate) const fn new() -> Self {
        Self(UnsafeCell::new(ffi::INIT_ONCE {
            ptr: ptr::null_mut(),
        }))
    }
}

impl RawOnce for Once {
    fn call_once(&self, mut f: &mut dyn FnMut()) -> Result<()> {
        let param = (&raw mut f).cast::<c_void>();
        // SAFETY: the control word lives as long as `self`; `param` outlives the call.
        let ok = unsafe { ffi::InitOnceExecuteOnce(self.0.get(), run_once, param, ptr::null_mut()) };
        if ok == 0 {
            return Err(ThreadError::InitFailed(last_error()));
        }
        Ok(())
    }
}
