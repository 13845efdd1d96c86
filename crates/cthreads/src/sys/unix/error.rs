use core::ffi::{CStr, c_char};

use crate::sys::RawErrors;

pub(crate) struct Errors;

impl RawErrors for Errors {
    fn last_error_code() -> i32 {
        std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
    }

    fn raw_message(code: i32) -> Option<String> {
        let mut buf = [0 as c_char; 1024];
        // SAFETY: `buf` is writable for its full length; the XSI variant
        // always NUL-terminates on success.
        let rc = unsafe { libc::strerror_r(code, buf.as_mut_ptr(), buf.len()) };
        if rc != 0 {
            return None;
        }
        // SAFETY: terminated by `strerror_r` above.
        let text = unsafe { CStr::from_ptr(buf.as_ptr()) };
        Some(text.to_string_lossy().into_owned())
    }
}
