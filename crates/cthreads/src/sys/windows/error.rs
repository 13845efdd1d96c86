use core::ptr;

use super::{ffi, last_error};
use crate::sys::RawErrors;

pub(crate) struct Errors;

impl RawErrors for Errors {
    fn last_error_code() -> i32 {
        last_error()
    }

    fn raw_message(code: i32) -> Option<String> {
        let mut buf = [0u16; 512];
        // SAFETY: `buf` is writable for the length passed; no inserts are expanded.
        let len = unsafe {
            ffi::FormatMessageW(
                ffi::FORMAT_MESSAGE_FROM_SYSTEM | ffi::FORMAT_MESSAGE_IGNORE_INSERTS,
                ptr::null(),
                code as u32,
                0,
                buf.as_mut_ptr(),
                buf.len() as u32,
                ptr::null_mut(),
            )
        };
        if len == 0 {
            return None;
        }
        Some(String::from_utf16_lossy(&buf[..len as usize]))
    }
}
