//! Platform error codes and their messages.
//!
//! Codes are whatever the active backend produces (`errno` values on POSIX,
//! `GetLastError` values on Win32) and are not portable between them.

use cthreads_core::strerror::{copy_truncated, normalize_message, truncated_text, unknown_error};

use crate::sys::{RawErrors, imp};

/// The calling thread's most recent platform error code.
#[must_use]
pub fn last_error_code() -> i32 {
    imp::Errors::last_error_code()
}

/// Full message for `code`, with platform line endings and padding removed.
#[must_use]
pub fn error_message(code: i32) -> String {
    match imp::Errors::raw_message(code) {
        Some(raw) => {
            let text = normalize_message(&raw);
            if text.is_empty() {
                unknown_error(code)
            } else {
                text.to_owned()
            }
        }
        None => unknown_error(code),
    }
}

/// The message for `code` as it would fit a `capacity`-byte buffer, and the
/// length of the full message.
///
/// At most `capacity - 1` bytes of text are returned. When the returned
/// length is `>= capacity`, retrying with `length + 1` gives the whole text.
#[must_use]
pub fn error_string(code: i32, capacity: usize) -> (String, usize) {
    truncated_text(&error_message(code), capacity)
}

/// Writes the NUL-terminated message for `code` into `buf` and returns the
/// full message length, with the same truncation rule as [`error_string`].
pub fn error_string_into(code: i32, buf: &mut [u8]) -> usize {
    copy_truncated(&error_message(code), buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_has_no_trailing_whitespace() {
        let text = error_message(imp::EINVAL);
        assert!(!text.is_empty());
        assert_eq!(text, text.trim_end());
    }

    #[test]
    fn retry_with_required_plus_one_gives_full_text() {
        let full = error_message(imp::EINVAL);
        let (short, required) = error_string(imp::EINVAL, 4);
        assert_eq!(short.len(), 3);
        assert_eq!(required, full.len());
        assert!(required >= 4);

        let (text, _) = error_string(imp::EINVAL, required + 1);
        assert_eq!(text, full);
    }

    #[test]
    fn buffer_form_terminates() {
        let mut buf = [0xFFu8; 6];
        let required = error_string_into(imp::EINVAL, &mut buf);
        assert!(required > buf.len());
        assert_eq!(buf[5], 0);
    }
}
