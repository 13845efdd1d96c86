//! Error message normalization and bounded copies.
//!
//! Raw backend messages differ in trailing decoration: `FormatMessageW`
//! appends `"\r\n"`, some `strerror` tables end with a space. The message is
//! trimmed first and only then truncated to fit the caller's buffer, so a
//! retry with a larger buffer always yields the same text.

/// Strips trailing whitespace and line terminators from a raw backend message.
#[must_use]
pub fn normalize_message(raw: &str) -> &str {
    raw.trim_end_matches(|c: char| c.is_whitespace() || c == '\0')
}

/// Copies `message` into `buf` as a NUL-terminated string.
///
/// At most `buf.len() - 1` bytes of text are written, cut back to a UTF-8
/// character boundary, followed by a terminator. Returns the number of bytes
/// (excluding the terminator) the untruncated message needs; a caller whose
/// result is `>= buf.len()` should retry with at least `result + 1` bytes.
/// An empty `buf` receives nothing.
pub fn copy_truncated(message: &str, buf: &mut [u8]) -> usize {
    let required = message.len();
    let Some(room) = buf.len().checked_sub(1) else {
        return required;
    };

    let mut take = required.min(room);
    while !message.is_char_boundary(take) {
        take -= 1;
    }
    buf[..take].copy_from_slice(&message.as_bytes()[..take]);
    buf[take] = 0;
    required
}

/// Owned variant of [`copy_truncated`]: the text that fits in a buffer of
/// `capacity` bytes (terminator not included), plus the required length.
#[must_use]
pub fn truncated_text(message: &str, capacity: usize) -> (String, usize) {
    let mut buf = vec![0u8; capacity];
    let required = copy_truncated(message, &mut buf);
    let end = buf.iter().position(|&b| b == 0).unwrap_or(0);
    buf.truncate(end);
    (String::from_utf8_lossy(&buf).into_owned(), required)
}

/// Fallback text for codes the backend has no message for.
#[must_use]
pub fn unknown_error(code: i32) -> String {
    format!("Unknown error {code}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_crlf_and_spaces() {
        assert_eq!(normalize_message("Access is denied.\r\n"), "Access is denied.");
        assert_eq!(normalize_message("Device busy \n"), "Device busy");
        assert_eq!(normalize_message("No error\0\0"), "No error");
        assert_eq!(normalize_message("clean"), "clean");
    }

    #[test]
    fn fits_without_truncation() {
        let mut buf = [0xAAu8; 16];
        let required = copy_truncated("Busy", &mut buf);
        assert_eq!(required, 4);
        assert_eq!(&buf[..5], b"Busy\0");
    }

    #[test]
    fn truncates_and_terminates() {
        let mut buf = [0xAAu8; 5];
        let required = copy_truncated("Resource busy", &mut buf);
        assert_eq!(required, 13);
        assert_eq!(&buf, b"Reso\0");
    }

    #[test]
    fn exact_length_buffer_is_one_short() {
        let msg = "Timed out";
        let mut buf = vec![0u8; msg.len()];
        let required = copy_truncated(msg, &mut buf);
        assert_eq!(required, msg.len());
        assert_eq!(&buf[..], b"Timed ou\0");

        let mut buf = vec![0u8; required + 1];
        copy_truncated(msg, &mut buf);
        assert_eq!(&buf[..required], msg.as_bytes());
        assert_eq!(buf[required], 0);
    }

    #[test]
    fn empty_buffer_only_reports_length() {
        let mut buf: [u8; 0] = [];
        assert_eq!(copy_truncated("anything", &mut buf), 8);
    }

    #[test]
    fn single_byte_buffer_gets_terminator() {
        let mut buf = [0xAAu8; 1];
        assert_eq!(copy_truncated("abc", &mut buf), 3);
        assert_eq!(buf, [0]);
    }

    #[test]
    fn never_splits_a_multibyte_char() {
        let mut buf = [0xAAu8; 3];
        // "é" is two bytes; only "a" fits before the boundary.
        let required = copy_truncated("aé", &mut buf);
        assert_eq!(required, 3);
        assert_eq!(&buf[..2], b"a\0");
    }

    #[test]
    fn owned_variant_matches_buffer_variant() {
        let (text, required) = truncated_text("Operation not permitted", 10);
        assert_eq!(text, "Operation");
        assert_eq!(required, 23);

        let (text, _) = truncated_text("Operation not permitted", required + 1);
        assert_eq!(text, "Operation not permitted");
    }

    #[test]
    fn unknown_error_mentions_code() {
        assert_eq!(unknown_error(9999), "Unknown error 9999");
    }
}
