//! Timed-wait arithmetic.
//!
//! POSIX timed waits take an absolute deadline as seconds + nanoseconds; the
//! Win32 waits take a relative millisecond count where `u32::MAX` means
//! "forever". Both conversions live here so condition-variable and semaphore
//! timed waits share one implementation.

/// Nanoseconds per second.
pub const NSEC_PER_SEC: i64 = 1_000_000_000;

/// Nanoseconds per millisecond.
pub const NSEC_PER_MSEC: i64 = 1_000_000;

/// Win32 `INFINITE`; never produced by [`relative_timeout_ms`].
pub const WIN32_INFINITE: u32 = u32::MAX;

/// An absolute clock reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timespec {
    /// Seconds.
    pub tv_sec: i64,
    /// Nanoseconds (0 to 999_999_999 once normalized).
    pub tv_nsec: i64,
}

impl Timespec {
    #[must_use]
    pub const fn new(tv_sec: i64, tv_nsec: i64) -> Self {
        Self { tv_sec, tv_nsec }
    }

    /// True when the nanosecond field is in `0..NSEC_PER_SEC`.
    #[must_use]
    pub const fn is_normalized(&self) -> bool {
        self.tv_nsec >= 0 && self.tv_nsec < NSEC_PER_SEC
    }

    /// Carries whole seconds out of the nanosecond field (either direction).
    /// Saturates at `i64::MAX` seconds.
    #[must_use]
    pub const fn normalized(self) -> Self {
        let carry = self.tv_nsec.div_euclid(NSEC_PER_SEC);
        let tv_nsec = self.tv_nsec.rem_euclid(NSEC_PER_SEC);
        Self {
            tv_sec: self.tv_sec.saturating_add(carry),
            tv_nsec,
        }
    }
}

/// Computes `now + timeout_ms` as an absolute deadline.
///
/// The millisecond count is split into a whole-second part added to
/// `tv_sec` and a sub-second part added to `tv_nsec`, then any nanosecond
/// overflow is carried into seconds. The result is always normalized, so a
/// backend never sees `tv_nsec >= 1e9` (rejected with `EINVAL`) or a
/// deadline that is already in the past because of a lost carry.
#[must_use]
pub const fn deadline_after(now: Timespec, timeout_ms: u64) -> Timespec {
    let now = now.normalized();
    // u64::MAX / 1000 fits in i64.
    let whole_secs = (timeout_ms / 1000) as i64;
    let sub_nanos = ((timeout_ms % 1000) as i64) * NSEC_PER_MSEC;

    let mut tv_sec = now.tv_sec.saturating_add(whole_secs);
    let mut tv_nsec = now.tv_nsec + sub_nanos;
    if tv_nsec >= NSEC_PER_SEC {
        tv_nsec -= NSEC_PER_SEC;
        tv_sec = tv_sec.saturating_add(1);
    }
    Timespec { tv_sec, tv_nsec }
}

/// Clamps a millisecond timeout to what a Win32 wait accepts without
/// turning it into `INFINITE`.
#[must_use]
pub const fn relative_timeout_ms(timeout_ms: u64) -> u32 {
    if timeout_ms >= WIN32_INFINITE as u64 {
        WIN32_INFINITE - 1
    } else {
        timeout_ms as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_seconds_go_to_seconds_field() {
        let d = deadline_after(Timespec::new(100, 0), 3_000);
        assert_eq!(d, Timespec::new(103, 0));
    }

    #[test]
    fn sub_second_part_goes_to_nanos() {
        let d = deadline_after(Timespec::new(100, 1_000), 250);
        assert_eq!(d, Timespec::new(100, 250_001_000));
    }

    #[test]
    fn nanosecond_overflow_carries() {
        let d = deadline_after(Timespec::new(7, 900_000_000), 150);
        assert_eq!(d, Timespec::new(8, 50_000_000));
        assert!(d.is_normalized());
    }

    #[test]
    fn carry_at_exact_boundary() {
        let d = deadline_after(Timespec::new(7, 999_000_000), 1);
        assert_eq!(d, Timespec::new(8, 0));
    }

    #[test]
    fn mixed_seconds_and_carry() {
        let d = deadline_after(Timespec::new(1, 999_999_999), 2_001);
        assert_eq!(d, Timespec::new(4, 999_999));
    }

    #[test]
    fn zero_timeout_is_now() {
        let now = Timespec::new(42, 123);
        assert_eq!(deadline_after(now, 0), now);
    }

    #[test]
    fn huge_timeout_saturates_instead_of_wrapping() {
        let d = deadline_after(Timespec::new(i64::MAX - 1, 999_999_999), u64::MAX);
        assert_eq!(d.tv_sec, i64::MAX);
        assert!(d.is_normalized());
    }

    #[test]
    fn unnormalized_clock_reading_is_fixed_first() {
        let d = deadline_after(Timespec::new(5, 2_500_000_000), 0);
        assert_eq!(d, Timespec::new(7, 500_000_000));
        let d = deadline_after(Timespec::new(5, -1), 0);
        assert_eq!(d, Timespec::new(4, 999_999_999));
    }

    #[test]
    fn win32_timeout_never_becomes_infinite() {
        assert_eq!(relative_timeout_ms(50), 50);
        assert_eq!(relative_timeout_ms(u64::from(u32::MAX)), u32::MAX - 1);
        assert_eq!(relative_timeout_ms(u64::MAX), u32::MAX - 1);
        assert_eq!(relative_timeout_ms(u64::from(u32::MAX) - 1), u32::MAX - 1);
    }
}
