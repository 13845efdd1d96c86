//! Counting-semaphore limits.

use crate::error::AttrError;

/// Largest count accepted on every backend (`SEM_VALUE_MAX` on Linux, the
/// `LONG` maximum for Win32 semaphores).
pub const SEM_VALUE_MAX: u32 = i32::MAX as u32;

/// Checks an initial count against [`SEM_VALUE_MAX`].
pub fn validate_initial_count(count: u32) -> Result<(), AttrError> {
    if count > SEM_VALUE_MAX {
        return Err(AttrError::CountAboveMaximum(u64::from(count)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_up_to_maximum() {
        assert_eq!(validate_initial_count(0), Ok(()));
        assert_eq!(validate_initial_count(SEM_VALUE_MAX), Ok(()));
    }

    #[test]
    fn rejects_above_maximum() {
        assert_eq!(
            validate_initial_count(SEM_VALUE_MAX + 1),
            Err(AttrError::CountAboveMaximum(u64::from(SEM_VALUE_MAX) + 1))
        );
    }
}
