//! Harness configuration.
//!
//! The `CTHREADS_HARNESS_PROFILE` environment variable picks default
//! iteration counts:
//! - `quick` (default): enough rounds to catch gross violations in CI.
//! - `full`: longer contention runs for soak testing.
//!
//! Explicit CLI flags override whatever the profile implies.

use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::structured_log::HarnessError;

pub const PROFILE_ENV: &str = "CTHREADS_HARNESS_PROFILE";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Quick,
    Full,
}

impl Profile {
    /// Parse from string (case-insensitive); unknown values mean `Quick`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "soak" => Self::Full,
            _ => Self::Quick,
        }
    }

    #[must_use]
    pub const fn iterations(self) -> u32 {
        match self {
            Self::Quick => 2_000,
            Self::Full => 100_000,
        }
    }
}

// 0 = unresolved, otherwise PROFILE_* below.
static CACHED_PROFILE: AtomicU8 = AtomicU8::new(0);

const PROFILE_UNRESOLVED: u8 = 0;
const PROFILE_QUICK: u8 = 1;
const PROFILE_FULL: u8 = 2;

fn profile_to_u8(profile: Profile) -> u8 {
    match profile {
        Profile::Quick => PROFILE_QUICK,
        Profile::Full => PROFILE_FULL,
    }
}

fn u8_to_profile(v: u8) -> Profile {
    match v {
        PROFILE_FULL => Profile::Full,
        _ => Profile::Quick,
    }
}

/// Profile selected by the environment, read once per process.
#[must_use]
pub fn profile() -> Profile {
    let cached = CACHED_PROFILE.load(Ordering::Acquire);
    if cached != PROFILE_UNRESOLVED {
        return u8_to_profile(cached);
    }
    let profile = std::env::var(PROFILE_ENV)
        .map(|v| Profile::from_str_loose(&v))
        .unwrap_or_default();
    // First resolver wins; racing readers agree because the env is the same.
    match CACHED_PROFILE.compare_exchange(
        PROFILE_UNRESOLVED,
        profile_to_u8(profile),
        Ordering::AcqRel,
        Ordering::Acquire,
    ) {
        Ok(_) => profile,
        Err(existing) => u8_to_profile(existing),
    }
}

/// Knobs for one conformance run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Competing threads in contention properties.
    pub threads: usize,
    /// Rounds per thread in contention properties.
    pub iterations: u32,
    /// Timeout handed to timed waits.
    pub timeout_ms: u64,
    /// How far past the timeout a timed wait may return and still pass.
    pub slack_ms: u64,
    /// Run only properties whose name contains this substring.
    pub filter: Option<String>,
}

impl HarnessConfig {
    #[must_use]
    pub fn for_profile(profile: Profile) -> Self {
        Self {
            threads: 4,
            iterations: profile.iterations(),
            timeout_ms: 50,
            slack_ms: 450,
            filter: None,
        }
    }

    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.threads < 2 {
            return Err(HarnessError::InvalidConfig(format!(
                "threads must be at least 2, got {}",
                self.threads
            )));
        }
        if self.iterations == 0 {
            return Err(HarnessError::InvalidConfig(
                "iterations must be non-zero".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(HarnessError::InvalidConfig(
                "timed-wait timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn selects(&self, name: &str) -> bool {
        self.filter
            .as_deref()
            .is_none_or(|filter| name.contains(filter))
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::for_profile(profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_profiles() {
        assert_eq!(Profile::from_str_loose("full"), Profile::Full);
        assert_eq!(Profile::from_str_loose(" FULL "), Profile::Full);
        assert_eq!(Profile::from_str_loose("soak"), Profile::Full);
        assert_eq!(Profile::from_str_loose("quick"), Profile::Quick);
        assert_eq!(Profile::from_str_loose("bogus"), Profile::Quick);
        assert_eq!(Profile::from_str_loose(""), Profile::Quick);
    }

    #[test]
    fn cached_profile_is_sticky() {
        let previous = CACHED_PROFILE.swap(PROFILE_FULL, Ordering::SeqCst);
        assert_eq!(profile(), Profile::Full);
        CACHED_PROFILE.store(PROFILE_QUICK, Ordering::SeqCst);
        assert_eq!(profile(), Profile::Quick);
        CACHED_PROFILE.store(previous, Ordering::SeqCst);
    }

    #[test]
    fn validate_rejects_degenerate_knobs() {
        let good = HarnessConfig::for_profile(Profile::Quick);
        assert!(good.validate().is_ok());

        let one_thread = HarnessConfig {
            threads: 1,
            ..good.clone()
        };
        assert!(matches!(
            one_thread.validate(),
            Err(HarnessError::InvalidConfig(_))
        ));

        let no_rounds = HarnessConfig {
            iterations: 0,
            ..good.clone()
        };
        assert!(no_rounds.validate().is_err());

        let no_timeout = HarnessConfig {
            timeout_ms: 0,
            ..good
        };
        assert!(no_timeout.validate().is_err());
    }

    #[test]
    fn filter_matches_substrings() {
        let mut config = HarnessConfig::for_profile(Profile::Quick);
        assert!(config.selects("mutex_exclusion"));
        config.filter = Some("mutex".to_string());
        assert!(config.selects("mutex_exclusion"));
        assert!(!config.selects("rwlock_sharing"));
    }
}
