//! Retry configuration for artifact uploads.
//!
//! Defaults can be tuned per environment (e.g. a flaky CI runner) without
//! changing the command line; explicit flags still win.

use crate::retry::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
use std::time::Duration;

/// Upper bound for upload attempts
pub const MAX_ATTEMPTS: u32 = 10;

/// Upper bound for the pause between attempts
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Retry tuning resolved from the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    /// Total upload attempts
    pub attempts: u32,
    /// Pause between attempts in milliseconds
    pub backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_ms: 0,
        }
    }
}

impl RetrySettings {
    /// Parse a number from `value`, clamped to `[min, max]`, falling back to `default`
    fn parse_clamped<T>(value: Option<String>, default: T, min: T, max: T) -> T
    where
        T: std::str::FromStr + Ord,
    {
        value
            .and_then(|s| s.trim().parse::<T>().ok())
            .map(|v| v.clamp(min, max))
            .unwrap_or(default)
    }

    /// Read `LIZARD_RELEASE_ATTEMPTS` and `LIZARD_RELEASE_BACKOFF_MS`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            attempts: Self::parse_clamped(
                lookup("LIZARD_RELEASE_ATTEMPTS"),
                defaults.attempts,
                1,
                MAX_ATTEMPTS,
            ),
            backoff_ms: Self::parse_clamped(
                lookup("LIZARD_RELEASE_BACKOFF_MS"),
                defaults.backoff_ms,
                0,
                MAX_BACKOFF_MS,
            ),
        }
    }

    /// Apply command line overrides
    pub fn with_overrides(self, attempts: Option<u32>, backoff_ms: Option<u64>) -> Self {
        Self {
            attempts: attempts.map_or(self.attempts, |a| a.clamp(1, MAX_ATTEMPTS)),
            backoff_ms: backoff_ms.map_or(self.backoff_ms, |b| b.min(MAX_BACKOFF_MS)),
        }
    }

    /// Policy handed to the publisher
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.attempts,
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        let settings = RetrySettings::from_lookup(|_| None);
        assert_eq!(settings, RetrySettings::default());
        assert_eq!(settings.policy(), RetryPolicy::default());
    }

    #[test]
    fn test_env_values_are_clamped() {
        let settings = RetrySettings::from_lookup(|name| match name {
            "LIZARD_RELEASE_ATTEMPTS" => Some("50".to_string()),
            "LIZARD_RELEASE_BACKOFF_MS" => Some("250".to_string()),
            _ => None,
        });
        assert_eq!(settings.attempts, MAX_ATTEMPTS);
        assert_eq!(settings.backoff_ms, 250);

        let settings = RetrySettings::from_lookup(|name| match name {
            "LIZARD_RELEASE_ATTEMPTS" => Some("0".to_string()),
            _ => Some("garbage".to_string()),
        });
        assert_eq!(settings.attempts, 1);
        assert_eq!(settings.backoff_ms, 0);
    }

    #[test]
    fn test_flags_override_env() {
        let settings = RetrySettings::from_lookup(|name| match name {
            "LIZARD_RELEASE_ATTEMPTS" => Some("7".to_string()),
            _ => None,
        })
        .with_overrides(Some(2), Some(10));

        assert_eq!(settings.attempts, 2);
        assert_eq!(settings.policy().backoff, Duration::from_millis(10));
    }
}
