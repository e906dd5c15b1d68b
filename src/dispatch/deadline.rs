//! Caller deadline decoding.

use std::time::Duration;

use crate::types::{Error, Result};

/// Sentinel meaning "wait forever, and I mean it".
pub const INFINITE_TIMEOUT_SECONDS: f64 = -1.0;

/// How long a call may run before the client gives up on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deadline {
    /// Caller expressed no preference. No timer.
    Unspecified,
    /// Caller explicitly asked for no timeout. No timer.
    Infinite,
    /// Give up after this long.
    After(Duration),
}

impl Deadline {
    /// Decode the `timeout_seconds` convention: absent → unspecified,
    /// `-1` → infinite, positive → seconds.
    pub fn from_timeout_seconds(timeout_seconds: Option<f64>) -> Result<Self> {
        let Some(seconds) = timeout_seconds else {
            return Ok(Deadline::Unspecified);
        };

        if seconds == INFINITE_TIMEOUT_SECONDS {
            return Ok(Deadline::Infinite);
        }

        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(Error::validation(format!(
                "timeout must be positive or -1, got {}",
                seconds
            )));
        }

        Duration::try_from_secs_f64(seconds)
            .map(Deadline::After)
            .map_err(|e| Error::validation(format!("timeout {} out of range: {}", seconds, e)))
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            Deadline::After(d) => Some(*d),
            _ => None,
        }
    }

    /// Seconds as reported back to callers, `None` without a timer.
    pub fn seconds(&self) -> Option<f64> {
        self.duration().map(|d| d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_is_unspecified() {
        assert_eq!(Deadline::from_timeout_seconds(None).unwrap(), Deadline::Unspecified);
    }

    #[test]
    fn test_minus_one_is_infinite() {
        assert_eq!(Deadline::from_timeout_seconds(Some(-1.0)).unwrap(), Deadline::Infinite);
    }

    #[test]
    fn test_positive_is_after() {
        let deadline = Deadline::from_timeout_seconds(Some(1.5)).unwrap();
        assert_eq!(deadline.duration(), Some(Duration::from_millis(1500)));
        assert_eq!(deadline.seconds(), Some(1.5));
    }

    #[test]
    fn test_rejects_other_values() {
        for bad in [0.0, -2.0, f64::NAN, f64::INFINITY, 1e300] {
            assert!(
                Deadline::from_timeout_seconds(Some(bad)).is_err(),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_no_timer_variants_have_no_duration() {
        assert!(Deadline::Unspecified.duration().is_none());
        assert!(Deadline::Infinite.seconds().is_none());
    }
}
