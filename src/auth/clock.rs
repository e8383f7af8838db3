//! Wall-clock access for signed requests.
//!
//! Detectify binds each signature to the time the request was made, so the
//! signing middleware reads the clock once per request.

use time::OffsetDateTime;

/// Trait for providing the current time to the signing middleware.
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> OffsetDateTime;

    /// Get the current time as whole seconds since the UNIX epoch.
    fn unix_timestamp(&self) -> i64 {
        self.now().unix_timestamp()
    }
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock frozen at a single instant.
///
/// Useful for reproducing signatures in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: OffsetDateTime,
}

impl FixedClock {
    /// Create a clock that always reports the given instant.
    pub fn new(instant: OffsetDateTime) -> Self {
        Self { instant }
    }

    /// Create a clock from a unix timestamp in seconds.
    ///
    /// Returns `None` if the timestamp is outside the supported range.
    pub fn from_unix_timestamp(timestamp: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp(timestamp)
            .ok()
            .map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.instant
    }
}
