//! Time handling for epoch boundaries
//!
//! Wall-clock reads go through [`mockable::Clock`] so services can be driven
//! by a deterministic clock in tests.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

pub use mockable::{Clock, DefaultClock};

/// Shared clock handle injected into services at construction time
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Timestamp type used for every persisted record
pub type Timestamp = DateTime<Utc>;

/// The cutoff used before any settlement exists ("beginning of time")
pub fn epoch_origin() -> Timestamp {
    DateTime::<Utc>::MIN_UTC
}

/// Returns a clock backed by the system time
pub fn system_clock() -> SharedClock {
    Arc::new(DefaultClock)
}

/// Returns `requested` unless it does not sort strictly after `previous`,
/// in which case the instant one nanosecond after `previous` is returned.
///
/// Stores use this to keep write timestamps totally ordered so a row is
/// never ambiguous with respect to a settlement boundary.
pub fn strictly_after(previous: Option<Timestamp>, requested: Timestamp) -> Timestamp {
    match previous {
        Some(prev) if requested <= prev => prev + Duration::nanoseconds(1),
        _ => requested,
    }
}

/// Deterministic clocks for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::{Local, TimeZone};
    use std::sync::Mutex;

    /// A clock that only moves when told to
    #[derive(Debug)]
    pub struct ManualClock(Mutex<Timestamp>);

    impl ManualClock {
        /// Creates a clock frozen at `start`
        pub fn new(start: Timestamp) -> Self {
            Self(Mutex::new(start))
        }

        /// Creates a clock frozen at 2024-01-01T00:00:00Z
        pub fn at_default_start() -> Self {
            match Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0) {
                chrono::LocalResult::Single(start) => Self::new(start),
                _ => Self::new(Utc::now()),
            }
        }

        /// Moves the clock to an absolute instant
        pub fn set(&self, instant: Timestamp) {
            *self.lock() = instant;
        }

        /// Moves the clock forward
        pub fn advance(&self, delta: Duration) {
            *self.lock() += delta;
        }

        /// Moves the clock forward by whole seconds
        pub fn advance_seconds(&self, seconds: i64) {
            self.advance(Duration::seconds(seconds));
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Timestamp> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            }
        }
    }

    impl Clock for ManualClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock()
        }
    }
}
