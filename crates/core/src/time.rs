use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    /// Same as [`Clock::advance`] for a `std` duration, as produced by timers.
    pub fn advance_std(&mut self, delta: std::time::Duration) {
        self.advance(Duration::from_std(delta).unwrap_or_else(|_| Duration::zero()));
    }

    /// Whole minutes elapsed since `since`, floored and never negative.
    #[must_use]
    pub fn whole_minutes_since(&self, since: DateTime<Utc>) -> u32 {
        let minutes = (self.now() - since).num_minutes().max(0);
        u32::try_from(minutes).unwrap_or(u32::MAX)
    }
}

/// Calendar day of `at` as seen from `offset`.
#[must_use]
pub fn date_key(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// The machine's current UTC offset.
#[must_use]
pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// UTC as a `FixedOffset`.
#[must_use]
pub fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
