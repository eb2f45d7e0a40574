//! "Time since consumption" arithmetic.
//!
//! The logging form asks how long ago a coffee was drunk as an hour and a
//! minute offset; the journal key is the wall clock minus that offset.
//!
//! The minutes term has two units because earlier releases shipped with
//! `minutes * 60 * 60` milliseconds - minutes effectively contributed
//! nothing to the key. Journals written by those releases only keep their
//! key geometry when the same arithmetic is used, so the unit is a
//! deployment-level policy rather than a hard-coded fix. See [`MinuteUnit`].

use serde::Deserialize;

use crate::types::entry::EntryKey;

/// Milliseconds per hour.
pub const MS_PER_HOUR: i64 = 3_600_000;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: i64 = 60_000;

/// The minute offsets the form offers.
pub const MINUTE_CHOICES: &[u8] = &[0, 5, 10, 15, 30, 45];

/// The hour offsets the form offers.
pub const HOUR_CHOICES: &[u8] = &[
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23,
];

/// The largest hour offset the form offers.
pub const MAX_HOURS: u8 = 23;

/// Errors from validating a time-since-consumption offset.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeSinceError {
    /// Hour offset outside the form's range.
    #[error("hours must be between 0 and {MAX_HOURS} (got {0})")]
    InvalidHours(u8),
    /// Minute offset that the form does not offer.
    #[error("minutes must be one of {MINUTE_CHOICES:?} (got {0})")]
    InvalidMinutes(u8),
}

/// Which millisecond weight the minutes term carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MinuteUnit {
    /// The intended arithmetic: one minute is 60,000 ms.
    #[default]
    Minutes,
    /// The arithmetic earlier releases shipped with: one minute is
    /// 3,600 ms (`60 * 60`), so minutes barely move the key. Required to
    /// keep keys compatible with journals written by those releases.
    LegacySeconds,
}

impl MinuteUnit {
    /// Milliseconds contributed per minute of offset.
    #[must_use]
    pub const fn millis_per_minute(self) -> i64 {
        match self {
            Self::Minutes => MS_PER_MINUTE,
            Self::LegacySeconds => 60 * 60,
        }
    }
}

impl std::str::FromStr for MinuteUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minutes" => Ok(Self::Minutes),
            "legacy" | "legacy-seconds" => Ok(Self::LegacySeconds),
            other => Err(format!(
                "unknown minute unit '{other}' (expected 'minutes' or 'legacy-seconds')"
            )),
        }
    }
}

/// How long ago a coffee was consumed, as entered in the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TimeSince {
    /// Whole hours ago, 0 to [`MAX_HOURS`].
    pub hours: u8,
    /// Additional minutes ago, one of [`MINUTE_CHOICES`].
    pub minutes: u8,
}

impl TimeSince {
    /// Create a validated offset.
    ///
    /// # Errors
    ///
    /// Returns an error if `hours` exceeds [`MAX_HOURS`] or `minutes` is
    /// not one of [`MINUTE_CHOICES`].
    pub fn new(hours: u8, minutes: u8) -> Result<Self, TimeSinceError> {
        if hours > MAX_HOURS {
            return Err(TimeSinceError::InvalidHours(hours));
        }
        if !MINUTE_CHOICES.contains(&minutes) {
            return Err(TimeSinceError::InvalidMinutes(minutes));
        }
        Ok(Self { hours, minutes })
    }

    /// Total offset in milliseconds under the given minute unit.
    #[must_use]
    pub fn offset_millis(self, unit: MinuteUnit) -> i64 {
        i64::from(self.hours) * MS_PER_HOUR + i64::from(self.minutes) * unit.millis_per_minute()
    }

    /// The journal key for a coffee consumed this long before `now_millis`.
    #[must_use]
    pub fn entry_key(self, now_millis: i64, unit: MinuteUnit) -> EntryKey {
        now_millis - self.offset_millis(unit)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_offset_is_now() {
        let t = TimeSince::new(0, 0).unwrap();
        assert_eq!(t.offset_millis(MinuteUnit::Minutes), 0);
        assert_eq!(t.entry_key(1_754_000_000_000, MinuteUnit::Minutes), 1_754_000_000_000);
    }

    #[test]
    fn test_offset_with_minute_unit() {
        // 2h30m = 7,200,000 + 30 * 60,000
        let t = TimeSince::new(2, 30).unwrap();
        assert_eq!(t.offset_millis(MinuteUnit::Minutes), 9_000_000);
    }

    #[test]
    fn test_offset_with_legacy_unit() {
        // 2h30m under the legacy arithmetic: 7,200,000 + 30 * 3,600
        let t = TimeSince::new(2, 30).unwrap();
        assert_eq!(t.offset_millis(MinuteUnit::LegacySeconds), 7_308_000);
    }

    #[test]
    fn test_minutes_barely_move_the_legacy_key() {
        // The whole point of the legacy unit: 45 minutes shifts the key by
        // 162 seconds, not 45 minutes.
        let t = TimeSince::new(0, 45).unwrap();
        assert_eq!(t.offset_millis(MinuteUnit::LegacySeconds), 162_000);
    }

    #[test]
    fn test_entry_keys_track_wall_clock_delta() {
        // Identical offsets at two instants differ by exactly the elapsed
        // wall-clock time, under either unit.
        let t = TimeSince::new(3, 15).unwrap();
        for unit in [MinuteUnit::Minutes, MinuteUnit::LegacySeconds] {
            let first = t.entry_key(1_754_000_000_000, unit);
            let second = t.entry_key(1_754_000_004_321, unit);
            assert_eq!(second - first, 4_321);
        }
    }

    #[test]
    fn test_rejects_out_of_range_hours() {
        assert_eq!(
            TimeSince::new(24, 0),
            Err(TimeSinceError::InvalidHours(24))
        );
    }

    #[test]
    fn test_rejects_unoffered_minutes() {
        assert_eq!(
            TimeSince::new(0, 7),
            Err(TimeSinceError::InvalidMinutes(7))
        );
    }

    #[test]
    fn test_minute_unit_parsing() {
        assert_eq!("minutes".parse::<MinuteUnit>().unwrap(), MinuteUnit::Minutes);
        assert_eq!(
            "legacy-seconds".parse::<MinuteUnit>().unwrap(),
            MinuteUnit::LegacySeconds
        );
        assert!("fortnights".parse::<MinuteUnit>().is_err());
    }
}
