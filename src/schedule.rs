//! Synthetic date computation.
//!
//! Every backdated commit gets a date of the form
//! `(now - 1 year) + 1 day + weeks + days`, where `weeks` is in `0..=53`
//! and `days` in `0..=5`. Both the batch generator and the single-shot
//! `mark` command use this formula.
//!
//! Arithmetic is calendar based: subtracting a year from Feb 29 lands on
//! Feb 28, and adding days keeps the wall-clock time of day.

use chrono::{DateTime, Days, FixedOffset, Local, Months, SecondsFormat};
use rand::Rng;
use rand::rngs::ThreadRng;

use crate::error::GenerateError;

/// Largest week offset a draw may produce.
pub const MAX_WEEKS: u32 = 53;
/// Largest day offset a draw may produce.
pub const MAX_DAYS: u32 = 5;

/// Week/day displacement applied on top of the one-year-ago anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub weeks: u32,
    pub days: u32,
}

impl Offset {
    pub const ZERO: Offset = Offset { weeks: 0, days: 0 };
    pub const MAX: Offset = Offset {
        weeks: MAX_WEEKS,
        days: MAX_DAYS,
    };

    /// Build an offset, rejecting values outside `0..=53` weeks / `0..=5` days.
    pub fn new(weeks: u32, days: u32) -> Result<Self, GenerateError> {
        if weeks > MAX_WEEKS || days > MAX_DAYS {
            return Err(GenerateError::InvalidOffset { weeks, days });
        }
        Ok(Offset { weeks, days })
    }

    /// Total number of calendar days added after the one-year subtraction.
    fn total_days(self) -> u64 {
        1 + 7 * u64::from(self.weeks) + u64::from(self.days)
    }
}

/// Source of "now".
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Produces one offset per generated commit.
pub trait OffsetSource {
    fn next_offset(&mut self) -> Offset;
}

/// Independent uniform draws: weeks from `0..=53`, days from `0..=5`.
pub struct RandomOffsets<R: Rng = ThreadRng> {
    rng: R,
}

impl RandomOffsets<ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RandomOffsets<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomOffsets<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> OffsetSource for RandomOffsets<R> {
    fn next_offset(&mut self) -> Offset {
        Offset {
            weeks: self.rng.gen_range(0..=MAX_WEEKS),
            days: self.rng.gen_range(0..=MAX_DAYS),
        }
    }
}

/// Replays a fixed list of offsets in order, wrapping around at the end.
///
/// An empty list always yields [`Offset::ZERO`].
#[derive(Debug, Clone)]
pub struct FixedOffsets {
    offsets: Vec<Offset>,
    next: usize,
}

impl FixedOffsets {
    pub fn new(offsets: Vec<Offset>) -> Self {
        Self { offsets, next: 0 }
    }
}

impl OffsetSource for FixedOffsets {
    fn next_offset(&mut self) -> Offset {
        if self.offsets.is_empty() {
            return Offset::ZERO;
        }
        let o = self.offsets[self.next % self.offsets.len()];
        self.next += 1;
        o
    }
}

/// Compute `(now - 1y) + 1d + weeks + days`.
///
/// # Errors
/// Returns [`GenerateError::DateOutOfRange`] if the arithmetic leaves the
/// range chrono can represent.
pub fn synthetic_date(
    now: &DateTime<FixedOffset>,
    offset: Offset,
) -> Result<DateTime<FixedOffset>, GenerateError> {
    now.checked_sub_months(Months::new(12))
        .and_then(|anchor| anchor.checked_add_days(Days::new(offset.total_days())))
        .ok_or(GenerateError::DateOutOfRange)
}

/// Inclusive range of dates any draw can produce for the given `now`.
pub fn window(
    now: &DateTime<FixedOffset>,
) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>), GenerateError> {
    Ok((
        synthetic_date(now, Offset::ZERO)?,
        synthetic_date(now, Offset::MAX)?,
    ))
}

/// RFC 3339 with second precision and a numeric offset, e.g. `2023-06-16T09:30:00+02:00`.
///
/// This exact string is used as the commit message and the record's `date` field.
pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn scenario_dates_follow_formula() {
        let now = at("2024-06-15T12:00:00+00:00");
        let cases = [
            ((0, 0), "2023-06-16T12:00:00+00:00"),
            ((10, 2), "2023-08-27T12:00:00+00:00"),
            ((53, 5), "2024-06-26T12:00:00+00:00"),
        ];
        for ((w, d), want) in cases {
            let got = synthetic_date(&now, Offset::new(w, d).unwrap()).unwrap();
            assert_eq!(format_date(&got), want, "offset ({w}, {d})");
        }
    }

    #[test]
    fn leap_day_clamps_to_feb_28() {
        let now = at("2024-02-29T08:00:00+00:00");
        let got = synthetic_date(&now, Offset::ZERO).unwrap();
        assert_eq!(format_date(&got), "2023-03-01T08:00:00+00:00");
    }

    #[test]
    fn keeps_offset_and_time_of_day() {
        let now = at("2024-06-15T23:45:10+09:00");
        let got = synthetic_date(&now, Offset::new(1, 1).unwrap()).unwrap();
        assert_eq!(format_date(&got), "2023-06-24T23:45:10+09:00");
    }

    #[test]
    fn offset_rejects_out_of_range() {
        assert!(Offset::new(53, 5).is_ok());
        assert!(matches!(
            Offset::new(54, 0),
            Err(GenerateError::InvalidOffset { weeks: 54, days: 0 })
        ));
        assert!(Offset::new(0, 6).is_err());
    }

    #[test]
    fn random_draws_stay_in_window() {
        let now = at("2025-01-10T10:00:00-05:00");
        let (start, end) = window(&now).unwrap();
        let mut src = RandomOffsets::with_rng(StdRng::seed_from_u64(7));
        for _ in 0..500 {
            let o = src.next_offset();
            assert!(o.weeks <= MAX_WEEKS && o.days <= MAX_DAYS);
            let d = synthetic_date(&now, o).unwrap();
            assert!(d >= start && d <= end, "{d} outside {start}..={end}");
        }
    }

    #[test]
    fn fixed_offsets_replay_and_wrap() {
        let a = Offset::new(1, 2).unwrap();
        let b = Offset::new(3, 4).unwrap();
        let mut src = FixedOffsets::new(vec![a, b]);
        assert_eq!(src.next_offset(), a);
        assert_eq!(src.next_offset(), b);
        assert_eq!(src.next_offset(), a);

        let mut empty = FixedOffsets::new(Vec::new());
        assert_eq!(empty.next_offset(), Offset::ZERO);
    }
}
