//! Recurring time occupation model.
//!
//! A [`TimeSlot`] describes something that happens on one weekday, over an
//! inclusive range of teaching periods, repeated on a set of term weeks.
//!
//! # Overlap
//! Two slots overlap iff all three hold:
//! - they share at least one week,
//! - they fall on the same weekday,
//! - their period ranges intersect: `max(s1, s2) <= min(e1, e2)`.
//!
//! Slots are immutable once built. Every constructor validates, so a
//! `TimeSlot` value always has a non-empty week set and `start <= end`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::notation::{parse_period_range, parse_weekday, parse_weeks, MAX_WEEK};
use crate::error::ParseError;

/// A validated recurring occupation: weeks × weekday × period range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TimeSlotParts")]
pub struct TimeSlot {
    weeks: BTreeSet<u32>,
    weekday: u8,
    period_start: u32,
    period_end: u32,
}

/// Unchecked field bundle used for deserialization.
#[derive(Deserialize)]
struct TimeSlotParts {
    weeks: BTreeSet<u32>,
    weekday: u8,
    period_start: u32,
    period_end: u32,
}

impl TryFrom<TimeSlotParts> for TimeSlot {
    type Error = ParseError;

    fn try_from(parts: TimeSlotParts) -> Result<Self, Self::Error> {
        TimeSlot::new(
            parts.weeks,
            parts.weekday,
            parts.period_start,
            parts.period_end,
        )
    }
}

impl TimeSlot {
    /// Creates a slot from canonical values.
    ///
    /// # Errors
    /// - `EmptyWeeks` if no week is given.
    /// - `InvalidWeeks` if a week is 0 or above [`MAX_WEEK`].
    /// - `InvalidWeekday` unless `1 <= weekday <= 7`.
    /// - `InvalidPeriod` if a period is 0.
    /// - `InvertedPeriod` if `period_start > period_end`.
    pub fn new(
        weeks: impl IntoIterator<Item = u32>,
        weekday: u8,
        period_start: u32,
        period_end: u32,
    ) -> Result<Self, ParseError> {
        let weeks: BTreeSet<u32> = weeks.into_iter().collect();
        if weeks.is_empty() {
            return Err(ParseError::EmptyWeeks);
        }
        if let Some(bad) = weeks.iter().find(|w| !(1..=MAX_WEEK).contains(*w)) {
            return Err(ParseError::InvalidWeeks(bad.to_string()));
        }
        if !(1..=7).contains(&weekday) {
            return Err(ParseError::InvalidWeekday(weekday.to_string()));
        }
        if period_start == 0 {
            return Err(ParseError::InvalidPeriod(period_start.to_string()));
        }
        if period_start > period_end {
            return Err(ParseError::InvertedPeriod {
                start: period_start,
                end: period_end,
            });
        }
        Ok(Self {
            weeks,
            weekday,
            period_start,
            period_end,
        })
    }

    /// Parses free-form week, weekday and period notations.
    ///
    /// See [`parse_weeks`], [`parse_weekday`] and [`parse_period_range`]
    /// for the accepted forms.
    pub fn from_raw(
        weeks_spec: &str,
        weekday_spec: &str,
        period_spec: &str,
    ) -> Result<Self, ParseError> {
        let weeks = parse_weeks(weeks_spec)?;
        let weekday = parse_weekday(weekday_spec)?;
        let (start, end) = parse_period_range(period_spec)?;
        Self::new(weeks, weekday, start, end)
    }

    /// Weeks this slot repeats on, ascending.
    pub fn weeks(&self) -> &BTreeSet<u32> {
        &self.weeks
    }

    /// Weekday, 1 = Monday … 7 = Sunday.
    #[inline]
    pub fn weekday(&self) -> u8 {
        self.weekday
    }

    /// First period (inclusive).
    #[inline]
    pub fn period_start(&self) -> u32 {
        self.period_start
    }

    /// Last period (inclusive).
    #[inline]
    pub fn period_end(&self) -> u32 {
        self.period_end
    }

    /// Earliest week, used as the slot's position in the term.
    pub fn main_week(&self) -> u32 {
        // Non-empty by construction.
        self.weeks.first().copied().unwrap_or(0)
    }

    /// Whether two slots occupy a common week, weekday and period.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.weekday == other.weekday
            && self.period_start.max(other.period_start) <= self.period_end.min(other.period_end)
            && !self.weeks.is_disjoint(&other.weeks)
    }

    /// Whether two slots sit at the same weekday and period range,
    /// regardless of weeks.
    pub fn same_pattern(&self, other: &Self) -> bool {
        self.weekday == other.weekday
            && self.period_start == other.period_start
            && self.period_end == other.period_end
    }

    /// Number of weeks shared with `other`.
    pub fn shared_weeks(&self, other: &Self) -> usize {
        self.weeks.intersection(&other.weeks).count()
    }
}

/// Symmetric overlap predicate.
#[inline]
pub fn overlaps(a: &TimeSlot, b: &TimeSlot) -> bool {
    a.overlaps(b)
}
