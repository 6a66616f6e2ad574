//! Date ranges and their partition into 7-day scheduling weeks.
//!
//! Scheduling weeks are anchored at the first date of the range, not at
//! calendar week boundaries: the date at position `i` belongs to week
//! `i / 7 + 1`. A range whose length is not a multiple of seven ends in a
//! shorter trailing week.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::ScheduleError;

/// Longest accepted range, counted in dates (inclusive).
pub const MAX_RANGE_DAYS: i64 = 366;

pub const DAYS_PER_WEEK: usize = 7;

/// An inclusive, validated date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ScheduleError> {
        if start > end {
            return Err(ScheduleError::StartAfterEnd { start, end });
        }
        let days = (end - start).num_days() + 1;
        if days > MAX_RANGE_DAYS {
            return Err(ScheduleError::RangeTooLong(days));
        }
        Ok(Self { start, end })
    }

    /// Parses two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ScheduleError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// The whole calendar month.
    pub fn for_month(year: i32, month: u32) -> Result<Self, ScheduleError> {
        let invalid = || ScheduleError::InvalidMonth(format!("{year:04}-{month:02}"));
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next = start.checked_add_months(chrono::Months::new(1)).ok_or_else(invalid)?;
        let end = next.pred_opt().ok_or_else(invalid)?;
        Self::new(start, end)
    }

    /// Parses `YYYY-MM` into the whole month.
    pub fn parse_month(month: &str) -> Result<Self, ScheduleError> {
        let invalid = || ScheduleError::InvalidMonth(month.to_string());
        let (year, mon) = month.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let mon: u32 = mon.parse().map_err(|_| invalid())?;
        Self::for_month(year, mon)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end && end >= self.start
    }

    pub fn num_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(self.num_days());
        let mut current = self.start;
        while current <= self.end {
            dates.push(current);
            match current.checked_add_days(Days::new(1)) {
                Some(next) => current = next,
                None => break,
            }
        }
        dates
    }

    /// Distinct `YYYY-MM` months touched by the range, in order.
    pub fn months(&self) -> Vec<String> {
        let mut months: Vec<String> = Vec::new();
        for date in self.dates() {
            let month = month_key(date);
            if months.last() != Some(&month) {
                months.push(month);
            }
        }
        months
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDate(value.to_string()))
}

/// `YYYY-MM` key used for monthly counters and preferences.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// The ordered dates of a range and their scheduling weeks.
#[derive(Debug, Clone)]
pub struct SchedulingCalendar {
    dates: Vec<NaiveDate>,
}

impl SchedulingCalendar {
    pub fn new(range: &DateRange) -> Self {
        Self {
            dates: range.dates(),
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// 1-based week of the date at `index`.
    pub fn week_of_index(index: usize) -> usize {
        index / DAYS_PER_WEEK + 1
    }

    pub fn week_of(&self, date: NaiveDate) -> Option<usize> {
        let first = *self.dates.first()?;
        if date < first {
            return None;
        }
        let index = (date - first).num_days() as usize;
        (index < self.dates.len()).then(|| Self::week_of_index(index))
    }

    pub fn week_count(&self) -> usize {
        self.dates.len().div_ceil(DAYS_PER_WEEK)
    }

    /// Dates of a 1-based week; empty when out of range.
    pub fn week_dates(&self, week: usize) -> &[NaiveDate] {
        if week == 0 {
            return &[];
        }
        let start = (week - 1) * DAYS_PER_WEEK;
        if start >= self.dates.len() {
            return &[];
        }
        let end = (week * DAYS_PER_WEEK).min(self.dates.len());
        &self.dates[start..end]
    }

    /// `(week, dates)` for every week in order.
    pub fn weeks(&self) -> impl Iterator<Item = (usize, &[NaiveDate])> + '_ {
        self.dates
            .chunks(DAYS_PER_WEEK)
            .enumerate()
            .map(|(index, dates)| (index + 1, dates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rejects_start_after_end() {
        let result = DateRange::new(date(2024, 3, 10), date(2024, 3, 1));
        assert!(matches!(result, Err(ScheduleError::StartAfterEnd { .. })));
    }

    #[test]
    fn test_range_limit_is_inclusive() {
        // 2024 is a leap year: Jan 1 to Dec 31 is exactly 366 dates.
        assert!(DateRange::new(date(2024, 1, 1), date(2024, 12, 31)).is_ok());
        assert_eq!(
            DateRange::new(date(2024, 1, 1), date(2025, 1, 1)),
            Err(ScheduleError::RangeTooLong(367))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            DateRange::parse("2024-13-01", "2024-12-31"),
            Err(ScheduleError::InvalidDate(_))
        ));
        assert!(matches!(
            DateRange::parse_month("2024/02"),
            Err(ScheduleError::InvalidMonth(_))
        ));
    }

    #[test]
    fn test_month_mode() {
        let range = DateRange::parse_month("2024-02").unwrap();
        assert_eq!(range.start(), date(2024, 2, 1));
        assert_eq!(range.end(), date(2024, 2, 29));
        assert_eq!(range.num_days(), 29);
    }

    #[test]
    fn test_weeks_anchor_at_range_start() {
        let range = DateRange::new(date(2024, 3, 6), date(2024, 3, 15)).unwrap();
        let calendar = SchedulingCalendar::new(&range);

        assert_eq!(calendar.week_count(), 2);
        assert_eq!(calendar.week_dates(1).len(), 7);
        assert_eq!(calendar.week_dates(2), &[date(2024, 3, 13), date(2024, 3, 14), date(2024, 3, 15)]);
        assert_eq!(calendar.week_of(date(2024, 3, 12)), Some(1));
        assert_eq!(calendar.week_of(date(2024, 3, 13)), Some(2));
        assert_eq!(calendar.week_of(date(2024, 3, 16)), None);
        assert!(calendar.week_dates(3).is_empty());
    }

    #[test]
    fn test_months_touched() {
        let range = DateRange::new(date(2024, 1, 30), date(2024, 3, 1)).unwrap();
        assert_eq!(range.months(), vec!["2024-01", "2024-02", "2024-03"]);
    }
}
