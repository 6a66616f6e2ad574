use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Substrings that mark a shift as a night shift. Matched case-insensitively.
pub const NIGHT_SHIFT_MARKERS: &[&str] = &["night", "大夜"];

/// A recurring shift slot of a ward, e.g. "Day 08:00-16:00".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftType {
    pub shift_id: String,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub ward: String,
    /// Headcount used for any weekday without an explicit requirement.
    pub required_count: u32,
    /// Required headcount per weekday, Monday first.
    pub daily_requirements: [u32; 7],
}

impl ShiftType {
    pub fn new(
        shift_id: impl Into<String>,
        name: impl Into<String>,
        start_time: NaiveTime,
        end_time: NaiveTime,
        ward: impl Into<String>,
        required_count: u32,
    ) -> Self {
        Self {
            shift_id: shift_id.into(),
            name: name.into(),
            start_time,
            end_time,
            ward: ward.into(),
            required_count,
            daily_requirements: [required_count; 7],
        }
    }

    /// Overrides the headcount for one weekday.
    pub fn with_requirement(mut self, weekday: Weekday, count: u32) -> Self {
        self.daily_requirements[weekday.num_days_from_monday() as usize] = count;
        self
    }

    pub fn is_night(&self) -> bool {
        let name = self.name.to_lowercase();
        NIGHT_SHIFT_MARKERS
            .iter()
            .any(|marker| name.contains(&marker.to_lowercase()))
    }

    pub fn required_on(&self, weekday: Weekday) -> u32 {
        self.daily_requirements[weekday.num_days_from_monday() as usize]
    }

    pub fn required_on_date(&self, date: NaiveDate) -> u32 {
        self.required_on(date.weekday())
    }

    /// Absolute start and end of this shift when worked on `date`.
    /// A window whose end is not after its start runs past midnight.
    pub fn window_on(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let start = date.and_time(self.start_time);
        let mut end = date.and_time(self.end_time);
        if end <= start {
            end += Duration::days(1);
        }
        (start, end)
    }
}
