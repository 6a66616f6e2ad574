use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::ScheduleError;

/// Hard and soft rules applied by one generation run.
///
/// Weekday numbers follow ISO numbering: 1 = Monday ... 7 = Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintConfig {
    pub max_per_day: u32,
    pub max_consecutive: u32,
    pub min_per_month: u32,
    pub max_per_month: u32,
    pub max_night_consecutive: u32,
    pub max_night_per_month: u32,
    pub auto_fill_missing: bool,
    pub fair_distribution: bool,
    pub apply_preferences: bool,
    pub is_flexible_workweek: bool,
    pub require_holiday: bool,
    pub require_rest_day: bool,
    pub holiday_day: u8,
    pub on_call_day: u8,
    pub week_shift_consistency: bool,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            max_per_day: 1,
            max_consecutive: 5,
            min_per_month: 22,
            max_per_month: 30,
            max_night_consecutive: 2,
            max_night_per_month: 8,
            auto_fill_missing: true,
            fair_distribution: true,
            apply_preferences: true,
            is_flexible_workweek: true,
            require_holiday: true,
            require_rest_day: true,
            holiday_day: 7,
            on_call_day: 7,
            week_shift_consistency: true,
        }
    }
}

/// Weekly hour cap under the flexible-workweek rule.
pub const FLEXIBLE_WEEK_HOURS: u32 = 40;

impl ConstraintConfig {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if weekday_from_number(self.holiday_day).is_none() {
            return Err(ScheduleError::InvalidConfig(format!(
                "holiday_day must be 1-7, got {}",
                self.holiday_day
            )));
        }
        if weekday_from_number(self.on_call_day).is_none() {
            return Err(ScheduleError::InvalidConfig(format!(
                "on_call_day must be 1-7, got {}",
                self.on_call_day
            )));
        }
        if self.max_per_day == 0 {
            return Err(ScheduleError::InvalidConfig(
                "max_per_day must be at least 1".to_string(),
            ));
        }
        if self.min_per_month > self.max_per_month {
            return Err(ScheduleError::InvalidConfig(format!(
                "min_per_month ({}) exceeds max_per_month ({})",
                self.min_per_month, self.max_per_month
            )));
        }
        Ok(())
    }

    /// Copy with holiday, rest-day and week-consistency rules forced on.
    pub fn hardened(&self) -> Self {
        Self {
            require_holiday: true,
            require_rest_day: true,
            week_shift_consistency: true,
            ..self.clone()
        }
    }

    /// Falls back to Sunday if the configured number is out of range.
    pub fn holiday_weekday(&self) -> Weekday {
        weekday_from_number(self.holiday_day).unwrap_or(Weekday::Sun)
    }

    pub fn on_call_weekday(&self) -> Weekday {
        weekday_from_number(self.on_call_day).unwrap_or(Weekday::Sun)
    }
}

pub fn weekday_from_number(day: u8) -> Option<Weekday> {
    match day {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}
