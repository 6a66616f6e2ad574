use chrono::{NaiveTime, Weekday};

use crate::scheduling::constraints::weekday_from_number;

use super::models::ShiftType;

// Database row types that match the exact Postgres schema
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShiftRow {
    pub shift_id: String,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub ward: String,
    pub required_count: i32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RequirementRow {
    pub shift_id: String,
    /// 1 = Monday ... 7 = Sunday.
    pub weekday: i16,
    pub required_count: i32,
}

impl ShiftRow {
    /// Weekdays without a requirement row keep `required_count`.
    pub fn into_shift(self, requirements: &[RequirementRow]) -> ShiftType {
        let default_count = self.required_count.max(0) as u32;
        let mut shift = ShiftType::new(
            self.shift_id,
            self.name,
            self.start_time,
            self.end_time,
            self.ward,
            default_count,
        );

        let shift_id = shift.shift_id.clone();
        for row in requirements.iter().filter(|r| r.shift_id == shift_id) {
            match weekday_of(row.weekday) {
                Some(weekday) => {
                    shift = shift.with_requirement(weekday, row.required_count.max(0) as u32);
                }
                None => log::warn!(
                    "Ignoring requirement for shift {} with weekday {}",
                    row.shift_id,
                    row.weekday
                ),
            }
        }
        shift
    }
}

fn weekday_of(value: i16) -> Option<Weekday> {
    u8::try_from(value).ok().and_then(weekday_from_number)
}
