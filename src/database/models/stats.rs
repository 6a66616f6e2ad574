use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-staff summary of one scheduling week, written once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStat {
    pub staff_id: String,
    /// Month (`YYYY-MM`) of the week's first date.
    pub month: String,
    pub week_number: i32,
    pub week_start: NaiveDate,
    pub total_hours: i32,
    pub holiday_count: i32,
    pub rest_day_count: i32,
    pub work_days: i32,
}

/// A staff member who ended a month below the configured minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyShortfall {
    pub staff_id: String,
    pub month: String,
    pub assigned: u32,
    pub minimum: u32,
}
