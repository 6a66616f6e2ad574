use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRecord {
    pub id: Uuid,
    pub staff_id: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub approved: bool,
    pub operator_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum LeaveType {
        Personal => "personal",
        Sick => "sick",
        Annual => "annual",
        Marriage => "marriage",
        Bereavement => "bereavement",
        Maternity => "maternity",
        Paternity => "paternity",
        Other => "other",
    }
}

impl LeaveRecord {
    pub fn new(
        staff_id: &str,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        approved: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            staff_id: staff_id.to_string(),
            leave_type,
            start_date,
            end_date,
            reason: None,
            approved,
            operator_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when an approved leave includes `date`.
    pub fn blocks(&self, date: NaiveDate) -> bool {
        self.approved && self.start_date <= date && date <= self.end_date
    }
}
