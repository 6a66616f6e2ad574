use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A hard pre-commitment: `staff_id` works night shift `shift_id` on every
/// date of `start_date..=end_date`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NightPreallocation {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub staff_id: String,
    pub shift_id: String,
    pub created_at: DateTime<Utc>,
}

impl NightPreallocation {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, staff_id: &str, shift_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date,
            end_date,
            staff_id: staff_id.to_string(),
            shift_id: shift_id.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
