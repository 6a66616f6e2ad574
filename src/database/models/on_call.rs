use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OnCallAssignment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub staff_id: String,
    pub status: OnCallStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnCallInput {
    pub date: NaiveDate,
    pub staff_id: String,
    pub status: OnCallStatus,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum OnCallStatus {
        OnCall => "oncall",
        Backup => "backup",
        Off => "off",
    }
}

impl OnCallAssignment {
    pub fn new(date: NaiveDate, staff_id: &str, status: OnCallStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            staff_id: staff_id.to_string(),
            status,
            created_at: Utc::now(),
        }
    }
}
