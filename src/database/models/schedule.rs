use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted roster entry. `staff_id` is `None` for a vacancy placeholder.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub shift_id: String,
    pub staff_id: Option<String>,
    pub work_hours: i32,
    pub is_auto: bool,
    pub operator_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A roster entry produced by the generator, before it is stamped and stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInput {
    pub date: NaiveDate,
    pub shift_id: String,
    pub staff_id: Option<String>,
    pub work_hours: u32,
    pub is_auto: bool,
}

impl AssignmentInput {
    pub fn staffed(date: NaiveDate, shift_id: &str, staff_id: &str, work_hours: u32) -> Self {
        Self {
            date,
            shift_id: shift_id.to_string(),
            staff_id: Some(staff_id.to_string()),
            work_hours,
            is_auto: true,
        }
    }

    pub fn vacancy(date: NaiveDate, shift_id: &str, work_hours: u32) -> Self {
        Self {
            date,
            shift_id: shift_id.to_string(),
            staff_id: None,
            work_hours,
            is_auto: true,
        }
    }

    pub fn is_vacancy(&self) -> bool {
        self.staff_id.is_none()
    }

    pub fn is_for(&self, staff_id: &str) -> bool {
        self.staff_id.as_deref() == Some(staff_id)
    }
}

impl From<Assignment> for AssignmentInput {
    fn from(assignment: Assignment) -> Self {
        Self {
            date: assignment.date,
            shift_id: assignment.shift_id,
            staff_id: assignment.staff_id,
            work_hours: assignment.work_hours.max(0) as u32,
            is_auto: assignment.is_auto,
        }
    }
}
