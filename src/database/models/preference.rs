use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

/// A staff member's shift preference for one month (`YYYY-MM`).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    pub id: Uuid,
    pub staff_id: String,
    pub month: String,
    pub preference_type: PreferenceType,
    pub shift_id_1: String,
    pub shift_id_2: Option<String>,
    pub week_pattern: Option<WeekPattern>,
    pub created_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum PreferenceType {
        Single => "single",
        Dual => "dual",
    }
}

string_enum! {
    /// How a dual preference alternates between its two shifts.
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum WeekPattern {
        /// Shift 1 on odd scheduling weeks, shift 2 on even ones.
        Alternate => "alternate",
        /// Whichever of the two shifts has been worked less so far.
        Consecutive => "consecutive",
    }
}

impl Preference {
    pub fn single(staff_id: &str, month: &str, shift_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id: staff_id.to_string(),
            month: month.to_string(),
            preference_type: PreferenceType::Single,
            shift_id_1: shift_id.to_string(),
            shift_id_2: None,
            week_pattern: None,
            created_at: Utc::now(),
        }
    }

    pub fn dual(
        staff_id: &str,
        month: &str,
        primary: &str,
        secondary: &str,
        pattern: WeekPattern,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id: staff_id.to_string(),
            month: month.to_string(),
            preference_type: PreferenceType::Dual,
            shift_id_1: primary.to_string(),
            shift_id_2: Some(secondary.to_string()),
            week_pattern: Some(pattern),
            created_at: Utc::now(),
        }
    }
}
