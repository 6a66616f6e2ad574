use serde::{Deserialize, Serialize};

/// A member of staff that can be rostered. Owned by the staff registry,
/// read-only for the duration of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub staff_id: String,
    pub name: String,
    pub title: Option<String>,
    pub ward: String,
}

impl Staff {
    pub fn new(
        staff_id: impl Into<String>,
        name: impl Into<String>,
        title: Option<String>,
        ward: impl Into<String>,
    ) -> Self {
        Self {
            staff_id: staff_id.into(),
            name: name.into(),
            title,
            ward: ward.into(),
        }
    }
}
