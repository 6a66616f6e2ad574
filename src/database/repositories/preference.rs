use anyhow::Result;
use sqlx::PgPool;

use crate::database::models::Preference;
use crate::database::utils::sql;

#[derive(Clone)]
pub struct PreferenceRepository {
    pool: PgPool,
}

impl PreferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Preferences for any of the given `YYYY-MM` months, oldest first so a
    /// later record for the same staff and month takes precedence.
    pub async fn list_for_months(&self, months: &[String]) -> Result<Vec<Preference>> {
        let preferences = sqlx::query_as::<_, Preference>(&sql(r#"
            SELECT
                id,
                staff_id,
                month,
                preference_type,
                shift_id_1,
                shift_id_2,
                week_pattern,
                created_at
            FROM
                staff_preferences
            WHERE
                month = ANY(?)
            ORDER BY
                created_at
        "#))
        .bind(months.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(preferences)
    }
}
