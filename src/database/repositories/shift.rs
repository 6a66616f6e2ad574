use anyhow::Result;
use sqlx::PgPool;

use crate::database::models::ShiftType;
use crate::database::types::{RequirementRow, ShiftRow};
use crate::database::utils::sql;

#[derive(Clone)]
pub struct ShiftRepository {
    pool: PgPool,
}

impl ShiftRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The shift catalog in display order, with per-weekday headcounts resolved.
    pub async fn list_shift_types(&self) -> Result<Vec<ShiftType>> {
        let rows = sqlx::query_as::<_, ShiftRow>(&sql(r#"
            SELECT
                shift_id,
                name,
                start_time,
                end_time,
                ward,
                required_count
            FROM
                shift_types
            ORDER BY
                sort_order,
                shift_id
        "#))
        .fetch_all(&self.pool)
        .await?;

        let requirements = sqlx::query_as::<_, RequirementRow>(&sql(r#"
            SELECT
                shift_id,
                weekday,
                required_count
            FROM
                shift_daily_requirements
        "#))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_shift(&requirements))
            .collect())
    }
}
