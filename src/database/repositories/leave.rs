use anyhow::Result;
use sqlx::PgPool;

use crate::database::models::LeaveRecord;
use crate::database::utils::sql;
use crate::scheduling::DateRange;

#[derive(Clone)]
pub struct LeaveRepository {
    pool: PgPool,
}

impl LeaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Approved and pending leave overlapping the range.
    pub async fn list_overlapping(&self, range: &DateRange) -> Result<Vec<LeaveRecord>> {
        let leaves = sqlx::query_as::<_, LeaveRecord>(&sql(r#"
            SELECT
                id,
                staff_id,
                leave_type,
                start_date,
                end_date,
                reason,
                approved,
                operator_id,
                created_at,
                updated_at
            FROM
                leave_records
            WHERE
                start_date <= ?
                AND end_date >= ?
            ORDER BY
                staff_id,
                start_date
        "#))
        .bind(range.end())
        .bind(range.start())
        .fetch_all(&self.pool)
        .await?;

        Ok(leaves)
    }
}
