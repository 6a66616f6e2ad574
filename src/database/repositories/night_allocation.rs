use anyhow::Result;
use sqlx::PgPool;

use crate::database::models::NightPreallocation;
use crate::database::transaction::DatabaseTransaction;
use crate::database::utils::sql;
use crate::error::AppError;
use crate::scheduling::DateRange;

#[derive(Clone)]
pub struct NightAllocationRepository {
    pool: PgPool,
}

impl NightAllocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_overlapping(&self, range: &DateRange) -> Result<Vec<NightPreallocation>> {
        let allocations = sqlx::query_as::<_, NightPreallocation>(&sql(r#"
            SELECT
                id,
                start_date,
                end_date,
                staff_id,
                shift_id,
                created_at
            FROM
                night_shift_allocations
            WHERE
                start_date <= ?
                AND end_date >= ?
            ORDER BY
                start_date,
                staff_id
        "#))
        .bind(range.end())
        .bind(range.start())
        .fetch_all(&self.pool)
        .await?;

        Ok(allocations)
    }

    /// Deletes every pre-allocation overlapping `range`, whatever its shift,
    /// and inserts `allocations`, in one transaction.
    pub async fn replace_overlapping(
        &self,
        range: &DateRange,
        allocations: Vec<NightPreallocation>,
    ) -> Result<u64, AppError> {
        let range = *range;

        DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                let removed = sqlx::query(&sql(r#"
                    DELETE FROM
                        night_shift_allocations
                    WHERE
                        start_date <= ?
                        AND end_date >= ?
                "#))
                .bind(range.end())
                .bind(range.start())
                .execute(&mut **tx)
                .await?
                .rows_affected();

                for allocation in &allocations {
                    sqlx::query(&sql(r#"
                        INSERT INTO night_shift_allocations (
                            id,
                            start_date,
                            end_date,
                            staff_id,
                            shift_id,
                            created_at
                        )
                        VALUES (?, ?, ?, ?, ?, ?)
                    "#))
                    .bind(allocation.id)
                    .bind(allocation.start_date)
                    .bind(allocation.end_date)
                    .bind(&allocation.staff_id)
                    .bind(&allocation.shift_id)
                    .bind(allocation.created_at)
                    .execute(&mut **tx)
                    .await?;
                }

                log::info!(
                    "Replaced night pre-allocations for {}: {} removed, {} written",
                    range,
                    removed,
                    allocations.len()
                );
                Ok(removed)
            })
        })
        .await
    }
}
