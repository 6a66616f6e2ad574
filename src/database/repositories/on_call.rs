use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{OnCallAssignment, OnCallInput};
use crate::database::transaction::DatabaseTransaction;
use crate::database::utils::sql;
use crate::error::AppError;
use crate::scheduling::DateRange;

#[derive(Clone)]
pub struct OnCallRepository {
    pool: PgPool,
}

impl OnCallRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_in_range(&self, range: &DateRange) -> Result<Vec<OnCallAssignment>> {
        let entries = sqlx::query_as::<_, OnCallAssignment>(&sql(r#"
            SELECT
                id,
                date,
                staff_id,
                status,
                created_at
            FROM
                on_call_assignments
            WHERE
                date >= ?
                AND date <= ?
            ORDER BY
                date,
                staff_id
        "#))
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Inserts all entries or none.
    pub async fn insert_many(&self, entries: Vec<OnCallInput>) -> Result<Vec<OnCallAssignment>, AppError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                let mut created = Vec::with_capacity(entries.len());
                for entry in &entries {
                    let row = sqlx::query_as::<_, OnCallAssignment>(&sql(r#"
                        INSERT INTO on_call_assignments (
                            id,
                            date,
                            staff_id,
                            status,
                            created_at
                        )
                        VALUES (?, ?, ?, ?, ?)
                        RETURNING
                            id,
                            date,
                            staff_id,
                            status,
                            created_at
                    "#))
                    .bind(Uuid::new_v4())
                    .bind(entry.date)
                    .bind(&entry.staff_id)
                    .bind(entry.status)
                    .bind(Utc::now())
                    .fetch_one(&mut **tx)
                    .await?;
                    created.push(row);
                }
                Ok(created)
            })
        })
        .await
    }
}
