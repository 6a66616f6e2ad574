use anyhow::Result;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{Assignment, AssignmentInput, WeeklyStat};
use crate::database::transaction::DatabaseTransaction;
use crate::database::utils::sql;
use crate::error::AppError;
use crate::scheduling::{DateRange, GeneratedRoster, RosterStore};

#[derive(Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_assignments(&self, range: &DateRange) -> Result<Vec<Assignment>> {
        let assignments = sqlx::query_as::<_, Assignment>(&sql(r#"
            SELECT
                id,
                date,
                shift_id,
                staff_id,
                work_hours,
                is_auto,
                operator_id,
                created_at,
                updated_at
            FROM
                assignments
            WHERE
                date >= ?
                AND date <= ?
            ORDER BY
                date,
                shift_id,
                staff_id
        "#))
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&self.pool)
        .await?;

        Ok(assignments)
    }

    pub async fn list_weekly_stats(&self, range: &DateRange) -> Result<Vec<WeeklyStat>> {
        let stats = sqlx::query_as::<_, WeeklyStat>(&sql(r#"
            SELECT
                staff_id,
                month,
                week_number,
                week_start,
                total_hours,
                holiday_count,
                rest_day_count,
                work_days
            FROM
                weekly_work_stats
            WHERE
                week_start >= ?
                AND week_start <= ?
            ORDER BY
                week_start,
                staff_id
        "#))
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }
}

impl RosterStore for ScheduleRepository {
    /// Deletes the range's assignments and weekly stats and writes the new
    /// roster in one transaction.
    async fn replace_range(&self, roster: &GeneratedRoster, operator: &str) -> Result<(), AppError> {
        let range = roster.range;
        let assignments = roster.assignments.clone();
        let weekly_stats = roster.weekly_stats.clone();
        let operator_id = operator.to_string();

        let (removed, inserted) = DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                let removed = delete_range(tx, &range).await?;
                for assignment in &assignments {
                    insert_assignment(tx, assignment, &operator_id).await?;
                }
                for stat in &weekly_stats {
                    insert_weekly_stat(tx, stat).await?;
                }
                Ok((removed, assignments.len()))
            })
        })
        .await?;

        log::info!(
            "Replaced roster for {}: {} rows removed, {} written by {}",
            range,
            removed,
            inserted,
            operator
        );
        Ok(())
    }
}

async fn delete_range(
    tx: &mut Transaction<'_, Postgres>,
    range: &DateRange,
) -> Result<u64, AppError> {
    let assignments = sqlx::query(&sql(r#"
        DELETE FROM
            assignments
        WHERE
            date >= ?
            AND date <= ?
    "#))
    .bind(range.start())
    .bind(range.end())
    .execute(&mut **tx)
    .await?;

    sqlx::query(&sql(r#"
        DELETE FROM
            weekly_work_stats
        WHERE
            week_start >= ?
            AND week_start <= ?
    "#))
    .bind(range.start())
    .bind(range.end())
    .execute(&mut **tx)
    .await?;

    Ok(assignments.rows_affected())
}

async fn insert_assignment(
    tx: &mut Transaction<'_, Postgres>,
    assignment: &AssignmentInput,
    operator: &str,
) -> Result<(), AppError> {
    let now = Utc::now();
    sqlx::query(&sql(r#"
        INSERT INTO assignments (
            id,
            date,
            shift_id,
            staff_id,
            work_hours,
            is_auto,
            operator_id,
            created_at,
            updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
    "#))
    .bind(Uuid::new_v4())
    .bind(assignment.date)
    .bind(&assignment.shift_id)
    .bind(&assignment.staff_id)
    .bind(assignment.work_hours as i32)
    .bind(assignment.is_auto)
    .bind(operator)
    .bind(now)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_weekly_stat(
    tx: &mut Transaction<'_, Postgres>,
    stat: &WeeklyStat,
) -> Result<(), AppError> {
    sqlx::query(&sql(r#"
        INSERT INTO weekly_work_stats (
            staff_id,
            month,
            week_number,
            week_start,
            total_hours,
            holiday_count,
            rest_day_count,
            work_days
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
    "#))
    .bind(&stat.staff_id)
    .bind(&stat.month)
    .bind(stat.week_number)
    .bind(stat.week_start)
    .bind(stat.total_hours)
    .bind(stat.holiday_count)
    .bind(stat.rest_day_count)
    .bind(stat.work_days)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
