use anyhow::Result;
use sqlx::PgPool;

use crate::database::models::Staff;
use crate::database::utils::sql;

#[derive(Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All staff in roster order (by id).
    pub async fn list_staff(&self) -> Result<Vec<Staff>> {
        let staff = sqlx::query_as::<_, Staff>(&sql(r#"
            SELECT
                staff_id,
                name,
                title,
                ward
            FROM
                staff
            ORDER BY
                staff_id
        "#))
        .fetch_all(&self.pool)
        .await?;

        Ok(staff)
    }
}
