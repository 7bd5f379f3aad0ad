// SQLite CheckRepository Implementation

use crate::error::{corrupt_row, map_sqlx_error};
use crate::filter::{push_check_filter, push_page, select};
use async_trait::async_trait;
use playdeck_core::domain::{CheckId, CheckStatus, HostResults, InventoryCheck, InventoryId};
use playdeck_core::error::{AppError, Result};
use playdeck_core::port::{CheckFilter, CheckRepository};
use sqlx::SqlitePool;

const CHECK_COLUMNS: &str = "id, inventory_id, status, results, error, started_at, completed_at";

pub struct SqliteCheckRepository {
    pool: SqlitePool,
}

impl SqliteCheckRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckRepository for SqliteCheckRepository {
    async fn insert(&self, inventory_id: InventoryId, started_at: i64) -> Result<InventoryCheck> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO inventory_checks (inventory_id, status, started_at)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(inventory_id)
        .bind(CheckStatus::Pending.to_string())
        .bind(started_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(InventoryCheck::pending(id, inventory_id, started_at))
    }

    async fn find_by_id(&self, id: CheckId) -> Result<Option<InventoryCheck>> {
        let row = sqlx::query_as::<_, CheckRow>(&format!(
            "SELECT {} FROM inventory_checks WHERE id = ?",
            CHECK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(CheckRow::into_check).transpose()
    }

    async fn update(&self, check: &InventoryCheck) -> Result<()> {
        let results = serde_json::to_string(&check.results)?;

        let result = sqlx::query(
            r#"
            UPDATE inventory_checks
            SET status = ?, results = ?, error = ?, completed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(check.status.to_string())
        .bind(&results)
        .bind(&check.error)
        .bind(check.completed_at)
        .bind(check.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Check {} not found", check.id)));
        }
        Ok(())
    }

    async fn count(&self, filter: &CheckFilter) -> Result<i64> {
        let mut qb = select("COUNT(*)", "inventory_checks");
        push_check_filter(&mut qb, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list(
        &self,
        filter: &CheckFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InventoryCheck>> {
        let mut qb = select(CHECK_COLUMNS, "inventory_checks");
        push_check_filter(&mut qb, filter);
        push_page(&mut qb, "started_at", limit, offset);

        let rows = qb
            .build_query_as::<CheckRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(CheckRow::into_check).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CheckRow {
    id: i64,
    inventory_id: i64,
    status: String,
    results: String,
    error: String,
    started_at: i64,
    completed_at: Option<i64>,
}

impl CheckRow {
    fn into_check(self) -> Result<InventoryCheck> {
        let status: CheckStatus = self
            .status
            .parse()
            .map_err(|e| corrupt_row("inventory_checks", self.id, e))?;
        let results: HostResults = serde_json::from_str(&self.results)
            .map_err(|e| corrupt_row("inventory_checks", self.id, e))?;

        Ok(InventoryCheck {
            id: self.id,
            inventory_id: self.inventory_id,
            status,
            results,
            error: self.error,
            started_at: self.started_at,
            completed_at: self.completed_at,
        })
    }
}
