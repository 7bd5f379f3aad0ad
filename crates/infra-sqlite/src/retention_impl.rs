// SQLite RetentionStore Implementation
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use playdeck_core::error::Result;
use playdeck_core::port::RetentionStore;
use sqlx::SqlitePool;
use tracing::debug;

pub struct SqliteRetention {
    pool: SqlitePool,
}

impl SqliteRetention {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn delete_before(&self, table: &str, column: &str, cutoff: i64) -> Result<u64> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE {} < ?", table, column))
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let deleted = result.rows_affected();
        debug!(table = table, cutoff = cutoff, deleted = deleted, "Expired rows deleted");
        Ok(deleted)
    }
}

#[async_trait]
impl RetentionStore for SqliteRetention {
    async fn delete_logs_before(&self, cutoff: i64) -> Result<u64> {
        self.delete_before("playbook_logs", "start_time", cutoff).await
    }

    async fn delete_runs_before(&self, cutoff: i64) -> Result<u64> {
        self.delete_before("playbook_runs", "start_time", cutoff).await
    }

    async fn delete_checks_before(&self, cutoff: i64) -> Result<u64> {
        self.delete_before("inventory_checks", "started_at", cutoff)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations, SqliteCheckRepository, SqliteLogRepository};
    use playdeck_core::domain::NewExecutionLog;
    use playdeck_core::port::{CheckFilter, CheckRepository, LogFilter, LogRepository};

    #[tokio::test]
    async fn test_cutoff_is_strict() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let logs = SqliteLogRepository::new(pool.clone());
        let checks = SqliteCheckRepository::new(pool.clone());
        let retention = SqliteRetention::new(pool);

        for start in [100, 200, 300] {
            logs.insert(&NewExecutionLog::new("a.yml", start, start + 1, "", None))
                .await
                .unwrap();
            checks.insert(1, start).await.unwrap();
        }

        assert_eq!(retention.delete_logs_before(200).await.unwrap(), 1);
        assert_eq!(retention.delete_checks_before(301).await.unwrap(), 3);
        assert_eq!(retention.delete_runs_before(1_000).await.unwrap(), 0);

        assert_eq!(logs.count(&LogFilter::default()).await.unwrap(), 2);
        assert_eq!(checks.count(&CheckFilter::default()).await.unwrap(), 0);
    }
}
