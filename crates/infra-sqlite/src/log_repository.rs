// SQLite LogRepository Implementation
// Rows are only ever inserted (and removed by retention), never updated.

use crate::error::map_sqlx_error;
use crate::filter::{push_log_filter, push_page, select};
use async_trait::async_trait;
use playdeck_core::domain::{ExecutionLog, LogId, NewExecutionLog};
use playdeck_core::error::Result;
use playdeck_core::port::{LogFilter, LogRepository};
use sqlx::SqlitePool;

const LOG_COLUMNS: &str = "id, playbook, success, output, error, start_time, end_time, duration";

pub struct SqliteLogRepository {
    pool: SqlitePool,
}

impl SqliteLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogRepository for SqliteLogRepository {
    async fn insert(&self, log: &NewExecutionLog) -> Result<ExecutionLog> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO playbook_logs (
                playbook, success, output, error, start_time, end_time, duration
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&log.playbook)
        .bind(log.success)
        .bind(&log.output)
        .bind(&log.error)
        .bind(log.start_time)
        .bind(log.end_time)
        .bind(log.duration)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(ExecutionLog::from_new(id, log.clone()))
    }

    async fn find_by_id(&self, id: LogId) -> Result<Option<ExecutionLog>> {
        let row = sqlx::query_as::<_, LogRow>(&format!(
            "SELECT {} FROM playbook_logs WHERE id = ?",
            LOG_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(LogRow::into_log))
    }

    async fn count(&self, filter: &LogFilter) -> Result<i64> {
        let mut qb = select("COUNT(*)", "playbook_logs");
        push_log_filter(&mut qb, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list(
        &self,
        filter: &LogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ExecutionLog>> {
        let mut qb = select(LOG_COLUMNS, "playbook_logs");
        push_log_filter(&mut qb, filter);
        push_page(&mut qb, "start_time", limit, offset);

        let rows = qb
            .build_query_as::<LogRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(LogRow::into_log).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LogRow {
    id: i64,
    playbook: String,
    success: bool,
    output: String,
    error: String,
    start_time: i64,
    end_time: i64,
    duration: f64,
}

impl LogRow {
    fn into_log(self) -> ExecutionLog {
        ExecutionLog {
            id: self.id,
            playbook: self.playbook,
            success: self.success,
            output: self.output,
            error: self.error,
            start_time: self.start_time,
            end_time: self.end_time,
            duration: self.duration,
        }
    }
}
