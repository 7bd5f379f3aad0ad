// SQLite RunRepository Implementation

use crate::error::{corrupt_row, map_sqlx_error};
use crate::filter::{push_page, push_run_filter, select};
use async_trait::async_trait;
use playdeck_core::domain::{ExtraVars, NewRun, Run, RunId, RunStatus};
use playdeck_core::error::{AppError, Result};
use playdeck_core::port::{RunFilter, RunRepository};
use sqlx::SqlitePool;

const RUN_COLUMNS: &str = "id, playbook, inventory, status, start_time, end_time, duration, \
                           triggered_by, extra_vars, output, error";

pub struct SqliteRunRepository {
    pool: SqlitePool,
}

impl SqliteRunRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RunRepository for SqliteRunRepository {
    async fn insert(&self, run: &NewRun) -> Result<Run> {
        let extra_vars = serde_json::to_string(&run.extra_vars)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO playbook_runs (
                playbook, inventory, status, start_time, triggered_by, extra_vars
            ) VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&run.playbook)
        .bind(&run.inventory)
        .bind(RunStatus::Started.to_string())
        .bind(run.start_time)
        .bind(&run.triggered_by)
        .bind(&extra_vars)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(Run::from_new(id, run.clone()))
    }

    async fn find_by_id(&self, id: RunId) -> Result<Option<Run>> {
        let row = sqlx::query_as::<_, RunRow>(&format!(
            "SELECT {} FROM playbook_runs WHERE id = ?",
            RUN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(RunRow::into_run).transpose()
    }

    async fn finalize(&self, run: &Run) -> Result<()> {
        // Only a started run may be finalized; the guard makes the terminal
        // write happen at most once.
        let result = sqlx::query(
            r#"
            UPDATE playbook_runs
            SET status = ?, end_time = ?, duration = ?, output = ?, error = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(run.status.to_string())
        .bind(run.end_time)
        .bind(run.duration)
        .bind(&run.output)
        .bind(&run.error)
        .bind(run.id)
        .bind(RunStatus::Started.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidState(format!(
                "Run {} is missing or already finalized",
                run.id
            )));
        }
        Ok(())
    }

    async fn count(&self, filter: &RunFilter) -> Result<i64> {
        let mut qb = select("COUNT(*)", "playbook_runs");
        push_run_filter(&mut qb, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list(&self, filter: &RunFilter, limit: i64, offset: i64) -> Result<Vec<Run>> {
        let mut qb = select(RUN_COLUMNS, "playbook_runs");
        push_run_filter(&mut qb, filter);
        push_page(&mut qb, "start_time", limit, offset);

        let rows = qb
            .build_query_as::<RunRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(RunRow::into_run).collect()
    }
}

// Helper struct for database row mapping
#[derive(Debug, sqlx::FromRow)]
struct RunRow {
    id: i64,
    playbook: String,
    inventory: Option<String>,
    status: String,
    start_time: i64,
    end_time: Option<i64>,
    duration: Option<f64>,
    triggered_by: String,
    extra_vars: String,
    output: String,
    error: String,
}

impl RunRow {
    fn into_run(self) -> Result<Run> {
        let status: RunStatus = self
            .status
            .parse()
            .map_err(|e| corrupt_row("playbook_runs", self.id, e))?;
        let extra_vars: ExtraVars = serde_json::from_str(&self.extra_vars)
            .map_err(|e| corrupt_row("playbook_runs", self.id, e))?;

        Ok(Run {
            id: self.id,
            playbook: self.playbook,
            inventory: self.inventory,
            status,
            start_time: self.start_time,
            end_time: self.end_time,
            duration: self.duration,
            triggered_by: self.triggered_by,
            extra_vars,
            output: self.output,
            error: self.error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use playdeck_core::port::TimeRange;

    async fn setup_test_db() -> SqliteRunRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteRunRepository::new(pool)
    }

    fn new_run(playbook: &str, start_time: i64) -> NewRun {
        let mut extra_vars = ExtraVars::new();
        extra_vars.insert("version".to_string(), "1.0.0".to_string());
        NewRun {
            playbook: playbook.to_string(),
            inventory: Some("production".to_string()),
            start_time,
            triggered_by: "127.0.0.1".to_string(),
            extra_vars,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = setup_test_db().await;

        let run = repo.insert(&new_run("deploy.yml", 1_000)).await.unwrap();
        assert!(run.id > 0);
        assert_eq!(run.status, RunStatus::Started);

        let found = repo.find_by_id(run.id).await.unwrap().unwrap();
        assert_eq!(found.playbook, "deploy.yml");
        assert_eq!(found.inventory.as_deref(), Some("production"));
        assert_eq!(found.status, RunStatus::Started);
        assert_eq!(found.extra_vars.get("version").map(String::as_str), Some("1.0.0"));
        assert!(found.end_time.is_none());
        assert!(found.duration.is_none());

        assert!(repo.find_by_id(run.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_finalize_once() {
        let repo = setup_test_db().await;
        let mut run = repo.insert(&new_run("deploy.yml", 1_000)).await.unwrap();

        run.complete(3_500, "ok".to_string()).unwrap();
        repo.finalize(&run).await.unwrap();

        let found = repo.find_by_id(run.id).await.unwrap().unwrap();
        assert_eq!(found.status, RunStatus::Completed);
        assert_eq!(found.end_time, Some(3_500));
        assert_eq!(found.duration, Some(2.5));
        assert_eq!(found.output, "ok");

        // Second terminal write is rejected
        let err = repo.finalize(&run).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_list_filters_and_order() {
        let repo = setup_test_db().await;

        for (i, playbook) in ["deploy.yml", "backup.yml", "deploy.yml"].iter().enumerate() {
            repo.insert(&new_run(playbook, 1_000 * (i as i64 + 1)))
                .await
                .unwrap();
        }
        // Same start time as the last one: tie broken by id
        let tie = repo.insert(&new_run("deploy.yml", 3_000)).await.unwrap();

        let all = repo.list(&RunFilter::default(), 10, 0).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].id, tie.id);
        assert!(all.windows(2).all(|w| w[0].start_time >= w[1].start_time));

        let deploys = RunFilter {
            playbook: Some("deploy.yml".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.count(&deploys).await.unwrap(), 3);

        let ranged = RunFilter {
            range: TimeRange {
                from: Some(2_000),
                to: Some(2_000),
            },
            ..Default::default()
        };
        let found = repo.list(&ranged, 10, 0).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].playbook, "backup.yml");

        let started = RunFilter {
            status: Some(RunStatus::Completed),
            ..Default::default()
        };
        assert_eq!(repo.count(&started).await.unwrap(), 0);

        let second_page = repo.list(&RunFilter::default(), 3, 3).await.unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].start_time, 1_000);
    }
}
