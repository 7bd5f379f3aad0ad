// WHERE-clause builders for the filtered list/count queries

use playdeck_core::port::{CheckFilter, LogFilter, RunFilter, TimeRange};
use sqlx::{QueryBuilder, Sqlite};

/// Start a `SELECT <columns> FROM <table> WHERE 1=1` statement
pub(crate) fn select<'a>(columns: &str, table: &str) -> QueryBuilder<'a, Sqlite> {
    QueryBuilder::new(format!("SELECT {} FROM {} WHERE 1=1", columns, table))
}

fn push_range(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, range: &TimeRange) {
    if let Some(from) = range.from {
        qb.push(format!(" AND {} >= ", column)).push_bind(from);
    }
    if let Some(to) = range.to {
        qb.push(format!(" AND {} <= ", column)).push_bind(to);
    }
}

pub(crate) fn push_run_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &RunFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(playbook) = &filter.playbook {
        qb.push(" AND playbook = ").push_bind(playbook.clone());
    }
    push_range(qb, "start_time", &filter.range);
}

pub(crate) fn push_log_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &LogFilter) {
    if let Some(success) = filter.success {
        qb.push(" AND success = ").push_bind(success);
    }
    if let Some(playbook) = &filter.playbook {
        qb.push(" AND playbook = ").push_bind(playbook.clone());
    }
    push_range(qb, "start_time", &filter.range);
}

pub(crate) fn push_check_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &CheckFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(inventory_id) = filter.inventory_id {
        qb.push(" AND inventory_id = ").push_bind(inventory_id);
    }
    push_range(qb, "started_at", &filter.range);
}

/// Newest first, ties by id, then LIMIT/OFFSET
pub(crate) fn push_page(
    qb: &mut QueryBuilder<'_, Sqlite>,
    time_column: &str,
    limit: i64,
    offset: i64,
) {
    qb.push(format!(" ORDER BY {} DESC, id DESC LIMIT ", time_column))
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset.max(0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use playdeck_core::domain::RunStatus;

    #[test]
    fn test_run_filter_sql() {
        let filter = RunFilter {
            status: Some(RunStatus::Failed),
            playbook: Some("deploy.yml".to_string()),
            range: TimeRange {
                from: Some(1),
                to: None,
            },
        };
        let mut qb = select("COUNT(*)", "playbook_runs");
        push_run_filter(&mut qb, &filter);

        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM playbook_runs WHERE 1=1 AND status = ? AND playbook = ? AND start_time >= ?"
        );
    }

    #[test]
    fn test_empty_filter_sql() {
        let mut qb = select("*", "playbook_logs");
        push_log_filter(&mut qb, &LogFilter::default());
        push_page(&mut qb, "start_time", 20, 0);

        assert_eq!(
            qb.sql(),
            "SELECT * FROM playbook_logs WHERE 1=1 ORDER BY start_time DESC, id DESC LIMIT ? OFFSET ?"
        );
    }
}
