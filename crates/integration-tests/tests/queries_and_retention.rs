//! Paginated queries and age-based retention against SQLite

mod common;

use std::sync::Arc;

use common::{harness_with_clock, DAY, EPOCH_2024};
use playdeck_core::application::SubmitRunRequest;
use playdeck_core::domain::{NewExecutionLog, NewRun, RunStatus};
use playdeck_core::port::playbook_executor::mocks::MockExecutor;
use playdeck_core::port::time_provider::mocks::ManualClock;
use playdeck_core::port::{CheckFilter, LogFilter, RunFilter, TimeProvider, TimeRange};

fn new_run(playbook: &str, start_time: i64) -> NewRun {
    NewRun {
        playbook: playbook.to_string(),
        inventory: None,
        start_time,
        triggered_by: "test".to_string(),
        extra_vars: Default::default(),
    }
}

#[tokio::test]
async fn test_page_past_end_clamps_to_last_page() {
    let clock = Arc::new(ManualClock::new(EPOCH_2024));
    let h = harness_with_clock(MockExecutor::new_success("ok"), clock).await;

    // 25 rows with a page size of 10: three pages
    for i in 0..25 {
        h.stores
            .runs
            .insert(&new_run("deploy.yml", EPOCH_2024 + i * 1000))
            .await
            .unwrap();
    }

    let last = h.query.list_runs(&RunFilter::default(), 3).await.unwrap();
    let beyond = h.query.list_runs(&RunFilter::default(), 999).await.unwrap();
    assert_eq!(beyond.current_page, 3);
    assert_eq!(beyond.total_pages, 3);
    assert_eq!(beyond.total_count, 25);
    assert_eq!(beyond.items.len(), 5);
    let ids = |page: &playdeck_core::application::Page<playdeck_core::domain::Run>| {
        page.items.iter().map(|r| r.id).collect::<Vec<_>>()
    };
    assert_eq!(ids(&beyond), ids(&last));

    let first = h.query.list_runs(&RunFilter::default(), 0).await.unwrap();
    assert_eq!(first.current_page, 1);
    assert_eq!(first.items.len(), 10);
    // Newest first
    assert!(first.items[0].start_time > first.items[9].start_time);
}

#[tokio::test]
async fn test_empty_result_page() {
    let h = harness_with_clock(
        MockExecutor::new_success("ok"),
        Arc::new(ManualClock::new(EPOCH_2024)),
    )
    .await;

    let page = h.query.list_checks(&CheckFilter::default(), 5).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 0);
    assert_eq!(page.total_pages, 0);
    assert_eq!(page.current_page, 1);
}

#[tokio::test]
async fn test_run_filters_combine() {
    let clock = Arc::new(ManualClock::new(EPOCH_2024));
    let h = harness_with_clock(MockExecutor::new_success("ok"), clock.clone()).await;

    for playbook in ["deploy.yml", "site.yml", "deploy.yml"] {
        h.orchestrator
            .submit(SubmitRunRequest::new(playbook))
            .await
            .unwrap()
            .finished()
            .await;
        clock.advance(DAY);
    }
    h.stores
        .runs
        .insert(&new_run("deploy.yml", clock.now_millis()))
        .await
        .unwrap();

    let deploys = h
        .query
        .list_runs(
            &RunFilter {
                playbook: Some("deploy.yml".to_string()),
                ..RunFilter::default()
            },
            1,
        )
        .await
        .unwrap();
    assert_eq!(deploys.total_count, 3);

    let completed_deploys = h
        .query
        .list_runs(
            &RunFilter {
                status: Some(RunStatus::Completed),
                playbook: Some("deploy.yml".to_string()),
                range: TimeRange::default(),
            },
            1,
        )
        .await
        .unwrap();
    assert_eq!(completed_deploys.total_count, 2);

    let second_day = h
        .query
        .list_runs(
            &RunFilter {
                range: TimeRange {
                    from: Some(EPOCH_2024 + DAY),
                    to: Some(EPOCH_2024 + DAY),
                },
                ..RunFilter::default()
            },
            1,
        )
        .await
        .unwrap();
    assert_eq!(second_day.total_count, 1);
    assert_eq!(second_day.items[0].playbook, "site.yml");
}

#[tokio::test]
async fn test_retention_deletes_only_old_records() {
    let now = EPOCH_2024 + 400 * DAY;
    let clock = Arc::new(ManualClock::new(now));
    let h = harness_with_clock(MockExecutor::new_success("ok"), clock).await;

    let old = now - 31 * DAY;
    let recent = now - 29 * DAY;

    let old_run = h.stores.runs.insert(&new_run("deploy.yml", old)).await.unwrap();
    let recent_run = h
        .stores
        .runs
        .insert(&new_run("deploy.yml", recent))
        .await
        .unwrap();
    h.stores
        .logs
        .insert(&NewExecutionLog::new("deploy.yml", old, old + 1000, "old", None))
        .await
        .unwrap();
    h.stores
        .logs
        .insert(&NewExecutionLog::new("deploy.yml", recent, recent + 1000, "recent", None))
        .await
        .unwrap();
    let inventory = h.inventories.create("production", "web1").await.unwrap();
    h.stores.checks.insert(inventory.id, old).await.unwrap();
    let recent_check = h.stores.checks.insert(inventory.id, recent).await.unwrap();

    let report = h.sweeper.sweep().await;
    assert_eq!(report.cutoff, now - 30 * DAY);
    assert_eq!(report.runs_deleted, Some(1));
    assert_eq!(report.logs_deleted, Some(1));
    assert_eq!(report.checks_deleted, Some(1));

    assert!(h.stores.runs.find_by_id(old_run.id).await.unwrap().is_none());
    assert!(h.stores.runs.find_by_id(recent_run.id).await.unwrap().is_some());
    assert!(h.stores.checks.find_by_id(recent_check.id).await.unwrap().is_some());

    let logs = h.query.list_logs(&LogFilter::default(), 1).await.unwrap();
    assert_eq!(logs.total_count, 1);
    assert_eq!(logs.items[0].output, "recent");

    // Inventories are not subject to retention
    assert!(h.inventories.get("production").await.is_ok());

    // Nothing left to delete
    let again = h.sweeper.sweep().await;
    assert_eq!(again.runs_deleted, Some(0));
}
