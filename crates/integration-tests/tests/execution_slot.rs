//! At most one playbook run executes at a time; probes are not serialized

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{harness, harness_with_clock};
use playdeck_core::application::SubmitRunRequest;
use playdeck_core::domain::{CheckStatus, RunStatus};
use playdeck_core::port::playbook_executor::mocks::MockExecutor;
use playdeck_core::port::time_provider::SystemTimeProvider;
use playdeck_core::port::RunFilter;

const HOLD: Duration = Duration::from_millis(100);

#[tokio::test]
async fn test_concurrent_runs_never_overlap() {
    let h = harness(MockExecutor::new_success("ok").with_delay(HOLD)).await;

    let mut accepted = Vec::new();
    for playbook in ["deploy.yml", "site.yml", "backup.yml", "deploy.yml"] {
        accepted.push(
            h.orchestrator
                .submit(SubmitRunRequest::new(playbook))
                .await
                .unwrap(),
        );
    }

    // Every run is recorded as started before any of them finishes
    let runs = h
        .query
        .list_runs(
            &RunFilter {
                status: Some(RunStatus::Started),
                ..RunFilter::default()
            },
            1,
        )
        .await
        .unwrap();
    assert!(runs.total_count >= 3);

    for a in accepted {
        let id = a.finished().await;
        assert_eq!(h.query.get_run(id).await.unwrap().status, RunStatus::Completed);
    }

    assert_eq!(h.executor.call_count(), 4);
    assert!(!h.executor.any_overlap(), "runs must execute one at a time");
}

#[tokio::test]
async fn test_submissions_from_many_tasks() {
    let h = Arc::new(harness(MockExecutor::new_success("ok").with_delay(Duration::from_millis(20))).await);

    let mut tasks = Vec::new();
    for i in 0..8 {
        let h = Arc::clone(&h);
        tasks.push(tokio::spawn(async move {
            let req = SubmitRunRequest::new("site.yml").with_var("batch", i.to_string());
            h.orchestrator.submit(req).await.unwrap().finished().await
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let runs = h.query.list_runs(&RunFilter::default(), 1).await.unwrap();
    assert_eq!(runs.total_count, 8);
    assert!(runs.items.iter().all(|r| r.status == RunStatus::Completed));
    assert!(!h.executor.any_overlap());
}

#[tokio::test]
async fn test_probes_run_concurrently() {
    let output = "Host web1 is reachable\n";
    let h = harness_with_clock(
        MockExecutor::new_success(output).with_delay(Duration::from_millis(200)),
        Arc::new(SystemTimeProvider),
    )
    .await;
    h.inventories.create("production", "[web]\nweb1\n").await.unwrap();

    let first = h.prober.probe("production").await.unwrap();
    let second = h.prober.probe("production").await.unwrap();

    let first = first.finished().await;
    let second = second.finished().await;

    for id in [first, second] {
        let check = h.query.get_check(id).await.unwrap();
        assert_eq!(check.status, CheckStatus::Completed);
    }
    assert_eq!(h.executor.call_count(), 2);
    assert!(h.executor.any_overlap(), "probes do not wait for each other");
}

#[tokio::test]
async fn test_probe_does_not_wait_for_run() {
    let h = harness(MockExecutor::new_success("Host web1 is reachable").with_delay(Duration::from_millis(200))).await;
    h.inventories.create("production", "[web]\nweb1\n").await.unwrap();

    let run = h
        .orchestrator
        .submit(SubmitRunRequest::new("deploy.yml"))
        .await
        .unwrap();
    let check = h.prober.probe("production").await.unwrap();

    run.finished().await;
    check.finished().await;
    assert!(h.executor.any_overlap());
}
