//! Behavior of the status feed as a whole: scripted client, keyed
//! collapse, ordering, and the capacity bound.

mod common;

use std::time::Duration;

use common::bank_run_events;
use lendpipe::stream::{StatusEvent, StatusLog, StatusStreamClient, StepStatus};
use lendpipe::ServiceConfig;

async fn wait_drained(client: &StatusStreamClient) {
    for _ in 0..100 {
        if !client.is_open() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("feed did not drain");
}

#[tokio::test]
async fn test_scripted_run_collapses_repeated_steps() {
    let client = StatusStreamClient::scripted(bank_run_events(), &ServiceConfig::default());
    client.open().await.unwrap();
    wait_drained(&client).await;

    let entries = client.snapshot();
    // 10 events over 7 distinct steps.
    assert_eq!(entries.len(), 7);

    // Newest step first.
    assert_eq!(entries[0].step, "complete");
    assert!(entries[0].status.is_success());

    // Collapsed steps carry the later event.
    let nsf = entries.iter().find(|e| e.step == "nsf").unwrap();
    assert_eq!(nsf.status, StepStatus::Complete);
    assert_eq!(nsf.details, "NSF analysis complete");

    let llm = entries.iter().find(|e| e.step == "llm_setup").unwrap();
    assert_eq!(llm.details, "LLM initialized successfully");
}

#[tokio::test]
async fn test_scripted_feed_subscription_sees_arrival_order() {
    let client = StatusStreamClient::scripted(bank_run_events(), &ServiceConfig::default());
    let mut rx = client.subscribe();
    client.open().await.unwrap();

    let mut steps = Vec::new();
    for _ in 0..bank_run_events().len() {
        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        steps.push(event.step);
    }
    assert_eq!(steps.first().map(String::as_str), Some("start"));
    assert_eq!(steps.last().map(String::as_str), Some("complete"));
}

#[test]
fn test_log_bound_holds_under_churn() {
    let mut log = StatusLog::new(50);

    for i in 0..200 {
        log.apply(StatusEvent::new(
            &format!("step_{i}"),
            StepStatus::Processing,
            "",
        ));
        // Interleave updates to an old surviving step; they must not grow
        // the log or disturb the bound.
        if i >= 10 {
            log.apply(StatusEvent::new(
                &format!("step_{}", i - 5),
                StepStatus::Complete,
                "done",
            ));
        }
        assert!(log.len() <= 50, "log exceeded capacity at event {i}");
    }

    assert_eq!(log.len(), 50);
    // The newest key survives, the earliest ones were evicted.
    assert!(log.get("step_199").is_some());
    assert!(log.get("step_0").is_none());
}

#[test]
fn test_latest_entry_is_current_status_headline() {
    let mut log = StatusLog::new(50);
    for event in bank_run_events() {
        log.apply(event);
    }
    let latest = log.latest().unwrap();
    assert_eq!(latest.step, "complete");
    assert_eq!(latest.details, "All analyses complete");
}
