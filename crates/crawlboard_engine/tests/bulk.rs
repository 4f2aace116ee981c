mod support;

use std::sync::Arc;
use std::time::Duration;

use crawlboard_core::{MutationKind, RecordId, Status};
use crawlboard_engine::{bulk_delete, bulk_reanalyze, CrawlApi, EngineEvent, EventSink};
use pretty_assertions::assert_eq;
use support::{record, FakeApi, TestSink};

const DELAY: Duration = Duration::from_millis(50);

fn ids(raw: &[&str]) -> Vec<RecordId> {
    raw.iter().map(|id| RecordId::from(*id)).collect()
}

#[tokio::test(start_paused = true)]
async fn deletes_run_one_at_a_time_with_a_gap() {
    let api = FakeApi::with_latency(
        vec![
            record("1", Status::Done),
            record("2", Status::Done),
            record("3", Status::Done),
        ],
        Duration::from_millis(10),
    );
    let sink = TestSink::new();
    let began = tokio::time::Instant::now();

    let report = bulk_delete(&api, ids(&["1", "2", "3"]), DELAY, &sink).await;

    assert_eq!(report.attempted, 3);
    assert_eq!(report.deleted, ids(&["1", "2", "3"]));
    assert!(report.failed.is_empty());
    assert_eq!(api.max_in_flight(), 1);

    let calls = api.calls_of("delete");
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].started, began, "no delay before the first call");
    for pair in calls.windows(2) {
        assert!(pair[1].started - pair[0].finished >= DELAY);
    }
    let order: Vec<_> = calls.iter().filter_map(|call| call.id.clone()).collect();
    assert_eq!(order, ids(&["1", "2", "3"]));

    let events = sink.take();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0], EngineEvent::Deleted(RecordId::from("1")));
    assert_eq!(events[3], EngineEvent::BulkDeleteFinished(report));
}

#[tokio::test(start_paused = true)]
async fn failed_delete_is_skipped_and_reported() {
    let api = FakeApi::new(vec![
        record("1", Status::Done),
        record("2", Status::Done),
        record("3", Status::Done),
    ]);
    api.fail_for("2");
    let sink = TestSink::new();

    let report = bulk_delete(&api, ids(&["1", "2", "3"]), DELAY, &sink).await;

    assert_eq!(api.calls_of("delete").len(), 3);
    assert_eq!(report.deleted, ids(&["1", "3"]));
    assert_eq!(report.failed_ids(), ids(&["2"]));

    let events = sink.take();
    assert_eq!(
        events[..2],
        [
            EngineEvent::Deleted(RecordId::from("1")),
            EngineEvent::Deleted(RecordId::from("3")),
        ]
    );
    assert!(matches!(&events[2], EngineEvent::BulkDeleteFinished(r) if r.attempted == 3));

    let remaining: Vec<_> = api
        .list_records()
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(remaining, ids(&["2"]));
}

#[tokio::test(start_paused = true)]
async fn empty_bulk_delete_still_reports() {
    let api = FakeApi::new(Vec::new());
    let sink = TestSink::new();

    let report = bulk_delete(&api, Vec::new(), DELAY, &sink).await;

    assert_eq!(report.attempted, 0);
    assert!(api.calls().is_empty());
    assert_eq!(sink.take(), vec![EngineEvent::BulkDeleteFinished(report)]);
}

#[tokio::test(start_paused = true)]
async fn reanalyze_fires_all_calls_concurrently() {
    let api = Arc::new(FakeApi::with_latency(
        vec![
            record("1", Status::Done),
            record("2", Status::Error),
            record("3", Status::Stopped),
        ],
        Duration::from_millis(100),
    ));
    let sink = Arc::new(TestSink::new());

    let api_dyn: Arc<dyn CrawlApi> = api.clone();
    let sink_dyn: Arc<dyn EventSink> = sink.clone();
    let handles = bulk_reanalyze(api_dyn, ids(&["1", "2", "3"]), sink_dyn);
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(api.calls_of("reanalyze").len(), 3);
    assert_eq!(api.max_in_flight(), 3);

    let mut started: Vec<_> = sink
        .take()
        .into_iter()
        .map(|event| match event {
            EngineEvent::Mutated {
                kind: MutationKind::Start,
                record,
            } => record.id,
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    started.sort();
    assert_eq!(started, ids(&["1", "2", "3"]));
}
