mod support;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crawlboard_core::{RecordId, Status};
use crawlboard_engine::{
    ApiSettings, EngineEvent, EngineEvents, EngineHandle, EngineSettings, Mutation,
};
use support::{record, FakeApi};

const WAIT: Duration = Duration::from_secs(5);

fn settings() -> EngineSettings {
    EngineSettings {
        api: ApiSettings::default(),
        poll_interval: Duration::from_millis(20),
        bulk_delete_delay: Duration::ZERO,
    }
}

fn wait_for(events: &EngineEvents, mut wanted: impl FnMut(&EngineEvent) -> bool) -> EngineEvent {
    let deadline = Instant::now() + WAIT;
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match events.recv_timeout(remaining) {
            Some(event) if wanted(&event) => return event,
            Some(_) => continue,
            None => break,
        }
    }
    panic!("expected event did not arrive");
}

#[test]
fn engine_polls_and_dispatches_commands() {
    let api = Arc::new(FakeApi::new(vec![
        record("1", Status::Done),
        record("2", Status::Done),
    ]));
    let (mut engine, events) = EngineHandle::start_with_api(settings(), api.clone()).unwrap();

    let first = events.recv_timeout(WAIT).expect("poll result");
    assert!(matches!(first, EngineEvent::RecordsFetched(ref records) if records.len() == 2));

    engine.load_details(RecordId::from("2"));
    let details = wait_for(&events, |event| matches!(event, EngineEvent::DetailsLoaded(_)));
    assert!(matches!(details, EngineEvent::DetailsLoaded(record) if record.id == RecordId::from("2")));

    engine.mutate(Mutation::Delete {
        id: RecordId::from("1"),
    });
    wait_for(&events, |event| {
        *event == EngineEvent::Deleted(RecordId::from("1"))
    });
    wait_for(&events, |event| {
        matches!(event, EngineEvent::RecordsFetched(records) if records.len() == 1)
    });

    engine.shutdown();
}

#[test]
fn bulk_delete_reports_through_the_handle() {
    let api = Arc::new(FakeApi::new(vec![
        record("1", Status::Done),
        record("2", Status::Done),
    ]));
    let (engine, events) = EngineHandle::start_with_api(settings(), api.clone()).unwrap();

    engine.bulk_delete(vec![RecordId::from("1"), RecordId::from("2")]);
    let finished = wait_for(&events, |event| {
        matches!(event, EngineEvent::BulkDeleteFinished(_))
    });
    match finished {
        EngineEvent::BulkDeleteFinished(report) => {
            assert_eq!(report.attempted, 2);
            assert!(report.failed.is_empty());
        }
        _ => unreachable!(),
    }
    drop(engine);
}

#[test]
fn repeated_watch_for_one_id_polls_once_per_period() {
    let api = Arc::new(FakeApi::new(vec![record("1", Status::Running)]));
    let settings = EngineSettings {
        poll_interval: Duration::from_millis(500),
        ..settings()
    };
    let (mut engine, events) = EngineHandle::start_with_api(settings, api.clone()).unwrap();
    events.recv_timeout(WAIT).expect("poll result");

    engine.watch(RecordId::from("1"));
    engine.watch(RecordId::from("1"));
    std::thread::sleep(Duration::from_millis(750));
    engine.shutdown();

    // Main poller at 0 ms and 500 ms, a single watcher at about 500 ms.
    assert_eq!(api.calls_of("list").len(), 3);
    let observed = std::iter::from_fn(|| events.recv())
        .filter(|event| matches!(event, EngineEvent::RecordObserved(_)))
        .count();
    assert_eq!(observed, 1);
}

#[test]
fn shutdown_closes_the_event_stream() {
    let api = Arc::new(FakeApi::new(vec![record("1", Status::Running)]));
    let (mut engine, events) = EngineHandle::start_with_api(settings(), api).unwrap();
    engine.watch(RecordId::from("1"));
    events.recv_timeout(WAIT).expect("poll result");

    engine.shutdown();
    engine.shutdown();

    let deadline = Instant::now() + WAIT;
    while events.recv().is_some() {
        assert!(Instant::now() < deadline, "events kept arriving after shutdown");
    }
}
