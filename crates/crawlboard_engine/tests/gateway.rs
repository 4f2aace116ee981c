mod support;

use crawlboard_core::{MutationKind, RecordId, Status};
use crawlboard_engine::{run_mutation, EngineEvent, FailureKind, Mutation};
use support::{record, FakeApi, TestSink};

#[tokio::test]
async fn create_reports_the_new_record() {
    let api = FakeApi::new(Vec::new());
    let sink = TestSink::new();

    run_mutation(
        &api,
        Mutation::Create {
            url: "https://new.example".to_string(),
        },
        &sink,
    )
    .await;

    match sink.take().as_slice() {
        [EngineEvent::Mutated {
            kind: MutationKind::Create,
            record,
        }] => {
            assert_eq!(record.url, "https://new.example");
            assert_eq!(record.status, Status::Queued);
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[tokio::test]
async fn stop_returns_updated_record() {
    let api = FakeApi::new(vec![record("4", Status::Running)]);
    let sink = TestSink::new();

    run_mutation(&api, Mutation::Stop { id: RecordId::from("4") }, &sink).await;

    assert!(matches!(
        sink.take().as_slice(),
        [EngineEvent::Mutated { kind: MutationKind::Stop, record }] if record.status == Status::Stopped
    ));
}

#[tokio::test]
async fn delete_reports_the_removed_id() {
    let api = FakeApi::new(vec![record("4", Status::Done)]);
    let sink = TestSink::new();

    run_mutation(&api, Mutation::Delete { id: RecordId::from("4") }, &sink).await;

    assert_eq!(sink.take(), vec![EngineEvent::Deleted(RecordId::from("4"))]);
}

#[tokio::test]
async fn rejected_mutation_carries_id_and_error() {
    let api = FakeApi::new(Vec::new());
    let sink = TestSink::new();

    run_mutation(&api, Mutation::Start { id: RecordId::from("missing") }, &sink).await;

    match sink.take().as_slice() {
        [EngineEvent::MutationFailed { kind, id, error }] => {
            assert_eq!(*kind, MutationKind::Start);
            assert_eq!(id.as_ref(), Some(&RecordId::from("missing")));
            assert_eq!(error.kind, FailureKind::HttpStatus(404));
        }
        other => panic!("unexpected events {other:?}"),
    }
}
