use std::sync::mpsc;
use std::thread;

use crawlboard_core::{Effect, Msg};
use crawlboard_engine::{EngineError, EngineEvent, EngineEvents, EngineHandle, EngineSettings, Mutation};
use engine_logging::{engine_debug, engine_info};

use super::app::Input;

/// Executes core effects on the engine and feeds engine results back as
/// messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn start(settings: EngineSettings, input_tx: mpsc::Sender<Input>) -> Result<Self, EngineError> {
        engine_info!("Connecting to {}", settings.api.base_url);
        let (engine, events) = EngineHandle::start(settings)?;
        spawn_event_forwarder(events, input_tx);
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            engine_debug!("Effect {:?}", effect);
            match effect {
                Effect::CreateRecord { url } => self.engine.mutate(Mutation::Create { url }),
                Effect::StartRecord { id } => self.engine.mutate(Mutation::Start { id }),
                Effect::StopRecord { id } => self.engine.mutate(Mutation::Stop { id }),
                Effect::DeleteRecord { id } => self.engine.mutate(Mutation::Delete { id }),
                Effect::BulkDelete { ids } => self.engine.bulk_delete(ids),
                Effect::BulkReanalyze { ids } => self.engine.bulk_reanalyze(ids),
                Effect::WatchRecord { id } => self.engine.watch(id),
                Effect::LoadDetails { id } => self.engine.load_details(id),
            }
        }
    }

    pub fn shutdown(&mut self) {
        self.engine.shutdown();
    }
}

fn spawn_event_forwarder(events: EngineEvents, input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if input_tx.send(Input::Engine(event_to_msg(event))).is_err() {
                break;
            }
        }
    });
}

pub fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::RecordsFetched(records) => Msg::RecordsFetched(records),
        EngineEvent::RecordObserved(record) => Msg::RecordObserved(record),
        EngineEvent::Mutated { kind, record } => Msg::MutationSucceeded { kind, record },
        EngineEvent::Deleted(id) => Msg::RecordDeleted(id),
        EngineEvent::MutationFailed { kind, id, error } => Msg::MutationFailed {
            kind,
            id,
            reason: error.reason(),
        },
        EngineEvent::BulkDeleteFinished(report) => Msg::BulkDeleteFinished {
            attempted: report.attempted,
            failed: report.failed_ids(),
        },
        EngineEvent::DetailsLoaded(record) => Msg::DetailsLoaded(record),
        EngineEvent::DetailsFailed { id, error } => Msg::DetailsFailed {
            id,
            reason: error.reason(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crawlboard_core::{MutationKind, RecordId};
    use crawlboard_engine::{ApiError, BulkDeleteReport, FailureKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn failures_carry_readable_reasons() {
        let msg = event_to_msg(EngineEvent::MutationFailed {
            kind: MutationKind::Stop,
            id: Some(RecordId::from("4")),
            error: ApiError::new(FailureKind::HttpStatus(409), "not running"),
        });
        assert_eq!(
            msg,
            Msg::MutationFailed {
                kind: MutationKind::Stop,
                id: Some(RecordId::from("4")),
                reason: "not running (HTTP 409)".to_string(),
            }
        );
    }

    #[test]
    fn bulk_report_becomes_failed_id_list() {
        let report = BulkDeleteReport {
            attempted: 3,
            deleted: vec![RecordId::from("1"), RecordId::from("3")],
            failed: vec![(
                RecordId::from("2"),
                ApiError::new(FailureKind::Timeout, "slow"),
            )],
        };
        assert_eq!(
            event_to_msg(EngineEvent::BulkDeleteFinished(report)),
            Msg::BulkDeleteFinished {
                attempted: 3,
                failed: vec![RecordId::from("2")],
            }
        );
    }
}
