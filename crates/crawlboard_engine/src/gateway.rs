use crawlboard_core::{MutationKind, RecordId};
use engine_logging::{engine_info, engine_warn};

use crate::{CrawlApi, EngineEvent, EventSink};

/// One single-record call against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create { url: String },
    Start { id: RecordId },
    Stop { id: RecordId },
    Delete { id: RecordId },
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Create { .. } => MutationKind::Create,
            Mutation::Start { .. } => MutationKind::Start,
            Mutation::Stop { .. } => MutationKind::Stop,
            Mutation::Delete { .. } => MutationKind::Delete,
        }
    }

    pub fn id(&self) -> Option<&RecordId> {
        match self {
            Mutation::Create { .. } => None,
            Mutation::Start { id } | Mutation::Stop { id } | Mutation::Delete { id } => Some(id),
        }
    }
}

/// Issue `mutation` and report the outcome to `sink`.
pub async fn run_mutation(api: &dyn CrawlApi, mutation: Mutation, sink: &dyn EventSink) {
    let kind = mutation.kind();
    let id = mutation.id().cloned();
    engine_info!("Mutation {} id={:?}", kind, id);

    let result = match &mutation {
        Mutation::Create { url } => api.create_record(url).await.map(Some),
        Mutation::Start { id } => api.reanalyze_record(id).await.map(Some),
        Mutation::Stop { id } => api.stop_record(id).await.map(Some),
        Mutation::Delete { id } => api.delete_record(id).await.map(|()| None),
    };

    let event = match (result, id) {
        (Ok(Some(record)), _) => EngineEvent::Mutated { kind, record },
        (Ok(None), Some(id)) => EngineEvent::Deleted(id),
        (Ok(None), None) => return,
        (Err(error), id) => {
            engine_warn!("Mutation {} id={:?} rejected: {}", kind, id, error);
            EngineEvent::MutationFailed { kind, id, error }
        }
    };
    sink.emit(event);
}
