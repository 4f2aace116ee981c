use std::fmt;

use crawlboard_core::{MutationKind, Record, RecordId};
use thiserror::Error;

/// Failure talking to the crawl backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Text suitable for showing to the user.
    pub fn reason(&self) -> String {
        match self.kind {
            FailureKind::HttpStatus(code) => format!("{} (HTTP {code})", self.message),
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "invalid response body"),
        }
    }
}

/// Outcome of one bulk delete sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkDeleteReport {
    pub attempted: usize,
    pub deleted: Vec<RecordId>,
    pub failed: Vec<(RecordId, ApiError)>,
}

impl BulkDeleteReport {
    pub fn failed_ids(&self) -> Vec<RecordId> {
        self.failed.iter().map(|(id, _)| id.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Main poller fetched the whole collection.
    RecordsFetched(Vec<Record>),
    /// Convergence poller saw the watched record.
    RecordObserved(Record),
    /// Create, start or stop returned the updated record.
    Mutated { kind: MutationKind, record: Record },
    Deleted(RecordId),
    MutationFailed {
        kind: MutationKind,
        id: Option<RecordId>,
        error: ApiError,
    },
    BulkDeleteFinished(BulkDeleteReport),
    DetailsLoaded(Record),
    DetailsFailed { id: RecordId, error: ApiError },
}
