//! Crawlboard engine: backend client, pollers and mutation dispatch.
mod bulk;
mod client;
mod engine;
mod gateway;
mod poller;
mod sink;
mod types;

pub use bulk::{bulk_delete, bulk_reanalyze, DEFAULT_BULK_DELETE_DELAY};
pub use client::{ApiSettings, CrawlApi, ReqwestApi, DEFAULT_API_KEY_HEADER};
pub use engine::{EngineError, EngineEvents, EngineHandle, EngineSettings};
pub use gateway::{run_mutation, Mutation};
pub use poller::{run_poller, watch_record, WatchEnd, DEFAULT_POLL_INTERVAL};
pub use sink::{ChannelEventSink, EventSink};
pub use types::{ApiError, BulkDeleteReport, EngineEvent, FailureKind};
