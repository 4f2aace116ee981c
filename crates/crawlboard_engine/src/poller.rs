//! Periodic reconciliation against `GET /urls`.
//!
//! The main poller feeds every fetched collection to the sink. A watch
//! poller follows one record until it settles. Both swallow failed fetches
//! and try again on the next tick.

use std::time::Duration;

use crawlboard_core::{RecordId, Status};
use engine_logging::{engine_debug, engine_trace};
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{CrawlApi, EngineEvent, EventSink};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Shortest accepted period; tokio intervals reject zero.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Why a watch poller stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEnd {
    Settled(Status),
    Vanished,
    Cancelled,
}

/// Fetch the full collection immediately and then every `period` until
/// `cancel` fires. A fetch never overlaps the previous one.
pub async fn run_poller(
    api: &dyn CrawlApi,
    period: Duration,
    sink: &dyn EventSink,
    cancel: &CancellationToken,
) {
    let mut ticker = interval(period.max(MIN_POLL_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = api.list_records() => result,
        };
        match result {
            Ok(records) => {
                engine_trace!("Poll fetched {} record(s)", records.len());
                sink.emit(EngineEvent::RecordsFetched(records));
            }
            Err(err) => engine_debug!("Poll failed, retrying next cycle: {}", err),
        }
    }
    engine_debug!("Poller stopped");
}

/// Poll every `period` until record `id` reaches a terminal status or
/// disappears from the collection.
pub async fn watch_record(
    api: &dyn CrawlApi,
    id: &RecordId,
    period: Duration,
    sink: &dyn EventSink,
    cancel: &CancellationToken,
) -> WatchEnd {
    let period = period.max(MIN_POLL_INTERVAL);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let end = loop {
        tokio::select! {
            _ = cancel.cancelled() => break WatchEnd::Cancelled,
            _ = ticker.tick() => {}
        }
        let result = tokio::select! {
            _ = cancel.cancelled() => break WatchEnd::Cancelled,
            result = api.list_records() => result,
        };
        let records = match result {
            Ok(records) => records,
            Err(err) => {
                engine_debug!("Watch poll for id={} failed: {}", id, err);
                continue;
            }
        };
        let Some(record) = records.into_iter().find(|record| &record.id == id) else {
            break WatchEnd::Vanished;
        };
        let status = record.status.clone();
        sink.emit(EngineEvent::RecordObserved(record));
        if status.is_terminal() {
            break WatchEnd::Settled(status);
        }
    };
    engine_debug!("Watch for id={} ended: {:?}", id, end);
    end
}
