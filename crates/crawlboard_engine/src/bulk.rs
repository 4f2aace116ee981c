use std::sync::Arc;
use std::time::Duration;

use crawlboard_core::RecordId;
use engine_logging::{engine_info, engine_warn};
use tokio::task::JoinHandle;

use crate::gateway::{run_mutation, Mutation};
use crate::{BulkDeleteReport, CrawlApi, EngineEvent, EventSink};

pub const DEFAULT_BULK_DELETE_DELAY: Duration = Duration::from_millis(50);

/// Delete `ids` strictly one after another with `delay` between calls.
///
/// A failed call is logged and skipped; the sequence always runs to the
/// end. Each success is reported as it happens, followed by the summary.
pub async fn bulk_delete(
    api: &dyn CrawlApi,
    ids: Vec<RecordId>,
    delay: Duration,
    sink: &dyn EventSink,
) -> BulkDeleteReport {
    let mut report = BulkDeleteReport {
        attempted: ids.len(),
        ..BulkDeleteReport::default()
    };

    for (index, id) in ids.into_iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match api.delete_record(&id).await {
            Ok(()) => {
                sink.emit(EngineEvent::Deleted(id.clone()));
                report.deleted.push(id);
            }
            Err(err) => {
                engine_warn!("Failed to delete id={}: {}", id, err);
                report.failed.push((id, err));
            }
        }
    }

    engine_info!(
        "Bulk delete finished: {} of {} deleted",
        report.deleted.len(),
        report.attempted
    );
    sink.emit(EngineEvent::BulkDeleteFinished(report.clone()));
    report
}

/// Request reanalysis of every id at once. Calls are not ordered and the
/// caller is not expected to wait; the handles are returned for tests.
pub fn bulk_reanalyze(
    api: Arc<dyn CrawlApi>,
    ids: Vec<RecordId>,
    sink: Arc<dyn EventSink>,
) -> Vec<JoinHandle<()>> {
    engine_info!("Bulk reanalyze of {} record(s)", ids.len());
    ids.into_iter()
        .map(|id| {
            let api = api.clone();
            let sink = sink.clone();
            tokio::spawn(async move {
                run_mutation(api.as_ref(), Mutation::Start { id }, sink.as_ref()).await;
            })
        })
        .collect()
}
