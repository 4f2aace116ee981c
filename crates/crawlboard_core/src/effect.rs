use crate::RecordId;

/// Remote work requested by [`crate::update`]; executed by the app layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CreateRecord { url: String },
    StartRecord { id: RecordId },
    StopRecord { id: RecordId },
    DeleteRecord { id: RecordId },
    /// Delete every id in order, one call at a time.
    BulkDelete { ids: Vec<RecordId> },
    /// Request reanalysis of every id without ordering.
    BulkReanalyze { ids: Vec<RecordId> },
    /// Poll until the record settles in a terminal status.
    WatchRecord { id: RecordId },
    LoadDetails { id: RecordId },
}
