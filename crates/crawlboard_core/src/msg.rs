use crate::{MutationKind, Record, RecordId, SortDirection, SortKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted a URL to crawl.
    UrlSubmitted(String),
    /// User edited the search box.
    SearchChanged(String),
    /// User clicked a column header.
    SortClicked(SortKey),
    /// Explicit sort selection; `None` restores backend order.
    SortSet {
        key: Option<SortKey>,
        direction: SortDirection,
    },
    RowsPerPageChanged(usize),
    NextPage,
    PrevPage,
    PageSelected(usize),
    /// User toggled one row checkbox.
    SelectionToggled(RecordId),
    /// User toggled the header checkbox of the current page.
    PageSelectionToggled,
    StartClicked(RecordId),
    StopClicked(RecordId),
    DeleteClicked(RecordId),
    BulkDeleteClicked,
    BulkReanalyzeClicked,
    /// User answered the pending confirmation prompt.
    ConfirmationAnswered(bool),
    DetailsRequested(RecordId),
    DetailsClosed,
    DismissNotice,
    /// Main poller delivered the full collection.
    RecordsFetched(Vec<Record>),
    /// Convergence poller observed one record.
    RecordObserved(Record),
    /// A single mutation returned the updated record.
    MutationSucceeded { kind: MutationKind, record: Record },
    /// A delete was confirmed by the backend.
    RecordDeleted(RecordId),
    MutationFailed {
        kind: MutationKind,
        id: Option<RecordId>,
        reason: String,
    },
    /// Bulk delete sequence finished; `failed` lists ids that were not deleted.
    BulkDeleteFinished {
        attempted: usize,
        failed: Vec<RecordId>,
    },
    DetailsLoaded(Record),
    DetailsFailed { id: RecordId, reason: String },
}
