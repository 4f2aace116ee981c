use std::fmt;

use crate::view::{derive_page, filter_records, total_pages};
use crate::view_model::{AppViewModel, RecordRowView};
use crate::{Record, RecordId, RecordStore, Selection, ViewState};

/// Single-record operations routed through the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Start,
    Stop,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MutationKind::Create => "create",
            MutationKind::Start => "start",
            MutationKind::Stop => "stop",
            MutationKind::Delete => "delete",
        };
        f.write_str(label)
    }
}

/// Bulk action waiting for the user to confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    BulkDelete,
    BulkReanalyze,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-line message surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Everything one session owns. Mutated only through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    store: RecordStore,
    view: ViewState,
    selection: Selection,
    pending: Option<PendingAction>,
    notice: Option<Notice>,
    details: Option<Record>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_view(ViewState::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(view: ViewState) -> Self {
        Self {
            store: RecordStore::new(),
            view,
            selection: Selection::new(),
            pending: None,
            notice: None,
            details: None,
            dirty: false,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn pending(&self) -> Option<PendingAction> {
        self.pending
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Ids rendered on the current page, in display order.
    pub fn page_ids(&self) -> Vec<RecordId> {
        derive_page(self.store.records(), &self.view)
            .rows
            .into_iter()
            .map(|record| record.id.clone())
            .collect()
    }

    pub fn total_pages(&self) -> usize {
        let filtered = filter_records(self.store.records(), self.view.search_term()).len();
        total_pages(filtered, self.view.rows_per_page())
    }

    pub fn view(&self) -> AppViewModel {
        let page = derive_page(self.store.records(), &self.view);
        let all_selected_on_page = self
            .selection
            .all_selected_on_page(page.rows.iter().map(|record| &record.id));
        let rows = page
            .rows
            .iter()
            .map(|record| RecordRowView::from_record(record, self.selection.contains(&record.id)))
            .collect();

        AppViewModel {
            rows,
            current_page: page.current_page,
            total_pages: page.total_pages,
            rows_per_page: self.view.rows_per_page(),
            filtered_count: page.filtered_count,
            total_count: self.store.len(),
            selected_count: self.selection.len(),
            all_selected_on_page,
            search_term: self.view.search_term().to_string(),
            sort: self
                .view
                .sort_key()
                .map(|key| (key, self.view.sort_direction())),
            confirmation: self.pending.map(|action| confirmation_prompt(action, self.selection.len())),
            notice: self.notice.clone(),
            details: self.details.clone(),
        }
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    pub(crate) fn view_state_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub(crate) fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub(crate) fn set_pending(&mut self, pending: Option<PendingAction>) {
        self.pending = pending;
        self.dirty = true;
    }

    pub(crate) fn take_pending(&mut self) -> Option<PendingAction> {
        let pending = self.pending.take();
        if pending.is_some() {
            self.dirty = true;
        }
        pending
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.dirty = true;
    }

    pub(crate) fn clear_notice(&mut self) {
        if self.notice.take().is_some() {
            self.dirty = true;
        }
    }

    pub(crate) fn details_id(&self) -> Option<&RecordId> {
        self.details.as_ref().map(|record| &record.id)
    }

    pub(crate) fn set_details(&mut self, details: Option<Record>) {
        if self.details != details {
            self.details = details;
            self.dirty = true;
        }
    }

    /// Drop selected ids that no longer exist in the store.
    pub(crate) fn prune_selection(&mut self) -> bool {
        let store = &self.store;
        self.selection.retain(|id| store.contains(id))
    }

    /// Remove a deleted record and its selection entry in one step.
    pub(crate) fn forget_record(&mut self, id: &RecordId) -> bool {
        let removed = self.store.remove(id).is_some();
        let deselected = self.selection.remove(id);
        if self.details_id() == Some(id) {
            self.details = None;
        }
        removed || deselected
    }
}

fn confirmation_prompt(action: PendingAction, selected: usize) -> String {
    match action {
        PendingAction::BulkDelete => {
            format!("Are you sure you want to delete {selected} selected URL(s)?")
        }
        PendingAction::BulkReanalyze => {
            format!("Reanalyze {selected} selected URL(s)?")
        }
    }
}
