use crate::{Notice, Record, RecordId, SortDirection, SortKey, Status};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub rows: Vec<RecordRowView>,
    pub current_page: usize,
    pub total_pages: usize,
    pub rows_per_page: usize,
    pub filtered_count: usize,
    pub total_count: usize,
    pub selected_count: usize,
    pub all_selected_on_page: bool,
    pub search_term: String,
    pub sort: Option<(SortKey, SortDirection)>,
    /// Prompt text while a bulk action awaits confirmation.
    pub confirmation: Option<String>,
    pub notice: Option<Notice>,
    pub details: Option<Record>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRowView {
    pub id: RecordId,
    pub url: String,
    pub title: Option<String>,
    pub html_version: Option<String>,
    pub internal_links: u32,
    pub external_links: u32,
    pub accessible_links: u32,
    pub has_login_form: bool,
    pub status: Status,
    pub selected: bool,
    pub can_start: bool,
    pub can_stop: bool,
}

impl RecordRowView {
    pub(crate) fn from_record(record: &Record, selected: bool) -> Self {
        Self {
            id: record.id.clone(),
            url: record.url.clone(),
            title: record.title.clone(),
            html_version: record.html_version.clone(),
            internal_links: record.internal_links,
            external_links: record.external_links,
            accessible_links: record.accessible_links,
            has_login_form: record.has_login_form,
            status: record.status.clone(),
            selected,
            can_start: record.status.can_start(),
            can_stop: record.status.can_stop(),
        }
    }
}
