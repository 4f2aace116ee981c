//! Filter, sort and paginate the record store for display.
//!
//! Everything here is a pure function of the records and a [`ViewState`];
//! the same inputs always yield the same page.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::Record;

pub const DEFAULT_ROWS_PER_PAGE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Record fields the table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Url,
    Title,
    HtmlVersion,
    InternalLinks,
    ExternalLinks,
    AccessibleLinks,
    HasLoginForm,
    Status,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::Url,
        SortKey::Title,
        SortKey::HtmlVersion,
        SortKey::InternalLinks,
        SortKey::ExternalLinks,
        SortKey::AccessibleLinks,
        SortKey::HasLoginForm,
        SortKey::Status,
    ];

    pub fn field_name(self) -> &'static str {
        match self {
            SortKey::Url => "url",
            SortKey::Title => "title",
            SortKey::HtmlVersion => "html_version",
            SortKey::InternalLinks => "internal_links",
            SortKey::ExternalLinks => "external_links",
            SortKey::AccessibleLinks => "accessible_links",
            SortKey::HasLoginForm => "has_login_form",
            SortKey::Status => "status",
        }
    }

    fn value(self, record: &Record) -> SortValue<'_> {
        // Missing text sorts as "" so untitled rows group at the start of an
        // ascending sort instead of between "u" and "v" as "undefined".
        match self {
            SortKey::Url => SortValue::Text(record.url.as_str().into()),
            SortKey::Title => SortValue::Text(record.title.as_deref().unwrap_or("").into()),
            SortKey::HtmlVersion => {
                SortValue::Text(record.html_version.as_deref().unwrap_or("").into())
            }
            SortKey::InternalLinks => SortValue::Number(record.internal_links.into()),
            SortKey::ExternalLinks => SortValue::Number(record.external_links.into()),
            SortKey::AccessibleLinks => SortValue::Number(record.accessible_links.into()),
            SortKey::HasLoginForm => SortValue::Text(record.has_login_form.to_string().into()),
            SortKey::Status => SortValue::Text(record.status.as_str().into()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortKey(pub String);

impl fmt::Display for UnknownSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sort field `{}`", self.0)
    }
}

impl std::error::Error for UnknownSortKey {}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SortKey::ALL
            .into_iter()
            .find(|key| key.field_name() == wanted)
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

enum SortValue<'a> {
    Number(u64),
    Text(std::borrow::Cow<'a, str>),
}

impl SortValue<'_> {
    fn as_text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            SortValue::Number(n) => n.to_string().into(),
            SortValue::Text(text) => std::borrow::Cow::Borrowed(text.as_ref()),
        }
    }
}

fn compare_values(a: &SortValue<'_>, b: &SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Number(x), SortValue::Number(y)) => x.cmp(y),
        _ => a.as_text().cmp(&b.as_text()),
    }
}

/// User-controlled view settings. Never touched by background refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    search_term: String,
    sort_key: Option<SortKey>,
    sort_direction: SortDirection,
    current_page: usize,
    rows_per_page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::with_rows_per_page(DEFAULT_ROWS_PER_PAGE)
    }
}

impl ViewState {
    pub fn with_rows_per_page(rows_per_page: usize) -> Self {
        Self {
            search_term: String::new(),
            sort_key: None,
            sort_direction: SortDirection::Asc,
            current_page: 1,
            rows_per_page: rows_per_page.max(1),
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.current_page = 1;
    }

    /// Same key flips the direction; a new key starts ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort_key == Some(key) {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_key = Some(key);
            self.sort_direction = SortDirection::Asc;
        }
        self.current_page = 1;
    }

    pub fn set_sort(&mut self, key: Option<SortKey>, direction: SortDirection) {
        self.sort_key = key;
        self.sort_direction = direction;
        self.current_page = 1;
    }

    pub fn set_rows_per_page(&mut self, rows: usize) {
        self.rows_per_page = rows.max(1);
        self.current_page = 1;
    }

    /// Jump to `page`, clamped to `1..=total_pages`.
    pub fn go_to_page(&mut self, page: usize, total_pages: usize) {
        self.current_page = page.clamp(1, total_pages.max(1));
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.go_to_page(self.current_page.saturating_add(1), total_pages);
    }

    pub fn prev_page(&mut self, total_pages: usize) {
        self.go_to_page(self.current_page.saturating_sub(1), total_pages);
    }
}

/// Keep records whose url or title contains `term`, case-insensitively.
pub fn filter_records<'a>(records: &'a [Record], term: &str) -> Vec<&'a Record> {
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| matches_term(record, &needle))
        .collect()
}

fn matches_term(record: &Record, lowered_term: &str) -> bool {
    record.url.to_lowercase().contains(lowered_term)
        || record
            .title
            .as_deref()
            .is_some_and(|title| title.to_lowercase().contains(lowered_term))
}

/// Stable sort; `None` keeps the input order.
pub fn sort_records(records: &mut [&Record], key: Option<SortKey>, direction: SortDirection) {
    let Some(key) = key else {
        return;
    };
    records.sort_by(|a, b| {
        let ordering = compare_values(&key.value(a), &key.value(b));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Number of pages for `count` rows; never less than one.
pub fn total_pages(count: usize, rows_per_page: usize) -> usize {
    count.div_ceil(rows_per_page.max(1)).max(1)
}

/// Slice out 1-based `page`. Pages past the end are empty.
pub fn paginate<T>(rows: &[T], page: usize, rows_per_page: usize) -> &[T] {
    let rows_per_page = rows_per_page.max(1);
    let start = page.max(1).saturating_sub(1).saturating_mul(rows_per_page);
    if start >= rows.len() {
        return &[];
    }
    let end = start.saturating_add(rows_per_page).min(rows.len());
    &rows[start..end]
}

/// Output of the full pipeline for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice<'a> {
    pub rows: Vec<&'a Record>,
    pub filtered_count: usize,
    pub current_page: usize,
    pub total_pages: usize,
}

/// filter -> sort -> paginate.
pub fn derive_page<'a>(records: &'a [Record], view: &ViewState) -> PageSlice<'a> {
    let mut filtered = filter_records(records, &view.search_term);
    sort_records(&mut filtered, view.sort_key, view.sort_direction);
    let filtered_count = filtered.len();
    let rows = paginate(&filtered, view.current_page, view.rows_per_page).to_vec();

    PageSlice {
        rows,
        filtered_count,
        current_page: view.current_page,
        total_pages: total_pages(filtered_count, view.rows_per_page),
    }
}
