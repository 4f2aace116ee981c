//! Crawlboard core: record store, view pipeline, selection and the pure
//! session state machine.
mod effect;
mod msg;
mod record;
mod selection;
mod state;
mod store;
mod update;
pub mod view;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use record::{BrokenLink, Record, RecordId, Status};
pub use selection::Selection;
pub use state::{AppState, MutationKind, Notice, NoticeLevel, PendingAction};
pub use store::RecordStore;
pub use update::update;
pub use view::{PageSlice, SortDirection, SortKey, UnknownSortKey, ViewState, DEFAULT_ROWS_PER_PAGE};
pub use view_model::{AppViewModel, RecordRowView};
