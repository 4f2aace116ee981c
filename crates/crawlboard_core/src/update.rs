use crate::{AppState, Effect, Msg, MutationKind, Notice, PendingAction, RecordId};

const NOTHING_SELECTED: &str = "No URLs selected.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if is_user_input(&msg) {
        state.clear_notice();
    }

    let effects = match msg {
        Msg::UrlSubmitted(raw) => {
            let url = raw.trim();
            if url.is_empty() {
                Vec::new()
            } else {
                vec![Effect::CreateRecord {
                    url: url.to_string(),
                }]
            }
        }
        Msg::SearchChanged(term) => {
            state.view_state_mut().set_search_term(term);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SortClicked(key) => {
            state.view_state_mut().toggle_sort(key);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SortSet { key, direction } => {
            state.view_state_mut().set_sort(key, direction);
            state.mark_dirty();
            Vec::new()
        }
        Msg::RowsPerPageChanged(rows) => {
            state.view_state_mut().set_rows_per_page(rows);
            state.mark_dirty();
            Vec::new()
        }
        Msg::NextPage => {
            let total = state.total_pages();
            state.view_state_mut().next_page(total);
            state.mark_dirty();
            Vec::new()
        }
        Msg::PrevPage => {
            let total = state.total_pages();
            state.view_state_mut().prev_page(total);
            state.mark_dirty();
            Vec::new()
        }
        Msg::PageSelected(page) => {
            let total = state.total_pages();
            state.view_state_mut().go_to_page(page, total);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SelectionToggled(id) => {
            if state.store().contains(&id) {
                state.selection_mut().toggle(id);
            } else {
                state.set_notice(unknown_record(&id));
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::PageSelectionToggled => {
            let page_ids = state.page_ids();
            state.selection_mut().toggle_all_on_page(&page_ids);
            state.mark_dirty();
            Vec::new()
        }
        Msg::StartClicked(id) => match state.store().get(&id) {
            Some(record) if record.status.can_start() => vec![Effect::StartRecord { id }],
            Some(record) => {
                let text = format!("Cannot start {} while it is {}.", record.url, record.status);
                state.set_notice(Notice::error(text));
                Vec::new()
            }
            None => {
                state.set_notice(unknown_record(&id));
                Vec::new()
            }
        },
        Msg::StopClicked(id) => match state.store().get(&id) {
            Some(record) if record.status.can_stop() => vec![Effect::StopRecord { id }],
            Some(record) => {
                let text = format!("Cannot stop {}; it is {}.", record.url, record.status);
                state.set_notice(Notice::error(text));
                Vec::new()
            }
            None => {
                state.set_notice(unknown_record(&id));
                Vec::new()
            }
        },
        Msg::DeleteClicked(id) => {
            if state.store().contains(&id) {
                vec![Effect::DeleteRecord { id }]
            } else {
                state.set_notice(unknown_record(&id));
                Vec::new()
            }
        }
        Msg::BulkDeleteClicked => {
            request_confirmation(&mut state, PendingAction::BulkDelete);
            Vec::new()
        }
        Msg::BulkReanalyzeClicked => {
            request_confirmation(&mut state, PendingAction::BulkReanalyze);
            Vec::new()
        }
        Msg::ConfirmationAnswered(confirmed) => match state.take_pending() {
            Some(action) if confirmed => dispatch_bulk(&mut state, action),
            _ => Vec::new(),
        },
        Msg::DetailsRequested(id) => {
            if state.store().contains(&id) {
                vec![Effect::LoadDetails { id }]
            } else {
                state.set_notice(unknown_record(&id));
                Vec::new()
            }
        }
        Msg::DetailsClosed => {
            state.set_details(None);
            Vec::new()
        }
        Msg::DismissNotice => Vec::new(),
        Msg::RecordsFetched(records) => {
            let changed = state.store_mut().reconcile(records);
            let pruned = state.prune_selection();
            if changed || pruned {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::RecordObserved(record) => {
            if state.store_mut().replace_existing(record) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::MutationSucceeded { kind, record } => apply_mutation(&mut state, kind, record),
        Msg::RecordDeleted(id) => {
            if state.forget_record(&id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::MutationFailed { kind, id, reason } => {
            let text = match id {
                Some(id) => format!("Failed to {kind} {id}: {reason}"),
                None => format!("Failed to {kind}: {reason}"),
            };
            state.set_notice(Notice::error(text));
            Vec::new()
        }
        Msg::BulkDeleteFinished { attempted, failed } => {
            state.selection_mut().clear();
            let deleted = attempted.saturating_sub(failed.len());
            let notice = if failed.is_empty() {
                Notice::info(format!("Deleted {deleted} URL(s)."))
            } else {
                Notice::error(format!(
                    "Deleted {deleted} of {attempted} URL(s); {} failed.",
                    failed.len()
                ))
            };
            state.set_notice(notice);
            Vec::new()
        }
        Msg::DetailsLoaded(record) => {
            state.set_details(Some(record));
            Vec::new()
        }
        Msg::DetailsFailed { id, reason } => {
            state.set_notice(Notice::error(format!(
                "Failed to load details for {id}: {reason}"
            )));
            Vec::new()
        }
    };

    (state, effects)
}

fn is_user_input(msg: &Msg) -> bool {
    !matches!(
        msg,
        Msg::RecordsFetched(_)
            | Msg::RecordObserved(_)
            | Msg::MutationSucceeded { .. }
            | Msg::RecordDeleted(_)
            | Msg::MutationFailed { .. }
            | Msg::BulkDeleteFinished { .. }
            | Msg::DetailsLoaded(_)
            | Msg::DetailsFailed { .. }
    )
}

fn unknown_record(id: &RecordId) -> Notice {
    Notice::error(format!("No URL with id {id}."))
}

fn request_confirmation(state: &mut AppState, action: PendingAction) {
    if state.selection().is_empty() {
        state.set_notice(Notice::info(NOTHING_SELECTED));
        return;
    }
    state.set_pending(Some(action));
}

fn dispatch_bulk(state: &mut AppState, action: PendingAction) -> Vec<Effect> {
    if state.selection().is_empty() {
        state.set_notice(Notice::info(NOTHING_SELECTED));
        return Vec::new();
    }
    let ids = state.selection().snapshot();
    match action {
        // Selection is cleared when the sequence reports back.
        PendingAction::BulkDelete => vec![Effect::BulkDelete { ids }],
        PendingAction::BulkReanalyze => {
            state.selection_mut().clear();
            state.mark_dirty();
            vec![Effect::BulkReanalyze { ids }]
        }
    }
}

fn apply_mutation(state: &mut AppState, kind: MutationKind, record: crate::Record) -> Vec<Effect> {
    let id = record.id.clone();
    let settled = record.status.is_terminal();
    let changed = match kind {
        MutationKind::Create => state.store_mut().upsert(record),
        MutationKind::Start | MutationKind::Stop => state.store_mut().replace_existing(record),
        MutationKind::Delete => state.forget_record(&id),
    };
    if changed {
        state.mark_dirty();
    }

    match kind {
        MutationKind::Create | MutationKind::Start if !settled => {
            vec![Effect::WatchRecord { id }]
        }
        _ => Vec::new(),
    }
}
