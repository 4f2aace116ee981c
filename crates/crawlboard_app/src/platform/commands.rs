//! Line commands typed at the prompt, translated into [`Msg`]s.

use crawlboard_core::{AppState, Msg, RecordId, SortDirection, SortKey, UnknownSortKey};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  add <url>              submit a URL for crawling
  search [text]          filter rows (no text clears the filter)
  sort <field> [asc|desc] sort by field; repeat to flip, `sort none` to reset
  rows <n>               rows per page
  next | prev | page <n> move between pages
  select <row>           toggle one row; `select page` toggles the page
  start|stop|delete <row>
  delete selected        delete the selection (asks first)
  reanalyze selected     reanalyze the selection (asks first)
  yes | no               answer a pending question
  details <row> | close  show or hide the full record
  dismiss                clear the message line
  help | quit
A <row> is a record id or a row number on the current page.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Msg),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`; type `help` for a list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("`{0}` is not a positive number")]
    NotANumber(String),
    #[error("{0}; fields: url, title, html_version, internal_links, external_links, accessible_links, has_login_form, status")]
    Sort(#[from] UnknownSortKey),
}

/// Parse one input line. Empty lines yield `None`.
pub fn parse_command(line: &str, state: &AppState) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    if word.is_empty() {
        return Ok(None);
    }

    let msg = match word.to_ascii_lowercase().as_str() {
        "help" | "?" => return Ok(Some(Command::Help)),
        "quit" | "exit" | "q" => return Ok(Some(Command::Quit)),
        "add" => Msg::UrlSubmitted(required(rest, "add <url>")?.to_string()),
        "search" => Msg::SearchChanged(rest.to_string()),
        "sort" => parse_sort(rest)?,
        "rows" => Msg::RowsPerPageChanged(positive(required(rest, "rows <n>")?)?),
        "next" => Msg::NextPage,
        "prev" => Msg::PrevPage,
        "page" => Msg::PageSelected(positive(required(rest, "page <n>")?)?),
        "select" => match required(rest, "select <row> | select page")? {
            "page" => Msg::PageSelectionToggled,
            row => Msg::SelectionToggled(resolve_row(row, state)),
        },
        "start" => Msg::StartClicked(resolve_row(required(rest, "start <row>")?, state)),
        "stop" => Msg::StopClicked(resolve_row(required(rest, "stop <row>")?, state)),
        "delete" => match required(rest, "delete <row> | delete selected")? {
            "selected" => Msg::BulkDeleteClicked,
            row => Msg::DeleteClicked(resolve_row(row, state)),
        },
        "reanalyze" => match rest {
            "selected" => Msg::BulkReanalyzeClicked,
            _ => return Err(CommandError::Usage("reanalyze selected")),
        },
        "yes" | "y" => Msg::ConfirmationAnswered(true),
        "no" | "n" => Msg::ConfirmationAnswered(false),
        "details" => Msg::DetailsRequested(resolve_row(required(rest, "details <row>")?, state)),
        "close" => Msg::DetailsClosed,
        "dismiss" => Msg::DismissNotice,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(Command::Dispatch(msg)))
}

fn parse_sort(rest: &str) -> Result<Msg, CommandError> {
    let mut parts = rest.split_whitespace();
    let field = parts
        .next()
        .ok_or(CommandError::Usage("sort <field> [asc|desc]"))?;
    if field.eq_ignore_ascii_case("none") {
        return Ok(Msg::SortSet {
            key: None,
            direction: SortDirection::Asc,
        });
    }
    let key: SortKey = field.parse()?;
    let msg = match parts.next().map(str::to_ascii_lowercase).as_deref() {
        None => Msg::SortClicked(key),
        Some("asc") => Msg::SortSet {
            key: Some(key),
            direction: SortDirection::Asc,
        },
        Some("desc") => Msg::SortSet {
            key: Some(key),
            direction: SortDirection::Desc,
        },
        Some(_) => return Err(CommandError::Usage("sort <field> [asc|desc]")),
    };
    Ok(msg)
}

fn required<'a>(rest: &'a str, usage: &'static str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(rest)
    }
}

fn positive(raw: &str) -> Result<usize, CommandError> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::NotANumber(raw.to_string())),
    }
}

/// A known id wins over a row number; anything else is passed through as an
/// id and rejected by `update` if it does not exist.
fn resolve_row(token: &str, state: &AppState) -> RecordId {
    let as_id = RecordId::from(token);
    if state.store().contains(&as_id) {
        return as_id;
    }
    let page_ids = state.page_ids();
    match token.parse::<usize>() {
        Ok(row) if (1..=page_ids.len()).contains(&row) => page_ids[row - 1].clone(),
        _ => as_id,
    }
}
