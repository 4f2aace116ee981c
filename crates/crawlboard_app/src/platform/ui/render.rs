use std::fmt::Write as _;

use crawlboard_core::{AppViewModel, NoticeLevel, Record, RecordRowView, SortDirection, SortKey};

const URL_WIDTH: usize = 36;
const TITLE_WIDTH: usize = 24;

/// Render the whole screen for one view model.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", header_line(view));
    out.push_str(&table(view));
    let _ = writeln!(
        out,
        "Page {} of {} | Showing {} of {} filtered links | {} selected",
        view.current_page,
        view.total_pages,
        view.rows.len(),
        view.filtered_count,
        view.selected_count
    );

    if let Some(prompt) = &view.confirmation {
        let _ = writeln!(out, "? {prompt} (yes/no)");
    }
    if let Some(notice) = &view.notice {
        let marker = match notice.level {
            NoticeLevel::Info => "*",
            NoticeLevel::Error => "!",
        };
        let _ = writeln!(out, "{marker} {}", notice.text);
    }
    if let Some(record) = &view.details {
        out.push_str(&details(record));
    }
    out
}

fn header_line(view: &AppViewModel) -> String {
    let mut line = format!("Crawlboard | {} URL(s)", view.total_count);
    if !view.search_term.is_empty() {
        let _ = write!(line, " | search: \"{}\"", view.search_term);
    }
    if let Some((key, direction)) = view.sort {
        let _ = write!(line, " | sort: {key} {}", direction_label(direction));
    }
    line
}

fn table(view: &AppViewModel) -> String {
    let mut out = String::new();
    if view.rows.is_empty() {
        let text = if view.total_count == 0 {
            "No URLs yet. Use `add <url>` to submit one."
        } else {
            "No URLs match the search."
        };
        let _ = writeln!(out, "  {text}");
        return out;
    }

    let page_marker = if view.all_selected_on_page { "[x]" } else { "[ ]" };
    let _ = writeln!(
        out,
        "{:>3} {page_marker} {:<8} {:<9} {:<URL_WIDTH$} {:<TITLE_WIDTH$} {:<8} {:>5} {:>5} {:>5} {:<5}",
        "#",
        heading("ID", None, view),
        heading("STATUS", Some(SortKey::Status), view),
        heading("URL", Some(SortKey::Url), view),
        heading("TITLE", Some(SortKey::Title), view),
        heading("HTML", Some(SortKey::HtmlVersion), view),
        heading("INT", Some(SortKey::InternalLinks), view),
        heading("EXT", Some(SortKey::ExternalLinks), view),
        heading("ACC", Some(SortKey::AccessibleLinks), view),
        heading("LOGIN", Some(SortKey::HasLoginForm), view),
    );
    for (index, row) in view.rows.iter().enumerate() {
        let _ = writeln!(out, "{}", format_row(index + 1, row));
    }
    out
}

fn heading(label: &str, key: Option<SortKey>, view: &AppViewModel) -> String {
    match (key, view.sort) {
        (Some(key), Some((active, direction))) if key == active => {
            format!("{label}{}", direction_arrow(direction))
        }
        _ => label.to_string(),
    }
}

fn format_row(number: usize, row: &RecordRowView) -> String {
    let checkbox = if row.selected { "[x]" } else { "[ ]" };
    format!(
        "{number:>3} {checkbox} {:<8} {:<9} {:<URL_WIDTH$} {:<TITLE_WIDTH$} {:<8} {:>5} {:>5} {:>5} {:<5}",
        truncate(row.id.as_str(), 8),
        truncate(row.status.as_str(), 9),
        truncate(&row.url, URL_WIDTH),
        truncate(row.title.as_deref().unwrap_or("-"), TITLE_WIDTH),
        truncate(row.html_version.as_deref().unwrap_or("-"), 8),
        row.internal_links,
        row.external_links,
        row.accessible_links,
        yes_no(row.has_login_form),
    )
}

fn details(record: &Record) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Details for {} ({})", record.url, record.id);
    let _ = writeln!(out, "  status:        {}", record.status);
    let _ = writeln!(out, "  title:         {}", record.title.as_deref().unwrap_or("-"));
    let _ = writeln!(
        out,
        "  html version:  {}",
        record.html_version.as_deref().unwrap_or("-")
    );
    let _ = writeln!(
        out,
        "  links:         {} internal, {} external, {} accessible",
        record.internal_links, record.external_links, record.accessible_links
    );
    let _ = writeln!(out, "  login form:    {}", yes_no(record.has_login_form));

    if record.headings.is_empty() {
        let _ = writeln!(out, "  headings:      none");
    } else {
        let counts: Vec<String> = record
            .headings
            .iter()
            .map(|(level, count)| format!("{level}: {count}"))
            .collect();
        let _ = writeln!(out, "  headings:      {}", counts.join(", "));
    }

    if record.broken_links.is_empty() {
        let _ = writeln!(out, "  broken links:  none");
    } else {
        let _ = writeln!(out, "  broken links:  {}", record.broken_links.len());
        for link in &record.broken_links {
            let _ = writeln!(out, "    {} {}", link.status, link.url);
        }
    }
    let _ = writeln!(out, "  (type `close` to hide)");
    out
}

fn direction_label(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "asc",
        SortDirection::Desc => "desc",
    }
}

fn direction_arrow(direction: SortDirection) -> char {
    match direction {
        SortDirection::Asc => '^',
        SortDirection::Desc => 'v',
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
