//! Text rendering for the terminal.

use calcvault_engine::{
    format_file_size, CalculatorState, Event, FileKind, HistoryEntry, Note, Timestamp, VaultFile,
};
use chrono::{Local, TimeZone};
use std::fmt;

/// The calculator screen as one line: `[DEG] [M] 3 + | 4`.
pub fn screen(state: &CalculatorState) -> String {
    let mut line = format!("[{}]", state.angle_mode());
    if state.memory_active() {
        line.push_str(" [M]");
    }
    let expression = state.expression().trim_end();
    if !expression.is_empty() {
        line.push(' ');
        line.push_str(expression);
    }
    line.push_str(" | ");
    line.push_str(state.current_operand());
    line
}

/// Lines worth showing for a batch of events besides the screen itself.
pub fn event_notices(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Failed { kind } => Some(format!("! {}", kind)),
            _ => None,
        })
        .collect()
}

pub fn format_timestamp(ms: Timestamp) -> String {
    format_timestamp_in(ms, &Local)
}

fn format_timestamp_in<Tz: TimeZone>(ms: Timestamp, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    match i64::try_from(ms)
        .ok()
        .and_then(|ms| tz.timestamp_millis_opt(ms).single())
    {
        Some(at) => at.format("%Y-%m-%d at %H:%M").to_string(),
        None => "unknown time".to_string(),
    }
}

pub fn notes(notes: &[Note]) -> Vec<String> {
    if notes.is_empty() {
        return vec!["No notes yet.".to_string()];
    }
    let mut lines = Vec::new();
    for note in notes {
        lines.push(format!("#{} {}", note.id, note.title));
        lines.extend(note.content.lines().map(|l| format!("    {}", l)));
        let mut stamp = format!("    Created: {}", format_timestamp(note.created_at));
        if note.is_edited() {
            stamp.push_str(&format!(" (edited {})", format_timestamp(note.updated_at)));
        }
        lines.push(stamp);
    }
    lines
}

pub fn history(entries: &[HistoryEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No calculations yet.".to_string()];
    }
    entries
        .iter()
        .map(|e| {
            format!(
                "#{} {}    ({})",
                e.id,
                e.calculation,
                format_timestamp(e.timestamp)
            )
        })
        .collect()
}

pub fn files(files: &[VaultFile]) -> Vec<String> {
    if files.is_empty() {
        return vec!["Vault is empty.".to_string()];
    }
    files.iter().map(file_line).collect()
}

fn file_line(file: &VaultFile) -> String {
    format!(
        "#{} [{}] {}  {}  {}",
        file.id,
        FileKind::from_mime(&file.mime_type).label(),
        file.name,
        format_file_size(file.size),
        format_timestamp(file.upload_date)
    )
}
