//! Output formatting

pub mod human;
pub mod json;

use crate::cli::args::OutputFormat;
use crate::history::{NavigationEntry, NavigationHistory};
use crate::lookup::Outcome;
use crate::tags::TagFileHeader;
use serde::Serialize;
use std::path::PathBuf;

/// Raw lines found in one index file
#[derive(Debug, Clone, Serialize)]
pub struct FileLines {
    pub index_file: PathBuf,
    pub lines: Vec<String>,
}

/// Serializable snapshot of a history for listing
#[derive(Debug, Serialize)]
pub struct HistoryView<'a> {
    pub current: Option<u64>,
    pub entries: Vec<&'a NavigationEntry>,
}

impl<'a> HistoryView<'a> {
    pub fn new(history: &'a NavigationHistory) -> Self {
        Self {
            current: history.current().map(|e| e.key),
            entries: history.entries().collect(),
        }
    }
}

/// Format a lookup outcome
pub fn format_outcome(outcome: &Outcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => human::format_outcome(outcome),
        OutputFormat::Json => json::format(outcome),
    }
}

/// Format raw search lines
pub fn format_lines(query: &str, results: &[FileLines], format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => human::format_lines(query, results),
        OutputFormat::Json => json::format(&results),
    }
}

/// Format a parsed header
pub fn format_header(header: &TagFileHeader, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => human::format_header(header),
        OutputFormat::Json => json::format(header),
    }
}

/// Format one history entry
pub fn format_entry(entry: &NavigationEntry, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => human::format_entry(entry),
        OutputFormat::Json => json::format(entry),
    }
}

/// Format the whole history
pub fn format_history(history: &NavigationHistory, format: OutputFormat) -> String {
    let view = HistoryView::new(history);
    match format {
        OutputFormat::Human => human::format_history(&view),
        OutputFormat::Json => json::format(&view),
    }
}
