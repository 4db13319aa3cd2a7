//! Human-readable output formatting

use super::{FileLines, HistoryView};
use crate::history::NavigationEntry;
use crate::lookup::{Outcome, TagMatch};
use crate::tags::{Location, TagFileHeader};

/// Format a lookup outcome for human consumption
pub fn format_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::SingleMatch { target } => format!("{}\n", target.arrival),
        Outcome::NotFound { query } => format!("No tag found for '{}'\n", query),
        Outcome::MultipleMatches { matches } => {
            let mut output = format!(
                "Found {} matches for '{}'\n\n",
                matches.len(),
                matches[0].record.tag_name
            );
            for (i, tag) in matches.iter().enumerate() {
                output.push_str(&format!("{:>3}. {}\n", i + 1, describe(tag)));
            }
            output
        }
    }
}

/// One line describing where a match points
pub fn describe(tag: &TagMatch) -> String {
    let path = tag.target_path();
    let mut line = match &tag.record.location {
        Location::LineNumber(n) => format!("{}:{}", path.display(), n),
        location => format!("{}  {}", path.display(), truncate(&location.to_string(), 60)),
    };
    if let Some(kind) = &tag.record.kind {
        line.push_str(&format!(" [{}]", kind));
    }
    for key in ["class", "struct", "namespace"] {
        if let Some(scope) = tag.record.field(key) {
            line.push_str(&format!(" in {}", scope));
        }
    }
    if let Some(signature) = tag.record.field("signature") {
        line.push_str(&format!(" {}", signature));
    }
    line
}

/// Format raw index lines grouped by file
pub fn format_lines(query: &str, results: &[FileLines]) -> String {
    let total: usize = results.iter().map(|r| r.lines.len()).sum();
    if total == 0 {
        return format!("No lines found for '{}'\n", query);
    }

    let mut output = String::new();
    for result in results.iter().filter(|r| !r.lines.is_empty()) {
        output.push_str(&format!("{}:\n", result.index_file.display()));
        for line in &result.lines {
            output.push_str(&format!("   {}\n", line));
        }
    }
    output
}

/// Format a tag file header
pub fn format_header(header: &TagFileHeader) -> String {
    let format_version = header
        .format_version
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "{}\n   size:      {} bytes\n   format:    {}\n   sorted:    {:?}\n   generator: {} {}\n   author:    {}\n   url:       {}\n",
        header.path.display(),
        header.size_bytes,
        format_version,
        header.sorted_mode,
        header.generator_name,
        header.generator_version,
        header.generator_author,
        header.generator_url,
    )
}

/// Format a single history entry
pub fn format_entry(entry: &NavigationEntry) -> String {
    format!("{}\n", entry.location)
}

/// Format the history, oldest first, marking the current entry
pub fn format_history(view: &HistoryView<'_>) -> String {
    if view.entries.is_empty() {
        return "History is empty\n".to_string();
    }

    let mut output = String::new();
    for entry in &view.entries {
        let marker = if Some(entry.key) == view.current { '>' } else { ' ' };
        output.push_str(&format!(
            "{} {:>4}  {}  {}\n",
            marker,
            entry.key,
            entry.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            entry.location
        ));
    }
    output
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
