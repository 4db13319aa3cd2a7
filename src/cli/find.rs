//! Find command implementation

use crate::cli::{FindArgs, OutputFormat, Session};
use crate::core::error::{Error, Result};
use crate::history::LocationRef;
use crate::lookup::{FsHost, Host, Outcome, TagMatch};
use crate::output::{format_outcome, human};
use dialoguer::Select;
use std::path::{Path, PathBuf};
use tracing::info;

/// Run the find command
pub fn run(args: FindArgs, config_path: Option<&Path>) -> Result<()> {
    let session = Session::load(config_path)?;
    let tag_files = session.tag_files(&args.source.tags)?;
    let history = session.load_history()?;

    let mut host = match &args.from {
        Some(from) => departure_host(from, &session.cwd),
        // Without --from we are wherever the last jump left us
        None => FsHost::new(
            history
                .current()
                .map(|entry| entry.location.clone())
                .unwrap_or_else(|| LocationRef::File {
                    path: session.cwd.clone(),
                }),
        ),
    };

    let mut lookup = session.lookup(history, args.source.ignore_case);
    let outcome = match lookup.find_tag(&mut host, &args.name, &tag_files)? {
        Outcome::NotFound { .. } => return Err(Error::TagNotFound { name: args.name }),
        Outcome::MultipleMatches { matches } => {
            match choose(&matches, args.select, args.interactive)? {
                Some(index) => {
                    info!(index, "Selected match");
                    let target = lookup.resolve_and_navigate(&mut host, &matches[index])?;
                    Outcome::SingleMatch { target }
                }
                None => Outcome::MultipleMatches { matches },
            }
        }
        single => single,
    };

    session.save_history(&lookup.history().lock())?;

    print!("{}", format_outcome(&outcome, OutputFormat::from_json_flag(args.json)));
    Ok(())
}

/// Pick one of several matches, by 1-based index or from a menu
fn choose(matches: &[TagMatch], select: Option<usize>, interactive: bool) -> Result<Option<usize>> {
    if let Some(index) = select {
        if index == 0 || index > matches.len() {
            return Err(Error::InvalidSelection {
                index,
                count: matches.len(),
            });
        }
        return Ok(Some(index - 1));
    }

    if !interactive {
        return Ok(None);
    }

    let items: Vec<String> = matches.iter().map(human::describe).collect();
    Select::new()
        .with_prompt(format!("{} matches for '{}'", matches.len(), matches[0].record.tag_name))
        .items(&items)
        .default(0)
        .interact_opt()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
}

/// Build the host from `--from PATH[:LINE]`
fn departure_host(from: &str, cwd: &Path) -> FsHost {
    let (path, line) = split_location(from);
    let path = if path.is_absolute() { path } else { cwd.join(path) };

    let mut host = FsHost::new(LocationRef::File { path: path.clone() });
    if let Some(line) = line {
        // An unreadable departure file still counts as a place to come back to
        if let Ok(mut doc) = host.open_document(&path) {
            host.goto_line(&mut doc, line);
        }
    }
    host
}

fn split_location(from: &str) -> (PathBuf, Option<u32>) {
    match from.rsplit_once(':') {
        Some((path, line)) if !path.is_empty() => match line.parse::<u32>() {
            Ok(line) => (PathBuf::from(path), Some(line)),
            Err(_) => (PathBuf::from(from), None),
        },
        _ => (PathBuf::from(from), None),
    }
}
