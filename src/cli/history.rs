//! History command implementations

use crate::cli::{HistoryArgs, OutputFormat, Session};
use crate::core::error::Result;
use crate::history::LocationRef;
use crate::lookup::FsHost;
use crate::output::{format_entry, format_history};
use std::path::Path;
use tracing::warn;

/// Which way to move through the history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Back,
    Forward,
    Current,
}

/// Run back, forward or current
pub fn run(step: Step, args: HistoryArgs, config_path: Option<&Path>) -> Result<()> {
    let session = Session::load(config_path)?;
    let history = session.load_history()?;

    let start = history
        .current()
        .map(|entry| entry.location.clone())
        .unwrap_or_else(|| LocationRef::File {
            path: session.cwd.clone(),
        });
    let mut host = FsHost::new(start);
    let mut lookup = session.lookup(history, false);

    let result = match step {
        Step::Back => lookup.history_back(&mut host),
        Step::Forward => lookup.history_forward(&mut host),
        Step::Current => lookup.history_current(&mut host),
    };

    match result {
        Ok(entry) => {
            session.save_history(&lookup.history().lock())?;
            print!("{}", format_entry(&entry, OutputFormat::from_json_flag(args.json)));
            Ok(())
        }
        Err(e) if e.is_history_boundary() => {
            eprintln!("{}", e);
            Ok(())
        }
        Err(e) => {
            // The cursor moved even though the location could not be visited
            warn!(error = %e, "History location unavailable");
            session.save_history(&lookup.history().lock())?;
            Err(e)
        }
    }
}

/// Run the history listing
pub fn list(args: HistoryArgs, config_path: Option<&Path>) -> Result<()> {
    let session = Session::load(config_path)?;
    let history = session.load_history()?;
    print!(
        "{}",
        format_history(&history, OutputFormat::from_json_flag(args.json))
    );
    Ok(())
}

/// Run reset
pub fn reset(config_path: Option<&Path>) -> Result<()> {
    let session = Session::load(config_path)?;
    let mut lookup = session.lookup(session.load_history()?, false);
    lookup.history_reset();
    session.save_history(&lookup.history().lock())?;
    println!("History cleared");
    Ok(())
}
