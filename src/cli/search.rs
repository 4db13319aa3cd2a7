//! Search command implementation

use crate::cli::{OutputFormat, SearchArgs, Session};
use crate::core::error::Result;
use crate::output::{format_lines, FileLines};
use std::path::Path;
use tracing::info;

/// Run the search command
pub fn run(args: SearchArgs, config_path: Option<&Path>) -> Result<()> {
    let session = Session::load(config_path)?;
    let tag_files = session.tag_files(&args.source.tags)?;

    // Raw lookups never navigate, so the stored history is left alone
    let mut lookup = session.lookup(Default::default(), args.source.ignore_case);

    let mut results = Vec::with_capacity(tag_files.len());
    for index_file in tag_files {
        let lines = lookup.search_lines(&args.name, &index_file)?;
        info!(file = %index_file.display(), lines = lines.len(), "Searched tag file");
        results.push(FileLines { index_file, lines });
    }

    print!(
        "{}",
        format_lines(&args.name, &results, OutputFormat::from_json_flag(args.json))
    );
    Ok(())
}
