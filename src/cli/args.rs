// Command line definitions. build.rs includes this file to render the man
// page, so it must only depend on clap and std.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const LONG_ABOUT: &str = r#"
Jump to symbol definitions using ctags index files, without loading them.

Lookups binary search the sorted index on disk, so even very large tag
files answer instantly. Every jump is remembered, and the history can be
walked back and forth like an editor's jump list.

QUICK START:
    1. ctags -R .                 Generate a sorted tags file
    2. tagjump find <name>        Jump to a definition (prints path:line)
    3. tagjump back               Return to where you were

TAG FILES:
    By default tagjump looks for `tags` and `TAGS` in the current directory
    and every parent. Use -t to name files explicitly, or set
    lookup.tag_files in $TAGJUMP_HOME/config.toml (globs allowed).

HISTORY:
    tagjump back              Previous location
    tagjump forward           Next location
    tagjump current           Location you are at
    tagjump history           List all recorded locations
    tagjump reset             Forget everything

EXAMPLES:
    tagjump find main                     Jump to main
    tagjump find init -s 2                Pick the second of several matches
    tagjump find Widget -i --json         Case-insensitive, JSON output
    tagjump search VALAMASK -t src/tags   Show raw index lines
    tagjump header tags                   Show tag file metadata
"#;

/// Jump to ctags definitions with back/forward history
#[derive(Parser, Debug)]
#[command(name = "tagjump")]
#[command(author, version)]
#[command(about = "Jump to ctags definitions with back/forward history")]
#[command(long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (default: $TAGJUMP_HOME/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find a tag and jump to it
    #[command(visible_alias = "f")]
    Find(FindArgs),

    /// Print the raw index lines matching a tag
    #[command(visible_alias = "s")]
    Search(SearchArgs),

    /// Show the metadata header of a tag file
    Header(HeaderArgs),

    /// Go back to the previous location
    #[command(visible_alias = "b")]
    Back(HistoryArgs),

    /// Go forward to the next location
    Forward(HistoryArgs),

    /// Show the current location
    Current(HistoryArgs),

    /// List the recorded locations
    History(HistoryArgs),

    /// Forget all recorded locations
    Reset,
}

/// Which tag files to use and how to compare names
#[derive(Args, Debug, Clone, Default)]
pub struct TagSourceArgs {
    /// Tag file to search (repeatable; default: discovered)
    #[arg(short = 't', long = "tags")]
    pub tags: Vec<PathBuf>,

    /// Compare tag names case-insensitively
    #[arg(short = 'i', long)]
    pub ignore_case: bool,
}

/// Arguments for the find command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:
    tagjump find main                 Jump to main
    tagjump find main --from a.c:42   Record a.c:42 as the departure point
    tagjump find init -s 2            Take the second match directly
    tagjump find init --interactive   Choose among matches with a menu")]
pub struct FindArgs {
    /// Tag name
    pub name: String,

    #[command(flatten)]
    pub source: TagSourceArgs,

    /// Where you are jumping from, as PATH or PATH:LINE
    #[arg(long)]
    pub from: Option<String>,

    /// Pick the Nth match when there are several
    #[arg(short = 's', long)]
    pub select: Option<usize>,

    /// Choose among several matches interactively
    #[arg(long, conflicts_with = "select")]
    pub interactive: bool,

    /// JSON output
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the search command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Tag name
    pub name: String,

    #[command(flatten)]
    pub source: TagSourceArgs,

    /// JSON output
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the header command
#[derive(Parser, Debug)]
pub struct HeaderArgs {
    /// Tag file
    pub file: PathBuf,

    /// JSON output
    #[arg(long)]
    pub json: bool,
}

/// Arguments for history commands
#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// JSON output
    #[arg(long)]
    pub json: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Human
        }
    }
}
