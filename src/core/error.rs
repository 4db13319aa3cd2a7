//! Error types for tagjump

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using tagjump's Error
pub type Result<T> = std::result::Result<T, Error>;

/// tagjump error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Index file is not sorted, binary search refused: {path}")]
    UnsortedIndex { path: PathBuf },

    #[error("Malformed tag record: {line}")]
    MalformedRecord { line: String },

    #[error("Tag not found: {name}")]
    TagNotFound { name: String },

    #[error("Could not open {path}: {reason}")]
    DocumentOpenFailed { path: PathBuf, reason: String },

    #[error("Pattern {pattern} not found in {path}")]
    PatternNotFound { path: PathBuf, pattern: String },

    #[error("Already at the oldest history entry")]
    HistoryAtBeginning,

    #[error("Already at the newest history entry")]
    HistoryAtEnd,

    #[error("Navigation history is empty")]
    HistoryEmpty,

    #[error(
        "Query of {query_len} bytes cannot be sampled within {max_chunk} byte probes (enlarge search.max_chunk_size)"
    )]
    ChunkTooSmall { query_len: usize, max_chunk: usize },

    #[error("No tag files found (looked for {names})")]
    NoTagFiles { names: String },

    #[error("Match {index} does not exist (found {count})")]
    InvalidSelection { index: usize, count: usize },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Whether this is one of the history boundary conditions
    pub fn is_history_boundary(&self) -> bool {
        matches!(
            self,
            Error::HistoryAtBeginning | Error::HistoryAtEnd | Error::HistoryEmpty
        )
    }
}
