//! Navigation History
//!
//! Locations visited while following tag lookups, traversable in both
//! directions. Entries live in an arena ordered by their sequence key;
//! moving back or forward means finding the entry whose key is one less or
//! one more than the current one. Recording always appends and never
//! rewrites or deduplicates earlier entries.
//!
//! @module history

pub mod store;

pub use store::HistoryStore;

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{Error, Result};

/// History shared between callers that may run concurrently
pub type SharedHistory = Arc<Mutex<NavigationHistory>>;

// =============================================================================
// LOCATION REFERENCES
// =============================================================================

/// A place the user was, as handed over by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationRef {
    /// A concrete position in a document
    Position {
        path: PathBuf,
        /// Byte offset of the cursor
        offset: u64,
        /// 1-based line of the cursor
        line: u32,
    },
    /// A document whose position is not known
    File { path: PathBuf },
}

impl LocationRef {
    pub fn path(&self) -> &Path {
        match self {
            LocationRef::Position { path, .. } | LocationRef::File { path } => path,
        }
    }
}

impl fmt::Display for LocationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationRef::Position { path, line, .. } => write!(f, "{}:{}", path.display(), line),
            LocationRef::File { path } => write!(f, "{}", path.display()),
        }
    }
}

/// One recorded location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    /// Strictly increasing, never reused within a run
    pub key: u64,
    pub location: LocationRef,
    pub recorded_at: DateTime<Utc>,
}

/// Which way to move through the history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// To the entry recorded just before the current one
    Back,
    /// To the entry recorded just after the current one
    Forward,
    /// Stay on the current entry
    Stay,
}

// =============================================================================
// HISTORY
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigationHistory {
    entries: VecDeque<NavigationEntry>,
    /// Index into `entries`
    current: Option<usize>,
    /// Oldest entries are evicted past this many (0 = unbounded)
    #[serde(default)]
    max_entries: usize,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History that evicts its oldest entries beyond `max_entries`
    pub fn with_limit(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::default()
        }
    }

    pub fn set_limit(&mut self, max_entries: usize) {
        self.max_entries = max_entries;
        self.enforce_limit();
    }

    /// Append `location` and make it current, returning its key
    pub fn record(&mut self, location: LocationRef) -> u64 {
        let key = self.entries.back().map_or(0, |e| e.key) + 1;
        debug!(key, location = %location, "Recording history entry");

        self.entries.push_back(NavigationEntry {
            key,
            location,
            recorded_at: Utc::now(),
        });
        self.current = Some(self.entries.len() - 1);
        self.enforce_limit();
        key
    }

    /// The current entry, if anything has been recorded
    pub fn current(&self) -> Option<&NavigationEntry> {
        self.current.and_then(|idx| self.entries.get(idx))
    }

    /// Move the current entry one step in `direction`
    pub fn jump(&mut self, direction: Direction) -> Result<&NavigationEntry> {
        let idx = self.current.ok_or(Error::HistoryEmpty)?;
        let key = self.entries[idx].key;

        let target = match direction {
            Direction::Stay => idx,
            Direction::Back => key
                .checked_sub(1)
                .and_then(|k| self.position_of(k))
                .ok_or(Error::HistoryAtBeginning)?,
            Direction::Forward => self.position_of(key + 1).ok_or(Error::HistoryAtEnd)?,
        };

        if target != idx {
            debug!(from = key, to = self.entries[target].key, ?direction, "History jump");
        }
        self.current = Some(target);
        Ok(&self.entries[target])
    }

    /// Forget every entry
    pub fn reset(&mut self) {
        debug!(dropped = self.entries.len(), "Resetting history");
        self.entries.clear();
        self.current = None;
    }

    /// Entries oldest first
    pub fn entries(&self) -> impl Iterator<Item = &NavigationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wrap for use from several callers
    pub fn into_shared(self) -> SharedHistory {
        Arc::new(Mutex::new(self))
    }

    fn position_of(&self, key: u64) -> Option<usize> {
        self.entries.binary_search_by_key(&key, |e| e.key).ok()
    }

    fn enforce_limit(&mut self) {
        if self.max_entries == 0 {
            return;
        }
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
            self.current = self.current.map(|idx| idx.saturating_sub(1));
        }
    }
}
