//! Lookup Orchestration
//!
//! Runs tag searches over a list of index files, decides between a direct
//! jump and a list of candidates, resolves the chosen record through the
//! host and records the jump in the navigation history.
//!
//! @module lookup

pub mod host;

pub use host::{FsDocument, FsHost, Host, Position};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::core::config::{Config, SearchConfig};
use crate::core::error::{Error, Result};
use crate::history::{Direction, LocationRef, NavigationEntry, NavigationHistory, SharedHistory};
use crate::tags::{parse_records, HeaderCache, Location, TagFileHeader, TagIndexSearch, TagRecord};

// =============================================================================
// RESULT TYPES
// =============================================================================

/// A record together with the index file it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagMatch {
    pub index_file: PathBuf,
    pub record: TagRecord,
}

impl TagMatch {
    /// The file the record points at, relative paths resolved against the
    /// index file's directory
    pub fn target_path(&self) -> PathBuf {
        let base = self.index_file.parent().unwrap_or_else(|| Path::new("."));
        self.record.resolved_path(base)
    }
}

/// Where a resolved jump landed
#[derive(Debug, Clone, Serialize)]
pub struct Target {
    pub tag: TagMatch,
    pub arrival: LocationRef,
}

/// What a lookup produced
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Exactly one record, already resolved and navigated to
    SingleMatch { target: Target },
    /// Several records, in index file order, awaiting a choice
    MultipleMatches { matches: Vec<TagMatch> },
    NotFound { query: String },
}

// =============================================================================
// LOOKUP
// =============================================================================

pub struct Lookup {
    params: SearchConfig,
    case_fold: bool,
    headers: HeaderCache,
    history: SharedHistory,
}

impl Lookup {
    pub fn new(config: &Config) -> Self {
        Self {
            params: config.search,
            case_fold: config.lookup.case_fold,
            headers: HeaderCache::new(config.cache.header_entries),
            history: NavigationHistory::with_limit(config.history.max_entries).into_shared(),
        }
    }

    /// Use an existing history, e.g. one loaded from disk
    pub fn with_history(mut self, history: SharedHistory) -> Self {
        self.history = history;
        self
    }

    pub fn with_case_fold(mut self, case_fold: bool) -> Self {
        self.case_fold = case_fold;
        self
    }

    pub fn history(&self) -> SharedHistory {
        Arc::clone(&self.history)
    }

    /// Parsed header for `index_file`, from cache when possible
    pub fn header(&mut self, index_file: &Path) -> Result<&TagFileHeader> {
        self.headers.get(index_file)
    }

    /// Re-read the header of an index file that changed on disk
    pub fn reload_header(&mut self, index_file: &Path) -> Result<&TagFileHeader> {
        self.headers.reload(index_file)
    }

    /// Raw matching lines from one index file
    ///
    /// A cached header whose recorded size no longer matches the file is
    /// parsed again first.
    pub fn search_lines(&mut self, query: &str, index_file: &Path) -> Result<Vec<String>> {
        let params = self.params;
        let case_fold = self.case_fold;

        let on_disk = std::fs::metadata(index_file)?.len();
        if self.headers.get(index_file)?.size_bytes != on_disk {
            debug!(
                path = %index_file.display(),
                size = on_disk,
                "Tag file changed, reloading header"
            );
            self.reload_header(index_file)?;
        }

        let header = self.headers.get(index_file)?;
        TagIndexSearch::new(header, params).search(query, case_fold)
    }

    /// Forget every cached header
    pub fn clear_headers(&mut self) {
        self.headers.clear();
    }

    /// Valid records for `query` from every index file, in the order given
    pub fn search(&mut self, query: &str, index_files: &[PathBuf]) -> Result<Vec<TagMatch>> {
        let mut matches = Vec::new();
        for index_file in index_files {
            let lines = self.search_lines(query, index_file)?;
            matches.extend(parse_records(&lines).into_iter().map(|record| TagMatch {
                index_file: index_file.clone(),
                record,
            }));
        }
        debug!(
            query,
            files = index_files.len(),
            cached_headers = self.headers.len(),
            matches = matches.len(),
            "Lookup search"
        );
        Ok(matches)
    }

    /// Look `query` up and jump straight there if it is unambiguous
    pub fn find_tag<H: Host>(
        &mut self,
        host: &mut H,
        query: &str,
        index_files: &[PathBuf],
    ) -> Result<Outcome> {
        let mut matches = self.search(query, index_files)?;

        match matches.len() {
            0 => {
                info!(query, "Tag not found");
                Ok(Outcome::NotFound {
                    query: query.to_string(),
                })
            }
            1 => {
                let tag = matches.remove(0);
                let target = self.resolve_and_navigate(host, &tag)?;
                Ok(Outcome::SingleMatch { target })
            }
            _ => Ok(Outcome::MultipleMatches { matches }),
        }
    }

    /// Open the record's file through the host, move to its location and
    /// record both the departure and the arrival
    pub fn resolve_and_navigate<H: Host>(
        &mut self,
        host: &mut H,
        tag: &TagMatch,
    ) -> Result<Target> {
        let departure = host.current_cursor_reference();
        let path = tag.target_path();

        let mut doc = host
            .open_document(&path)
            .map_err(|e| Error::DocumentOpenFailed {
                path: path.clone(),
                reason: format!("{:#}", e),
            })?;

        let position = match &tag.record.location {
            Location::LineNumber(line) => host.goto_line(&mut doc, *line),
            Location::SearchPattern(pattern) => {
                let regex = pattern.compile()?;
                host.search_forward(&mut doc, &regex)
                    .ok_or_else(|| Error::PatternNotFound {
                        path: path.clone(),
                        pattern: pattern.host_pattern(),
                    })?
            }
        };

        let arrival = host.record_cursor_reference(&doc, position);
        {
            let mut history = self.history.lock();
            history.record(departure);
            history.record(arrival.clone());
        }

        info!(tag = %tag.record.tag_name, arrival = %arrival, "Jumped to tag");
        Ok(Target {
            tag: tag.clone(),
            arrival,
        })
    }

    pub fn history_back<H: Host>(&mut self, host: &mut H) -> Result<NavigationEntry> {
        self.history_jump(host, Direction::Back)
    }

    pub fn history_forward<H: Host>(&mut self, host: &mut H) -> Result<NavigationEntry> {
        self.history_jump(host, Direction::Forward)
    }

    /// Return to the current entry
    pub fn history_current<H: Host>(&mut self, host: &mut H) -> Result<NavigationEntry> {
        self.history_jump(host, Direction::Stay)
    }

    pub fn history_reset(&mut self) {
        self.history.lock().reset();
    }

    fn history_jump<H: Host>(
        &mut self,
        host: &mut H,
        direction: Direction,
    ) -> Result<NavigationEntry> {
        let entry = self.history.lock().jump(direction)?.clone();
        host.visit(&entry.location)
            .map_err(|e| Error::DocumentOpenFailed {
                path: entry.location.path().to_path_buf(),
                reason: format!("{:#}", e),
            })?;
        Ok(entry)
    }
}
