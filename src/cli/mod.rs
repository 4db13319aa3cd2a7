//! CLI command definitions and handlers

pub mod args;
pub mod find;
pub mod header;
pub mod history;
pub mod search;

pub use args::{
    Cli, Commands, FindArgs, HeaderArgs, HistoryArgs, OutputFormat, SearchArgs, TagSourceArgs,
};

use crate::core::config::Config;
use crate::core::discover::discover_tag_files;
use crate::core::error::Result;
use crate::history::store::HistoryStore;
use crate::history::NavigationHistory;
use crate::lookup::Lookup;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Per-invocation state shared by the command handlers
pub struct Session {
    pub config: Config,
    pub cwd: PathBuf,
}

impl Session {
    /// Load configuration from `config_path`, or the default location
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        let cwd = env::current_dir()?;
        Ok(Self { config, cwd })
    }

    /// Explicit `-t` files win over configured and discovered ones
    pub fn tag_files(&self, explicit: &[PathBuf]) -> Result<Vec<PathBuf>> {
        if !explicit.is_empty() {
            return Ok(explicit.to_vec());
        }
        let lookup = &self.config.lookup;
        let files = discover_tag_files(&self.cwd, &lookup.tag_files, lookup.discover)?;
        debug!(count = files.len(), "Using discovered tag files");
        Ok(files)
    }

    fn history_store(&self) -> Result<HistoryStore> {
        Ok(HistoryStore::new(Config::history_path(&self.cwd)?))
    }

    /// History for this working directory, empty when persistence is off
    pub fn load_history(&self) -> Result<NavigationHistory> {
        let limit = self.config.history.max_entries;
        if !self.config.history.persist {
            return Ok(NavigationHistory::with_limit(limit));
        }
        self.history_store()?.load(limit)
    }

    pub fn save_history(&self, history: &NavigationHistory) -> Result<()> {
        if !self.config.history.persist {
            return Ok(());
        }
        let store = self.history_store()?;
        store.save(history)?;
        debug!(path = %store.path().display(), entries = history.len(), "Saved history");
        Ok(())
    }

    /// A lookup wired to the stored history
    pub fn lookup(&self, history: NavigationHistory, ignore_case: bool) -> Lookup {
        Lookup::new(&self.config)
            .with_history(history.into_shared())
            .with_case_fold(self.config.lookup.case_fold || ignore_case)
    }
}
