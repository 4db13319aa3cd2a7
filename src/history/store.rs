//! On-disk persistence for navigation history

use super::NavigationHistory;
use crate::core::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// JSON file holding one history between invocations
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored history, or an empty one if nothing was saved yet
    pub fn load(&self, max_entries: usize) -> Result<NavigationHistory> {
        if !self.path.exists() {
            return Ok(NavigationHistory::with_limit(max_entries));
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut history: NavigationHistory = serde_json::from_str(&content)?;
        history.set_limit(max_entries);
        debug!(path = %self.path.display(), entries = history.len(), "Loaded history");
        Ok(history)
    }

    /// Save history to disk
    pub fn save(&self, history: &NavigationHistory) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(history)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{Direction, LocationRef};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = HistoryStore::new(temp.path().join("none.json"));
        assert!(store.load(10).unwrap().is_empty());
    }

    #[test]
    fn test_save_load_keeps_current() {
        let temp = TempDir::new().unwrap();
        let store = HistoryStore::new(temp.path().join("history").join("h.json"));

        let mut history = NavigationHistory::new();
        history.record(LocationRef::File {
            path: PathBuf::from("a.c"),
        });
        history.record(LocationRef::Position {
            path: PathBuf::from("b.c"),
            offset: 120,
            line: 7,
        });
        history.jump(Direction::Back).unwrap();
        store.save(&history).unwrap();

        let mut loaded = store.load(0).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.current().unwrap().key, 1);
        assert_eq!(
            loaded.jump(Direction::Forward).unwrap().location.path(),
            Path::new("b.c")
        );
    }
}
