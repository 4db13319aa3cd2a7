//! Configuration management

use crate::core::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lookup: LookupConfig,
    pub search: SearchConfig,
    pub history: HistoryConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Tag file names, paths or glob patterns
    pub tag_files: Vec<String>,
    /// Walk up from the working directory looking for `tag_files`
    pub discover: bool,
    /// Fold case when comparing tag names
    pub case_fold: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Binary search block size (bytes)
    pub block_size: u64,
    /// Initial probe size (bytes)
    pub chunk_size: usize,
    /// Probe size ceiling when lines are long (bytes)
    pub max_chunk_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum entries kept (0 = unbounded)
    pub max_entries: usize,
    /// Save history between invocations
    pub persist: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Parsed tag file headers kept in memory
    pub header_entries: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            tag_files: vec!["tags".to_string(), "TAGS".to_string()],
            discover: true,
            case_fold: false,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_chunk_size: MAX_CHUNK_SIZE,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            persist: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { header_entries: 64 }
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load and validate configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject search parameters the probing loop cannot work with
    pub fn validate(&self) -> Result<()> {
        let search = &self.search;
        if search.block_size == 0 {
            return Err(Error::ConfigError {
                message: "search.block_size must be greater than zero".to_string(),
            });
        }
        if search.chunk_size == 0 {
            return Err(Error::ConfigError {
                message: "search.chunk_size must be greater than zero".to_string(),
            });
        }
        if search.chunk_size > search.max_chunk_size {
            return Err(Error::ConfigError {
                message: format!(
                    "search.chunk_size ({}) exceeds search.max_chunk_size ({})",
                    search.chunk_size, search.max_chunk_size
                ),
            });
        }
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = Self::tagjump_home()?;
        Ok(home.join("config.toml"))
    }

    /// Get the tagjump home directory
    pub fn tagjump_home() -> Result<PathBuf> {
        // Check TAGJUMP_HOME env var first
        if let Ok(home) = std::env::var("TAGJUMP_HOME") {
            return Ok(PathBuf::from(home));
        }

        // Use XDG directories
        ProjectDirs::from("dev", "tagjump", "tagjump")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| Error::ConfigError {
                message: "Could not determine tagjump home directory".to_string(),
            })
    }

    /// Get the history file for a working directory
    pub fn history_path(scope: &Path) -> Result<PathBuf> {
        let home = Self::tagjump_home()?;
        let hash = xxhash_rust::xxh3::xxh3_64(scope.to_string_lossy().as_bytes());
        Ok(home.join("history").join(format!("{:016x}.json", hash)))
    }
}

pub const DEFAULT_BLOCK_SIZE: u64 = 4096;
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
pub const MAX_CHUNK_SIZE: usize = 16384;

/// Bytes read from the start of a tag file when looking for `!_TAG_` lines
pub const HEADER_READ_LIMIT: usize = 1024;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.block_size, 4096);
        assert_eq!(config.lookup.tag_files, vec!["tags", "TAGS"]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[search]\nblock_size = 512\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.search.block_size, 512);
        assert_eq!(config.search.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(config.history.persist);
    }

    #[test]
    fn test_chunk_above_ceiling_rejected() {
        let mut config = Config::default();
        config.search.chunk_size = 32768;
        assert!(matches!(
            config.validate(),
            Err(Error::ConfigError { .. })
        ));
    }

    #[test]
    fn test_history_path_is_scoped() {
        let a = Config::history_path(Path::new("/work/a")).unwrap();
        let b = Config::history_path(Path::new("/work/b")).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("json"));
    }
}
