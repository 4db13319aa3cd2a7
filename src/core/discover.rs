//! Tag file discovery

use crate::core::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve the configured tag file entries into existing index files.
///
/// Entries with glob metacharacters are expanded relative to `start`.
/// Entries naming an existing file (relative to `start`, or absolute) are
/// used as-is. When `walk_up` is set, plain file names are additionally
/// looked up in every ancestor of `start`, nearest directory first.
pub fn discover_tag_files(start: &Path, entries: &[String], walk_up: bool) -> Result<Vec<PathBuf>> {
    let start = if start.is_file() {
        start.parent().unwrap_or(start)
    } else {
        start
    };

    let mut found: Vec<PathBuf> = Vec::new();

    for entry in entries.iter().filter(|e| is_glob(e)) {
        let pattern = start.join(entry);
        let paths = glob::glob(&pattern.to_string_lossy()).map_err(|e| Error::ConfigError {
            message: format!("Invalid tag file pattern '{}': {}", entry, e),
        })?;
        for path in paths.flatten() {
            push_unique(&mut found, path);
        }
    }

    let plain: Vec<&String> = entries.iter().filter(|e| !is_glob(e)).collect();

    if walk_up {
        let mut current = Some(start.to_path_buf());
        while let Some(dir) = current {
            for name in &plain {
                let candidate = dir.join(name.as_str());
                if candidate.is_file() {
                    push_unique(&mut found, candidate);
                }
            }
            current = dir.parent().map(Path::to_path_buf);
        }
    } else {
        for name in &plain {
            let candidate = start.join(name.as_str());
            if candidate.is_file() {
                push_unique(&mut found, candidate);
            }
        }
    }

    if found.is_empty() {
        return Err(Error::NoTagFiles {
            names: entries.join(", "),
        });
    }

    debug!(count = found.len(), start = %start.display(), "Discovered tag files");
    Ok(found)
}

fn is_glob(entry: &str) -> bool {
    entry.contains(&['*', '?', '['][..])
}

fn push_unique(found: &mut Vec<PathBuf>, path: PathBuf) {
    // Two names can resolve to the same file on case-insensitive filesystems
    let key = path.canonicalize().unwrap_or_else(|_| path.clone());
    let seen = found
        .iter()
        .any(|p| p.canonicalize().unwrap_or_else(|_| p.clone()) == key);
    if !seen {
        found.push(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_walks_up_nearest_first() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("tags"), "").unwrap();
        let nested = temp.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join("src").join("tags"), "").unwrap();

        let found = discover_tag_files(&nested, &names(&["tags"]), true).unwrap();
        assert_eq!(
            found,
            vec![
                temp.path().join("src").join("tags"),
                temp.path().join("tags")
            ]
        );
    }

    #[test]
    fn test_no_walk_only_checks_start() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("tags"), "").unwrap();
        let nested = temp.path().join("src");
        std::fs::create_dir_all(&nested).unwrap();

        let result = discover_tag_files(&nested, &names(&["tags"]), false);
        assert!(matches!(result, Err(Error::NoTagFiles { .. })));
    }

    #[test]
    fn test_glob_entries_expand() {
        let temp = TempDir::new().unwrap();
        for lib in ["alpha", "beta"] {
            let dir = temp.path().join("vendor").join(lib);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("tags"), "").unwrap();
        }

        let found = discover_tag_files(temp.path(), &names(&["vendor/*/tags"]), false).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("vendor/alpha/tags"));
        assert!(found[1].ends_with("vendor/beta/tags"));
    }
}
