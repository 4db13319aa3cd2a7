//! Tag File Header
//!
//! Parses the optional `!_TAG_` pseudo-tag lines at the start of an index
//! file. The sort mode declared here decides whether the file may be
//! binary searched and whether comparisons fold case.
//!
//! @module tags/header

use std::fs::File;
use std::io::Read;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use lru::LruCache;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::config::HEADER_READ_LIMIT;
use crate::core::error::Result;

/// Placeholder for generator fields a file does not declare
pub const UNKNOWN_GENERATOR: &str = "unknown";

/// `!_TAG_<FIELD><whitespace><value>`, value running to the next tab
static HEADER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^!_TAG_(FILE_FORMAT|FILE_SORTED|PROGRAM_AUTHOR|PROGRAM_NAME|PROGRAM_URL|PROGRAM_VERSION)[ \t]+([^\t\r\n]*)")
        .unwrap()
});

// =============================================================================
// SORT MODE
// =============================================================================

/// How the generator ordered the records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortMode {
    /// `0`: records in arbitrary order, binary search forbidden
    Unsorted,
    /// `1`: byte-wise sorted
    Sorted,
    /// `2`: sorted with case folded
    SortedFoldCase,
}

impl SortMode {
    fn from_field(value: &str) -> Option<Self> {
        match value.trim() {
            "0" => Some(Self::Unsorted),
            "1" => Some(Self::Sorted),
            "2" => Some(Self::SortedFoldCase),
            _ => None,
        }
    }

    /// Whether the records may be binary searched
    pub fn is_sorted(self) -> bool {
        self != Self::Unsorted
    }
}

// =============================================================================
// HEADER
// =============================================================================

/// Metadata parsed from the start of an index file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFileHeader {
    pub path: PathBuf,
    /// File size at parse time
    pub size_bytes: u64,
    /// `!_TAG_FILE_FORMAT`, `None` when absent or not a number
    pub format_version: Option<u32>,
    pub sorted_mode: SortMode,
    pub generator_name: String,
    pub generator_version: String,
    pub generator_author: String,
    pub generator_url: String,
}

impl TagFileHeader {
    /// Read the header of the index file at `path`.
    ///
    /// Only the first [`HEADER_READ_LIMIT`] bytes are examined. A file with
    /// no header lines yields the defaults: unknown format, `Sorted`, and
    /// placeholder generator fields.
    pub fn parse(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let size_bytes = file.metadata()?.len();

        let mut buf = Vec::with_capacity(HEADER_READ_LIMIT);
        file.take(HEADER_READ_LIMIT as u64).read_to_end(&mut buf)?;

        let header = Self::from_bytes(path, size_bytes, &buf);
        debug!(
            path = %path.display(),
            sorted = ?header.sorted_mode,
            format = ?header.format_version,
            "Parsed tag file header"
        );
        Ok(header)
    }

    /// Parse header fields out of the leading bytes of a file
    pub fn from_bytes(path: &Path, size_bytes: u64, bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);

        let mut header = Self {
            path: path.to_path_buf(),
            size_bytes,
            format_version: None,
            sorted_mode: SortMode::Sorted,
            generator_name: UNKNOWN_GENERATOR.to_string(),
            generator_version: UNKNOWN_GENERATOR.to_string(),
            generator_author: UNKNOWN_GENERATOR.to_string(),
            generator_url: UNKNOWN_GENERATOR.to_string(),
        };

        for caps in HEADER_LINE.captures_iter(&text) {
            let value = caps[2].trim_end();
            match &caps[1] {
                "FILE_FORMAT" => header.format_version = value.parse().ok(),
                "FILE_SORTED" => match SortMode::from_field(value) {
                    Some(mode) => header.sorted_mode = mode,
                    None => warn!(
                        path = %path.display(),
                        value,
                        "Unrecognized !_TAG_FILE_SORTED value, assuming sorted"
                    ),
                },
                "PROGRAM_AUTHOR" => header.generator_author = value.to_string(),
                "PROGRAM_NAME" => header.generator_name = value.to_string(),
                "PROGRAM_URL" => header.generator_url = value.to_string(),
                "PROGRAM_VERSION" => header.generator_version = value.to_string(),
                _ => {}
            }
        }

        header
    }

    /// Whether lookups against this file must fold case
    ///
    /// A file sorted with folded case can only be searched with folded
    /// comparisons, whatever the caller asked for.
    pub fn folds_case(&self, requested: bool) -> bool {
        requested || self.sorted_mode == SortMode::SortedFoldCase
    }

    /// Whether the records are in order under the given comparison
    ///
    /// Binary search and the early stop of the confirmation scan are only
    /// valid when this holds. A byte-sorted file is out of order once case
    /// is folded: `Name` and `name` land in different runs.
    pub fn ordered_for(&self, fold: bool) -> bool {
        match self.sorted_mode {
            SortMode::Unsorted => false,
            SortMode::Sorted => !fold,
            SortMode::SortedFoldCase => true,
        }
    }
}

// =============================================================================
// HEADER CACHE
// =============================================================================

/// Parsed headers keyed by index file path
///
/// Headers are parsed once and reused until explicitly reloaded.
pub struct HeaderCache {
    cache: LruCache<PathBuf, TagFileHeader>,
}

impl HeaderCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Get the cached header for `path`, parsing it on first use
    pub fn get(&mut self, path: &Path) -> Result<&TagFileHeader> {
        self.cache
            .try_get_or_insert(path.to_path_buf(), || TagFileHeader::parse(path))
    }

    /// Drop the cached header for `path` and parse it again
    pub fn reload(&mut self, path: &Path) -> Result<&TagFileHeader> {
        self.cache.pop(path);
        self.get(path)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for HeaderCache {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EXUBERANT: &str = "!_TAG_FILE_FORMAT\t2\t/extended format; --format=1 will not append ;\" to lines/\n\
!_TAG_FILE_SORTED\t1\t/0=unsorted, 1=sorted, 2=foldcase/\n\
!_TAG_PROGRAM_AUTHOR\tDarren Hiebert\t/dhiebert@users.sourceforge.net/\n\
!_TAG_PROGRAM_NAME\tExuberant Ctags\t//\n\
!_TAG_PROGRAM_URL\thttp://ctags.sourceforge.net\t/official site/\n\
!_TAG_PROGRAM_VERSION\t5.8\t//\n\
VALAMASK\tsrc/m/gec63.h\t59;\"\td\n";

    #[test]
    fn test_parse_full_header() {
        let header = TagFileHeader::from_bytes(Path::new("tags"), 0, EXUBERANT.as_bytes());
        assert_eq!(header.format_version, Some(2));
        assert_eq!(header.sorted_mode, SortMode::Sorted);
        assert_eq!(header.generator_name, "Exuberant Ctags");
        assert_eq!(header.generator_version, "5.8");
        assert_eq!(header.generator_author, "Darren Hiebert");
        assert_eq!(header.generator_url, "http://ctags.sourceforge.net");
    }

    #[test]
    fn test_missing_header_uses_defaults() {
        let header = TagFileHeader::from_bytes(
            Path::new("tags"),
            0,
            b"main\tmain.c\t/^int main(void)$/;\"\tf\n",
        );
        assert_eq!(header.format_version, None);
        assert_eq!(header.sorted_mode, SortMode::Sorted);
        assert_eq!(header.generator_name, UNKNOWN_GENERATOR);
        assert_eq!(header.generator_version, UNKNOWN_GENERATOR);
    }

    #[test]
    fn test_sort_modes() {
        for (value, mode) in [
            ("0", SortMode::Unsorted),
            ("1", SortMode::Sorted),
            ("2", SortMode::SortedFoldCase),
        ] {
            let text = format!("!_TAG_FILE_SORTED\t{}\t//\n", value);
            let header = TagFileHeader::from_bytes(Path::new("tags"), 0, text.as_bytes());
            assert_eq!(header.sorted_mode, mode);
        }
    }

    #[test]
    fn test_fold_case_forced_by_sort_mode() {
        let text = "!_TAG_FILE_SORTED\t2\t//\n";
        let header = TagFileHeader::from_bytes(Path::new("tags"), 0, text.as_bytes());
        assert!(header.folds_case(false));

        let plain = TagFileHeader::from_bytes(Path::new("tags"), 0, b"");
        assert!(!plain.folds_case(false));
        assert!(plain.folds_case(true));
    }

    #[test]
    fn test_ordered_for_fold_policy() {
        let header = |mode: &str| {
            let text = format!("!_TAG_FILE_SORTED\t{}\t//\n", mode);
            TagFileHeader::from_bytes(Path::new("tags"), 0, text.as_bytes())
        };
        assert!(header("2").ordered_for(true));
        assert!(header("1").ordered_for(false));
        assert!(!header("1").ordered_for(true));
        assert!(!header("0").ordered_for(false));
    }

    #[test]
    fn test_only_first_kilobyte_is_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tags");
        let mut content = String::new();
        while content.len() < HEADER_READ_LIMIT + 10 {
            content.push_str("aaaa\tfile.c\t1;\"\n");
        }
        content.push_str("!_TAG_FILE_SORTED\t0\t//\n");
        std::fs::write(&path, &content).unwrap();

        let header = TagFileHeader::parse(&path).unwrap();
        assert_eq!(header.sorted_mode, SortMode::Sorted);
        assert_eq!(header.size_bytes, content.len() as u64);
    }

    #[test]
    fn test_cache_reload_picks_up_changes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tags");
        std::fs::write(&path, "!_TAG_FILE_SORTED\t1\t//\n").unwrap();

        let mut cache = HeaderCache::new(4);
        assert_eq!(cache.get(&path).unwrap().sorted_mode, SortMode::Sorted);

        std::fs::write(&path, "!_TAG_FILE_SORTED\t0\t//\n").unwrap();
        assert_eq!(cache.get(&path).unwrap().sorted_mode, SortMode::Sorted);
        assert_eq!(cache.reload(&path).unwrap().sorted_mode, SortMode::Unsorted);
        assert_eq!(cache.len(), 1);
    }
}
