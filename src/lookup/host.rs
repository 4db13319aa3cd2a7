//! Host collaborators
//!
//! The lookup core never touches documents itself. It asks a [`Host`] to
//! open files, move the cursor and hand back location references.
//! [`FsHost`] implements this over plain files for the command line.

use crate::history::LocationRef;
use anyhow::{bail, Context};
use regex::Regex;
use std::path::{Path, PathBuf};

/// A cursor position inside an open document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 1-based line
    pub line: u32,
    /// Byte offset of the start of `line`
    pub offset: u64,
}

/// The editing environment driving lookups
pub trait Host {
    type Document;

    /// Open `path` for navigation
    fn open_document(&mut self, path: &Path) -> anyhow::Result<Self::Document>;

    /// Move to a 1-based line
    fn goto_line(&mut self, doc: &mut Self::Document, line: u32) -> Position;

    /// Search from the start of the document for the first line matching `pattern`
    fn search_forward(&mut self, doc: &mut Self::Document, pattern: &Regex) -> Option<Position>;

    /// Turn a position in `doc` into a reference the history can keep
    fn record_cursor_reference(&mut self, doc: &Self::Document, position: Position) -> LocationRef;

    /// Where the cursor is right now
    fn current_cursor_reference(&self) -> LocationRef;

    /// Go back to a previously recorded location
    fn visit(&mut self, location: &LocationRef) -> anyhow::Result<()>;
}

// =============================================================================
// FILESYSTEM HOST
// =============================================================================

/// A document read whole from disk
#[derive(Debug)]
pub struct FsDocument {
    pub path: PathBuf,
    text: String,
}

impl FsDocument {
    /// Lines with the byte offset each starts at
    fn lines(&self) -> impl Iterator<Item = (u64, &str)> {
        let mut offset = 0u64;
        self.text.split_inclusive('\n').map(move |raw| {
            let start = offset;
            offset += raw.len() as u64;
            let line = raw.trim_end_matches('\n');
            (start, line.strip_suffix('\r').unwrap_or(line))
        })
    }
}

/// Host over the local filesystem, tracking a single cursor
pub struct FsHost {
    cursor: LocationRef,
}

impl FsHost {
    pub fn new(cursor: LocationRef) -> Self {
        Self { cursor }
    }

    pub fn cursor(&self) -> &LocationRef {
        &self.cursor
    }

    fn move_to(&mut self, doc: &FsDocument, position: Position) {
        self.cursor = LocationRef::Position {
            path: doc.path.clone(),
            offset: position.offset,
            line: position.line,
        };
    }
}

impl Host for FsHost {
    type Document = FsDocument;

    fn open_document(&mut self, path: &Path) -> anyhow::Result<FsDocument> {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        Ok(FsDocument {
            path: path.to_path_buf(),
            text: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    fn goto_line(&mut self, doc: &mut FsDocument, line: u32) -> Position {
        let target = line.max(1);
        // Past the end lands on the last line
        let mut position = Position { line: 1, offset: 0 };
        for (idx, (offset, _)) in doc.lines().enumerate() {
            position = Position {
                line: idx as u32 + 1,
                offset,
            };
            if position.line == target {
                break;
            }
        }
        self.move_to(doc, position);
        position
    }

    fn search_forward(&mut self, doc: &mut FsDocument, pattern: &Regex) -> Option<Position> {
        let position = doc
            .lines()
            .enumerate()
            .find(|(_, (_, line))| pattern.is_match(line))
            .map(|(idx, (offset, _))| Position {
                line: idx as u32 + 1,
                offset,
            })?;
        self.move_to(doc, position);
        Some(position)
    }

    fn record_cursor_reference(&mut self, doc: &FsDocument, position: Position) -> LocationRef {
        LocationRef::Position {
            path: doc.path.clone(),
            offset: position.offset,
            line: position.line,
        }
    }

    fn current_cursor_reference(&self) -> LocationRef {
        self.cursor.clone()
    }

    fn visit(&mut self, location: &LocationRef) -> anyhow::Result<()> {
        let path = location.path();
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("{} no longer exists", path.display()))?;
        if let LocationRef::Position { offset, .. } = location {
            if *offset > metadata.len() {
                bail!(
                    "{} is shorter than the recorded offset {}",
                    path.display(),
                    offset
                );
            }
        }
        self.cursor = location.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn doc(text: &str) -> FsDocument {
        FsDocument {
            path: PathBuf::from("mem.c"),
            text: text.to_string(),
        }
    }

    fn host() -> FsHost {
        FsHost::new(LocationRef::File {
            path: PathBuf::from("."),
        })
    }

    #[test]
    fn test_goto_line_offsets() {
        let mut host = host();
        let mut d = doc("one\ntwo\r\nthree\n");
        assert_eq!(host.goto_line(&mut d, 1), Position { line: 1, offset: 0 });
        assert_eq!(host.goto_line(&mut d, 3), Position { line: 3, offset: 9 });
        assert_eq!(host.goto_line(&mut d, 99), Position { line: 3, offset: 9 });
        assert_eq!(host.goto_line(&mut d, 0), Position { line: 1, offset: 0 });
        assert_eq!(host.cursor().to_string(), "mem.c:1");
    }

    #[test]
    fn test_search_forward_lands_on_line_start() {
        let mut host = host();
        let mut d = doc("int x;\r\nint main(void)\n{\n");
        let re = Regex::new("^int main\\(void\\)$").unwrap();
        assert_eq!(
            host.search_forward(&mut d, &re),
            Some(Position { line: 2, offset: 8 })
        );
        let missing = Regex::new("^nothing$").unwrap();
        assert_eq!(host.search_forward(&mut d, &missing), None);
    }

    #[test]
    fn test_visit_missing_document_fails() {
        let temp = TempDir::new().unwrap();
        let mut host = host();
        let gone = LocationRef::Position {
            path: temp.path().join("deleted.c"),
            offset: 0,
            line: 1,
        };
        assert!(host.visit(&gone).is_err());

        let present = temp.path().join("here.c");
        std::fs::write(&present, "abc\n").unwrap();
        let ok = LocationRef::Position {
            path: present.clone(),
            offset: 4,
            line: 2,
        };
        host.visit(&ok).unwrap();
        assert_eq!(host.cursor(), &ok);

        let past_end = LocationRef::Position {
            path: present,
            offset: 400,
            line: 9,
        };
        assert!(host.visit(&past_end).is_err());
    }
}
