//! Tag Index Search
//!
//! Finds every record whose tag name equals a query in a sorted index file,
//! touching the file only through bounded, offset-positioned reads:
//!
//! 1. Binary search over fixed-size blocks. Each probe reads a small chunk
//!    at a block boundary, drops the partial first line and compares the
//!    next line's prefix against the query. Chunks double up to a ceiling
//!    when lines are too long to sample.
//! 2. Linear scan from the localized block, collecting exact matches and
//!    stopping at the first line that sorts after the query.
//!
//! A case-folded lookup in a byte-sorted file has no usable order, so it
//! skips phase 1 and scans to the end of the file.
//!
//! @module tags/search

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

use serde::Serialize;
use tracing::{debug, trace};

use super::header::TagFileHeader;
use crate::core::config::SearchConfig;
use crate::core::error::{Error, Result};

// =============================================================================
// BLOCK RANGE
// =============================================================================

/// Block bounds left by the binary search phase, `[low, high)`
///
/// Any run of matching records starts after the first line boundary of
/// block `low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockRange {
    pub low: u64,
    pub high: u64,
    pub block_size: u64,
}

impl BlockRange {
    /// Byte offset where the confirmation scan starts
    pub fn start_offset(&self) -> u64 {
        self.low * self.block_size
    }
}

/// Result of comparing one index line against the query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineOrder {
    /// Sorts before the query, keep scanning
    Before,
    /// Tag name equals the query
    Match,
    /// Sorts after the query, no later line can match
    After,
    /// Too short to compare
    Short,
}

// =============================================================================
// SEARCH
// =============================================================================

/// Lookup over one header-described index file
pub struct TagIndexSearch<'a> {
    header: &'a TagFileHeader,
    params: SearchConfig,
}

impl<'a> TagIndexSearch<'a> {
    pub fn new(header: &'a TagFileHeader, params: SearchConfig) -> Self {
        Self { header, params }
    }

    /// Return the raw lines whose tag name equals `query`, in file order.
    ///
    /// `case_fold` is the caller's preference; a file sorted with folded
    /// case is always compared folded. Folding a byte-sorted file breaks
    /// its order, so that lookup scans every line instead of bisecting.
    pub fn search(&self, query: &str, case_fold: bool) -> Result<Vec<String>> {
        self.ensure_sorted()?;
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_sampleable(query)?;

        let fold = self.header.folds_case(case_fold);
        let needle = fold_bytes(query.as_bytes(), fold);
        let ordered = self.header.ordered_for(fold);

        let mut file = File::open(&self.header.path)?;
        let range = if ordered {
            self.localize(&mut file, &needle, fold)?
        } else {
            debug!(
                path = %self.header.path.display(),
                "Folded lookup in byte-sorted file, full scan"
            );
            self.whole_file(&file)?
        };
        let lines = self.scan(&mut file, range.start_offset(), &needle, fold, ordered)?;

        debug!(
            path = %self.header.path.display(),
            query,
            fold,
            block = range.low,
            matches = lines.len(),
            "Tag search finished"
        );
        Ok(lines)
    }

    /// Run only the binary search phase for `query`
    ///
    /// A lookup that has to scan every line reports the whole file.
    pub fn locate(&self, query: &str, case_fold: bool) -> Result<BlockRange> {
        self.ensure_sorted()?;
        self.ensure_sampleable(query)?;
        let fold = self.header.folds_case(case_fold);
        let needle = fold_bytes(query.as_bytes(), fold);
        let mut file = File::open(&self.header.path)?;
        if self.header.ordered_for(fold) {
            self.localize(&mut file, &needle, fold)
        } else {
            self.whole_file(&file)
        }
    }

    fn ensure_sorted(&self) -> Result<()> {
        if self.header.sorted_mode.is_sorted() {
            Ok(())
        } else {
            Err(Error::UnsortedIndex {
                path: self.header.path.clone(),
            })
        }
    }

    fn ensure_sampleable(&self, query: &str) -> Result<()> {
        if query.len() >= self.params.max_chunk_size {
            return Err(Error::ChunkTooSmall {
                query_len: query.len(),
                max_chunk: self.params.max_chunk_size,
            });
        }
        Ok(())
    }

    // =========================================================================
    // PHASE 1: BLOCK LOCALIZATION
    // =========================================================================

    fn block_count(&self, file: &File) -> Result<u64> {
        let block_size = self.params.block_size;
        let size = file.metadata()?.len();
        Ok(((size + block_size - 1) / block_size).max(1))
    }

    fn whole_file(&self, file: &File) -> Result<BlockRange> {
        Ok(BlockRange {
            low: 0,
            high: self.block_count(file)?,
            block_size: self.params.block_size,
        })
    }

    fn localize(&self, file: &mut File, needle: &[u8], fold: bool) -> Result<BlockRange> {
        let block_size = self.params.block_size;
        let blocks = self.block_count(file)?;

        let mut low = 0u64;
        let mut high = blocks;

        while high > low + 1 {
            let mid = low + (high - low) / 2;
            let sample = self.probe(file, mid * block_size, needle.len())?;

            // A block with no line starting in it sorts after everything
            let less = match sample {
                Some(bytes) => fold_bytes(&bytes, fold).as_ref() < needle,
                None => false,
            };
            trace!(block = mid, less, "Probe");

            if less {
                low = mid;
            } else {
                high = mid;
            }
        }

        debug!(low, high, blocks, "Localized block");
        Ok(BlockRange {
            low,
            high,
            block_size,
        })
    }

    /// Sample up to `len` bytes of the first line starting after `offset`.
    ///
    /// Returns `None` when no line starts between `offset` and end of file.
    fn probe(&self, file: &mut File, offset: u64, len: usize) -> Result<Option<Vec<u8>>> {
        let ceiling = self.params.max_chunk_size;
        let too_small = || Error::ChunkTooSmall {
            query_len: len,
            max_chunk: ceiling,
        };
        if len >= ceiling {
            return Err(too_small());
        }

        let mut chunk = self.params.chunk_size.min(ceiling);
        loop {
            let buf = read_at(file, offset, chunk)?;
            let eof = buf.len() < chunk;

            match find_newline(&buf) {
                Some(first) => {
                    let line = &buf[first + 1..];
                    let end = find_newline(line);
                    if end.is_some() || eof || line.len() >= len {
                        if line.is_empty() {
                            return Ok(None);
                        }
                        let body = strip_cr(&line[..end.unwrap_or(line.len())]);
                        return Ok(Some(body[..body.len().min(len)].to_vec()));
                    }
                }
                None if eof => return Ok(None),
                None => {}
            }

            if chunk >= ceiling {
                return Err(too_small());
            }
            chunk = (chunk * 2).min(ceiling);
            trace!(offset, chunk, "Line too long for probe, doubling chunk");
        }
    }

    // =========================================================================
    // PHASE 2: LINEAR CONFIRMATION
    // =========================================================================

    /// Collect matches from `start` onwards. With `ordered` the scan ends at
    /// the first line sorting after the query, otherwise at end of file.
    fn scan(
        &self,
        file: &mut File,
        start: u64,
        needle: &[u8],
        fold: bool,
        ordered: bool,
    ) -> Result<Vec<String>> {
        // Two blocks per read: a run of matches may straddle a block boundary
        let window = (self.params.block_size as usize).saturating_mul(2);

        let mut matches = Vec::new();
        let mut offset = start;
        let mut want = window;
        let mut skip_partial = start > 0;
        let mut first_window = true;

        loop {
            let buf = read_at(file, offset, want)?;
            let eof = buf.len() < want;
            if buf.is_empty() {
                break;
            }

            let mut pos = 0usize;
            if skip_partial {
                match find_newline(&buf) {
                    Some(nl) => {
                        pos = nl + 1;
                        skip_partial = false;
                    }
                    None if eof => break,
                    None => {
                        want = want.saturating_mul(2);
                        continue;
                    }
                }
            }

            if first_window {
                // Jump to the line holding the first occurrence of the query
                if let Some(hit) = find_folded(&buf[pos..], needle, fold) {
                    let at = pos + hit;
                    if let Some(nl) = buf[pos..at].iter().rposition(|&b| b == b'\n') {
                        pos += nl + 1;
                    }
                }
                first_window = false;
            }

            let mut finished = false;
            while pos < buf.len() {
                let rest = &buf[pos..];
                let (line, next) = match find_newline(rest) {
                    Some(end) => (&rest[..end], pos + end + 1),
                    None if eof => (rest, buf.len()),
                    None => break,
                };
                let line = strip_cr(line);

                match compare_line(line, needle, fold) {
                    LineOrder::Match => {
                        matches.push(String::from_utf8_lossy(line).into_owned());
                    }
                    LineOrder::After if ordered => {
                        finished = true;
                        break;
                    }
                    LineOrder::After | LineOrder::Before | LineOrder::Short => {}
                }
                pos = next;
            }

            if finished || eof {
                break;
            }
            if pos == 0 {
                // Line longer than the whole window
                want = want.saturating_mul(2);
            } else {
                offset += pos as u64;
                want = window;
            }
        }

        Ok(matches)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn read_at(file: &mut File, offset: u64, len: usize) -> io::Result<Vec<u8>> {
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::with_capacity(len);
    file.by_ref().take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

fn find_newline(bytes: &[u8]) -> Option<usize> {
    bytes.iter().position(|&b| b == b'\n')
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Fold to upper case, matching how ctags sorts with `foldcase`
fn fold_bytes(bytes: &[u8], fold: bool) -> Cow<'_, [u8]> {
    if fold {
        Cow::Owned(bytes.to_ascii_uppercase())
    } else {
        Cow::Borrowed(bytes)
    }
}

fn find_folded(haystack: &[u8], needle: &[u8], fold: bool) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| {
        if fold {
            w.eq_ignore_ascii_case(needle)
        } else {
            w == needle
        }
    })
}

fn compare_line(line: &[u8], needle: &[u8], fold: bool) -> LineOrder {
    if line.len() < needle.len() {
        return LineOrder::Short;
    }
    let prefix = fold_bytes(&line[..needle.len()], fold);
    match prefix.as_ref().cmp(needle) {
        Ordering::Less => LineOrder::Before,
        Ordering::Greater => LineOrder::After,
        // Equal prefix is a match only when the tag name ends right there
        Ordering::Equal if line.get(needle.len()) == Some(&b'\t') => LineOrder::Match,
        Ordering::Equal => LineOrder::Before,
    }
}
