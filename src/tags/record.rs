//! Tag Records
//!
//! Parses one index line into its tag name, file path and location
//! descriptor, and turns ctags search patterns into executable regexes.
//!
//! Pattern text in an index file escapes only the delimiter (`\/`) and the
//! backslash itself (`\\`), while everything else is literal. Before it can
//! be searched for, the text is rewritten into a backslash-escaped literal
//! form where `* ? . + [ ]` are quoted and stray backslashes are doubled.
//!
//! @module tags/record

use std::fmt;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::core::error::{Error, Result};

/// Characters the host pattern syntax treats as operators
const PATTERN_METACHARS: [char; 6] = ['*', '?', '.', '+', '[', ']'];

// =============================================================================
// LOCATION
// =============================================================================

/// Where in the target file a tag lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// 1-based line number
    LineNumber(u32),
    /// Search for a line matching the pattern
    SearchPattern(SearchPattern),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::LineNumber(line) => write!(f, "{}", line),
            Location::SearchPattern(p) => write!(
                f,
                "/{}{}{}/",
                if p.anchored_at_start { "^" } else { "" },
                p.raw,
                if p.anchored_at_end { "$" } else { "" }
            ),
        }
    }
}

/// A `/pattern/` location as written in the index file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPattern {
    /// Text between the delimiters, without the `^` and `$` anchors
    pub raw: String,
    pub anchored_at_start: bool,
    pub anchored_at_end: bool,
}

impl SearchPattern {
    pub fn new(raw: impl Into<String>, anchored_at_start: bool, anchored_at_end: bool) -> Self {
        Self {
            raw: raw.into(),
            anchored_at_start,
            anchored_at_end,
        }
    }

    /// The pattern body in backslash-escaped literal form.
    ///
    /// `* ? . + [ ]` get a quoting backslash. A backslash in the source
    /// escapes a following `/`; before anything else it is itself literal
    /// and is doubled, so `\/` and `\\/` both survive as the text they
    /// denote.
    ///
    /// A meta right after a lone backslash is still quoted: ctags never
    /// escapes metas when writing patterns, so `\*` in an index means a
    /// literal backslash followed by a literal star, and becomes `\\\*`.
    pub fn escaped(&self) -> String {
        let mut out = String::with_capacity(self.raw.len() + 8);
        // Previous character was a backslash not yet paired with anything
        let mut pending = false;

        for c in self.raw.chars() {
            if pending {
                pending = false;
                if c == '/' {
                    out.push('/');
                    continue;
                }
                out.push('\\');
                if c == '\\' {
                    continue;
                }
            } else if c == '\\' {
                out.push('\\');
                pending = true;
                continue;
            }

            if PATTERN_METACHARS.contains(&c) {
                out.push('\\');
            }
            out.push(c);
        }

        if pending {
            out.push('\\');
        }
        out
    }

    /// The escaped body with its anchors restored
    pub fn host_pattern(&self) -> String {
        let mut pattern = String::new();
        if self.anchored_at_start {
            pattern.push('^');
        }
        pattern.push_str(&self.escaped());
        if self.anchored_at_end {
            pattern.push('$');
        }
        pattern
    }

    /// The literal line text the pattern stands for
    pub fn literal(&self) -> String {
        let escaped = self.escaped();
        let mut out = String::with_capacity(escaped.len());
        let mut chars = escaped.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => out.extend(chars.next()),
                _ => out.push(c),
            }
        }
        out
    }

    /// Compile into a regex matching single lines
    pub fn compile(&self) -> Result<Regex> {
        let literal = regex::escape(&self.literal());
        let mut source = String::with_capacity(literal.len() + 2);
        if self.anchored_at_start {
            source.push('^');
        }
        source.push_str(&literal);
        if self.anchored_at_end {
            source.push('$');
        }
        Ok(Regex::new(&source)?)
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// One parsed index line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub tag_name: CompactString,
    pub file_path: CompactString,
    pub location: Location,
    /// Single-letter or `kind:` extension field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<CompactString>,
    /// Remaining `key:value` extension fields, in file order
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub fields: SmallVec<[(CompactString, CompactString); 4]>,
}

impl TagRecord {
    /// Parse `TAG<TAB>FILE<TAB>LOCATION[;"<TAB>fields...]`
    pub fn parse(line: &str) -> Result<Self> {
        let malformed = || Error::MalformedRecord {
            line: line.to_string(),
        };

        let (tag_name, rest) = line.split_once('\t').ok_or_else(malformed)?;
        if tag_name.is_empty() {
            return Err(malformed());
        }
        let (file_path, location_field) = rest.split_once('\t').ok_or_else(malformed)?;
        if file_path.is_empty() {
            return Err(malformed());
        }

        let (location, tail) = parse_location(location_field).ok_or_else(malformed)?;
        let (kind, fields) = parse_extension_fields(tail);

        Ok(Self {
            tag_name: CompactString::new(tag_name),
            file_path: CompactString::new(file_path),
            location,
            kind,
            fields,
        })
    }

    /// Target file, resolved against the directory holding the index file
    pub fn resolved_path(&self, index_dir: &Path) -> PathBuf {
        let path = Path::new(self.file_path.as_str());
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            index_dir.join(path)
        }
    }

    /// Look up an extension field by key
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse raw index lines, dropping the malformed ones
pub fn parse_records<I, S>(lines: I) -> Vec<TagRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| match TagRecord::parse(line.as_ref()) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "Dropping malformed tag line");
                None
            }
        })
        .collect()
}

// =============================================================================
// FIELD PARSING
// =============================================================================

/// Split the location descriptor from whatever follows it
fn parse_location(field: &str) -> Option<(Location, &str)> {
    let first = field.chars().next()?;

    if first.is_ascii_digit() {
        let digits = field
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(field.len());
        let line: u32 = field[..digits].parse().ok()?;
        return Some((Location::LineNumber(line), &field[digits..]));
    }

    if first != '/' {
        return None;
    }

    let body = &field[1..];
    let close = find_closing_delimiter(body)?;
    let mut text = &body[..close];

    let anchored_at_start = text.starts_with('^');
    if anchored_at_start {
        text = &text[1..];
    }
    let anchored_at_end = text.ends_with('$') && !is_escaped(text, text.len() - 1);
    if anchored_at_end {
        text = &text[..text.len() - 1];
    }

    Some((
        Location::SearchPattern(SearchPattern::new(text, anchored_at_start, anchored_at_end)),
        &body[close + 1..],
    ))
}

/// Index of the `/` closing a pattern body
///
/// Prefers an unescaped `/` followed by `;` or end of field. Some
/// generators leave the closing delimiter escaped when the source line
/// ends in a backslash, so the last `/;` is accepted as a fallback.
fn find_closing_delimiter(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'/' if matches!(bytes.get(i + 1), None | Some(b';')) => return Some(i),
            _ => i += 1,
        }
    }
    body.rfind("/;")
}

/// Whether the byte at `idx` is preceded by an odd run of backslashes
fn is_escaped(text: &str, idx: usize) -> bool {
    text.as_bytes()[..idx]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
        % 2
        == 1
}

type ExtensionFields = SmallVec<[(CompactString, CompactString); 4]>;

fn parse_extension_fields(tail: &str) -> (Option<CompactString>, ExtensionFields) {
    let mut kind = None;
    let mut fields = ExtensionFields::new();

    let Some(start) = tail.find(";\"") else {
        return (kind, fields);
    };

    for token in tail[start + 2..].split('\t').filter(|t| !t.is_empty()) {
        match token.split_once(':') {
            Some(("kind", value)) => kind = Some(CompactString::new(value)),
            Some((key, value)) => fields.push((CompactString::new(key), CompactString::new(value))),
            None if kind.is_none() => kind = Some(CompactString::new(token)),
            None => {}
        }
    }

    (kind, fields)
}
