//! Source locations and spans.
//!
//! Every diagnostic and runtime error carries a [`Span`] so that the caller can point
//! back at the offending source text. A `Span` is inclusive at both ends.

use std::fmt;
use std::rc::Rc;

/// A single position inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Loc {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column, in characters, starting at 1.
    pub column: usize,
    /// Byte offset from the start of the file.
    pub byte_index: usize,
}

impl Loc {
    pub const fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            byte_index: 0,
        }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A source range, inclusive at both ends, tagged with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub filename: Rc<str>,
    pub start: Loc,
    pub end: Loc,
}

impl Span {
    pub fn new(filename: Rc<str>, start: Loc, end: Loc) -> Self {
        Self {
            filename,
            start,
            end,
        }
    }

    /// A span that covers neither location, used for synthetic/builtin-origin values.
    pub fn dummy() -> Self {
        Self {
            filename: Rc::from(""),
            start: Loc::start(),
            end: Loc::start(),
        }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            filename: self.filename.clone(),
            start: self.start,
            end: other.end,
        }
    }

    pub fn is_multiline(&self) -> bool {
        self.start.line != self.end.line
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.start)
    }
}

/// Maps byte offsets to line/column positions, for rendering diagnostics.
///
/// Binary-searches precomputed line-start offsets rather than rescanning from the top.
pub struct LineMap<'a> {
    line_offsets: Vec<usize>,
    source: &'a str,
}

impl<'a> LineMap<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            line_offsets: source
                .char_indices()
                .filter_map(|(pos, ch)| if ch == '\n' { Some(pos) } else { None })
                .collect(),
            source,
        }
    }

    pub fn offset_to_loc(&self, offset: usize) -> Loc {
        let line = match self.line_offsets.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line,
        };
        let previous_line_start = if line > 0 {
            self.line_offsets[line - 1] + 1
        } else {
            0
        };
        let column = self.source[previous_line_start..offset.min(self.source.len())]
            .chars()
            .count()
            + 1;
        Loc {
            line: line + 1,
            column,
            byte_index: offset,
        }
    }

    /// Return the full text of the line containing `loc`, for diagnostic rendering.
    pub fn line_text(&self, line: usize) -> &'a str {
        let start = if line >= 2 {
            self.line_offsets.get(line - 2).map_or(0, |p| p + 1)
        } else {
            0
        };
        let end = self
            .line_offsets
            .get(line - 1)
            .copied()
            .unwrap_or(self.source.len());
        &self.source[start..end]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn offset_to_loc_tracks_lines_and_columns() {
        let s = "abc\ndefg\na\u{e4}b\n";
        let m = LineMap::new(s);
        assert_eq!(
            m.offset_to_loc(0),
            Loc {
                line: 1,
                column: 1,
                byte_index: 0
            }
        );
        assert_eq!(
            m.offset_to_loc(4),
            Loc {
                line: 2,
                column: 1,
                byte_index: 4
            }
        );
    }
}
