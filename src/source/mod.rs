//! # Source Management
//!
//! Owns the text of a registered PL program and provides line/column
//! addressing over it.
//!
//! ## Model
//!
//! - A [`SourceBuffer`] owns the program text. Non-empty text is logically
//!   terminated with a newline so every line, including the last, ends in
//!   `'\n'`. An index records, per line, the offset just past its newline.
//! - A [`Position`] names a character by zero-based `(line, column)`.
//!   Positions order first by line, then by column.
//! - A [`Fragment`] is a half-open `[begin, end)` character range. Fragments
//!   are plain `Copy` values; they carry no text themselves and are resolved
//!   against the buffer they were created from, which therefore must outlive
//!   every use of them.
//!
//! ## Pretty-printing
//!
//! Diagnostics render a position as the `Position <line>:<col>` header, the
//! full source line, and a caret under the offending column. Fragments widen
//! the caret with `~` markers. See [`SourceBuffer::display_position`] and
//! [`SourceBuffer::display_fragment`].


/// A zero-based line/column address of one character in a [`SourceBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A half-open range of source characters, `begin <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    begin: Position,
    end: Position,
}

impl Fragment {
    pub fn new(begin: Position, end: Position) -> Self {
        debug_assert!(begin <= end);
        Self { begin, end }
    }

    /// An empty fragment anchored at `at`.
    pub fn empty_at(at: Position) -> Self {
        Self {
            begin: at,
            end: at,
        }
    }

    pub fn begin(&self) -> Position {
        self.begin
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Column span of a single-line fragment.
    pub fn size(&self) -> usize {
        self.end.column.saturating_sub(self.begin.column)
    }

    /// Widen this fragment to the union of both ranges.
    pub fn extend(&mut self, other: Fragment) {
        self.begin = self.begin.min(other.begin);
        self.end = self.end.max(other.end);
    }
}

/// Owned program text with a per-line offset index.
#[derive(Debug, Default)]
pub struct SourceBuffer {
    text: String,
    /// For each line, the offset just past its terminating newline.
    line_ends: Vec<usize>,
}

impl SourceBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }

        let mut line_ends = Vec::new();
        let mut start = 0;
        while start < text.len() {
            // Every line ends in '\n' after the normalization above.
            let end = text[start..]
                .find('\n')
                .map(|i| start + i + 1)
                .unwrap_or(text.len());
            line_ends.push(end);
            start = end;
        }

        Self { text, line_ends }
    }

    /// Position of the first character.
    pub fn begin(&self) -> Position {
        Position::new(0, 0)
    }

    /// Past-the-end position: `(number_of_lines, 0)`.
    pub fn end(&self) -> Position {
        Position::new(self.number_of_lines(), 0)
    }

    pub fn number_of_lines(&self) -> usize {
        self.line_ends.len()
    }

    /// Length of a line, terminating newline included.
    pub fn line_length(&self, line: usize) -> usize {
        self.line(line).len()
    }

    /// The text of a line, terminating newline included.
    pub fn line(&self, line: usize) -> &str {
        &self.text[self.line_offset(line)..self.line_ends[line]]
    }

    /// Offset of the first character of `line`; `line == number_of_lines()`
    /// yields the end of the buffer.
    fn line_offset(&self, line: usize) -> usize {
        debug_assert!(line <= self.number_of_lines());
        if line == 0 {
            0
        } else {
            self.line_ends[line - 1]
        }
    }

    fn offset(&self, position: Position) -> usize {
        self.line_offset(position.line) + position.column
    }

    /// The character at `position`, or `None` for the past-the-end position.
    pub fn char_at(&self, position: Position) -> Option<char> {
        if position.line >= self.number_of_lines() {
            return None;
        }
        self.line(position.line).as_bytes().get(position.column).map(|&b| b as char)
    }

    /// The position one character after `position`. Stepping past a line's
    /// newline lands at `(line + 1, 0)`.
    pub fn next_position(&self, position: Position) -> Position {
        let next = Position::new(position.line, position.column + 1);
        if next.column == self.line_length(next.line) {
            Position::new(next.line + 1, 0)
        } else {
            next
        }
    }

    /// The position one character before `position`. Stepping back across a
    /// line boundary lands on the previous line's newline.
    pub fn prev_position(&self, position: Position) -> Position {
        if position.column == 0 {
            let line = position.line - 1;
            Position::new(line, self.line_length(line) - 1)
        } else {
            Position::new(position.line, position.column - 1)
        }
    }

    /// The text covered by `fragment`.
    pub fn fragment_str(&self, fragment: Fragment) -> &str {
        &self.text[self.offset(fragment.begin)..self.offset(fragment.end)]
    }

    /// `Display` adapter rendering `position` with its source line and caret.
    pub fn display_position(&self, position: Position) -> PositionDisplay<'_> {
        PositionDisplay {
            source: self,
            position,
        }
    }

    /// `Display` adapter rendering `fragment` with its source line, caret and
    /// `~` span markers. Empty fragments render as nothing.
    pub fn display_fragment(&self, fragment: Fragment) -> FragmentDisplay<'_> {
        FragmentDisplay {
            source: self,
            fragment,
        }
    }
}

pub struct PositionDisplay<'a> {
    source: &'a SourceBuffer,
    position: Position,
}

impl std::fmt::Display for PositionDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Position {}:{}\n", self.position.line, self.position.column)?;
        if self.position.line < self.source.number_of_lines() {
            f.write_str(self.source.line(self.position.line))?;
        }
        for _ in 0..self.position.column {
            f.write_str(" ")?;
        }
        f.write_str("^")
    }
}

pub struct FragmentDisplay<'a> {
    source: &'a SourceBuffer,
    fragment: Fragment,
}

impl std::fmt::Display for FragmentDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.fragment.is_empty() {
            return Ok(());
        }
        write!(f, "{}", self.source.display_position(self.fragment.begin))?;
        for _ in 1..self.fragment.size() {
            f.write_str("~")?;
        }
        Ok(())
    }
}
