//! # Cursor
//!
//! Character-by-character navigation over a [`SourceBuffer`] with position
//! tracking.
//!
//! PL source is strictly ASCII, so the cursor hands out `char`s directly from
//! the buffer's line/column addressing. The cursor's position is always the
//! position of the character `peek` would return; at the end of input it
//! equals [`SourceBuffer::end`].

use crate::source::{Position, SourceBuffer};

pub struct Cursor<'a> {
    source: &'a SourceBuffer,
    position: Position,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a SourceBuffer) -> Self {
        Self {
            source,
            position: source.begin(),
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.source.char_at(self.position)
    }

    /// Look one character past the current position without advancing.
    pub fn peek_second(&self) -> Option<char> {
        if self.is_at_end() {
            return None;
        }
        self.source
            .char_at(self.source.next_position(self.position))
    }

    /// Consume the current character and return it.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position = self.source.next_position(self.position);
        Some(ch)
    }

    pub fn is_at_end(&self) -> bool {
        self.position == self.source.end()
    }

    pub fn position(&self) -> Position {
        self.position
    }
}
