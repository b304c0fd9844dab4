//! # PL Lexer
//!
//! Tokenizes PL source into a stream of typed tokens, one call at a time.
//!
//! ## Recognized symbols
//!
//! - **Punctuation**: `.` `;` `,` `=` `:=` `+` `-` `*` `/` `(` `)`
//! - **Literals**: maximal runs of decimal digits
//! - **Identifiers**: maximal runs of ASCII letters, unless the exact
//!   spelling is one of the reserved words `PARAM`, `VAR`, `CONST`, `BEGIN`,
//!   `END`, `RETURN` (case-sensitive)
//!
//! Whitespace (spaces, tabs, newlines) is skipped before each token. Any
//! other character is a lexical error: [`Lexer::next`] returns the error and
//! the lexer stays parked on the offending character, so repeated calls keep
//! reporting it rather than resynchronizing.
//!
//! Unlike a batch tokenizer, the lexer is pull-based: the parser requests one
//! token of lookahead at a time, and tokens never outlive parsing.

pub mod cursor;
pub mod token;


use crate::error::{CompileError, ErrorKind};
use crate::source::{Fragment, Position, SourceBuffer};
use cursor::Cursor;
use token::{Token, TokenKind};

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    source: &'a SourceBuffer,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a SourceBuffer) -> Self {
        Self {
            cursor: Cursor::new(source),
            source,
        }
    }

    /// The position of the next character the lexer will look at. After a
    /// lexical error this is the offending character itself.
    pub fn current_position(&self) -> Position {
        self.cursor.position()
    }

    /// Consume and return the next token.
    ///
    /// At the end of input this returns an `Eos` token with an empty fragment,
    /// and keeps returning it on further calls.
    pub fn next(&mut self) -> Result<Token, CompileError> {
        self.skip_whitespace();

        if self.cursor.is_at_end() {
            return Ok(Token {
                kind: TokenKind::Eos,
                fragment: Fragment::empty_at(self.source.end()),
            });
        }

        let start = self.cursor.position();
        let ch = self.cursor.peek().unwrap_or_default();

        let kind = match ch {
            '.' => TokenKind::ProgramTerminator,
            ';' => TokenKind::StatementTerminator,
            ',' => TokenKind::Separator,
            '=' => TokenKind::InitAssign,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Mult,
            '/' => TokenKind::Div,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ':' => {
                // Only valid as the start of ':='. A lone ':' is a lexical
                // error and the cursor must stay on it.
                if self.cursor.peek_second() != Some('=') {
                    return Err(self.invalid_character(ch, start));
                }
                self.cursor.advance();
                self.cursor.advance();
                return Ok(Token {
                    kind: TokenKind::VarAssign,
                    fragment: Fragment::new(start, self.cursor.position()),
                });
            }
            c if c.is_ascii_digit() => {
                let fragment = self.read_while(|c| c.is_ascii_digit());
                return Ok(Token {
                    kind: TokenKind::Literal,
                    fragment,
                });
            }
            c if c.is_ascii_alphabetic() => {
                let fragment = self.read_while(|c| c.is_ascii_alphabetic());
                let word = self.source.fragment_str(fragment);
                return Ok(Token {
                    kind: TokenKind::keyword(word).unwrap_or(TokenKind::Identifier),
                    fragment,
                });
            }
            _ => return Err(self.invalid_character(ch, start)),
        };

        self.cursor.advance();
        Ok(Token {
            kind,
            fragment: Fragment::new(start, self.cursor.position()),
        })
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.cursor.peek(), Some(' ' | '\t' | '\n')) {
            self.cursor.advance();
        }
    }

    /// Consume a maximal run of characters satisfying `predicate`.
    fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> Fragment {
        let start = self.cursor.position();
        while matches!(self.cursor.peek(), Some(c) if predicate(c)) {
            self.cursor.advance();
        }
        Fragment::new(start, self.cursor.position())
    }

    fn invalid_character(&self, ch: char, at: Position) -> CompileError {
        CompileError::new(
            ErrorKind::InvalidCharacter,
            format!("Unexpected character: '{}'", ch),
            Fragment::new(at, self.source.next_position(at)),
        )
    }
}
