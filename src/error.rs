use crate::source::{Fragment, SourceBuffer};

/// An error produced while compiling a PL program.
///
/// Every error points at the source fragment that triggered it so the
/// diagnostic can be rendered with the caret display from the source module.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
    pub fragment: Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // Lexical
    InvalidCharacter,

    // Syntactic
    UnexpectedToken,
    TrailingInput,

    // Semantic
    Redeclaration,
    UndeclaredIdentifier,
    AssignmentToConstant,
    UninitializedVariable,
    MissingReturn,
}

impl CompileError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, fragment: Fragment) -> Self {
        Self {
            kind,
            message: message.into(),
            fragment,
        }
    }

    /// Render the full diagnostic: the message followed by the offending
    /// source fragment with a caret underneath.
    pub fn render(&self, source: &SourceBuffer) -> String {
        let location = source.display_fragment(self.fragment).to_string();
        if location.is_empty() {
            format!("error: {}", self.message)
        } else {
            format!("error: {}\n{}", self.message, location)
        }
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let begin = self.fragment.begin();
        write!(
            f,
            "ERROR (line {}:{}): {}",
            begin.line, begin.column, self.message
        )
    }
}
