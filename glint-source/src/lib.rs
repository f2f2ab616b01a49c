//! Source code representation and error management.

use std::fmt;

use thiserror::Error;

/// A location in source code. Lines and columns both start at `1`; columns count bytes.
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

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Represents source code.
pub struct Source<'a> {
    /// Original source code.
    pub content: &'a str,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        Self { content }
    }

    /// Returns the text of the line at `line` (1-based), without its line terminator.
    pub fn line(&self, line: usize) -> Option<&'a str> {
        let text = self.content.split('\n').nth(line.checked_sub(1)?)?;
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    /// Renders `message` as a diagnostic pointing at `position`.
    ///
    /// When the position lies past the end of the source (end-of-input), only the header is rendered.
    pub fn render(&self, position: Position, message: impl fmt::Display) -> String {
        let mut out = format!("error: {message}\n --> {position}\n");
        if let Some(line) = self.line(position.line) {
            let caret_offset = position.column.saturating_sub(1);
            out.push_str(&format!("  | {line}\n  | {:caret_offset$}^\n", ""));
        }
        out
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

/// A character sequence that matches no token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unexpected character sequence `{lexeme}` at {position}")]
pub struct LexicalError {
    pub lexeme: String,
    pub position: Position,
}

/// Represents a syntax error (compile time error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {position}")]
pub struct SyntaxError {
    pub message: String,
    pub position: Position,
}

impl SyntaxError {
    /// Create a new syntax error with the specified `message` and `position`.
    pub fn new(message: impl ToString, position: Position) -> Self {
        Self {
            message: message.to_string(),
            position,
        }
    }
}

/// Errors detected by the resolver before anything runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("Undefined variable `{name}` at {position}")]
    UndefinedVariable { name: String, position: Position },
    #[error("More than one constructor declared in class `{class}`")]
    MultipleConstructors { class: String },
    #[error("Cannot assign to `this` at {position}")]
    AssignToThis { position: Position },
}

impl SemanticError {
    /// The position the error points at, when the error has one.
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::UndefinedVariable { position, .. } | Self::AssignToThis { position } => {
                Some(*position)
            }
            Self::MultipleConstructors { .. } => None,
        }
    }
}
