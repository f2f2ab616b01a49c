use glint_eval::RuntimeError;
use glint_source::{LexicalError, Position, SemanticError, Source, SyntaxError};
use thiserror::Error;

/// Any error produced while running source code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Lexical(#[from] LexicalError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Lexical(err) => Some(err.position),
            Self::Syntax(err) => Some(err.position),
            Self::Semantic(err) => err.position(),
            Self::Runtime(_) => None,
        }
    }

    /// Process exit status for a script that failed with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Runtime(_) => 70,
            _ => 65,
        }
    }

    /// Renders the error against the source it was raised for.
    pub fn render(&self, source: &Source) -> String {
        match self.position() {
            Some(position) => source.render(position, self),
            None => format!("error: {}\n", self),
        }
    }
}
