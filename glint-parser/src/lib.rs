//! Front end of the interpreter: lexing, parsing, and the syntax tree.

pub mod ast;
pub mod combinator;
pub mod lexer;
pub mod parser;

pub use parser::{parse, parse_expression};
