//! Tree-walking evaluator for resolved programs.

mod error;
mod interpreter;
pub mod operators;
mod print_handler;

pub use error::{InternalError, RuntimeError};
pub use interpreter::{Completion, Interpreter};
pub use print_handler::PrintHandler;
