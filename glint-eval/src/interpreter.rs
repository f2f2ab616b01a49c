mod expr;
mod stmt;

use glint_parser::ast::{Expr, Resolved, Stmt};
use glint_value::{BuiltinVars, Environment, Value};

use crate::{PrintHandler, RuntimeError};

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Fell through to the next statement.
    Normal,
    /// Executed a `return`.
    Return(Value),
}

/// Executes resolved programs against a persistent global frame.
pub struct Interpreter {
    globals: Environment,
    print_handler: PrintHandler,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(PrintHandler::default())
    }
}

impl Interpreter {
    pub fn new(print_handler: PrintHandler) -> Self {
        Self {
            globals: Environment::global(),
            print_handler,
        }
    }

    /// Binds every builtin in the global frame.
    pub fn define_builtin_vars(&mut self, builtin_vars: &BuiltinVars) {
        for (ident, value) in &builtin_vars.values {
            self.globals.define(ident.as_str(), value.clone());
        }
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    pub fn print_handler(&self) -> &PrintHandler {
        &self.print_handler
    }

    /// Executes a top-level declaration in the global frame.
    pub fn execute(&mut self, stmt: &Stmt<Resolved>) -> Result<Completion, RuntimeError> {
        let globals = self.globals.clone();
        self.exec(stmt, &globals)
    }

    /// Evaluates an expression in the global frame.
    pub fn evaluate(&mut self, expr: &Expr<Resolved>) -> Result<Value, RuntimeError> {
        let globals = self.globals.clone();
        self.eval(expr, &globals)
    }
}
