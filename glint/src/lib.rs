//! Runs glint source code: tokenize, parse, resolve, then evaluate.

pub mod builtin_functions;
mod error;

pub use error::Error;
pub use glint_eval::PrintHandler;

use glint_eval::{Completion, Interpreter, RuntimeError};
use glint_parser::lexer::tokenize;
use glint_parser::{parse, parse_expression};
use glint_passes::resolve::Resolver;
use glint_value::BuiltinVars;
use tracing::debug;

/// A resolver and an interpreter whose global scopes persist across runs.
pub struct Session {
    resolver: Resolver,
    interpreter: Interpreter,
    dump_tokens: bool,
    dump_ast: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PrintHandler::default())
    }
}

impl Session {
    /// Creates a session with the default builtins.
    pub fn new(print_handler: PrintHandler) -> Self {
        Self::with_builtin_vars(&builtin_functions::default_builtin_vars(), print_handler)
    }

    pub fn with_builtin_vars(builtin_vars: &BuiltinVars, print_handler: PrintHandler) -> Self {
        let mut resolver = Resolver::new();
        resolver.resolve_builtin_vars(builtin_vars);
        let mut interpreter = Interpreter::new(print_handler);
        interpreter.define_builtin_vars(builtin_vars);
        Self {
            resolver,
            interpreter,
            dump_tokens: false,
            dump_ast: false,
        }
    }

    /// Print the token stream to stderr before running.
    pub fn dump_tokens(mut self, enabled: bool) -> Self {
        self.dump_tokens = enabled;
        self
    }

    /// Print the resolved tree to stderr before running.
    pub fn dump_ast(mut self, enabled: bool) -> Self {
        self.dump_ast = enabled;
        self
    }

    pub fn print_handler(&self) -> &PrintHandler {
        self.interpreter.print_handler()
    }

    /// Everything printed so far, when printing into a buffer.
    pub fn output(&self) -> String {
        self.print_handler().get_output()
    }

    /// Runs a whole program. A top-level `return` stops the program.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self, source: &str) -> Result<(), Error> {
        let result = self.run_program(source);
        if result.is_err() {
            self.sync_globals();
        }
        result
    }

    /// Runs one line of interactive input. A bare expression has its value printed.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run_line(&mut self, line: &str) -> Result<(), Error> {
        let result = self.run_line_inner(line);
        if result.is_err() {
            self.sync_globals();
        }
        result
    }

    fn run_program(&mut self, source: &str) -> Result<(), Error> {
        let tokens = tokenize(source)?;
        if self.dump_tokens {
            eprintln!("{:#?}", tokens);
        }
        let program = self.resolver.resolve(&parse(&tokens)?)?;
        if self.dump_ast {
            eprintln!("{:#?}", program);
        }
        debug!(declarations = program.len(), "executing program");
        for stmt in &program {
            if let Completion::Return(_) = self.interpreter.execute(stmt)? {
                // the declarations after the `return` were resolved but never ran
                self.sync_globals();
                break;
            }
        }
        Ok(())
    }

    fn run_line_inner(&mut self, line: &str) -> Result<(), Error> {
        let tokens = tokenize(line)?;
        let expr = match parse_expression(&tokens) {
            Ok(expr) => expr,
            Err(_) => return self.run_program(line),
        };
        if self.dump_tokens {
            eprintln!("{:#?}", tokens);
        }
        let expr = self.resolver.resolve_expr(&expr)?;
        if self.dump_ast {
            eprintln!("{:#?}", expr);
        }
        let value = self.interpreter.evaluate(&expr)?;
        self.print_handler()
            .println(&value.to_string())
            .map_err(|err| RuntimeError::Output(err.to_string()))?;
        Ok(())
    }

    /// Makes the resolver's global scope match the names the global frame actually holds.
    fn sync_globals(&mut self) {
        let names = self.interpreter.globals().names();
        debug!(globals = names.len(), "resynchronizing global scope");
        self.resolver.reset_globals(names);
    }
}
