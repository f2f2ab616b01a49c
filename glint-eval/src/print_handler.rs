//! Destination of `print` statements.

use std::cell::RefCell;
use std::io::{self, Write};

pub enum PrintHandler {
    /// Writes to stdout (default).
    Stdout,
    /// Captures output in memory, for tests and embedders.
    Buffer(RefCell<String>),
}

impl Default for PrintHandler {
    fn default() -> Self {
        Self::Stdout
    }
}

impl PrintHandler {
    /// Creates an empty capturing handler.
    pub fn buffer() -> Self {
        Self::Buffer(RefCell::new(String::new()))
    }

    /// Print a line (with newline).
    pub fn println(&self, msg: &str) -> io::Result<()> {
        match self {
            Self::Stdout => {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                writeln!(lock, "{}", msg)
            }
            Self::Buffer(buf) => {
                let mut buf = buf.borrow_mut();
                buf.push_str(msg);
                buf.push('\n');
                Ok(())
            }
        }
    }

    /// Get all captured output. Always empty for stdout.
    pub fn get_output(&self) -> String {
        match self {
            Self::Stdout => String::new(),
            Self::Buffer(buf) => buf.borrow().clone(),
        }
    }
}
