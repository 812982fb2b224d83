//! State handle passed to native functions.

use std::io::{self, Write};

use crate::interpreter::environment::Environment;

/// Where `print` output goes.
#[derive(Debug)]
pub enum Output {
    Stdout,
    /// Captured lines, used by tests and embedders.
    Buffer(Vec<String>),
}

/// The part of the VM natives may touch: the scope stack and the output sink.
#[derive(Debug)]
pub struct Context {
    pub env: Environment,
    pub output: Output,
}

impl Context {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            output: Output::Stdout,
        }
    }

    pub fn buffered() -> Self {
        Self {
            env: Environment::new(),
            output: Output::Buffer(Vec::new()),
        }
    }

    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        match &mut self.output {
            Output::Stdout => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{}", line)?;
                stdout.flush()
            }
            Output::Buffer(lines) => {
                lines.push(line.to_string());
                Ok(())
            }
        }
    }

    /// Drain captured output. Empty when writing to stdout.
    pub fn take_output(&mut self) -> Vec<String> {
        match &mut self.output {
            Output::Stdout => Vec::new(),
            Output::Buffer(lines) => std::mem::take(lines),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
