//! Interpreter session: one scanner, compiler and VM kept alive across inputs.
//!
//! Every `eval` lexes, parses and compiles its input onto the end of the
//! shared chunk, then runs only the new instructions. Functions and bindings
//! from earlier inputs stay visible.

use std::ops::Range;

use crate::config::EngineConfig;
use crate::error::{IonError, RuntimeError};
use crate::interpreter::builtins::register_builtins;
use crate::interpreter::context::Context;
use crate::interpreter::table::Table;
use crate::interpreter::value::{NativeFunction, Value};
use crate::lexer::Scanner;
use crate::parser::Parser;
use crate::vm::{disassemble_range, Chunk, Compiler, Vm};

pub struct Interpreter {
    scanner: Scanner,
    compiler: Compiler,
    vm: Vm,
    disassemble: bool,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_context(config, Context::new())
    }

    /// Session whose `print` output is captured instead of written to stdout.
    pub fn buffered(config: EngineConfig) -> Self {
        Self::with_context(config, Context::buffered())
    }

    pub fn with_context(config: EngineConfig, mut ctx: Context) -> Self {
        register_builtins(&mut ctx.env, config.prelude);
        Self {
            scanner: Scanner::new(),
            compiler: Compiler::new(),
            vm: Vm::with_context(&config, ctx),
            disassemble: false,
        }
    }

    /// Print the bytecode of every compiled unit to stderr.
    pub fn set_disassemble(&mut self, on: bool) {
        self.disassemble = on;
    }

    pub fn set_trace(&mut self, on: bool) {
        self.vm.set_trace(on);
    }

    /// Compile `source` onto the shared chunk and return the new range.
    pub fn compile(&mut self, source: &str) -> Result<Range<usize>, IonError> {
        let tokens = self.scanner.feed(source);
        let root = Parser::new(tokens).parse()?;
        let range = self.compiler.compile_program(&root)?;
        if self.disassemble && !range.is_empty() {
            eprint!("{}", disassemble_range(self.compiler.chunk(), range.clone()));
        }
        Ok(range)
    }

    /// Run a compiled range and return the value left on top of the stack.
    pub fn run(&mut self, range: Range<usize>) -> Result<Value, RuntimeError> {
        self.vm.reset();
        self.vm.run(self.compiler.chunk(), range)?;
        Ok(self.vm.result())
    }

    pub fn eval(&mut self, source: &str) -> Result<Value, IonError> {
        let range = self.compile(source)?;
        Ok(self.run(range)?)
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        self.vm.ctx.env.get(name).cloned()
    }

    pub fn globals(&self) -> &Table {
        self.vm.ctx.env.innermost()
    }

    /// Bind a host function as a global.
    pub fn define_native<F>(&mut self, name: &str, arity: Option<usize>, func: F)
    where
        F: Fn(&mut Context, Vec<Value>) -> Value + 'static,
    {
        let native = NativeFunction::new(name, arity, func);
        self.vm.ctx.env.define(name, Value::NativeFunction(native));
    }

    pub fn chunk(&self) -> &Chunk {
        self.compiler.chunk()
    }

    pub fn take_output(&mut self) -> Vec<String> {
        self.vm.ctx.take_output()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
