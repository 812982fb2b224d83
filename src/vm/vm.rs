//! The bytecode virtual machine: stack-based execution over a shared chunk.
//!
//! A run executes the instruction range `start..end` of a chunk. Calls into
//! user functions may jump anywhere in the chunk, including code appended by
//! earlier runs. The first error halts the run and is returned to the caller;
//! bindings made before it are kept.

use std::ops::Range;

use colored::Colorize;

use super::chunk::Chunk;
use super::disassembler;
use super::opcode::Op;
use crate::config::EngineConfig;
use crate::error::RuntimeError;
use crate::interpreter::context::Context;
use crate::interpreter::value::Value;
use crate::span::Span;

pub type VmResult<T> = Result<T, RuntimeError>;

pub struct Vm {
    /// Operand stack.
    pub stack: Vec<Value>,
    /// Indices of the `FUNC_CALL` instructions currently being executed.
    pub return_stack: Vec<usize>,
    /// Globals and output, shared with native functions.
    pub ctx: Context,
    max_stack: usize,
    max_call_depth: usize,
    trace: bool,
    strict_conditions: bool,
}

impl Vm {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_context(config, Context::new())
    }

    pub fn with_context(config: &EngineConfig, ctx: Context) -> Self {
        Self {
            stack: Vec::with_capacity(256),
            return_stack: Vec::with_capacity(64),
            ctx,
            max_stack: config.max_stack,
            max_call_depth: config.max_call_depth,
            trace: config.trace,
            strict_conditions: config.strict_conditions,
        }
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    /// Clear the operand and return stacks. Globals are untouched.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.return_stack.clear();
    }

    /// Top of the operand stack, or none when it is empty.
    pub fn result(&self) -> Value {
        self.stack.last().cloned().unwrap_or(Value::None)
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Run the dispatch loop over `range`.
    pub fn run(&mut self, chunk: &Chunk, range: Range<usize>) -> VmResult<()> {
        let end = range.end.min(chunk.len());
        let mut ip = range.start;

        while ip < end {
            let op = chunk.code[ip];
            if self.trace {
                self.trace_op(chunk, ip, &op);
            }
            ip = self.step(chunk, ip, op)?;
        }

        Ok(())
    }

    /// Execute one instruction and return the index of the next.
    fn step(&mut self, chunk: &Chunk, ip: usize, op: Op) -> VmResult<usize> {
        let span = chunk.span(ip);

        match op {
            Op::PushValue(idx) => {
                let value = chunk
                    .constant(idx)
                    .ok_or(RuntimeError::InvalidConstant(idx))?
                    .to_value();
                self.push(value)?;
            }
            Op::PushName(idx) => {
                let name = chunk
                    .constant_name(idx)
                    .ok_or(RuntimeError::InvalidConstant(idx))?;
                let value = self
                    .ctx
                    .env
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::unbound_name(name, span))?;
                self.push(value)?;
            }
            Op::Pop => {
                self.pop(span)?;
            }
            Op::FuncCall(argc) => return self.call(argc, ip, span),
            Op::JmpIf(target) => {
                let condition = self.pop(span)?;
                if self.branches(&condition, true, span)? {
                    return Ok(target);
                }
            }
            Op::JmpIfNot(target) => {
                let condition = self.pop(span)?;
                if self.branches(&condition, false, span)? {
                    return Ok(target);
                }
            }
            Op::Jmp(target) => return Ok(target),
            Op::DefineFunction(entry) => self.push(Value::UserFunction(entry))?,
            Op::Return => {
                let call_site = self
                    .return_stack
                    .pop()
                    .ok_or(RuntimeError::ReturnOutsideCall(span))?;
                return Ok(call_site + 1);
            }
            Op::BeginScope | Op::EndScope | Op::Nop => {}
        }

        Ok(ip + 1)
    }

    fn call(&mut self, argc: usize, ip: usize, span: Span) -> VmResult<usize> {
        if self.stack.len() < argc + 1 {
            return Err(RuntimeError::StackUnderflow(span));
        }
        let args = self.stack.split_off(self.stack.len() - argc);
        let callee_slot = self.stack.len() - 1;

        match &self.stack[callee_slot] {
            Value::NativeFunction(native) => {
                let native = native.clone();
                match native.call(&mut self.ctx, args) {
                    Value::Error(message) => Err(RuntimeError::native(&*message, span)),
                    result => {
                        self.stack[callee_slot] = result;
                        Ok(ip + 1)
                    }
                }
            }
            Value::UserFunction(entry) => {
                let entry = *entry;
                if self.return_stack.len() >= self.max_call_depth {
                    return Err(RuntimeError::CallDepthExceeded(self.max_call_depth, span));
                }
                // Arguments are evaluated but user functions take no parameters.
                self.stack.pop();
                self.return_stack.push(ip);
                Ok(entry)
            }
            other => Err(RuntimeError::not_callable(other.type_name(), span)),
        }
    }

    /// Non-boolean conditions take the branch whichever jump is used, unless
    /// strict conditions are enabled.
    fn branches(&self, condition: &Value, branch_on: bool, span: Span) -> VmResult<bool> {
        match condition {
            Value::Boolean(b) => Ok(*b == branch_on),
            other if self.strict_conditions => Err(RuntimeError::type_error(
                format!("condition must be a boolean, got {}", other.type_name()),
                span,
            )),
            _ => Ok(true),
        }
    }

    fn push(&mut self, value: Value) -> VmResult<()> {
        if self.stack.len() >= self.max_stack {
            return Err(RuntimeError::StackOverflow(self.max_stack));
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self, span: Span) -> VmResult<Value> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow(span))
    }

    fn trace_op(&self, chunk: &Chunk, ip: usize, op: &Op) {
        eprintln!(
            "{} {:04} {} depth={}",
            "[TRACE]".dimmed(),
            ip,
            disassembler::describe(op, chunk),
            self.stack.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::builtins::register_builtins;
    use crate::lexer::Scanner;
    use crate::parser::Parser;
    use crate::vm::compiler::Compiler;
    use pretty_assertions::assert_eq;

    struct Harness {
        compiler: Compiler,
        vm: Vm,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_config(EngineConfig::default())
        }

        fn with_config(config: EngineConfig) -> Self {
            let mut ctx = Context::buffered();
            register_builtins(&mut ctx.env, config.prelude);
            Self {
                compiler: Compiler::new(),
                vm: Vm::with_context(&config, ctx),
            }
        }

        fn compile(&mut self, source: &str) -> Range<usize> {
            let root = Parser::new(Scanner::scan(source)).parse().unwrap();
            self.compiler.compile_program(&root).unwrap()
        }

        fn run(&mut self, source: &str) -> VmResult<Value> {
            let range = self.compile(source);
            self.vm.reset();
            self.vm.run(self.compiler.chunk(), range)?;
            Ok(self.vm.result())
        }

        fn global(&self, name: &str) -> Option<Value> {
            self.vm.ctx.env.get(name).cloned()
        }
    }

    #[test]
    fn test_def_then_use_across_runs() {
        let mut h = Harness::new();
        h.run("(def x 3)").unwrap();
        assert_eq!(h.run("(add x 4)").unwrap(), Value::int(7));
    }

    #[test]
    fn test_call_user_function() {
        let mut h = Harness::new();
        assert_eq!(h.run("((fn (add 1 2)))").unwrap(), Value::int(3));
        assert!(h.vm.return_stack.is_empty());
    }

    #[test]
    fn test_return_resumes_after_call_site() {
        let mut h = Harness::new();
        // The value pushed after the call proves execution continued there.
        let range = h.compile("(def f (fn 1)) (f) 2");
        h.vm.run(h.compiler.chunk(), range).unwrap();
        let top: Vec<Value> = h.vm.stack.iter().rev().take(2).cloned().collect();
        assert_eq!(top, vec![Value::int(2), Value::int(1)]);
    }

    #[test]
    fn test_function_defined_in_earlier_run() {
        let mut h = Harness::new();
        h.run("(def f (fn (mul 6 7)))").unwrap();
        assert_eq!(h.run("(f)").unwrap(), Value::int(42));
        assert_eq!(h.run("(add (f) 1)").unwrap(), Value::int(43));
    }

    #[test]
    fn test_user_function_discards_arguments() {
        let mut h = Harness::new();
        h.run("(def f (fn 5))").unwrap();
        assert_eq!(h.run("(f 1 2 3)").unwrap(), Value::int(5));
        assert_eq!(h.vm.stack_depth(), 1);
    }

    #[test]
    fn test_while_loop() {
        let mut h = Harness::new();
        h.run("(def i 0)").unwrap();
        h.run("(while (less-than i 3) (def i (add i 1)))").unwrap();
        assert_eq!(h.global("i"), Some(Value::int(3)));
    }

    #[test]
    fn test_while_body_runs_once_per_true_condition() {
        let mut h = Harness::new();
        h.run("(def n 0) (def runs 0)").unwrap();
        h.run("(while (less-than n 5) (do (def n (add n 1)) (def runs (add runs 1))))")
            .unwrap();
        assert_eq!(h.global("runs"), Some(Value::int(5)));
        h.run("(while false (def runs 100))").unwrap();
        assert_eq!(h.global("runs"), Some(Value::int(5)));
        assert_eq!(h.vm.stack_depth(), 0);
    }

    #[test]
    fn test_if_stack_effect() {
        let mut h = Harness::new();
        h.run("(if true 1)").unwrap();
        let taken = h.vm.stack_depth();
        h.run("(if false 1)").unwrap();
        let skipped = h.vm.stack_depth();
        assert_eq!(taken, skipped + 1);
        assert_eq!(h.run("(if true \"yes\")").unwrap(), Value::string("yes"));
    }

    #[test]
    fn test_non_boolean_condition_always_branches() {
        let mut h = Harness::new();
        // JMP_IF_NOT branches on a non-boolean, so the body is skipped.
        h.run("(if 1 (def hit true))").unwrap();
        assert_eq!(h.global("hit"), None);
        // Same for while: the loop exits immediately.
        h.run("(while none-such 1)").unwrap_err();
        h.run("(while 0 (def looped true))").unwrap();
        assert_eq!(h.global("looped"), None);
    }

    #[test]
    fn test_jmp_if_branches_on_true_and_non_boolean() {
        let mut chunk = Chunk::new();
        let truthy = chunk.add_constant(crate::vm::chunk::Constant::Integer(1.into()));
        chunk.emit(Op::PushValue(truthy), Span::default());
        chunk.emit(Op::JmpIf(3), Span::default());
        chunk.emit(Op::PushValue(truthy), Span::default());
        let mut vm = Vm::with_context(&EngineConfig::default(), Context::buffered());
        vm.run(&chunk, 0..chunk.len()).unwrap();
        assert_eq!(vm.stack_depth(), 0);
    }

    #[test]
    fn test_strict_conditions() {
        let config = EngineConfig {
            strict_conditions: true,
            ..EngineConfig::default()
        };
        let mut h = Harness::with_config(config);
        assert!(matches!(
            h.run("(if 1 2)"),
            Err(RuntimeError::TypeError { .. })
        ));
        assert_eq!(h.run("(if true 2)").unwrap(), Value::int(2));
    }

    #[test]
    fn test_unbound_name() {
        let mut h = Harness::new();
        match h.run("(add 1\n  missing)") {
            Err(RuntimeError::UnboundName(name, span)) => {
                assert_eq!(name, "missing");
                assert_eq!(span, Span::new(2, 3));
            }
            other => panic!("expected unbound name, got {:?}", other),
        }
    }

    #[test]
    fn test_not_callable() {
        let mut h = Harness::new();
        assert!(matches!(
            h.run("(1 2)"),
            Err(RuntimeError::NotCallable(ref t, _)) if t == "integer"
        ));
    }

    #[test]
    fn test_native_error_halts_but_keeps_earlier_bindings() {
        let mut h = Harness::new();
        let err = h.run("(def a 1) (add 1 \"x\") (def b 2)").unwrap_err();
        assert!(matches!(err, RuntimeError::Native { .. }));
        assert_eq!(h.global("a"), Some(Value::int(1)));
        assert_eq!(h.global("b"), None);
        // The next run starts clean.
        assert_eq!(h.run("(add a 1)").unwrap(), Value::int(2));
    }

    #[test]
    fn test_call_depth_limit() {
        let config = EngineConfig {
            max_call_depth: 16,
            ..EngineConfig::default()
        };
        let mut h = Harness::with_config(config);
        h.run("(def loop (fn (loop)))").unwrap();
        assert_eq!(
            h.run("(loop)"),
            Err(RuntimeError::CallDepthExceeded(16, Span::new(1, 15)))
        );
    }

    #[test]
    fn test_stack_limit() {
        let config = EngineConfig {
            max_stack: 4,
            ..EngineConfig::default()
        };
        let mut h = Harness::with_config(config);
        assert_eq!(h.run("1 2 3 4 5"), Err(RuntimeError::StackOverflow(4)));
    }

    #[test]
    fn test_return_outside_call() {
        let mut chunk = Chunk::new();
        chunk.emit(Op::Return, Span::new(1, 1));
        let mut vm = Vm::with_context(&EngineConfig::default(), Context::buffered());
        assert_eq!(
            vm.run(&chunk, 0..1),
            Err(RuntimeError::ReturnOutsideCall(Span::new(1, 1)))
        );
    }

    #[test]
    fn test_reserved_ops_do_nothing() {
        let mut chunk = Chunk::new();
        chunk.emit(Op::BeginScope, Span::default());
        chunk.emit(Op::Nop, Span::default());
        chunk.emit(Op::EndScope, Span::default());
        let mut vm = Vm::with_context(&EngineConfig::default(), Context::buffered());
        vm.run(&chunk, 0..3).unwrap();
        assert_eq!(vm.stack_depth(), 0);
        assert_eq!(vm.ctx.env.depth(), 1);
    }

    #[test]
    fn test_recursion_through_globals() {
        let mut h = Harness::new();
        h.run("(def n 0)").unwrap();
        // The recursive call sits in tail position so a skipped `if` body
        // never leaves a caller short of an argument.
        h.run("(def count-up (fn (if (do (def n (add n 1)) (less-than n 10)) (count-up))))")
            .unwrap();
        h.run("(count-up)").unwrap();
        assert_eq!(h.global("n"), Some(Value::int(10)));
    }
}
