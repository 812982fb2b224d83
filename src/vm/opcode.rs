//! Bytecode opcodes.

use std::fmt;

/// A single instruction: an opcode kind and its integer operand.
///
/// Jump targets are absolute instruction indices into the shared stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Push a constant from the pool.
    PushValue(usize),
    /// Resolve the identifier held by a string constant and push its value.
    PushName(usize),
    /// Discard the top of the stack.
    Pop,
    /// Call the value below the top N arguments.
    FuncCall(usize),
    /// Pop; branch on true (or on any non-boolean).
    JmpIf(usize),
    /// Pop; branch on false (or on any non-boolean).
    JmpIfNot(usize),
    Jmp(usize),
    /// Push a user function entering at the given index.
    DefineFunction(usize),
    /// Resume after the innermost call site.
    Return,

    // Reserved. Never emitted.
    BeginScope,
    EndScope,
    Nop,
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::PushValue(_) => "PUSH_VALUE",
            Op::PushName(_) => "PUSH_NAME",
            Op::Pop => "POP",
            Op::FuncCall(_) => "FUNC_CALL",
            Op::JmpIf(_) => "JMP_IF",
            Op::JmpIfNot(_) => "JMP_IF_NOT",
            Op::Jmp(_) => "JMP",
            Op::DefineFunction(_) => "DEFINE_FUNCTION",
            Op::Return => "RETURN",
            Op::BeginScope => "BEGIN_SCOPE",
            Op::EndScope => "END_SCOPE",
            Op::Nop => "NOP",
        }
    }

    pub fn operand(&self) -> Option<usize> {
        match *self {
            Op::PushValue(n)
            | Op::PushName(n)
            | Op::FuncCall(n)
            | Op::JmpIf(n)
            | Op::JmpIfNot(n)
            | Op::Jmp(n)
            | Op::DefineFunction(n) => Some(n),
            Op::Pop | Op::Return | Op::BeginScope | Op::EndScope | Op::Nop => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand() {
            Some(n) => write!(f, "{:<16} {:>5}", self.name(), n),
            None => write!(f, "{}", self.name()),
        }
    }
}
