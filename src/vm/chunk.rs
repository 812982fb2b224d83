//! Shared instruction stream and constant pool.

use std::collections::HashMap;
use std::rc::Rc;

use num_bigint::BigInt;
use num_rational::BigRational;

use super::opcode::Op;
use crate::interpreter::value::Value;
use crate::span::Span;

/// A constant value stored in a chunk's constant pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Integer(BigInt),
    Rational(BigRational),
    String(Rc<str>),
}

impl Constant {
    pub fn to_value(&self) -> Value {
        match self {
            Constant::Integer(n) => Value::Integer(n.clone()),
            Constant::Rational(r) => Value::Rational(r.clone()),
            Constant::String(s) => Value::String(Rc::clone(s)),
        }
    }
}

/// Lengths of a chunk at some point, for rolling back a failed compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMark {
    code: usize,
    constants: usize,
}

/// Instructions, their source positions and the constant pool.
///
/// Append-only while a user function may point into it: entry offsets are
/// plain indices into `code`.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    pub code: Vec<Op>,
    /// Source positions, parallel to `code`.
    pub spans: Vec<Span>,
    pub constants: Vec<Constant>,
    /// Pool index of every string constant.
    strings: HashMap<Rc<str>, usize>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit an instruction and record its source position.
    pub fn emit(&mut self, op: Op, span: Span) -> usize {
        let offset = self.code.len();
        self.code.push(op);
        self.spans.push(span);
        offset
    }

    /// Add a constant to the pool and return its index.
    pub fn add_constant(&mut self, constant: Constant) -> usize {
        let idx = self.constants.len();
        // Reuse identical strings; names repeat a lot.
        if let Constant::String(ref s) = constant {
            if let Some(&existing) = self.strings.get(s) {
                return existing;
            }
            self.strings.insert(Rc::clone(s), idx);
        }
        self.constants.push(constant);
        idx
    }

    pub fn constant(&self, idx: usize) -> Option<&Constant> {
        self.constants.get(idx)
    }

    pub fn constant_name(&self, idx: usize) -> Option<&str> {
        match self.constants.get(idx) {
            Some(Constant::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn span(&self, offset: usize) -> Span {
        self.spans.get(offset).copied().unwrap_or_default()
    }

    /// Get the current offset (next instruction index).
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Point the jump at `offset` to `target`.
    pub fn patch_jump(&mut self, offset: usize, target: usize) {
        match &mut self.code[offset] {
            Op::Jmp(t) | Op::JmpIf(t) | Op::JmpIfNot(t) => *t = target,
            _ => panic!("Tried to patch non-jump instruction at offset {}", offset),
        }
    }

    /// Point the jump at `offset` to the next instruction to be emitted.
    pub fn patch_jump_here(&mut self, offset: usize) {
        let target = self.code.len();
        self.patch_jump(offset, target);
    }

    pub fn mark(&self) -> ChunkMark {
        ChunkMark {
            code: self.code.len(),
            constants: self.constants.len(),
        }
    }

    /// Drop everything appended since `mark`.
    pub fn rollback(&mut self, mark: ChunkMark) {
        self.code.truncate(mark.code);
        self.spans.truncate(mark.code);
        self.constants.truncate(mark.constants);
        self.strings.retain(|_, idx| *idx < mark.constants);
    }
}
