//! AST to bytecode.
//!
//! Compilation appends to a single long-lived chunk so that code from earlier
//! REPL lines stays addressable. Every group is either one of the four special
//! forms or an ordinary call: callee first, then arguments left to right, then
//! `FUNC_CALL n`.

use std::ops::Range;
use std::rc::Rc;

use num_bigint::BigInt;
use num_rational::BigRational;

use super::chunk::{Chunk, Constant};
use super::opcode::Op;
use crate::ast::Node;
use crate::error::CompileError;
use crate::lexer::{Token, TokenKind};
use crate::span::Span;

pub type CompileResult<T> = Result<T, CompileError>;

/// Native that `def` expands to.
pub const DEF_BINDER: &str = "def-str";

pub struct Compiler {
    chunk: Chunk,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            chunk: Chunk::new(),
        }
    }

    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    pub fn into_chunk(self) -> Chunk {
        self.chunk
    }

    /// Compile every top-level form of `root` and return the range of newly
    /// appended instructions. On error nothing from this unit is kept.
    pub fn compile_program(&mut self, root: &Node) -> CompileResult<Range<usize>> {
        let mark = self.chunk.mark();
        let start = self.chunk.len();

        let result = match root {
            Node::List { children, .. } => children.iter().try_for_each(|c| self.compile_node(c)),
            leaf => self.compile_node(leaf),
        };

        match result {
            Ok(()) => Ok(start..self.chunk.len()),
            Err(err) => {
                self.chunk.rollback(mark);
                Err(err)
            }
        }
    }

    pub fn compile_node(&mut self, node: &Node) -> CompileResult<()> {
        match node {
            Node::Leaf(token) => self.compile_leaf(token),
            Node::List { children, span } => self.compile_group(children, *span),
        }
    }

    fn emit(&mut self, op: Op, span: Span) -> usize {
        self.chunk.emit(op, span)
    }

    fn add_string_constant(&mut self, s: &str) -> usize {
        self.chunk.add_constant(Constant::String(Rc::from(s)))
    }

    fn compile_leaf(&mut self, token: &Token) -> CompileResult<()> {
        let op = match token.kind {
            TokenKind::Name => Op::PushName(self.add_string_constant(&token.text)),
            TokenKind::String => Op::PushValue(self.add_string_constant(&token.text)),
            TokenKind::Integer => {
                let n = parse_integer(&token.text)
                    .ok_or_else(|| CompileError::InvalidLiteral(token.text.clone(), token.span))?;
                Op::PushValue(self.chunk.add_constant(Constant::Integer(n)))
            }
            TokenKind::Float => {
                let r = parse_decimal(&token.text)
                    .ok_or_else(|| CompileError::InvalidLiteral(token.text.clone(), token.span))?;
                Op::PushValue(self.chunk.add_constant(Constant::Rational(r)))
            }
            TokenKind::Open | TokenKind::Close => {
                return Err(CompileError::UnexpectedToken(token.text.clone(), token.span))
            }
        };
        self.emit(op, token.span);
        Ok(())
    }

    fn compile_group(&mut self, children: &[Node], span: Span) -> CompileResult<()> {
        let Some(head) = children.first() else {
            return Err(CompileError::EmptyCall(span));
        };

        match head.as_name() {
            Some("def") => self.compile_def(children, span),
            Some("fn") => self.compile_fn(children, span),
            Some("if") => self.compile_if(children, span),
            Some("while") => self.compile_while(children, span),
            _ => self.compile_call(children, span),
        }
    }

    fn compile_call(&mut self, children: &[Node], span: Span) -> CompileResult<()> {
        for child in children {
            self.compile_node(child)?;
        }
        self.emit(Op::FuncCall(children.len() - 1), span);
        Ok(())
    }

    /// `(def name expr)` becomes `(def-str "name" expr)`.
    fn compile_def(&mut self, children: &[Node], span: Span) -> CompileResult<()> {
        let name = match children {
            [_, name, _] => name.as_name(),
            _ => None,
        };
        let Some(name) = name else {
            return Err(CompileError::arity(
                "def",
                "takes 2 arguments, the first must be a name",
                span,
            ));
        };

        let binder = self.add_string_constant(DEF_BINDER);
        self.emit(Op::PushName(binder), span);
        let literal = self.add_string_constant(name);
        self.emit(Op::PushValue(literal), children[1].span());
        self.compile_node(&children[2])?;
        self.emit(Op::FuncCall(2), span);
        Ok(())
    }

    /// `(fn body)`: jump over the body, then push a function entering it.
    fn compile_fn(&mut self, children: &[Node], span: Span) -> CompileResult<()> {
        let [_, body] = children else {
            return Err(CompileError::arity("fn", "takes 1 argument", span));
        };

        let skip = self.emit(Op::Jmp(0), span);
        let entry = self.chunk.len();
        self.compile_node(body)?;
        self.emit(Op::Return, span);
        self.chunk.patch_jump_here(skip);
        self.emit(Op::DefineFunction(entry), span);
        Ok(())
    }

    /// `(if cond body)`. No else branch; a skipped body pushes nothing.
    fn compile_if(&mut self, children: &[Node], span: Span) -> CompileResult<()> {
        let [_, condition, body] = children else {
            return Err(CompileError::arity("if", "takes 2 arguments", span));
        };

        self.compile_node(condition)?;
        let exit = self.emit(Op::JmpIfNot(0), span);
        self.compile_node(body)?;
        self.chunk.patch_jump_here(exit);
        Ok(())
    }

    /// `(while cond body)`. Leaves nothing on the stack.
    fn compile_while(&mut self, children: &[Node], span: Span) -> CompileResult<()> {
        let [_, condition, body] = children else {
            return Err(CompileError::arity("while", "takes 2 arguments", span));
        };

        let loop_start = self.chunk.len();
        self.compile_node(condition)?;
        let exit = self.emit(Op::JmpIfNot(0), span);
        self.compile_node(body)?;
        self.emit(Op::Pop, span);
        self.emit(Op::Jmp(loop_start), span);
        self.chunk.patch_jump_here(exit);
        Ok(())
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_integer(text: &str) -> Option<BigInt> {
    BigInt::parse_bytes(text.as_bytes(), 10)
}

/// `"12.50"` is 1250/100, reduced. No floating point is involved.
fn parse_decimal(text: &str) -> Option<BigRational> {
    let (whole, fraction) = text.split_once('.')?;
    let numer = parse_integer(&format!("{}{}", whole, fraction))?;
    let denom = num_traits::pow(BigInt::from(10), fraction.len());
    Some(BigRational::new(numer, denom))
}
