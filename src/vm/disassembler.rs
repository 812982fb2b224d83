//! Bytecode disassembler for debug output.

use std::ops::Range;

use super::chunk::{Chunk, Constant};
use super::opcode::Op;

/// Disassemble a whole chunk to a human-readable string.
pub fn disassemble(chunk: &Chunk) -> String {
    disassemble_range(chunk, 0..chunk.len())
}

/// Disassemble the instructions in `range`, e.g. one REPL line's worth.
pub fn disassemble_range(chunk: &Chunk, range: Range<usize>) -> String {
    let mut out = String::new();
    let end = range.end.min(chunk.len());
    for offset in range.start..end {
        let line = chunk.span(offset).line;
        let line_str = if offset > range.start && chunk.span(offset - 1).line == line {
            "   |".to_string()
        } else {
            format!("{:4}", line)
        };
        out.push_str(&format!(
            "{:04} {} {}\n",
            offset,
            line_str,
            describe(&chunk.code[offset], chunk)
        ));
    }
    out
}

/// One instruction with its constant resolved, e.g. `PUSH_NAME 0 (add)`.
pub fn describe(op: &Op, chunk: &Chunk) -> String {
    match op {
        Op::PushValue(idx) | Op::PushName(idx) => {
            format!("{} ({})", op, format_constant(chunk.constant(*idx)))
        }
        Op::Jmp(target) | Op::JmpIf(target) | Op::JmpIfNot(target) => {
            format!("{:<16} -> {:04}", op.name(), target)
        }
        _ => op.to_string(),
    }
}

fn format_constant(constant: Option<&Constant>) -> String {
    match constant {
        Some(Constant::Integer(n)) => n.to_string(),
        Some(Constant::Rational(r)) => r.to_string(),
        Some(Constant::String(s)) => s.to_string(),
        None => "???".to_string(),
    }
}
