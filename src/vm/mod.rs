//! Bytecode compiler and stack VM.
//!
//! The compiler appends to one shared chunk; the VM executes any instruction
//! range of it, which is how a REPL runs just the code for the latest line.

pub mod chunk;
pub mod compiler;
pub mod disassembler;
pub mod opcode;
#[allow(clippy::module_inception)]
pub mod vm;

pub use chunk::{Chunk, Constant};
pub use compiler::Compiler;
pub use disassembler::{disassemble, disassemble_range};
pub use opcode::Op;
pub use vm::{Vm, VmResult};
