//! ion: a small dynamically-typed language with a bytecode VM.
//!
//! Source goes through four stages:
//! - **Lexer**: characters to flat tokens, resumable across inputs
//! - **Parser**: tokens to a tree keyed purely on bracket nesting
//! - **Compiler**: tree to instructions appended to one shared chunk
//! - **VM**: runs any instruction range of that chunk
//!
//! [`interpreter::Interpreter`] keeps all four alive so that later inputs see
//! earlier definitions, which is what the REPL relies on.

#![allow(clippy::module_inception)]
#![allow(clippy::result_large_err)]
#![allow(clippy::new_without_default)]

pub mod ast;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod span;
pub mod vm;

use std::path::Path;

use config::EngineConfig;
use error::IonError;
use interpreter::{Interpreter, Value};

/// Run a program in a fresh session and return its final value.
pub fn run(source: &str) -> Result<Value, IonError> {
    run_with_config(source, EngineConfig::default())
}

pub fn run_with_config(source: &str, config: EngineConfig) -> Result<Value, IonError> {
    Interpreter::with_config(config).eval(source)
}

/// Run a program from a file.
pub fn run_file(path: &Path, config: EngineConfig) -> Result<Value, IonError> {
    let source = std::fs::read_to_string(path)?;
    run_with_config(&source, config)
}

/// Parse source into its root node without compiling.
pub fn parse(source: &str) -> Result<ast::Node, IonError> {
    let tokens = lexer::Scanner::scan(source);
    Ok(parser::Parser::new(tokens).parse()?)
}

/// Compile source into a standalone chunk.
pub fn compile(source: &str) -> Result<vm::Chunk, IonError> {
    let root = parse(source)?;
    let mut compiler = vm::Compiler::new();
    compiler.compile_program(&root)?;
    Ok(compiler.into_chunk())
}

/// Compile and disassemble source.
pub fn disassemble(source: &str) -> Result<String, IonError> {
    Ok(vm::disassemble(&compile(source)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run() {
        assert_eq!(run("(def x 3) (add x 4)").unwrap(), Value::int(7));
    }

    #[test]
    fn test_run_reports_each_phase() {
        assert!(matches!(run("(add 1"), Err(IonError::Structure(_))));
        assert!(matches!(run("()"), Err(IonError::Compile(_))));
        assert!(matches!(run("(undefined-thing)"), Err(IonError::Runtime(_))));
    }

    #[test]
    fn test_run_file() {
        let path = std::env::temp_dir().join(format!("ion-run-file-{}.ion", std::process::id()));
        std::fs::write(&path, "(def total 0)\n(def i 0)\n(while (less-than i 4)\n  (do (def i (add i 1)) (def total (add total i))))\ntotal\n").unwrap();
        let result = run_file(&path, EngineConfig::default());
        let _ = std::fs::remove_file(&path);
        assert_eq!(result.unwrap(), Value::int(10));
        assert!(matches!(
            run_file(Path::new("/definitely/not/here.ion"), EngineConfig::default()),
            Err(IonError::Io(_))
        ));
    }

    #[test]
    fn test_disassemble() {
        let out = disassemble("(def x 1)").unwrap();
        assert!(out.contains("PUSH_NAME"));
        assert!(out.contains("(def-str)"));
        assert!(out.contains("FUNC_CALL"));
    }
}
