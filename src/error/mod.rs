//! Error types for every phase: structure, compile, run.

use crate::span::Span;
use thiserror::Error;

/// Bracket structure errors raised while building the AST.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructureError {
    #[error("Unmatched closing bracket '{0}' at {1}")]
    UnmatchedClose(String, Span),

    #[error("{count} unclosed bracket(s) at end of input, innermost opened at {span}")]
    Unclosed { count: usize, span: Span },
}

impl StructureError {
    pub fn span(&self) -> Span {
        match self {
            Self::UnmatchedClose(_, span) => *span,
            Self::Unclosed { span, .. } => *span,
        }
    }
}

/// Compile errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("{form} {message} at {span}")]
    Arity {
        form: String,
        message: String,
        span: Span,
    },

    #[error("Cannot have an empty call at {0}")]
    EmptyCall(Span),

    #[error("Invalid literal '{0}' at {1}")]
    InvalidLiteral(String, Span),

    #[error("Unexpected token '{0}' at {1}")]
    UnexpectedToken(String, Span),
}

impl CompileError {
    pub fn arity(form: impl Into<String>, message: impl Into<String>, span: Span) -> Self {
        Self::Arity {
            form: form.into(),
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Arity { span, .. } => *span,
            Self::EmptyCall(span) => *span,
            Self::InvalidLiteral(_, span) => *span,
            Self::UnexpectedToken(_, span) => *span,
        }
    }
}

/// Runtime errors raised by the VM. Each one halts the current run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Unbound name '{0}' at {1}")]
    UnboundName(String, Span),

    #[error("Cannot call a value of type '{0}' at {1}")]
    NotCallable(String, Span),

    #[error("{message} at {span}")]
    Native { message: String, span: Span },

    #[error("Type error: {message} at {span}")]
    TypeError { message: String, span: Span },

    #[error("Operand stack underflow at {0}")]
    StackUnderflow(Span),

    #[error("Operand stack overflow (limit {0})")]
    StackOverflow(usize),

    #[error("Call depth limit of {0} exceeded at {1}")]
    CallDepthExceeded(usize, Span),

    #[error("Return outside of a function call at {0}")]
    ReturnOutsideCall(Span),

    #[error("Invalid constant index {0}")]
    InvalidConstant(usize),
}

impl RuntimeError {
    pub fn unbound_name(name: impl Into<String>, span: Span) -> Self {
        Self::UnboundName(name.into(), span)
    }

    pub fn not_callable(type_name: impl Into<String>, span: Span) -> Self {
        Self::NotCallable(type_name.into(), span)
    }

    pub fn native(message: impl Into<String>, span: Span) -> Self {
        Self::Native {
            message: message.into(),
            span,
        }
    }

    pub fn type_error(message: impl Into<String>, span: Span) -> Self {
        Self::TypeError {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnboundName(_, span)
            | Self::NotCallable(_, span)
            | Self::StackUnderflow(span)
            | Self::CallDepthExceeded(_, span)
            | Self::ReturnOutsideCall(span) => Some(*span),
            Self::Native { span, .. } | Self::TypeError { span, .. } => Some(*span),
            Self::StackOverflow(_) | Self::InvalidConstant(_) => None,
        }
    }
}

/// Table lookup errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("Key {0} not found in table")]
    KeyNotFound(String),
}

/// Unified error type for the whole pipeline.
#[derive(Debug, Error)]
pub enum IonError {
    #[error("Structure error: {0}")]
    Structure(#[from] StructureError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IonError {
    /// Process exit code for this error, following sysexits.h.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Structure(_) | Self::Compile(_) => 65,
            Self::Runtime(_) => 70,
            Self::Io(_) => 74,
        }
    }
}
