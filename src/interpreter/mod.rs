//! Runtime: values, tables, scopes, natives and the interpreter session.

pub mod builtins;
pub mod context;
pub mod environment;
pub mod session;
pub mod table;
pub mod value;

pub use context::{Context, Output};
pub use environment::Environment;
pub use session::Interpreter;
pub use table::Table;
pub use value::{NativeFunction, Value};
