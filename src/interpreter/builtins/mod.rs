//! Built-in native functions.
//!
//! Each group exposes its functions as a list so they can be bound directly
//! as globals and also handed out as a table by the `lib-*` getters.

pub mod clock;
pub mod list;
pub mod math;
pub mod system;

use crate::config::Prelude;
use crate::interpreter::environment::Environment;
use crate::interpreter::table::Table;
use crate::interpreter::value::{NativeFunction, Value};

pub use clock::register_clock_builtins;
pub use list::register_list_builtins;
pub use math::register_math_builtins;
pub use system::register_system_builtins;

/// Register the globals a fresh interpreter starts with.
pub fn register_builtins(env: &mut Environment, prelude: Prelude) {
    register_system_builtins(env);
    if prelude == Prelude::Full {
        register_math_builtins(env);
        register_list_builtins(env);
        register_clock_builtins(env);
    }
}

pub(crate) fn define_all(env: &mut Environment, functions: Vec<NativeFunction>) {
    for function in functions {
        let name = function.name.clone();
        env.define(&name, Value::NativeFunction(function));
    }
}

/// Name-to-function table handed out by `lib-math` and friends.
pub(crate) fn function_table(functions: Vec<NativeFunction>) -> Table {
    functions
        .into_iter()
        .map(|f| (Value::string(&f.name), Value::NativeFunction(f)))
        .collect()
}

pub(crate) fn type_error(name: &str, expected: &str) -> Value {
    Value::error(format!("function \"{}\" can only deal with {}", name, expected))
}

pub(crate) fn need_args(name: &str, min: usize) -> Value {
    Value::error(format!(
        "function \"{}\" needs at least {} argument(s)",
        name, min
    ))
}
