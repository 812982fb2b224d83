//! Core globals: printing, type inspection, binding and library loading.

use crate::interpreter::environment::Environment;
use crate::interpreter::table::Table;
use crate::interpreter::value::{NativeFunction, Value};

use super::{define_all, function_table, type_error};

pub const VERSION: (i64, i64, i64) = (0, 0, 1);

pub fn system_functions() -> Vec<NativeFunction> {
    vec![
        // print(...) - writes what to-str(...) renders
        NativeFunction::new("print", None, |ctx, args| {
            match ctx.write_line(&render(&args)) {
                Ok(()) => Value::None,
                Err(e) => Value::error(format!("function \"print\" failed: {}", e)),
            }
        }),
        NativeFunction::new("to-str", None, |_, args| Value::string(render(&args))),
        NativeFunction::new("type-of", Some(1), |_, args| {
            Value::string(args[0].type_name())
        }),
        // def-str(name, value) - what `(def name value)` compiles to
        NativeFunction::new("def-str", Some(2), |ctx, args| match &args[0] {
            Value::String(name) => {
                ctx.env.define(name, args[1].clone());
                Value::None
            }
            _ => type_error("def-str", "string"),
        }),
        // merge(table...) - append every pair to the innermost scope as is
        NativeFunction::new("merge", None, |ctx, args| {
            if let Some(bad) = args.iter().find(|a| !matches!(a, Value::Table(_))) {
                return type_error("merge", &format!("table, got {}", bad.type_name()));
            }
            let scope = ctx.env.innermost_mut();
            for arg in args {
                if let Value::Table(table) = arg {
                    for (key, value) in table.iter() {
                        scope.push(key.clone(), value.clone());
                    }
                }
            }
            Value::None
        }),
        NativeFunction::new("lib-math", Some(0), |_, _| {
            Value::table(function_table(super::math::math_functions()))
        }),
        NativeFunction::new("lib-list", Some(0), |_, _| {
            Value::table(function_table(super::list::list_functions()))
        }),
        NativeFunction::new("lib-time", Some(0), |_, _| {
            Value::table(function_table(super::clock::clock_functions()))
        }),
        NativeFunction::new("lib-version", Some(0), |_, _| {
            let (major, minor, sub) = VERSION;
            let mut table = Table::new();
            table.set(Value::string("major"), Value::int(major));
            table.set(Value::string("minor"), Value::int(minor));
            table.set(Value::string("sub"), Value::int(sub));
            Value::table(table)
        }),
    ]
}

/// Renderings of `args`, space separated.
fn render(args: &[Value]) -> String {
    args.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Register the core globals, including `true` and `false`.
pub fn register_system_builtins(env: &mut Environment) {
    define_all(env, system_functions());
    env.define("true", Value::Boolean(true));
    env.define("false", Value::Boolean(false));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, Prelude};
    use crate::interpreter::Interpreter;

    fn core() -> Interpreter {
        Interpreter::buffered(EngineConfig {
            prelude: Prelude::Core,
            ..EngineConfig::default()
        })
    }

    #[test]
    fn test_print_uses_to_str() {
        let mut interp = core();
        interp.eval("(print \"hi\" 1 0.5 true)").unwrap();
        assert_eq!(interp.take_output(), vec!["\"hi\" 1 1/2 true"]);
    }

    #[test]
    fn test_to_str_joins_arguments() {
        let mut interp = core();
        assert_eq!(
            interp.eval("(to-str 1 \"a\" (list 2 0.5))").unwrap(),
            Value::string("1 \"a\" (list 2 1/2)")
        );
        assert_eq!(interp.eval("(to-str)").unwrap(), Value::string(""));
        interp.eval("(print (to-str 1 2) 3)").unwrap();
        assert_eq!(interp.take_output(), vec!["\"1 2\" 3"]);
    }

    #[test]
    fn test_type_of() {
        let mut interp = core();
        for (source, expected) in [
            ("(type-of 1)", "integer"),
            ("(type-of 1.5)", "rational"),
            ("(type-of \"s\")", "string"),
            ("(type-of print)", "function"),
            ("(type-of (fn 1))", "function"),
            ("(type-of true)", "boolean"),
            ("(type-of (print))", "none"),
            ("(type-of (lib-version))", "table"),
        ] {
            assert_eq!(interp.eval(source).unwrap(), Value::string(expected), "{}", source);
        }
    }

    #[test]
    fn test_def_str_binds_in_innermost_scope() {
        let mut interp = core();
        interp.eval("(def-str \"answer\" 42)").unwrap();
        assert_eq!(interp.global("answer"), Some(Value::int(42)));
        assert!(interp.eval("(def-str 1 2)").is_err());
    }

    #[test]
    fn test_core_prelude_needs_merge() {
        let mut interp = core();
        assert!(interp.eval("(add 1 2)").is_err());
        interp.eval("(merge (lib-math) (lib-list))").unwrap();
        assert_eq!(interp.eval("(add 1 2)").unwrap(), Value::int(3));
        assert_eq!(interp.eval("(len-of (list 1 2))").unwrap(), Value::int(2));
    }

    #[test]
    fn test_lib_version() {
        let mut interp = core();
        assert_eq!(
            interp.eval("(to-str (lib-version))").unwrap(),
            Value::string("(table \"major\" 0 \"minor\" 0 \"sub\" 1)")
        );
    }

    #[test]
    fn test_merge_rejects_non_tables() {
        let mut interp = core();
        assert!(interp.eval("(merge 1)").is_err());
    }
}
