//! List and table built-in functions.

use crate::interpreter::environment::Environment;
use crate::interpreter::table::Table;
use crate::interpreter::value::{NativeFunction, Value};

use super::{define_all, function_table, need_args, type_error};

pub fn list_functions() -> Vec<NativeFunction> {
    vec![
        NativeFunction::new("list", None, |_, args| Value::list(args)),
        // table(k1, v1, k2, v2, ...) - pairs kept in order, as given
        NativeFunction::new("table", None, |_, args| {
            if args.len() % 2 != 0 {
                return Value::error("function \"table\" needs an even number of arguments");
            }
            let mut args = args.into_iter();
            let mut table = Table::new();
            while let (Some(key), Some(value)) = (args.next(), args.next()) {
                table.push(key, value);
            }
            Value::table(table)
        }),
        NativeFunction::new("append", None, |_, args| append(args)),
        NativeFunction::new("index", None, |_, args| index(&args)),
        NativeFunction::new("len-of", Some(1), |_, args| match &args[0] {
            Value::String(s) => Value::int(s.chars().count() as i64),
            Value::List(items) => Value::int(items.len() as i64),
            Value::Table(table) => Value::int(table.len() as i64),
            _ => type_error("len-of", "string, list, table"),
        }),
        // get-time() - same table as lib-time
        NativeFunction::new("get-time", Some(0), |_, _| {
            Value::table(function_table(super::clock::clock_functions()))
        }),
        // vars() - snapshot of the innermost scope
        NativeFunction::new("vars", Some(0), |ctx, _| {
            Value::table(ctx.env.innermost().clone())
        }),
    ]
}

/// Register all list and table built-in functions.
pub fn register_list_builtins(env: &mut Environment) {
    define_all(env, list_functions());
}

/// `(append table key value)` returns a copy with the key set in place or
/// appended. `(append list v...)` returns a copy with the values added.
fn append(args: Vec<Value>) -> Value {
    let Some((target, rest)) = args.split_first() else {
        return need_args("append", 2);
    };

    match target {
        Value::Table(table) => {
            let [key, value] = rest else {
                return Value::error("function \"append\" on a table takes a key and a value");
            };
            let mut copy = Table::clone(table);
            copy.set(key.clone(), value.clone());
            Value::table(copy)
        }
        Value::List(items) => {
            let mut copy = Vec::clone(items);
            copy.extend(rest.iter().cloned());
            Value::list(copy)
        }
        _ => type_error("append", "table, list"),
    }
}

/// `(index list i)` with negative `i` counting from the end, or
/// `(index table key [default])`.
fn index(args: &[Value]) -> Value {
    match args {
        [Value::List(items), Value::Integer(_)] => {
            let len = items.len() as i64;
            let resolved = args[1]
                .as_i64()
                .map(|i| if i < 0 { i + len } else { i })
                .filter(|i| (0..len).contains(i));
            match resolved {
                Some(i) => items[i as usize].clone(),
                None => Value::error(format!(
                    "function \"index\" index {} out of range for list of length {}",
                    args[1], len
                )),
            }
        }
        [Value::List(_), _] => type_error("index", "an integer list index"),
        [Value::Table(table), key] => match table.get(key) {
            Ok(value) => value.clone(),
            Err(e) => Value::error(e.to_string()),
        },
        [Value::Table(table), key, default] => table.lookup(key).unwrap_or(default).clone(),
        [_, ..] if args.len() >= 2 => type_error("index", "list, table"),
        _ => need_args("index", 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, Prelude};
    use crate::interpreter::Interpreter;

    fn eval(source: &str) -> Value {
        Interpreter::buffered(Default::default()).eval(source).unwrap()
    }

    fn eval_err(source: &str) -> String {
        Interpreter::buffered(Default::default())
            .eval(source)
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn test_list_and_len() {
        assert_eq!(eval("(len-of (list 1 2 3))"), Value::int(3));
        assert_eq!(eval("(len-of \"héllo\")"), Value::int(5));
        assert_eq!(eval("(len-of (table 1 2 3 4))"), Value::int(2));
        assert!(eval_err("(len-of 1)").contains("len-of"));
    }

    #[test]
    fn test_index_list() {
        assert_eq!(eval("(index (list 10 20 30) 0)"), Value::int(10));
        assert_eq!(eval("(index (list 10 20 30) (sub 1))"), Value::int(30));
        assert!(eval_err("(index (list 10) 1)").contains("out of range"));
        assert!(eval_err("(index (list 10) \"a\")").contains("integer list index"));
    }

    #[test]
    fn test_index_table() {
        assert_eq!(eval("(index (table \"a\" 1 \"b\" 2) \"b\")"), Value::int(2));
        assert_eq!(eval("(index (table true 1 false 2) false)"), Value::int(2));
        assert_eq!(eval("(index (table \"a\" 1) \"z\" 0)"), Value::int(0));
        assert!(eval_err("(index (table \"a\" 1) \"z\")").contains("not found"));
    }

    #[test]
    fn test_table_needs_pairs() {
        assert!(eval_err("(table 1)").contains("even number"));
    }

    #[test]
    fn test_append_updates_in_place() {
        assert_eq!(
            eval("(to-str (append (table \"a\" 1 \"b\" 2) \"a\" 9))"),
            Value::string("(table \"a\" 9 \"b\" 2)")
        );
        assert_eq!(
            eval("(to-str (append (table \"a\" 1) \"c\" 3))"),
            Value::string("(table \"a\" 1 \"c\" 3)")
        );
        assert_eq!(
            eval("(len-of (append (append (table) 1 1) 1 2))"),
            Value::int(1)
        );
    }

    #[test]
    fn test_append_does_not_mutate_original() {
        let mut interp = Interpreter::buffered(Default::default());
        interp.eval("(def t (table \"a\" 1))").unwrap();
        interp.eval("(def u (append t \"b\" 2))").unwrap();
        assert_eq!(interp.eval("(len-of t)").unwrap(), Value::int(1));
        assert_eq!(interp.eval("(len-of u)").unwrap(), Value::int(2));
    }

    #[test]
    fn test_append_list() {
        assert_eq!(
            eval("(append (list 1) 2 3)"),
            Value::list(vec![Value::int(1), Value::int(2), Value::int(3)])
        );
    }

    #[test]
    fn test_lib_list_exports_get_time() {
        let mut interp = Interpreter::buffered(EngineConfig {
            prelude: Prelude::Core,
            ..EngineConfig::default()
        });
        interp.eval("(merge (lib-list))").unwrap();
        interp.eval("(merge (get-time))").unwrap();
        assert_eq!(
            interp.eval("(type-of (time-seconds))").unwrap(),
            Value::string("integer")
        );
        assert_eq!(
            eval("(len-of (get-time))"),
            eval("(len-of (lib-time))")
        );
    }

    #[test]
    fn test_vars_snapshots_scope() {
        let mut interp = Interpreter::buffered(Default::default());
        interp.eval("(def answer 42)").unwrap();
        assert_eq!(
            interp.eval("(index (vars) \"answer\")").unwrap(),
            Value::int(42)
        );
    }
}
