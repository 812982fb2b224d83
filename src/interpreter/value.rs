//! Runtime values.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive};

use crate::interpreter::context::Context;
use crate::interpreter::table::Table;

/// Signature every native function implements. Failure is reported in-band by
/// returning `Value::Error`.
pub type NativeFn = dyn Fn(&mut Context, Vec<Value>) -> Value;

/// A dynamically-typed value.
///
/// Strings, lists and tables are shared by reference and never mutated after
/// construction; "modifying" builtins return a fresh copy.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(BigInt),
    /// Exact fraction. Kept as a rational even when the denominator is one.
    Rational(BigRational),
    String(Rc<str>),
    List(Rc<Vec<Value>>),
    Table(Rc<Table>),
    Boolean(bool),
    NativeFunction(NativeFunction),
    /// Entry offset into the shared instruction stream. Captures nothing.
    UserFunction(usize),
    Error(Rc<str>),
    None,
    /// Host data the VM passes around without looking inside.
    Data(Rc<dyn Any>),
}

impl Value {
    pub fn int(n: i64) -> Self {
        Value::Integer(BigInt::from(n))
    }

    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn error(message: impl AsRef<str>) -> Self {
        Value::Error(Rc::from(message.as_ref()))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }

    pub fn table(table: Table) -> Self {
        Value::Table(Rc::new(table))
    }

    /// Collapse an arithmetic result: whole numbers become Integers.
    pub fn from_rational(r: BigRational) -> Self {
        if r.denom().is_one() {
            Value::Integer(r.to_integer())
        } else {
            Value::Rational(r)
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Rational(_) => "rational",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Table(_) => "table",
            Value::Boolean(_) => "boolean",
            Value::NativeFunction(_) | Value::UserFunction(_) => "function",
            Value::Error(_) => "error",
            Value::None => "none",
            Value::Data(_) => "data",
        }
    }

    /// Whether both values carry the same variant.
    pub fn same_tag(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Numeric view used by arithmetic and comparisons.
    pub fn as_rational(&self) -> Option<BigRational> {
        match self {
            Value::Integer(n) => Some(BigRational::from_integer(n.clone())),
            Value::Rational(r) => Some(r.clone()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => n.to_i64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Tag-exact: an Integer never equals a Rational, whatever their values.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Rational(a), Value::Rational(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(&a.func, &b.func),
            (Value::UserFunction(a), Value::UserFunction(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::None, Value::None) => true,
            (Value::Data(a), Value::Data(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// The `to-str` rendering.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Rational(r) => write!(f, "{}", r),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::List(items) => {
                write!(f, "(list")?;
                for item in items.iter() {
                    write!(f, " {}", item)?;
                }
                write!(f, ")")
            }
            Value::Table(table) => {
                write!(f, "(table")?;
                for (key, value) in table.iter() {
                    write!(f, " {} {}", key, value)?;
                }
                write!(f, ")")
            }
            Value::Boolean(b) => write!(f, "{}", b),
            Value::NativeFunction(_) | Value::UserFunction(_) => write!(f, "<function>"),
            Value::Error(message) => write!(f, "<error: {}>", message),
            Value::None => write!(f, "none"),
            Value::Data(_) => write!(f, "<data>"),
        }
    }
}

/// A host function callable from scripts.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub arity: Option<usize>, // None means variadic
    pub func: Rc<NativeFn>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, arity: Option<usize>, func: F) -> Self
    where
        F: Fn(&mut Context, Vec<Value>) -> Value + 'static,
    {
        Self {
            name: name.into(),
            arity,
            func: Rc::new(func),
        }
    }

    /// Invoke with an arity check. A mismatch comes back as an Error value.
    pub fn call(&self, ctx: &mut Context, args: Vec<Value>) -> Value {
        if let Some(arity) = self.arity {
            if args.len() != arity {
                return Value::error(format!(
                    "function \"{}\" takes {} argument(s), got {}",
                    self.name,
                    arity,
                    args.len()
                ));
            }
        }
        (self.func)(ctx, args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}
