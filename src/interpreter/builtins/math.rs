//! Arithmetic and comparison built-in functions.
//!
//! Integers and rationals mix freely. Results are computed exactly and come
//! back as an Integer whenever the denominator reduces to one.

use std::cmp::Ordering;

use num_bigint::{BigInt, Sign};
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

use crate::interpreter::environment::Environment;
use crate::interpreter::value::{NativeFunction, Value};

use super::{define_all, need_args, type_error};

const NUMBERS: &str = "integer, rational";

/// Largest string (in bytes) or list (in items) `mul` will build.
pub const MAX_REPEAT_LEN: usize = 1 << 28;

/// Largest result, in bits of numerator or denominator, `pow` will compute.
pub const MAX_POW_BITS: u64 = 1 << 24;

pub fn math_functions() -> Vec<NativeFunction> {
    vec![
        NativeFunction::new("add", None, |_, args| add(&args)),
        NativeFunction::new("sub", None, |_, args| sub(&args)),
        NativeFunction::new("mul", None, |_, args| mul(&args)),
        NativeFunction::new("div", None, |_, args| div(&args)),
        NativeFunction::new("pow", None, |_, args| pow(&args)),
        // do(...) - value of the last argument
        NativeFunction::new("do", None, |_, args| {
            args.into_iter().last().unwrap_or(Value::None)
        }),
        NativeFunction::new("greater-than", None, |_, args| {
            compare_chain("greater-than", &args, |o| o == Ordering::Greater)
        }),
        NativeFunction::new("less-than", None, |_, args| {
            compare_chain("less-than", &args, |o| o == Ordering::Less)
        }),
        NativeFunction::new("greater-than-equ", None, |_, args| {
            compare_chain("greater-than-equ", &args, |o| o != Ordering::Less)
        }),
        NativeFunction::new("less-than-equ", None, |_, args| {
            compare_chain("less-than-equ", &args, |o| o != Ordering::Greater)
        }),
        // equal(...) - tag-exact, so (equal 1 1.0) is false
        NativeFunction::new("equal", None, |_, args| {
            if args.len() < 2 {
                return need_args("equal", 2);
            }
            Value::Boolean(args.windows(2).all(|w| w[0] == w[1]))
        }),
    ]
}

/// Register all math built-in functions.
pub fn register_math_builtins(env: &mut Environment) {
    define_all(env, math_functions());
}

fn numbers(name: &str, args: &[Value]) -> Result<Vec<BigRational>, Value> {
    args.iter()
        .map(|a| a.as_rational().ok_or_else(|| type_error(name, NUMBERS)))
        .collect()
}

fn add(args: &[Value]) -> Value {
    let Some(first) = args.first() else {
        return need_args("add", 1);
    };

    match first {
        Value::String(_) => {
            let mut out = String::new();
            for arg in args {
                match arg {
                    Value::String(s) => out.push_str(s),
                    _ => return type_error("add", "string"),
                }
            }
            Value::string(out)
        }
        Value::List(_) => {
            let mut out = Vec::new();
            for arg in args {
                match arg {
                    Value::List(items) => out.extend(items.iter().cloned()),
                    _ => return type_error("add", "list"),
                }
            }
            Value::list(out)
        }
        _ if args.iter().all(|a| matches!(a, Value::Integer(_))) => {
            let sum = args.iter().fold(BigInt::zero(), |acc, a| match a {
                Value::Integer(n) => acc + n,
                _ => acc,
            });
            Value::Integer(sum)
        }
        _ => match numbers("add", args) {
            Ok(nums) => Value::from_rational(nums.into_iter().sum()),
            Err(e) => e,
        },
    }
}

/// One argument negates; more subtract the rest from the first.
fn sub(args: &[Value]) -> Value {
    let nums = match numbers("sub", args) {
        Ok(nums) => nums,
        Err(e) => return e,
    };
    match nums.split_first() {
        None => need_args("sub", 1),
        Some((first, [])) => Value::from_rational(-first.clone()),
        Some((first, rest)) => {
            Value::from_rational(rest.iter().fold(first.clone(), |acc, n| acc - n))
        }
    }
}

/// Numbers multiply; a leading string or list repeats by the product of the
/// remaining integer arguments.
fn mul(args: &[Value]) -> Value {
    let Some(first) = args.first() else {
        return need_args("mul", 1);
    };

    match first {
        Value::String(s) => match repeat_count("mul", s.len(), &args[1..]) {
            Ok(count) => Value::string(s.repeat(count)),
            Err(e) => e,
        },
        Value::List(items) => match repeat_count("mul", items.len(), &args[1..]) {
            Ok(count) => {
                let mut out = Vec::with_capacity(items.len() * count);
                for _ in 0..count {
                    out.extend(items.iter().cloned());
                }
                Value::list(out)
            }
            Err(e) => e,
        },
        _ => match numbers("mul", args) {
            Ok(nums) => Value::from_rational(nums.into_iter().product()),
            Err(e) => e,
        },
    }
}

/// Product of the repeat counts. Fails when the count or the repeated length
/// of `unit_len` would exceed `MAX_REPEAT_LEN`.
fn repeat_count(name: &str, unit_len: usize, args: &[Value]) -> Result<usize, Value> {
    let too_large = || Value::error(format!("function \"{}\" repeat count too large", name));
    let mut count: usize = 1;
    for arg in args {
        let n = match arg {
            Value::Integer(n) if n.sign() != Sign::Minus => n.to_usize().ok_or_else(too_large)?,
            _ => return Err(type_error(name, "a non-negative integer repeat count")),
        };
        count = count.checked_mul(n).ok_or_else(too_large)?;
    }
    match unit_len.checked_mul(count) {
        Some(len) if len <= MAX_REPEAT_LEN && count <= MAX_REPEAT_LEN => Ok(count),
        _ => Err(too_large()),
    }
}

fn div(args: &[Value]) -> Value {
    if args.len() < 2 {
        return need_args("div", 2);
    }
    let nums = match numbers("div", args) {
        Ok(nums) => nums,
        Err(e) => return e,
    };
    let mut acc = nums[0].clone();
    for n in &nums[1..] {
        if n.is_zero() {
            return Value::error("function \"div\" cannot divide by zero");
        }
        acc /= n;
    }
    Value::from_rational(acc)
}

/// Left fold: `(pow 2 3 2)` is `(2^3)^2`.
fn pow(args: &[Value]) -> Value {
    if args.len() < 2 {
        return need_args("pow", 2);
    }
    let Some(mut acc) = args[0].as_rational() else {
        return type_error("pow", NUMBERS);
    };
    for exponent in &args[1..] {
        let e = match exponent {
            Value::Integer(n) if n.sign() != Sign::Minus => n.to_usize(),
            _ => return type_error("pow", "a non-negative integer exponent"),
        };
        match e {
            Some(e) if pow_fits(&acc, e) => acc = num_traits::pow(acc, e),
            _ => return Value::error("function \"pow\" result too large"),
        }
    }
    Value::from_rational(acc)
}

/// A base of magnitude at least 2 with `b` bits grows to at least
/// `(b - 1) * e` bits. Bases 0, 1 and -1 never grow.
fn pow_fits(base: &BigRational, e: usize) -> bool {
    let bits = base.numer().bits().max(base.denom().bits());
    if bits <= 1 {
        return true;
    }
    (bits - 1)
        .checked_mul(e as u64)
        .map_or(false, |total| total <= MAX_POW_BITS)
}

fn compare_chain(name: &str, args: &[Value], holds: impl Fn(Ordering) -> bool) -> Value {
    if args.len() < 2 {
        return need_args(name, 2);
    }
    match numbers(name, args) {
        Ok(nums) => Value::Boolean(nums.windows(2).all(|w| holds(w[0].cmp(&w[1])))),
        Err(e) => e,
    }
}
