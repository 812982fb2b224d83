//! Clock and timing built-in functions.
//!
//! Sleeping blocks the whole interpreter; there is nothing else to run.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::interpreter::environment::Environment;
use crate::interpreter::value::{NativeFunction, Value};

use super::type_error;

pub fn clock_functions() -> Vec<NativeFunction> {
    vec![
        timer("time-seconds", |d| d.as_secs() as u128),
        timer("time-milliseconds", |d| d.as_millis()),
        timer("time-microseconds", |d| d.as_micros()),
        timer("time-nanoseconds", |d| d.as_nanos()),
        sleeper("sleep-seconds", Duration::from_secs),
        sleeper("sleep-milliseconds", Duration::from_millis),
        sleeper("sleep-microseconds", Duration::from_micros),
        sleeper("sleep-nanoseconds", Duration::from_nanos),
    ]
}

/// Register all clock built-in functions.
pub fn register_clock_builtins(env: &mut Environment) {
    super::define_all(env, clock_functions());
}

/// Time since the Unix epoch in some unit.
fn timer(name: &'static str, unit: fn(Duration) -> u128) -> NativeFunction {
    NativeFunction::new(name, Some(0), move |_, _| {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => Value::Integer(BigInt::from(unit(elapsed))),
            Err(e) => Value::error(format!("function \"{}\" failed: {}", name, e)),
        }
    })
}

fn sleeper(name: &'static str, unit: fn(u64) -> Duration) -> NativeFunction {
    NativeFunction::new(name, Some(1), move |_, args| {
        match &args[0] {
            Value::Integer(n) => match n.to_u64() {
                Some(n) => {
                    thread::sleep(unit(n));
                    Value::None
                }
                None => type_error(name, "a non-negative integer"),
            },
            _ => type_error(name, "integer"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Interpreter;

    #[test]
    fn test_time_is_monotonic_enough() {
        let mut interp = Interpreter::buffered(Default::default());
        let before = interp.eval("(time-milliseconds)").unwrap();
        interp.eval("(sleep-milliseconds 5)").unwrap();
        let after = interp.eval("(time-milliseconds)").unwrap();
        let elapsed = interp
            .eval(&format!("(sub {} {})", after, before))
            .unwrap()
            .as_i64()
            .unwrap();
        assert!(elapsed >= 4, "elapsed {}", elapsed);
    }

    #[test]
    fn test_units_are_consistent() {
        let mut interp = Interpreter::buffered(Default::default());
        let secs = interp.eval("(time-seconds)").unwrap().as_i64().unwrap();
        let millis = interp.eval("(time-milliseconds)").unwrap().as_i64().unwrap();
        assert!(millis / 1000 >= secs);
        assert!(secs > 1_600_000_000);
    }

    #[test]
    fn test_sleep_rejects_bad_arguments() {
        let mut interp = Interpreter::buffered(Default::default());
        assert!(interp.eval("(sleep-seconds \"1\")").is_err());
        assert!(interp.eval("(sleep-nanoseconds (sub 1))").is_err());
        assert!(interp.eval("(sleep-nanoseconds)").is_err());
    }
}
