//! Engine configuration: limits, tracing and prelude selection.
//!
//! Defaults can be overridden from the environment (`ION_TRACE`,
//! `ION_STRICT_CONDITIONS`, `ION_MAX_STACK`, `ION_MAX_CALL_DEPTH`) and then
//! from command-line flags.

pub const DEFAULT_MAX_STACK: usize = 65_536;
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Which globals a fresh interpreter starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Prelude {
    /// `print`, `to-str`, `type-of`, `def-str`, `merge`, the `lib-*` getters,
    /// `true` and `false`. Everything else is reached through `merge`.
    Core,
    /// Core plus every library function bound directly.
    #[default]
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_stack: usize,
    pub max_call_depth: usize,
    /// Print every dispatched instruction to stderr.
    pub trace: bool,
    /// Raise a type error on non-boolean branch conditions instead of taking the branch.
    pub strict_conditions: bool,
    pub prelude: Prelude,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_stack: DEFAULT_MAX_STACK,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            trace: false,
            strict_conditions: false,
            prelude: Prelude::Full,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v != "false" && v != "0")
                .unwrap_or(default)
        };
        let limit = |key: &str, default: usize| {
            lookup(key)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(default)
        };

        Self {
            max_stack: limit("ION_MAX_STACK", defaults.max_stack),
            max_call_depth: limit("ION_MAX_CALL_DEPTH", defaults.max_call_depth),
            trace: flag("ION_TRACE", defaults.trace),
            strict_conditions: flag("ION_STRICT_CONDITIONS", defaults.strict_conditions),
            prelude: defaults.prelude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        assert_eq!(config_from(&[]), EngineConfig::default());
    }

    #[test]
    fn test_flags() {
        let config = config_from(&[("ION_TRACE", "1"), ("ION_STRICT_CONDITIONS", "false")]);
        assert!(config.trace);
        assert!(!config.strict_conditions);
        assert!(!config_from(&[("ION_TRACE", "0")]).trace);
    }

    #[test]
    fn test_limits_ignore_garbage() {
        let config = config_from(&[("ION_MAX_STACK", "128"), ("ION_MAX_CALL_DEPTH", "lots")]);
        assert_eq!(config.max_stack, 128);
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
        assert_eq!(config_from(&[("ION_MAX_STACK", "0")]).max_stack, DEFAULT_MAX_STACK);
    }
}
