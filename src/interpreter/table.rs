//! Ordered association list used for user tables and variable scopes.
//!
//! Every operation is a linear scan in insertion order. A key matches an entry
//! only when both carry the same tag and compare equal, so `1`, `1/1` and
//! `"1"` are three distinct keys.

use std::slice;

use crate::error::TableError;
use crate::interpreter::value::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    entries: Vec<(Value, Value)>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, (Value, Value)> {
        self.entries.iter()
    }

    fn position(&self, key: &Value) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.same_tag(key) && k == key)
    }

    /// Overwrite the first matching entry in place, or append a new pair.
    /// Returns true when the table grew.
    pub fn set(&mut self, key: Value, value: Value) -> bool {
        match self.position(&key) {
            Some(idx) => {
                self.entries[idx].1 = value;
                false
            }
            None => {
                self.entries.push((key, value));
                true
            }
        }
    }

    /// Append without looking for an existing entry. Earlier pairs keep
    /// shadowing later ones with the same key.
    pub fn push(&mut self, key: Value, value: Value) {
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &Value) -> Result<&Value, TableError> {
        self.lookup(key)
            .ok_or_else(|| TableError::KeyNotFound(key.to_string()))
    }

    pub fn lookup(&self, key: &Value) -> Option<&Value> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    /// Lookup by identifier without building a `Value::String` key.
    pub fn lookup_name(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find_map(|(k, v)| match k {
            Value::String(s) if &**s == name => Some(v),
            _ => None,
        })
    }

    pub fn define(&mut self, name: &str, value: Value) {
        self.set(Value::string(name), value);
    }
}

impl FromIterator<(Value, Value)> for Table {
    /// Collects raw pairs; duplicates are kept.
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
