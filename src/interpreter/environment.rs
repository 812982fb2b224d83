//! Global scope stack.
//!
//! The stack can hold nested tables, but the compiler never emits scope
//! instructions, so in practice every lookup and binding hits the single
//! innermost table.

use crate::interpreter::table::Table;
use crate::interpreter::value::Value;

#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Table>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Table::new()],
        }
    }

    pub fn innermost(&self) -> &Table {
        // Never empty: `pop_scope` refuses to remove the last table.
        &self.scopes[self.scopes.len() - 1]
    }

    pub fn innermost_mut(&mut self) -> &mut Table {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Bind `name` in the innermost scope with the update-in-place rule.
    pub fn define(&mut self, name: &str, value: Value) {
        self.innermost_mut().define(name, value);
    }

    /// Resolve `name` in the innermost scope only.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.innermost().lookup_name(name)
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Table::new());
    }

    /// Pops the innermost scope. The outermost scope is never removed.
    pub fn pop_scope(&mut self) -> Option<Table> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
