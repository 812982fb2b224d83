//! AST builder: flat tokens to a tree keyed on bracket nesting.

mod core;


pub use self::core::{ParseResult, Parser};
