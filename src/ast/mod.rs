//! Syntax tree built purely from bracket nesting.

pub mod node;

pub use node::Node;
