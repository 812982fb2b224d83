//! AST node type.

use std::fmt;

use crate::lexer::{Token, TokenKind};
use crate::span::Span;

/// Either a single token or a bracketed group of child nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(Token),
    /// `span` is the position of the opening bracket. The program root has no
    /// bracket and uses the position of the first token (or 1:1 when empty).
    List { children: Vec<Node>, span: Span },
}

impl Node {
    pub fn list(span: Span) -> Self {
        Node::List {
            children: Vec::new(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Node::Leaf(token) => token.span,
            Node::List { span, .. } => *span,
        }
    }

    /// Children of a group; empty for a leaf.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Leaf(_) => &[],
            Node::List { children, .. } => children,
        }
    }

    /// The identifier text when this node is a bare `Name` leaf.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Node::Leaf(token) if token.kind == TokenKind::Name => Some(&token.text),
            _ => None,
        }
    }

    pub(crate) fn push_child(&mut self, child: Node) {
        if let Node::List { children, .. } = self {
            children.push(child);
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(token) => write!(f, "{}", token),
            Node::List { children, .. } => {
                write!(f, "(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}
