//! Core parser struct.

use crate::ast::Node;
use crate::error::StructureError;
use crate::lexer::{Token, TokenKind};
use crate::span::Span;

pub type ParseResult<T> = Result<T, StructureError>;

/// Builds one root node from a token sequence.
///
/// The root is a group whose children are the top-level forms. No grammar is
/// applied beyond matching `Open` against `Close`.
pub struct Parser {
    tokens: Vec<Token>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn parse(&mut self) -> ParseResult<Node> {
        let root_span = self.tokens.first().map(|t| t.span).unwrap_or(Span::new(1, 1));
        let mut stack = vec![Node::list(root_span)];

        for token in std::mem::take(&mut self.tokens) {
            match token.kind {
                TokenKind::Open => stack.push(Node::list(token.span)),
                TokenKind::Close => {
                    if stack.len() < 2 {
                        return Err(StructureError::UnmatchedClose(token.text, token.span));
                    }
                    if let Some(group) = stack.pop() {
                        Self::top(&mut stack).push_child(group);
                    }
                }
                _ => Self::top(&mut stack).push_child(Node::Leaf(token)),
            }
        }

        if stack.len() > 1 {
            let span = stack.last().map(Node::span).unwrap_or(root_span);
            return Err(StructureError::Unclosed {
                count: stack.len() - 1,
                span,
            });
        }

        Ok(stack.pop().unwrap_or_else(|| Node::list(root_span)))
    }

    fn top(stack: &mut [Node]) -> &mut Node {
        // The seeded root is never popped, so the stack is never empty here.
        let last = stack.len() - 1;
        &mut stack[last]
    }
}
