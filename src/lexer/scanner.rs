//! Incremental scanner.
//!
//! A `Scanner` only remembers where it is (line and column), so it can be fed
//! one REPL line at a time and keep reporting positions relative to the whole
//! session. The scanner never fails: anything it does not recognise becomes a
//! one-character `Name` token and is left for later stages to reject.

use std::iter::Peekable;
use std::str::Chars;

use crate::lexer::token::{Token, TokenKind};
use crate::span::Span;

pub struct Scanner {
    line: usize,
    column: usize,
}

impl Scanner {
    pub fn new() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Scan a complete source in one go.
    pub fn scan(source: &str) -> Vec<Token> {
        Scanner::new().feed(source)
    }

    /// Scan the next piece of input, continuing from the previous position.
    pub fn feed(&mut self, input: &str) -> Vec<Token> {
        let mut cursor = Cursor {
            chars: input.chars().peekable(),
            line: self.line,
            column: self.column,
        };

        let mut tokens = Vec::new();
        while let Some(token) = cursor.scan_token() {
            tokens.push(token);
        }

        self.line = cursor.line;
        self.column = cursor.column;
        tokens
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl Cursor<'_> {
    fn scan_token(&mut self) -> Option<Token> {
        self.skip_separators();
        let start = Span::new(self.line, self.column);
        let c = self.advance()?;

        let token = match c {
            '(' | '[' | '{' => Token::new(TokenKind::Open, c.to_string(), start),
            ')' | ']' | '}' => Token::new(TokenKind::Close, c.to_string(), start),
            '"' => self.scan_string(start),
            c if c.is_ascii_digit() => self.scan_number(c, start),
            c if c.is_ascii_alphabetic() => self.scan_name(c, start),
            c => Token::new(TokenKind::Name, c.to_string(), start),
        };
        Some(token)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn skip_separators(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ',' || c == ';' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// No escapes. An unterminated literal runs to the end of input.
    fn scan_string(&mut self, start: Span) -> Token {
        let mut text = String::new();
        while let Some(c) = self.advance() {
            if c == '"' {
                break;
            }
            text.push(c);
        }
        Token::new(TokenKind::String, text, start)
    }

    fn scan_number(&mut self, first: char, start: Span) -> Token {
        let mut text = String::from(first);
        self.take_digits(&mut text);

        // Only a dot followed by a digit continues the literal.
        let mut lookahead = self.chars.clone();
        if lookahead.next() == Some('.') && lookahead.next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            text.push('.');
            self.take_digits(&mut text);
            return Token::new(TokenKind::Float, text, start);
        }

        Token::new(TokenKind::Integer, text, start)
    }

    fn take_digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.advance();
        }
    }

    fn scan_name(&mut self, first: char, start: Span) -> Token {
        let mut text = String::from(first);
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '-') {
                break;
            }
            text.push(c);
            self.advance();
        }
        Token::new(TokenKind::Name, text, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(source: &str) -> Vec<(TokenKind, String)> {
        Scanner::scan(source)
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::scan(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_brackets_are_interchangeable() {
        assert_eq!(
            kinds("( [ { ) ] }"),
            vec![
                TokenKind::Open,
                TokenKind::Open,
                TokenKind::Open,
                TokenKind::Close,
                TokenKind::Close,
                TokenKind::Close,
            ]
        );
    }

    #[test]
    fn test_names_and_numbers() {
        assert_eq!(
            scan("(less-than i2 42 3.25)"),
            vec![
                (TokenKind::Open, "(".to_string()),
                (TokenKind::Name, "less-than".to_string()),
                (TokenKind::Name, "i2".to_string()),
                (TokenKind::Integer, "42".to_string()),
                (TokenKind::Float, "3.25".to_string()),
                (TokenKind::Close, ")".to_string()),
            ]
        );
    }

    #[test]
    fn test_separators_produce_nothing() {
        assert_eq!(kinds("a,b;c \t\n d"), vec![TokenKind::Name; 4]);
        assert!(Scanner::scan("  ,;; \n").is_empty());
    }

    #[test]
    fn test_string_has_no_escapes() {
        assert_eq!(
            scan(r#""hello \n world" x"#),
            vec![
                (TokenKind::String, r"hello \n world".to_string()),
                (TokenKind::Name, "x".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        assert_eq!(scan("\"abc"), vec![(TokenKind::String, "abc".to_string())]);
    }

    #[test]
    fn test_dot_without_digit_ends_number() {
        assert_eq!(
            scan("1."),
            vec![
                (TokenKind::Integer, "1".to_string()),
                (TokenKind::Name, ".".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_characters_become_names() {
        assert_eq!(
            scan("+ _"),
            vec![
                (TokenKind::Name, "+".to_string()),
                (TokenKind::Name, "_".to_string()),
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = Scanner::scan("(add\n  x 1)");
        assert_eq!(tokens[0].span, Span::new(1, 1));
        assert_eq!(tokens[1].span, Span::new(1, 2));
        assert_eq!(tokens[2].span, Span::new(2, 3));
        assert_eq!(tokens[3].span, Span::new(2, 5));
        assert_eq!(tokens[4].span, Span::new(2, 6));
    }

    #[test]
    fn test_feed_keeps_position_between_calls() {
        let mut scanner = Scanner::new();
        let first = scanner.feed("(def x 3)\n");
        let second = scanner.feed("(add x 4)\n");
        assert_eq!(first[0].span.line, 1);
        assert_eq!(second[0].span, Span::new(2, 1));
        let third = scanner.feed("  x");
        assert_eq!(third[0].span, Span::new(3, 3));
    }
}
