//! Expression tokenizer.
//!
//! Turns expression text into a flat token sequence. Signs are never folded
//! into numeric literals; the parser decides whether `-` is unary.

use std::fmt;

use crate::error::CompileError;

/// Byte range of a token or node in the source expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both.
    #[must_use]
    pub fn join(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Source text covered by this span.
    #[must_use]
    pub fn slice(self, source: &str) -> &str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Le,
    Ge,
    Eq,
    LParen,
    RParen,
}

impl TokenKind {
    /// Return `true` for `<=`, `>=` and `=`.
    #[must_use]
    pub fn is_comparator(&self) -> bool {
        matches!(self, Self::Le | Self::Ge | Self::Eq)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "identifier '{name}'"),
            Self::Number(value) => write!(f, "number {value}"),
            Self::Plus => f.write_str("'+'"),
            Self::Minus => f.write_str("'-'"),
            Self::Star => f.write_str("'*'"),
            Self::Slash => f.write_str("'/'"),
            Self::Le => f.write_str("'<='"),
            Self::Ge => f.write_str("'>='"),
            Self::Eq => f.write_str("'='"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Tokenize an expression.
///
/// # Errors
///
/// Returns [`CompileError::EmptyExpression`] for blank input and
/// [`CompileError::Lex`] with the byte offset of the first unrecognized
/// character.
pub fn tokenize(input: &str) -> Result<Vec<Token>, CompileError> {
    let mut lexer = Lexer { input, pos: 0 };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    if tokens.is_empty() {
        return Err(CompileError::EmptyExpression);
    }
    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, CompileError> {
        self.eat_while(char::is_whitespace);
        let start = self.pos;
        let Some(c) = self.bump() else {
            return Ok(None);
        };

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '=' => TokenKind::Eq,
            '<' | '>' => {
                if self.peek() != Some('=') {
                    return Err(CompileError::Lex {
                        offset: start,
                        found: c,
                    });
                }
                self.bump();
                if c == '<' {
                    TokenKind::Le
                } else {
                    TokenKind::Ge
                }
            }
            c if c.is_ascii_digit() => self.number(start)?,
            '.' if self.peek().is_some_and(|n| n.is_ascii_digit()) => self.number(start)?,
            c if is_ident_start(c) => {
                self.eat_while(is_ident_continue);
                TokenKind::Ident(self.input[start..self.pos].to_string())
            }
            found => {
                return Err(CompileError::Lex {
                    offset: start,
                    found,
                })
            }
        };

        Ok(Some(Token {
            kind,
            span: Span::new(start, self.pos),
        }))
    }

    /// Scan the rest of a literal whose first character was consumed.
    fn number(&mut self, start: usize) -> Result<TokenKind, CompileError> {
        self.eat_while(|c| c.is_ascii_digit());
        if !self.input[start..self.pos].contains('.') && self.peek() == Some('.') {
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    self.bump();
                }
                self.eat_while(|c| c.is_ascii_digit());
            }
        }

        let text = &self.input[start..self.pos];
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| CompileError::Lex {
                offset: start,
                found: text.chars().next().unwrap_or('.'),
            })
    }
}
