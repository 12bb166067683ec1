//! Tokenizer for the deps language.

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(String),
    Str(String),
    Int(i64),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    Equals,
    Plus,
    Minus,
    Percent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> Error {
        Error::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    fn string(&mut self, quote: char, line: usize, column: usize) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(self.error(line, column, "unterminated string literal"))
                }
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('\\') => out.push('\\'),
                    Some('\'') => out.push('\''),
                    Some('"') => out.push('"'),
                    // Line continuation inside a string.
                    Some('\n') => {}
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => return Err(self.error(line, column, "unterminated string literal")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn tokens(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(&c) = self.chars.peek() {
            let (line, column) = (self.line, self.column);
            let kind = match c {
                c if c.is_whitespace() => {
                    self.bump();
                    continue;
                }
                '#' => {
                    while self.chars.peek().is_some_and(|&c| c != '\n') {
                        self.bump();
                    }
                    continue;
                }
                '\\' => {
                    // Explicit line joining.
                    self.bump();
                    continue;
                }
                '\'' | '"' => {
                    self.bump();
                    TokenKind::Str(self.string(c, line, column)?)
                }
                c if c.is_ascii_digit() => {
                    let mut digits = String::new();
                    while let Some(&d) = self.chars.peek() {
                        if !d.is_ascii_digit() {
                            break;
                        }
                        digits.push(d);
                        self.bump();
                    }
                    let value = digits
                        .parse()
                        .map_err(|_| self.error(line, column, "integer literal out of range"))?;
                    TokenKind::Int(value)
                }
                c if c.is_alphabetic() || c == '_' => {
                    let mut ident = String::new();
                    while let Some(&d) = self.chars.peek() {
                        if !(d.is_alphanumeric() || d == '_') {
                            break;
                        }
                        ident.push(d);
                        self.bump();
                    }
                    TokenKind::Ident(ident)
                }
                other => {
                    self.bump();
                    match other {
                        '{' => TokenKind::LBrace,
                        '}' => TokenKind::RBrace,
                        '[' => TokenKind::LBracket,
                        ']' => TokenKind::RBracket,
                        '(' => TokenKind::LParen,
                        ')' => TokenKind::RParen,
                        ':' => TokenKind::Colon,
                        ',' => TokenKind::Comma,
                        '=' => TokenKind::Equals,
                        '+' => TokenKind::Plus,
                        '-' => TokenKind::Minus,
                        '%' => TokenKind::Percent,
                        _ => {
                            return Err(self.error(
                                line,
                                column,
                                format!("unexpected character '{}'", other),
                            ))
                        }
                    }
                }
            };
            tokens.push(Token { kind, line, column });
        }
        Ok(tokens)
    }
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).tokens()
}
