//! Recursive-descent evaluator for the deps language.
//!
//! Grammar:
//!
//! ```text
//! file    := (IDENT '=' expr)*
//! expr    := term ('+' term)*
//! term    := unary ('%' (tuple | unary))*
//! unary   := '-' unary | primary
//! primary := STR+ | INT | IDENT | dict | list | '(' expr ')' | tuple
//! ```
//!
//! Tuples evaluate to lists, so a list on the right of `%` supplies the
//! format arguments, whether it was written as a tuple or bound to a name.

use std::collections::BTreeMap;

use super::lexer::{tokenize, Token, TokenKind};
use super::printer::render_inline;
use super::{Bindings, Value};
use crate::error::{Error, Result};

/// Parse `source` into the set of names it binds.
///
/// Names may reference bindings that appear earlier in the same source;
/// anything else (calls, attribute access, statements other than plain
/// assignment) is a syntax error.
pub fn parse(source: &str) -> Result<Bindings> {
    let tokens = tokenize(source)?;
    Parser {
        tokens,
        pos: 0,
        bindings: Bindings::new(),
    }
    .file()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    bindings: Bindings,
}

impl Parser {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error_at(&self, token: Option<&Token>, message: impl Into<String>) -> Error {
        let (line, column) = match token.or_else(|| self.tokens.last()) {
            Some(t) => (t.line, t.column),
            None => (1, 1),
        };
        Error::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<()> {
        match self.next() {
            Some(t) if t.kind == kind => Ok(()),
            Some(t) => Err(self.error_at(Some(&t), format!("expected {}", what))),
            None => Err(self.error_at(None, format!("expected {}, found end of file", what))),
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn file(mut self) -> Result<Bindings> {
        while let Some(token) = self.next() {
            let TokenKind::Ident(name) = &token.kind else {
                return Err(self.error_at(Some(&token), "expected a binding name"));
            };
            self.expect(TokenKind::Equals, "'=' after binding name")?;
            let value = self.expr()?;
            self.bindings.insert(name.clone(), value);
        }
        Ok(self.bindings)
    }

    fn expr(&mut self) -> Result<Value> {
        let mut lhs = self.term()?;
        while self.peek() == Some(&TokenKind::Plus) {
            let op = self.next();
            let rhs = self.term()?;
            lhs = match (lhs, rhs) {
                (Value::Str(a), Value::Str(b)) => Value::Str(a + &b),
                (Value::List(mut a), Value::List(b)) => {
                    a.extend(b);
                    Value::List(a)
                }
                (Value::Int(a), Value::Int(b)) => Value::Int(a.checked_add(b).ok_or_else(|| {
                    self.error_at(op.as_ref(), "integer overflow")
                })?),
                (a, b) => {
                    return Err(self.error_at(
                        op.as_ref(),
                        format!(
                            "unsupported operand types for +: '{}' and '{}'",
                            a.type_name(),
                            b.type_name()
                        ),
                    ))
                }
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Value> {
        let mut lhs = self.unary()?;
        while self.peek() == Some(&TokenKind::Percent) {
            let op = self.next();
            let args = if self.peek() == Some(&TokenKind::LParen) {
                match self.parenthesized()? {
                    Paren::Tuple(items) => items,
                    Paren::Group(value) => vec![value],
                }
            } else {
                match self.unary()? {
                    Value::List(items) => items,
                    value => vec![value],
                }
            };
            let format = match lhs {
                Value::Str(format) => format,
                other => {
                    return Err(self.error_at(
                        op.as_ref(),
                        format!("'%' needs a str on the left, found '{}'", other.type_name()),
                    ))
                }
            };
            lhs = Value::Str(
                interpolate(&format, &args).map_err(|message| self.error_at(op.as_ref(), message))?,
            );
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Value> {
        if self.peek() == Some(&TokenKind::Minus) {
            let op = self.next();
            return match self.unary()? {
                Value::Int(n) => n
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| self.error_at(op.as_ref(), "integer overflow")),
                other => Err(self.error_at(
                    op.as_ref(),
                    format!("bad operand type for unary -: '{}'", other.type_name()),
                )),
            };
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Value> {
        let Some(token) = self.next() else {
            return Err(self.error_at(None, "expected a value, found end of file"));
        };
        match token.kind {
            TokenKind::Str(mut s) => {
                while let Some(TokenKind::Str(more)) = self.peek() {
                    s.push_str(more);
                    self.pos += 1;
                }
                Ok(Value::Str(s))
            }
            TokenKind::Int(n) => Ok(Value::Int(n)),
            TokenKind::Ident(ref name) => match name.as_str() {
                "None" => Ok(Value::None),
                "True" => Ok(Value::Bool(true)),
                "False" => Ok(Value::Bool(false)),
                _ => match self.bindings.get(name) {
                    Some(value) => Ok(value.clone()),
                    None => Err(self.error_at(
                        Some(&token),
                        format!("name '{}' is not defined", name),
                    )),
                },
            },
            TokenKind::LBrace => self.dict(),
            TokenKind::LBracket => Ok(Value::List(
                self.sequence(TokenKind::RBracket, "',' or ']'")?,
            )),
            TokenKind::LParen => {
                self.pos -= 1;
                Ok(match self.parenthesized()? {
                    Paren::Tuple(items) => Value::List(items),
                    Paren::Group(value) => value,
                })
            }
            _ => Err(self.error_at(Some(&token), "expected a value")),
        }
    }

    /// Items up to and including `close`, allowing a trailing comma.
    fn sequence(&mut self, close: TokenKind, what: &str) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            if self.eat(&close) {
                return Ok(items);
            }
            items.push(self.expr()?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(close, what)?;
                return Ok(items);
            }
        }
    }

    fn parenthesized(&mut self) -> Result<Paren> {
        self.expect(TokenKind::LParen, "'('")?;
        if self.eat(&TokenKind::RParen) {
            return Ok(Paren::Tuple(Vec::new()));
        }
        let first = self.expr()?;
        if self.eat(&TokenKind::RParen) {
            return Ok(Paren::Group(first));
        }
        self.expect(TokenKind::Comma, "',' or ')'")?;
        let mut items = vec![first];
        items.extend(self.sequence(TokenKind::RParen, "',' or ')'")?);
        Ok(Paren::Tuple(items))
    }

    fn dict(&mut self) -> Result<Value> {
        let mut map = BTreeMap::new();
        loop {
            if self.eat(&TokenKind::RBrace) {
                return Ok(Value::Dict(map));
            }
            let key_token = self.tokens.get(self.pos).cloned();
            let key = match self.expr()? {
                Value::Str(s) => s,
                other => {
                    return Err(self.error_at(
                        key_token.as_ref(),
                        format!("dict keys must be str, found '{}'", other.type_name()),
                    ))
                }
            };
            self.expect(TokenKind::Colon, "':' after dict key")?;
            let value = self.expr()?;
            map.insert(key, value);
            if !self.eat(&TokenKind::Comma) {
                self.expect(TokenKind::RBrace, "',' or '}'")?;
                return Ok(Value::Dict(map));
            }
        }
    }
}

enum Paren {
    Group(Value),
    Tuple(Vec<Value>),
}

/// Fill `%s`, `%d` and `%%` in `format` from `args`, in order.
fn interpolate(format: &str, args: &[Value]) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some('s') => {
                let arg = args.next().ok_or("not enough arguments for format string")?;
                match arg {
                    Value::Str(s) => out.push_str(s),
                    other => out.push_str(&render_inline(other)),
                }
            }
            Some('d') => match args.next() {
                Some(Value::Int(n)) => out.push_str(&n.to_string()),
                Some(other) => {
                    return Err(format!("%d format: a number is required, not {}", other.type_name()))
                }
                None => return Err("not enough arguments for format string".to_string()),
            },
            Some(other) => return Err(format!("unsupported format character '{}'", other)),
            None => return Err("incomplete format".to_string()),
        }
    }
    if args.next().is_some() {
        return Err("not all arguments converted during string formatting".to_string());
    }
    Ok(out)
}
