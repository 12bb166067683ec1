//! # Declarative Deps Syntax
//!
//! `DEPS.xwalk` and the generated `.gclient-xwalk` share a small
//! literal-only language. This module reads and writes it without ever
//! evaluating code: a file is a sequence of `name = expression` bindings, and
//! an expression can only be built from
//!
//! - literals: `None`, `True`, `False`, integers, quoted strings, lists,
//!   tuples (read as lists) and dicts with string keys,
//! - references to names bound earlier in the same file,
//! - `+` to concatenate strings, lists or add integers,
//! - `%` to fill `%s`/`%d` placeholders in a string.
//!
//! Adjacent string literals are concatenated, and `#` starts a comment.
//!
//! ## Example
//!
//! ```
//! use xwalk_sync::syntax::{self, Value};
//!
//! let bindings = syntax::parse(
//!     "point = 'abc'\ndeps = {'src': 'https://x.git@%s' % point}\n",
//! )
//! .unwrap();
//! let deps = bindings["deps"].as_dict().unwrap();
//! assert_eq!(deps["src"], Value::Str("https://x.git@abc".to_string()));
//! ```

mod lexer;
mod parser;
mod printer;

use std::collections::BTreeMap;

pub use parser::parse;
pub use printer::{render, render_binding, render_inline};

/// The names bound by a parsed file, keyed by name.
pub type Bindings = BTreeMap<String, Value>;

/// A value of the declarative language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
    /// Dicts keep their keys sorted so that rendering is deterministic.
    Dict(BTreeMap<String, Value>),
}

impl Value {
    #[cfg(test)]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Lists and dicts are containers; everything else is a scalar.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Dict(_))
    }

    /// Short name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "None",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Option<String>> for Value {
    fn from(s: Option<String>) -> Self {
        s.map_or(Value::None, Value::Str)
    }
}
