//! Deterministic rendering of values back into the deps language.
//!
//! Dicts are printed one key per line in sorted order, lists of scalars stay
//! on one line, and empty containers print as `{}` / `[]`. The output parses
//! back into the same value.

use super::Value;

const INDENT: &str = "  ";

/// Render `value` in the multi-line layout used for generated files.
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

/// Render `name = value` followed by a newline.
pub fn render_binding(name: &str, value: &Value) -> String {
    format!("{} = {}\n", name, render(value))
}

/// Render `value` on a single line.
pub fn render_inline(value: &Value) -> String {
    match value {
        Value::List(items) => {
            let parts: Vec<String> = items.iter().map(render_inline).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Dict(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote(k), render_inline(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        scalar => scalar_text(scalar),
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Dict(map) if !map.is_empty() => {
            out.push_str("{\n");
            for (key, item) in map {
                push_indent(out, depth + 1);
                out.push_str(&quote(key));
                out.push_str(": ");
                write_value(out, item, depth + 1);
                out.push_str(",\n");
            }
            push_indent(out, depth);
            out.push('}');
        }
        Value::List(items) if !items.iter().all(Value::is_scalar) => {
            out.push_str("[\n");
            for item in items {
                push_indent(out, depth + 1);
                write_value(out, item, depth + 1);
                out.push_str(",\n");
            }
            push_indent(out, depth);
            out.push(']');
        }
        other => out.push_str(&render_inline(other)),
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::None => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Str(s) => quote(s),
        Value::List(_) | Value::Dict(_) => render_inline(value),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
