//! HTML escaping for rendered values
//!
//! Escaped characters: `<`, `>`, `&`, `"` and `'`.

use crate::value::Value;

/// Escape HTML special characters
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a value as text, escaping it unless it is already safe markup
pub fn render_value(value: &Value, autoescape: bool) -> String {
    match value {
        Value::Safe(s) => s.clone(),
        other if autoescape => escape_html(&other.to_string()),
        other => other.to_string(),
    }
}
