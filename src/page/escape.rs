//! The two markup escaping rules used by the landing page.
//!
//! `escape_attr_value` feeds the single-quoted `iniSettings` attribute string
//! and escapes both quote characters. `escape_markup` feeds the double-quoted
//! dataset attributes and leaves apostrophes alone.

/// Escape `&`, `<`, `>`, `"` and `'`.
pub fn escape_attr_value(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape `&`, `<`, `>` and `"`.
pub fn escape_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
