//! Placeholder substitution for the page template.
//!
//! `${name}` is replaced by the variable's value, which is inserted verbatim
//! (values are escaped during assembly). `$${` produces a literal `${`.

use crate::page::variables::PageVariables;
use crate::page::PageError;

pub fn render(template: &str, vars: &PageVariables) -> Result<String, PageError> {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;
    let mut offset = 0;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("$${") {
            out.push_str("${");
            offset += pos + 3;
            rest = after;
        } else if let Some(after) = tail.strip_prefix("${") {
            let end = after.find('}').ok_or(PageError::Unterminated(offset + pos))?;
            let name = after[..end].trim();
            let value = vars
                .get(name)
                .ok_or_else(|| PageError::UndefinedVariable(name.to_string()))?;
            out.push_str(value);
            offset += pos + 2 + end + 1;
            rest = &after[end + 1..];
        } else {
            out.push('$');
            offset += pos + 1;
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    Ok(out)
}
