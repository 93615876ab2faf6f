//! Rendering of JSON payload templates.
//!
//! Request payloads for the thin provisioning wrappers live as JSON
//! templates with `$name` placeholders. Rendering substitutes each
//! placeholder from a parameter map; a placeholder with no value is a hard
//! failure, since a half-filled payload would be rejected remotely with a
//! far less useful message.
//!
//! Substitution is textual: parameter values are inserted as-is, so values
//! embedded inside JSON strings must already be JSON-safe (the Kubernetes
//! pull-secret merge escapes quotes for exactly this reason).

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Error;
use crate::Result;

/// Render a template, substituting `$name` and `${name}` placeholders.
///
/// `$$` renders a literal `$`. Placeholder names are ASCII identifiers:
/// a letter or underscore followed by letters, digits, or underscores. A
/// `$` followed by anything else (`$5`, a trailing `$`) is kept verbatim.
/// A placeholder missing from `params` fails with
/// [`Error::MissingTemplateParam`].
pub fn render(template: &str, params: &HashMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some((_, '$')) => {
                chars.next();
                out.push('$');
            },
            Some((_, '{')) => {
                chars.next();
                let mut name = String::new();
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    name.push(c);
                }
                out.push_str(lookup(params, &name)?);
            },
            Some((_, c)) if c.is_ascii_alphabetic() || *c == '_' => {
                let mut name = String::new();
                while let Some((_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || *c == '_' {
                        name.push(*c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(lookup(params, &name)?);
            },
            _ => out.push('$'),
        }
    }
    Ok(out)
}

/// Render a template and parse the result as JSON.
pub fn render_json(template: &str, params: &HashMap<String, String>) -> Result<Value> {
    let rendered = render(template, params)?;
    Ok(serde_json::from_str(&rendered)?)
}

fn lookup<'a>(params: &'a HashMap<String, String>, name: &str) -> Result<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| Error::MissingTemplateParam(name.to_string()))
}
