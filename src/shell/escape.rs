//! Escaping helpers for values written into the document head.

use serde_json::Value;
use std::borrow::Cow;

/// Escape a value for use inside a double-quoted attribute.
///
/// Covers `&`, `<`, `>`, `"` and `'`.
pub fn escape_attr(value: &str) -> Cow<'_, str> {
    escape_with(value, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    })
}

/// Escape a value for use as element text (e.g. `<title>`).
pub fn escape_text(value: &str) -> Cow<'_, str> {
    escape_with(value, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

/// Borrow the input untouched when nothing needs replacing.
fn escape_with(value: &str, replace: impl Fn(char) -> Option<&'static str>) -> Cow<'_, str> {
    let Some(first) = value.find(|c| replace(c).is_some()) else {
        return Cow::Borrowed(value);
    };

    let mut out = String::with_capacity(value.len() + 16);
    out.push_str(&value[..first]);
    for c in value[first..].chars() {
        match replace(c) {
            Some(entity) => out.push_str(entity),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Serialize structured data for an inline `<script type="application/ld+json">`.
///
/// `<` becomes `\u003c` so that no string inside the payload can close the
/// script element early. The result is still valid JSON.
pub fn json_ld_payload(data: &Value) -> Option<String> {
    let json = serde_json::to_string(data).ok()?;
    Some(json.replace('<', "\\u003c"))
}
