//! HTML escaping for text the preview pipeline generates itself.
//!
//! User fragments are embedded verbatim; only diagnostics and shell
//! attributes go through here.

use std::borrow::Cow;

fn text_entity(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Inside a double-quoted attribute only `&` and `"` can break out.
fn attr_entity(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        _ => None,
    }
}

/// Replace every char `entity` maps, borrowing when nothing matches.
fn escape_with(s: &str, entity: fn(char) -> Option<&'static str>) -> Cow<'_, str> {
    let Some(first) = s.find(|c| entity(c).is_some()) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len() + 16);
    out.push_str(&s[..first]);
    for c in s[first..].chars() {
        match entity(c) {
            Some(e) => out.push_str(e),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape text content.
pub fn escape(s: &str) -> Cow<'_, str> {
    escape_with(s, text_entity)
}

/// Escape a value placed inside a double-quoted attribute.
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape_with(s, attr_entity)
}
