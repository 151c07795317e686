//! HTML text escaping
//!
//! Two fixed character classes:
//! - content text: `&` `<` `>`
//! - attribute values: `&` `<` `>` `"` `'`
//!
//! Characters with a named entity map to it; the apostrophe has no
//! universally supported name and becomes the decimal reference `&#39;`.
//!
//! Both functions scan for runs of ordinary characters and copy them in one
//! piece, substituting only at special positions. Input without special
//! characters is returned borrowed, without allocating.

use memchr::memchr3;
use std::borrow::Cow;
use std::fmt::Write;

/// Named entity for a special byte, if HTML defines one.
fn named_entity(byte: u8) -> Option<&'static str> {
    match byte {
        b'&' => Some("&amp;"),
        b'<' => Some("&lt;"),
        b'>' => Some("&gt;"),
        b'"' => Some("&quot;"),
        _ => None,
    }
}

/// Decimal numeric character reference, for special characters without a
/// named entity.
fn push_numeric(out: &mut String, ch: char) {
    // Writing to a String cannot fail.
    let _ = write!(out, "&#{};", ch as u32);
}

/// Escape text content: `&` `<` `>`.
pub fn escape_text(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    if memchr3(b'&', b'<', b'>', bytes).is_none() {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 8);
    let mut rest = 0;
    while let Some(offset) = memchr3(b'&', b'<', b'>', &bytes[rest..]) {
        let at = rest + offset;
        out.push_str(&input[rest..at]);
        match named_entity(bytes[at]) {
            Some(entity) => out.push_str(entity),
            None => push_numeric(&mut out, bytes[at] as char),
        }
        rest = at + 1;
    }
    out.push_str(&input[rest..]);
    Cow::Owned(out)
}

fn attr_special(bytes: &[u8], from: usize) -> Option<usize> {
    bytes[from..]
        .iter()
        .position(|b| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\''))
        .map(|offset| from + offset)
}

/// Escape an attribute value: `&` `<` `>` `"` `'`.
pub fn escape_attr(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    if attr_special(bytes, 0).is_none() {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 8);
    let mut rest = 0;
    while let Some(at) = attr_special(bytes, rest) {
        out.push_str(&input[rest..at]);
        match named_entity(bytes[at]) {
            Some(entity) => out.push_str(entity),
            None => push_numeric(&mut out, bytes[at] as char),
        }
        rest = at + 1;
    }
    out.push_str(&input[rest..]);
    Cow::Owned(out)
}
