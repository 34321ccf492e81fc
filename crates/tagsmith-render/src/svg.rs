// Shared SVG serialization helpers.

use std::fmt::Write as _;

pub(crate) fn fmt(v: f64) -> String {
    let mut out = String::new();
    fmt_into(&mut out, v);
    out
}

/// Stringifies a number for an SVG attribute: shortest round-trippable decimal, without `-0` or
/// float noise from our own arithmetic (values within 1e-6 of an integer snap to it), rounded to
/// micrometer precision.
pub(crate) fn fmt_into(out: &mut String, v: f64) {
    if !v.is_finite() {
        out.push('0');
        return;
    }

    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    } else {
        v = (v * 1000.0).round() / 1000.0;
    }
    if v == -0.0 {
        v = 0.0;
    }

    let _ = write!(out, "{v}");
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_xml_into(&mut out, text);
    out
}

pub(crate) fn escape_xml_into(out: &mut String, text: &str) {
    let bytes = text.as_bytes();
    let mut start = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        let esc = match b {
            b'&' => Some("&amp;"),
            b'<' => Some("&lt;"),
            b'>' => Some("&gt;"),
            b'"' => Some("&quot;"),
            b'\'' => Some("&#39;"),
            _ => None,
        };
        let Some(esc) = esc else {
            continue;
        };
        if start < i {
            out.push_str(&text[start..i]);
        }
        out.push_str(esc);
        start = i + 1;
    }
    if start < text.len() {
        out.push_str(&text[start..]);
    }
}

/// Normalizes a user-supplied font family for a `font-family` attribute. Lists and quoted names
/// pass through; a bare multi-word family gets single quotes.
pub(crate) fn css_font_family(font_family: &str) -> String {
    let s = font_family.trim().trim_end_matches(';').trim();
    if s.is_empty() {
        return "sans-serif".to_string();
    }
    if s.contains(',') || s.contains('\'') || s.contains('"') {
        return s.to_string();
    }
    if s.chars().any(char::is_whitespace) {
        return format!("'{s}'");
    }
    s.to_string()
}

/// Quotes a family name for a CSS string inside `@font-face`.
pub(crate) fn css_string(value: &str) -> String {
    css_quoted(value, '\'')
}

/// A CSS string literal delimited by `quote`, with the delimiter and backslashes escaped.
pub(crate) fn css_quoted(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            '\n' | '\r' => out.push(' '),
            _ => out.push(ch),
        }
    }
    out.push(quote);
    out
}

/// Prefixes every `id` in `ids` with `prefix`, together with its `url(#..)` and `href="#.."`
/// references, so several copies of the same markup can share one document.
pub(crate) fn scope_ids(markup: &str, ids: &[String], prefix: &str) -> String {
    if ids.is_empty() {
        return markup.to_string();
    }
    let bytes = markup.as_bytes();
    let mut out = String::with_capacity(markup.len() + 32);
    let mut copied = 0usize;
    for i in 0..bytes.len() {
        let token_start = match bytes[i] {
            b'i' if declares_id(markup, i) => i + 4,
            b'#' if references_id(markup, i) => i + 1,
            _ => continue,
        };
        let token = &markup[token_start..];
        let token_len = token
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')))
            .unwrap_or(token.len());
        if ids.iter().any(|id| id == &token[..token_len]) {
            out.push_str(&markup[copied..token_start]);
            out.push_str(prefix);
            copied = token_start;
        }
    }
    out.push_str(&markup[copied..]);
    out
}

/// ` id="` or ` id='` starting at `at` (the `i`).
fn declares_id(markup: &str, at: usize) -> bool {
    let bytes = markup.as_bytes();
    at > 0
        && bytes[at - 1].is_ascii_whitespace()
        && matches!(bytes.get(at + 1..at + 4), Some(b"d=\"") | Some(b"d='"))
}

/// `#` at `at` opens an IRI reference: `url(#`, `url("#`, `url('#`, `href="#` or `href='#`.
fn references_id(markup: &str, at: usize) -> bool {
    let before = &markup[..at];
    if before.ends_with("url(") {
        return true;
    }
    match before.strip_suffix(['"', '\'']) {
        Some(b) => b.ends_with("url(") || b.ends_with("href="),
        None => false,
    }
}
