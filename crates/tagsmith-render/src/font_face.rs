//! `@font-face` embedding so generated documents render the configured font without fetching
//! anything.

use crate::Result;
use crate::svg::{css_quoted, css_string, escape_xml};
use tagsmith_core::{EmbeddedFontDescriptor, ParseError};
use tagsmith_core::template::start_tag_end;

pub fn font_face_rule(font: &EmbeddedFontDescriptor) -> String {
    format!(
        "@font-face {{ font-family: {}; src: url({}) format('{}'); }}",
        css_string(&font.font_family),
        css_quoted(font.data_url.trim(), '"'),
        font.format.css_format()
    )
}

/// Style element content for `rule`: CDATA unless the rule itself contains `]]>`.
fn style_content(rule: &str) -> String {
    if rule.contains("]]>") {
        escape_xml(rule)
    } else {
        format!("<![CDATA[{rule}]]>")
    }
}

/// A `<style>` element carrying the font's `@font-face` rule.
pub fn font_face_style_element(font: &EmbeddedFontDescriptor) -> String {
    style_element(font, None)
}

fn style_element(font: &EmbeddedFontDescriptor, prefix: Option<&str>) -> String {
    let name = qualified(prefix, "style");
    format!(
        r#"<{name} type="text/css">{}</{name}>"#,
        style_content(&font_face_rule(font))
    )
}

fn qualified(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}:{local}"),
        None => local.to_string(),
    }
}

/// The tag name of the element starting at `element_start`, as written in the source.
fn source_tag_name(markup: &str, element_start: usize) -> &str {
    let rest = &markup[element_start + 1..];
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    &rest[..end]
}

fn source_prefix(markup: &str, element_start: usize) -> Option<&str> {
    source_tag_name(markup, element_start)
        .split_once(':')
        .map(|(prefix, _)| prefix)
}

/// Returns `svg` with an `@font-face` rule for `font` in its defs.
///
/// `None` returns the document unchanged. Re-applying the same descriptor is a no-op. The rule goes
/// into the root's first non-empty `<defs>` child, or into a new `<defs>` right after the root
/// start tag. Inserted elements reuse the prefix of the element they are written into.
pub fn inject_font_face(svg: &str, font: Option<&EmbeddedFontDescriptor>) -> Result<String> {
    let Some(font) = font else {
        return Ok(svg.to_string());
    };
    let content = style_content(&font_face_rule(font));
    if svg.contains(&content) {
        return Ok(svg.to_string());
    }

    let doc = roxmltree::Document::parse(svg).map_err(ParseError::from)?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(ParseError::MissingRoot {
            found: root.tag_name().name().to_string(),
        }
        .into());
    }

    let root_start = root.range().start;
    let defs_insert_at = root
        .children()
        .filter(|n| {
            n.is_element()
                && n.tag_name().name() == "defs"
                && n.tag_name().namespace() == root.tag_name().namespace()
        })
        .find_map(|defs| {
            let start = defs.range().start;
            match start_tag_end(svg, start) {
                Some((end, false)) => Some((end, source_prefix(svg, start))),
                _ => None,
            }
        });

    let mut out = String::with_capacity(svg.len() + content.len() + 64);
    match defs_insert_at {
        Some((at, prefix)) => {
            out.push_str(&svg[..at]);
            out.push_str(&style_element(font, prefix));
            out.push_str(&svg[at..]);
        }
        None => {
            let Some((at, self_closing)) = start_tag_end(svg, root_start) else {
                return Err(ParseError::Xml {
                    message: "unterminated root start tag".to_string(),
                }
                .into());
            };
            let prefix = source_prefix(svg, root_start);
            let defs = qualified(prefix, "defs");
            let defs_element = format!("<{defs}>{}</{defs}>", style_element(font, prefix));
            if self_closing {
                // `<svg .../>` becomes `<svg ...><defs>..</defs></svg>`.
                let open_end = svg[..at - 2].trim_end().len();
                out.push_str(&svg[..open_end]);
                out.push('>');
                out.push_str(&defs_element);
                out.push_str("</");
                out.push_str(source_tag_name(svg, root_start));
                out.push('>');
                out.push_str(&svg[at..]);
            } else {
                out.push_str(&svg[..at]);
                out.push_str(&defs_element);
                out.push_str(&svg[at..]);
            }
        }
    }
    Ok(out)
}
