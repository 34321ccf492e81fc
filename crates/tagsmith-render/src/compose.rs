//! Single-tag composition.
//!
//! A tag is the template's content nested in an inner `<svg>` that maps the template's own
//! viewBox onto the configured tag size, followed by a text group in tag millimeters. The
//! template markup is copied verbatim; text is layered above it.

use crate::font_face::inject_font_face;
use crate::layout::{ResolvedTextLayout, resolve_text_layout};
use crate::svg::{css_font_family, escape_xml, escape_xml_into, fmt, fmt_into, scope_ids};
use crate::text::TextMeasurer;
use crate::{Error, Result};
use tagsmith_core::template::SVG_NAMESPACE;
use tagsmith_core::{
    EmbeddedFontDescriptor, NameEntry, TemplateDocument, TemplateSizeConfig, TextLayoutConfig,
};

/// One text-stamped template instance, not yet wrapped in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedTag {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub layout: ResolvedTextLayout,
    body: String,
    template_len: usize,
}

impl ComposedTag {
    /// Tag markup in tag-local millimeter coordinates, origin at the top-left corner.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// [`Self::body`] with the template's ids (and references to them) prefixed by `prefix`.
    /// The name text is left alone.
    pub(crate) fn scoped_body(&self, ids: &[String], prefix: &str) -> String {
        let (template, text) = self.body.split_at(self.template_len);
        let mut out = scope_ids(template, ids, prefix);
        out.push_str(text);
        out
    }
}

pub fn compose_tag(
    template: &TemplateDocument,
    entry: &NameEntry,
    config: &TextLayoutConfig,
    size: &TemplateSizeConfig,
    measurer: &dyn TextMeasurer,
) -> Result<ComposedTag> {
    if !size.is_positive() {
        return Err(Error::Layout {
            width: size.width,
            height: size.height,
        });
    }
    let layout = resolve_text_layout(entry, config, size.width, size.height, measurer)?;

    let mut body = String::with_capacity(template.inner_markup().len() + 512);
    write_template_instance(&mut body, template, size.width, size.height);
    let template_len = body.len();
    write_text_group(&mut body, &layout, config);

    Ok(ComposedTag {
        name: entry.name.trim().to_string(),
        width: size.width,
        height: size.height,
        layout,
        body,
        template_len,
    })
}

/// A standalone document for `tag`, sized to the tag, with `font` embedded.
pub fn render_tag_document(
    template: &TemplateDocument,
    tag: &ComposedTag,
    font: Option<&EmbeddedFontDescriptor>,
) -> Result<String> {
    let mut out = String::with_capacity(tag.body.len() + 512);
    write_document_start(&mut out, template, tag.width, tag.height);
    out.push_str(&tag.body);
    out.push_str("</svg>\n");
    inject_font_face(&out, font)
}

pub(crate) const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Writes the XML declaration and an outer `<svg>` start tag sized `width`x`height` mm with a
/// matching millimeter viewBox. Namespaces declared on the template root are re-declared so the
/// copied markup keeps its prefixes.
pub(crate) fn write_document_start(
    out: &mut String,
    template: &TemplateDocument,
    width: f64,
    height: f64,
) {
    out.push_str(XML_DECLARATION);
    out.push_str("<svg xmlns=\"");
    out.push_str(SVG_NAMESPACE);
    out.push('"');
    for ns in template.namespaces() {
        // The default namespace is always SVG on the output root.
        let Some(prefix) = ns.prefix.as_deref() else {
            continue;
        };
        out.push_str(" xmlns:");
        out.push_str(prefix);
        out.push_str("=\"");
        escape_xml_into(out, &ns.uri);
        out.push('"');
    }
    out.push_str(" width=\"");
    fmt_into(out, width);
    out.push_str("mm\" height=\"");
    fmt_into(out, height);
    out.push_str("mm\" viewBox=\"0 0 ");
    fmt_into(out, width);
    out.push(' ');
    fmt_into(out, height);
    out.push_str("\">");
}

fn write_template_instance(out: &mut String, template: &TemplateDocument, width: f64, height: f64) {
    let vb = template.view_box();
    out.push_str("<svg x=\"0\" y=\"0\" width=\"");
    fmt_into(out, width);
    out.push_str("\" height=\"");
    fmt_into(out, height);
    out.push_str("\" viewBox=\"");
    out.push_str(&format!(
        "{} {} {} {}",
        fmt(vb.min_x),
        fmt(vb.min_y),
        fmt(vb.width),
        fmt(vb.height)
    ));
    out.push_str("\" preserveAspectRatio=\"none\"");
    for attr in template.root_attributes() {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        escape_xml_into(out, &attr.value);
        out.push('"');
    }
    out.push('>');
    out.push_str(template.inner_markup());
    out.push_str("</svg>");
}

fn write_text_group(out: &mut String, layout: &ResolvedTextLayout, config: &TextLayoutConfig) {
    out.push_str("<g class=\"tag-text\" font-family=\"");
    out.push_str(&escape_xml(&css_font_family(&config.font_family)));
    out.push_str("\" fill=\"");
    escape_xml_into(out, fill_or_default(&config.fill));
    out.push_str("\" text-anchor=\"");
    out.push_str(layout.alignment.text_anchor());
    out.push_str("\" dominant-baseline=\"middle\"");
    let letter_spacing = config.letter_spacing.max(0.0);
    if letter_spacing > 0.0 {
        out.push_str(" letter-spacing=\"");
        fmt_into(out, letter_spacing);
        out.push('"');
    }
    out.push('>');
    for run in layout.runs() {
        out.push_str("<text x=\"");
        fmt_into(out, run.x);
        out.push_str("\" y=\"");
        fmt_into(out, run.y);
        out.push_str("\" font-size=\"");
        fmt_into(out, run.font_size);
        out.push_str("\">");
        escape_xml_into(out, &run.text);
        out.push_str("</text>");
    }
    out.push_str("</g>");
}

fn fill_or_default(fill: &str) -> &str {
    let fill = fill.trim();
    if fill.is_empty() { "#000000" } else { fill }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::DeterministicTextMeasurer;
    use tagsmith_core::HorizontalAlignment;

    const TEMPLATE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="90mm" height="55mm" viewBox="0 0 90 55" fill="none"><rect x="1" y="1" width="88" height="53" rx="4" stroke="#333"/><text x="45" y="8">ACME</text></svg>"##;

    fn compose(entry: &NameEntry, config: &TextLayoutConfig, width: f64, height: f64) -> Result<ComposedTag> {
        let template = TemplateDocument::parse(TEMPLATE).unwrap();
        let size = TemplateSizeConfig {
            width,
            height,
            lock_aspect: true,
        };
        compose_tag(&template, entry, config, &size, &DeterministicTextMeasurer::default())
    }

    #[test]
    fn body_keeps_template_markup_and_adds_text() {
        let tag = compose(&NameEntry::new("Ada & Co"), &TextLayoutConfig::default(), 90.0, 55.0).unwrap();
        assert!(tag.body().contains(r##"<rect x="1" y="1" width="88" height="53" rx="4" stroke="#333"/><text x="45" y="8">ACME</text></svg>"##));
        assert!(tag.body().contains(r#"<text x="45" y="27.5" font-size="8">Ada &amp; Co</text>"#));
        assert!(tag.body().contains(r#"text-anchor="middle""#));
        assert!(tag.body().contains(r#" fill="none">"#));
        let template_at = tag.body().find("ACME").unwrap();
        let name_at = tag.body().find("Ada &amp; Co").unwrap();
        assert!(template_at < name_at);
    }

    #[test]
    fn template_is_scaled_to_the_configured_size() {
        let tag = compose(&NameEntry::new("Ada"), &TextLayoutConfig::default(), 45.0, 27.5).unwrap();
        assert!(tag.body().starts_with(
            r#"<svg x="0" y="0" width="45" height="27.5" viewBox="0 0 90 55" preserveAspectRatio="none""#
        ));
        assert_eq!(tag.layout.anchor_x, 22.5);
    }

    #[test]
    fn standalone_document_is_well_formed_and_sized() {
        let template = TemplateDocument::parse(TEMPLATE).unwrap();
        let config = TextLayoutConfig {
            horizontal_alignment: HorizontalAlignment::Right,
            letter_spacing: 0.4,
            font_family: "Open Sans".to_string(),
            ..Default::default()
        };
        let tag = compose(&NameEntry::new("Grace"), &config, 90.0, 55.0).unwrap();
        let svg = render_tag_document(&template, &tag, None).unwrap();

        let doc = roxmltree::Document::parse(&svg).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().namespace(), Some(SVG_NAMESPACE));
        assert_eq!(root.attribute("width"), Some("90mm"));
        assert_eq!(root.attribute("height"), Some("55mm"));
        assert_eq!(root.attribute("viewBox"), Some("0 0 90 55"));
        assert_eq!(root.lookup_namespace_uri(Some("xlink")), Some("http://www.w3.org/1999/xlink"));

        let group = root.children().find(|n| n.has_tag_name((SVG_NAMESPACE, "g"))).unwrap();
        assert_eq!(group.attribute("font-family"), Some("'Open Sans'"));
        assert_eq!(group.attribute("text-anchor"), Some("end"));
        assert_eq!(group.attribute("letter-spacing"), Some("0.4"));
    }

    #[test]
    fn embedded_font_lands_in_the_document() {
        let template = TemplateDocument::parse(TEMPLATE).unwrap();
        let font = EmbeddedFontDescriptor {
            font_family: "Brand".to_string(),
            data_url: "data:font/ttf;base64,AAEAAA==".to_string(),
            format: tagsmith_core::FontFormat::Truetype,
        };
        let tag = compose(&NameEntry::new("Ada"), &TextLayoutConfig::default(), 90.0, 55.0).unwrap();
        let svg = render_tag_document(&template, &tag, Some(&font)).unwrap();
        assert_eq!(svg.matches("@font-face").count(), 1);
        roxmltree::Document::parse(&svg).unwrap();
    }

    #[test]
    fn scoped_body_renames_template_ids_only() {
        let template = TemplateDocument::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 90 55"><clipPath id="c"/><rect clip-path="url(#c)"/></svg>"##,
        )
        .unwrap();
        let size = TemplateSizeConfig {
            width: 90.0,
            height: 55.0,
            lock_aspect: true,
        };
        let entry = NameEntry::new("url(#c)");
        let tag = compose_tag(&template, &entry, &TextLayoutConfig::default(), &size, &DeterministicTextMeasurer::default()).unwrap();
        let scoped = tag.scoped_body(template.element_ids(), "tag3-");
        assert!(scoped.contains(r#"<clipPath id="tag3-c"/><rect clip-path="url(#tag3-c)"/>"#));
        assert!(scoped.ends_with(">url(#c)</text></g>"));
    }

    #[test]
    fn non_positive_size_is_a_layout_error() {
        let err = compose(&NameEntry::new("Ada"), &TextLayoutConfig::default(), 90.0, -1.0).unwrap_err();
        assert!(matches!(err, Error::Layout { .. }));
    }
}
