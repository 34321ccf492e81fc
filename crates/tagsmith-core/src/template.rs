//! Template loading: bounds, coordinate system and root-element anatomy of an SVG template.
//!
//! Templates are expected to be authored in millimeters. Unit-less and `px` lengths are read as
//! millimeters too; that is this crate's convention, not an SVG rule. Absolute units (`cm`,
//! `in`, `pt`, `pc`) are converted.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::str::FromStr;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// CSS reference pixels per millimeter (96dpi).
const PX_PER_MM: f64 = 96.0 / 25.4;

/// Intrinsic template size in millimeters. Both dimensions are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateBounds {
    pub width: f64,
    pub height: f64,
}

impl TemplateBounds {
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// The template's user-space coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// `None` for the default namespace.
    pub prefix: Option<String>,
    pub uri: String,
}

/// A root attribute that is not part of the root's geometry or namespace declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootAttribute {
    /// Qualified name as written (`fill`, `xml:space`, `inkscape:version`).
    pub name: String,
    /// Unescaped value.
    pub value: String,
}

/// Raw SVG markup plus everything derived from it at load time. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct TemplateDocument {
    markup: String,
    bounds: TemplateBounds,
    view_box: ViewBox,
    namespaces: Vec<NamespaceDecl>,
    root_attributes: Vec<RootAttribute>,
    element_ids: Vec<String>,
    inner: Range<usize>,
}

impl TemplateDocument {
    pub fn parse(markup: impl Into<String>) -> Result<Self, ParseError> {
        let markup = markup.into();
        let doc = roxmltree::Document::parse(&markup)?;
        let root = svg_root(&doc)?;
        let geometry = root_geometry(root)?;

        let namespaces = root
            .namespaces()
            .filter(|ns| ns.name() != Some("xml"))
            .map(|ns| NamespaceDecl {
                prefix: ns.name().map(str::to_string),
                uri: ns.uri().to_string(),
            })
            .collect::<Vec<_>>();

        let root_attributes = root
            .attributes()
            .filter(|a| a.namespace().is_some() || !is_root_geometry_attr(a.name()))
            .map(|a| RootAttribute {
                name: qualified_attr_name(root, &a),
                value: a.value().to_string(),
            })
            .collect::<Vec<_>>();

        let element_ids = root
            .descendants()
            .filter_map(|n| n.attribute("id"))
            .map(str::to_string)
            .collect::<Vec<_>>();

        let inner = inner_range(&markup, root.range());
        drop(doc);

        tracing::debug!(
            width_mm = geometry.bounds.width,
            height_mm = geometry.bounds.height,
            "loaded template"
        );

        Ok(Self {
            bounds: geometry.bounds,
            view_box: geometry.view_box,
            namespaces,
            root_attributes,
            element_ids,
            inner,
            markup,
        })
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn bounds(&self) -> TemplateBounds {
        self.bounds
    }

    pub fn view_box(&self) -> ViewBox {
        self.view_box
    }

    /// Namespaces in scope on the root element (the implicit `xml` prefix excluded).
    pub fn namespaces(&self) -> &[NamespaceDecl] {
        &self.namespaces
    }

    /// Root attributes other than `width`, `height`, `x`, `y`, `viewBox`,
    /// `preserveAspectRatio`, `version` and `baseProfile`.
    pub fn root_attributes(&self) -> &[RootAttribute] {
        &self.root_attributes
    }

    /// Every `id` declared in the template, the root's included, in document order.
    pub fn element_ids(&self) -> &[String] {
        &self.element_ids
    }

    /// Markup between the root start and end tags, verbatim.
    pub fn inner_markup(&self) -> &str {
        &self.markup[self.inner.clone()]
    }
}

/// Extracts template bounds in millimeters without keeping the document.
pub fn parse_bounds(markup: &str) -> Result<TemplateBounds, ParseError> {
    let doc = roxmltree::Document::parse(markup)?;
    let root = svg_root(&doc)?;
    Ok(root_geometry(root)?.bounds)
}

fn svg_root<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
) -> Result<roxmltree::Node<'a, 'input>, ParseError> {
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(ParseError::MissingRoot {
            found: root.tag_name().name().to_string(),
        });
    }
    Ok(root)
}

fn is_root_geometry_attr(name: &str) -> bool {
    matches!(
        name,
        "width" | "height" | "x" | "y" | "viewBox" | "preserveAspectRatio" | "version" | "baseProfile"
    )
}

fn qualified_attr_name(node: roxmltree::Node<'_, '_>, attr: &roxmltree::Attribute<'_, '_>) -> String {
    match attr.namespace() {
        None => attr.name().to_string(),
        Some(XML_NAMESPACE) => format!("xml:{}", attr.name()),
        Some(uri) => match node.lookup_prefix(uri) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", attr.name()),
            _ => attr.name().to_string(),
        },
    }
}

/// Byte offset just past the `>` closing the start tag that begins at `element_start`, and
/// whether that tag is self-closing. Quoted attribute values may contain `>`.
pub fn start_tag_end(markup: &str, element_start: usize) -> Option<(usize, bool)> {
    let bytes = markup.as_bytes();
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate().skip(element_start) {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => {
                let self_closing = i > 0 && bytes[i - 1] == b'/';
                return Some((i + 1, self_closing));
            }
            _ => {}
        }
    }
    None
}

/// Byte range of the root element's content, empty for a self-closing root.
fn inner_range(markup: &str, element: Range<usize>) -> Range<usize> {
    let Some((content_start, self_closing)) = start_tag_end(markup, element.start) else {
        return element.end..element.end;
    };
    if self_closing || content_start > element.end {
        return element.end..element.end;
    }
    let content_end = markup[content_start..element.end]
        .rfind("</")
        .map(|rel| content_start + rel)
        .unwrap_or(element.end);
    content_start..content_end
}

struct RootGeometry {
    bounds: TemplateBounds,
    view_box: ViewBox,
}

#[derive(Debug, Clone, Copy)]
struct ParsedLength {
    mm: f64,
    user_units: f64,
}

fn root_geometry(root: roxmltree::Node<'_, '_>) -> Result<RootGeometry, ParseError> {
    let width = root
        .attribute("width")
        .map(|v| parse_length("width", v))
        .transpose()?
        .flatten();
    let height = root
        .attribute("height")
        .map(|v| parse_length("height", v))
        .transpose()?
        .flatten();
    let view_box = root.attribute("viewBox").map(parse_view_box).transpose()?;

    let (width_mm, height_mm) = match (width, height, view_box) {
        (Some(w), Some(h), _) => (w.mm, h.mm),
        (Some(w), None, Some(vb)) => (w.mm, w.mm * vb.height / vb.width),
        (None, Some(h), Some(vb)) => (h.mm * vb.width / vb.height, h.mm),
        (None, None, Some(vb)) => (vb.width, vb.height),
        _ => return Err(ParseError::MissingDimensions),
    };
    if !(width_mm.is_finite() && height_mm.is_finite() && width_mm > 0.0 && height_mm > 0.0) {
        return Err(ParseError::MissingDimensions);
    }

    let view_box = view_box.unwrap_or_else(|| ViewBox {
        min_x: 0.0,
        min_y: 0.0,
        width: width.map(|w| w.user_units).unwrap_or(width_mm),
        height: height.map(|h| h.user_units).unwrap_or(height_mm),
    });

    Ok(RootGeometry {
        bounds: TemplateBounds {
            width: width_mm,
            height: height_mm,
        },
        view_box,
    })
}

/// Returns `Ok(None)` for lengths that cannot be resolved without a viewport (`%`, `em`, `ex`)
/// and for non-positive values.
fn parse_length(attribute: &'static str, raw: &str) -> Result<Option<ParsedLength>, ParseError> {
    use svgtypes::LengthUnit;

    let length = svgtypes::Length::from_str(raw.trim()).map_err(|_| ParseError::InvalidLength {
        attribute,
        value: raw.to_string(),
    })?;
    let n = length.number;
    let (mm, user_units) = match length.unit {
        LengthUnit::None | LengthUnit::Px => (n, n),
        LengthUnit::Mm => (n, n * PX_PER_MM),
        LengthUnit::Cm => (n * 10.0, n * 10.0 * PX_PER_MM),
        LengthUnit::In => (n * 25.4, n * 96.0),
        LengthUnit::Pt => (n * 25.4 / 72.0, n * 96.0 / 72.0),
        LengthUnit::Pc => (n * 25.4 / 6.0, n * 16.0),
        LengthUnit::Em | LengthUnit::Ex | LengthUnit::Percent => return Ok(None),
    };
    if !(mm.is_finite() && mm > 0.0) {
        return Ok(None);
    }
    Ok(Some(ParsedLength { mm, user_units }))
}

fn parse_view_box(raw: &str) -> Result<ViewBox, ParseError> {
    let vb = svgtypes::ViewBox::from_str(raw).map_err(|_| ParseError::InvalidViewBox {
        value: raw.to_string(),
    })?;
    if !(vb.w.is_finite() && vb.h.is_finite() && vb.w > 0.0 && vb.h > 0.0) {
        return Err(ParseError::InvalidViewBox {
            value: raw.to_string(),
        });
    }
    Ok(ViewBox {
        min_x: vb.x,
        min_y: vb.y,
        width: vb.w,
        height: vb.h,
    })
}
