use std::path::PathBuf;
use tagsmith_core::template::SVG_NAMESPACE;
use tagsmith_core::{
    EmbeddedFontDescriptor, NameEntry, SheetConfig, TemplateDocument, TemplateSizeConfig,
    TextLayoutConfig, parse_name_list,
};
use tagsmith_render::text::DeterministicTextMeasurer;
use tagsmith_render::{Error, render_separate, render_sheet};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn template(name: &str) -> TemplateDocument {
    let path = workspace_root().join("fixtures").join("templates").join(name);
    let text = std::fs::read_to_string(&path).expect("fixture");
    TemplateDocument::parse(text).expect("template parses")
}

fn attendees() -> Vec<NameEntry> {
    let path = workspace_root()
        .join("fixtures")
        .join("names")
        .join("attendees.csv");
    parse_name_list(&std::fs::read_to_string(&path).expect("fixture"))
}

fn slot_groups<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
) -> Vec<roxmltree::Node<'a, 'input>> {
    doc.root_element()
        .children()
        .filter(|n| n.has_tag_name((SVG_NAMESPACE, "g")) && n.attribute("transform").is_some())
        .collect()
}

#[test]
fn badge_sheet_places_every_attendee_row_major() {
    let template = template("badge.svg");
    let names = attendees();
    assert_eq!(names.len(), 6);

    let size = TemplateSizeConfig::from_bounds(template.bounds());
    let out = render_sheet(
        &template,
        &names,
        &TextLayoutConfig::default(),
        &size,
        &SheetConfig::a4(),
        &DeterministicTextMeasurer::default(),
    )
    .expect("sheet renders");

    // (210 - 20 + 5) / 95 = 2 per row, (297 - 20 + 5) / 60 = 4 per column
    assert_eq!(out.stats.tags_per_row, 2);
    assert_eq!(out.stats.tags_per_column, 4);
    assert_eq!(out.stats.will_generate, 6);

    let doc = roxmltree::Document::parse(&out.svg).expect("well-formed sheet");
    let root = doc.root_element();
    assert_eq!(root.attribute("width"), Some("210mm"));
    assert_eq!(root.attribute("height"), Some("297mm"));
    assert_eq!(
        root.lookup_namespace_uri(Some("inkscape")),
        Some("http://www.inkscape.org/namespaces/inkscape")
    );

    let slots = slot_groups(&doc);
    let transforms: Vec<_> = slots.iter().filter_map(|g| g.attribute("transform")).collect();
    assert_eq!(
        transforms,
        [
            "translate(10 10)",
            "translate(105 10)",
            "translate(10 70)",
            "translate(105 70)",
            "translate(10 130)",
            "translate(105 130)",
        ]
    );

    let first_name = slots[0]
        .descendants()
        .filter(|n| n.has_tag_name((SVG_NAMESPACE, "text")))
        .filter_map(|n| n.text())
        .collect::<Vec<_>>();
    assert_eq!(first_name, ["HELLO, my name is", "Ada Lovelace"]);
    assert!(out.svg.contains(r#"id="tag1-band""#));
    assert!(out.svg.contains("url(#tag6-band)"));
    assert!(!out.svg.contains("url(#band)"));

    let mut ids: Vec<_> = doc.descendants().filter_map(|n| n.attribute("id")).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total, "duplicate ids on the sheet");
    assert_eq!(total, 6);
}

#[test]
fn long_names_are_scaled_and_second_lines_rendered() {
    let template = template("badge.svg");
    let text = TextLayoutConfig {
        second_line_enabled: true,
        ..Default::default()
    };
    let size = TemplateSizeConfig::from_bounds(template.bounds());
    let out = render_sheet(
        &template,
        &attendees(),
        &text,
        &size,
        &SheetConfig::a4(),
        &DeterministicTextMeasurer::default(),
    )
    .expect("sheet renders");

    let doc = roxmltree::Document::parse(&out.svg).expect("well-formed sheet");
    let slots = slot_groups(&doc);
    let runs = |slot: usize| {
        slots[slot]
            .descendants()
            .filter(|n| n.has_tag_name((SVG_NAMESPACE, "text")) && n.attribute("font-size").is_some())
            .filter(|n| n.parent().and_then(|p| p.attribute("class")) == Some("tag-text"))
            .map(|n| {
                (
                    n.text().unwrap_or_default().to_string(),
                    n.attribute("font-size").unwrap_or_default().parse::<f64>().unwrap(),
                )
            })
            .collect::<Vec<_>>()
    };

    // "Alan Turing," has an empty second field: the name is repeated.
    assert_eq!(runs(2).len(), 2);
    assert_eq!(runs(2)[1], ("Alan Turing".to_string(), 5.0));
    assert_eq!(runs(0)[1].0, "Analytical Engines");
    assert_eq!(runs(0)[1].1, 5.0);

    let long = runs(5);
    assert_eq!(long[0].0, "Maximilian Alexander von Hohenberg-Lichtenstein");
    assert!(long[0].1 < 8.0, "long name should be scaled, got {}", long[0].1);
    assert!(long[1].1 < 5.0, "long second line should be scaled, got {}", long[1].1);
}

#[test]
fn sheet_output_is_byte_identical_across_runs() {
    let template = template("badge.svg");
    let size = TemplateSizeConfig::from_bounds(template.bounds());
    let run = || {
        render_sheet(
            &template,
            &attendees(),
            &TextLayoutConfig::default(),
            &size,
            &SheetConfig::letter(),
            &DeterministicTextMeasurer::default(),
        )
        .expect("sheet renders")
        .svg
    };
    assert_eq!(run(), run());
}

#[test]
fn tag_larger_than_the_page_is_a_capacity_error() {
    let template = template("badge.svg");
    let size = TemplateSizeConfig {
        width: 300.0,
        height: 55.0,
        lock_aspect: false,
    };
    let err = render_sheet(
        &template,
        &attendees(),
        &TextLayoutConfig::default(),
        &size,
        &SheetConfig::a4(),
        &DeterministicTextMeasurer::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Capacity { .. }), "got {err:?}");
}

#[test]
fn embedded_font_appears_once_per_sheet() {
    let template = template("badge.svg");
    let mut text = TextLayoutConfig::default();
    text.set_embedded_font(EmbeddedFontDescriptor {
        font_family: "Brand Sans".to_string(),
        data_url: "data:font/woff;base64,d09GRg==".to_string(),
        format: tagsmith_core::FontFormat::Woff,
    });
    let size = TemplateSizeConfig::from_bounds(template.bounds());
    let out = render_sheet(
        &template,
        &attendees(),
        &text,
        &size,
        &SheetConfig::a4(),
        &DeterministicTextMeasurer::default(),
    )
    .expect("sheet renders");

    assert_eq!(out.svg.matches("@font-face").count(), 1);
    let doc = roxmltree::Document::parse(&out.svg).expect("well-formed sheet");
    let families: Vec<_> = slot_groups(&doc)
        .iter()
        .flat_map(|g| g.descendants())
        .filter(|n| n.attribute("class") == Some("tag-text"))
        .filter_map(|n| n.attribute("font-family"))
        .collect();
    assert_eq!(families.len(), 6);
    assert!(families.iter().all(|f| *f == "'Brand Sans'"));
    let first = doc
        .root_element()
        .first_element_child()
        .expect("root has children");
    assert!(first.has_tag_name((SVG_NAMESPACE, "defs")));
}

#[test]
fn separate_documents_keep_the_tag_size() {
    let template = template("ornament.svg");
    // 2in x 2in
    assert!((template.bounds().width - 50.8).abs() < 1e-9);

    let names = parse_name_list("jane doe\njohn smith\n");
    let size = TemplateSizeConfig::from_bounds(template.bounds());
    let docs = render_separate(
        &template,
        &names,
        &TextLayoutConfig::default(),
        &size,
        &DeterministicTextMeasurer::default(),
    )
    .expect("separate renders");

    assert_eq!(docs.len(), 2);
    for ((tag, svg), entry) in docs.iter().zip(&names) {
        assert_eq!(tag.name, entry.name);
        let doc = roxmltree::Document::parse(svg).expect("well-formed tag");
        let root = doc.root_element();
        assert_eq!(root.attribute("width"), Some("50.8mm"));
        assert_eq!(root.attribute("height"), Some("50.8mm"));
        assert!(slot_groups(&doc).is_empty());
    }
}
