//! Cross-module coverage: serialized trees flowing through the compiler,
//! positional recovery, and opaque-block round trips.

use crate::{
    build_map, lint_document, parse_blocks, render_html, render_nodes, RenderOptions,
};
use inkstone_model::{
    AdmonitionKind, Block, Document, Inline, ListItem, ListStyle, Mark,
};
use inkstone_serializer::serialize;
use std::collections::BTreeMap;

fn paragraph(text: &str) -> Block {
    Block::Paragraph {
        id: String::new(),
        children: vec![Inline::text(text)],
    }
}

#[test]
fn test_serialized_tree_lints_clean() {
    let doc = Document {
        blocks: vec![
            Block::Heading {
                id: String::new(),
                level: 1,
                children: vec![Inline::text("Notes")],
            },
            paragraph("Plain body."),
            Block::List {
                id: String::new(),
                style: ListStyle::Bullet,
                items: vec![
                    ListItem {
                        content: vec![Inline::text("alpha")],
                        children: vec![],
                    },
                    ListItem {
                        content: vec![Inline::text("beta")],
                        children: vec![],
                    },
                ],
            },
            Block::CodeBlock {
                id: String::new(),
                language: Some("rust".to_string()),
                code: "fn main() {}\n".to_string(),
            },
            Block::Admonition {
                id: String::new(),
                flavor: AdmonitionKind::Tip,
                children: vec![paragraph("remember")],
            },
        ],
    };

    let markup = serialize(&doc);
    let report = lint_document(&markup);
    assert!(
        report.diagnostics.is_empty(),
        "serializer output should lint clean, got {:?}",
        report.diagnostics
    );
    assert_eq!(report.outline.len(), 1);
    assert_eq!(report.outline[0].title, "Notes");
}

#[test]
fn test_serialized_tree_renders_with_line_metadata() {
    let doc = Document {
        blocks: vec![
            Block::Heading {
                id: String::new(),
                level: 2,
                children: vec![Inline::text("Intro")],
            },
            paragraph("Body text"),
        ],
    };

    let markup = serialize(&doc);
    assert_eq!(markup, "== Intro\n\nBody text\n");

    let html = render_html(&markup, &RenderOptions::default());
    assert!(html.contains(r#"<h2 data-line="1" id="intro">Intro</h2>"#));
    assert!(html.contains(r#"<p data-line="3">Body text</p>"#));
}

#[test]
fn test_opaque_block_full_round_trip() {
    let mut attributes = BTreeMap::new();
    attributes.insert("a".to_string(), "1".to_string());
    attributes.insert("b".to_string(), "2".to_string());

    let doc = Document {
        blocks: vec![Block::Raw {
            id: "seed-9".to_string(),
            tag: "webcard".to_string(),
            attributes: attributes.clone(),
            body: String::new(),
        }],
    };

    let markup = serialize(&doc);
    let blocks = parse_blocks(&markup);

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind, "raw");
    assert_eq!(blocks[0].tag.as_deref(), Some("webcard"));
    assert_eq!(blocks[0].id.as_deref(), Some("seed-9"));
    assert_eq!(blocks[0].attributes.as_ref(), Some(&attributes));
}

#[test]
fn test_marked_text_round_trips_through_renderer() {
    let doc = Document {
        blocks: vec![Block::Paragraph {
            id: String::new(),
            children: vec![Inline::marked(
                "Hello",
                vec![Mark::Bold, Mark::link("https://example.com")],
            )],
        }],
    };

    let markup = serialize(&doc);
    assert_eq!(markup, "https://example.com[*Hello*]\n");

    let nodes = render_nodes(&markup);
    let html = nodes[0].to_html();
    assert_eq!(
        html,
        r#"<p><a href="https://example.com"><strong>Hello</strong></a></p>"#
    );
}

#[test]
fn test_nested_list_round_trip_depths() {
    let doc = Document {
        blocks: vec![Block::List {
            id: String::new(),
            style: ListStyle::Bullet,
            items: vec![ListItem {
                content: vec![Inline::text("top")],
                children: vec![Block::List {
                    id: String::new(),
                    style: ListStyle::Bullet,
                    items: vec![ListItem {
                        content: vec![Inline::text("mid")],
                        children: vec![Block::List {
                            id: String::new(),
                            style: ListStyle::Bullet,
                            items: vec![ListItem {
                                content: vec![Inline::text("deep")],
                                children: vec![],
                            }],
                        }],
                    }],
                }],
            }],
        }],
    };

    let markup = serialize(&doc);
    let map = build_map(&markup);
    assert_eq!(map.get("li:top"), Some(1));
    assert_eq!(map.get("li:mid"), Some(2));
    assert_eq!(map.get("li:deep"), Some(3));

    let nodes = render_nodes(&markup);
    assert_eq!(
        nodes[0].to_html(),
        "<ul><li>top<ul><li>mid<ul><li>deep</li></ul></li></ul></li></ul>"
    );
}

#[test]
fn test_table_round_trip_with_spans() {
    let markup = "|===\n|Name |Value\n2+|span\n|===\n";
    let report = lint_document(markup);
    assert!(report.diagnostics.is_empty());

    let html = render_html(markup, &RenderOptions { annotate: false });
    assert!(html.contains(r#"<td colspan="2">span</td>"#));
}

#[test]
fn test_duplicate_content_first_occurrence_wins() {
    // Documented limitation: duplicate text maps to its first source
    // line; later duplicates inherit the same position.
    let markup = "repeated line\n\nrepeated line\n";
    let mut nodes = render_nodes(markup);
    let map = build_map(markup);
    crate::annotate(&mut nodes, &map);

    assert_eq!(nodes[0].attr("data-line"), Some("1"));
    assert_eq!(nodes[1].attr("data-line"), Some("1"));
}
