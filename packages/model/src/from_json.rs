//! Tolerant ingestion of document-tree snapshots from the editing surface.
//!
//! The editing surface hands the engine JSON snapshots of its tree. Node
//! kinds the engine does not recognize must never be fatal: they map to
//! [`Block::Unknown`], keeping text and children, so the serializer's
//! default arm can still emit their content.

use crate::document::{
    AdmonitionKind, Block, Document, Inline, ListItem, ListStyle, TableCell, TableRow,
};
use crate::mark::Mark;
use serde_json::Value;
use std::collections::BTreeMap;

/// Convert a tree snapshot into a [`Document`]. Never fails.
pub fn document_from_json(value: &Value) -> Document {
    let blocks = value
        .get("blocks")
        .or_else(|| value.get("children"))
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(block_from_json).collect())
        .unwrap_or_default();

    Document { blocks }
}

/// Convert a single block node. Unrecognized kinds become [`Block::Unknown`].
pub fn block_from_json(value: &Value) -> Block {
    let id = string_field(value, "id");
    let kind = value
        .get("kind")
        .or_else(|| value.get("type"))
        .and_then(Value::as_str)
        .unwrap_or("");

    match kind {
        "paragraph" => Block::Paragraph {
            id,
            children: inlines_from(value),
        },
        "heading" => Block::Heading {
            id,
            level: value
                .get("level")
                .and_then(Value::as_u64)
                .map(|l| l.clamp(1, 6) as u8)
                .unwrap_or(1),
            children: inlines_from(value),
        },
        "list" => Block::List {
            id,
            style: match value.get("style").and_then(Value::as_str) {
                Some("ordered") => ListStyle::Ordered,
                _ => ListStyle::Bullet,
            },
            items: value
                .get("items")
                .and_then(Value::as_array)
                .map(|arr| arr.iter().map(item_from_json).collect())
                .unwrap_or_default(),
        },
        "code-block" => Block::CodeBlock {
            id,
            language: value
                .get("language")
                .and_then(Value::as_str)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
            code: string_field(value, "code"),
        },
        "blockquote" => Block::Blockquote {
            id,
            children: child_blocks(value),
        },
        "table" => Block::Table {
            id,
            rows: value
                .get("rows")
                .and_then(Value::as_array)
                .map(|arr| arr.iter().map(row_from_json).collect())
                .unwrap_or_default(),
        },
        "image" => Block::Image {
            id,
            src: string_field(value, "src"),
            alt: string_field(value, "alt"),
        },
        "horizontal-rule" => Block::HorizontalRule { id },
        "admonition" => Block::Admonition {
            id,
            flavor: value
                .get("flavor")
                .and_then(Value::as_str)
                .and_then(AdmonitionKind::parse)
                .unwrap_or_default(),
            children: child_blocks(value),
        },
        "include" => Block::Include {
            id,
            path: string_field(value, "path"),
        },
        "math-block" => Block::MathBlock {
            id,
            source: string_field(value, "source"),
        },
        "collapsible" => Block::Collapsible {
            id,
            title: string_field(value, "title"),
            children: child_blocks(value),
        },
        "raw" => Block::Raw {
            id,
            tag: string_field(value, "tag"),
            attributes: value
                .get("attributes")
                .and_then(Value::as_object)
                .map(|obj| {
                    obj.iter()
                        .map(|(k, v)| (k.clone(), scalar_to_string(v)))
                        .collect()
                })
                .unwrap_or_else(BTreeMap::new),
            body: string_field(value, "body"),
        },
        other => Block::Unknown {
            id,
            kind: other.to_string(),
            text: string_field(value, "text"),
            children: child_blocks(value),
        },
    }
}

fn child_blocks(value: &Value) -> Vec<Block> {
    value
        .get("children")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(block_from_json).collect())
        .unwrap_or_default()
}

fn inlines_from(value: &Value) -> Vec<Inline> {
    value
        .get("children")
        .or_else(|| value.get("content"))
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(inline_from_json).collect())
        .unwrap_or_default()
}

fn inline_from_json(value: &Value) -> Option<Inline> {
    let kind = value
        .get("kind")
        .or_else(|| value.get("type"))
        .and_then(Value::as_str)
        .unwrap_or("text");

    match kind {
        "text" => Some(Inline::Text {
            text: string_field(value, "text"),
            marks: value
                .get("marks")
                .and_then(Value::as_array)
                .map(|arr| arr.iter().map(mark_from_json).collect())
                .unwrap_or_default(),
        }),
        "hard-break" => Some(Inline::HardBreak),
        // An inline we don't recognize keeps its text, unmarked.
        _ => {
            let text = string_field(value, "text");
            if text.is_empty() {
                None
            } else {
                Some(Inline::text(text))
            }
        }
    }
}

fn mark_from_json(value: &Value) -> Mark {
    let kind = value
        .get("kind")
        .or_else(|| value.get("type"))
        .and_then(Value::as_str)
        .unwrap_or("");

    match kind {
        "bold" => Mark::Bold,
        "italic" => Mark::Italic,
        "code" => Mark::Code,
        "underline" => Mark::Underline,
        "strike" => Mark::Strike,
        "link" => Mark::Link {
            href: string_field(value, "href"),
        },
        "highlight" => Mark::Highlight {
            color: string_field(value, "color"),
        },
        "text-color" => Mark::TextColor {
            color: string_field(value, "color"),
        },
        other => Mark::Unknown {
            kind: other.to_string(),
        },
    }
}

fn item_from_json(value: &Value) -> ListItem {
    ListItem {
        content: value
            .get("content")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(inline_from_json).collect())
            .unwrap_or_default(),
        children: child_blocks(value),
    }
}

fn row_from_json(value: &Value) -> TableRow {
    TableRow {
        header: value
            .get("header")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        cells: value
            .get("cells")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().map(cell_from_json).collect())
            .unwrap_or_default(),
    }
}

fn cell_from_json(value: &Value) -> TableCell {
    TableCell {
        colspan: span_field(value, "colspan"),
        rowspan: span_field(value, "rowspan"),
        children: inlines_from(value),
    }
}

fn span_field(value: &Value, name: &str) -> u32 {
    value
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v.max(1) as u32)
        .unwrap_or(1)
}

fn string_field(value: &Value, name: &str) -> String {
    value
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
