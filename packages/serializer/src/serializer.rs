//! Tree → markup serialization.
//!
//! One match arm per block kind, with a mandatory default arm for
//! unrecognized kinds that recurses into children and, failing that,
//! emits contained text verbatim. Serialization never fails and never
//! drops content wholesale.

use crate::marks;
use crate::passthrough;
use inkstone_model::{
    collect_text, Block, Document, Inline, ListItem, ListStyle, TableCell,
};

/// Immutable walk context, passed by value through the recursive descent.
#[derive(Debug, Clone, Copy, Default)]
struct Ctx {
    list_depth: usize,
    list_style: Option<ListStyle>,
}

impl Ctx {
    fn enter_list(self, style: ListStyle) -> Self {
        Self {
            list_depth: self.list_depth + 1,
            list_style: Some(style),
        }
    }
}

/// Serializer converts the document tree back to markup text.
///
/// Every block-producing visit pushes exactly one trailing blank line so
/// blocks stay separated in the markup grammar; nested containers strip
/// a single trailing blank line before their closing delimiter.
pub struct Serializer {
    out: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self { out: String::new() }
    }

    /// Serialize a document to markup text. An empty document yields an
    /// empty string.
    pub fn serialize(mut self, doc: &Document) -> String {
        for block in &doc.blocks {
            self.serialize_block(block, Ctx::default());
        }
        self.finish()
    }

    fn finish(self) -> String {
        if self.out.trim().is_empty() {
            return String::new();
        }
        let mut out = self.out;
        out.truncate(out.trim_end_matches('\n').len());
        out.push('\n');
        out
    }

    fn serialize_block(&mut self, block: &Block, ctx: Ctx) {
        match block {
            Block::Paragraph { children, .. } => {
                let text = inline_text(children);
                if text.is_empty() {
                    // Empty paragraphs still contribute a blank line to
                    // preserve vertical rhythm.
                    self.out.push('\n');
                } else {
                    self.push_block(&text);
                }
            }

            Block::Heading {
                level, children, ..
            } => {
                let marker = "=".repeat((*level).clamp(1, 6) as usize);
                self.push_block(&format!("{} {}", marker, inline_text(children)));
            }

            Block::List { style, items, .. } => {
                self.serialize_list(items, ctx.enter_list(*style));
                self.out.push('\n');
            }

            Block::CodeBlock {
                language, code, ..
            } => {
                let mut content = String::new();
                if let Some(lang) = language {
                    content.push_str("[source,");
                    content.push_str(lang);
                    content.push_str("]\n");
                }
                content.push_str("----\n");
                content.push_str(code);
                if !code.is_empty() && !code.ends_with('\n') {
                    content.push('\n');
                }
                content.push_str("----");
                self.push_block(&content);
            }

            Block::Blockquote { children, .. } => {
                let inner = self.nested(children, ctx);
                self.push_block(&format!("____\n{}____", inner));
            }

            Block::Table { rows, .. } => {
                let mut content = String::from("|===\n");
                for row in rows {
                    let mut line = String::new();
                    for (i, cell) in row.cells.iter().enumerate() {
                        if i > 0 {
                            line.push(' ');
                        }
                        line.push_str(&cell_prefix(cell));
                        line.push('|');
                        line.push_str(&inline_text(&cell.children));
                    }
                    content.push_str(&line);
                    content.push('\n');
                }
                content.push_str("|===");
                self.push_block(&content);
            }

            Block::Image { src, alt, .. } => {
                self.push_block(&format!("image::{}[{}]", src, alt));
            }

            Block::HorizontalRule { .. } => {
                self.push_block("'''");
            }

            Block::Admonition {
                flavor, children, ..
            } => {
                let inner = self.nested(children, ctx);
                self.push_block(&format!("[{}]\n====\n{}====", flavor.label(), inner));
            }

            Block::Include { path, .. } => {
                self.push_block(&format!("include::{}[]", path));
            }

            Block::MathBlock { source, .. } => {
                let mut content = String::from("[stem]\n++++\n");
                content.push_str(source);
                if !source.is_empty() && !source.ends_with('\n') {
                    content.push('\n');
                }
                content.push_str("++++");
                self.push_block(&content);
            }

            Block::Collapsible {
                title, children, ..
            } => {
                let inner = self.nested(children, ctx);
                let mut content = String::from("[%collapsible]\n");
                if !title.is_empty() {
                    content.push('.');
                    content.push_str(title);
                    content.push('\n');
                }
                content.push_str("====\n");
                content.push_str(&inner);
                content.push_str("====");
                self.push_block(&content);
            }

            Block::Raw {
                id,
                tag,
                attributes,
                body,
            } => {
                self.push_block(&passthrough::emit(tag, id, attributes, body));
            }

            // Default arm: recurse into children; failing that, emit the
            // contained text verbatim. Never fatal.
            Block::Unknown { children, .. } => {
                if !children.is_empty() {
                    for child in children {
                        self.serialize_block(child, ctx);
                    }
                } else {
                    let text = collect_text(block);
                    if !text.is_empty() {
                        self.push_block(&text);
                    }
                }
            }
        }
    }

    fn serialize_list(&mut self, items: &[ListItem], ctx: Ctx) {
        let style = ctx.list_style.unwrap_or(ListStyle::Bullet);
        let marker: String = std::iter::repeat(style.marker())
            .take(ctx.list_depth)
            .collect();

        for item in items {
            self.out.push_str(&marker);
            self.out.push(' ');
            self.out.push_str(&inline_text(&item.content));
            self.out.push('\n');

            for child in &item.children {
                match child {
                    Block::List { style, items, .. } => {
                        self.serialize_list(items, ctx.enter_list(*style));
                    }
                    other => {
                        // Attached non-list content continues the item.
                        let text = collect_text(other);
                        if !text.is_empty() {
                            self.out.push_str("+\n");
                            self.out.push_str(&text);
                            self.out.push('\n');
                        }
                    }
                }
            }
        }
    }

    /// Serialize children into a nested buffer, stripping a single
    /// trailing blank line before the container's closing delimiter.
    fn nested(&self, children: &[Block], ctx: Ctx) -> String {
        let mut inner = Serializer::new();
        for child in children {
            inner.serialize_block(child, ctx);
        }
        let mut content = inner.out;
        if content.ends_with("\n\n") {
            content.pop();
        }
        content
    }

    fn push_block(&mut self, content: &str) {
        self.out.push_str(content);
        if !content.ends_with('\n') {
            self.out.push('\n');
        }
        self.out.push('\n');
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

fn inline_text(children: &[Inline]) -> String {
    let mut out = String::new();
    for inline in children {
        match inline {
            Inline::Text { text, marks } => out.push_str(&marks::resolve(text, marks)),
            Inline::HardBreak => out.push_str(" +\n"),
        }
    }
    out
}

fn cell_prefix(cell: &TableCell) -> String {
    match (cell.colspan > 1, cell.rowspan > 1) {
        (true, true) => format!("{}.{}+", cell.colspan, cell.rowspan),
        (true, false) => format!("{}+", cell.colspan),
        (false, true) => format!(".{}+", cell.rowspan),
        (false, false) => String::new(),
    }
}

/// Convenience function to serialize a document.
pub fn serialize(doc: &Document) -> String {
    Serializer::new().serialize(doc)
}
