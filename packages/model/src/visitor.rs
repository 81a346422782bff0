use crate::document::{Block, Document, Inline};

/// Visitor pattern for traversing the document tree immutably.
///
/// Default implementations walk the entire tree; override specific
/// visit_* methods to act on nodes.
pub trait Visitor: Sized {
    fn visit_document(&mut self, doc: &Document) {
        walk_document(self, doc);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_inline(&mut self, _inline: &Inline) {
        // Leaf node, no children to walk
    }
}

/// Mutable counterpart of [`Visitor`], for in-place transformations.
pub trait VisitorMut: Sized {
    fn visit_document_mut(&mut self, doc: &mut Document) {
        walk_document_mut(self, doc);
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        walk_block_mut(self, block);
    }

    fn visit_inline_mut(&mut self, _inline: &mut Inline) {
        // Leaf node, no children to walk
    }
}

pub fn walk_document<V: Visitor>(visitor: &mut V, doc: &Document) {
    for block in &doc.blocks {
        visitor.visit_block(block);
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) {
    match block {
        Block::Paragraph { children, .. } | Block::Heading { children, .. } => {
            for inline in children {
                visitor.visit_inline(inline);
            }
        }
        Block::List { items, .. } => {
            for item in items {
                for inline in &item.content {
                    visitor.visit_inline(inline);
                }
                for child in &item.children {
                    visitor.visit_block(child);
                }
            }
        }
        Block::Table { rows, .. } => {
            for row in rows {
                for cell in &row.cells {
                    for inline in &cell.children {
                        visitor.visit_inline(inline);
                    }
                }
            }
        }
        Block::Blockquote { children, .. }
        | Block::Admonition { children, .. }
        | Block::Collapsible { children, .. }
        | Block::Unknown { children, .. } => {
            for child in children {
                visitor.visit_block(child);
            }
        }
        Block::CodeBlock { .. }
        | Block::Image { .. }
        | Block::HorizontalRule { .. }
        | Block::Include { .. }
        | Block::MathBlock { .. }
        | Block::Raw { .. } => {
            // Leaf blocks
        }
    }
}

pub fn walk_document_mut<V: VisitorMut>(visitor: &mut V, doc: &mut Document) {
    for block in &mut doc.blocks {
        visitor.visit_block_mut(block);
    }
}

pub fn walk_block_mut<V: VisitorMut>(visitor: &mut V, block: &mut Block) {
    match block {
        Block::Paragraph { children, .. } | Block::Heading { children, .. } => {
            for inline in children {
                visitor.visit_inline_mut(inline);
            }
        }
        Block::List { items, .. } => {
            for item in items {
                for inline in &mut item.content {
                    visitor.visit_inline_mut(inline);
                }
                for child in &mut item.children {
                    visitor.visit_block_mut(child);
                }
            }
        }
        Block::Table { rows, .. } => {
            for row in rows {
                for cell in &mut row.cells {
                    for inline in &mut cell.children {
                        visitor.visit_inline_mut(inline);
                    }
                }
            }
        }
        Block::Blockquote { children, .. }
        | Block::Admonition { children, .. }
        | Block::Collapsible { children, .. }
        | Block::Unknown { children, .. } => {
            for child in children {
                visitor.visit_block_mut(child);
            }
        }
        Block::CodeBlock { .. }
        | Block::Image { .. }
        | Block::HorizontalRule { .. }
        | Block::Include { .. }
        | Block::MathBlock { .. }
        | Block::Raw { .. } => {
            // Leaf blocks
        }
    }
}

/// Collect the plain text contained in a block and its descendants.
pub fn collect_text(block: &Block) -> String {
    struct TextCollector {
        out: String,
    }

    impl Visitor for TextCollector {
        fn visit_block(&mut self, block: &Block) {
            match block {
                Block::CodeBlock { code, .. } => self.push(code),
                Block::MathBlock { source, .. } => self.push(source),
                Block::Raw { body, .. } => self.push(body),
                Block::Unknown { text, .. } => {
                    self.push(text);
                    walk_block(self, block);
                }
                _ => walk_block(self, block),
            }
        }

        fn visit_inline(&mut self, inline: &Inline) {
            if let Inline::Text { text, .. } = inline {
                self.push(text);
            }
        }
    }

    impl TextCollector {
        fn push(&mut self, text: &str) {
            if text.is_empty() {
                return;
            }
            if !self.out.is_empty() {
                self.out.push(' ');
            }
            self.out.push_str(text);
        }
    }

    let mut collector = TextCollector { out: String::new() };
    collector.visit_block(block);
    collector.out
}
