//! Best-effort re-import of markup into block summaries.
//!
//! This is not a full inverse of serialization — only the line positions
//! and kinds of top-level blocks are recovered, plus the complete
//! attribute set for raw passthrough blocks (which must round-trip
//! losslessly).

use crate::scan::{classify, LineKind};
use inkstone_model::AdmonitionKind;
use inkstone_serializer::passthrough;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedBlock {
    pub kind: String,
    /// 1-based line where the block starts.
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ParsedBlock {
    fn new(kind: &str, line: u32) -> Self {
        Self {
            kind: kind.to_string(),
            line,
            tag: None,
            id: None,
            attributes: None,
            body: None,
        }
    }
}

pub fn parse_blocks(content: &str) -> Vec<ParsedBlock> {
    let lines: Vec<&str> = content.lines().collect();
    let mut blocks = Vec::new();
    let mut pos = 0;

    while pos < lines.len() {
        let line_no = pos as u32 + 1;
        match classify(lines[pos]) {
            LineKind::Blank | LineKind::Continuation | LineKind::BlockTitle { .. } => pos += 1,

            LineKind::Heading { .. } => {
                blocks.push(ParsedBlock::new("heading", line_no));
                pos += 1;
            }

            LineKind::Rule => {
                blocks.push(ParsedBlock::new("horizontal-rule", line_no));
                pos += 1;
            }

            LineKind::Image { .. } => {
                blocks.push(ParsedBlock::new("image", line_no));
                pos += 1;
            }

            LineKind::Include { .. } => {
                blocks.push(ParsedBlock::new("include", line_no));
                pos += 1;
            }

            LineKind::CodeFence => {
                blocks.push(ParsedBlock::new("code-block", line_no));
                pos = skip_fenced(&lines, pos, |k| matches!(k, LineKind::CodeFence));
            }

            LineKind::PassthroughFence => {
                blocks.push(ParsedBlock::new("passthrough", line_no));
                pos = skip_fenced(&lines, pos, |k| matches!(k, LineKind::PassthroughFence));
            }

            LineKind::QuoteFence => {
                blocks.push(ParsedBlock::new("blockquote", line_no));
                pos = skip_fenced(&lines, pos, |k| matches!(k, LineKind::QuoteFence));
            }

            LineKind::ExampleFence => {
                blocks.push(ParsedBlock::new("example", line_no));
                pos = skip_fenced(&lines, pos, |k| matches!(k, LineKind::ExampleFence));
            }

            LineKind::TableFence => {
                blocks.push(ParsedBlock::new("table", line_no));
                pos = skip_fenced(&lines, pos, |k| matches!(k, LineKind::TableFence));
            }

            LineKind::BulletItem { .. } | LineKind::OrderedItem { .. } => {
                blocks.push(ParsedBlock::new("list", line_no));
                while pos < lines.len()
                    && matches!(
                        classify(lines[pos]),
                        LineKind::BulletItem { .. }
                            | LineKind::OrderedItem { .. }
                            | LineKind::Continuation
                    )
                {
                    pos += 1;
                }
            }

            LineKind::AttrLine { inner } => {
                if inner == "raw" || inner.starts_with("raw,") {
                    if let Some((raw, consumed)) = passthrough::parse(&lines[pos..]) {
                        let mut block = ParsedBlock::new("raw", line_no);
                        block.tag = Some(raw.tag);
                        if !raw.id.is_empty() {
                            block.id = Some(raw.id);
                        }
                        block.attributes = Some(raw.attributes);
                        if !raw.body.is_empty() {
                            block.body = Some(raw.body);
                        }
                        blocks.push(block);
                        pos += consumed;
                        continue;
                    }
                    pos += 1;
                    continue;
                }
                if inner == "stem" {
                    blocks.push(ParsedBlock::new("math-block", line_no));
                    pos += 1;
                    continue;
                }
                if AdmonitionKind::parse(inner).is_some() {
                    blocks.push(ParsedBlock::new("admonition", line_no));
                    pos += 1;
                    continue;
                }
                if inner == "%collapsible" {
                    blocks.push(ParsedBlock::new("collapsible", line_no));
                    pos += 1;
                    continue;
                }
                // [source,...] and other attribute lines annotate the
                // block that follows; no block of their own.
                pos += 1;
            }

            LineKind::Text { .. } => {
                blocks.push(ParsedBlock::new("paragraph", line_no));
                while pos < lines.len() && matches!(classify(lines[pos]), LineKind::Text { .. }) {
                    pos += 1;
                }
            }
        }
    }

    blocks
}

fn skip_fenced(lines: &[&str], open_pos: usize, end: impl Fn(&LineKind) -> bool) -> usize {
    let mut pos = open_pos + 1;
    while pos < lines.len() {
        let kind = classify(lines[pos]);
        pos += 1;
        if end(&kind) {
            break;
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_kinds_and_lines() {
        let content = "== Title\n\nBody text\n\n* item\n\n----\ncode\n----";
        let blocks = parse_blocks(content);

        let summary: Vec<(&str, u32)> = blocks
            .iter()
            .map(|b| (b.kind.as_str(), b.line))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("heading", 1),
                ("paragraph", 3),
                ("list", 5),
                ("code-block", 7)
            ]
        );
    }

    #[test]
    fn test_raw_block_attributes_recovered() {
        let content = "[raw,kind=bookmark,id=doc-3,a=1,b=2]\n++++\n++++";
        let blocks = parse_blocks(content);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, "raw");
        assert_eq!(blocks[0].tag.as_deref(), Some("bookmark"));
        assert_eq!(blocks[0].id.as_deref(), Some("doc-3"));
        let attributes = blocks[0].attributes.as_ref().unwrap();
        assert_eq!(attributes.get("a").map(String::as_str), Some("1"));
        assert_eq!(attributes.get("b").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_code_block_interior_is_not_blocks() {
        let content = "----\n== not a heading\n* not a list\n----";
        let blocks = parse_blocks(content);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, "code-block");
    }
}
