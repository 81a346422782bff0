//! Content-line mapping.
//!
//! The compiler does not preserve source line numbers on its output, so
//! positional correspondence is recovered heuristically: each source line
//! gets a content fingerprint appropriate to its syntactic role, and each
//! rendered block-level element recomputes the same fingerprint from its
//! text content. First occurrence wins on collision — stable and
//! deterministic, but intentionally lossy for documents with duplicated
//! text. A missed or ambiguous match degrades to "no position metadata",
//! never to a guess.

use crate::html::HtmlNode;
use crate::inline::plain_text;
use crate::render::parse_row;
use crate::scan::{classify, LineKind};
use inkstone_model::AdmonitionKind;
use std::collections::HashMap;

/// Characters of cell text used for `cell:` fingerprints.
const CELL_TRUNCATE: usize = 24;
/// Characters of paragraph text used for generic fingerprints.
const PARAGRAPH_PREFIX: usize = 50;

/// fingerprint → first source line (1-based). Rebuilt on every compile,
/// never persisted.
#[derive(Debug, Default)]
pub struct FingerprintMap {
    map: HashMap<String, u32>,
}

impl FingerprintMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &str) -> Option<u32> {
        self.map.get(fingerprint).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn insert_first(&mut self, fingerprint: String, line: u32) {
        self.map.entry(fingerprint).or_insert(line);
    }
}

/// Build the fingerprint index from markup text.
pub fn build_map(content: &str) -> FingerprintMap {
    let lines: Vec<&str> = content.lines().collect();
    let mut map = FingerprintMap::new();

    let mut in_code = false;
    let mut in_passthrough = false;
    let mut in_table = false;
    let mut paragraph: Option<(u32, String)> = None;

    for (idx, raw_line) in lines.iter().enumerate() {
        let line_no = idx as u32 + 1;
        let kind = classify(raw_line);

        // Fence interiors carry no mappable content.
        if in_code {
            if matches!(kind, LineKind::CodeFence) {
                in_code = false;
            }
            continue;
        }
        if in_passthrough {
            if matches!(kind, LineKind::PassthroughFence) {
                in_passthrough = false;
            }
            continue;
        }

        // Anything that is not running paragraph text flushes the run.
        if !matches!(kind, LineKind::Text { .. }) {
            flush_paragraph(&mut map, &mut paragraph);
        }

        match kind {
            LineKind::CodeFence => in_code = true,
            LineKind::PassthroughFence => in_passthrough = true,
            LineKind::TableFence => in_table = !in_table,

            LineKind::Heading { text, .. } => {
                map.insert_first(plain_text(text), line_no);
            }

            LineKind::BulletItem { text, .. } | LineKind::OrderedItem { text, .. } => {
                map.insert_first(format!("li:{}", plain_text(text)), line_no);
            }

            LineKind::Image { target, .. } => {
                map.insert_first(format!("image:{}", target), line_no);
            }

            LineKind::AttrLine { inner } => {
                if let Some(flavor) = AdmonitionKind::parse(inner) {
                    if let Some(fp) = admonition_fingerprint_at(&lines, idx, flavor) {
                        map.insert_first(fp, line_no);
                    }
                }
            }

            LineKind::Text { text } if in_table => {
                for (_, _, content) in parse_row(text) {
                    let cell = truncate(&plain_text(&content), CELL_TRUNCATE);
                    map.insert_first(format!("cell:{}", cell), line_no);
                }
            }

            LineKind::Text { text } => {
                let stripped = text.strip_suffix(" +").unwrap_or(text);
                let piece = plain_text(stripped);
                match paragraph.as_mut() {
                    Some((_, acc)) => {
                        acc.push(' ');
                        acc.push_str(&piece);
                    }
                    None => paragraph = Some((line_no, piece)),
                }
            }

            _ => {}
        }
    }
    flush_paragraph(&mut map, &mut paragraph);

    map
}

fn flush_paragraph(map: &mut FingerprintMap, paragraph: &mut Option<(u32, String)>) {
    if let Some((line, text)) = paragraph.take() {
        map.insert_first(truncate(&text, PARAGRAPH_PREFIX), line);
    }
}

/// Fingerprint of an admonition block: flavor plus the leading body
/// content found past the opening `====` fence.
fn admonition_fingerprint_at(
    lines: &[&str],
    attr_idx: usize,
    flavor: AdmonitionKind,
) -> Option<String> {
    if !matches!(lines.get(attr_idx + 1).map(|l| classify(l)), Some(LineKind::ExampleFence)) {
        return None;
    }
    for line in &lines[attr_idx + 2..] {
        match classify(line) {
            LineKind::ExampleFence => return None,
            LineKind::Blank => continue,
            LineKind::Text { text } => {
                return Some(admonition_fingerprint(flavor.label(), &plain_text(text)));
            }
            _ => return None,
        }
    }
    None
}

fn admonition_fingerprint(label: &str, leading: &str) -> String {
    format!("admonition:{}:{}", label, truncate(leading, PARAGRAPH_PREFIX))
}

/// Attach positional metadata to rendered block-level elements.
///
/// Elements whose fingerprint hits the map get a `data-line` attribute;
/// pure containers get a synthetic sequential `data-block-index` scoped
/// to this single render pass; everything else is left untouched.
pub fn annotate(nodes: &mut [HtmlNode], map: &FingerprintMap) {
    let mut fallback_index = 0u32;
    for node in nodes.iter_mut() {
        annotate_node(node, map, &mut fallback_index);
    }
}

fn annotate_node(node: &mut HtmlNode, map: &FingerprintMap, fallback_index: &mut u32) {
    if let Some(tag) = node.tag().map(str::to_string) {
        if let Some(fingerprint) = fingerprint_for_element(node, &tag) {
            if let Some(line) = map.get(&fingerprint) {
                node.set_attr("data-line", line.to_string());
            }
        } else if is_container(&tag) {
            *fallback_index += 1;
            node.set_attr("data-block-index", fallback_index.to_string());
        }

        if let HtmlNode::Element { children, .. } = node {
            for child in children {
                annotate_node(child, map, fallback_index);
            }
        }
    }
}

fn is_container(tag: &str) -> bool {
    matches!(tag, "table" | "ul" | "ol" | "pre" | "blockquote" | "details")
}

fn fingerprint_for_element(node: &HtmlNode, tag: &str) -> Option<String> {
    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some(node.text_content()),
        "p" => Some(truncate(&node.text_content(), PARAGRAPH_PREFIX)),
        "li" => Some(format!("li:{}", direct_text(node))),
        "img" => Some(format!("image:{}", node.attr("src").unwrap_or(""))),
        "td" | "th" => Some(format!(
            "cell:{}",
            truncate(&node.text_content(), CELL_TRUNCATE)
        )),
        "div" => {
            let class = node.attr("class")?;
            let flavor = class.strip_prefix("admonitionblock ")?;
            let leading = leading_content(node)?;
            Some(admonition_fingerprint(
                &flavor.to_ascii_uppercase(),
                &leading,
            ))
        }
        _ => None,
    }
}

/// Text of an element excluding nested list children, so a parent item's
/// fingerprint doesn't swallow its sublist.
fn direct_text(node: &HtmlNode) -> String {
    match node {
        HtmlNode::Element { children, .. } => children
            .iter()
            .filter(|c| !matches!(c.tag(), Some("ul") | Some("ol")))
            .map(HtmlNode::text_content)
            .collect(),
        _ => node.text_content(),
    }
}

/// First rendered body content of an admonition, skipping its title.
fn leading_content(node: &HtmlNode) -> Option<String> {
    if let HtmlNode::Element { children, .. } = node {
        for child in children {
            if child.attr("class") == Some("title") {
                continue;
            }
            let text = child.text_content();
            if !text.is_empty() {
                return Some(truncate(&text, PARAGRAPH_PREFIX));
            }
        }
    }
    None
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
