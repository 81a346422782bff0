//! Line-oriented markup → rendered-output compiler.
//!
//! The compiler discards original line numbers; the content-line mapper
//! re-associates rendered blocks with source lines afterwards (see
//! [`crate::linemap`]).

use crate::html::{nodes_to_html, HtmlNode};
use crate::inline::parse_inline;
use crate::linemap;
use crate::outline::Slugger;
use crate::scan::{classify, LineKind};
use inkstone_model::AdmonitionKind;
use inkstone_serializer::passthrough;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Attach `data-line` / `data-block-index` positional metadata.
    pub annotate: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { annotate: true }
    }
}

/// Render markup to an HTML string.
pub fn render_html(content: &str, options: &RenderOptions) -> String {
    let mut nodes = render_nodes(content);
    if options.annotate {
        let map = linemap::build_map(content);
        linemap::annotate(&mut nodes, &map);
    }
    nodes_to_html(&nodes)
}

/// Render markup to the block-level node tree.
pub fn render_nodes(content: &str) -> Vec<HtmlNode> {
    let lines: Vec<&str> = content.lines().collect();
    let mut renderer = Renderer {
        lines,
        pos: 0,
        slugger: Slugger::new(),
    };
    renderer.run()
}

struct Renderer<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    slugger: Slugger,
}

impl<'a> Renderer<'a> {
    fn run(&mut self) -> Vec<HtmlNode> {
        let mut nodes = Vec::new();
        while self.pos < self.lines.len() {
            if let Some(node) = self.next_block() {
                nodes.push(node);
            }
        }
        nodes
    }

    fn next_block(&mut self) -> Option<HtmlNode> {
        let line = self.lines[self.pos];
        match classify(line) {
            LineKind::Blank | LineKind::Continuation => {
                self.pos += 1;
                None
            }

            LineKind::Heading { level, text } => {
                self.pos += 1;
                let slug = self.slugger.slug(text);
                Some(
                    HtmlNode::element(format!("h{}", level))
                        .with_attr("id", slug)
                        .with_children(parse_inline(text)),
                )
            }

            LineKind::Rule => {
                self.pos += 1;
                Some(HtmlNode::element("hr"))
            }

            LineKind::Image { target, alt } => {
                self.pos += 1;
                Some(
                    HtmlNode::element("img")
                        .with_attr("src", target)
                        .with_attr("alt", alt),
                )
            }

            LineKind::Include { target } => {
                self.pos += 1;
                Some(
                    HtmlNode::element("div")
                        .with_attr("class", "include")
                        .with_attr("data-path", target)
                        .with_child(HtmlNode::text(format!("include: {}", target))),
                )
            }

            LineKind::CodeFence => Some(self.code_block(None)),

            LineKind::QuoteFence => {
                let inner = self.collect_fenced(|k| matches!(k, LineKind::QuoteFence));
                Some(
                    HtmlNode::element("blockquote").with_children(render_fragment(&inner)),
                )
            }

            LineKind::ExampleFence => {
                let inner = self.collect_fenced(|k| matches!(k, LineKind::ExampleFence));
                Some(
                    HtmlNode::element("div")
                        .with_attr("class", "exampleblock")
                        .with_children(render_fragment(&inner)),
                )
            }

            LineKind::PassthroughFence => {
                let inner = self.collect_fenced(|k| matches!(k, LineKind::PassthroughFence));
                Some(
                    HtmlNode::element("div")
                        .with_attr("class", "passthrough")
                        .with_child(HtmlNode::raw(inner.join("\n"))),
                )
            }

            LineKind::TableFence => Some(self.table()),

            LineKind::BulletItem { .. } | LineKind::OrderedItem { .. } => Some(self.list()),

            LineKind::AttrLine { inner } => self.attributed_block(inner),

            LineKind::BlockTitle { text } => {
                self.pos += 1;
                Some(
                    HtmlNode::element("div")
                        .with_attr("class", "title")
                        .with_children(parse_inline(text)),
                )
            }

            LineKind::Text { .. } => Some(self.paragraph()),
        }
    }

    /// Handle a `[...]` attribute line and the block that follows it.
    fn attributed_block(&mut self, inner: &str) -> Option<HtmlNode> {
        // [source,lang] + ---- code fence
        if inner == "source" || inner.starts_with("source,") {
            let language = inner.split(',').nth(1).map(str::trim).filter(|l| !l.is_empty());
            let language = language.map(str::to_string);
            if self.peek_next_is(|k| matches!(k, LineKind::CodeFence)) {
                self.pos += 1;
                return Some(self.code_block(language.as_deref()));
            }
            self.pos += 1;
            return None;
        }

        // [stem] + ++++ math fence
        if inner == "stem" {
            if self.peek_next_is(|k| matches!(k, LineKind::PassthroughFence)) {
                self.pos += 2;
                let body = self.take_raw_until(|k| matches!(k, LineKind::PassthroughFence));
                return Some(
                    HtmlNode::element("div")
                        .with_attr("class", "math")
                        .with_child(HtmlNode::text(body.join("\n"))),
                );
            }
            self.pos += 1;
            return None;
        }

        // [raw,kind=...] + ++++ passthrough
        if inner == "raw" || inner.starts_with("raw,") {
            if let Some((raw, consumed)) = passthrough::parse(&self.lines[self.pos..]) {
                self.pos += consumed;
                let mut node = HtmlNode::element("div")
                    .with_attr("class", "raw-block")
                    .with_attr("data-kind", &raw.tag);
                if !raw.id.is_empty() {
                    node.set_attr("data-block-id", &raw.id);
                }
                for (key, value) in &raw.attributes {
                    node.set_attr(format!("data-{}", key), value);
                }
                if !raw.body.is_empty() {
                    node = node.with_child(HtmlNode::raw(raw.body));
                }
                return Some(node);
            }
            self.pos += 1;
            return None;
        }

        // [NOTE] etc. + ==== body
        if let Some(flavor) = AdmonitionKind::parse(inner) {
            if self.peek_next_is(|k| matches!(k, LineKind::ExampleFence)) {
                self.pos += 2;
                let body = self.take_raw_until(|k| matches!(k, LineKind::ExampleFence));
                let class = format!("admonitionblock {}", flavor.label().to_ascii_lowercase());
                return Some(
                    HtmlNode::element("div")
                        .with_attr("class", class)
                        .with_child(
                            HtmlNode::element("div")
                                .with_attr("class", "title")
                                .with_child(HtmlNode::text(flavor.label())),
                        )
                        .with_children(render_fragment(&body)),
                );
            }
            self.pos += 1;
            return None;
        }

        // [%collapsible] + optional .Title + ==== body
        if inner == "%collapsible" {
            self.pos += 1;
            let title = match self.current() {
                Some(LineKind::BlockTitle { text }) => {
                    let title = text.to_string();
                    self.pos += 1;
                    title
                }
                _ => "Details".to_string(),
            };
            if matches!(self.current(), Some(LineKind::ExampleFence)) {
                self.pos += 1;
                let body = self.take_raw_until(|k| matches!(k, LineKind::ExampleFence));
                return Some(
                    HtmlNode::element("details")
                        .with_child(
                            HtmlNode::element("summary").with_child(HtmlNode::text(title)),
                        )
                        .with_children(render_fragment(&body)),
                );
            }
            return None;
        }

        // Unrecognized attribute line: skip it. The lint layer reports
        // anything suspicious.
        self.pos += 1;
        None
    }

    fn code_block(&mut self, language: Option<&str>) -> HtmlNode {
        // self.pos is at the opening fence
        self.pos += 1;
        let body = self.take_raw_until(|k| matches!(k, LineKind::CodeFence));
        let mut code = HtmlNode::element("code");
        if let Some(lang) = language {
            code.set_attr("class", format!("language-{}", lang));
        }
        let code = code.with_child(HtmlNode::text(body.join("\n")));
        HtmlNode::element("pre").with_child(code)
    }

    fn table(&mut self) -> HtmlNode {
        self.pos += 1;
        let mut rows = Vec::new();
        let mut first = true;
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            self.pos += 1;
            match classify(line) {
                LineKind::TableFence => break,
                LineKind::Blank => continue,
                _ => {
                    let cell_tag = if first { "th" } else { "td" };
                    first = false;
                    let mut row = HtmlNode::element("tr");
                    for (colspan, rowspan, content) in parse_row(line) {
                        let mut cell =
                            HtmlNode::element(cell_tag).with_children(parse_inline(&content));
                        if colspan > 1 {
                            cell.set_attr("colspan", colspan.to_string());
                        }
                        if rowspan > 1 {
                            cell.set_attr("rowspan", rowspan.to_string());
                        }
                        row = row.with_child(cell);
                    }
                    rows.push(row);
                }
            }
        }
        HtmlNode::element("table").with_children(rows)
    }

    fn list(&mut self) -> HtmlNode {
        let mut items: Vec<(usize, bool, String)> = Vec::new();
        while self.pos < self.lines.len() {
            match classify(self.lines[self.pos]) {
                LineKind::BulletItem { depth, text } => {
                    items.push((depth, false, text.to_string()));
                    self.pos += 1;
                }
                LineKind::OrderedItem { depth, text } => {
                    items.push((depth, true, text.to_string()));
                    self.pos += 1;
                }
                LineKind::Continuation => {
                    self.pos += 1;
                    if let Some(LineKind::Text { text }) = self.current() {
                        if let Some(last) = items.last_mut() {
                            last.2.push(' ');
                            last.2.push_str(text);
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
        let (node, _) = build_nested_list(&items, 0, items.first().map(|i| i.0).unwrap_or(1));
        node
    }

    fn paragraph(&mut self) -> HtmlNode {
        let mut children: Vec<HtmlNode> = Vec::new();
        let mut first = true;
        while self.pos < self.lines.len() {
            match classify(self.lines[self.pos]) {
                LineKind::Text { text } => {
                    if !first {
                        children.push(HtmlNode::text(" "));
                    }
                    first = false;
                    if let Some(stripped) = text.strip_suffix(" +") {
                        children.extend(parse_inline(stripped));
                        children.push(HtmlNode::element("br"));
                    } else {
                        children.extend(parse_inline(text));
                    }
                    self.pos += 1;
                }
                _ => break,
            }
        }
        HtmlNode::element("p").with_children(children)
    }

    fn current(&self) -> Option<LineKind<'a>> {
        self.lines.get(self.pos).copied().map(classify)
    }

    fn peek_next_is(&self, pred: impl Fn(&LineKind) -> bool) -> bool {
        self.lines
            .get(self.pos + 1)
            .map(|l| pred(&classify(l)))
            .unwrap_or(false)
    }

    /// Consume the opening fence at `pos`, then raw lines until the
    /// closing fence (consumed) or EOF.
    fn collect_fenced(&mut self, end: impl Fn(&LineKind) -> bool) -> Vec<&'a str> {
        self.pos += 1;
        self.take_raw_until(end)
    }

    fn take_raw_until(&mut self, end: impl Fn(&LineKind) -> bool) -> Vec<&'a str> {
        let mut body = Vec::new();
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            self.pos += 1;
            if end(&classify(line)) {
                break;
            }
            body.push(line);
        }
        body
    }

}

/// Render an inner fenced region as its own fragment.
fn render_fragment(lines: &[&str]) -> Vec<HtmlNode> {
    render_nodes(&lines.join("\n"))
}

fn build_nested_list(
    items: &[(usize, bool, String)],
    start: usize,
    depth: usize,
) -> (HtmlNode, usize) {
    let ordered = items.get(start).map(|i| i.1).unwrap_or(false);
    let mut lis: Vec<HtmlNode> = Vec::new();
    let mut i = start;

    while i < items.len() {
        let (d, _, ref text) = items[i];
        if d < depth {
            break;
        }
        if d > depth {
            let (child, next) = build_nested_list(items, i, d);
            match lis.last_mut() {
                Some(HtmlNode::Element { children, .. }) => children.push(child),
                _ => lis.push(child),
            }
            i = next;
        } else {
            lis.push(HtmlNode::element("li").with_children(parse_inline(text)));
            i += 1;
        }
    }

    let tag = if ordered { "ol" } else { "ul" };
    (HtmlNode::element(tag).with_children(lis), i)
}

fn span_spec_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)?(\.\d+)?\+$").unwrap())
}

/// Split a table row into `(colspan, rowspan, content)` cells, honoring
/// the position-prefix span tokens (`2+|`, `.3+|`, `2.3+|`).
pub(crate) fn parse_row(line: &str) -> Vec<(u32, u32, String)> {
    let parts: Vec<&str> = line.trim().split('|').collect();
    if parts.len() < 2 {
        return Vec::new();
    }

    let mut cells = Vec::new();
    let mut spec = parts[0].trim().to_string();
    for (i, part) in parts.iter().enumerate().skip(1) {
        let mut content = *part;
        let mut next_spec = String::new();
        if i + 1 < parts.len() {
            // A trailing span token belongs to the next cell.
            if let Some(idx) = content.rfind(' ') {
                let tail = &content[idx + 1..];
                if is_span_spec(tail) {
                    next_spec = tail.to_string();
                    content = &content[..idx];
                }
            } else if is_span_spec(content.trim()) && !content.trim().is_empty() {
                next_spec = content.trim().to_string();
                content = "";
            }
        }
        let (colspan, rowspan) = parse_span_spec(&spec);
        cells.push((colspan, rowspan, content.trim().to_string()));
        spec = next_spec;
    }
    cells
}

fn is_span_spec(token: &str) -> bool {
    !token.is_empty() && token != "+" && span_spec_re().is_match(token)
}

fn parse_span_spec(spec: &str) -> (u32, u32) {
    let Some(stripped) = spec.strip_suffix('+') else {
        return (1, 1);
    };
    let (col_part, row_part) = match stripped.split_once('.') {
        Some((c, r)) => (c, r),
        None => (stripped, ""),
    };
    let colspan = col_part.parse::<u32>().unwrap_or(1).max(1);
    let rowspan = row_part.parse::<u32>().unwrap_or(1).max(1);
    (colspan, rowspan)
}
