use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rendered-output node.
///
/// The compiler produces a tree of these rather than a flat string so the
/// content-line mapper can attach positional metadata before the final
/// HTML is written out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HtmlNode {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        children: Vec<HtmlNode>,
    },

    Text {
        content: String,
    },

    /// Passthrough content emitted verbatim, without escaping.
    Raw {
        html: String,
    },
}

impl HtmlNode {
    pub fn element(tag: impl Into<String>) -> Self {
        HtmlNode::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        HtmlNode::Text {
            content: content.into(),
        }
    }

    pub fn raw(html: impl Into<String>) -> Self {
        HtmlNode::Raw { html: html.into() }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let HtmlNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: HtmlNode) -> Self {
        if let HtmlNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<HtmlNode>) -> Self {
        if let HtmlNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        if let HtmlNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            HtmlNode::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            HtmlNode::Element { attributes, .. } => attributes.get(key).map(String::as_str),
            _ => None,
        }
    }

    /// Concatenated text content of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            HtmlNode::Text { content } => content.clone(),
            HtmlNode::Raw { .. } => String::new(),
            HtmlNode::Element { children, .. } => {
                let mut out = String::new();
                for child in children {
                    out.push_str(&child.text_content());
                }
                out
            }
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            HtmlNode::Text { content } => out.push_str(&escape(content)),
            HtmlNode::Raw { html } => out.push_str(html),
            HtmlNode::Element {
                tag,
                attributes,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in attributes {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape(value));
                    out.push('"');
                }
                if is_void(tag) {
                    out.push_str(">");
                    return;
                }
                out.push('>');
                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

/// Render a node list to an HTML string, one block per line.
pub fn nodes_to_html(nodes: &[HtmlNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        out.push_str(&node.to_html());
        out.push('\n');
    }
    out
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "img" | "br" | "hr")
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
