use crate::mark::Mark;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root of the structured document tree.
///
/// The tree is created and mutated exclusively by the editing surface;
/// everything in this engine treats it as read-only input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Block-level node.
///
/// Every variant carries a stable block identifier (`id`), generated once
/// and preserved across edits. The `Unknown` variant is the tolerant
/// fallback for node kinds this engine does not recognize — it keeps the
/// contained text and children so serialization never drops content
/// wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Block {
    Paragraph {
        #[serde(default)]
        id: String,
        #[serde(default)]
        children: Vec<Inline>,
    },

    Heading {
        #[serde(default)]
        id: String,
        level: u8,
        #[serde(default)]
        children: Vec<Inline>,
    },

    List {
        #[serde(default)]
        id: String,
        style: ListStyle,
        #[serde(default)]
        items: Vec<ListItem>,
    },

    CodeBlock {
        #[serde(default)]
        id: String,
        #[serde(default)]
        language: Option<String>,
        #[serde(default)]
        code: String,
    },

    Blockquote {
        #[serde(default)]
        id: String,
        #[serde(default)]
        children: Vec<Block>,
    },

    Table {
        #[serde(default)]
        id: String,
        #[serde(default)]
        rows: Vec<TableRow>,
    },

    Image {
        #[serde(default)]
        id: String,
        src: String,
        #[serde(default)]
        alt: String,
    },

    HorizontalRule {
        #[serde(default)]
        id: String,
    },

    Admonition {
        #[serde(default)]
        id: String,
        #[serde(default)]
        flavor: AdmonitionKind,
        #[serde(default)]
        children: Vec<Block>,
    },

    Include {
        #[serde(default)]
        id: String,
        path: String,
    },

    MathBlock {
        #[serde(default)]
        id: String,
        #[serde(default)]
        source: String,
    },

    Collapsible {
        #[serde(default)]
        id: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        children: Vec<Block>,
    },

    /// Generic opaque block: content the tree cannot natively express
    /// (web-preview cards, file attachments). Round-trips through the
    /// markup as a raw passthrough with explicit key/value attributes.
    Raw {
        #[serde(default)]
        id: String,
        tag: String,
        #[serde(default)]
        attributes: BTreeMap<String, String>,
        #[serde(default)]
        body: String,
    },

    /// Fallback for unrecognized node kinds.
    Unknown {
        #[serde(default)]
        id: String,
        /// The node kind the editing surface reported.
        #[serde(rename = "original-kind")]
        kind: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        children: Vec<Block>,
    },
}

impl Block {
    /// Stable block identifier. Empty until assigned by a
    /// [`crate::BlockIdGenerator`].
    pub fn id(&self) -> &str {
        match self {
            Block::Paragraph { id, .. }
            | Block::Heading { id, .. }
            | Block::List { id, .. }
            | Block::CodeBlock { id, .. }
            | Block::Blockquote { id, .. }
            | Block::Table { id, .. }
            | Block::Image { id, .. }
            | Block::HorizontalRule { id }
            | Block::Admonition { id, .. }
            | Block::Include { id, .. }
            | Block::MathBlock { id, .. }
            | Block::Collapsible { id, .. }
            | Block::Raw { id, .. }
            | Block::Unknown { id, .. } => id,
        }
    }

    pub fn set_id(&mut self, new_id: String) {
        match self {
            Block::Paragraph { id, .. }
            | Block::Heading { id, .. }
            | Block::List { id, .. }
            | Block::CodeBlock { id, .. }
            | Block::Blockquote { id, .. }
            | Block::Table { id, .. }
            | Block::Image { id, .. }
            | Block::HorizontalRule { id }
            | Block::Admonition { id, .. }
            | Block::Include { id, .. }
            | Block::MathBlock { id, .. }
            | Block::Collapsible { id, .. }
            | Block::Raw { id, .. }
            | Block::Unknown { id, .. } => *id = new_id,
        }
    }
}

/// Inline content within a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Inline {
    Text {
        text: String,
        #[serde(default)]
        marks: Vec<Mark>,
    },
    HardBreak,
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Inline::Text {
            text: text.into(),
            marks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListStyle {
    Bullet,
    Ordered,
}

impl ListStyle {
    /// Marker character, repeated once per nesting level in the markup.
    pub fn marker(&self) -> char {
        match self {
            ListStyle::Bullet => '*',
            ListStyle::Ordered => '.',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default)]
    pub content: Vec<Inline>,
    /// Nested blocks under this item (typically a nested list).
    #[serde(default)]
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub header: bool,
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default = "default_span")]
    pub colspan: u32,
    #[serde(default = "default_span")]
    pub rowspan: u32,
    #[serde(default)]
    pub children: Vec<Inline>,
}

fn default_span() -> u32 {
    1
}

impl TableCell {
    pub fn new(children: Vec<Inline>) -> Self {
        Self {
            colspan: 1,
            rowspan: 1,
            children,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdmonitionKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AdmonitionKind {
    /// Uppercase label used in the markup attribute line (`[NOTE]`).
    pub fn label(&self) -> &'static str {
        match self {
            AdmonitionKind::Note => "NOTE",
            AdmonitionKind::Tip => "TIP",
            AdmonitionKind::Important => "IMPORTANT",
            AdmonitionKind::Warning => "WARNING",
            AdmonitionKind::Caution => "CAUTION",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "NOTE" => Some(AdmonitionKind::Note),
            "TIP" => Some(AdmonitionKind::Tip),
            "IMPORTANT" => Some(AdmonitionKind::Important),
            "WARNING" => Some(AdmonitionKind::Warning),
            "CAUTION" => Some(AdmonitionKind::Caution),
            _ => None,
        }
    }
}

impl Default for AdmonitionKind {
    fn default() -> Self {
        AdmonitionKind::Note
    }
}
