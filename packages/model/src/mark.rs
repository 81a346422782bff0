use serde::{Deserialize, Serialize};

/// Inline style annotation attached to a text run.
///
/// No two marks of the same kind may coexist on one run; the resolver
/// drops duplicates (first wins). Unknown kinds are carried through so
/// they can be ignored deterministically rather than failing ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Mark {
    Bold,
    Italic,
    Code,
    Underline,
    Strike,
    Link { href: String },
    Highlight { color: String },
    TextColor { color: String },
    Unknown {
        #[serde(rename = "original-kind")]
        kind: String,
    },
}

impl Mark {
    /// Fixed nesting priority. Higher wraps further out, so a link ends
    /// up outermost and a text color innermost.
    pub fn priority(&self) -> u8 {
        match self {
            Mark::Link { .. } => 7,
            Mark::Bold => 6,
            Mark::Italic => 5,
            Mark::Code => 4,
            Mark::Underline => 3,
            Mark::Strike => 2,
            Mark::Highlight { .. } => 1,
            Mark::TextColor { .. } => 0,
            Mark::Unknown { .. } => 0,
        }
    }

    /// Kind name as it appears on the wire, used for same-kind dedup.
    pub fn kind_name(&self) -> &str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Code => "code",
            Mark::Underline => "underline",
            Mark::Strike => "strike",
            Mark::Link { .. } => "link",
            Mark::Highlight { .. } => "highlight",
            Mark::TextColor { .. } => "text-color",
            Mark::Unknown { kind } => kind,
        }
    }

    pub fn link(href: impl Into<String>) -> Self {
        Mark::Link { href: href.into() }
    }

    pub fn highlight(color: impl Into<String>) -> Self {
        Mark::Highlight {
            color: color.into(),
        }
    }

    pub fn text_color(color: impl Into<String>) -> Self {
        Mark::TextColor {
            color: color.into(),
        }
    }
}
