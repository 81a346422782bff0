//! Line classification for the line-oriented markup grammar.
//!
//! The renderer, linter, outline extractor and content-line mapper all
//! consume the same classification so they agree on what a line means.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub enum LineKind<'a> {
    Blank,
    Heading { level: usize, text: &'a str },
    BulletItem { depth: usize, text: &'a str },
    OrderedItem { depth: usize, text: &'a str },
    /// `----`
    CodeFence,
    /// `++++`
    PassthroughFence,
    /// `====`
    ExampleFence,
    /// `____`
    QuoteFence,
    /// `|===`
    TableFence,
    /// `'''`
    Rule,
    /// `[ ... ]`
    AttrLine { inner: &'a str },
    /// `.Title`
    BlockTitle { text: &'a str },
    Image { target: &'a str, alt: &'a str },
    Include { target: &'a str },
    /// A lone `+` attaching the next line to the current list item.
    Continuation,
    Text { text: &'a str },
}

fn image_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^image::([^\[]*)\[(.*)\]$").unwrap())
}

fn include_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^include::([^\[]*)\[.*\]$").unwrap())
}

pub fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    if trimmed.len() >= 4 && trimmed.chars().all(|c| c == '-') {
        return LineKind::CodeFence;
    }
    if trimmed.len() >= 4 && trimmed.chars().all(|c| c == '+') {
        return LineKind::PassthroughFence;
    }
    if trimmed.len() >= 4 && trimmed.chars().all(|c| c == '=') {
        return LineKind::ExampleFence;
    }
    if trimmed.len() >= 4 && trimmed.chars().all(|c| c == '_') {
        return LineKind::QuoteFence;
    }
    if trimmed == "|===" {
        return LineKind::TableFence;
    }
    if trimmed == "'''" {
        return LineKind::Rule;
    }
    if trimmed == "+" {
        return LineKind::Continuation;
    }

    if let Some(captures) = image_re().captures(trimmed) {
        let target = captures.get(1).map(|m| m.as_str()).unwrap_or("");
        let alt = captures.get(2).map(|m| m.as_str()).unwrap_or("");
        return LineKind::Image { target, alt };
    }
    if let Some(captures) = include_re().captures(trimmed) {
        let target = captures.get(1).map(|m| m.as_str()).unwrap_or("");
        return LineKind::Include { target };
    }

    if let Some(kind) = leading_marker(trimmed, '=') {
        let (count, rest) = kind;
        if (1..=6).contains(&count) {
            return LineKind::Heading {
                level: count,
                text: rest,
            };
        }
    }
    if let Some((count, rest)) = leading_marker(trimmed, '*') {
        return LineKind::BulletItem {
            depth: count,
            text: rest,
        };
    }
    if let Some((count, rest)) = leading_marker(trimmed, '.') {
        return LineKind::OrderedItem {
            depth: count,
            text: rest,
        };
    }

    if trimmed.starts_with('[') && trimmed.ends_with(']') && trimmed.len() >= 2 {
        return LineKind::AttrLine {
            inner: &trimmed[1..trimmed.len() - 1],
        };
    }

    if let Some(rest) = trimmed.strip_prefix('.') {
        // `.Title` — a block title; ordered items were matched above.
        if !rest.is_empty() && !rest.starts_with(' ') {
            return LineKind::BlockTitle { text: rest };
        }
    }

    LineKind::Text { text: trimmed }
}

/// Match `marker`-repeated-then-space prefixes (`== text`, `*** text`).
fn leading_marker(line: &str, marker: char) -> Option<(usize, &str)> {
    let count = line.chars().take_while(|c| *c == marker).count();
    if count == 0 {
        return None;
    }
    let rest = &line[count..];
    let rest = rest.strip_prefix(' ')?;
    Some((count, rest.trim_start()))
}
