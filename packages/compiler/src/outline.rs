//! Section outline extraction.

use crate::inline::plain_text;
use crate::scan::{classify, LineKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A read-only projection of section structure, rebuilt per compile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineItem {
    pub level: u8,
    pub title: String,
    pub id: String,
    pub line: Option<u32>,
}

/// Deduplicating slug generator. Scoped to a single compile pass so ids
/// are stable for a given document content.
pub struct Slugger {
    seen: HashMap<String, u32>,
}

impl Slugger {
    pub fn new() -> Self {
        Self {
            seen: HashMap::new(),
        }
    }

    pub fn slug(&mut self, title: &str) -> String {
        let base = slugify(&plain_text(title));
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{}-{}", base, count)
        }
    }
}

impl Default for Slugger {
    fn default() -> Self {
        Self::new()
    }
}

pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_dash = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("section");
    }
    out
}

/// Extract the heading outline, skipping fenced regions.
pub fn extract_outline(content: &str) -> Vec<OutlineItem> {
    let mut items = Vec::new();
    let mut slugger = Slugger::new();
    let mut in_code = false;
    let mut in_passthrough = false;

    for (idx, line) in content.lines().enumerate() {
        match classify(line) {
            LineKind::CodeFence if !in_passthrough => in_code = !in_code,
            LineKind::PassthroughFence if !in_code => in_passthrough = !in_passthrough,
            LineKind::Heading { level, text } if !in_code && !in_passthrough => {
                items.push(OutlineItem {
                    level: level as u8,
                    title: plain_text(text),
                    id: slugger.slug(text),
                    line: Some(idx as u32 + 1),
                });
            }
            _ => {}
        }
    }

    items
}
