//! Raw passthrough blocks.
//!
//! Block kinds the tree cannot natively express are serialized as a
//! self-describing passthrough with explicit key/value attributes, so
//! they survive a round trip through re-import without data loss:
//!
//! ```text
//! [raw,kind=bookmark,id=abc-3,url=https://example.com]
//! ++++
//! optional body
//! ++++
//! ```

use std::collections::BTreeMap;

pub const FENCE: &str = "++++";

/// A parsed passthrough block, as recovered on re-import.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBlock {
    pub tag: String,
    pub id: String,
    pub attributes: BTreeMap<String, String>,
    pub body: String,
}

/// Emit the attribute line + fenced body for a raw block. The body fence
/// is always present, even for an empty body, so the block boundary is
/// unambiguous.
pub fn emit(tag: &str, id: &str, attributes: &BTreeMap<String, String>, body: &str) -> String {
    let mut line = String::from("[raw,kind=");
    line.push_str(&quote_value(tag));
    if !id.is_empty() {
        line.push_str(",id=");
        line.push_str(&quote_value(id));
    }
    for (key, value) in attributes {
        line.push(',');
        line.push_str(key);
        line.push('=');
        line.push_str(&quote_value(value));
    }
    line.push(']');

    let mut out = line;
    out.push('\n');
    out.push_str(FENCE);
    out.push('\n');
    if !body.is_empty() {
        out.push_str(body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str(FENCE);
    out
}

/// Try to parse a raw block starting at `lines[0]`. Returns the block and
/// the number of lines consumed (attribute line + fenced body), or None
/// if this is not a raw passthrough.
pub fn parse(lines: &[&str]) -> Option<(RawBlock, usize)> {
    let attr_line = lines.first()?.trim();
    let inner = attr_line.strip_prefix('[')?.strip_suffix(']')?;
    let fields = split_attr_list(inner);
    if fields.first().map(String::as_str) != Some("raw") {
        return None;
    }

    let mut tag = String::new();
    let mut id = String::new();
    let mut attributes = BTreeMap::new();
    for field in &fields[1..] {
        let (key, value) = match field.split_once('=') {
            Some((k, v)) => (k.trim(), unquote_value(v)),
            None => continue,
        };
        match key {
            "kind" => tag = value,
            "id" => id = value,
            _ => {
                attributes.insert(key.to_string(), value);
            }
        }
    }

    // Body is the fenced region on the following lines.
    if lines.get(1).map(|l| l.trim()) != Some(FENCE) {
        return None;
    }
    let mut body = String::new();
    let mut consumed = 2;
    for line in &lines[2..] {
        consumed += 1;
        if line.trim() == FENCE {
            return Some((
                RawBlock {
                    tag,
                    id,
                    attributes,
                    body,
                },
                consumed,
            ));
        }
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(line);
    }

    // Unclosed fence: the lint layer reports this; re-import refuses to
    // guess at a boundary.
    None
}

/// Split a `[...]` attribute list on commas, honoring quoted values.
fn split_attr_list(inner: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '\\' if in_quotes => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        fields.push(current.trim().to_string());
    }
    fields
}

fn quote_value(value: &str) -> String {
    let needs_quoting = value
        .chars()
        .any(|c| matches!(c, ',' | '=' | '"' | '[' | ']') || c.is_whitespace());
    if !needs_quoting {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn unquote_value(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        let mut out = String::new();
        let mut chars = trimmed[1..trimmed.len() - 1].chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else {
                out.push(c);
            }
        }
        out
    } else {
        trimmed.to_string()
    }
}
