//! Inline mark resolution.
//!
//! Orders an unordered mark set into correctly nested markup so that
//! re-parsing the output and re-extracting the marks is self-consistent.
//! Resolution is a pure function: re-resolving the same set yields
//! byte-identical output.

use inkstone_model::Mark;
use std::collections::HashSet;

/// Bounded palette of named colors. Hex values close to one of these map
/// to the readable name; everything else keeps an explicit hex span.
const PALETTE: &[(&str, [u8; 3])] = &[
    ("black", [0x00, 0x00, 0x00]),
    ("white", [0xff, 0xff, 0xff]),
    ("gray", [0x80, 0x80, 0x80]),
    ("silver", [0xc0, 0xc0, 0xc0]),
    ("red", [0xff, 0x00, 0x00]),
    ("maroon", [0x80, 0x00, 0x00]),
    ("orange", [0xff, 0xa5, 0x00]),
    ("yellow", [0xff, 0xff, 0x00]),
    ("olive", [0x80, 0x80, 0x00]),
    ("lime", [0x00, 0xff, 0x00]),
    ("green", [0x00, 0x80, 0x00]),
    ("teal", [0x00, 0x80, 0x80]),
    ("aqua", [0x00, 0xff, 0xff]),
    ("blue", [0x00, 0x00, 0xff]),
    ("navy", [0x00, 0x00, 0x80]),
    ("purple", [0x80, 0x00, 0x80]),
    ("fuchsia", [0xff, 0x00, 0xff]),
];

/// Per-channel Manhattan distance under which a hex color snaps to a
/// palette name.
const NEAR_MATCH_THRESHOLD: u32 = 48;

/// Wrap `text` in the markup for the given mark set.
///
/// Duplicate kinds are dropped (first wins); unknown kinds pass the text
/// through unwrapped. The highest-priority mark ends up outermost.
pub fn resolve(text: &str, marks: &[Mark]) -> String {
    let mut seen: HashSet<String> = HashSet::new();
    let mut applied: Vec<&Mark> = marks
        .iter()
        .filter(|m| !matches!(m, Mark::Unknown { .. }))
        .filter(|m| seen.insert(m.kind_name().to_string()))
        .collect();

    // Ascending priority: the innermost wrap is applied first, so the
    // final (highest-priority) wrap lands outermost.
    applied.sort_by_key(|m| m.priority());

    let mut out = text.to_string();
    for mark in applied {
        out = wrap(mark, &out);
    }
    out
}

fn wrap(mark: &Mark, text: &str) -> String {
    match mark {
        Mark::Bold => format!("*{}*", text),
        Mark::Italic => format!("_{}_", text),
        Mark::Code => format!("`{}`", text),
        Mark::Underline => format!("[.underline]#{}#", text),
        Mark::Strike => format!("[.line-through]#{}#", text),
        Mark::Highlight { color } => match palette_name(color) {
            Some(name) => format!("[.{}-background]#{}#", name, text),
            None => format!("[background:{}]#{}#", normalize_hex(color), text),
        },
        Mark::TextColor { color } => match palette_name(color) {
            Some(name) => format!("[.{}]#{}#", name, text),
            None => format!("[color:{}]#{}#", normalize_hex(color), text),
        },
        Mark::Link { href } => wrap_link(href, text),
        Mark::Unknown { .. } => text.to_string(),
    }
}

/// Links special-case intra-document anchors, cross-file references and
/// external URLs.
fn wrap_link(href: &str, text: &str) -> String {
    if href.is_empty() {
        return text.to_string();
    }
    if let Some(anchor) = href.strip_prefix('#') {
        return format!("<<{},{}>>", anchor, text);
    }
    if href.contains("://") {
        return format!("{}[{}]", href, text);
    }
    format!("xref:{}[{}]", href, text)
}

/// Map a color to a palette name if it is one already, or if its hex
/// value is an exact or near match.
fn palette_name(color: &str) -> Option<&'static str> {
    let lower = color.trim().to_ascii_lowercase();
    if let Some((name, _)) = PALETTE.iter().find(|(name, _)| *name == lower) {
        return Some(name);
    }

    let rgb = parse_hex(&lower)?;
    let mut best: Option<(&'static str, u32)> = None;
    for (name, candidate) in PALETTE {
        let dist = rgb
            .iter()
            .zip(candidate.iter())
            .map(|(a, b)| (*a as i32 - *b as i32).unsigned_abs())
            .sum::<u32>();
        if best.map(|(_, d)| dist < d).unwrap_or(true) {
            best = Some((name, dist));
        }
    }

    match best {
        Some((name, dist)) if dist <= NEAR_MATCH_THRESHOLD => Some(name),
        _ => None,
    }
}

fn parse_hex(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 16 + v;
            }
            Some(rgb)
        }
        6 => {
            let mut rgb = [0u8; 3];
            for i in 0..3 {
                rgb[i] = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
            }
            Some(rgb)
        }
        _ => None,
    }
}

fn normalize_hex(color: &str) -> String {
    let lower = color.trim().to_ascii_lowercase();
    if lower.starts_with('#') {
        lower
    } else {
        format!("#{}", lower)
    }
}
