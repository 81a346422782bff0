//! Inline markup parsing.
//!
//! Recognizes the wrap forms the mark resolver emits — `*bold*`,
//! `_italic_`, `` `code` ``, role spans `[.role]#text#`, hex spans
//! `[color:#aabbcc]#text#`, anchor references `<<id,text>>`, cross-file
//! references `xref:target[text]` and absolute-URL links `url[text]`.
//! Anything that does not form a complete construct falls back to plain
//! text — inline parsing never fails.

use crate::html::HtmlNode;
use regex::Regex;
use std::sync::OnceLock;

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s\[\]]+\[").unwrap())
}

pub fn parse_inline(text: &str) -> Vec<HtmlNode> {
    let mut nodes = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while !rest.is_empty() {
        if let Some((node, consumed)) = match_construct(rest) {
            if !plain.is_empty() {
                nodes.push(HtmlNode::text(std::mem::take(&mut plain)));
            }
            nodes.push(node);
            rest = &rest[consumed..];
        } else {
            let c = rest.chars().next().unwrap();
            plain.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    if !plain.is_empty() {
        nodes.push(HtmlNode::text(plain));
    }
    nodes
}

/// Text content with inline markup stripped. This is what the
/// content-line mapper fingerprints, so source lines and rendered
/// elements agree on the same text.
pub fn plain_text(text: &str) -> String {
    parse_inline(text)
        .iter()
        .map(HtmlNode::text_content)
        .collect()
}

fn match_construct(rest: &str) -> Option<(HtmlNode, usize)> {
    let first = rest.chars().next()?;
    match first {
        '*' => delimited(rest, '*', "strong"),
        '_' => delimited(rest, '_', "em"),
        '`' => code_span(rest),
        '[' => role_span(rest),
        '<' if rest.starts_with("<<") => anchor_ref(rest),
        'x' if rest.starts_with("xref:") => xref_link(rest),
        _ => url_link(rest),
    }
}

fn delimited(rest: &str, delim: char, tag: &str) -> Option<(HtmlNode, usize)> {
    let close = rest[1..].find(delim)? + 1;
    let inner = &rest[1..close];
    if inner.is_empty() || inner.starts_with(' ') || inner.ends_with(' ') {
        return None;
    }
    let node = HtmlNode::element(tag).with_children(parse_inline(inner));
    Some((node, close + 1))
}

fn code_span(rest: &str) -> Option<(HtmlNode, usize)> {
    let close = rest[1..].find('`')? + 1;
    let inner = &rest[1..close];
    if inner.is_empty() {
        return None;
    }
    // Code content is literal, never re-parsed.
    let node = HtmlNode::element("code").with_child(HtmlNode::text(inner));
    Some((node, close + 1))
}

fn role_span(rest: &str) -> Option<(HtmlNode, usize)> {
    let close_bracket = rest.find(']')?;
    let role = &rest[1..close_bracket];
    let after = &rest[close_bracket + 1..];
    if !after.starts_with('#') {
        return None;
    }
    let close_hash = after[1..].find('#')? + 1;
    let inner = &after[1..close_hash];

    let mut node = HtmlNode::element("span");
    if let Some(class) = role.strip_prefix('.') {
        if class.is_empty() {
            return None;
        }
        node = node.with_attr("class", class);
    } else if let Some(color) = role.strip_prefix("color:") {
        node = node.with_attr("style", format!("color:{}", color));
    } else if let Some(color) = role.strip_prefix("background:") {
        node = node.with_attr("style", format!("background-color:{}", color));
    } else {
        return None;
    }

    let node = node.with_children(parse_inline(inner));
    Some((node, close_bracket + 1 + close_hash + 1))
}

fn anchor_ref(rest: &str) -> Option<(HtmlNode, usize)> {
    let close = rest[2..].find(">>")? + 2;
    let inner = &rest[2..close];
    if inner.is_empty() {
        return None;
    }
    let (anchor, label) = match inner.split_once(',') {
        Some((a, l)) => (a.trim(), l.trim()),
        None => (inner, inner),
    };
    let node = HtmlNode::element("a")
        .with_attr("href", format!("#{}", anchor))
        .with_child(HtmlNode::text(label));
    Some((node, close + 2))
}

fn xref_link(rest: &str) -> Option<(HtmlNode, usize)> {
    let open_bracket = rest.find('[')?;
    let target = &rest[5..open_bracket];
    if target.is_empty() || target.contains(' ') {
        return None;
    }
    let close_bracket = rest[open_bracket + 1..].find(']')? + open_bracket + 1;
    let label = &rest[open_bracket + 1..close_bracket];
    let node = HtmlNode::element("a")
        .with_attr("class", "xref")
        .with_attr("href", target)
        .with_children(parse_inline(label));
    Some((node, close_bracket + 1))
}

fn url_link(rest: &str) -> Option<(HtmlNode, usize)> {
    let matched = url_re().find(rest)?;
    let with_bracket = matched.as_str();
    let target = &with_bracket[..with_bracket.len() - 1];
    let close_bracket = rest[matched.end()..].find(']')? + matched.end();
    let label = &rest[matched.end()..close_bracket];
    let node = HtmlNode::element("a")
        .with_attr("href", target)
        .with_children(parse_inline(label));
    Some((node, close_bracket + 1))
}
