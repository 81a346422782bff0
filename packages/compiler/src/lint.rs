//! Syntax checks over markup text.
//!
//! Diagnostics are data, not errors: the compiler always produces output,
//! and the caller decides whether errors gate an action (export) or only
//! warn (autosave never blocks on these).

use crate::diagnostic::Diagnostic;
use crate::scan::{classify, LineKind};
use inkstone_model::AdmonitionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fence {
    Code,
    Passthrough,
    Quote,
    Example,
    Table,
}

impl Fence {
    fn name(&self) -> &'static str {
        match self {
            Fence::Code => "code",
            Fence::Passthrough => "passthrough",
            Fence::Quote => "quote",
            Fence::Example => "example",
            Fence::Table => "table",
        }
    }

    /// Code and passthrough bodies are opaque: nothing inside them opens
    /// or closes other blocks.
    fn is_opaque(&self) -> bool {
        matches!(self, Fence::Code | Fence::Passthrough)
    }
}

pub fn lint_content(content: &str) -> Vec<Diagnostic> {
    let lines: Vec<&str> = content.lines().collect();
    let mut diagnostics = Vec::new();
    let mut stack: Vec<(Fence, u32)> = Vec::new();
    let mut last_heading_level: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx as u32 + 1;
        let kind = classify(line);

        if let Some((top, _)) = stack.last().copied() {
            if top.is_opaque() {
                let closes = matches!(
                    (top, &kind),
                    (Fence::Code, LineKind::CodeFence)
                        | (Fence::Passthrough, LineKind::PassthroughFence)
                );
                if closes {
                    stack.pop();
                }
                continue;
            }
        }

        match kind {
            LineKind::CodeFence => stack.push((Fence::Code, line_no)),
            LineKind::PassthroughFence => stack.push((Fence::Passthrough, line_no)),

            LineKind::QuoteFence => toggle(&mut stack, Fence::Quote, line_no),
            LineKind::ExampleFence => toggle(&mut stack, Fence::Example, line_no),
            LineKind::TableFence => toggle(&mut stack, Fence::Table, line_no),

            LineKind::Heading { level, .. } => {
                if let Some(last) = last_heading_level {
                    if level > last + 1 {
                        diagnostics.push(Diagnostic::info(
                            "structure",
                            format!("heading level jumps from {} to {}", last, level),
                            line_no,
                        ));
                    }
                }
                last_heading_level = Some(level);
            }

            LineKind::Image { target, .. } => {
                if target.is_empty() {
                    diagnostics.push(Diagnostic::warning(
                        "image",
                        "image has no target path",
                        line_no,
                    ));
                }
            }

            LineKind::Include { target } => {
                if target.is_empty() {
                    diagnostics.push(Diagnostic::error(
                        "include",
                        "include directive has no path",
                        line_no,
                    ));
                }
            }

            LineKind::AttrLine { inner } => {
                check_attr_line(inner, &lines, idx, &mut diagnostics);
            }

            LineKind::Text { text } => {
                let in_table = matches!(stack.last(), Some((Fence::Table, _)));
                if in_table {
                    if !text.contains('|') {
                        diagnostics.push(Diagnostic::warning(
                            "table",
                            "table row has no cell delimiter",
                            line_no,
                        ));
                    }
                } else if text.contains("xref:") && text.contains("[]") {
                    diagnostics.push(Diagnostic::warning(
                        "link",
                        "cross reference has empty link text",
                        line_no,
                    ));
                }
            }

            _ => {}
        }
    }

    for (fence, opened_at) in stack {
        diagnostics.push(Diagnostic::error(
            "delimiter",
            format!("unclosed {} block", fence.name()),
            opened_at,
        ));
    }

    diagnostics
}

fn toggle(stack: &mut Vec<(Fence, u32)>, fence: Fence, line_no: u32) {
    if stack.last().map(|(f, _)| *f) == Some(fence) {
        stack.pop();
    } else {
        stack.push((fence, line_no));
    }
}

fn check_attr_line(inner: &str, lines: &[&str], idx: usize, diagnostics: &mut Vec<Diagnostic>) {
    let line_no = idx as u32 + 1;

    if inner == "raw" || inner.starts_with("raw,") {
        let next_is_fence = lines
            .get(idx + 1)
            .map(|l| matches!(classify(l), LineKind::PassthroughFence))
            .unwrap_or(false);
        if !next_is_fence {
            diagnostics.push(Diagnostic::error(
                "raw",
                "raw block attribute line must be followed by a passthrough fence",
                line_no,
            ));
        }
        return;
    }

    // An all-caps attribute that is not a known admonition label is
    // almost certainly a typo for one.
    let looks_like_admonition = !inner.is_empty()
        && inner.len() <= 12
        && inner.chars().all(|c| c.is_ascii_uppercase())
        && AdmonitionKind::parse(inner).is_none();
    if looks_like_admonition {
        diagnostics.push(Diagnostic::warning(
            "admonition",
            format!("unknown admonition type [{}]", inner),
            line_no,
        ));
    }
}
