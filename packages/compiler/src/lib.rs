pub mod diagnostic;
pub mod html;
pub mod inline;
pub mod linemap;
pub mod lint;
pub mod outline;
pub mod reimport;
pub mod render;
pub mod scan;

#[cfg(test)]
mod tests_comprehensive;

pub use diagnostic::{Diagnostic, Severity};
pub use html::{nodes_to_html, HtmlNode};
pub use linemap::{annotate, build_map, FingerprintMap};
pub use lint::lint_content;
pub use outline::{extract_outline, OutlineItem};
pub use reimport::{parse_blocks, ParsedBlock};
pub use render::{render_html, render_nodes, RenderOptions};

use serde::{Deserialize, Serialize};

/// Combined result of a lint pass: diagnostics plus the section outline,
/// both rebuilt from scratch on every compile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintReport {
    pub diagnostics: Vec<Diagnostic>,
    pub outline: Vec<OutlineItem>,
}

impl LintReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// Lint markup text: diagnostics and outline in one pass over the source.
pub fn lint_document(content: &str) -> LintReport {
    LintReport {
        diagnostics: lint_content(content),
        outline: extract_outline(content),
    }
}
