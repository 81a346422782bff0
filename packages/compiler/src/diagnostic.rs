use serde::{Deserialize, Serialize};

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A line-scoped compilation diagnostic.
///
/// The underlying compiler provides no column information — diagnostics
/// are line-granular only (1-based).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level
    pub severity: Severity,

    /// The rule that generated this diagnostic
    pub source: String,

    /// Human-readable message
    pub message: String,

    /// 1-based source line
    pub line: u32,
}

impl Diagnostic {
    pub fn error(source: impl Into<String>, message: impl Into<String>, line: u32) -> Self {
        Self {
            severity: Severity::Error,
            source: source.into(),
            message: message.into(),
            line,
        }
    }

    pub fn warning(source: impl Into<String>, message: impl Into<String>, line: u32) -> Self {
        Self {
            severity: Severity::Warning,
            source: source.into(),
            message: message.into(),
            line,
        }
    }

    pub fn info(source: impl Into<String>, message: impl Into<String>, line: u32) -> Self {
        Self {
            severity: Severity::Info,
            source: source.into(),
            message: message.into(),
            line,
        }
    }
}
