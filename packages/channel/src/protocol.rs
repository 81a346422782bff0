//! Message shapes for the background conversion channel.
//!
//! Transport is in-process message passing, but the shapes are serde
//! types so the protocol is inspectable and stable.

use inkstone_compiler::{Diagnostic, OutlineItem, ParsedBlock, RenderOptions};
use serde::{Deserialize, Serialize};

/// Which side originated a markup write. Every write is tagged so the
/// receiving side can avoid re-triggering its own synchronization cycle
/// for content it did not originate (last write wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteOrigin {
    /// The structured tree was serialized into the markup text.
    Tree,
    /// The markup text was edited directly.
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkerRequest {
    Lint {
        id: String,
        content: String,
    },
    Render {
        id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<RenderOptions>,
    },
    Parse {
        id: String,
        content: String,
    },
}

impl WorkerRequest {
    pub fn id(&self) -> &str {
        match self {
            WorkerRequest::Lint { id, .. }
            | WorkerRequest::Render { id, .. }
            | WorkerRequest::Parse { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkerResponse {
    /// One-time readiness signal, sent before any request is handled.
    Ready,
    LintResult {
        id: String,
        diagnostics: Vec<Diagnostic>,
        outline: Vec<OutlineItem>,
        success: bool,
        duration_ms: u64,
    },
    RenderResult {
        id: String,
        html: String,
        success: bool,
        duration_ms: u64,
    },
    ParseResult {
        id: String,
        blocks: Vec<ParsedBlock>,
        success: bool,
        duration_ms: u64,
    },
    Error {
        id: String,
        error: String,
    },
}

impl WorkerResponse {
    /// Correlation id, if this response answers a request.
    pub fn id(&self) -> Option<&str> {
        match self {
            WorkerResponse::Ready => None,
            WorkerResponse::LintResult { id, .. }
            | WorkerResponse::RenderResult { id, .. }
            | WorkerResponse::ParseResult { id, .. }
            | WorkerResponse::Error { id, .. } => Some(id),
        }
    }
}
