//! The isolated compilation worker.
//!
//! Owns the compiler; communicates only via message passing. Never
//! touches editor state.

use crate::protocol::{WorkerRequest, WorkerResponse};
use inkstone_compiler::{lint_document, parse_blocks, render_html, RenderOptions};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;
use tokio::sync::mpsc;

/// Spawn the worker task. The returned sender carries requests in; the
/// receiver carries responses out, beginning with the one-time `Ready`
/// signal. The task ends when every request sender is dropped.
pub fn spawn_worker(
    buffer: usize,
) -> (mpsc::Sender<WorkerRequest>, mpsc::Receiver<WorkerResponse>) {
    let (request_tx, mut request_rx) = mpsc::channel::<WorkerRequest>(buffer);
    let (response_tx, response_rx) = mpsc::channel::<WorkerResponse>(buffer);

    tokio::spawn(async move {
        if response_tx.send(WorkerResponse::Ready).await.is_err() {
            return;
        }
        while let Some(request) = request_rx.recv().await {
            let response = handle_request(request);
            if response_tx.send(response).await.is_err() {
                break;
            }
        }
    });

    (request_tx, response_rx)
}

/// Handle one request synchronously. This is also the degraded-mode
/// fallback when no worker is available: callers can compile in-process
/// with the same request/response shapes. A panic inside the compiler
/// surfaces as an `Error` response tagged with the original correlation
/// id instead of killing the worker loop.
pub fn handle_request(request: WorkerRequest) -> WorkerResponse {
    let id = request.id().to_string();
    match catch_unwind(AssertUnwindSafe(|| handle_inner(request))) {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(id = %id, "compilation worker panicked");
            WorkerResponse::Error {
                id,
                error: "internal compiler panic".to_string(),
            }
        }
    }
}

fn handle_inner(request: WorkerRequest) -> WorkerResponse {
    let started = Instant::now();
    match request {
        WorkerRequest::Lint { id, content } => {
            let report = lint_document(&content);
            WorkerResponse::LintResult {
                id,
                diagnostics: report.diagnostics,
                outline: report.outline,
                success: true,
                duration_ms: started.elapsed().as_millis() as u64,
            }
        }
        WorkerRequest::Render {
            id,
            content,
            options,
        } => {
            let html = render_html(&content, &options.unwrap_or_default());
            WorkerResponse::RenderResult {
                id,
                html,
                success: true,
                duration_ms: started.elapsed().as_millis() as u64,
            }
        }
        WorkerRequest::Parse { id, content } => {
            let blocks = parse_blocks(&content);
            WorkerResponse::ParseResult {
                id,
                blocks,
                success: true,
                duration_ms: started.elapsed().as_millis() as u64,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkstone_compiler::Severity;

    #[test]
    fn test_lint_request_produces_diagnostics() {
        let response = handle_request(WorkerRequest::Lint {
            id: "req-1".to_string(),
            content: "----\nunclosed".to_string(),
        });

        match response {
            WorkerResponse::LintResult {
                id,
                diagnostics,
                success,
                ..
            } => {
                assert_eq!(id, "req-1");
                assert!(success);
                assert_eq!(diagnostics.len(), 1);
                assert_eq!(diagnostics[0].severity, Severity::Error);
            }
            other => panic!("expected lint result, got {:?}", other),
        }
    }

    #[test]
    fn test_render_request_produces_html() {
        let response = handle_request(WorkerRequest::Render {
            id: "req-2".to_string(),
            content: "== Intro".to_string(),
            options: Some(RenderOptions { annotate: false }),
        });

        match response {
            WorkerResponse::RenderResult { html, .. } => {
                assert!(html.contains("<h2"));
                assert!(html.contains("Intro"));
            }
            other => panic!("expected render result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_worker_sends_ready_first() {
        let (_tx, mut rx) = spawn_worker(8);
        let first = rx.recv().await.unwrap();
        assert_eq!(first, WorkerResponse::Ready);
    }
}
