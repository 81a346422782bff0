//! The background conversion channel.
//!
//! An explicitly constructed, owned resource: callers receive an open
//! channel and are responsible for closing it. Requests carry
//! caller-generated correlation ids and resolve through a pending-request
//! table, so overlapping responses route correctly even when they arrive
//! out of order.

use crate::debounce::DebouncedTask;
use crate::protocol::{WorkerRequest, WorkerResponse, WriteOrigin};
use crate::worker;
use inkstone_compiler::{Diagnostic, LintReport, OutlineItem, ParsedBlock, RenderOptions, Severity};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub const MIN_DEBOUNCE_MS: u64 = 100;
pub const MAX_DEBOUNCE_MS: u64 = 2000;
pub const DEFAULT_DEBOUNCE_MS: u64 = 800;

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Coalescing window for `schedule_lint`. Clamped to 100–2000ms.
    pub lint_debounce: Duration,
    /// Transport buffer size.
    pub buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            lint_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            buffer: 64,
        }
    }
}

impl ChannelConfig {
    pub fn with_debounce_ms(debounce_ms: u64) -> Self {
        Self {
            lint_debounce: Duration::from_millis(
                debounce_ms.clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS),
            ),
            ..Self::default()
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("conversion channel is not open")]
    NotOpen,

    #[error("conversion channel closed before the response arrived")]
    Closed,

    #[error("worker error: {0}")]
    Worker(String),
}

/// A diagnostic/outline update delivered to observers. The channel also
/// retains the most recent one so late-joining consumers can query
/// current state synchronously.
#[derive(Debug, Clone, PartialEq)]
pub struct LintUpdate {
    pub origin: WriteOrigin,
    pub diagnostics: Vec<Diagnostic>,
    pub outline: Vec<OutlineItem>,
    pub duration_ms: u64,
    /// Unix millis when the update was routed.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelState {
    Initializing,
    Ready,
    Closed,
}

struct PendingRequest {
    responder: Option<oneshot::Sender<WorkerResponse>>,
    origin: WriteOrigin,
}

struct Inner {
    request_tx: Mutex<Option<mpsc::Sender<WorkerRequest>>>,
    pending: Mutex<HashMap<String, PendingRequest>>,
    state: Mutex<ChannelState>,
    ready_waiters: Mutex<Vec<oneshot::Sender<()>>>,
    observers: Mutex<Vec<mpsc::UnboundedSender<LintUpdate>>>,
    current: Mutex<Option<LintUpdate>>,
    next_id: AtomicU64,
    config: ChannelConfig,
}

pub struct ConversionChannel {
    inner: Arc<Inner>,
    scheduled: Mutex<Option<DebouncedTask>>,
    _dispatch: JoinHandle<()>,
}

impl ConversionChannel {
    /// Open a channel backed by a freshly spawned compilation worker.
    pub fn open(config: ChannelConfig) -> Self {
        let buffer = config.buffer;
        let (request_tx, response_rx) = worker::spawn_worker(buffer);
        Self::with_transport(config, request_tx, response_rx)
    }

    /// Open a channel over an existing transport pair. Used by tests to
    /// stand in for the worker and by degraded-mode fallbacks.
    pub fn with_transport(
        config: ChannelConfig,
        request_tx: mpsc::Sender<WorkerRequest>,
        mut response_rx: mpsc::Receiver<WorkerResponse>,
    ) -> Self {
        let inner = Arc::new(Inner {
            request_tx: Mutex::new(Some(request_tx)),
            pending: Mutex::new(HashMap::new()),
            state: Mutex::new(ChannelState::Initializing),
            ready_waiters: Mutex::new(Vec::new()),
            observers: Mutex::new(Vec::new()),
            current: Mutex::new(None),
            next_id: AtomicU64::new(0),
            config,
        });

        let dispatch_inner = inner.clone();
        let dispatch = tokio::spawn(async move {
            while let Some(response) = response_rx.recv().await {
                dispatch_inner.route(response);
            }
        });

        Self {
            inner,
            scheduled: Mutex::new(None),
            _dispatch: dispatch,
        }
    }

    /// Resolve once the worker has signalled readiness. Waiters arriving
    /// before the signal are buffered; after it, this returns
    /// immediately. A closed channel also resolves (callers will get
    /// `NotOpen` from their next request).
    pub async fn wait_ready(&self) {
        let receiver = {
            let state = self.inner.state.lock().unwrap();
            if *state != ChannelState::Initializing {
                return;
            }
            let (tx, rx) = oneshot::channel();
            self.inner.ready_waiters.lock().unwrap().push(tx);
            rx
        };
        let _ = receiver.await;
    }

    /// Dispatch a lint immediately (no debounce) and await its result.
    pub async fn lint(
        &self,
        content: &str,
        origin: WriteOrigin,
    ) -> Result<LintReport, ChannelError> {
        let content = content.to_string();
        let response = self
            .request(origin, |id| WorkerRequest::Lint { id, content })
            .await?;
        match response {
            WorkerResponse::LintResult {
                diagnostics,
                outline,
                ..
            } => Ok(LintReport {
                diagnostics,
                outline,
            }),
            other => Err(unexpected(other)),
        }
    }

    /// Schedule a debounced lint. A schedule arriving inside the window
    /// replaces the pending one; only the last request in a burst is
    /// dispatched. An already dispatched request cannot be cancelled and
    /// is allowed to complete — observers see both updates in arrival
    /// order, last one wins.
    pub fn schedule_lint(&self, content: impl Into<String>, origin: WriteOrigin) {
        let mut scheduled = self.scheduled.lock().unwrap();
        if let Some(previous) = scheduled.take() {
            previous.cancel();
        }

        let inner = self.inner.clone();
        let content = content.into();
        *scheduled = Some(DebouncedTask::schedule(
            self.inner.config.lint_debounce,
            move || async move {
                inner.dispatch_lint(content, origin).await;
            },
        ));
    }

    /// Render markup to HTML. Not debounced by the channel; interactive
    /// callers debounce separately.
    pub async fn render(
        &self,
        content: &str,
        options: Option<RenderOptions>,
    ) -> Result<String, ChannelError> {
        let content = content.to_string();
        let response = self
            .request(WriteOrigin::Text, |id| WorkerRequest::Render {
                id,
                content,
                options,
            })
            .await?;
        match response {
            WorkerResponse::RenderResult { html, .. } => Ok(html),
            other => Err(unexpected(other)),
        }
    }

    /// Best-effort re-import: block summaries plus recovered raw-block
    /// attributes.
    pub async fn parse(&self, content: &str) -> Result<Vec<ParsedBlock>, ChannelError> {
        let content = content.to_string();
        let response = self
            .request(WriteOrigin::Text, |id| WorkerRequest::Parse { id, content })
            .await?;
        match response {
            WorkerResponse::ParseResult { blocks, .. } => Ok(blocks),
            other => Err(unexpected(other)),
        }
    }

    /// Subscribe to diagnostic updates. The receiver sees every routed
    /// lint result in arrival order.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<LintUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.observers.lock().unwrap().push(tx);
        rx
    }

    /// Most recent diagnostics, for synchronous late-joining consumers.
    pub fn current_diagnostics(&self) -> Vec<Diagnostic> {
        self.inner
            .current
            .lock()
            .unwrap()
            .as_ref()
            .map(|update| update.diagnostics.clone())
            .unwrap_or_default()
    }

    pub fn current_outline(&self) -> Vec<OutlineItem> {
        self.inner
            .current
            .lock()
            .unwrap()
            .as_ref()
            .map(|update| update.outline.clone())
            .unwrap_or_default()
    }

    /// Whether the retained diagnostics contain blocking errors. Used by
    /// the export gate; never consulted for autosave.
    pub fn has_errors(&self) -> bool {
        self.inner
            .current
            .lock()
            .unwrap()
            .as_ref()
            .map(|update| {
                update
                    .diagnostics
                    .iter()
                    .any(|d| d.severity == Severity::Error)
            })
            .unwrap_or(false)
    }

    /// Close the channel: cancel any scheduled lint, drop the transport
    /// and reject every pending request with `Closed`. A hard worker
    /// crash requires close + reconstruct; there is no re-initialization.
    pub fn close(&self) {
        if let Some(task) = self.scheduled.lock().unwrap().take() {
            task.cancel();
        }
        *self.inner.request_tx.lock().unwrap() = None;
        *self.inner.state.lock().unwrap() = ChannelState::Closed;

        // Dropping the responders rejects the callers.
        self.inner.pending.lock().unwrap().clear();

        let waiters = std::mem::take(&mut *self.inner.ready_waiters.lock().unwrap());
        for waiter in waiters {
            let _ = waiter.send(());
        }
    }

    async fn request(
        &self,
        origin: WriteOrigin,
        build: impl FnOnce(String) -> WorkerRequest,
    ) -> Result<WorkerResponse, ChannelError> {
        let request_tx = self
            .inner
            .request_tx
            .lock()
            .unwrap()
            .clone()
            .ok_or(ChannelError::NotOpen)?;

        let id = self.inner.next_request_id();
        let (responder, receiver) = oneshot::channel();
        self.inner.pending.lock().unwrap().insert(
            id.clone(),
            PendingRequest {
                responder: Some(responder),
                origin,
            },
        );

        if request_tx.send(build(id.clone())).await.is_err() {
            self.inner.pending.lock().unwrap().remove(&id);
            return Err(ChannelError::Closed);
        }

        let response = receiver.await.map_err(|_| ChannelError::Closed)?;
        if let WorkerResponse::Error { error, .. } = response {
            return Err(ChannelError::Worker(error));
        }
        Ok(response)
    }
}

impl Inner {
    fn next_request_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("req-{}", n)
    }

    /// Send a scheduled (fire-and-observe) lint. No responder: the
    /// result reaches consumers through the observer registry.
    async fn dispatch_lint(&self, content: String, origin: WriteOrigin) {
        let request_tx = match self.request_tx.lock().unwrap().clone() {
            Some(tx) => tx,
            None => return,
        };
        let id = self.next_request_id();
        self.pending.lock().unwrap().insert(
            id.clone(),
            PendingRequest {
                responder: None,
                origin,
            },
        );
        if request_tx
            .send(WorkerRequest::Lint { id: id.clone(), content })
            .await
            .is_err()
        {
            self.pending.lock().unwrap().remove(&id);
        }
    }

    /// Route one response from the worker. Unmatched or malformed
    /// responses are dropped with a trace log, never fatal.
    fn route(&self, response: WorkerResponse) {
        if matches!(response, WorkerResponse::Ready) {
            let mut state = self.state.lock().unwrap();
            if *state == ChannelState::Initializing {
                *state = ChannelState::Ready;
            }
            let waiters = std::mem::take(&mut *self.ready_waiters.lock().unwrap());
            drop(state);
            for waiter in waiters {
                let _ = waiter.send(());
            }
            return;
        }

        let id = match response.id() {
            Some(id) => id.to_string(),
            None => return,
        };
        let entry = self.pending.lock().unwrap().remove(&id);
        let Some(entry) = entry else {
            tracing::debug!(id = %id, "dropping unmatched worker response");
            return;
        };

        if let WorkerResponse::LintResult {
            diagnostics,
            outline,
            duration_ms,
            ..
        } = &response
        {
            let update = LintUpdate {
                origin: entry.origin,
                diagnostics: diagnostics.clone(),
                outline: outline.clone(),
                duration_ms: *duration_ms,
                timestamp: chrono::Utc::now().timestamp_millis(),
            };
            *self.current.lock().unwrap() = Some(update.clone());
            self.observers
                .lock()
                .unwrap()
                .retain(|observer| observer.send(update.clone()).is_ok());
        }

        if let Some(responder) = entry.responder {
            let _ = responder.send(response);
        }
    }
}

fn unexpected(response: WorkerResponse) -> ChannelError {
    tracing::debug!(?response, "unexpected response variant for request");
    ChannelError::Worker("unexpected response variant".to_string())
}
