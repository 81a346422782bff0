//! Channel behavior: readiness, correlation, debounce coalescing,
//! out-of-order responses, observer retention.

use crate::channel::{ChannelConfig, ChannelError, ConversionChannel};
use crate::protocol::{WorkerRequest, WorkerResponse, WriteOrigin};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// A channel wired to a hand-driven transport instead of the real
/// worker, so tests control response content and ordering.
fn manual_channel(
    debounce_ms: u64,
) -> (
    ConversionChannel,
    mpsc::Receiver<WorkerRequest>,
    mpsc::Sender<WorkerResponse>,
) {
    let (request_tx, request_rx) = mpsc::channel(16);
    let (response_tx, response_rx) = mpsc::channel(16);
    let channel = ConversionChannel::with_transport(
        ChannelConfig::with_debounce_ms(debounce_ms),
        request_tx,
        response_rx,
    );
    (channel, request_rx, response_tx)
}

#[tokio::test]
async fn test_end_to_end_lint_through_worker() {
    let channel = ConversionChannel::open(ChannelConfig::default());
    channel.wait_ready().await;

    let report = channel
        .lint("----\nunclosed", WriteOrigin::Text)
        .await
        .expect("lint should succeed");

    assert_eq!(report.diagnostics.len(), 1);
    assert!(report.diagnostics[0].message.contains("unclosed"));
    channel.close();
}

#[tokio::test]
async fn test_end_to_end_render_through_worker() {
    let channel = ConversionChannel::open(ChannelConfig::default());
    channel.wait_ready().await;

    let html = channel.render("== Intro", None).await.unwrap();
    assert!(html.contains("<h2"));
    channel.close();
}

#[tokio::test]
async fn test_ready_waiters_are_buffered() {
    let (channel, _request_rx, response_tx) = manual_channel(100);

    let waiter = {
        let channel = &channel;
        timeout(Duration::from_millis(500), async move {
            channel.wait_ready().await;
        })
    };

    // Signal readiness after the waiter is registered.
    let send = async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        response_tx.send(WorkerResponse::Ready).await.unwrap();
    };

    let (waited, _) = tokio::join!(waiter, send);
    waited.expect("wait_ready should resolve once Ready arrives");

    // Subsequent waits resolve immediately.
    channel.wait_ready().await;
}

#[tokio::test]
async fn test_out_of_order_responses_resolve_correctly() {
    let (channel, mut request_rx, response_tx) = manual_channel(100);
    response_tx.send(WorkerResponse::Ready).await.unwrap();
    channel.wait_ready().await;

    let first = channel.render("A", None);
    let second = channel.render("B", None);

    let driver = async {
        let request_a = request_rx.recv().await.unwrap();
        let request_b = request_rx.recv().await.unwrap();

        // Answer B before A.
        response_tx
            .send(WorkerResponse::RenderResult {
                id: request_b.id().to_string(),
                html: "B-html".to_string(),
                success: true,
                duration_ms: 1,
            })
            .await
            .unwrap();
        response_tx
            .send(WorkerResponse::RenderResult {
                id: request_a.id().to_string(),
                html: "A-html".to_string(),
                success: true,
                duration_ms: 1,
            })
            .await
            .unwrap();
    };

    let (result_a, result_b, _) = tokio::join!(first, second, driver);
    assert_eq!(result_a.unwrap(), "A-html");
    assert_eq!(result_b.unwrap(), "B-html");
}

#[tokio::test]
async fn test_debounce_coalesces_burst_into_one_dispatch() {
    let (channel, mut request_rx, response_tx) = manual_channel(100);
    response_tx.send(WorkerResponse::Ready).await.unwrap();
    channel.wait_ready().await;

    for i in 0..5 {
        channel.schedule_lint(format!("draft {}", i), WriteOrigin::Tree);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    tokio::time::sleep(Duration::from_millis(300)).await;

    let mut dispatched = Vec::new();
    while let Ok(request) = request_rx.try_recv() {
        dispatched.push(request);
    }
    assert_eq!(dispatched.len(), 1, "burst should coalesce to one request");
    match &dispatched[0] {
        WorkerRequest::Lint { content, .. } => assert_eq!(content, "draft 4"),
        other => panic!("expected lint request, got {:?}", other),
    }
}

#[tokio::test]
async fn test_spaced_schedules_each_dispatch() {
    let (channel, mut request_rx, response_tx) = manual_channel(100);
    response_tx.send(WorkerResponse::Ready).await.unwrap();
    channel.wait_ready().await;

    for _ in 0..3 {
        channel.schedule_lint("content", WriteOrigin::Text);
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    let mut dispatched = 0;
    while request_rx.try_recv().is_ok() {
        dispatched += 1;
    }
    assert_eq!(dispatched, 3, "spaced schedules each dispatch");
}

#[tokio::test]
async fn test_observers_receive_updates_and_state_is_retained() {
    let channel = ConversionChannel::open(ChannelConfig::with_debounce_ms(100));
    channel.wait_ready().await;
    let mut updates = channel.subscribe();

    channel.schedule_lint("----\nunclosed", WriteOrigin::Text);

    let update = timeout(Duration::from_secs(2), updates.recv())
        .await
        .expect("update should arrive")
        .expect("observer channel open");

    assert_eq!(update.origin, WriteOrigin::Text);
    assert_eq!(update.diagnostics.len(), 1);

    // Late joiners query retained state synchronously.
    assert_eq!(channel.current_diagnostics().len(), 1);
    assert!(channel.has_errors());
    channel.close();
}

#[tokio::test]
async fn test_last_update_wins_for_retained_state() {
    let channel = ConversionChannel::open(ChannelConfig::default());
    channel.wait_ready().await;

    channel
        .lint("----\nunclosed", WriteOrigin::Text)
        .await
        .unwrap();
    assert!(channel.has_errors());

    channel.lint("== clean", WriteOrigin::Text).await.unwrap();
    assert!(!channel.has_errors());
    assert_eq!(channel.current_outline().len(), 1);
    channel.close();
}

#[tokio::test]
async fn test_closed_channel_rejects_requests() {
    let channel = ConversionChannel::open(ChannelConfig::default());
    channel.wait_ready().await;
    channel.close();

    let result = channel.lint("anything", WriteOrigin::Text).await;
    assert_eq!(result.unwrap_err(), ChannelError::NotOpen);
}

#[tokio::test]
async fn test_pending_requests_rejected_on_close() {
    let (channel, mut request_rx, response_tx) = manual_channel(100);
    response_tx.send(WorkerResponse::Ready).await.unwrap();
    channel.wait_ready().await;

    let pending = channel.render("never answered", None);
    let driver = async {
        // Swallow the request, then close instead of answering.
        let _ = request_rx.recv().await;
        channel.close();
    };

    let (result, _) = tokio::join!(pending, driver);
    assert_eq!(result.unwrap_err(), ChannelError::Closed);
}

#[tokio::test]
async fn test_worker_error_rejects_with_correlated_id() {
    let (channel, mut request_rx, response_tx) = manual_channel(100);
    response_tx.send(WorkerResponse::Ready).await.unwrap();
    channel.wait_ready().await;

    let pending = channel.render("boom", None);
    let driver = async {
        let request = request_rx.recv().await.unwrap();
        response_tx
            .send(WorkerResponse::Error {
                id: request.id().to_string(),
                error: "synthetic failure".to_string(),
            })
            .await
            .unwrap();
    };

    let (result, _) = tokio::join!(pending, driver);
    assert_eq!(
        result.unwrap_err(),
        ChannelError::Worker("synthetic failure".to_string())
    );
}

#[tokio::test]
async fn test_unmatched_response_is_dropped_silently() {
    let (channel, _request_rx, response_tx) = manual_channel(100);
    response_tx.send(WorkerResponse::Ready).await.unwrap();
    channel.wait_ready().await;

    // No pending request with this id; the channel must not fall over.
    response_tx
        .send(WorkerResponse::RenderResult {
            id: "req-9999".to_string(),
            html: String::new(),
            success: true,
            duration_ms: 0,
        })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(channel.current_diagnostics().is_empty());
}

#[tokio::test]
async fn test_parse_recovers_raw_attributes() {
    let channel = ConversionChannel::open(ChannelConfig::default());
    channel.wait_ready().await;

    let blocks = channel
        .parse("[raw,kind=card,a=1,b=2]\n++++\n++++")
        .await
        .unwrap();

    assert_eq!(blocks.len(), 1);
    let attributes = blocks[0].attributes.as_ref().unwrap();
    assert_eq!(attributes.get("a").map(String::as_str), Some("1"));
    assert_eq!(attributes.get("b").map(String::as_str), Some("2"));
    channel.close();
}
