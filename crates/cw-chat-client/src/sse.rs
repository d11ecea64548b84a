// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Server-Sent Events (SSE) streaming for governed-task progress
//!
//! Two layers live here. [`TaskEventStream`] is the raw subscription: one
//! long-lived SSE connection per call, yielding decoded events in server
//! order until a terminal event or transport failure. On top of it,
//! [`stream_task_progress`] dispatches each event to exactly one of three
//! callbacks and returns a cancellation handle. Cancellation is
//! idempotent and suppresses callbacks for frames the transport may still
//! deliver after teardown is requested.

use cw_api_contract::TaskStreamEvent;
use eventsource_client::{Client, ClientBuilder, SSE};
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use crate::auth::AuthConfig;
use crate::error::{ChatClientError, ChatClientResult};

/// Generic failure message for network-level stream errors; callers are
/// not told apart transport failure from task failure.
const CONNECTION_LOST: &str = "connection lost";

/// Raw SSE event stream for one governed task
pub struct TaskEventStream {
    receiver: mpsc::Receiver<Result<TaskStreamEvent, ChatClientError>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl TaskEventStream {
    /// Open the event stream for a task.
    ///
    /// The credential rides in the URL as a `token` query parameter; the
    /// SSE transport does not support custom headers.
    pub async fn connect(
        base_url: &url::Url,
        task_id: &str,
        auth: &AuthConfig,
    ) -> ChatClientResult<Self> {
        let mut url = base_url
            .join(&format!("/chat/governed/{}/stream", task_id))
            .map_err(ChatClientError::from)?;

        if let Some(token) = auth.query_token() {
            url.query_pairs_mut().append_pair("token", token);
        }

        let client = ClientBuilder::for_url(url.as_str())
            .map_err(|e| ChatClientError::Stream(e.to_string()))?
            .build();

        let (tx, rx) = mpsc::channel(32);
        let handle = tokio::spawn(async move {
            let mut stream = client.stream();
            while let Some(event) = stream.next().await {
                match event {
                    Ok(SSE::Connected(_)) => {
                        // Transport-level handshake; the application-level
                        // "connected" frame arrives as a regular event.
                    }
                    Ok(SSE::Event(ev)) => {
                        match serde_json::from_str::<TaskStreamEvent>(&ev.data) {
                            Ok(parsed) => {
                                let terminal = parsed.is_terminal();
                                if tx.send(Ok(parsed)).await.is_err() {
                                    break;
                                }
                                if terminal {
                                    // Close the connection; no further
                                    // events are observed after a terminal
                                    // frame.
                                    break;
                                }
                            }
                            Err(err) => {
                                // Keep-alive noise and partial frames are
                                // dropped, never surfaced to callers.
                                tracing::debug!(%err, data = %ev.data, "dropping unparsable SSE frame");
                            }
                        }
                    }
                    Ok(SSE::Comment(_)) => {}
                    Err(err) => {
                        tracing::debug!(%err, "task event stream transport error");
                        let _ = tx
                            .send(Err(ChatClientError::Stream(CONNECTION_LOST.to_string())))
                            .await;
                        break;
                    }
                }
            }
        });

        Ok(TaskEventStream {
            receiver: rx,
            _handle: handle,
        })
    }
}

impl Stream for TaskEventStream {
    type Item = Result<TaskStreamEvent, ChatClientError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Cancellation handle returned by [`stream_task_progress`].
///
/// `cancel` is safe to call multiple times and after natural completion.
pub struct TaskProgressHandle {
    closed: Arc<AtomicBool>,
    pump: Option<tokio::task::JoinHandle<()>>,
}

impl TaskProgressHandle {
    pub(crate) fn new(closed: Arc<AtomicBool>, pump: Option<tokio::task::JoinHandle<()>>) -> Self {
        Self { closed, pump }
    }

    /// Tear down the subscription and suppress any further callback
    /// invocations, including frames already in flight at the transport.
    pub fn cancel(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if let Some(pump) = &self.pump {
            pump.abort();
        }
    }

    /// Whether a terminal event was dispatched or `cancel` was called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Routes each stream item to exactly one callback, with a closed guard
/// that makes terminal dispatch happen at most once and suppresses
/// everything after cancellation.
struct ProgressDispatcher {
    closed: Arc<AtomicBool>,
    on_update: Box<dyn Fn(TaskStreamEvent) + Send>,
    on_complete: Box<dyn Fn(TaskStreamEvent) + Send>,
    on_error: Box<dyn Fn(String) + Send>,
}

impl ProgressDispatcher {
    /// Returns true when the stream should be torn down.
    fn dispatch(&self, item: Result<TaskStreamEvent, ChatClientError>) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return true;
        }
        match item {
            Ok(TaskStreamEvent::Connected { .. }) => {
                tracing::debug!("task event stream connected");
                false
            }
            Ok(event @ TaskStreamEvent::Update { .. }) => {
                (self.on_update)(event);
                false
            }
            Ok(event @ TaskStreamEvent::Complete { .. }) => {
                self.closed.store(true, Ordering::SeqCst);
                (self.on_complete)(event);
                true
            }
            Ok(TaskStreamEvent::Error { message }) => {
                self.closed.store(true, Ordering::SeqCst);
                (self.on_error)(message.unwrap_or_else(|| "Task failed".to_string()));
                true
            }
            Err(err) => {
                tracing::debug!(%err, "task event stream failed");
                self.closed.store(true, Ordering::SeqCst);
                (self.on_error)(CONNECTION_LOST.to_string());
                true
            }
        }
    }
}

/// Drive a dispatcher from any event stream.
///
/// The connection is dropped before a terminal callback fires, so no
/// further events can be observed afterward.
async fn pump_events<S>(mut stream: S, dispatcher: ProgressDispatcher)
where
    S: Stream<Item = Result<TaskStreamEvent, ChatClientError>> + Unpin + Send,
{
    loop {
        match stream.next().await {
            Some(item) => {
                let terminal = item.is_err() || matches!(&item, Ok(ev) if ev.is_terminal());
                if terminal {
                    drop(stream);
                    dispatcher.dispatch(item);
                    return;
                }
                if dispatcher.dispatch(item) {
                    return;
                }
            }
            None => return,
        }
    }
}

/// Subscribe to a task's progress with callbacks.
///
/// Never fails synchronously; connection failures go through `on_error`.
/// At most one subscription per task should be open at a time — opening a
/// second one without cancelling the first leaks the first connection.
pub(crate) async fn stream_task_progress<U, C, E>(
    base_url: &url::Url,
    task_id: &str,
    auth: &AuthConfig,
    on_update: U,
    on_complete: C,
    on_error: E,
) -> TaskProgressHandle
where
    U: Fn(TaskStreamEvent) + Send + 'static,
    C: Fn(TaskStreamEvent) + Send + 'static,
    E: Fn(String) + Send + 'static,
{
    let closed = Arc::new(AtomicBool::new(false));
    let dispatcher = ProgressDispatcher {
        closed: Arc::clone(&closed),
        on_update: Box::new(on_update),
        on_complete: Box::new(on_complete),
        on_error: Box::new(on_error),
    };

    match TaskEventStream::connect(base_url, task_id, auth).await {
        Ok(stream) => {
            let pump = tokio::spawn(pump_events(stream, dispatcher));
            TaskProgressHandle::new(closed, Some(pump))
        }
        Err(err) => {
            tracing::warn!(%err, task_id, "failed to open task event stream");
            dispatcher.dispatch(Err(err));
            TaskProgressHandle::new(closed, None)
        }
    }
}
