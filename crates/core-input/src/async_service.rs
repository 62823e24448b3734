use crate::translate::translate;
use core_events::{CHANNEL_SEND_FAILURES, Event, InputEvent, KEYPRESS_TOTAL};
use crossterm::event::{Event as CEvent, EventStream};
use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::{Notify, mpsc::Sender};
use tokio::task;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, trace, warn};

#[derive(Clone, Debug)]
pub struct AsyncInputShutdown {
    notify: Arc<Notify>,
}

impl AsyncInputShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone, Debug)]
struct ShutdownListener {
    notify: Arc<Notify>,
}

impl ShutdownListener {
    fn new_pair() -> (AsyncInputShutdown, Self) {
        let notify = Arc::new(Notify::new());
        (
            AsyncInputShutdown {
                notify: notify.clone(),
            },
            ShutdownListener { notify },
        )
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Spawn the input task over crossterm's `EventStream`.
pub(crate) fn spawn_terminal_task(
    sender: Sender<Event>,
) -> (task::JoinHandle<()>, AsyncInputShutdown) {
    spawn_stream_task(sender, EventStream::new())
}

/// Spawn the input task over any stream of terminal events.
pub(crate) fn spawn_stream_task<S>(
    sender: Sender<Event>,
    stream: S,
) -> (task::JoinHandle<()>, AsyncInputShutdown)
where
    S: Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
{
    let (shutdown, listener) = ShutdownListener::new_pair();
    let handle = task::spawn(InputStreamTask::new(sender, stream, listener).run());
    (handle, shutdown)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    ShutdownSignal,
    ChannelClosed,
    StreamEnded,
    StreamError,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::ShutdownSignal => "shutdown_signal",
            ExitReason::ChannelClosed => "channel_closed",
            ExitReason::StreamEnded => "stream_ended",
            ExitReason::StreamError => "stream_error",
        }
    }
}

struct InputStreamTask<S> {
    sender: Sender<Event>,
    stream: S,
    shutdown: ShutdownListener,
}

impl<S> InputStreamTask<S>
where
    S: Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
{
    fn new(sender: Sender<Event>, stream: S, shutdown: ShutdownListener) -> Self {
        Self {
            sender,
            stream,
            shutdown,
        }
    }

    async fn run(mut self) {
        info!(target: "input", "input_task_started");
        let reason = loop {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.wait() => break ExitReason::ShutdownSignal,
                next = self.stream.next() => next,
            };
            let event = match next {
                None => break ExitReason::StreamEnded,
                Some(Err(err)) => {
                    warn!(target: "input", error_kind = ?err.kind(), "input_stream_error");
                    break ExitReason::StreamError;
                }
                Some(Ok(event)) => event,
            };
            let Some(input) = translate(event) else {
                continue;
            };
            log_input(&input);
            let is_key = matches!(input, InputEvent::Key(_));
            if self.sender.send(Event::Input(input)).await.is_err() {
                CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                break ExitReason::ChannelClosed;
            }
            if is_key {
                KEYPRESS_TOTAL.fetch_add(1, Ordering::Relaxed);
            }
        };
        info!(target: "input", reason = reason.as_str(), "input_task_stopped");
    }
}

/// Keys are logged by code only; pasted text by length.
pub(crate) fn log_input(input: &InputEvent) {
    match input {
        InputEvent::Key(key) => {
            trace!(target: "input", kind = "key", code = ?key.code, mods = ?key.mods)
        }
        InputEvent::Paste(data) => trace!(target: "input", kind = "paste", len = data.len()),
        InputEvent::Resize(w, h) => trace!(target: "input", kind = "resize", w, h),
        InputEvent::Mouse(m) => {
            trace!(target: "input", kind = "mouse", column = m.column, row = m.row)
        }
        InputEvent::CtrlC | InputEvent::FocusGained | InputEvent::FocusLost => {
            trace!(target: "input", kind = ?input)
        }
    }
}
