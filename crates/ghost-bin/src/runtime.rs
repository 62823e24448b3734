//! The event loop: one bounded channel, one owner of editor state.

use crate::editor::{Editor, Outcome};
use anyhow::Result;
use core_assist::{CancelToken, CompletionRequest, CompletionWorker, SuggestionProvider};
use core_events::{
    CHANNEL_SEND_FAILURES, Event, KEYPRESS_TOTAL, SUGGESTIONS_DROPPED_STALE, SUGGESTIONS_POSTED,
};
use core_terminal::TerminalGuard;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Quit,
    ShutdownEvent,
    ChannelClosed,
}

impl ShutdownReason {
    fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::Quit => "quit",
            ShutdownReason::ShutdownEvent => "shutdown_event",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn log_shutdown_stage(reason: ShutdownReason, stage: &'static str) {
    info!(
        target: "runtime.shutdown",
        reason = reason.as_str(),
        stage = stage,
        "shutdown_stage"
    );
}

pub struct EditorRuntime<'a> {
    editor: Editor,
    provider: Arc<dyn SuggestionProvider>,
    rx: mpsc::Receiver<Event>,
    tx: Option<mpsc::Sender<Event>>,
    source_handles: Vec<JoinHandle<()>>,
    workers: Vec<JoinHandle<()>>,
    input_task: Option<JoinHandle<()>>,
    input_shutdown: Option<core_input::AsyncInputShutdown>,
    _terminal_guard: TerminalGuard<'a>,
}

impl<'a> EditorRuntime<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        editor: Editor,
        provider: Arc<dyn SuggestionProvider>,
        terminal_guard: TerminalGuard<'a>,
        tx: mpsc::Sender<Event>,
        rx: mpsc::Receiver<Event>,
        input_task: JoinHandle<()>,
        input_shutdown: core_input::AsyncInputShutdown,
        source_handles: Vec<JoinHandle<()>>,
    ) -> Self {
        Self {
            editor,
            provider,
            rx,
            tx: Some(tx),
            source_handles,
            workers: Vec::new(),
            input_task: Some(input_task),
            input_shutdown: Some(input_shutdown),
            _terminal_guard: terminal_guard,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.render();

        let loop_span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter_loop = loop_span.enter();

        let mut shutdown_reason = ShutdownReason::ChannelClosed;
        while let Some(event) = self.rx.recv().await {
            let outcome = match event {
                Event::Input(input) => self.editor.handle_input(&input),
                Event::Suggestion(suggestion) => {
                    self.editor.handle_suggestion(suggestion);
                    Outcome::Continue
                }
                Event::Tick => {
                    self.editor.handle_tick(Instant::now());
                    Outcome::Continue
                }
                Event::RenderRequested => Outcome::Continue,
                Event::Shutdown => {
                    shutdown_reason = ShutdownReason::ShutdownEvent;
                    break;
                }
            };
            match outcome {
                Outcome::Quit => {
                    shutdown_reason = ShutdownReason::Quit;
                    break;
                }
                Outcome::Complete(request, token) => self.spawn_worker(request, token),
                Outcome::Continue => {}
            }
            if self.editor.needs_render() {
                self.render();
            }
        }

        self.rx.close();
        self.finalize_shutdown(shutdown_reason).await;
        Ok(())
    }

    fn spawn_worker(&mut self, request: CompletionRequest, token: CancelToken) {
        let Some(tx) = self.tx.as_ref() else {
            warn!(target: "runtime", "worker_not_spawned_shutting_down");
            return;
        };
        self.workers.retain(|h| !h.is_finished());
        self.workers.push(CompletionWorker::spawn(
            self.provider.clone(),
            request,
            token,
            tx.clone(),
        ));
    }

    fn render(&mut self) {
        let writer = self.editor.frame();
        if let Err(e) = writer.flush() {
            error!(target: "runtime", ?e, "render_flush_error");
        }
    }

    async fn finalize_shutdown(&mut self, reason: ShutdownReason) {
        log_shutdown_stage(reason, "begin");
        if let Some(tx) = self.tx.take() {
            trace!(
                target: "runtime.shutdown",
                reason = reason.as_str(),
                "dropping_runtime_sender"
            );
            drop(tx);
        }

        // Workers may be blocked inside a provider; they hold a sender clone
        // but the receiver is closed so their post fails harmlessly.
        for handle in self.workers.drain(..) {
            handle.abort();
        }

        while let Some(handle) = self.source_handles.pop() {
            match tokio::time::timeout(Duration::from_millis(200), handle).await {
                Ok(Ok(_)) => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_stopped"
                ),
                Ok(Err(err)) if err.is_cancelled() => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_cancelled"
                ),
                Ok(Err(err)) => error!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    ?err,
                    "event_source_task_error"
                ),
                Err(_) => warn!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_timeout"
                ),
            }
        }

        if let Some(shutdown) = self.input_shutdown.take() {
            shutdown.signal();
        }
        if let Some(handle) = self.input_task.take() {
            match handle.await {
                Ok(_) => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_joined"
                ),
                Err(err) if err.is_cancelled() => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_cancelled"
                ),
                Err(err) => error!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    ?err,
                    "input_task_join_failed"
                ),
            }
        }

        info!(
            target: "runtime.shutdown",
            keypresses = KEYPRESS_TOTAL.load(Ordering::Relaxed),
            suggestions_posted = SUGGESTIONS_POSTED.load(Ordering::Relaxed),
            suggestions_dropped_stale = SUGGESTIONS_DROPPED_STALE.load(Ordering::Relaxed),
            channel_send_failures = CHANNEL_SEND_FAILURES.load(Ordering::Relaxed),
            "telemetry"
        );
        log_shutdown_stage(reason, "complete");
    }
}
