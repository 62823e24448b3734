//! Worker hand-off.
//!
//! The provider runs on tokio's blocking pool. Its only way back to the
//! editor is a single `Event::Suggestion` posted to the owning loop's
//! channel; the worker never sees the buffer or the view.

use crate::cancel::CancelToken;
use crate::provider::{ProviderError, SuggestionProvider};
use crate::request::CompletionRequest;
use core_events::{CHANNEL_SEND_FAILURES, Event, SUGGESTIONS_POSTED, SuggestionEvent};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

pub struct CompletionWorker;

impl CompletionWorker {
    /// Run `provider` for `request` and post the outcome to `tx`.
    pub fn spawn(
        provider: Arc<dyn SuggestionProvider>,
        request: CompletionRequest,
        cancel: CancelToken,
        tx: Sender<Event>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let id = request.id;
            let trigger_offset = request.trigger_offset;
            tracing::debug!(
                target: "assist.worker",
                id = %id,
                provider = provider.name(),
                trigger_offset,
                context_chars = request.context.text.chars().count(),
                "request_started"
            );
            let token = cancel.clone();
            let joined =
                tokio::task::spawn_blocking(move || provider.suggest(&request, &token)).await;
            let event = match joined {
                _ if cancel.is_cancelled() => SuggestionEvent::Cancelled { id },
                Ok(Ok(Some(text))) if !text.trim().is_empty() => SuggestionEvent::Ready {
                    id,
                    trigger_offset,
                    text,
                },
                Ok(Ok(_)) => SuggestionEvent::Empty { id },
                Ok(Err(ProviderError::Cancelled)) => SuggestionEvent::Cancelled { id },
                Ok(Err(err)) => SuggestionEvent::Failed {
                    id,
                    reason: err.to_string(),
                },
                Err(join_err) => SuggestionEvent::Failed {
                    id,
                    reason: format!("worker panicked: {join_err}"),
                },
            };
            log_outcome(&event);
            if tx.send(Event::Suggestion(event)).await.is_err() {
                CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(target: "assist.worker", id = %id, "event_channel_closed");
            } else {
                SUGGESTIONS_POSTED.fetch_add(1, Ordering::Relaxed);
            }
        })
    }
}

fn log_outcome(event: &SuggestionEvent) {
    match event {
        SuggestionEvent::Ready { id, text, .. } => tracing::info!(
            target: "assist.worker",
            id = %id,
            chars = text.chars().count(),
            lines = text.lines().count(),
            "suggestion_ready"
        ),
        SuggestionEvent::Empty { id } => {
            tracing::info!(target: "assist.worker", id = %id, "suggestion_empty")
        }
        SuggestionEvent::Failed { id, reason } => {
            tracing::warn!(target: "assist.worker", id = %id, reason = reason.as_str(), "suggestion_failed")
        }
        SuggestionEvent::Cancelled { id } => {
            tracing::debug!(target: "assist.worker", id = %id, "suggestion_cancelled")
        }
    }
}
