//! Request bookkeeping on the owning thread.

use crate::cancel::CancelToken;
use crate::context::{ContextWindow, DEFAULT_CONTEXT_AFTER, DEFAULT_CONTEXT_BEFORE};
use crate::request::CompletionRequest;
use core_events::RequestId;
use core_text::{BufferError, TextBuffer};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistSettings {
    pub context_before: usize,
    pub context_after: usize,
    pub stale_tolerance: usize,
    /// Simulated provider latency for the static provider.
    pub latency: Duration,
}

impl Default for AssistSettings {
    fn default() -> Self {
        Self {
            context_before: DEFAULT_CONTEXT_BEFORE,
            context_after: DEFAULT_CONTEXT_AFTER,
            stale_tolerance: StalenessGate::DEFAULT_TOLERANCE,
            latency: Duration::ZERO,
        }
    }
}

/// Decides whether a returned suggestion is still relevant to where the
/// caret is now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessGate {
    tolerance: usize,
}

impl Default for StalenessGate {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TOLERANCE)
    }
}

impl StalenessGate {
    pub const DEFAULT_TOLERANCE: usize = 1;

    pub fn new(tolerance: usize) -> Self {
        Self { tolerance }
    }

    pub fn accepts(&self, trigger_offset: usize, current_caret: usize) -> bool {
        trigger_offset.abs_diff(current_caret) <= self.tolerance
    }
}

/// Issues requests with increasing ids and keeps only the newest alive.
#[derive(Debug)]
pub struct CompletionTrigger {
    settings: AssistSettings,
    gate: StalenessGate,
    next_id: u64,
    in_flight: Option<(RequestId, CancelToken)>,
}

impl CompletionTrigger {
    pub fn new(settings: AssistSettings) -> Self {
        Self {
            gate: StalenessGate::new(settings.stale_tolerance),
            settings,
            next_id: 0,
            in_flight: None,
        }
    }

    pub fn settings(&self) -> &AssistSettings {
        &self.settings
    }

    pub fn gate(&self) -> StalenessGate {
        self.gate
    }

    /// Build a request at `caret`, cancelling whatever was still running.
    pub fn begin(
        &mut self,
        buffer: &dyn TextBuffer,
        caret: usize,
    ) -> Result<(CompletionRequest, CancelToken), BufferError> {
        self.abort();
        let context = ContextWindow::capture(
            buffer,
            caret,
            self.settings.context_before,
            self.settings.context_after,
        )?;
        self.next_id += 1;
        let id = RequestId(self.next_id);
        let token = CancelToken::new();
        self.in_flight = Some((id, token.clone()));
        let request = CompletionRequest {
            id,
            trigger_offset: caret.min(buffer.len()),
            context,
        };
        tracing::info!(
            target: "assist.worker",
            id = %id,
            trigger_offset = request.trigger_offset,
            cursor_in_context = request.context.cursor_in_context,
            "request_issued"
        );
        Ok((request, token))
    }

    /// Cancel the in-flight request, if any.
    pub fn abort(&mut self) -> Option<RequestId> {
        let (id, token) = self.in_flight.take()?;
        token.cancel();
        tracing::debug!(target: "assist.worker", id = %id, "request_aborted");
        Some(id)
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight.as_ref().map(|(id, _)| *id)
    }

    /// Mark `id` finished. Returns `false` for results of superseded or
    /// aborted requests, which callers should drop.
    pub fn complete(&mut self, id: RequestId) -> bool {
        match self.in_flight {
            Some((current, _)) if current == id => {
                self.in_flight = None;
                true
            }
            _ => false,
        }
    }
}
