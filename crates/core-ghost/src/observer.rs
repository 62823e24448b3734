//! Lifecycle notifications.
//!
//! Observers see every state transition of the engine. They are told about
//! ids, offsets and lengths only; suggestion text is never passed along so
//! that logging observers cannot leak it.

use crate::session::{Anchor, SessionId, SessionInfo};
use core_model::{ModelOffset, ViewError};
use core_text::BufferError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    Escape,
    Navigation,
    Pointer,
    EditOverlap,
    Superseded,
    External,
    /// Session torn down to perform its own commit.
    Commit,
}

impl CancelReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelReason::Escape => "escape",
            CancelReason::Navigation => "navigation",
            CancelReason::Pointer => "pointer",
            CancelReason::EditOverlap => "edit_overlap",
            CancelReason::Superseded => "superseded",
            CancelReason::External => "external",
            CancelReason::Commit => "commit",
        }
    }
}

/// Result of accepting a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Inserted {
        offset: ModelOffset,
        len: usize,
        caret: ModelOffset,
    },
    Failed,
}

#[allow(unused_variables)]
pub trait GhostObserver {
    fn shown(&mut self, info: &SessionInfo, lines: usize) {}
    fn shifted(&mut self, id: SessionId, from: Anchor, to: Anchor) {}
    fn cancelled(&mut self, id: SessionId, reason: CancelReason) {}
    fn committed(&mut self, id: SessionId, outcome: &CommitOutcome) {}
    fn commit_failed(&mut self, id: SessionId, error: &BufferError) {}
    fn paint_skipped(&mut self, id: SessionId, error: &ViewError) {}
}

/// Observer forwarding every notification to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl GhostObserver for TracingObserver {
    fn shown(&mut self, info: &SessionInfo, lines: usize) {
        tracing::info!(
            target: "ghost.session",
            id = %info.id,
            model = info.anchor.model.get(),
            view = info.anchor.view.get(),
            chars = info.text.chars().count(),
            lines,
            "shown"
        );
    }

    fn shifted(&mut self, id: SessionId, from: Anchor, to: Anchor) {
        tracing::debug!(
            target: "ghost.session",
            id = %id,
            from = from.model.get(),
            to = to.model.get(),
            view = to.view.get(),
            "shifted"
        );
    }

    fn cancelled(&mut self, id: SessionId, reason: CancelReason) {
        tracing::info!(target: "ghost.session", id = %id, reason = reason.as_str(), "cancelled");
    }

    fn committed(&mut self, id: SessionId, outcome: &CommitOutcome) {
        if let CommitOutcome::Inserted { offset, len, caret } = outcome {
            tracing::info!(
                target: "ghost.commit",
                id = %id,
                offset = offset.get(),
                len,
                caret = caret.get(),
                "committed"
            );
        }
    }

    fn commit_failed(&mut self, id: SessionId, error: &BufferError) {
        tracing::warn!(target: "ghost.commit", id = %id, error = %error, "commit_failed");
    }

    fn paint_skipped(&mut self, id: SessionId, error: &ViewError) {
        tracing::debug!(target: "ghost.paint", id = %id, error = %error, "paint_skipped");
    }
}
