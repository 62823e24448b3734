//! The ghost completion state machine.

use crate::observer::{CancelReason, CommitOutcome, GhostObserver, TracingObserver};
use crate::policy::{AnchorSeed, GhostPolicy};
use crate::reconcile::{Reconciliation, reconcile};
use crate::session::{Anchor, Session, SessionId, SessionInfo, Suggestion};
use core_events::{KeyCode, KeyEvent, MouseEvent};
use core_model::{Interest, ModelOffset, PositionMapper, View, ViewOffset};
use core_render::{LineMetrics, PaintSurface, paint_ghost};
use core_text::TextBuffer;
use std::collections::VecDeque;
use std::time::Instant;

/// Collaborators the engine works against for one call.
///
/// The host keeps ownership; the engine only borrows them for the duration
/// of an entry point. `mapper` must already reflect every edit the host has
/// seen (fold maps follow edits before the engine is called). After each
/// edit the host calls [`GhostEngine::sync_edits`] so queries such as
/// [`GhostEngine::is_active`] never report a session the edit invalidated.
pub struct Host<'a> {
    pub buffer: &'a mut dyn TextBuffer,
    pub mapper: &'a dyn PositionMapper,
    pub view: &'a mut dyn View,
}

impl<'a> Host<'a> {
    pub fn new(
        buffer: &'a mut dyn TextBuffer,
        mapper: &'a dyn PositionMapper,
        view: &'a mut dyn View,
    ) -> Self {
        Self {
            buffer,
            mapper,
            view,
        }
    }
}

/// Whether the host should run its default handling for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Consumed,
    PassThrough,
}

#[derive(Debug, Default)]
enum EngineState {
    #[default]
    Idle,
    Active(Session),
}

pub struct GhostEngine {
    state: EngineState,
    policy: GhostPolicy,
    next_id: u64,
    deferred: VecDeque<(Instant, ModelOffset)>,
    observers: Vec<Box<dyn GhostObserver>>,
}

impl Default for GhostEngine {
    fn default() -> Self {
        Self::new(GhostPolicy::default())
    }
}

impl GhostEngine {
    /// Engine with a [`TracingObserver`] attached.
    pub fn new(policy: GhostPolicy) -> Self {
        Self {
            state: EngineState::Idle,
            policy,
            next_id: 0,
            deferred: VecDeque::new(),
            observers: vec![Box::new(TracingObserver)],
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn GhostObserver>) {
        self.observers.push(observer);
    }

    pub fn policy(&self) -> &GhostPolicy {
        &self.policy
    }

    /// Replace the policy. An active session keeps its anchor; the new
    /// style and keys apply from the next call on.
    pub fn set_policy(&mut self, policy: GhostPolicy) {
        self.policy = policy;
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, EngineState::Active(_))
    }

    pub fn session(&self) -> Option<SessionInfo> {
        match &self.state {
            EngineState::Active(s) => Some(s.info()),
            EngineState::Idle => None,
        }
    }

    pub fn anchor(&self) -> Option<Anchor> {
        match &self.state {
            EngineState::Active(s) => Some(s.anchor),
            EngineState::Idle => None,
        }
    }

    /// Line count of the displayed suggestion, 0 when idle.
    pub fn suggestion_lines(&self) -> usize {
        match &self.state {
            EngineState::Active(s) => s.suggestion.line_count(),
            EngineState::Idle => 0,
        }
    }

    /// Display `suggestion` as ghost text anchored at `offset`.
    ///
    /// Blank or absent suggestions are refused without touching an existing
    /// session. A valid suggestion supersedes the current session.
    pub fn show(
        &mut self,
        host: &mut Host<'_>,
        offset: ModelOffset,
        suggestion: Option<&str>,
    ) -> Option<SessionInfo> {
        let Some(suggestion) = suggestion.and_then(Suggestion::new) else {
            tracing::trace!(target: "ghost.session", "show_refused_blank");
            return None;
        };
        self.cancel_with(host, CancelReason::Superseded);

        let model = offset.clamp_to(host.buffer.len());
        let Some(view) = self.seed_view(host, model) else {
            tracing::debug!(target: "ghost.session", model = model.get(), "show_aborted_unmapped");
            return None;
        };
        let view = view.clamp_to(host.view.char_count());

        self.next_id += 1;
        let edits = host.buffer.subscribe();
        let hook = host
            .view
            .attach(Interest::KEY | Interest::POINTER | Interest::PAINT);
        let session = Session {
            id: SessionId(self.next_id),
            anchor: Anchor { model, view },
            suggestion,
            edits,
            hook,
        };
        let info = session.info();
        let lines = session.suggestion.line_count();
        self.state = EngineState::Active(session);
        host.view.request_repaint();
        for o in &mut self.observers {
            o.shown(&info, lines);
        }
        Some(info)
    }

    fn seed_view(&self, host: &Host<'_>, model: ModelOffset) -> Option<ViewOffset> {
        let mapped = || host.mapper.model_to_view(model);
        let caret = || host.view.caret_offset();
        match self.policy.seed {
            AnchorSeed::ModelOffset => mapped().or_else(caret),
            AnchorSeed::Caret => caret().or_else(mapped),
        }
    }

    /// Discard the active session, if any. Never touches the document.
    pub fn cancel(&mut self, host: &mut Host<'_>) {
        self.cancel_with(host, CancelReason::External);
    }

    fn cancel_with(&mut self, host: &mut Host<'_>, reason: CancelReason) -> bool {
        let EngineState::Active(session) = std::mem::take(&mut self.state) else {
            return false;
        };
        host.buffer.unsubscribe(session.edits.id());
        host.view.detach(session.hook);
        host.view.request_repaint();
        for o in &mut self.observers {
            o.cancelled(session.id, reason);
        }
        true
    }

    /// Reconcile every edit published since the last call.
    ///
    /// Hosts call this right after applying an edit (and after their own
    /// mapper followed it). Every other entry point also starts here, so an
    /// edit is never missed, only observed late by the read-only queries.
    pub fn sync_edits(&mut self, host: &mut Host<'_>) {
        loop {
            let EngineState::Active(session) = &mut self.state else {
                return;
            };
            let Some(edit) = session.edits.next_edit() else {
                return;
            };
            match reconcile(session.anchor.model, &edit) {
                Reconciliation::Unaffected => {}
                Reconciliation::Overlap => {
                    tracing::debug!(
                        target: "ghost.session",
                        id = %session.id,
                        edit_offset = edit.offset,
                        removed = edit.removed,
                        "edit_overlaps_anchor"
                    );
                    self.cancel_with(host, CancelReason::EditOverlap);
                    return;
                }
                Reconciliation::Shifted { model, delta } => {
                    let from = session.anchor;
                    let view = host
                        .mapper
                        .model_to_view(model)
                        .unwrap_or_else(|| from.view.shift(delta))
                        .clamp_to(host.view.char_count());
                    session.anchor = Anchor { model, view };
                    host.view.request_repaint();
                    let (id, to) = (session.id, session.anchor);
                    for o in &mut self.observers {
                        o.shifted(id, from, to);
                    }
                }
            }
        }
    }

    /// Route a key press. Idle engines always pass keys through.
    pub fn handle_key(&mut self, host: &mut Host<'_>, key: KeyEvent) -> KeyDisposition {
        self.sync_edits(host);
        if !self.is_active() {
            return KeyDisposition::PassThrough;
        }
        if key.code == KeyCode::Esc {
            self.cancel_with(host, CancelReason::Escape);
            return KeyDisposition::Consumed;
        }
        if key == self.policy.accept_key {
            self.commit(host, Instant::now());
            return KeyDisposition::Consumed;
        }
        if key.code.is_navigation() {
            self.cancel_with(host, CancelReason::Navigation);
        }
        KeyDisposition::PassThrough
    }

    /// Any pointer press discards the session. Returns `true` if it did.
    pub fn handle_pointer_down(&mut self, host: &mut Host<'_>, event: &MouseEvent) -> bool {
        self.sync_edits(host);
        event.is_press() && self.cancel_with(host, CancelReason::Pointer)
    }

    /// Commit the active suggestion as if the accept key was pressed.
    pub fn accept(&mut self, host: &mut Host<'_>) -> Option<CommitOutcome> {
        self.sync_edits(host);
        self.is_active().then(|| self.commit(host, Instant::now()))
    }

    fn commit(&mut self, host: &mut Host<'_>, now: Instant) -> CommitOutcome {
        let (id, insert, text) = match &self.state {
            EngineState::Active(s) => (s.id, s.anchor.model, s.suggestion.as_str().to_owned()),
            EngineState::Idle => return CommitOutcome::Failed,
        };
        // Tear down first so the insertion below is not reconciled against
        // the session that produced it.
        self.cancel_with(host, CancelReason::Commit);

        let len = text.chars().count();
        let outcome = match host.buffer.replace(insert.get(), 0, &text) {
            Ok(_) => {
                let caret = ModelOffset(insert.get() + len);
                self.schedule_caret(host, caret, now);
                CommitOutcome::Inserted {
                    offset: insert,
                    len,
                    caret,
                }
            }
            Err(err) => {
                for o in &mut self.observers {
                    o.commit_failed(id, &err);
                }
                CommitOutcome::Failed
            }
        };
        if matches!(outcome, CommitOutcome::Inserted { .. }) {
            for o in &mut self.observers {
                o.committed(id, &outcome);
            }
        }
        outcome
    }

    /// Put the caret on `caret` now and again after each reassertion delay,
    /// for hosts whose own caret update may land after ours.
    pub fn reassert_caret(&mut self, host: &mut Host<'_>, caret: ModelOffset, now: Instant) {
        self.sync_edits(host);
        self.schedule_caret(host, caret, now);
    }

    /// A newer placement replaces whatever was still pending.
    fn schedule_caret(&mut self, host: &mut Host<'_>, caret: ModelOffset, now: Instant) {
        self.place_caret(host, caret);
        self.deferred.clear();
        // Delays are kept sorted, so the queue stays ordered by due time.
        for delay in self.policy.reassertion.delays() {
            self.deferred.push_back((now + *delay, caret));
        }
    }

    /// Drop pending caret reassertions, e.g. because the user moved the
    /// caret or typed since. Returns how many were dropped.
    pub fn discard_deferred(&mut self) -> usize {
        let dropped = self.deferred.len();
        self.deferred.clear();
        if dropped > 0 {
            tracing::trace!(target: "ghost.commit", dropped, "caret_reassertion_discarded");
        }
        dropped
    }

    fn place_caret(&self, host: &mut Host<'_>, caret: ModelOffset) {
        let caret = caret.clamp_to(host.buffer.len());
        let view = host
            .mapper
            .model_to_view(caret)
            .unwrap_or(ViewOffset(caret.get()))
            .clamp_to(host.view.char_count());
        host.view.set_caret(view);
    }

    /// Re-apply caret placements that are due at `now`. Returns how many ran.
    pub fn poll_deferred(&mut self, host: &mut Host<'_>, now: Instant) -> usize {
        self.sync_edits(host);
        let mut applied = 0;
        while let Some(&(due, caret)) = self.deferred.front() {
            if due > now {
                break;
            }
            self.deferred.pop_front();
            self.place_caret(host, caret);
            applied += 1;
        }
        if applied > 0 {
            tracing::trace!(target: "ghost.commit", applied, "caret_reasserted");
        }
        applied
    }

    /// Earliest pending caret reassertion.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deferred.front().map(|(due, _)| *due)
    }

    /// Paint the active suggestion. Returns the number of draw calls made; a
    /// frame whose anchor cannot be located is skipped, not cancelled.
    pub fn paint(&mut self, host: &mut Host<'_>, surface: &mut dyn PaintSurface) -> usize {
        self.sync_edits(host);
        let EngineState::Active(session) = &self.state else {
            return 0;
        };
        match host.view.location_at(session.anchor.view) {
            Ok(origin) => paint_ghost(
                surface,
                origin,
                session.suggestion.as_str(),
                &LineMetrics::from_view(&*host.view),
                &self.policy.style,
            ),
            Err(err) => {
                for o in &mut self.observers {
                    o.paint_skipped(session.id, &err);
                }
                0
            }
        }
    }
}

impl std::fmt::Debug for GhostEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GhostEngine")
            .field("state", &self.state)
            .field("policy", &self.policy)
            .field("deferred", &self.deferred.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}
