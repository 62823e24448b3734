//! Editor state owned by the event loop thread.
//!
//! `Editor` is synchronous and terminal-free: the runtime feeds it events and
//! flushes the `Writer` it produces. Completion requests are returned to the
//! runtime as [`Outcome::Complete`] so that spawning workers stays outside.
//!
//! Ordering rule: every buffer mutation is followed by [`Editor::sync`],
//! which moves folds and view first and then lets the ghost engine
//! reconcile, so the engine maps through a fold map that already reflects
//! the edit and never reports a session the edit invalidated.

use core_assist::{AssistSettings, CancelToken, CompletionRequest, CompletionTrigger};
use core_events::{
    InputEvent, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    SUGGESTIONS_DROPPED_STALE, SuggestionEvent,
};
use core_ghost::{GhostEngine, GhostPolicy, Host, KeyDisposition};
use core_model::{
    CaretMotion, FoldMap, Layout, LayoutRegion, ModelOffset, PositionMapper, TextView, View,
};
use core_render::{
    GhostIndicator, StatusContext, TerminalSurface, Writer, build_status, normalize_line_breaks,
    place_caret, render_status, render_view,
};
use core_text::{Buffer, EditSubscription, TextBuffer};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const MESSAGE_TTL: Duration = Duration::from_secs(3);
const TAB_TEXT: &str = "    ";
const SCROLL_MARGIN: usize = 2;

/// What the runtime should do after an event.
#[derive(Debug)]
pub enum Outcome {
    Continue,
    Quit,
    /// Run a completion request on a worker.
    Complete(CompletionRequest, CancelToken),
}

pub struct Editor {
    buffer: Buffer,
    folds: FoldMap,
    view: TextView,
    edits: EditSubscription,
    engine: GhostEngine,
    trigger: CompletionTrigger,
    status_region: LayoutRegion,
    path: Option<PathBuf>,
    dirty: bool,
    message: Option<(String, Instant)>,
    last_status: String,
}

impl Editor {
    pub fn new(
        mut buffer: Buffer,
        path: Option<PathBuf>,
        layout: Layout,
        policy: GhostPolicy,
        settings: AssistSettings,
    ) -> Self {
        let edits = buffer.subscribe();
        let folds = FoldMap::new();
        let mut view = TextView::new(layout.editor).with_scroll_margin(SCROLL_MARGIN);
        view.sync(&buffer, &folds);
        Self {
            buffer,
            folds,
            view,
            edits,
            engine: GhostEngine::new(policy),
            trigger: CompletionTrigger::new(settings),
            status_region: layout.status,
            path,
            dirty: false,
            message: None,
            last_status: String::new(),
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn view(&self) -> &TextView {
        &self.view
    }

    pub fn folds(&self) -> &FoldMap {
        &self.folds
    }

    pub fn engine(&self) -> &GhostEngine {
        &self.engine
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|(m, _)| m.as_str())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Show a transient status message.
    pub fn flash(&mut self, message: impl Into<String>) {
        self.message = Some((message.into(), Instant::now() + MESSAGE_TTL));
    }

    /// Model offset under the caret.
    pub fn caret_model(&self) -> usize {
        let caret = self.view.caret_offset().unwrap_or_default();
        self.folds
            .view_to_model(caret)
            .map_or(caret.get(), |m| m.get())
            .min(self.buffer.len())
    }

    /// Put the caret on model offset `offset`; offsets hidden by a fold land
    /// on the fold's start.
    pub fn set_caret_model(&mut self, offset: usize) {
        let offset = offset.min(self.buffer.len());
        let visible = self
            .folds
            .folds()
            .iter()
            .find(|f| f.start < offset && offset < f.end)
            .map_or(offset, |f| f.start);
        if let Some(v) = self.folds.model_to_view(ModelOffset(visible)) {
            self.view.set_caret(v);
        }
    }

    /// Fold and view follow every edit queued on the host subscription,
    /// then the engine reconciles its anchor against the same edits.
    pub fn sync(&mut self) {
        let edits = self.edits.drain();
        if edits.is_empty() {
            return;
        }
        for edit in &edits {
            self.folds.apply_edit(edit);
        }
        self.dirty = true;
        self.view.sync(&self.buffer, &self.folds);
        let mut host = Host::new(&mut self.buffer, &self.folds, &mut self.view);
        self.engine.sync_edits(&mut host);
    }

    fn edit(&mut self, offset: usize, removed: usize, text: &str) -> bool {
        match self.buffer.replace(offset, removed, text) {
            Ok(ev) => {
                self.sync();
                self.set_caret_model(offset + ev.inserted_len());
                true
            }
            Err(err) => {
                warn!(target: "text.edit", %err, "edit_rejected");
                false
            }
        }
    }

    fn insert_at_caret(&mut self, text: &str) {
        let caret = self.caret_model();
        self.edit(caret, 0, text);
    }

    /// Re-sync after the engine touched the buffer and run any caret
    /// placement that is due.
    fn after_engine(&mut self, now: Instant) {
        self.sync();
        let mut host = Host::new(&mut self.buffer, &self.folds, &mut self.view);
        self.engine.poll_deferred(&mut host, now);
    }

    pub fn handle_input(&mut self, input: &InputEvent) -> Outcome {
        match input {
            InputEvent::Key(key) => self.handle_key(*key),
            InputEvent::CtrlC => Outcome::Quit,
            InputEvent::Mouse(m) => {
                self.handle_mouse(m);
                Outcome::Continue
            }
            InputEvent::Resize(w, h) => {
                self.handle_resize(*w, *h);
                Outcome::Continue
            }
            InputEvent::Paste(text) => {
                let text = normalize_line_breaks(text);
                self.engine.discard_deferred();
                self.insert_at_caret(&text);
                Outcome::Continue
            }
            InputEvent::FocusGained | InputEvent::FocusLost => Outcome::Continue,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Outcome {
        if key == KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CTRL) {
            return Outcome::Quit;
        }
        let disposition = {
            let mut host = Host::new(&mut self.buffer, &self.folds, &mut self.view);
            self.engine.handle_key(&mut host, key)
        };
        if disposition == KeyDisposition::Consumed {
            self.after_engine(Instant::now());
            return Outcome::Continue;
        }
        // The user acts on the caret from here; stop snapping it back.
        self.engine.discard_deferred();

        let ctrl = key.mods.contains(KeyModifiers::CTRL);
        let alt = key.mods.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Char(' ') if ctrl => return self.request_completion(),
            KeyCode::Char('f') if ctrl => self.toggle_fold(),
            KeyCode::Char('s') if ctrl => self.save(),
            KeyCode::Char(c) if !ctrl && !alt => self.insert_at_caret(&c.to_string()),
            KeyCode::Enter => self.insert_at_caret("\n"),
            KeyCode::Tab if key.mods.is_empty() => self.insert_at_caret(TAB_TEXT),
            KeyCode::Backspace => {
                let caret = self.caret_model();
                if caret > 0 {
                    self.edit(caret - 1, 1, "");
                }
            }
            KeyCode::Delete => {
                let caret = self.caret_model();
                if caret < self.buffer.len() {
                    self.edit(caret, 1, "");
                }
            }
            KeyCode::Esc => {
                if let Some(id) = self.trigger.abort() {
                    debug!(target: "assist.worker", id = %id, "request_dismissed");
                }
            }
            code => {
                if let Some(motion) = motion_for(code) {
                    self.view.move_caret(motion);
                }
            }
        }
        Outcome::Continue
    }

    fn request_completion(&mut self) -> Outcome {
        let caret = self.caret_model();
        match self.trigger.begin(&self.buffer, caret) {
            Ok((request, token)) => {
                self.view.request_repaint();
                Outcome::Complete(request, token)
            }
            Err(err) => {
                warn!(target: "assist.worker", %err, "request_not_issued");
                Outcome::Continue
            }
        }
    }

    pub fn handle_suggestion(&mut self, event: SuggestionEvent) {
        let id = event.id();
        if !self.trigger.complete(id) {
            debug!(target: "assist.worker", id = %id, "suggestion_superseded");
            return;
        }
        self.view.request_repaint();
        match event {
            SuggestionEvent::Ready {
                trigger_offset,
                text,
                ..
            } => {
                let caret = self.caret_model();
                if !self.trigger.gate().accepts(trigger_offset, caret) {
                    SUGGESTIONS_DROPPED_STALE.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        target: "assist.worker",
                        id = %id,
                        trigger_offset,
                        caret,
                        "suggestion_stale"
                    );
                    return;
                }
                let mut host = Host::new(&mut self.buffer, &self.folds, &mut self.view);
                let at = ModelOffset(trigger_offset);
                if self.engine.show(&mut host, at, Some(&text)).is_some() {
                    self.engine.reassert_caret(&mut host, at, Instant::now());
                }
            }
            SuggestionEvent::Empty { .. } => self.flash("no suggestion"),
            SuggestionEvent::Failed { .. } => self.flash("completion failed"),
            SuggestionEvent::Cancelled { .. } => {}
        }
    }

    fn handle_mouse(&mut self, event: &MouseEvent) {
        {
            let mut host = Host::new(&mut self.buffer, &self.folds, &mut self.view);
            self.engine.handle_pointer_down(&mut host, event);
            if event.is_press() {
                self.engine.discard_deferred();
            }
        }
        if event.kind == MouseEventKind::Down(MouseButton::Left)
            && let Some(offset) = self.view.hit_test(event.column, event.row)
        {
            self.view.set_caret(offset);
        }
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) {
        let layout = Layout::for_terminal(width, height);
        self.view.set_region(layout.editor);
        self.status_region = layout.status;
        debug!(target: "runtime", width, height, "resized");
    }

    /// Periodic housekeeping: deferred caret placement and message expiry.
    pub fn handle_tick(&mut self, now: Instant) {
        {
            let mut host = Host::new(&mut self.buffer, &self.folds, &mut self.view);
            self.engine.poll_deferred(&mut host, now);
        }
        if self.message.as_ref().is_some_and(|(_, until)| *until <= now) {
            self.message = None;
        }
    }

    /// Collapse the line below the caret into the caret line, or expand it
    /// again. Any ghost text is dismissed first since its painted position
    /// would no longer match.
    fn toggle_fold(&mut self) {
        let caret = self.caret_model();
        let line = self.buffer.char_to_line(caret);
        if line + 1 >= self.buffer.line_count() {
            self.flash("nothing to fold");
            return;
        }
        {
            let mut host = Host::new(&mut self.buffer, &self.folds, &mut self.view);
            self.engine.cancel(&mut host);
        }
        let start = self.buffer.line_to_char(line) + self.buffer.line_len(line);
        let end = self.buffer.line_to_char(line + 1) + self.buffer.line_len(line + 1);
        let changed = match self.folds.unfold_at(start) {
            Some(_) => true,
            None => self.folds.fold(start..end),
        };
        if changed {
            debug!(target: "view.fold", start, end, folds = self.folds.folds().len(), "fold_toggled");
            self.view.sync(&self.buffer, &self.folds);
            self.set_caret_model(caret);
        }
    }

    fn save(&mut self) {
        let Some(path) = self.path.clone() else {
            self.flash("no file name");
            return;
        };
        match std::fs::write(&path, self.buffer.text()) {
            Ok(()) => {
                info!(target: "io", file = %path.display(), chars = self.buffer.len(), "file_saved");
                self.dirty = false;
                self.flash("saved");
            }
            Err(e) => {
                error!(target: "io", file = %path.display(), ?e, "file_save_error");
                self.flash("save failed");
            }
        }
    }

    pub fn status_text(&self) -> String {
        let caret = self.caret_model();
        let line = self.buffer.char_to_line(caret);
        let col = caret - self.buffer.line_to_char(line);
        let ghost = if self.engine.is_active() {
            GhostIndicator::Showing {
                lines: self.engine.suggestion_lines(),
            }
        } else if self.trigger.in_flight().is_some() {
            GhostIndicator::Pending
        } else {
            GhostIndicator::Idle
        };
        build_status(&StatusContext {
            file_name: self.path.as_deref(),
            dirty: self.dirty,
            line,
            col,
            ghost,
            message: self.message(),
        })
    }

    pub fn needs_render(&self) -> bool {
        self.view.needs_repaint() || self.status_text() != self.last_status
    }

    /// Build a full frame: document, status row, ghost overlay, caret.
    pub fn frame(&mut self) -> Writer {
        let status = self.status_text();
        let mut writer = Writer::new();
        writer.hide_cursor();
        render_view(&mut writer, &self.view);
        render_status(&mut writer, self.status_region, &status);
        {
            let right = self.view.region().right();
            let mut surface = TerminalSurface::new(&mut writer, right);
            let mut host = Host::new(&mut self.buffer, &self.folds, &mut self.view);
            self.engine.paint(&mut host, &mut surface);
        }
        place_caret(&mut writer, &self.view);
        self.view.take_repaint();
        self.last_status = status;
        writer
    }
}

fn motion_for(code: KeyCode) -> Option<CaretMotion> {
    Some(match code {
        KeyCode::Left => CaretMotion::Left,
        KeyCode::Right => CaretMotion::Right,
        KeyCode::Up => CaretMotion::Up,
        KeyCode::Down => CaretMotion::Down,
        KeyCode::Home => CaretMotion::LineStart,
        KeyCode::End => CaretMotion::LineEnd,
        KeyCode::PageUp => CaretMotion::PageUp,
        KeyCode::PageDown => CaretMotion::PageDown,
        _ => return None,
    })
}
