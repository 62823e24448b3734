#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_ghost::{
    Anchor, CancelReason, CommitOutcome, GhostEngine, GhostObserver, GhostPolicy, Host, SessionId,
    SessionInfo,
};
use core_model::{FoldMap, LayoutRegion, ModelOffset, TextView};
use core_text::{Buffer, EditSubscription, TextBuffer};
use std::{cell::RefCell, rc::Rc};

/// Host-side state as a real editor would hold it: the buffer, folds that
/// follow edits, and a view rebuilt after each edit.
pub struct Fixture {
    pub buffer: Buffer,
    pub folds: FoldMap,
    pub view: TextView,
    edits: EditSubscription,
}

impl Fixture {
    pub fn new(text: &str) -> Self {
        Self::with_region(text, LayoutRegion::new(0, 0, 80, 24))
    }

    pub fn with_region(text: &str, region: LayoutRegion) -> Self {
        let mut buffer = Buffer::from_str("fixture", text).unwrap();
        let edits = buffer.subscribe();
        let folds = FoldMap::new();
        let mut view = TextView::new(region);
        view.sync(&buffer, &folds);
        Self {
            buffer,
            folds,
            view,
            edits,
        }
    }

    pub fn host(&mut self) -> Host<'_> {
        Host::new(&mut self.buffer, &self.folds, &mut self.view)
    }

    /// Apply queued edits to folds and rebuild the view.
    pub fn sync(&mut self) {
        for e in self.edits.drain() {
            self.folds.apply_edit(&e);
        }
        self.view.sync(&self.buffer, &self.folds);
    }

    /// Edit the document the way a user keystroke would: folds and view
    /// follow first, then the engine reconciles.
    pub fn edit(&mut self, engine: &mut GhostEngine, offset: usize, removed: usize, text: &str) {
        self.buffer.replace(offset, removed, text).unwrap();
        self.sync();
        engine.sync_edits(&mut self.host());
    }

    pub fn fold(&mut self, range: std::ops::Range<usize>) {
        assert!(self.folds.fold(range));
        self.view.sync(&self.buffer, &self.folds);
    }

    /// Subscriptions held by parties other than the engine.
    pub fn baseline_subscribers(&self) -> usize {
        1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    Shown(SessionId),
    Shifted { from: usize, to: usize },
    Cancelled(CancelReason),
    Committed(CommitOutcome),
    CommitFailed,
    PaintSkipped,
}

#[derive(Clone, Default)]
pub struct Recorder(Rc<RefCell<Vec<Note>>>);

impl Recorder {
    pub fn notes(&self) -> Vec<Note> {
        self.0.borrow().clone()
    }

    pub fn cancellations(&self) -> Vec<CancelReason> {
        self.0
            .borrow()
            .iter()
            .filter_map(|n| match n {
                Note::Cancelled(r) => Some(*r),
                _ => None,
            })
            .collect()
    }
}

impl GhostObserver for Recorder {
    fn shown(&mut self, info: &SessionInfo, _lines: usize) {
        self.0.borrow_mut().push(Note::Shown(info.id));
    }

    fn shifted(&mut self, _id: SessionId, from: Anchor, to: Anchor) {
        self.0.borrow_mut().push(Note::Shifted {
            from: from.model.get(),
            to: to.model.get(),
        });
    }

    fn cancelled(&mut self, _id: SessionId, reason: CancelReason) {
        self.0.borrow_mut().push(Note::Cancelled(reason));
    }

    fn committed(&mut self, _id: SessionId, outcome: &CommitOutcome) {
        self.0.borrow_mut().push(Note::Committed(*outcome));
    }

    fn commit_failed(&mut self, _id: SessionId, _error: &core_text::BufferError) {
        self.0.borrow_mut().push(Note::CommitFailed);
    }

    fn paint_skipped(&mut self, _id: SessionId, _error: &core_model::ViewError) {
        self.0.borrow_mut().push(Note::PaintSkipped);
    }
}

pub fn engine_with_recorder(policy: GhostPolicy) -> (GhostEngine, Recorder) {
    let mut engine = GhostEngine::new(policy);
    let rec = Recorder::default();
    engine.add_observer(Box::new(rec.clone()));
    (engine, rec)
}

pub fn show(engine: &mut GhostEngine, fx: &mut Fixture, offset: usize, text: &str) -> SessionInfo {
    engine
        .show(&mut fx.host(), ModelOffset(offset), Some(text))
        .expect("show should activate")
}
