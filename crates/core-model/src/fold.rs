//! Collapsed regions and the projection they induce.
//!
//! A fold hides the half-open model range `[start, end)` from the view. The
//! view text is the document with every folded range removed, so:
//!
//! * a model offset strictly inside a fold has no view position (unresolved);
//! * a fold's `start` and `end` both map to the same view offset;
//! * a view offset sitting at a fold boundary maps back to the fold's `end`,
//!   the first model char that is actually visible there.
//!
//! Folds follow document edits with the same policy the ghost engine applies
//! to its anchor: edits entirely before a fold shift it, edits entirely after
//! leave it alone, and edits touching its interior drop it.
//!
//! Invariants: folds are sorted, non-empty and pairwise disjoint. Folds that
//! touch at creation time are merged; a later edit may leave two folds
//! touching, which the projection handles like one longer fold.

use crate::coords::{ModelOffset, ViewOffset};
use crate::mapper::PositionMapper;
use core_text::EditEvent;
use std::ops::Range;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldMap {
    folds: Vec<Range<usize>>,
}

impl FoldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folds(&self) -> &[Range<usize>] {
        &self.folds
    }

    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }

    /// Collapse `range`. Returns `false` for empty ranges or ranges that
    /// overlap an existing fold; touching folds are merged.
    pub fn fold(&mut self, range: Range<usize>) -> bool {
        if range.start >= range.end {
            return false;
        }
        if self
            .folds
            .iter()
            .any(|f| range.start < f.end && f.start < range.end)
        {
            return false;
        }
        let idx = self.folds.partition_point(|f| f.start < range.start);
        self.folds.insert(idx, range);
        self.merge_adjacent();
        true
    }

    /// Remove the fold containing or bounding `offset`.
    pub fn unfold_at(&mut self, offset: usize) -> Option<Range<usize>> {
        let idx = self
            .folds
            .iter()
            .position(|f| f.start <= offset && offset <= f.end)?;
        Some(self.folds.remove(idx))
    }

    /// Total hidden chars in folds ending at or before `offset`.
    pub fn hidden_before(&self, offset: usize) -> usize {
        self.folds
            .iter()
            .take_while(|f| f.end <= offset)
            .map(|f| f.end - f.start)
            .sum()
    }

    /// Reconcile folds with a completed document edit.
    pub fn apply_edit(&mut self, edit: &EditEvent) {
        let delta = edit.delta();
        let before = self.folds.len();
        self.folds.retain_mut(|f| {
            if edit.offset >= f.end {
                true
            } else if edit.removed_end() <= f.start {
                f.start = f.start.saturating_add_signed(delta);
                f.end = f.end.saturating_add_signed(delta);
                true
            } else {
                false
            }
        });
        if self.folds.len() != before {
            tracing::debug!(
                target: "view.fold",
                dropped = before - self.folds.len(),
                "folds_dropped_by_edit"
            );
        }
    }

    fn merge_adjacent(&mut self) {
        let mut merged: Vec<Range<usize>> = Vec::with_capacity(self.folds.len());
        for f in self.folds.drain(..) {
            match merged.last_mut() {
                Some(last) if last.end == f.start => last.end = f.end,
                _ => merged.push(f),
            }
        }
        self.folds = merged;
    }
}

impl PositionMapper for FoldMap {
    fn model_to_view(&self, offset: ModelOffset) -> Option<ViewOffset> {
        let m = offset.get();
        let mut hidden = 0;
        for f in &self.folds {
            if m <= f.start {
                break;
            }
            if m < f.end {
                return None;
            }
            hidden += f.end - f.start;
        }
        Some(ViewOffset(m - hidden))
    }

    fn view_to_model(&self, offset: ViewOffset) -> Option<ModelOffset> {
        let v = offset.get();
        let mut hidden = 0;
        for f in &self.folds {
            let view_start = f.start - hidden;
            if v < view_start {
                break;
            }
            hidden += f.end - f.start;
        }
        Some(ModelOffset(v + hidden))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folded(ranges: &[Range<usize>]) -> FoldMap {
        let mut fm = FoldMap::new();
        for r in ranges {
            assert!(fm.fold(r.clone()));
        }
        fm
    }

    #[test]
    fn offsets_inside_fold_are_unresolved() {
        let fm = folded(&[4..8]);
        assert_eq!(fm.model_to_view(ModelOffset(3)), Some(ViewOffset(3)));
        assert_eq!(fm.model_to_view(ModelOffset(4)), Some(ViewOffset(4)));
        assert_eq!(fm.model_to_view(ModelOffset(5)), None);
        assert_eq!(fm.model_to_view(ModelOffset(7)), None);
        assert_eq!(fm.model_to_view(ModelOffset(8)), Some(ViewOffset(4)));
        assert_eq!(fm.model_to_view(ModelOffset(10)), Some(ViewOffset(6)));
    }

    #[test]
    fn view_boundary_maps_to_first_visible_char() {
        let fm = folded(&[4..8, 10..12]);
        assert_eq!(fm.view_to_model(ViewOffset(3)), Some(ModelOffset(3)));
        assert_eq!(fm.view_to_model(ViewOffset(4)), Some(ModelOffset(8)));
        assert_eq!(fm.view_to_model(ViewOffset(5)), Some(ModelOffset(9)));
        assert_eq!(fm.view_to_model(ViewOffset(6)), Some(ModelOffset(12)));
    }

    #[test]
    fn overlapping_folds_rejected_touching_merged() {
        let mut fm = folded(&[2..4]);
        assert!(!fm.fold(3..6));
        assert!(!fm.fold(5..5));
        assert!(fm.fold(4..6));
        assert_eq!(fm.folds(), &[2..6]);
        assert_eq!(fm.unfold_at(6), Some(2..6));
        assert!(fm.is_empty());
    }

    #[test]
    fn edits_shift_keep_or_drop_folds() {
        let mut fm = folded(&[4..8, 12..14]);
        // Insert before both folds.
        fm.apply_edit(&EditEvent::new(0, 0, "ab"));
        assert_eq!(fm.folds(), &[6..10, 14..16]);
        // Edit after the first fold, before the second.
        fm.apply_edit(&EditEvent::new(11, 1, ""));
        assert_eq!(fm.folds(), &[6..10, 13..15]);
        // Edit touching the first fold's interior drops it.
        fm.apply_edit(&EditEvent::new(9, 2, "x"));
        assert_eq!(fm.folds(), &[12..14]);
        assert_eq!(fm.hidden_before(20), 2);
    }
}
