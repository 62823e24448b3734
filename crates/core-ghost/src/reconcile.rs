//! Anchor reconciliation against document edits.
//!
//! For an edit replacing `r` chars at `c` with text of length `t`
//! (`delta = t - r`) and an anchor at `A`:
//!
//! * `c > A`: the edit is entirely after the anchor; nothing moves.
//! * `c <= A < c + r`: the edit removes the char at the anchor (or spans it);
//!   the session cannot survive.
//! * otherwise the edit ends at or before the anchor: `A' = max(0, A + delta)`.
//!
//! An insertion exactly at the anchor (`c == A`, `r == 0`) pushes the anchor
//! right, so ghost text keeps trailing whatever was typed in front of it.

use core_model::ModelOffset;
use core_text::EditEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    Unaffected,
    Shifted { model: ModelOffset, delta: isize },
    Overlap,
}

pub fn reconcile(anchor: ModelOffset, edit: &EditEvent) -> Reconciliation {
    let a = anchor.get();
    if edit.offset > a {
        Reconciliation::Unaffected
    } else if edit.removed_end() > a {
        Reconciliation::Overlap
    } else {
        let delta = edit.delta();
        Reconciliation::Shifted {
            model: anchor.shift(delta),
            delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_before_anchor_shifts() {
        let r = reconcile(ModelOffset(3), &EditEvent::new(0, 0, "Z"));
        assert_eq!(
            r,
            Reconciliation::Shifted {
                model: ModelOffset(4),
                delta: 1
            }
        );
    }

    #[test]
    fn insertion_at_anchor_pushes_it() {
        let r = reconcile(ModelOffset(3), &EditEvent::new(3, 0, "ab"));
        assert!(matches!(r, Reconciliation::Shifted { model: ModelOffset(5), .. }));
    }

    #[test]
    fn removal_ending_at_anchor_shifts_left() {
        let r = reconcile(ModelOffset(3), &EditEvent::new(1, 2, ""));
        assert!(matches!(r, Reconciliation::Shifted { model: ModelOffset(1), delta: -2 }));
    }

    #[test]
    fn removal_spanning_anchor_overlaps() {
        assert_eq!(
            reconcile(ModelOffset(3), &EditEvent::new(2, 2, "Q")),
            Reconciliation::Overlap
        );
        assert_eq!(
            reconcile(ModelOffset(3), &EditEvent::new(3, 1, "")),
            Reconciliation::Overlap
        );
    }

    #[test]
    fn edits_after_anchor_are_ignored() {
        assert_eq!(
            reconcile(ModelOffset(3), &EditEvent::new(4, 10, "xyz")),
            Reconciliation::Unaffected
        );
    }
}
