//! Terminal text view.
//!
//! `TextView` renders the fold projection of a [`Buffer`] into a
//! [`LayoutRegion`]: a line-number gutter followed by the projected text, one
//! terminal row per line, scrolled vertically so the caret stays visible.
//!
//! The projection is rebuilt by [`TextView::sync`] whenever the buffer or the
//! fold map changes; between syncs the view answers geometry queries from its
//! cached lines only.
//!
//! Invariants:
//! * `lines` is never empty (an empty document projects to one empty line).
//! * `line_starts[i]` is the view offset of the first char of `lines[i]`;
//!   line breaks occupy one view offset at the end of their line.
//! * The caret, when set, is within `[0, char_count]`.

use crate::coords::{ModelOffset, ViewOffset};
use crate::fold::FoldMap;
use crate::hooks::{HookId, HookRegistry, Interest};
use crate::layout::LayoutRegion;
use crate::mapper::PositionMapper;
use crate::view::{Point, View, ViewError};
use core_text::{Buffer, grapheme};

/// Caret movement requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretMotion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    PageUp,
    PageDown,
}

/// A projected row ready for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleLine<'a> {
    /// Screen row.
    pub row: u16,
    /// 1-based document line number shown in the gutter.
    pub number: Option<usize>,
    pub text: &'a str,
    /// A collapsed fold starts on this line.
    pub folded: bool,
}

#[derive(Debug)]
pub struct TextView {
    region: LayoutRegion,
    lines: Vec<String>,
    line_starts: Vec<usize>,
    model_lines: Vec<Option<usize>>,
    fold_lines: Vec<usize>,
    char_count: usize,
    caret: Option<ViewOffset>,
    first_line: usize,
    scroll_margin: usize,
    gutter_width: u16,
    hooks: HookRegistry,
    repaint: bool,
}

impl TextView {
    pub fn new(region: LayoutRegion) -> Self {
        Self {
            region,
            lines: vec![String::new()],
            line_starts: vec![0],
            model_lines: vec![Some(0)],
            fold_lines: Vec::new(),
            char_count: 0,
            caret: Some(ViewOffset(0)),
            first_line: 0,
            scroll_margin: 0,
            gutter_width: 0,
            hooks: HookRegistry::new(),
            repaint: true,
        }
    }

    pub fn with_scroll_margin(mut self, margin: usize) -> Self {
        self.scroll_margin = margin;
        self
    }

    pub fn region(&self) -> LayoutRegion {
        self.region
    }

    pub fn set_region(&mut self, region: LayoutRegion) {
        self.region = region;
        self.gutter_width = gutter_width_for(self.highest_line_number(), region.width);
        self.scroll_to_caret();
        self.repaint = true;
    }

    pub fn first_line(&self) -> usize {
        self.first_line
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn gutter_width(&self) -> u16 {
        self.gutter_width
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Rebuild the projection from `buffer` with `folds` collapsed.
    pub fn sync(&mut self, buffer: &Buffer, folds: &FoldMap) {
        let text = buffer.text();
        let mut projected = String::with_capacity(text.len());
        let mut pending = folds.folds().iter().peekable();
        for (i, ch) in text.chars().enumerate() {
            while pending.next_if(|f| f.end <= i).is_some() {}
            if pending.peek().is_some_and(|f| f.start <= i) {
                continue;
            }
            projected.push(ch);
        }

        self.lines = projected.split('\n').map(str::to_owned).collect();
        self.line_starts.clear();
        let mut start = 0;
        for line in &self.lines {
            self.line_starts.push(start);
            start += line.chars().count() + 1;
        }
        self.char_count = start.saturating_sub(1);
        self.model_lines = self
            .line_starts
            .iter()
            .map(|&v| {
                folds
                    .view_to_model(ViewOffset(v))
                    .map(|m| buffer.char_to_line(m.get()) + 1)
            })
            .collect();
        self.fold_lines = folds
            .folds()
            .iter()
            .filter_map(|f| folds.model_to_view(ModelOffset(f.start)))
            .map(|v| self.offset_to_line(v))
            .collect();
        self.gutter_width = gutter_width_for(self.highest_line_number(), self.region.width);

        if let Some(c) = self.caret {
            self.caret = Some(c.clamp_to(self.char_count));
        }
        self.first_line = self.first_line.min(self.lines.len() - 1);
        self.scroll_to_caret();
        self.repaint = true;
        tracing::trace!(
            target: "view.sync",
            lines = self.lines.len(),
            chars = self.char_count,
            folds = folds.folds().len(),
            "projection_rebuilt"
        );
    }

    fn highest_line_number(&self) -> usize {
        self.model_lines.iter().flatten().copied().max().unwrap_or(1)
    }

    /// Consume the pending repaint request.
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.repaint)
    }

    pub fn needs_repaint(&self) -> bool {
        self.repaint
    }

    /// Line index containing view offset `offset` (clamped to the last line).
    pub fn offset_to_line(&self, offset: ViewOffset) -> usize {
        self.line_starts
            .partition_point(|&s| s <= offset.get())
            .saturating_sub(1)
    }

    /// Char length of projected line `idx`.
    pub fn line_len(&self, idx: usize) -> usize {
        self.lines.get(idx).map_or(0, |l| l.chars().count())
    }

    pub fn line_start(&self, idx: usize) -> ViewOffset {
        ViewOffset(self.line_starts.get(idx).copied().unwrap_or(self.char_count))
    }

    /// Move the caret; returns `true` when it changed.
    pub fn move_caret(&mut self, motion: CaretMotion) -> bool {
        let cur = self.caret.unwrap_or_default();
        let line = self.offset_to_line(cur);
        let col = cur.get() - self.line_starts[line];
        let page = usize::from(self.region.height.max(1));
        let target = match motion {
            CaretMotion::Left => cur.shift(-1),
            CaretMotion::Right => ViewOffset((cur.get() + 1).min(self.char_count)),
            CaretMotion::LineStart => self.line_start(line),
            CaretMotion::LineEnd => ViewOffset(self.line_starts[line] + self.line_len(line)),
            CaretMotion::Up => self.offset_in_line(line.saturating_sub(1), col),
            CaretMotion::Down => self.offset_in_line(line + 1, col),
            CaretMotion::PageUp => self.offset_in_line(line.saturating_sub(page), col),
            CaretMotion::PageDown => self.offset_in_line(line + page, col),
        };
        let changed = Some(target) != self.caret;
        self.set_caret(target);
        changed
    }

    fn offset_in_line(&self, line: usize, col: usize) -> ViewOffset {
        let line = line.min(self.lines.len() - 1);
        ViewOffset(self.line_starts[line] + col.min(self.line_len(line)))
    }

    /// Scroll so the caret line is inside the viewport. Returns `true` if the
    /// first visible line changed.
    pub fn scroll_to_caret(&mut self) -> bool {
        let Some(caret) = self.caret else {
            return false;
        };
        let line = self.offset_to_line(caret);
        match compute_scroll_intent(
            self.first_line,
            line,
            usize::from(self.region.height),
            self.scroll_margin,
        ) {
            Some(first) => {
                self.first_line = first;
                self.repaint = true;
                true
            }
            None => false,
        }
    }

    /// View offset under the screen cell `(x, y)`, if it lies in the region.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<ViewOffset> {
        if !self.region.contains(x, y) {
            return None;
        }
        let line = (self.first_line + usize::from(y - self.region.y)).min(self.lines.len() - 1);
        let target = usize::from(x.saturating_sub(self.left_margin()));
        let mut col = 0;
        let mut chars = 0;
        for g in grapheme::iter(&self.lines[line]) {
            let w = grapheme::cluster_width(g);
            if col + w > target {
                break;
            }
            col += w;
            chars += g.chars().count();
        }
        Some(ViewOffset(self.line_starts[line] + chars))
    }

    /// Rows currently inside the viewport, top to bottom.
    pub fn visible_lines(&self) -> impl Iterator<Item = VisibleLine<'_>> + '_ {
        let height = usize::from(self.region.height);
        self.lines
            .iter()
            .enumerate()
            .skip(self.first_line)
            .take(height)
            .map(move |(idx, text)| VisibleLine {
                row: self.region.y + (idx - self.first_line) as u16,
                number: self.model_lines.get(idx).copied().flatten(),
                text: text.trim_end_matches('\r'),
                folded: self.fold_lines.contains(&idx),
            })
    }
}

impl View for TextView {
    fn caret_offset(&self) -> Option<ViewOffset> {
        self.caret
    }

    fn set_caret(&mut self, offset: ViewOffset) {
        let clamped = offset.clamp_to(self.char_count);
        if self.caret != Some(clamped) {
            self.caret = Some(clamped);
            self.repaint = true;
        }
        self.scroll_to_caret();
    }

    fn location_at(&self, offset: ViewOffset) -> Result<Point, ViewError> {
        if offset.get() > self.char_count {
            return Err(ViewError::OutOfRange {
                offset: offset.get(),
                len: self.char_count,
            });
        }
        let line = self.offset_to_line(offset);
        let height = usize::from(self.region.height);
        if line < self.first_line || line >= self.first_line + height {
            return Err(ViewError::NotVisible {
                offset: offset.get(),
            });
        }
        let col_chars = offset.get() - self.line_starts[line];
        let cells = grapheme::visual_col_chars(&self.lines[line], col_chars);
        let x = usize::from(self.left_margin()) + cells;
        Ok(Point::new(
            u16::try_from(x).unwrap_or(u16::MAX),
            self.region.y + (line - self.first_line) as u16,
        ))
    }

    fn char_count(&self) -> usize {
        self.char_count
    }

    fn line_height(&self) -> u16 {
        1
    }

    fn left_margin(&self) -> u16 {
        self.region.x + self.gutter_width
    }

    fn attach(&mut self, interest: Interest) -> HookId {
        self.hooks.attach(interest)
    }

    fn detach(&mut self, id: HookId) -> bool {
        self.hooks.detach(id)
    }

    fn wants(&self, interest: Interest) -> bool {
        self.hooks.wants(interest)
    }

    fn request_repaint(&mut self) {
        self.repaint = true;
    }

    fn client_bottom(&self) -> Option<u16> {
        Some(self.region.bottom())
    }
}

/// Digits of the largest line number plus one separator column. Never wider
/// than half the region so narrow terminals still show text.
fn gutter_width_for(line_count: usize, width: u16) -> u16 {
    let digits = line_count.max(1).ilog10() as u16 + 1;
    (digits.max(3) + 1).min(width / 2)
}

/// Compute the desired new first visible line to keep the caret line within
/// the viewport subject to a top/bottom margin.
///
/// The margin is clamped to at most half the text height. Returns
/// `Some(new_first)` if a scroll is needed, `None` when the caret is already
/// inside the permitted band.
pub fn compute_scroll_intent(
    first: usize,
    caret_line: usize,
    text_height: usize,
    margin: usize,
) -> Option<usize> {
    if text_height == 0 {
        return None;
    }
    let m = margin.min(text_height / 2);
    let bottom = first + text_height;
    if caret_line < first + m {
        let new_first = caret_line.saturating_sub(m);
        (new_first != first).then_some(new_first)
    } else if caret_line + m >= bottom {
        let new_first = caret_line + m + 1 - text_height;
        (new_first != first).then_some(new_first)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::TextBuffer;

    fn view_of(text: &str, height: u16) -> (Buffer, TextView) {
        let buf = Buffer::from_str("t", text).unwrap();
        let mut view = TextView::new(LayoutRegion::new(0, 0, 40, height));
        view.sync(&buf, &FoldMap::new());
        (buf, view)
    }

    #[test]
    fn location_accounts_for_gutter_and_lines() {
        let (_b, v) = view_of("ab\ncde\n", 10);
        assert_eq!(v.left_margin(), 4);
        assert_eq!(v.char_count(), 7);
        assert_eq!(v.location_at(ViewOffset(0)).unwrap(), Point::new(4, 0));
        assert_eq!(v.location_at(ViewOffset(2)).unwrap(), Point::new(6, 0));
        assert_eq!(v.location_at(ViewOffset(4)).unwrap(), Point::new(5, 1));
        assert_eq!(v.location_at(ViewOffset(7)).unwrap(), Point::new(4, 2));
        assert!(matches!(
            v.location_at(ViewOffset(8)),
            Err(ViewError::OutOfRange { offset: 8, len: 7 })
        ));
    }

    #[test]
    fn wide_chars_advance_two_cells() {
        let (_b, v) = view_of("漢字x", 5);
        assert_eq!(v.location_at(ViewOffset(2)).unwrap(), Point::new(8, 0));
        assert_eq!(v.hit_test(7, 0), Some(ViewOffset(1)));
        assert_eq!(v.hit_test(8, 0), Some(ViewOffset(2)));
        assert_eq!(v.hit_test(30, 0), Some(ViewOffset(3)));
        assert_eq!(v.hit_test(0, 9), None);
    }

    #[test]
    fn scrolled_out_offsets_are_not_visible() {
        let (_b, mut v) = view_of("0\n1\n2\n3\n4\n5\n", 3);
        v.set_caret(ViewOffset(10));
        assert_eq!(v.first_line(), 3);
        assert!(matches!(
            v.location_at(ViewOffset(0)),
            Err(ViewError::NotVisible { offset: 0 })
        ));
        assert_eq!(v.location_at(ViewOffset(10)).unwrap(), Point::new(4, 2));
    }

    #[test]
    fn folds_hide_text_and_mark_gutter() {
        let buf = Buffer::from_str("t", "one\ntwo\nthree\n").unwrap();
        let mut folds = FoldMap::new();
        assert!(folds.fold(3..7));
        let mut v = TextView::new(LayoutRegion::new(0, 0, 40, 10));
        v.sync(&buf, &folds);
        let rows: Vec<_> = v.visible_lines().collect();
        assert_eq!(rows[0].text, "one");
        assert!(rows[0].folded);
        assert_eq!(rows[1].text, "three");
        assert_eq!(rows[1].number, Some(3));
        assert_eq!(v.char_count(), 10);
    }

    #[test]
    fn caret_motions_clamp_to_lines() {
        let (_b, mut v) = view_of("abcd\nx\nlonger", 10);
        v.set_caret(ViewOffset(3));
        assert!(v.move_caret(CaretMotion::Down));
        assert_eq!(v.caret_offset(), Some(ViewOffset(6)));
        assert!(v.move_caret(CaretMotion::Down));
        assert_eq!(v.caret_offset(), Some(ViewOffset(8)));
        v.move_caret(CaretMotion::LineEnd);
        assert_eq!(v.caret_offset(), Some(ViewOffset(13)));
        assert!(!v.move_caret(CaretMotion::Right));
        v.move_caret(CaretMotion::LineStart);
        assert_eq!(v.caret_offset(), Some(ViewOffset(7)));
        v.move_caret(CaretMotion::PageUp);
        assert_eq!(v.caret_offset(), Some(ViewOffset(0)));
        assert!(!v.move_caret(CaretMotion::Left));
    }

    #[test]
    fn sync_clamps_caret_and_flags_repaint() {
        let (mut b, mut v) = view_of("abcdef", 4);
        v.set_caret(ViewOffset(6));
        assert!(v.take_repaint());
        assert!(!v.take_repaint());
        b.replace(0, 4, "").unwrap();
        v.sync(&b, &FoldMap::new());
        assert_eq!(v.caret_offset(), Some(ViewOffset(2)));
        assert!(v.needs_repaint());
    }

    #[test]
    fn compute_scroll_intent_band() {
        assert_eq!(compute_scroll_intent(0, 5, 10, 2), None);
        assert_eq!(compute_scroll_intent(10, 11, 6, 2), Some(9));
        assert_eq!(compute_scroll_intent(0, 4, 5, 1), Some(1));
        assert_eq!(compute_scroll_intent(0, 2, 4, 10), Some(1));
        assert_eq!(compute_scroll_intent(3, 0, 0, 0), None);
    }
}
