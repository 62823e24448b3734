//! Paint surfaces for ghost text.

use crate::style::GhostStyle;
use crate::writer::Writer;
use core_text::grapheme;
use std::borrow::Cow;

/// Cells a tab in ghost text expands to.
pub const GHOST_TAB_WIDTH: usize = 4;

/// Destination the overlay renderer draws onto.
pub trait PaintSurface {
    fn draw_text(&mut self, x: u16, y: u16, text: &str, style: &GhostStyle);
}

/// One recorded `draw_text` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub x: u16,
    pub y: u16,
    pub text: String,
    pub style: GhostStyle,
}

/// Surface that only records what would have been drawn.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.text.as_str()).collect()
    }
}

impl PaintSurface for RecordingSurface {
    fn draw_text(&mut self, x: u16, y: u16, text: &str, style: &GhostStyle) {
        self.calls.push(DrawCall {
            x,
            y,
            text: text.to_owned(),
            style: *style,
        });
    }
}

/// Surface that queues styled prints on a terminal [`Writer`], clipping at
/// the right edge of the drawable area.
#[derive(Debug)]
pub struct TerminalSurface<'w> {
    writer: &'w mut Writer,
    right: u16,
}

impl<'w> TerminalSurface<'w> {
    pub fn new(writer: &'w mut Writer, right: u16) -> Self {
        Self { writer, right }
    }
}

impl PaintSurface for TerminalSurface<'_> {
    /// Suggestion text is untrusted: control chars never reach the terminal.
    fn draw_text(&mut self, x: u16, y: u16, text: &str, style: &GhostStyle) {
        if x >= self.right {
            return;
        }
        let shown = displayable(text, GHOST_TAB_WIDTH);
        let visible = clip_cells(&shown, usize::from(self.right - x));
        if visible.is_empty() {
            return;
        }
        self.writer.move_to(x, y);
        self.writer.print_styled(visible, style.cell_style());
    }
}

/// Text safe to print: a tab becomes `tab_width` spaces, any other control
/// char (ESC included) a single space, so the terminal cursor only moves by
/// the cells [`clip_cells`] counted.
pub fn displayable(text: &str, tab_width: usize) -> Cow<'_, str> {
    if !text.chars().any(char::is_control) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => out.extend(std::iter::repeat_n(' ', tab_width)),
            c if c.is_control() => out.push(' '),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Longest prefix of `text` that fits in `cells` terminal columns without
/// splitting a grapheme cluster.
pub fn clip_cells(text: &str, cells: usize) -> &str {
    let mut used = 0;
    let mut end = 0;
    for g in grapheme::iter(text) {
        let w = grapheme::cluster_width(g);
        if used + w > cells {
            break;
        }
        used += w;
        end += g.len();
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::Command;

    #[test]
    fn clip_never_splits_wide_clusters() {
        assert_eq!(clip_cells("ab漢c", 3), "ab");
        assert_eq!(clip_cells("ab漢c", 4), "ab漢");
        assert_eq!(clip_cells("e\u{0301}x", 1), "e\u{0301}");
        assert_eq!(clip_cells("abc", 0), "");
    }

    #[test]
    fn displayable_replaces_control_chars() {
        assert!(matches!(displayable("plain", 4), Cow::Borrowed("plain")));
        assert_eq!(displayable("\tx", 4), "    x");
        assert_eq!(displayable("\tx", 1), " x");
        assert_eq!(displayable("a\x1b[2Jb\x07", 4), "a [2Jb ");
    }

    #[test]
    fn terminal_surface_never_prints_control_chars() {
        let mut w = Writer::new();
        {
            let mut s = TerminalSurface::new(&mut w, 20);
            s.draw_text(0, 0, "\tret\x1b[2J", &GhostStyle::default());
        }
        assert!(
            matches!(&w.commands()[1], Command::PrintStyled(t, _) if t == "    ret [2J"),
            "{:?}",
            w.commands()
        );
    }

    #[test]
    fn terminal_surface_clips_right_edge() {
        let mut w = Writer::new();
        {
            let mut s = TerminalSurface::new(&mut w, 6);
            s.draw_text(3, 0, "hello", &GhostStyle::default());
            s.draw_text(6, 1, "gone", &GhostStyle::default());
        }
        assert_eq!(w.commands().len(), 2);
        assert_eq!(w.commands()[0], Command::MoveTo(3, 0));
        assert!(matches!(&w.commands()[1], Command::PrintStyled(t, st) if t == "hel" && st.dim));
    }
}
