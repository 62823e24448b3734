//! Ghost text layout.
//!
//! The overlay renderer turns a (possibly multi-line) suggestion into draw
//! calls starting at the anchor's on-screen location. The first line
//! continues at the anchor column; every following line starts at the view's
//! left margin one `line_height` further down, mirroring where the text would
//! land if it were actually inserted.
//!
//! Invariants:
//! * `\r\n` and lone `\r` count as one line break each.
//! * Empty lines produce no draw call but still advance `y`.
//! * Nothing is drawn at or below `bottom` when a clip is set.

use crate::style::GhostStyle;
use crate::surface::PaintSurface;
use core_model::{Point, View};

/// Line geometry needed to lay out ghost text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMetrics {
    pub line_height: u16,
    pub left_margin: u16,
    /// Exclusive bottom row; `None` disables clipping.
    pub bottom: Option<u16>,
}

impl LineMetrics {
    pub fn from_view(view: &(impl View + ?Sized)) -> Self {
        Self {
            line_height: view.line_height(),
            left_margin: view.left_margin(),
            bottom: view.client_bottom(),
        }
    }
}

/// Normalize line breaks to `\n`.
pub fn normalize_line_breaks(text: &str) -> std::borrow::Cow<'_, str> {
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n").into()
    } else {
        text.into()
    }
}

/// Draw `text` starting at `origin`. Returns the number of draw calls made.
pub fn paint_ghost(
    surface: &mut dyn PaintSurface,
    origin: Point,
    text: &str,
    metrics: &LineMetrics,
    style: &GhostStyle,
) -> usize {
    let text = normalize_line_breaks(text);
    let mut x = origin.x;
    let mut y = origin.y;
    let mut drawn = 0;
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            y = y.saturating_add(metrics.line_height);
            x = metrics.left_margin;
        }
        if metrics.bottom.is_some_and(|b| y >= b) {
            break;
        }
        if line.is_empty() {
            continue;
        }
        surface.draw_text(x, y, line, style);
        drawn += 1;
    }
    tracing::trace!(target: "ghost.paint", x = origin.x, y = origin.y, drawn, "paint_ghost");
    drawn
}
