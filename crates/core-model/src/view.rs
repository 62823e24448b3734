//! The view contract the ghost engine paints and positions against.

use crate::coords::ViewOffset;
use crate::hooks::{HookId, Interest};

/// Cell position on the paint surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("view offset {offset} beyond view length {len}")]
    OutOfRange { offset: usize, len: usize },
    #[error("view offset {offset} is scrolled out of the viewport")]
    NotVisible { offset: usize },
}

/// Presentation surface over a document.
///
/// All offsets are in view space. Implementations own caret placement,
/// geometry and hook bookkeeping; they never mutate the document.
pub trait View {
    /// Current caret, `None` when the view has no caret yet.
    fn caret_offset(&self) -> Option<ViewOffset>;

    fn set_caret(&mut self, offset: ViewOffset);

    /// Surface location of the cell that renders `offset`.
    fn location_at(&self, offset: ViewOffset) -> Result<Point, ViewError>;

    /// Length of the view projection in chars.
    fn char_count(&self) -> usize;

    fn line_height(&self) -> u16;

    /// Column where text (not gutter) starts on every row.
    fn left_margin(&self) -> u16;

    fn attach(&mut self, interest: Interest) -> HookId;

    fn detach(&mut self, id: HookId) -> bool;

    fn wants(&self, interest: Interest) -> bool;

    fn request_repaint(&mut self);

    /// Exclusive bottom row of the client area, if painting should clip.
    fn client_bottom(&self) -> Option<u16> {
        None
    }
}
