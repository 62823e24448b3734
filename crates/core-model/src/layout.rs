//! Screen geometry.
//!
//! The terminal is split into an editor region on top and a one-row status
//! region at the bottom. Coordinates are terminal cells (`u16`).
//!
//! Invariants:
//! * `editor.height + status.height == terminal height`.
//! * A terminal with zero rows yields two degenerate (zero height) regions.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutRegion {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl LayoutRegion {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive bottom row.
    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Exclusive right column.
    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub editor: LayoutRegion,
    pub status: LayoutRegion,
}

impl Layout {
    pub fn for_terminal(width: u16, height: u16) -> Self {
        let status_h = height.min(1);
        let editor_h = height - status_h;
        Self {
            editor: LayoutRegion::new(0, 0, width, editor_h),
            status: LayoutRegion::new(0, editor_h, width, status_h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_row_takes_last_line() {
        let l = Layout::for_terminal(80, 24);
        assert_eq!(l.editor, LayoutRegion::new(0, 0, 80, 23));
        assert_eq!(l.status, LayoutRegion::new(0, 23, 80, 1));
        assert!(l.editor.contains(79, 22));
        assert!(!l.editor.contains(80, 0));
        assert!(!l.editor.contains(0, 23));
    }

    #[test]
    fn degenerate_terminal() {
        let l = Layout::for_terminal(10, 0);
        assert_eq!(l.editor.height, 0);
        assert_eq!(l.status.height, 0);
        let l = Layout::for_terminal(10, 1);
        assert_eq!(l.editor.height, 0);
        assert_eq!(l.status.bottom(), 1);
    }
}
