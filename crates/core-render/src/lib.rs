//! Rendering: terminal writer, paint surfaces, the ghost overlay renderer and
//! full-frame painting of the text view.
//!
//! Frame order used by the binary:
//! 1. `render_view` repaints the document rows and gutter.
//! 2. `render_status` repaints the status row.
//! 3. The ghost engine paints its suggestion through a [`TerminalSurface`]
//!    using [`paint_ghost`].
//! 4. `place_caret` parks the hardware cursor, then the writer is flushed once.
//!
//! Invariants:
//! * Nothing in this crate mutates a buffer or a view.
//! * Draw calls never split a grapheme cluster when clipping.

pub mod frame;
pub mod overlay;
pub mod status;
pub mod style;
pub mod surface;
pub mod writer;

pub use frame::{place_caret, render_status, render_view};
pub use overlay::{LineMetrics, normalize_line_breaks, paint_ghost};
pub use status::{GhostIndicator, StatusContext, build_status};
pub use style::{DEFAULT_GHOST_ALPHA, GhostColor, GhostStyle};
pub use surface::{
    DrawCall, GHOST_TAB_WIDTH, PaintSurface, RecordingSurface, TerminalSurface, clip_cells,
    displayable,
};
pub use writer::{CellStyle, Command, Writer};
