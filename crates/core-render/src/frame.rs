//! Full-frame painting of a [`TextView`].
//!
//! Every frame repaints every row of the view region plus the status row.
//! Ghost text is painted afterwards by the caller so it lands on top of the
//! freshly drawn document text.

use crate::surface::{clip_cells, displayable};
use crate::writer::{CellStyle, Writer};
use core_model::{LayoutRegion, TextView, View};
use crossterm::style::Color;

const GUTTER_STYLE: CellStyle = CellStyle {
    fg: Some(Color::DarkGrey),
    dim: false,
    reverse: false,
};

/// Queue gutter and text for every row of `view`'s region.
pub fn render_view(writer: &mut Writer, view: &TextView) {
    let region = view.region();
    let gutter = usize::from(view.gutter_width());
    let text_cells = usize::from(region.width).saturating_sub(gutter);
    let mut row = region.y;
    for line in view.visible_lines() {
        writer.move_to(region.x, line.row);
        writer.clear_line();
        if gutter > 0 {
            let number = line.number.map(|n| n.to_string()).unwrap_or_default();
            let marker = if line.folded { '+' } else { ' ' };
            writer.print_styled(
                format!("{number:>w$}{marker}", w = gutter - 1),
                GUTTER_STYLE,
            );
        }
        // The view counts a tab as one cell, so it is drawn as one.
        let shown = displayable(line.text, 1);
        writer.print(clip_cells(&shown, text_cells));
        row = line.row + 1;
    }
    while row < region.bottom() {
        writer.move_to(region.x, row);
        writer.clear_line();
        writer.print_styled("~", GUTTER_STYLE);
        row += 1;
    }
}

/// Queue the status row.
pub fn render_status(writer: &mut Writer, region: LayoutRegion, text: &str) {
    if region.height == 0 {
        return;
    }
    writer.move_to(region.x, region.y);
    writer.clear_line();
    let clipped = clip_cells(text, usize::from(region.width));
    let pad = usize::from(region.width).saturating_sub(core_text::grapheme::display_width(clipped));
    writer.print_styled(
        format!("{clipped}{}", " ".repeat(pad)),
        CellStyle {
            reverse: true,
            ..CellStyle::default()
        },
    );
}

/// Park the terminal cursor on the view caret, hiding it when the caret is
/// scrolled away.
pub fn place_caret(writer: &mut Writer, view: &TextView) {
    match view.caret_offset().map(|c| view.location_at(c)) {
        Some(Ok(p)) => {
            writer.move_to(p.x, p.y);
            writer.show_cursor();
        }
        _ => writer.hide_cursor(),
    }
}
