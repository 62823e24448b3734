use core_model::{FoldMap, LayoutRegion, TextView, View, ViewOffset};
use core_render::{
    Command, GhostStyle, LineMetrics, RecordingSurface, TerminalSurface, Writer, paint_ghost,
};
use core_text::Buffer;

fn view_of(text: &str, width: u16, height: u16) -> TextView {
    let buf = Buffer::from_str("test", text).unwrap();
    let mut view = TextView::new(LayoutRegion::new(0, 0, width, height));
    view.sync(&buf, &FoldMap::new());
    view
}

#[test]
fn ghost_after_wide_cluster_starts_at_visual_column() {
    let view = view_of("漢x\n", 20, 5);
    let origin = view.location_at(ViewOffset(1)).unwrap();
    let mut s = RecordingSurface::new();
    paint_ghost(
        &mut s,
        origin,
        "yz\nnext",
        &LineMetrics::from_view(&view),
        &GhostStyle::default(),
    );
    // Gutter is 4 cells wide, the wide cluster takes two more.
    assert_eq!((s.calls[0].x, s.calls[0].y), (6, 0));
    assert_eq!((s.calls[1].x, s.calls[1].y), (4, 1));
}

#[test]
fn view_bottom_clips_multiline_ghost() {
    let view = view_of("a\nb\n", 20, 2);
    let origin = view.location_at(ViewOffset(2)).unwrap();
    let mut s = RecordingSurface::new();
    let drawn = paint_ghost(
        &mut s,
        origin,
        "1\n2\n3",
        &LineMetrics::from_view(&view),
        &GhostStyle::default(),
    );
    assert_eq!(drawn, 1);
    assert_eq!(s.texts(), vec!["1"]);
}

#[test]
fn terminal_surface_emits_dim_styled_prints() {
    let view = view_of("abc", 10, 3);
    let origin = view.location_at(ViewOffset(3)).unwrap();
    let mut w = Writer::new();
    {
        let mut surface = TerminalSurface::new(&mut w, view.region().right());
        paint_ghost(
            &mut surface,
            origin,
            "defghijk",
            &LineMetrics::from_view(&view),
            &GhostStyle::default(),
        );
    }
    // Text starts at column 7 of a 10-wide region: three cells remain.
    assert_eq!(w.commands()[0], Command::MoveTo(7, 0));
    assert!(matches!(&w.commands()[1], Command::PrintStyled(t, st) if t == "def" && st.dim));
}

#[test]
fn untrusted_ghost_text_cannot_drive_the_terminal() {
    let view = view_of("if x {\n", 40, 4);
    let origin = view.location_at(ViewOffset(6)).unwrap();
    let mut w = Writer::new();
    {
        let mut surface = TerminalSurface::new(&mut w, view.region().right());
        paint_ghost(
            &mut surface,
            origin,
            "\n\treturn;\x1b[2J}",
            &LineMetrics::from_view(&view),
            &GhostStyle::default(),
        );
    }
    let prints: Vec<&str> = w
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::PrintStyled(t, _) => Some(t.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(prints, vec!["    return; [2J}"]);
    assert!(prints.iter().all(|t| !t.chars().any(char::is_control)));
}
