//! Property-based tests for ghost text layout.

use core_model::Point;
use core_render::{GhostStyle, LineMetrics, RecordingSurface, paint_ghost};
use proptest::prelude::*;

proptest! {
    // Without a clip every non-empty line is drawn exactly once, in order.
    #[test]
    fn draws_each_non_empty_line(lines in prop::collection::vec("[a-z]{0,6}", 1..8), x in 0u16..40, y in 0u16..40) {
        let text = lines.join("\n");
        let metrics = LineMetrics { line_height: 1, left_margin: 3, bottom: None };
        let mut s = RecordingSurface::new();
        let drawn = paint_ghost(&mut s, Point::new(x, y), &text, &metrics, &GhostStyle::default());
        let expected: Vec<&str> = lines.iter().map(String::as_str).filter(|l| !l.is_empty()).collect();
        prop_assert_eq!(drawn, expected.len());
        prop_assert_eq!(s.texts(), expected);
        for call in &s.calls {
            prop_assert!(call.y == y || call.x == 3);
        }
    }

    // Nothing lands at or below the clip row, regardless of line endings.
    #[test]
    fn clip_is_respected(lines in prop::collection::vec("[a-z]{1,4}", 1..10), sep in prop_oneof![Just("\n"), Just("\r\n"), Just("\r")], bottom in 1u16..6) {
        let text = lines.join(sep);
        let metrics = LineMetrics { line_height: 1, left_margin: 0, bottom: Some(bottom) };
        let mut s = RecordingSurface::new();
        let drawn = paint_ghost(&mut s, Point::new(2, 0), &text, &metrics, &GhostStyle::default());
        prop_assert_eq!(drawn, lines.len().min(usize::from(bottom)));
        prop_assert!(s.calls.iter().all(|c| c.y < bottom));
    }
}
