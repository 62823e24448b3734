//! Rope-based text buffer with edit notifications.
//!
//! Offsets throughout this crate are char (Unicode scalar value) indices into
//! the document, which is also the unit `ropey` indexes by. Display width is a
//! separate concern handled by [`grapheme`].

use anyhow::Result;
use ropey::Rope;

pub mod edit;
pub use edit::{EditBus, EditEvent, EditSubscription, SubscriptionId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("range {start}..{end} out of bounds for buffer of {len} chars")]
    OutOfRange { start: usize, end: usize, len: usize },
    #[error("inverted range {start}..{end}")]
    InvertedRange { start: usize, end: usize },
}

/// Minimal mutable-text contract consumed by the ghost engine and the
/// completion trigger.
///
/// `replace` is the single official mutation entry point: every successful
/// call publishes exactly one [`EditEvent`] to all subscribers, including
/// the subscriber that performed the mutation.
pub trait TextBuffer {
    /// Length in chars.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text in the half-open char range `[start, end)`.
    fn read(&self, start: usize, end: usize) -> Result<String, BufferError>;

    /// Replace `removed` chars at `offset` with `text`.
    fn replace(
        &mut self,
        offset: usize,
        removed: usize,
        text: &str,
    ) -> Result<EditEvent, BufferError>;

    fn subscribe(&mut self) -> EditSubscription;

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// A text buffer backed by a `ropey::Rope`.
#[derive(Debug)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
    bus: EditBus,
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
            bus: EditBus::new(),
        })
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Return the requested line as an owned `String` (including trailing newline if present).
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx < self.rope.len_lines() {
            Some(self.rope.line(idx).to_string())
        } else {
            None
        }
    }

    /// Line containing `offset` (clamped to the buffer end).
    pub fn char_to_line(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    /// First char offset of `line` (clamped to the line count).
    pub fn line_to_char(&self, line: usize) -> usize {
        self.rope.line_to_char(line.min(self.rope.len_lines()))
    }

    /// Char length of a line excluding its newline.
    pub fn line_len(&self, idx: usize) -> usize {
        let Some(line) = self.line(idx) else {
            return 0;
        };
        let n = line.chars().count();
        if line.ends_with('\n') { n - 1 } else { n }
    }

    /// Borrowed view of `[range.start, range.end)`, `None` when out of bounds.
    pub fn slice(&self, range: std::ops::Range<usize>) -> Option<ropey::RopeSlice<'_>> {
        self.rope.get_slice(range)
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.len()
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), BufferError> {
        if start > end {
            return Err(BufferError::InvertedRange { start, end });
        }
        let len = self.rope.len_chars();
        if end > len {
            return Err(BufferError::OutOfRange { start, end, len });
        }
        Ok(())
    }
}

impl TextBuffer for Buffer {
    fn len(&self) -> usize {
        self.rope.len_chars()
    }

    fn read(&self, start: usize, end: usize) -> Result<String, BufferError> {
        self.check_range(start, end)?;
        Ok(self.rope.slice(start..end).to_string())
    }

    fn replace(
        &mut self,
        offset: usize,
        removed: usize,
        text: &str,
    ) -> Result<EditEvent, BufferError> {
        let end = offset.saturating_add(removed);
        self.check_range(offset, end)?;
        if removed > 0 {
            self.rope.remove(offset..end);
        }
        if !text.is_empty() {
            self.rope.insert(offset, text);
        }
        let event = EditEvent::new(offset, removed, text);
        tracing::trace!(
            target: "text.edit",
            buffer = self.name.as_str(),
            offset,
            removed,
            inserted_len = event.inserted_len(),
            "replace"
        );
        self.bus.publish(&event);
        Ok(event)
    }

    fn subscribe(&mut self) -> EditSubscription {
        self.bus.subscribe()
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }
}

/// Grapheme and width utilities. These are pure helpers operating on a single line.
pub mod grapheme {
    use unicode_segmentation::UnicodeSegmentation;
    use unicode_width::UnicodeWidthStr;

    /// Iterate grapheme clusters in a line.
    pub fn iter(line: &str) -> impl Iterator<Item = &str> {
        line.graphemes(true)
    }

    /// Previous grapheme boundary (returns 0 if already at or below 1st boundary).
    pub fn prev_boundary(line: &str, byte: usize) -> usize {
        if byte == 0 || byte > line.len() {
            return 0;
        }
        let mut last = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            last = idx;
        }
        last
    }

    /// Next grapheme boundary (returns line.len() if at or beyond end).
    pub fn next_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                return idx;
            }
        }
        line.len()
    }

    /// Width in terminal cells of this grapheme cluster. Zero-width clusters
    /// (lone combining marks) still occupy one cell once drawn.
    pub fn cluster_width(g: &str) -> usize {
        g.width().max(1)
    }

    /// Display width of a whole string in terminal cells.
    pub fn display_width(s: &str) -> usize {
        s.graphemes(true).map(cluster_width).sum()
    }

    /// Visual column (terminal cells) of the first `chars` chars of `line`.
    ///
    /// A char offset that lands inside a grapheme cluster resolves to the
    /// column of that cluster's start.
    pub fn visual_col_chars(line: &str, chars: usize) -> usize {
        let mut col = 0;
        let mut seen = 0;
        for g in line.graphemes(true) {
            let n = g.chars().count();
            if seen + n > chars {
                break;
            }
            seen += n;
            col += cluster_width(g);
        }
        col
    }
}
