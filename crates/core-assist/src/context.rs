//! Context capture around the trigger offset.

use core_text::{BufferError, TextBuffer};

pub const DEFAULT_CONTEXT_BEFORE: usize = 400;
pub const DEFAULT_CONTEXT_AFTER: usize = 40;

/// Document text surrounding the caret, handed to the provider.
///
/// The window is `[offset - before, offset + after]` clamped to the buffer.
/// Generous leading context carries signatures and local names; the trailing
/// context is kept short so the provider does not rewrite what follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    pub text: String,
    /// Model offset of the first char of `text`.
    pub start: usize,
    /// Caret position within `text`, in chars.
    pub cursor_in_context: usize,
}

impl ContextWindow {
    pub fn capture(
        buffer: &dyn TextBuffer,
        offset: usize,
        before: usize,
        after: usize,
    ) -> Result<Self, BufferError> {
        let len = buffer.len();
        let offset = offset.min(len);
        let start = offset.saturating_sub(before);
        let end = offset.saturating_add(after).min(len);
        Ok(Self {
            text: buffer.read(start, end)?,
            start,
            cursor_in_context: offset - start,
        })
    }

    /// Text before and after the caret.
    pub fn split(&self) -> (&str, &str) {
        let byte = self
            .text
            .char_indices()
            .nth(self.cursor_in_context)
            .map_or(self.text.len(), |(b, _)| b);
        self.text.split_at(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;

    #[test]
    fn window_clamps_to_buffer() {
        let b = Buffer::from_str("t", "0123456789").unwrap();
        let w = ContextWindow::capture(&b, 5, 3, 2).unwrap();
        assert_eq!(w.text, "23456");
        assert_eq!(w.start, 2);
        assert_eq!(w.cursor_in_context, 3);
        assert_eq!(w.split(), ("234", "56"));

        let w = ContextWindow::capture(&b, 1, 400, 40).unwrap();
        assert_eq!(w.text, "0123456789");
        assert_eq!(w.cursor_in_context, 1);

        let w = ContextWindow::capture(&b, 99, 2, 2).unwrap();
        assert_eq!(w.text, "89");
        assert_eq!(w.cursor_in_context, 2);
    }

    #[test]
    fn cursor_counts_chars_not_bytes() {
        let b = Buffer::from_str("t", "é😀ab").unwrap();
        let w = ContextWindow::capture(&b, 2, 400, 40).unwrap();
        assert_eq!(w.cursor_in_context, 2);
        assert_eq!(w.split(), ("é😀", "ab"));
    }
}
