//! Terminal writer.
//!
//! Frames are assembled as an ordered list of primitive commands and flushed
//! once. Keeping the command list inspectable lets tests assert exactly what a
//! frame would emit without a terminal.
//!
//! Design invariants:
//! * Commands preserve ordering; no flushing mid-frame.
//! * All positions are absolute (0,0) origin; caller ensures bounds.
//! * A styled print always resets attributes afterwards, so styles never leak
//!   into the following command.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{Write, stdout};

/// Attributes for a styled print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub fg: Option<Color>,
    pub dim: bool,
    pub reverse: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveTo(u16, u16),
    /// Clear the current line; the caller positions the cursor first.
    ClearLine,
    Print(String),
    PrintStyled(String, CellStyle),
    HideCursor,
    ShowCursor,
}

#[derive(Debug, Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cmds.push(Command::MoveTo(x, y));
    }

    pub fn clear_line(&mut self) {
        self.cmds.push(Command::ClearLine);
    }

    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
    }

    pub fn print_styled<S: Into<String>>(&mut self, s: S, style: CellStyle) {
        let s: String = s.into();
        if s.is_empty() {
            return;
        }
        if style == CellStyle::default() {
            self.cmds.push(Command::Print(s));
        } else {
            self.cmds.push(Command::PrintStyled(s, style));
        }
    }

    pub fn hide_cursor(&mut self) {
        self.cmds.push(Command::HideCursor);
    }

    pub fn show_cursor(&mut self) {
        self.cmds.push(Command::ShowCursor);
    }

    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Emit all queued commands to `out` and flush it.
    pub fn flush_to<W: Write>(self, out: &mut W) -> Result<()> {
        for c in self.cmds {
            match c {
                Command::MoveTo(x, y) => queue!(out, MoveTo(x, y))?,
                Command::ClearLine => queue!(out, Clear(ClearType::CurrentLine))?,
                Command::Print(s) => queue!(out, Print(s))?,
                Command::PrintStyled(s, style) => {
                    if let Some(fg) = style.fg {
                        queue!(out, SetForegroundColor(fg))?;
                    }
                    if style.dim {
                        queue!(out, SetAttribute(Attribute::Dim))?;
                    }
                    if style.reverse {
                        queue!(out, SetAttribute(Attribute::Reverse))?;
                    }
                    queue!(out, Print(s), SetAttribute(Attribute::Reset), ResetColor)?;
                }
                Command::HideCursor => queue!(out, Hide)?,
                Command::ShowCursor => queue!(out, Show)?,
            }
        }
        out.flush()?;
        Ok(())
    }

    pub fn flush(self) -> Result<()> {
        let mut out = stdout();
        self.flush_to(&mut out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prints_are_dropped() {
        let mut w = Writer::new();
        w.print("");
        w.print_styled("", CellStyle::default());
        assert!(w.is_empty());
    }

    #[test]
    fn default_style_degrades_to_plain_print() {
        let mut w = Writer::new();
        w.print_styled("a", CellStyle::default());
        assert_eq!(w.commands(), &[Command::Print("a".into())]);
    }

    #[test]
    fn flush_to_emits_escape_sequences_and_resets_style() {
        let mut w = Writer::new();
        w.move_to(2, 1);
        w.print_styled(
            "ghost",
            CellStyle {
                fg: Some(Color::DarkGrey),
                dim: true,
                reverse: false,
            },
        );
        w.print("x");
        let mut out: Vec<u8> = Vec::new();
        w.flush_to(&mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        // MoveTo is 1-based in the escape sequence.
        assert!(s.starts_with("\x1b[2;3H"));
        let ghost_at = s.find("ghost").unwrap();
        let reset_at = s.find("\x1b[0m").unwrap();
        assert!(ghost_at < reset_at);
        assert!(s.ends_with('x'));
    }
}
