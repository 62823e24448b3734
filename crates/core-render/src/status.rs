//! Status line composition.
//!
//! Two stages: `compose_status` produces ordered `StatusSegment`s, then
//! `format_status` renders them into the final string. Segments keep the
//! formatting in one place and let tests inspect structure separately from
//! text.
//!
//! Format: `<name>[*] Ln X, Col Y[ | ghost: N lines | pending][ | message]`.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::Path;

/// Ghost completion state as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GhostIndicator {
    #[default]
    Idle,
    /// A completion request is in flight.
    Pending,
    /// A suggestion of `lines` lines is displayed.
    Showing { lines: usize },
}

pub struct StatusContext<'a> {
    pub file_name: Option<&'a Path>,
    pub dirty: bool,
    /// 0-based caret line.
    pub line: usize,
    /// 0-based caret column in chars.
    pub col: usize,
    pub ghost: GhostIndicator,
    /// Ephemeral message (e.g. "completion failed").
    pub message: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSegment<'a> {
    /// Base file name (or `[No Name]`) with a trailing `*` when dirty.
    FileName(Cow<'a, str>),
    Position { line_1: usize, col_1: usize },
    Ghost(GhostIndicator),
    Message(&'a str),
}

pub fn compose_status<'a>(ctx: &'a StatusContext<'a>) -> Vec<StatusSegment<'a>> {
    let name: Cow<'a, str> = ctx
        .file_name
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .map_or(Cow::Borrowed("[No Name]"), Cow::Borrowed);
    let name = if ctx.dirty {
        Cow::Owned(format!("{name}*"))
    } else {
        name
    };
    let mut out = Vec::with_capacity(4);
    out.push(StatusSegment::FileName(name));
    out.push(StatusSegment::Position {
        line_1: ctx.line + 1,
        col_1: ctx.col + 1,
    });
    if ctx.ghost != GhostIndicator::Idle {
        out.push(StatusSegment::Ghost(ctx.ghost));
    }
    if let Some(msg) = ctx.message.filter(|m| !m.is_empty()) {
        out.push(StatusSegment::Message(msg));
    }
    out
}

pub fn format_status(segments: &[StatusSegment<'_>]) -> String {
    let mut s = String::with_capacity(48);
    for seg in segments {
        match seg {
            StatusSegment::FileName(name) => s.push_str(name),
            StatusSegment::Position { line_1, col_1 } => {
                let _ = write!(s, " Ln {line_1}, Col {col_1}");
            }
            StatusSegment::Ghost(GhostIndicator::Idle) => {}
            StatusSegment::Ghost(GhostIndicator::Pending) => s.push_str(" | pending"),
            StatusSegment::Ghost(GhostIndicator::Showing { lines }) => {
                let plural = if *lines == 1 { "" } else { "s" };
                let _ = write!(s, " | ghost: {lines} line{plural}");
            }
            StatusSegment::Message(m) => {
                s.push_str(" | ");
                s.push_str(m);
            }
        }
    }
    s
}

pub fn build_status(ctx: &StatusContext) -> String {
    format_status(&compose_status(ctx))
}
