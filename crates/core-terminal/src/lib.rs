//! Terminal backend abstraction and crossterm implementation.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, Show},
    event::{
        DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste,
        EnableFocusChange, EnableMouseCapture,
    },
    execute, queue,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use std::io::{Write, stdout};

pub mod features;
pub use features::TerminalFeatures;

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn set_title(&mut self, title: &str) -> Result<()>;
    /// Current size as (columns, rows).
    fn size(&self) -> Result<(u16, u16)>;
}

pub struct CrosstermBackend {
    entered: bool,
    features: TerminalFeatures,
}

/// RAII guard ensuring terminal state restoration even if caller early-returns or panics.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
    active: bool,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new(TerminalFeatures::default())
    }
}

impl CrosstermBackend {
    pub fn new(features: TerminalFeatures) -> Self {
        Self {
            entered: false,
            features,
        }
    }

    pub fn features(&self) -> TerminalFeatures {
        self.features
    }

    /// Enter and return a guard that will leave on drop.
    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard {
            backend: self,
            active: true,
        })
    }
}

impl<'a> TerminalGuard<'a> {
    pub fn backend(&mut self) -> &mut CrosstermBackend {
        self.backend
    }
}

/// Queue the escape sequences entering the editor screen.
pub fn write_enter(out: &mut impl Write, features: TerminalFeatures) -> std::io::Result<()> {
    queue!(out, EnterAlternateScreen, Hide)?;
    if features.mouse_capture {
        queue!(out, EnableMouseCapture)?;
    }
    if features.bracketed_paste {
        queue!(out, EnableBracketedPaste)?;
    }
    if features.focus_change {
        queue!(out, EnableFocusChange)?;
    }
    out.flush()
}

/// Queue the escape sequences restoring the primary screen, in reverse order.
pub fn write_leave(out: &mut impl Write, features: TerminalFeatures) -> std::io::Result<()> {
    if features.focus_change {
        queue!(out, DisableFocusChange)?;
    }
    if features.bracketed_paste {
        queue!(out, DisableBracketedPaste)?;
    }
    if features.mouse_capture {
        queue!(out, DisableMouseCapture)?;
    }
    queue!(out, LeaveAlternateScreen, Show)?;
    out.flush()
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            write_enter(&mut stdout(), self.features)?;
            self.entered = true;
            tracing::debug!(target: "runtime", features = ?self.features, "terminal_entered");
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            write_leave(&mut stdout(), self.features)?;
            disable_raw_mode()?;
            self.entered = false;
            tracing::debug!(target: "runtime", "terminal_left");
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16)> {
        Ok(crossterm::terminal::size()?)
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl<'a> Drop for TerminalGuard<'a> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}
