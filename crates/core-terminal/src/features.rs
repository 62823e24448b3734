//! Optional terminal modes switched on while the editor owns the screen.

/// Modes requested on enter and reverted on leave.
///
/// Mouse capture is what lets pointer presses reach the editor (and dismiss
/// ghost text); without it clicks go to the terminal emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalFeatures {
    pub mouse_capture: bool,
    pub bracketed_paste: bool,
    pub focus_change: bool,
}

impl Default for TerminalFeatures {
    fn default() -> Self {
        Self {
            mouse_capture: true,
            bracketed_paste: true,
            focus_change: false,
        }
    }
}

impl TerminalFeatures {
    pub fn none() -> Self {
        Self {
            mouse_capture: false,
            bracketed_paste: false,
            focus_change: false,
        }
    }
}
