//! Ghost text styling.
//!
//! Terminals cannot blend text with transparency, so the configured alpha is
//! approximated: anything below half opacity is drawn with the Dim attribute
//! in addition to the configured foreground color.

use crate::writer::CellStyle;
use crossterm::style::Color;

/// Palette offered for ghost text. Kept small on purpose so every entry reads
/// as "not yet real text" against common themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GhostColor {
    #[default]
    DarkGrey,
    Grey,
    Blue,
    Cyan,
    Magenta,
}

impl GhostColor {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "dark_grey" | "dark_gray" => Some(Self::DarkGrey),
            "grey" | "gray" => Some(Self::Grey),
            "blue" => Some(Self::Blue),
            "cyan" => Some(Self::Cyan),
            "magenta" => Some(Self::Magenta),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DarkGrey => "dark_grey",
            Self::Grey => "grey",
            Self::Blue => "blue",
            Self::Cyan => "cyan",
            Self::Magenta => "magenta",
        }
    }

    pub fn to_crossterm(self) -> Color {
        match self {
            Self::DarkGrey => Color::DarkGrey,
            Self::Grey => Color::Grey,
            Self::Blue => Color::Blue,
            Self::Cyan => Color::Cyan,
            Self::Magenta => Color::Magenta,
        }
    }
}

pub const DEFAULT_GHOST_ALPHA: u8 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostStyle {
    pub color: GhostColor,
    pub alpha: u8,
    pub dim: bool,
}

impl Default for GhostStyle {
    fn default() -> Self {
        Self {
            color: GhostColor::DarkGrey,
            alpha: DEFAULT_GHOST_ALPHA,
            dim: true,
        }
    }
}

impl GhostStyle {
    /// Whether the terminal should render this style faint.
    pub fn faint(&self) -> bool {
        self.dim || self.alpha < 128
    }

    pub fn cell_style(&self) -> CellStyle {
        CellStyle {
            fg: Some(self.color.to_crossterm()),
            dim: self.faint(),
            reverse: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_spelling_variants() {
        assert_eq!(GhostColor::parse("dark-gray"), Some(GhostColor::DarkGrey));
        assert_eq!(GhostColor::parse(" Cyan "), Some(GhostColor::Cyan));
        assert_eq!(GhostColor::parse("chartreuse"), None);
        assert_eq!(GhostColor::parse(GhostColor::Magenta.as_str()), Some(GhostColor::Magenta));
    }

    #[test]
    fn opaque_undimmed_style_is_not_faint() {
        let s = GhostStyle {
            color: GhostColor::Blue,
            alpha: 255,
            dim: false,
        };
        assert!(!s.faint());
        assert_eq!(s.cell_style().fg, Some(Color::Blue));
        assert!(GhostStyle::default().cell_style().dim);
    }
}
