//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::TrustVerdict;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color of the temperature line.
    pub series: Color,
    /// Color for rows still awaiting a verdict.
    pub checking: Color,
    /// Color for trusted rows.
    pub trusted: Color,
    /// Color for unverified rows.
    pub unverified: Color,
    /// Color for borders, axes and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            series: Color::LightCyan,
            checking: Color::Yellow,
            trusted: Color::Green,
            unverified: Color::Red,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            series: Color::Blue,
            checking: Color::Yellow,
            trusted: Color::Green,
            unverified: Color::Red,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for a verification status cell
    pub fn verdict_style(&self, verdict: TrustVerdict) -> Style {
        match verdict {
            TrustVerdict::Checking => Style::default().fg(self.checking),
            TrustVerdict::Trusted => Style::default().fg(self.trusted).add_modifier(Modifier::BOLD),
            TrustVerdict::Unverified => {
                Style::default().fg(self.unverified).add_modifier(Modifier::BOLD)
            }
        }
    }
}
