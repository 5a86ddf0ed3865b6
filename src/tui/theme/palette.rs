//! Color palette.

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_highlight: Color,
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub fg_dim: Color,
    pub accent: Color,
    pub border: Color,
    pub current_line: Color,
    pub error: Color,
    pub success: Color,
}

impl Palette {
    /// Muted dark palette; the current lyric line is the one bright thing.
    pub const NIGHT: Self = Self {
        bg_highlight: Color::Rgb(40, 42, 54),    // #282a36
        fg_primary: Color::Rgb(220, 220, 220),   // #dcdcdc
        fg_secondary: Color::Rgb(130, 130, 140), // #82828c
        fg_dim: Color::Rgb(90, 90, 100),         // #5a5a64
        accent: Color::Rgb(139, 168, 255),       // #8ba8ff
        border: Color::Rgb(70, 72, 86),          // #464856
        current_line: Color::Rgb(255, 255, 255), // #ffffff
        error: Color::Rgb(235, 111, 111),        // #eb6f6f
        success: Color::Rgb(132, 193, 125),      // #84c17d
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::NIGHT
    }
}
