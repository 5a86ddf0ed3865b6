//! Theme configuration.

pub mod palette;

pub use palette::Palette;

#[derive(Debug, Clone)]
pub struct Theme {
    pub palette: Palette,
}

impl Theme {
    pub fn new() -> Self {
        Self {
            palette: Palette::NIGHT,
        }
    }

    pub fn border_set(&self) -> ratatui::symbols::border::Set<'static> {
        ratatui::symbols::border::ROUNDED
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

pub fn get_theme() -> Theme {
    Theme::new()
}
