// Color themes for the dashboard
//
// Selected by the top-level `theme` config key.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

/// Available themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
    /// No colors beyond the terminal's own, for recordings and dumb terminals
    Mono,
}

impl ThemeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ThemeKind::Dark => "dark",
            ThemeKind::Light => "light",
            ThemeKind::Mono => "mono",
        }
    }

    pub fn theme(&self) -> Theme {
        match self {
            ThemeKind::Dark => Theme::dark(),
            ThemeKind::Light => Theme::light(),
            ThemeKind::Mono => Theme::mono(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub fg: Color,
    pub border: Color,
    pub border_focused: Color,
    pub title: Color,
    /// Selection marker and highlighted row
    pub selection: Color,
    /// Empty-list messages, scroll position
    pub muted: Color,
    /// Synthetic notice lines in the log panel
    pub notice: Color,
    pub error: Color,
    pub status_bar: Color,
    pub overlay_border: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            fg: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            title: Color::Cyan,
            selection: Color::Cyan,
            muted: Color::DarkGray,
            notice: Color::Yellow,
            error: Color::Red,
            status_bar: Color::Gray,
            overlay_border: Color::Magenta,
        }
    }

    pub fn light() -> Self {
        Self {
            fg: Color::Black,
            border: Color::Gray,
            border_focused: Color::Blue,
            title: Color::Blue,
            selection: Color::Blue,
            muted: Color::Gray,
            notice: Color::Rgb(175, 95, 0),
            error: Color::Red,
            status_bar: Color::DarkGray,
            overlay_border: Color::Magenta,
        }
    }

    pub fn mono() -> Self {
        Self {
            fg: Color::Reset,
            border: Color::Reset,
            border_focused: Color::Reset,
            title: Color::Reset,
            selection: Color::Reset,
            muted: Color::Reset,
            notice: Color::Reset,
            error: Color::Reset,
            status_bar: Color::Reset,
            overlay_border: Color::Reset,
        }
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .fg(self.border_focused)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    /// Selected row; reversed so it still shows in the mono theme
    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.selection)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted).add_modifier(Modifier::ITALIC)
    }

    pub fn notice_style(&self) -> Style {
        Style::default().fg(self.notice)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub fn status_style(&self) -> Style {
        Style::default().fg(self.status_bar)
    }
}

impl Default for Theme {
    fn default() -> Self {
        ThemeKind::default().theme()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_kind_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            theme: ThemeKind,
        }
        let parsed: Wrapper = toml::from_str("theme = \"light\"").unwrap();
        assert_eq!(parsed.theme, ThemeKind::Light);
        assert!(toml::from_str::<Wrapper>("theme = \"neon\"").is_err());
    }

    #[test]
    fn mono_has_no_colors() {
        let theme = ThemeKind::Mono.theme();
        assert_eq!(theme.fg, Color::Reset);
        assert_eq!(theme.error, Color::Reset);
    }
}
