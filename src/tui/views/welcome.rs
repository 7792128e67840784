// Welcome overlay: key help shown on startup until Esc

use crate::tui::render_plan::WelcomeOverlay;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Calculate centered rect for the overlay
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

pub fn render(f: &mut Frame, overlay: &WelcomeOverlay, theme: &Theme) {
    let widest = overlay
        .lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    // Borders plus one column of padding each side
    let width = u16::try_from(widest + 4).unwrap_or(u16::MAX);
    let height = u16::try_from(overlay.lines.len() + 2).unwrap_or(u16::MAX);
    let area = centered_rect(width, height, f.area());

    f.render_widget(Clear, area);

    let lines: Vec<Line> = overlay
        .lines
        .iter()
        .map(|line| Line::from(*line).centered())
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(true).fg(theme.overlay_border))
            .title(Span::styled(format!(" {} ", overlay.title), theme.title_style())),
    );

    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_rect(50, 40, area), Rect::new(0, 0, 20, 10));
    }
}
