// Log panel: the visible window of the scrollback

use crate::pipeline::{LineKind, LogLine};
use crate::tui::components::render_scrollbar;
use crate::tui::render_plan::ScrollPosition;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn styled_line<'a>(line: &'a LogLine, theme: &Theme) -> Line<'a> {
    match line.kind {
        LineKind::Source => Line::from(line.text.as_str()),
        LineKind::Notice => Line::from(Span::styled(line.text.as_str(), theme.notice_style())),
        LineKind::Error => Line::from(Span::styled(line.text.as_str(), theme.error_style())),
    }
}

/// "12-40/500" style indicator, empty when there is nothing to scroll
fn position_label(position: ScrollPosition) -> String {
    if position.len <= position.height {
        return String::new();
    }
    let last = (position.origin + position.height).min(position.len);
    format!(" {}-{}/{} ", position.origin + 1, last, position.len)
}

pub fn render(
    f: &mut Frame,
    area: Rect,
    title: &str,
    lines: &[LogLine],
    follow: bool,
    position: ScrollPosition,
    theme: &Theme,
) {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(true))
        .title(Span::styled(format!(" {} ", title), theme.title_style()));

    let label = position_label(position);
    if !label.is_empty() {
        let style = if follow {
            theme.muted_style()
        } else {
            theme.notice_style()
        };
        block = block.title_bottom(Line::from(Span::styled(label, style)).right_aligned());
    }

    let text: Vec<Line> = lines.iter().map(|line| styled_line(line, theme)).collect();
    f.render_widget(Paragraph::new(text).block(block), area);

    render_scrollbar(
        f,
        area,
        position.len,
        position.height,
        position.origin,
        theme.muted_style(),
    );
}
