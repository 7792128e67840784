// Status bar component
//
// Focused panel, follow state, log source and buffer fill, plus the most
// recent internal warning when there is one.

use crate::tui::layout::Breakpoint;
use crate::tui::render_plan::StatusLine;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Plain text of the status line, adapted to the terminal width
pub fn status_text(status: &StatusLine, bp: Breakpoint) -> String {
    let stream = match (&status.handle, status.streaming) {
        (Some(handle), true) => format!("{} {}", status.source, handle),
        (None, true) => status.source.clone(),
        (_, false) => format!("{} (not streaming)", status.source),
    };

    match bp {
        Breakpoint::Compact => {
            let follow = match status.follow {
                Some(true) => " │ ▼",
                Some(false) => " │ ‖",
                None => "",
            };
            format!(" {}{} │ {}/{}", status.focus, follow, status.buffered, status.capacity)
        }
        Breakpoint::Regular => {
            let follow = match status.follow {
                Some(true) => " │ following".to_string(),
                Some(false) if status.below > 0 => {
                    format!(" │ paused, {} below (F to follow)", status.below)
                }
                Some(false) => " │ paused (F to follow)".to_string(),
                None => String::new(),
            };
            format!(
                " {}{} │ {} │ {}/{} lines │ q quit",
                status.focus, follow, stream, status.buffered, status.capacity
            )
        }
    }
}

pub fn render(f: &mut Frame, area: Rect, status: &StatusLine, theme: &Theme) {
    let bp = Breakpoint::from_width(area.width);

    let mut spans = vec![Span::styled(status_text(status, bp), theme.status_style())];
    if let Some(notice) = &status.notice {
        spans.push(Span::styled(format!(" │ {}", notice), theme.error_style()));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
