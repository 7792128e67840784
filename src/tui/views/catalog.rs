// Catalog panels: one list per category on the left, contents on the right

use crate::tui::components::render_scrollbar;
use crate::tui::render_plan::{CategoryPanel, RightPanel};
use crate::tui::scroll::Viewport;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const MARKER: &str = "> ";
const NO_MARKER: &str = "  ";

/// First row to show so that `highlighted` stays inside `height` rows
fn first_visible(highlighted: Option<usize>, len: usize, height: usize) -> usize {
    let mut view = Viewport::manual(height);
    view.on_append(len);
    if let Some(row) = highlighted {
        view.reveal(row);
    }
    view.origin()
}

fn list_lines<'a>(
    rows: &'a [String],
    highlighted: Option<usize>,
    offset: usize,
    height: usize,
    theme: &Theme,
) -> Vec<Line<'a>> {
    rows.iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, row)| {
            if highlighted == Some(i) {
                Line::from(Span::styled(format!("{MARKER}{row}"), theme.selected_style()))
            } else {
                Line::from(format!("{NO_MARKER}{row}"))
            }
        })
        .collect()
}

fn bordered<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(focused))
        .title(Span::styled(format!(" {} ", title), theme.title_style()))
}

pub fn render_category(f: &mut Frame, area: Rect, panel: &CategoryPanel, theme: &Theme) {
    let block = bordered(&panel.title, panel.active, theme);
    let inner = block.inner(area);
    let height = usize::from(inner.height);

    let offset = first_visible(panel.highlighted, panel.items.len(), height);
    let lines = list_lines(&panel.items, panel.highlighted, offset, height, theme);

    f.render_widget(Paragraph::new(lines).block(block), area);
    render_scrollbar(f, area, panel.items.len(), height, offset, theme.muted_style());
}

pub fn render_contents(f: &mut Frame, area: Rect, panel: &RightPanel, theme: &Theme) {
    let RightPanel::Contents {
        title,
        entries,
        highlighted,
        empty_message,
        focused,
    } = panel
    else {
        return;
    };

    let block = bordered(title, *focused, theme);
    let inner = block.inner(area);
    let height = usize::from(inner.height);

    let offset = first_visible(*highlighted, entries.len(), height);
    let lines = match empty_message {
        Some(message) => vec![Line::from(Span::styled(*message, theme.muted_style()))],
        None => list_lines(entries, *highlighted, offset, height, theme),
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
    render_scrollbar(f, area, entries.len(), height, offset, theme.muted_style());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlighted_row_stays_visible() {
        assert_eq!(first_visible(None, 10, 3), 0);
        assert_eq!(first_visible(Some(2), 10, 3), 0);
        assert_eq!(first_visible(Some(3), 10, 3), 1);
        assert_eq!(first_visible(Some(9), 10, 3), 7);
        // Everything fits
        assert_eq!(first_visible(Some(2), 3, 5), 0);
    }

    #[test]
    fn marker_only_on_highlighted_row() {
        let rows = vec!["images".to_string(), "logs".to_string()];
        let lines = list_lines(&rows, Some(1), 0, 5, &Theme::mono());
        assert_eq!(lines[0].to_string(), "  images");
        assert_eq!(lines[1].to_string(), "> logs");
    }
}
