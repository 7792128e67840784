//! Scrollbar rendering helper

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Render a vertical scrollbar on the right edge of `area`
///
/// Nothing is drawn when everything fits or the area is too short for the arrows.
///
/// * `total` - Total number of lines
/// * `viewport` - Visible lines
/// * `offset` - Index of the first visible line
pub fn render_scrollbar(
    f: &mut Frame,
    area: Rect,
    total: usize,
    viewport: usize,
    offset: usize,
    style: Style,
) {
    if total <= viewport || area.height < 3 {
        return;
    }

    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"))
        .style(style);

    // ScrollbarState wants how far the content can scroll, not its length
    let content_length = total.saturating_sub(viewport);
    let mut scrollbar_state = ScrollbarState::new(content_length).position(offset);

    f.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
}
