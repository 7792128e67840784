// Screen layout: category panels stacked on the left, one wide panel on the
// right, a status line at the bottom.
//
// Computed once per frame, before drawing, so the log panel's inner height can
// be reported to the pipeline ahead of the render pass.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width threshold between the compact and the regular layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    /// < 80 cols: wider left column, terse status line
    Compact,
    Regular,
}

impl Breakpoint {
    pub fn from_width(width: u16) -> Self {
        if width < 80 {
            Breakpoint::Compact
        } else {
            Breakpoint::Regular
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardLayout {
    /// One area per catalog category, top to bottom
    pub categories: Vec<Rect>,
    /// Contents or log panel
    pub right: Rect,
    pub status: Rect,
    pub breakpoint: Breakpoint,
}

impl DashboardLayout {
    pub fn compute(area: Rect, category_count: usize) -> Self {
        let breakpoint = Breakpoint::from_width(area.width);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);
        let (body, status) = (rows[0], rows[1]);

        let left_pct = match breakpoint {
            Breakpoint::Compact => 40,
            Breakpoint::Regular => 33,
        };
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(left_pct),
                Constraint::Percentage(100 - left_pct),
            ])
            .split(body);

        Self {
            categories: split_evenly(columns[0], category_count),
            right: columns[1],
            status,
            breakpoint,
        }
    }

    /// Rows available for log lines inside the right panel's border
    pub fn log_height(&self) -> usize {
        usize::from(self.right.height.saturating_sub(2)).max(1)
    }
}

/// Split `area` into `count` rows of equal height; leftover rows go to the top
fn split_evenly(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }

    let count_u16 = u16::try_from(count).unwrap_or(u16::MAX);
    let base = area.height / count_u16;
    let remainder = area.height % count_u16;

    let mut y = area.y;
    (0..count_u16)
        .map(|i| {
            let height = base + u16::from(i < remainder);
            let rect = Rect::new(area.x, y, area.width, height);
            y += height;
            rect
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_goes_to_top_panels() {
        let heights: Vec<u16> = split_evenly(Rect::new(0, 0, 30, 22), 4)
            .iter()
            .map(|r| r.height)
            .collect();
        assert_eq!(heights, vec![6, 6, 5, 5]);
    }

    #[test]
    fn panels_are_contiguous() {
        let rects = split_evenly(Rect::new(0, 1, 30, 23), 4);
        assert_eq!(rects[0].y, 1);
        for pair in rects.windows(2) {
            assert_eq!(pair[0].y + pair[0].height, pair[1].y);
        }
        assert_eq!(rects[3].y + rects[3].height, 24);
    }

    #[test]
    fn full_layout() {
        let layout = DashboardLayout::compute(Rect::new(0, 0, 120, 40), 4);
        assert_eq!(layout.breakpoint, Breakpoint::Regular);
        assert_eq!(layout.categories.len(), 4);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.right.height, 39);
        assert_eq!(layout.log_height(), 37);
        assert!(layout.right.x > 0);
    }

    #[test]
    fn tiny_terminal_still_has_one_log_row() {
        let layout = DashboardLayout::compute(Rect::new(0, 0, 20, 3), 4);
        assert_eq!(layout.breakpoint, Breakpoint::Compact);
        assert!(layout.log_height() >= 1);
    }
}
