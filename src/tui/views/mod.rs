// Views module - screen-level rendering
//
// Turns a `RenderPlan` into widgets. No state is read or changed here beyond
// the plan, the precomputed layout and the theme.

mod catalog;
mod logs;
mod welcome;

use super::components::status_bar;
use super::layout::DashboardLayout;
use super::render_plan::{RenderPlan, RightPanel};
use super::theme::Theme;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Frame;

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, layout: &DashboardLayout, plan: &RenderPlan, theme: &Theme) {
    f.render_widget(Block::default().style(Style::default().fg(theme.fg)), f.area());

    for (panel, area) in plan.categories.iter().zip(&layout.categories) {
        catalog::render_category(f, *area, panel, theme);
    }

    match &plan.right {
        contents @ RightPanel::Contents { .. } => {
            catalog::render_contents(f, layout.right, contents, theme)
        }
        RightPanel::Logs {
            title,
            lines,
            follow,
            position,
        } => logs::render(f, layout.right, title, lines, *follow, *position, theme),
    }

    status_bar::render(f, layout.status, &plan.status, theme);

    // Overlay last so it sits on top of everything
    if let Some(overlay) = &plan.overlay {
        welcome::render(f, overlay, theme);
    }
}
