// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard/mouse input, timer ticks, log snapshots)
// - Rendering the UI from a `RenderPlan`

pub mod app;
pub mod components;
pub mod input;
pub mod layout;
pub mod navigation;
pub mod render_plan;
pub mod scroll;
pub mod theme;
pub mod views;

use anyhow::{Context, Result};
use app::{App, AppEvent};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use layout::DashboardLayout;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io;
use std::time::Duration;

/// Run the TUI
///
/// Sets up the terminal, runs the event loop until the user quits, then
/// restores the terminal even if the loop failed.
pub async fn run_tui(mut app: App, tick: Duration) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to setup terminal");
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut app, tick).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on three sources at once:
/// 1. Keyboard and mouse input
/// 2. Timer ticks (status bar refresh)
/// 3. New log snapshots, only while the log panel is visible
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick: Duration,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(tick);
    let mut snapshots = app.subscribe_logs();

    loop {
        // Layout first so the pipeline learns the panel height before the draw
        let size = terminal.size().context("Failed to read terminal size")?;
        let area = Rect::new(0, 0, size.width, size.height);
        let layout = DashboardLayout::compute(area, app.catalog().category_count());
        app.report_log_height(layout.log_height());

        let plan = app.plan();
        terminal
            .draw(|f| views::draw(f, &layout, &plan, &app.theme))
            .context("Failed to draw terminal")?;

        let log_visible = app.nav().log_visible();

        tokio::select! {
            event = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            } => {
                match event {
                    Some(Event::Key(key)) => app.update(AppEvent::Key(key)),
                    Some(Event::Mouse(mouse)) => app.update(AppEvent::Mouse(mouse)),
                    _ => {}
                }
            }

            _ = tick_interval.tick() => app.update(AppEvent::Tick),

            changed = snapshots.changed(), if log_visible => {
                if changed.is_err() {
                    tracing::warn!("Log pipeline stopped publishing");
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                app.update(AppEvent::LogsChanged(snapshot));
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
