// TUI application state
//
// One owned `App` per session. Everything that changes what is on screen goes
// through `App::update`, so the event loop is a thin shell around it.

use super::input::{map_mouse, InputHandler};
use super::navigation::{NavEffect, NavKey, NavigationState};
use super::render_plan::RenderPlan;
use super::theme::{Theme, ThemeKind};
use crate::catalog::Catalog;
use crate::logging::DiagnosticsBuffer;
use crate::pipeline::{LogSnapshot, PipelineHandle};
use crossterm::event::{KeyEvent, MouseEvent};

/// How long an internal warning stays in the status bar
const NOTICE_MAX_AGE_SECS: i64 = 30;

/// Inputs to `App::update`
#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Periodic redraw
    Tick,
    /// The pipeline published a new snapshot
    LogsChanged(LogSnapshot),
}

pub struct App {
    catalog: Catalog,
    nav: NavigationState,
    pipeline: PipelineHandle,
    /// Latest copy published by the pipeline actor
    snapshot: LogSnapshot,
    input: InputHandler,
    pub theme: Theme,
    diagnostics: Option<DiagnosticsBuffer>,
    notice: Option<String>,
    pub should_quit: bool,
    /// Last height sent to the pipeline, to avoid resize spam
    last_log_height: Option<usize>,
}

impl App {
    pub fn new(
        catalog: Catalog,
        pipeline: PipelineHandle,
        theme: ThemeKind,
        show_welcome: bool,
    ) -> Self {
        let snapshot = pipeline.snapshot();
        Self {
            catalog,
            nav: NavigationState::new(show_welcome),
            pipeline,
            snapshot,
            input: InputHandler::new(),
            theme: theme.theme(),
            diagnostics: None,
            notice: None,
            should_quit: false,
            last_log_height: None,
        }
    }

    /// Show recent internal warnings from `buffer` in the status bar
    pub fn with_diagnostics(mut self, buffer: DiagnosticsBuffer) -> Self {
        self.diagnostics = Some(buffer);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    pub fn snapshot(&self) -> &LogSnapshot {
        &self.snapshot
    }

    /// Receiver for snapshots the pipeline publishes after this point
    pub fn subscribe_logs(&self) -> tokio::sync::watch::Receiver<LogSnapshot> {
        self.pipeline.subscribe()
    }

    pub fn update(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => {
                if let Some(nav_key) = self.input.translate(&key) {
                    self.apply(nav_key);
                }
            }
            AppEvent::Mouse(mouse) => {
                if let Some(nav_key) = map_mouse(&mouse) {
                    self.apply(nav_key);
                }
            }
            AppEvent::Tick => self.refresh_notice(),
            AppEvent::LogsChanged(snapshot) => self.snapshot = snapshot,
        }
    }

    fn apply(&mut self, key: NavKey) {
        match self.nav.handle(key, &self.catalog) {
            NavEffect::None => {}
            NavEffect::Scroll(request) => self.pipeline.scroll(request),
            NavEffect::Reattach => {
                tracing::info!("Reattach requested");
                self.pipeline.reattach();
            }
            NavEffect::Quit => self.should_quit = true,
        }
    }

    fn refresh_notice(&mut self) {
        if let Some(buffer) = &self.diagnostics {
            self.notice =
                buffer.latest_problem(chrono::Duration::seconds(NOTICE_MAX_AGE_SECS));
        }
    }

    /// Tell the pipeline how many log rows fit, once per change
    pub fn report_log_height(&mut self, height: usize) {
        if self.last_log_height != Some(height) {
            self.last_log_height = Some(height);
            self.pipeline.resize(height);
        }
    }

    pub fn plan(&self) -> RenderPlan {
        RenderPlan::build(&self.nav, &self.catalog, &self.snapshot).with_notice(self.notice.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogEntry, LogLevel};
    use crate::pipeline::{LogPipeline, PipelineConfig};
    use crate::source::testing::{ScriptedControl, ScriptedSource};
    use crate::tui::navigation::Focus;
    use crate::tui::render_plan::RightPanel;
    use chrono::Utc;
    use crossterm::event::{KeyCode, KeyEventKind, KeyEventState, KeyModifiers, MouseEventKind};
    use std::time::Duration;

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn release(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        })
    }

    async fn setup(show_welcome: bool) -> (App, LogPipeline, ScriptedControl) {
        let (source, control) = ScriptedSource::new();
        let pipeline = LogPipeline::spawn(source, PipelineConfig::default());
        let mut app = App::new(
            Catalog::sample(),
            pipeline.handle(),
            ThemeKind::Mono,
            show_welcome,
        );
        pump_until(&mut app, |s| s.streaming).await;
        (app, pipeline, control)
    }

    /// Feed pipeline snapshots into the app until `pred` holds
    async fn pump_until(app: &mut App, pred: impl Fn(&LogSnapshot) -> bool) {
        let mut rx = app.pipeline.subscribe();
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let snapshot = rx.borrow_and_update().clone();
                let done = pred(&snapshot);
                app.update(AppEvent::LogsChanged(snapshot));
                if done {
                    return;
                }
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("snapshot condition not reached");
    }

    #[tokio::test]
    async fn welcome_overlay_blocks_navigation_until_escape() {
        let (mut app, _pipeline, _control) = setup(true).await;

        app.update(press(KeyCode::Char('j')));
        assert_eq!(app.nav().selected_item(), 0);
        assert!(app.plan().overlay.is_some());

        app.update(press(KeyCode::Esc));
        assert!(app.plan().overlay.is_none());

        app.update(press(KeyCode::Char('j')));
        assert_eq!(app.nav().selected_item(), 1);
    }

    #[tokio::test]
    async fn quit_keys() {
        let (mut app, _pipeline, _control) = setup(true).await;
        assert!(!app.should_quit);
        // Quit works even with the overlay up
        app.update(press(KeyCode::Char('q')));
        assert!(app.should_quit);

        let (mut app, _pipeline, _control) = setup(false).await;
        app.update(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn logs_panel_shows_streamed_lines() {
        let (mut app, _pipeline, control) = setup(false).await;
        app.update(AppEvent::Key(KeyEvent::new(KeyCode::Char('L'), KeyModifiers::SHIFT)));
        assert_eq!(app.nav().focus(), Focus::LogPanel);

        app.report_log_height(5);
        pump_until(&mut app, |s| s.streaming && s.height == 5).await;

        let tx = control.sender(0);
        tx.send("PUT /devstoreaccount1/images 201".into()).await.unwrap();
        pump_until(&mut app, |s| s.len == 1).await;

        match app.plan().right {
            RightPanel::Logs { lines, follow, .. } => {
                assert!(follow);
                assert_eq!(lines[0].text, "PUT /devstoreaccount1/images 201");
            }
            other => panic!("expected logs panel, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn scroll_keys_reach_the_pipeline() {
        let (mut app, _pipeline, control) = setup(false).await;
        app.update(AppEvent::Key(KeyEvent::new(KeyCode::Char('L'), KeyModifiers::SHIFT)));
        app.report_log_height(2);

        let tx = control.sender(0);
        for i in 0..6 {
            tx.send(format!("line {i}")).await.unwrap();
        }
        pump_until(&mut app, |s| s.len == 6 && s.height == 2).await;
        assert_eq!(app.snapshot().origin, 4);

        app.update(press(KeyCode::Up));
        pump_until(&mut app, |s| !s.follow_tail).await;
        assert_eq!(app.snapshot().origin, 3);

        app.update(AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        }));
        pump_until(&mut app, |s| s.origin == 0).await;

        app.update(press(KeyCode::End));
        pump_until(&mut app, |s| s.follow_tail).await;
        assert_eq!(app.snapshot().origin, 4);
    }

    #[tokio::test]
    async fn reattach_key_restarts_the_stream() {
        let (mut app, _pipeline, control) = setup(false).await;
        control.sender(0).send("old".into()).await.unwrap();
        pump_until(&mut app, |s| s.len == 1).await;

        app.update(press(KeyCode::Char('r')));
        pump_until(&mut app, |s| s.generation == 2).await;
        assert_eq!(control.stream_count(), 2);

        // Second reattach after the key was released
        app.update(release(KeyCode::Char('r')));
        app.update(press(KeyCode::Char('r')));
        pump_until(&mut app, |s| s.generation == 3).await;
    }

    #[tokio::test]
    async fn height_is_reported_once_per_change() {
        let (mut app, _pipeline, _control) = setup(false).await;
        app.report_log_height(7);
        app.report_log_height(7);
        pump_until(&mut app, |s| s.height == 7).await;
        assert_eq!(app.last_log_height, Some(7));
    }

    #[tokio::test]
    async fn tick_surfaces_recent_warnings() {
        let (app, _pipeline, _control) = setup(false).await;
        let diagnostics = DiagnosticsBuffer::new();
        let mut app = app.with_diagnostics(diagnostics.clone());

        app.update(AppEvent::Tick);
        assert_eq!(app.plan().status.notice, None);

        diagnostics.add(LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Warn,
            target: "azstore::source::docker".into(),
            message: "docker stop failed".into(),
        });
        app.update(AppEvent::Tick);
        assert_eq!(
            app.plan().status.notice.as_deref(),
            Some("WARN: docker stop failed")
        );
    }
}
