//! Log ingestion pipeline
//!
//! One actor task owns the scrollback buffer and the log viewport. Everything
//! that mutates them arrives as a message, so buffer and viewport always change
//! together and the UI only ever sees consistent snapshots.
//!
//! # Architecture
//!
//! ```text
//! LogSource ─stream─▶ IngestTask ─Ingested─▶ ┐
//!                                             ├─▶ PipelineActor ─watch─▶ LogSnapshot ─▶ TUI
//! TUI ─────────── PipelineHandle ─Control──▶ ┘    (ScrollbackBuffer + Viewport)
//! ```
//!
//! Reattach swaps the stream under a new generation; lines still in flight
//! from the old generation are dropped by the actor.

pub mod ingest;
pub mod line;
pub mod scrollback;

use crate::source::{HandleId, LogSource, LogStream, SourceError};
use crate::tui::scroll::{PageStep, Viewport};
use ingest::{IngestTask, Ingested};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

pub use line::{LineKind, LogLine};
pub use scrollback::ScrollbackBuffer;

/// Control messages are few; lines get their own, larger queue
const CONTROL_CAPACITY: usize = 64;

/// Most queued lines folded into a single snapshot
const MAX_BATCH: usize = 256;

/// Pipeline tuning, usually built from `[scroll]` and `[source]` config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Scrollback capacity in lines
    pub capacity: usize,
    /// Queue between ingestion task and actor
    pub channel_capacity: usize,
    pub page_step: PageStep,
    pub reattach_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity: scrollback::DEFAULT_CAPACITY,
            channel_capacity: 200,
            page_step: PageStep::Viewport,
            reattach_timeout: Duration::from_secs(5),
        }
    }
}

/// Viewport movement requested by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRequest {
    By(i64),
    PageUp,
    PageDown,
    Top,
    Bottom,
    ToggleFollow,
}

/// Immutable view of the pipeline published after every processed message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSnapshot {
    /// The visible window, already sliced
    pub lines: Vec<LogLine>,
    /// Index of `lines[0]` in the scrollback
    pub origin: usize,
    /// Total lines in the scrollback
    pub len: usize,
    pub capacity: usize,
    pub height: usize,
    pub follow_tail: bool,
    pub generation: u64,
    /// Producer behind the current stream, if known
    pub handle: Option<HandleId>,
    pub source_label: String,
    /// Whether an ingestion task is currently attached
    pub streaming: bool,
}

impl LogSnapshot {
    /// Lines below the window
    pub fn lines_below(&self) -> usize {
        self.len.saturating_sub(self.origin + self.lines.len())
    }
}

enum Control {
    Scroll(ScrollRequest),
    Resize(usize),
    Reattach,
    Shutdown(oneshot::Sender<()>),
}

/// Clonable handle used by the UI to drive the pipeline
#[derive(Clone)]
pub struct PipelineHandle {
    tx: mpsc::Sender<Control>,
    snapshots: watch::Receiver<LogSnapshot>,
}

impl PipelineHandle {
    pub fn scroll(&self, request: ScrollRequest) {
        self.send(Control::Scroll(request));
    }

    /// Report the log panel's inner height
    pub fn resize(&self, height: usize) {
        self.send(Control::Resize(height));
    }

    pub fn reattach(&self) {
        self.send(Control::Reattach);
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> LogSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Fresh receiver for change notifications
    pub fn subscribe(&self) -> watch::Receiver<LogSnapshot> {
        self.snapshots.clone()
    }

    fn send(&self, command: Control) {
        // Never block the render loop; the actor drains control first
        if let Err(e) = self.tx.try_send(command) {
            tracing::warn!("Log pipeline command dropped: {}", e);
        }
    }
}

/// Owner of the pipeline actor task
pub struct LogPipeline {
    handle: PipelineHandle,
    join: JoinHandle<()>,
}

impl LogPipeline {
    /// Spawn the actor. The source is started from inside the actor task.
    pub fn spawn<S: LogSource>(source: S, config: PipelineConfig) -> Self {
        let (control_tx, control_rx) = mpsc::channel(CONTROL_CAPACITY);
        let (line_tx, line_rx) = mpsc::channel(config.channel_capacity.max(1));

        let buffer = ScrollbackBuffer::new(config.capacity);
        let viewport = Viewport::new(1).with_page_step(config.page_step);

        let initial = LogSnapshot {
            capacity: buffer.capacity(),
            height: viewport.height(),
            follow_tail: true,
            source_label: source.label().to_string(),
            ..LogSnapshot::default()
        };
        let (snapshot_tx, snapshots) = watch::channel(initial);

        let actor = PipelineActor {
            source,
            buffer,
            viewport,
            generation: 0,
            handle: None,
            ingest: None,
            line_tx,
            line_rx,
            control_rx,
            snapshot_tx,
            reattach_timeout: config.reattach_timeout,
        };
        let join = tokio::spawn(actor.run());

        Self {
            handle: PipelineHandle {
                tx: control_tx,
                snapshots,
            },
            join,
        }
    }

    pub fn handle(&self) -> PipelineHandle {
        self.handle.clone()
    }

    /// Stop ingestion and the source, waiting at most `timeout`
    pub async fn shutdown(self, timeout: Duration) -> anyhow::Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        if self.handle.tx.send(Control::Shutdown(done_tx)).await.is_err() {
            // Actor already gone
            return Ok(());
        }

        match tokio::time::timeout(timeout, done_rx).await {
            Ok(_) => {
                let _ = self.join.await;
                tracing::debug!("Log pipeline shutdown complete");
                Ok(())
            }
            Err(_) => {
                tracing::warn!("Log pipeline did not stop within {:?}", timeout);
                self.join.abort();
                Err(anyhow::anyhow!("Log pipeline shutdown timeout"))
            }
        }
    }
}

struct PipelineActor<S: LogSource> {
    source: S,
    buffer: ScrollbackBuffer,
    viewport: Viewport,
    generation: u64,
    handle: Option<HandleId>,
    ingest: Option<IngestTask>,
    /// Cloned into every ingestion task
    line_tx: mpsc::Sender<Ingested>,
    line_rx: mpsc::Receiver<Ingested>,
    control_rx: mpsc::Receiver<Control>,
    snapshot_tx: watch::Sender<LogSnapshot>,
    reattach_timeout: Duration,
}

impl<S: LogSource> PipelineActor<S> {
    async fn run(mut self) {
        tracing::info!(source = self.source.label(), "Log pipeline started");
        self.start_source().await;
        self.publish();

        loop {
            tokio::select! {
                biased;

                command = self.control_rx.recv() => match command {
                    Some(Control::Shutdown(done)) => {
                        self.shutdown().await;
                        let _ = done.send(());
                        break;
                    }
                    Some(command) => self.handle_control(command).await,
                    None => {
                        // Every handle dropped
                        self.shutdown().await;
                        break;
                    }
                },
                Some(message) = self.line_rx.recv() => {
                    let mut received = self.handle_ingested(message);
                    let mut batched = 1;
                    while batched < MAX_BATCH {
                        match self.line_rx.try_recv() {
                            Ok(message) => received |= self.handle_ingested(message),
                            Err(_) => break,
                        }
                        batched += 1;
                    }
                    // A freshly launched producer may only get its ID after start()
                    if received && self.handle.is_none() {
                        self.handle = self.source.current_handle_id().await;
                    }
                }
            }
            self.publish();
        }

        tracing::info!("Log pipeline stopped");
    }

    async fn start_source(&mut self) {
        match self.source.start().await {
            Ok(stream) => {
                self.handle = self.source.current_handle_id().await;
                self.attach(stream);
            }
            Err(e) => {
                tracing::error!(error = %e, "Log source failed to start");
                self.append(LogLine::error(format!("Failed to start log source: {}", e)));
            }
        }
    }

    async fn handle_control(&mut self, command: Control) {
        match command {
            Control::Scroll(request) => self.scroll(request),
            Control::Resize(height) => {
                if height.max(1) != self.viewport.height() {
                    self.viewport.resize(height);
                }
            }
            Control::Reattach => self.reattach().await,
            // Handled by the run loop
            Control::Shutdown(_) => {}
        }
    }

    fn scroll(&mut self, request: ScrollRequest) {
        match request {
            ScrollRequest::By(delta) => self.viewport.scroll_by(delta),
            ScrollRequest::PageUp => self.viewport.page_up(),
            ScrollRequest::PageDown => self.viewport.page_down(),
            ScrollRequest::Top => self.viewport.scroll_to_top(),
            ScrollRequest::Bottom => self.viewport.scroll_to_bottom(),
            ScrollRequest::ToggleFollow => self.viewport.toggle_follow(),
        }
    }

    /// Returns whether a line from the current stream was appended
    fn handle_ingested(&mut self, message: Ingested) -> bool {
        if message.generation() != self.generation {
            tracing::trace!(
                stale = message.generation(),
                current = self.generation,
                "Dropping line from detached stream"
            );
            return false;
        }

        match message {
            Ingested::Line { text, .. } => {
                self.append(LogLine::source(text));
                true
            }
            Ingested::Ended { .. } => {
                self.ingest = None;
                tracing::info!(generation = self.generation, "Log stream ended");
                self.append(LogLine::notice("log stream ended"));
                false
            }
        }
    }

    /// Swap to a fresh stream from the same producer
    ///
    /// On failure nothing changes except one appended error line.
    async fn reattach(&mut self) {
        let timeout = self.reattach_timeout;
        let source = &mut self.source;
        let attempt = async move {
            let handle = source
                .current_handle_id()
                .await
                .ok_or(SourceError::NoHandle)?;
            let stream = source.attach_to(&handle).await?;
            Ok::<_, SourceError>((handle, stream))
        };

        let result = match tokio::time::timeout(timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(timeout)),
        };

        match result {
            Ok((handle, stream)) => {
                if let Some(old) = self.ingest.take() {
                    // Not awaited; the generation bump already isolates it
                    drop(old.cancel());
                }
                if !self.buffer.is_empty() {
                    tracing::debug!(lines = self.buffer.len(), "Clearing scrollback");
                }
                self.buffer.clear();
                self.viewport.on_clear();
                tracing::info!(handle = %handle.short(), "Reattached log source");
                self.handle = Some(handle);
                self.attach(stream);
                self.append(LogLine::notice(format!(
                    "Reattached to {}",
                    self.handle.as_ref().map_or("", |h| h.short())
                )));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Reattach failed");
                self.append(LogLine::error(format!("Reattach failed: {}", e)));
            }
        }
    }

    /// Start ingesting `stream` under a new generation
    fn attach(&mut self, stream: LogStream) {
        self.generation += 1;
        self.ingest = Some(IngestTask::spawn(
            self.generation,
            stream,
            self.line_tx.clone(),
        ));
    }

    fn append(&mut self, line: LogLine) {
        self.buffer.append(line);
        self.viewport.on_append(self.buffer.len());
    }

    async fn shutdown(&mut self) {
        if let Some(task) = self.ingest.take() {
            let generation = task.generation();
            let join = task.cancel();
            if join.await.is_err() {
                tracing::warn!(generation, "Ingestion task panicked");
            }
        }
        self.source.stop().await;
    }

    fn publish(&self) {
        let (start, end) = self.viewport.visible_range();
        let snapshot = LogSnapshot {
            lines: self.buffer.slice(start, end),
            origin: start,
            len: self.buffer.len(),
            capacity: self.buffer.capacity(),
            height: self.viewport.height(),
            follow_tail: self.viewport.is_following(),
            generation: self.generation,
            handle: self.handle.clone(),
            source_label: self.source.label().to_string(),
            streaming: self.ingest.is_some(),
        };
        self.snapshot_tx.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::{ScriptedControl, ScriptedSource};

    fn config(capacity: usize) -> PipelineConfig {
        PipelineConfig {
            capacity,
            reattach_timeout: Duration::from_millis(200),
            ..PipelineConfig::default()
        }
    }

    async fn spawn(capacity: usize) -> (LogPipeline, ScriptedControl) {
        let (source, control) = ScriptedSource::new();
        let pipeline = LogPipeline::spawn(source, config(capacity));
        let handle = pipeline.handle();
        wait_for(&handle, |s| s.streaming).await;
        (pipeline, control)
    }

    /// Wait until a published snapshot satisfies `pred`
    async fn wait_for(
        handle: &PipelineHandle,
        pred: impl Fn(&LogSnapshot) -> bool,
    ) -> LogSnapshot {
        let mut rx = handle.subscribe();
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                {
                    let snapshot = rx.borrow_and_update();
                    if pred(&snapshot) {
                        return snapshot.clone();
                    }
                }
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("snapshot condition not reached")
    }

    async fn all_lines(handle: &PipelineHandle, height: usize) -> Vec<String> {
        handle.resize(height);
        let snapshot = wait_for(handle, |s| s.height == height).await;
        snapshot.lines.into_iter().map(|l| l.text).collect()
    }

    #[tokio::test]
    async fn appends_and_follows() {
        let (pipeline, control) = spawn(500).await;
        let handle = pipeline.handle();
        handle.resize(3);

        let tx = control.sender(0);
        for i in 0..10 {
            tx.send(format!("line {i}")).await.unwrap();
        }

        let snapshot = wait_for(&handle, |s| s.len == 10 && s.height == 3).await;
        assert!(snapshot.follow_tail);
        assert_eq!(snapshot.origin, 7);
        let texts: Vec<_> = snapshot.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["line 7", "line 8", "line 9"]);
    }

    #[tokio::test]
    async fn eviction_with_manual_scroll() {
        let (pipeline, control) = spawn(5).await;
        let handle = pipeline.handle();
        handle.resize(3);

        let tx = control.sender(0);
        for text in ["a", "b", "c", "d", "e", "f"] {
            tx.send(text.into()).await.unwrap();
        }
        let snapshot = wait_for(&handle, |s| {
            s.height == 3 && s.lines.last().map(|l| l.text.as_str()) == Some("f")
        })
        .await;
        assert_eq!(snapshot.len, 5);
        assert_eq!(snapshot.origin, 2);

        handle.scroll(ScrollRequest::By(-1));
        let snapshot = wait_for(&handle, |s| !s.follow_tail).await;
        assert_eq!(snapshot.origin, 1);

        tx.send("g".into()).await.unwrap();
        let snapshot = wait_for(&handle, |s| {
            s.lines.first().map(|l| l.text.as_str()) == Some("d")
        })
        .await;
        // [c d e f g] with the window still at origin 1
        assert_eq!(snapshot.origin, 1);
        let texts: Vec<_> = snapshot.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["d", "e", "f"]);
    }

    #[tokio::test]
    async fn reattach_clears_and_isolates_old_stream() {
        let (pipeline, control) = spawn(500).await;
        let handle = pipeline.handle();

        let old = control.sender(0);
        old.send("before".into()).await.unwrap();
        wait_for(&handle, |s| s.len == 1).await;

        handle.reattach();
        let snapshot = wait_for(&handle, |s| s.generation == 2).await;
        assert_eq!(snapshot.handle, Some(HandleId::new("scripted-1")));
        assert!(snapshot.follow_tail);

        // Old ingestion task stopped: its stream has no reader any more
        tokio::time::timeout(Duration::from_secs(2), old.closed())
            .await
            .unwrap();
        assert!(old.send("late".into()).await.is_err());

        control.sender(1).send("after".into()).await.unwrap();
        let texts = {
            wait_for(&handle, |s| s.len == 2).await;
            all_lines(&handle, 10).await
        };
        assert_eq!(texts, vec!["Reattached to scripted-1", "after"]);
    }

    #[tokio::test]
    async fn queued_lines_from_old_stream_are_dropped() {
        let (source, control) = ScriptedSource::new();
        let pipeline = LogPipeline::spawn(
            source,
            PipelineConfig {
                channel_capacity: 1_000,
                ..config(500)
            },
        );
        let handle = pipeline.handle();
        wait_for(&handle, |s| s.streaming).await;

        // The actor sits inside reattach while old lines pile up in its queue
        let gate = control.hold_attach();
        handle.reattach();

        let old = control.sender(0);
        for i in 0..150 {
            old.send(format!("old {i}")).await.unwrap();
        }
        tokio::time::timeout(Duration::from_secs(2), async {
            while old.capacity() < old.max_capacity() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("ingestion task never drained the old stream");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handle.snapshot().len, 0);

        gate.notify_one();
        wait_for(&handle, |s| s.generation == 2).await;

        control.sender(1).send("new".into()).await.unwrap();
        wait_for(&handle, |s| s.lines.iter().any(|l| l.text == "new")).await;

        let texts = all_lines(&handle, 200).await;
        assert_eq!(texts, vec!["Reattached to scripted-1", "new"]);
    }

    #[tokio::test]
    async fn handle_learned_from_first_line_when_start_had_none() {
        let (source, control) = ScriptedSource::new();
        control.set_handle(None);
        let pipeline = LogPipeline::spawn(source, config(500));
        let handle = pipeline.handle();
        let snapshot = wait_for(&handle, |s| s.streaming).await;
        assert_eq!(snapshot.handle, None);

        // Producer gets its ID once it is up, then speaks
        control.set_handle(Some("late-container"));
        control.sender(0).send("Azurite Blob service is successfully listening".into()).await.unwrap();

        let snapshot = wait_for(&handle, |s| s.len == 1).await;
        assert_eq!(snapshot.handle, Some(HandleId::new("late-container")));
    }

    #[tokio::test]
    async fn failed_reattach_keeps_buffer_and_stream() {
        let (pipeline, control) = spawn(500).await;
        let handle = pipeline.handle();
        control.sender(0).send("kept".into()).await.unwrap();
        wait_for(&handle, |s| s.len == 1).await;

        control.set_fail_attach(true);
        handle.reattach();
        let snapshot = wait_for(&handle, |s| s.len == 2).await;
        assert_eq!(snapshot.generation, 1);

        // Old stream is still attached
        control.sender(0).send("still here".into()).await.unwrap();
        wait_for(&handle, |s| s.len == 3).await;

        let snapshot = {
            handle.resize(10);
            wait_for(&handle, |s| s.height == 10).await
        };
        assert_eq!(snapshot.lines[0].text, "kept");
        assert_eq!(snapshot.lines[1].kind, LineKind::Error);
        assert!(snapshot.lines[1].text.starts_with("Reattach failed:"));
        assert_eq!(snapshot.lines[2].text, "still here");
    }

    #[tokio::test]
    async fn reattach_without_handle_fails() {
        let (pipeline, control) = spawn(500).await;
        let handle = pipeline.handle();
        control.set_handle(None);

        handle.reattach();
        let snapshot = wait_for(&handle, |s| s.len == 1).await;
        assert_eq!(
            snapshot.lines[0].text,
            format!("Reattach failed: {}", SourceError::NoHandle)
        );
        assert_eq!(snapshot.generation, 1);
    }

    #[tokio::test]
    async fn reattach_times_out() {
        let (pipeline, control) = spawn(500).await;
        let handle = pipeline.handle();
        control.set_hang_attach(true);

        handle.reattach();
        let snapshot = wait_for(&handle, |s| s.len == 1).await;
        assert_eq!(snapshot.lines[0].kind, LineKind::Error);
        assert!(snapshot.lines[0].text.contains("timed out"));
        assert_eq!(snapshot.generation, 1);
        assert!(snapshot.streaming);
    }

    #[tokio::test]
    async fn start_failure_is_one_error_line() {
        let (source, control) = ScriptedSource::new();
        control.set_fail_start(true);
        let pipeline = LogPipeline::spawn(source, config(500));
        let handle = pipeline.handle();

        let snapshot = wait_for(&handle, |s| s.len == 1).await;
        assert_eq!(snapshot.lines[0].kind, LineKind::Error);
        assert!(snapshot.lines[0].text.starts_with("Failed to start log source"));
        assert!(!snapshot.streaming);

        // Reattach still works afterwards
        handle.reattach();
        let snapshot = wait_for(&handle, |s| s.streaming).await;
        assert_eq!(snapshot.generation, 1);
    }

    #[tokio::test]
    async fn stream_end_appends_notice() {
        let (pipeline, control) = spawn(500).await;
        let handle = pipeline.handle();
        handle.resize(10);
        control.sender(0).send("last".into()).await.unwrap();
        control.close(0);

        let snapshot = wait_for(&handle, |s| !s.streaming && s.height == 10).await;
        assert_eq!(snapshot.len, 2);
        assert_eq!(snapshot.lines[1].text, "log stream ended");
        assert_eq!(snapshot.lines[1].kind, LineKind::Notice);
    }

    #[tokio::test]
    async fn scroll_requests_move_viewport() {
        let (pipeline, control) = spawn(500).await;
        let handle = pipeline.handle();
        handle.resize(4);

        let tx = control.sender(0);
        for i in 0..20 {
            tx.send(i.to_string()).await.unwrap();
        }
        wait_for(&handle, |s| s.len == 20 && s.height == 4).await;

        handle.scroll(ScrollRequest::Top);
        let snapshot = wait_for(&handle, |s| s.origin == 0).await;
        assert!(!snapshot.follow_tail);
        assert_eq!(snapshot.lines_below(), 16);

        handle.scroll(ScrollRequest::PageDown);
        wait_for(&handle, |s| s.origin == 4).await;

        handle.scroll(ScrollRequest::ToggleFollow);
        let snapshot = wait_for(&handle, |s| s.follow_tail).await;
        assert_eq!(snapshot.origin, 16);
    }

    #[tokio::test]
    async fn shutdown_stops_source() {
        let (pipeline, control) = spawn(500).await;
        let stream = control.sender(0);

        pipeline.shutdown(Duration::from_secs(2)).await.unwrap();
        assert!(control.stopped());
        assert!(stream.is_closed());
    }
}
