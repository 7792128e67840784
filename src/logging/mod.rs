// Logging module - tracing setup and in-memory capture of internal events
//
// While the TUI owns the terminal nothing may be written to stdout/stderr, so
// internal events go to a small ring buffer instead. The status bar shows the
// most recent warning or error from that buffer.

use crate::config::{LogRotation, LoggingConfig};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{Level, Metadata, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Maximum number of diagnostics kept in memory
const MAX_ENTRIES: usize = 200;

/// A single internal event captured from tracing
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
}

/// Log level for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<&Level> for LogLevel {
    fn from(level: &Level) -> Self {
        match *level {
            Level::ERROR => LogLevel::Error,
            Level::WARN => LogLevel::Warn,
            Level::INFO => LogLevel::Info,
            Level::DEBUG => LogLevel::Debug,
            Level::TRACE => LogLevel::Trace,
        }
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    pub fn is_problem(&self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Warn)
    }
}

/// Bounded ring of internal events, shared between the tracing layer and the UI
#[derive(Clone, Default)]
pub struct DiagnosticsBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl DiagnosticsBuffer {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_ENTRIES))),
        }
    }

    // A panic while holding the lock must not take logging down with it
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add an entry, dropping the oldest when full
    pub fn add(&self, entry: LogEntry) {
        let mut entries = self.lock();
        if entries.len() >= MAX_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Most recent warning or error no older than `max_age`, formatted for the status bar
    pub fn latest_problem(&self, max_age: chrono::Duration) -> Option<String> {
        let cutoff = Utc::now() - max_age;
        self.lock()
            .iter()
            .rev()
            .take_while(|entry| entry.timestamp >= cutoff)
            .find(|entry| entry.level.is_problem())
            .map(|entry| format!("{}: {}", entry.level.as_str(), entry.message))
    }
}

/// Tracing layer that captures events into a `DiagnosticsBuffer`
pub struct TuiLogLayer {
    buffer: DiagnosticsBuffer,
}

impl TuiLogLayer {
    pub fn new(buffer: DiagnosticsBuffer) -> Self {
        Self { buffer }
    }
}

impl<S> Layer<S> for TuiLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.buffer.add(LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::from(metadata.level()),
            target: metadata.target().to_string(),
            message: visitor.finish(),
        });
    }

    fn enabled(&self, _metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        // Filtering happens at the subscriber level
        true
    }
}

/// Collects the message plus any structured fields as ` key=value`
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
            // Remove the quotes that Debug adds
            if self.message.len() >= 2 && self.message.starts_with('"') && self.message.ends_with('"')
            {
                self.message = self.message[1..self.message.len() - 1].to_string();
            }
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Install the global subscriber
///
/// With `diagnostics` set (TUI mode) events are captured in memory, otherwise
/// they go to stderr. File logging is added on top when enabled.
/// Precedence for the filter: RUST_LOG > `[logging] level` > info.
///
/// The returned guard must be kept alive so the file writer flushes.
pub fn init(config: &LoggingConfig, diagnostics: Option<DiagnosticsBuffer>) -> Option<WorkerGuard> {
    let default_filter = format!("azstore={}", config.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let (file_layer, guard) = if config.file_enabled {
        match std::fs::create_dir_all(&config.file_dir) {
            Ok(()) => {
                let appender = match config.file_rotation {
                    LogRotation::Hourly => {
                        tracing_appender::rolling::hourly(&config.file_dir, &config.file_prefix)
                    }
                    LogRotation::Daily => {
                        tracing_appender::rolling::daily(&config.file_dir, &config.file_prefix)
                    }
                    LogRotation::Never => {
                        tracing_appender::rolling::never(&config.file_dir, &config.file_prefix)
                    }
                };
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_ansi(false);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    config.file_dir, e
                );
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let (tui_layer, stderr_layer) = match diagnostics {
        Some(buffer) => (Some(TuiLogLayer::new(buffer)), None),
        None => (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        ),
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(tui_layer)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Warning: tracing already initialized: {}", e);
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: LogLevel, message: &str, age_secs: i64) -> LogEntry {
        LogEntry {
            timestamp: Utc::now() - chrono::Duration::seconds(age_secs),
            level,
            target: "azstore".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn buffer_is_bounded() {
        let buffer = DiagnosticsBuffer::new();
        for i in 0..(MAX_ENTRIES + 25) {
            buffer.add(entry(LogLevel::Info, &i.to_string(), 0));
        }
        assert_eq!(buffer.len(), MAX_ENTRIES);
    }

    #[test]
    fn latest_problem_skips_info_and_stale_entries() {
        let buffer = DiagnosticsBuffer::new();
        assert_eq!(buffer.latest_problem(chrono::Duration::seconds(30)), None);

        buffer.add(entry(LogLevel::Error, "old failure", 120));
        buffer.add(entry(LogLevel::Warn, "docker stop failed", 5));
        buffer.add(entry(LogLevel::Info, "attached", 1));

        assert_eq!(
            buffer.latest_problem(chrono::Duration::seconds(30)).as_deref(),
            Some("WARN: docker stop failed")
        );
        assert_eq!(buffer.latest_problem(chrono::Duration::seconds(2)), None);
    }

    #[test]
    fn layer_captures_message_and_fields() {
        let buffer = DiagnosticsBuffer::new();
        let subscriber = tracing_subscriber::registry().with(TuiLogLayer::new(buffer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(generation = 3, "stale line dropped");
        });

        assert_eq!(
            buffer.latest_problem(chrono::Duration::seconds(30)).as_deref(),
            Some("WARN: stale line dropped generation=3")
        );
    }
}
