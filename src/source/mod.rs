//! Log sources - the external producers feeding the log panel
//!
//! A source hands out `LogStream`s: bounded channels of raw text lines that
//! close when the producer stops. The pipeline never looks behind the stream,
//! so the Docker-backed source and the demo generator are interchangeable.
//!
//! # Contract
//!
//! ```text
//! start()               -> LogStream | SourceError
//! stop()
//! current_handle_id()   -> Option<HandleId>
//! attach_to(&HandleId)  -> LogStream | SourceError
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

pub mod demo;
pub mod docker;

#[cfg(test)]
pub mod testing;

pub use demo::DemoSource;
pub use docker::DockerSource;

/// Buffer between a producer and the ingestion task
pub const STREAM_CAPACITY: usize = 200;

/// Lazy, unbounded, non-restartable sequence of text lines.
/// `recv()` returning `None` means the producer stopped.
pub type LogStream = mpsc::Receiver<String>;

/// Create the channel pair backing a `LogStream`
pub fn stream_channel() -> (mpsc::Sender<String>, LogStream) {
    mpsc::channel(STREAM_CAPACITY)
}

/// Opaque identifier of the producer behind a stream (a container ID for Docker)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandleId(String);

impl HandleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, the way `docker ps` prints container IDs
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(12) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised while starting or attaching to a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The helper program could not be launched at all
    Spawn { command: String, message: String },
    /// The helper program ran but reported failure
    CommandFailed { command: String, message: String },
    /// No running producer to attach to
    NoHandle,
    /// The operation did not finish in time
    Timeout(Duration),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { command, message } => {
                write!(f, "could not run `{}`: {}", command, message)
            }
            Self::CommandFailed { command, message } => {
                if message.is_empty() {
                    write!(f, "`{}` failed", command)
                } else {
                    write!(f, "`{}` failed: {}", command, message)
                }
            }
            Self::NoHandle => write!(f, "no running log source to attach to"),
            Self::Timeout(after) => write!(f, "timed out after {}s", after.as_secs_f32()),
        }
    }
}

impl std::error::Error for SourceError {}

/// An external producer of log lines
///
/// Methods are async because real sources shell out. Futures must be `Send`
/// so the pipeline actor can drive them from a spawned task.
pub trait LogSource: Send + 'static {
    /// Short human-readable name for titles and status lines
    fn label(&self) -> &str;

    /// Launch the producer (or reuse a running one) and stream its output
    fn start(&mut self) -> impl Future<Output = Result<LogStream, SourceError>> + Send;

    /// Stop the producer. Idempotent.
    fn stop(&mut self) -> impl Future<Output = ()> + Send;

    /// Handle of the running producer, if any
    fn current_handle_id(&mut self) -> impl Future<Output = Option<HandleId>> + Send;

    /// Open a fresh stream onto an already running producer
    fn attach_to(
        &mut self,
        handle: &HandleId,
    ) -> impl Future<Output = Result<LogStream, SourceError>> + Send;
}
