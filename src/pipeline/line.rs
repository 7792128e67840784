//! Log line model shared by the pipeline, the snapshot and the renderer

use chrono::{DateTime, Utc};

/// Where a line in the scrollback came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Emitted by the external log source
    Source,
    /// Synthetic status line (attach, stream end, reattach)
    Notice,
    /// Synthetic error line (start or reattach failure)
    Error,
}

/// A single line held in the scrollback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub received_at: DateTime<Utc>,
    pub kind: LineKind,
    pub text: String,
}

impl LogLine {
    /// Line produced by the source. Trailing CR/LF are stripped.
    pub fn source(text: impl Into<String>) -> Self {
        Self::with_kind(LineKind::Source, text)
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self::with_kind(LineKind::Notice, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::with_kind(LineKind::Error, text)
    }

    fn with_kind(kind: LineKind, text: impl Into<String>) -> Self {
        let mut text = text.into();
        let trimmed = text.trim_end_matches(['\r', '\n']).len();
        text.truncate(trimmed);

        Self {
            received_at: Utc::now(),
            kind,
            text,
        }
    }
}
