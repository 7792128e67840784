//! Scrollback configuration

use serde::Deserialize;

use crate::pipeline::scrollback::DEFAULT_CAPACITY;
use crate::source::STREAM_CAPACITY;
use crate::tui::scroll::PageStep;

/// Scrollback and paging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollConfig {
    /// Lines kept in memory
    pub capacity: usize,
    /// Queue between the ingestion task and the pipeline actor
    pub channel_capacity: usize,
    /// Lines per PgUp/PgDn, 0 = one viewport height
    pub page_step: usize,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            channel_capacity: STREAM_CAPACITY,
            page_step: 0,
        }
    }
}

/// Scroll settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileScroll {
    pub capacity: Option<usize>,
    pub channel_capacity: Option<usize>,
    pub page_step: Option<usize>,
}

impl ScrollConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileScroll>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            capacity: file.capacity.unwrap_or(defaults.capacity),
            channel_capacity: file.channel_capacity.unwrap_or(defaults.channel_capacity),
            page_step: file.page_step.unwrap_or(defaults.page_step),
        }
    }

    pub fn page_step(&self) -> PageStep {
        PageStep::from_config(Some(self.page_step))
    }
}
