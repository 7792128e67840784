//! Bounded scrollback storage with FIFO eviction
//!
//! Only the pipeline actor writes to this buffer. The render path reads
//! copies taken by the actor (see `LogSnapshot`), never the buffer itself.

use super::line::LogLine;
use std::collections::VecDeque;

/// Default number of lines kept in memory
pub const DEFAULT_CAPACITY: usize = 500;

/// Fixed-capacity ordered log storage
#[derive(Debug, Clone)]
pub struct ScrollbackBuffer {
    lines: VecDeque<LogLine>,
    capacity: usize,
}

impl ScrollbackBuffer {
    /// Create an empty buffer. A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a line, evicting the oldest ones if over capacity
    ///
    /// Returns how many lines were evicted.
    pub fn append(&mut self, line: LogLine) -> usize {
        self.lines.push_back(line);

        let mut evicted = 0;
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
            evicted += 1;
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Copy of `[start, end)`; `end` is clamped to `len()` and `start` to `end`
    pub fn slice(&self, start: usize, end: usize) -> Vec<LogLine> {
        let end = end.min(self.lines.len());
        let start = start.min(end);
        self.lines.range(start..end).cloned().collect()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }
}

impl Default for ScrollbackBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
