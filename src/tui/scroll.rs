// Viewport into a scrollable sequence (log scrollback or a catalog list)
//
// The viewport owns the window position only. Content length is passed in by
// whoever owns the content, so the log pipeline actor can keep buffer and
// viewport mutations under one owner.
//
// Follow-tail contract:
// - While following, the window tracks the newest line on every append
// - Any upward scroll stops following; the origin stays where the user put it
// - Scrolling back down to the bottom (or End, or toggling) resumes following

/// How far PageUp/PageDown move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageStep {
    /// One full viewport height
    #[default]
    Viewport,
    /// A fixed number of lines
    Lines(usize),
}

impl PageStep {
    /// `None` or `Some(0)` means full viewport height
    pub fn from_config(lines: Option<usize>) -> Self {
        match lines {
            Some(n) if n > 0 => PageStep::Lines(n),
            _ => PageStep::Viewport,
        }
    }
}

/// Visible window state: `{origin, visible_height, follow_tail}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    /// Index of the first visible line
    origin: usize,

    /// Number of visible lines (always >= 1)
    height: usize,

    /// Content length as last reported by the owner
    len: usize,

    /// Whether the window tracks newly appended content
    follow_tail: bool,

    page_step: PageStep,
}

impl Viewport {
    /// Following viewport with the given height
    pub fn new(height: usize) -> Self {
        Self {
            origin: 0,
            height: height.max(1),
            len: 0,
            follow_tail: true,
            page_step: PageStep::default(),
        }
    }

    /// Viewport that never auto-follows until asked to
    pub fn manual(height: usize) -> Self {
        Self {
            follow_tail: false,
            ..Self::new(height)
        }
    }

    pub fn with_page_step(mut self, page_step: PageStep) -> Self {
        self.page_step = page_step;
        self
    }

    pub fn origin(&self) -> usize {
        self.origin
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_following(&self) -> bool {
        self.follow_tail
    }

    /// Largest valid origin for the current length and height
    pub fn max_origin(&self) -> usize {
        self.len.saturating_sub(self.height)
    }

    pub fn at_bottom(&self) -> bool {
        self.origin == self.max_origin()
    }

    /// `(start, end)` of the visible window, `end` exclusive
    pub fn visible_range(&self) -> (usize, usize) {
        let start = self.origin.min(self.len);
        let end = (self.origin + self.height).min(self.len);
        (start, end)
    }

    /// Move the window by `delta` lines, clamped to the content
    pub fn scroll_by(&mut self, delta: i64) {
        let target = if delta < 0 {
            self.origin.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            self.origin.saturating_add(delta as usize)
        };
        self.origin = target.min(self.max_origin());
        self.follow_tail = delta >= 0 && self.at_bottom();
    }

    pub fn page_up(&mut self) {
        let page = self.page_lines();
        self.scroll_by(-(page as i64));
    }

    pub fn page_down(&mut self) {
        let page = self.page_lines();
        self.scroll_by(page as i64);
    }

    pub fn scroll_to_top(&mut self) {
        self.origin = 0;
        self.follow_tail = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.origin = self.max_origin();
        self.follow_tail = true;
    }

    /// Flip follow mode; turning it on snaps to the bottom
    pub fn toggle_follow(&mut self) {
        if self.follow_tail {
            self.follow_tail = false;
        } else {
            self.scroll_to_bottom();
        }
    }

    /// Content grew (or was truncated from the front) to `len` lines
    pub fn on_append(&mut self, len: usize) {
        self.len = len;
        if self.follow_tail {
            self.origin = self.max_origin();
        } else {
            self.origin = self.origin.min(self.max_origin());
        }
    }

    /// Content was emptied: start over, following
    pub fn on_clear(&mut self) {
        self.len = 0;
        self.origin = 0;
        self.follow_tail = true;
    }

    /// Visible height changed
    pub fn resize(&mut self, height: usize) {
        self.height = height.max(1);
        if self.follow_tail {
            self.origin = self.max_origin();
        } else {
            self.origin = self.origin.min(self.max_origin());
        }
    }

    /// Move the window as little as possible so `index` is visible
    ///
    /// Used for selection lists, which never follow.
    pub fn reveal(&mut self, index: usize) {
        if index < self.origin {
            self.origin = index;
        } else if index >= self.origin + self.height {
            self.origin = index + 1 - self.height;
        }
        self.origin = self.origin.min(self.max_origin());
    }

    fn page_lines(&self) -> usize {
        match self.page_step {
            PageStep::Viewport => self.height,
            PageStep::Lines(n) => n,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1)
    }
}
