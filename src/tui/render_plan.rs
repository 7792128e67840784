// Render plan: what every panel shows, computed without touching the terminal
//
// Built from navigation state, catalog and a log snapshot. The views module
// only turns a plan into widgets, so everything visible is testable here.

use super::navigation::{Focus, NavigationState};
use crate::catalog::Catalog;
use crate::pipeline::{LogLine, LogSnapshot};

pub const NO_ITEMS: &str = "No items found.";
pub const NO_ENTRIES: &str = "No blobs or contents found.";

pub const WELCOME_TITLE: &str = "Welcome!";
pub const WELCOME_LINES: &[&str] = &[
    "Welcome to Azurite Local Storage Explorer",
    "",
    "[H/L] Switch Resource Type",
    "[J/K] Navigate",
    "[Enter] Open Selected",
    "[ESC] Return to Left Panel",
    "[Shift+L] Toggle Logs | [R] Reattach Logs",
    "[PgUp/PgDn] Page Logs | [F] Follow Tail",
    "[Q] Quit",
    "",
    "Press ESC to continue",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPanel {
    pub title: String,
    pub items: Vec<String>,
    /// Row drawn with the selection marker
    pub highlighted: Option<usize>,
    /// The selected category (drawn with a focused border)
    pub active: bool,
}

/// Where the log window sits in the scrollback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPosition {
    pub origin: usize,
    pub len: usize,
    pub height: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RightPanel {
    Contents {
        title: String,
        entries: Vec<String>,
        highlighted: Option<usize>,
        empty_message: Option<&'static str>,
        focused: bool,
    },
    Logs {
        title: String,
        lines: Vec<LogLine>,
        follow: bool,
        position: ScrollPosition,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeOverlay {
    pub title: &'static str,
    pub lines: &'static [&'static str],
}

impl Default for WelcomeOverlay {
    fn default() -> Self {
        Self {
            title: WELCOME_TITLE,
            lines: WELCOME_LINES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub focus: &'static str,
    /// Only meaningful while the log panel is visible
    pub follow: Option<bool>,
    pub source: String,
    pub handle: Option<String>,
    pub streaming: bool,
    pub buffered: usize,
    pub capacity: usize,
    /// Lines below the log window while paused
    pub below: usize,
    /// Most recent internal warning or error
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    pub categories: Vec<CategoryPanel>,
    pub right: RightPanel,
    pub overlay: Option<WelcomeOverlay>,
    pub status: StatusLine,
}

impl RenderPlan {
    pub fn build(nav: &NavigationState, catalog: &Catalog, snapshot: &LogSnapshot) -> Self {
        let categories = catalog
            .categories()
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let active = i == nav.selected_category();
                let highlighted = (active
                    && nav.focus() == Focus::CategoryList
                    && !category.items.is_empty())
                .then_some(nav.selected_item());
                CategoryPanel {
                    title: category.name.to_string(),
                    items: category.items.iter().map(|item| item.name.to_string()).collect(),
                    highlighted,
                    active,
                }
            })
            .collect();

        let right = if nav.log_visible() {
            Self::logs_panel(snapshot)
        } else {
            Self::contents_panel(nav, catalog)
        };

        let status = StatusLine {
            focus: nav.focus().label(),
            follow: nav.log_visible().then_some(snapshot.follow_tail),
            source: snapshot.source_label.clone(),
            handle: snapshot.handle.as_ref().map(|h| h.short().to_string()),
            streaming: snapshot.streaming,
            buffered: snapshot.len,
            capacity: snapshot.capacity,
            below: snapshot.lines_below(),
            notice: None,
        };

        Self {
            categories,
            right,
            overlay: nav.overlay_visible().then(WelcomeOverlay::default),
            status,
        }
    }

    /// Attach the latest internal warning to the status line
    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.status.notice = notice;
        self
    }

    fn contents_panel(nav: &NavigationState, catalog: &Catalog) -> RightPanel {
        let category = catalog.category(nav.selected_category());
        let title = format!("Contents of {}", category.map_or("", |c| c.name));
        let focused = nav.focus() == Focus::ItemList;

        let (entries, empty_message) = match catalog.item(nav.selected_category(), nav.selected_item()) {
            None => (Vec::new(), Some(NO_ITEMS)),
            Some(item) if item.entries.is_empty() => (Vec::new(), Some(NO_ENTRIES)),
            Some(item) => (item.entries.iter().map(|e| e.to_string()).collect(), None),
        };

        let highlighted = (focused && !entries.is_empty()).then_some(nav.selected_entry());

        RightPanel::Contents {
            title,
            entries,
            highlighted,
            empty_message,
            focused,
        }
    }

    fn logs_panel(snapshot: &LogSnapshot) -> RightPanel {
        let label = if snapshot.source_label.is_empty() {
            "Azurite"
        } else {
            snapshot.source_label.as_str()
        };
        let follow = if snapshot.follow_tail { "following" } else { "paused" };

        RightPanel::Logs {
            title: format!(
                "{} logs [{}] (press L to hide, R to reattach)",
                label, follow
            ),
            lines: snapshot.lines.clone(),
            follow: snapshot.follow_tail,
            position: ScrollPosition {
                origin: snapshot.origin,
                len: snapshot.len,
                height: snapshot.height,
            },
        }
    }
}
