// Navigation state machine - focus and selection across the panels
//
// Keys arrive already translated into `NavKey`s (see input.rs). `handle` is
// the only mutator; it returns a `NavEffect` for anything that has to happen
// outside the state (log scrolling, reattach, quit).
//
// Focus transitions:
//
//   CategoryList --Enter--> ItemList --Esc--> CategoryList
//   any --L--> LogPanel --L--> CategoryList
//
// While the welcome overlay is up it swallows everything but Esc, Quit and
// Reattach.

use crate::catalog::Catalog;
use crate::pipeline::ScrollRequest;

/// Symbolic input, independent of the terminal backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Enter,
    Escape,
    ToggleLogs,
    ToggleFollow,
    Reattach,
    Quit,
    /// Mouse wheel, carries the line delta
    Wheel(i8),
}

/// Which panel receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    CategoryList,
    ItemList,
    LogPanel,
}

impl Focus {
    pub fn label(&self) -> &'static str {
        match self {
            Focus::CategoryList => "Resources",
            Focus::ItemList => "Contents",
            Focus::LogPanel => "Logs",
        }
    }
}

/// Work the caller must do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEffect {
    None,
    Scroll(ScrollRequest),
    Reattach,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    focus: Focus,
    selected_category: usize,
    selected_item: usize,
    selected_entry: usize,
    log_visible: bool,
    overlay_visible: bool,
}

impl NavigationState {
    pub fn new(show_welcome: bool) -> Self {
        Self {
            focus: Focus::CategoryList,
            selected_category: 0,
            selected_item: 0,
            selected_entry: 0,
            log_visible: false,
            overlay_visible: show_welcome,
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn selected_category(&self) -> usize {
        self.selected_category
    }

    pub fn selected_item(&self) -> usize {
        self.selected_item
    }

    pub fn selected_entry(&self) -> usize {
        self.selected_entry
    }

    pub fn log_visible(&self) -> bool {
        self.log_visible
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    /// Apply one key. Exactly one key is processed per call.
    pub fn handle(&mut self, key: NavKey, catalog: &Catalog) -> NavEffect {
        // Global keys, independent of focus and overlay
        match key {
            NavKey::Quit => return NavEffect::Quit,
            NavKey::Reattach => return NavEffect::Reattach,
            _ => {}
        }

        if self.overlay_visible {
            if key == NavKey::Escape {
                self.overlay_visible = false;
            }
            return NavEffect::None;
        }

        if key == NavKey::ToggleLogs {
            self.toggle_logs();
            return NavEffect::None;
        }

        match self.focus {
            Focus::CategoryList => {
                self.handle_category_list(key, catalog);
                NavEffect::None
            }
            Focus::ItemList => {
                self.handle_item_list(key, catalog);
                NavEffect::None
            }
            Focus::LogPanel => Self::handle_log_panel(key),
        }
    }

    fn toggle_logs(&mut self) {
        self.log_visible = !self.log_visible;
        self.selected_entry = 0;
        self.focus = if self.log_visible {
            Focus::LogPanel
        } else {
            Focus::CategoryList
        };
    }

    fn handle_category_list(&mut self, key: NavKey, catalog: &Catalog) {
        match key {
            NavKey::Left => {
                if self.selected_category > 0 {
                    self.selected_category -= 1;
                    self.selected_item = 0;
                }
            }
            NavKey::Right => {
                if self.selected_category + 1 < catalog.category_count() {
                    self.selected_category += 1;
                    self.selected_item = 0;
                }
            }
            NavKey::Up => {
                self.selected_item = self.selected_item.saturating_sub(1);
            }
            NavKey::Down => {
                if self.selected_item + 1 < catalog.item_count(self.selected_category) {
                    self.selected_item += 1;
                }
            }
            NavKey::Enter => {
                if !self.log_visible && catalog.item_count(self.selected_category) > 0 {
                    self.focus = Focus::ItemList;
                    self.selected_entry = 0;
                }
            }
            _ => {}
        }
    }

    fn handle_item_list(&mut self, key: NavKey, catalog: &Catalog) {
        match key {
            NavKey::Up => {
                self.selected_entry = self.selected_entry.saturating_sub(1);
            }
            NavKey::Down => {
                let count = catalog.entry_count(self.selected_category, self.selected_item);
                if self.selected_entry + 1 < count {
                    self.selected_entry += 1;
                }
            }
            NavKey::Escape => {
                self.focus = Focus::CategoryList;
                self.selected_entry = 0;
            }
            _ => {}
        }
    }

    fn handle_log_panel(key: NavKey) -> NavEffect {
        let request = match key {
            NavKey::Up => ScrollRequest::By(-1),
            NavKey::Down => ScrollRequest::By(1),
            NavKey::Wheel(delta) => ScrollRequest::By(i64::from(delta)),
            NavKey::PageUp => ScrollRequest::PageUp,
            NavKey::PageDown => ScrollRequest::PageDown,
            NavKey::Home => ScrollRequest::Top,
            NavKey::End => ScrollRequest::Bottom,
            NavKey::ToggleFollow => ScrollRequest::ToggleFollow,
            _ => return NavEffect::None,
        };
        NavEffect::Scroll(request)
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(true)
    }
}
