// Components module - reusable UI building blocks
//
// - Scrollbar: shared by the log panel and long catalog lists
// - Status bar: focus, follow state, source, buffer fill

pub mod scrollbar;
pub mod status_bar;

pub use scrollbar::render_scrollbar;
