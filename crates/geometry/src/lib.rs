//! Tray-relative window positioning.
//!
//! Pure coordinate arithmetic: rectangles come from the OS on every call
//! and nothing here caches them.

pub mod position;
pub mod types;

pub use position::{compute_position, nearest_display, taskbar_position};
pub use types::{Display, Point, Rect, TaskbarPosition};
