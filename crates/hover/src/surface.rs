//! What the hover machine needs from the windowing system.

use hadesk_geometry::{Point, Rect};

use crate::types::{HoverPolicy, WindowAction};

/// The window, tray icon and cursor as seen by the hover machine.
///
/// Queries return `None` when the platform cannot answer (no tray geometry
/// on some Linux desktops, window not created yet).
pub trait HoverSurface: Send + Sync {
    fn cursor_position(&self) -> Option<Point>;

    fn tray_bounds(&self) -> Option<Rect>;

    fn window_bounds(&self) -> Option<Rect>;

    /// Current settings, read fresh on every step.
    fn policy(&self) -> HoverPolicy;

    fn apply(&self, action: WindowAction);
}
