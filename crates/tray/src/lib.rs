//! Tray context menu for Home Assistant Desktop.
//!
//! The menu is built as plain data from a [`MenuState`] snapshot so it can
//! be tested without a tray. The shell turns [`MenuItem`]s into native
//! menu entries and maps clicked ids back through [`MenuAction::from_id`].
//!
//! # Platform notes
//! - Linux trays do not report hover or clicks reliably, so the menu gets
//!   an explicit Show/Hide entry and no Hover to Show toggle.

mod menu;

pub use menu::{MenuAction, MenuItem, MenuItemKind, MenuState, SHORTCUT_ACCELERATOR};
