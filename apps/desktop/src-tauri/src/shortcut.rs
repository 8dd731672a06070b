//! Global keyboard shortcut that toggles the window.

use hadesk_hover::HoverInput;
use hadesk_tray::SHORTCUT_ACCELERATOR;
use tauri::plugin::TauriPlugin;
use tauri::{AppHandle, Manager, Wry};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, ShortcutState};
use tracing::{debug, warn};

use crate::state::AppState;

/// The global-shortcut plugin, wired to toggle the window on key press.
pub fn plugin() -> TauriPlugin<Wry> {
    tauri_plugin_global_shortcut::Builder::new()
        .with_handler(|app, shortcut, event| {
            if event.state() != ShortcutState::Pressed {
                return;
            }
            debug!(?shortcut, "shortcut pressed");
            if let Some(state) = app.try_state::<AppState>() {
                state.hover.send(HoverInput::ToggleRequested);
            }
        })
        .build()
}

/// Registers or unregisters the toggle shortcut.
pub fn apply(app: &AppHandle, enabled: bool) {
    let shortcuts = app.global_shortcut();
    let registered = shortcuts.is_registered(SHORTCUT_ACCELERATOR);

    let result = match (enabled, registered) {
        (true, false) => shortcuts.register(SHORTCUT_ACCELERATOR),
        (false, true) => shortcuts.unregister(SHORTCUT_ACCELERATOR),
        _ => return,
    };
    match result {
        Ok(()) => debug!(enabled, accelerator = SHORTCUT_ACCELERATOR, "shortcut updated"),
        Err(e) => warn!(enabled, error = %e, "failed to update global shortcut"),
    }
}
