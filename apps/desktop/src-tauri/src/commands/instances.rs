//! Commands used by the bundled onboarding and error pages.

use hadesk_hover::HoverInput;
use tauri::{AppHandle, State};
use tracing::info;

use crate::state::AppState;
use crate::tray;
use crate::window;

/// Every registered instance URL, in registry order.
#[tauri::command]
pub async fn get_instances(state: State<'_, AppState>) -> Result<Vec<String>, String> {
    Ok(state.store.read(|s| s.instances.instances().to_vec()))
}

/// Registers and selects `url` when given, then returns the current
/// instance.
#[tauri::command]
pub async fn ha_instance(
    app: AppHandle,
    state: State<'_, AppState>,
    url: Option<String>,
) -> Result<Option<String>, String> {
    if let Some(url) = url {
        let added = state
            .store
            .try_update(|s| s.add_instance(&url))
            .map_err(|e| e.to_string())?;
        info!(%url, added, "instance selected");
        state.monitor.clear_error();
        tray::refresh_menu(&app);
    }
    Ok(state.store.read(|s| s.current_instance().map(str::to_string)))
}

/// Reloads the window from scratch and brings it up.
#[tauri::command]
pub async fn reconnect(app: AppHandle, state: State<'_, AppState>) -> Result<(), String> {
    window::rebuild(&app, &state.store).map_err(|e| e.to_string())?;
    state.hover.send(HoverInput::ShowRequested);
    Ok(())
}
