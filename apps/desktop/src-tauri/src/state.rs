use std::sync::Arc;

use hadesk_availability::AvailabilityMonitor;
use hadesk_hover::HoverHandle;
use hadesk_settings::SettingsStore;
use tokio_util::sync::CancellationToken;

use crate::shell::TauriShell;

/// Shared application state managed by Tauri.
pub struct AppState {
    pub store: Arc<SettingsStore>,
    pub shell: Arc<TauriShell>,
    pub hover: HoverHandle,
    pub monitor: Arc<AvailabilityMonitor>,
    pub shutdown: CancellationToken,
}
