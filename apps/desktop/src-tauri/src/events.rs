//! Reacts to availability changes by swapping what the window shows.

use hadesk_availability::AvailabilityEvent;
use tauri::AppHandle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::tray;
use crate::window::{self, ERROR_PAGE};

/// Runs until the monitor drops its sender.
pub async fn availability_loop(app: AppHandle, mut rx: mpsc::Receiver<AvailabilityEvent>) {
    debug!("availability loop started");

    while let Some(event) = rx.recv().await {
        let window = match window::main_window(&app) {
            Ok(w) => w,
            Err(e) => {
                warn!(error = %e, "dropping availability event");
                continue;
            }
        };

        let loaded = match event {
            AvailabilityEvent::Unavailable { instance, reason } => {
                warn!(%instance, %reason, "instance unavailable");
                if window::showing_page(&window, ERROR_PAGE) {
                    Ok(())
                } else {
                    window::load_page(&window, ERROR_PAGE)
                }
            }
            AvailabilityEvent::Recovered { instance } => {
                info!(%instance, "instance reachable again");
                window::load_url(&window, &instance)
            }
            AvailabilityEvent::Switched { from, to } => {
                info!(%from, %to, "switched instance");
                tray::refresh_menu(&app);
                window::load_url(&window, &to)
            }
        };
        if let Err(e) = loaded {
            warn!(error = %e, "failed to update window content");
        }
    }

    debug!("availability loop stopped");
}
