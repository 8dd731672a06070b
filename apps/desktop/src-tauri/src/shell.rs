//! The hover machine's view of the real window, tray icon and cursor.

use std::sync::{Arc, Mutex, PoisonError};

use hadesk_geometry::{Point, Rect};
use hadesk_hover::{HoverPolicy, HoverSurface, WindowAction};
use hadesk_settings::SettingsStore;
use tauri::{AppHandle, Manager};
use tracing::{debug, warn};

use crate::tray::TRAY_ID;
use crate::window::{self, MAIN_WINDOW};

/// Window and tray handles of the running app.
pub struct TauriShell {
    app: AppHandle,
    store: Arc<SettingsStore>,
    /// Tray rectangle from the most recent tray event.
    last_tray: Mutex<Option<Rect>>,
}

impl TauriShell {
    pub fn new(app: AppHandle, store: Arc<SettingsStore>) -> Self {
        Self {
            app,
            store,
            last_tray: Mutex::new(None),
        }
    }

    /// Remembers where a tray event said the icon is.
    pub fn note_tray_rect(&self, rect: &tauri::Rect, scale: f64) {
        let rect = to_rect(rect, scale);
        *self.last_tray.lock().unwrap_or_else(PoisonError::into_inner) = Some(rect);
    }
}

impl HoverSurface for TauriShell {
    fn cursor_position(&self) -> Option<Point> {
        match self.app.cursor_position() {
            Ok(p) => Some(Point::new(p.x.round() as i32, p.y.round() as i32)),
            Err(e) => {
                debug!(error = %e, "cursor position unavailable");
                None
            }
        }
    }

    fn tray_bounds(&self) -> Option<Rect> {
        let live = self
            .app
            .tray_by_id(TRAY_ID)
            .and_then(|tray| tray.rect().ok().flatten())
            .map(|rect| to_rect(&rect, scale_factor(&self.app)));
        live.or(*self.last_tray.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn window_bounds(&self) -> Option<Rect> {
        let window = self.app.get_webview_window(MAIN_WINDOW)?;
        let pos = window.outer_position().ok()?;
        let size = window.outer_size().ok()?;
        Some(Rect::new(pos.x, pos.y, size.width, size.height))
    }

    fn policy(&self) -> HoverPolicy {
        self.store.read(|s| HoverPolicy {
            // Linux trays report neither hover nor a usable rectangle.
            disable_hover: s.disable_hover || cfg!(target_os = "linux"),
            detached: s.detached_mode,
            always_on_top: s.stay_on_top,
        })
    }

    fn apply(&self, action: WindowAction) {
        let Some(win) = self.app.get_webview_window(MAIN_WINDOW) else {
            warn!(?action, "main window missing");
            return;
        };
        let result = match action {
            WindowAction::Show => window::show(&self.app, &win, &self.store, self.tray_bounds()),
            WindowAction::Hide => win.hide().map_err(Into::into),
            WindowAction::Reposition => window::reposition(&self.app, &win, self.tray_bounds()),
        };
        if let Err(e) = result {
            warn!(?action, error = %e, "window action failed");
        }
    }
}

/// Converts a tray rectangle to physical pixels.
pub fn to_rect(rect: &tauri::Rect, scale: f64) -> Rect {
    let pos = rect.position.to_physical::<i32>(scale);
    let size = rect.size.to_physical::<u32>(scale);
    Rect::new(pos.x, pos.y, size.width, size.height)
}

fn scale_factor(app: &AppHandle) -> f64 {
    app.primary_monitor()
        .ok()
        .flatten()
        .map(|m| m.scale_factor())
        .unwrap_or(1.0)
}
