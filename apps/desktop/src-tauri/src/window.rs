//! The main window: creation, mode switching, placement and geometry
//! persistence.

use std::sync::Arc;

use hadesk_geometry::{Display, Rect, compute_position, nearest_display};
use hadesk_hover::HoverInput;
use hadesk_settings::{Settings, SettingsStore};
use tauri::webview::NewWindowResponse;
use tauri::{
    AppHandle, Manager, PhysicalPosition, PhysicalSize, Url, WebviewUrl, WebviewWindow,
    WebviewWindowBuilder, WindowEvent,
};
use tracing::{debug, warn};

use crate::state::AppState;

pub const MAIN_WINDOW: &str = "main";

/// Bundled onboarding page.
pub const INDEX_PAGE: &str = "index.html";
/// Bundled page shown while the current instance is unavailable.
pub const ERROR_PAGE: &str = "error.html";

const DEFAULT_SIZE: (f64, f64) = (420.0, 420.0);

/// Hides scrollbars and text selection inside the web view.
const PAGE_CSS: &str = "::-webkit-scrollbar { display: none; } body { -webkit-user-select: none; }";

/// Creates the (hidden) main window and wires its events.
pub fn create(app: &AppHandle, store: &Arc<SettingsStore>) -> anyhow::Result<WebviewWindow> {
    let inject_css = format!(
        "document.addEventListener('DOMContentLoaded', () => {{ \
         const s = document.createElement('style'); s.textContent = {PAGE_CSS:?}; \
         document.head.appendChild(s); }});"
    );

    let window = WebviewWindowBuilder::new(app, MAIN_WINDOW, WebviewUrl::App(INDEX_PAGE.into()))
        .title("Home Assistant")
        .inner_size(DEFAULT_SIZE.0, DEFAULT_SIZE.1)
        .visible(false)
        .resizable(true)
        .initialization_script(&inject_css)
        // Links that ask for a new window (target=_blank) go to the browser.
        .on_new_window(|url, _features| {
            if opens_externally(&url) {
                open_external(url.as_str());
            } else {
                debug!(%url, "ignoring new window request");
            }
            NewWindowResponse::Deny
        })
        .build()?;

    apply_mode(&window, &store.snapshot())?;

    let app = app.clone();
    let store = store.clone();
    window.on_window_event(move |event| on_window_event(&app, &store, event));
    Ok(window)
}

/// Re-applies decorations, taskbar presence, stacking and saved geometry
/// for the current mode, then reloads the onboarding page.
pub fn rebuild(app: &AppHandle, store: &SettingsStore) -> anyhow::Result<()> {
    let window = main_window(app)?;
    apply_mode(&window, &store.snapshot())?;
    load_page(&window, INDEX_PAGE)
}

fn apply_mode(window: &WebviewWindow, settings: &Settings) -> anyhow::Result<()> {
    let detached = settings.detached_mode;
    window.set_decorations(detached)?;
    window.set_skip_taskbar(!detached)?;
    window.set_always_on_top(settings.stay_on_top)?;

    if detached {
        if let Some([w, h]) = settings.window_size_detached {
            window.set_size(PhysicalSize::new(w, h))?;
        }
        match settings.window_position {
            Some([x, y]) => window.set_position(PhysicalPosition::new(x, y))?,
            None => window.center()?,
        }
    } else if let Some([w, h]) = settings.window_size {
        window.set_size(PhysicalSize::new(w, h))?;
    }
    debug!(detached, "window mode applied");
    Ok(())
}

fn on_window_event(app: &AppHandle, store: &SettingsStore, event: &WindowEvent) {
    let send = |input| {
        if let Some(state) = app.try_state::<AppState>() {
            state.hover.send(input);
        }
    };

    match event {
        WindowEvent::CloseRequested { api, .. } => {
            api.prevent_close();
            send(HoverInput::HideRequested);
        }
        WindowEvent::Focused(false) => send(HoverInput::WindowBlurred),
        WindowEvent::Resized(size) => {
            // Minimizing reports a zero size.
            if size.width == 0 || size.height == 0 {
                return;
            }
            send(HoverInput::WindowResized);
            let saved = store.update(|s| {
                let size = Some([size.width, size.height]);
                if s.detached_mode {
                    s.window_size_detached = size;
                } else {
                    s.window_size = size;
                }
            });
            if let Err(e) = saved {
                warn!(error = %e, "failed to save window size");
            }
        }
        WindowEvent::Moved(pos) => {
            if !store.read(|s| s.detached_mode) {
                return;
            }
            if let Err(e) = store.update(|s| s.window_position = Some([pos.x, pos.y])) {
                warn!(error = %e, "failed to save window position");
            }
        }
        _ => {}
    }
}

pub fn main_window(app: &AppHandle) -> anyhow::Result<WebviewWindow> {
    app.get_webview_window(MAIN_WINDOW)
        .ok_or_else(|| anyhow::anyhow!("main window not created"))
}

/// Shows and focuses the window. Tray-anchored windows are moved next to
/// `tray` first.
pub fn show(
    app: &AppHandle,
    window: &WebviewWindow,
    store: &SettingsStore,
    tray: Option<Rect>,
) -> anyhow::Result<()> {
    if !store.read(|s| s.detached_mode) {
        if let Err(e) = reposition(app, window, tray) {
            debug!(error = %e, "could not place window at tray");
        }
    }

    // Pull the window onto the active virtual desktop. Not every platform
    // supports this.
    let _ = window.set_visible_on_all_workspaces(true);
    window.show()?;
    window.set_focus()?;
    let _ = window.set_visible_on_all_workspaces(false);
    Ok(())
}

/// Moves the window next to `tray` on the display nearest to it.
pub fn reposition(
    app: &AppHandle,
    window: &WebviewWindow,
    tray: Option<Rect>,
) -> anyhow::Result<()> {
    let Some(tray) = tray else {
        debug!("tray position unknown, leaving window in place");
        return Ok(());
    };

    let displays = displays(app)?;
    let Some(display) = nearest_display(&displays, tray.origin()) else {
        anyhow::bail!("no displays reported");
    };

    let size = window.outer_size()?;
    let target = compute_position(&tray, &Rect::new(0, 0, size.width, size.height), display);
    debug!(%tray, x = target.x, y = target.y, "positioning window");
    window.set_position(PhysicalPosition::new(target.x, target.y))?;
    Ok(())
}

fn displays(app: &AppHandle) -> anyhow::Result<Vec<Display>> {
    Ok(app
        .available_monitors()?
        .iter()
        .map(|m| {
            let pos = m.position();
            let size = m.size();
            let work = m.work_area();
            Display::new(
                Rect::new(pos.x, pos.y, size.width, size.height),
                Rect::new(
                    work.position.x,
                    work.position.y,
                    work.size.width,
                    work.size.height,
                ),
            )
        })
        .collect())
}

/// Loads a bundled page.
pub fn load_page(window: &WebviewWindow, page: &str) -> anyhow::Result<()> {
    load_url(window, &app_url(page))
}

/// Navigates the web view to `url`.
pub fn load_url(window: &WebviewWindow, url: &str) -> anyhow::Result<()> {
    debug!(url, "loading");
    window.navigate(url.parse()?)?;
    Ok(())
}

/// True when the web view currently shows `page`.
pub fn showing_page(window: &WebviewWindow, page: &str) -> bool {
    window
        .url()
        .map(|u| u.path().trim_start_matches('/') == page)
        .unwrap_or(false)
}

/// Opens `url` in the system browser.
pub fn open_external(url: &str) {
    if let Err(e) = open::that(url) {
        warn!(url, error = %e, "failed to open browser");
    }
}

/// Only web and mail links leave the app; anything else (`about:`,
/// `javascript:`, app-internal pages) is dropped.
fn opens_externally(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https" | "mailto")
}

fn app_url(page: &str) -> String {
    if cfg!(any(windows, target_os = "android")) {
        format!("http://tauri.localhost/{page}")
    } else {
        format!("tauri://localhost/{page}")
    }
}
