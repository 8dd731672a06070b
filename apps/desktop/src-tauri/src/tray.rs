//! Tray icon, its context menu and what the menu entries do.

use hadesk_hover::HoverInput;
use hadesk_settings::Settings;
use hadesk_tray::{MenuAction, MenuItem, MenuItemKind, MenuState};
use tauri::menu::{CheckMenuItem, Menu, MenuItem as NativeItem, PredefinedMenuItem};
use tauri::tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent};
use tauri::{AppHandle, Manager, Runtime};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogResult};
use tracing::{debug, info, warn};

use crate::REPOSITORY_URL;
use crate::shortcut;
use crate::state::AppState;
use crate::window::{self, INDEX_PAGE};

pub const TRAY_ID: &str = "main";

const RESET_EVERYTHING: &str = "Reset Everything!";
const RESET_WINDOWS: &str = "Reset Windows";

/// Creates the tray icon with its menu.
pub fn create(app: &AppHandle) -> anyhow::Result<()> {
    let menu = build_menu(app)?;
    let icon = app
        .default_window_icon()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("no application icon bundled"))?;

    TrayIconBuilder::with_id(TRAY_ID)
        .tooltip("Home Assistant")
        .icon(icon)
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_menu_event(|app, event| match MenuAction::from_id(event.id().as_ref()) {
            Some(action) => handle_action(app, action),
            None => debug!(id = ?event.id(), "ignoring menu event"),
        })
        .on_tray_icon_event(|tray, event| on_tray_event(tray.app_handle(), &event))
        .build(app)?;
    Ok(())
}

/// Rebuilds the context menu after settings changed.
pub fn refresh_menu(app: &AppHandle) {
    let Some(tray) = app.tray_by_id(TRAY_ID) else {
        return;
    };
    let result = build_menu(app).and_then(|menu| Ok(tray.set_menu(Some(menu))?));
    if let Err(e) = result {
        warn!(error = %e, "failed to rebuild tray menu");
    }
}

fn build_menu(app: &AppHandle) -> anyhow::Result<Menu<tauri::Wry>> {
    let state = app
        .try_state::<AppState>()
        .ok_or_else(|| anyhow::anyhow!("app state not ready"))?;
    let snapshot = MenuState::from_settings(&state.store.snapshot(), env!("HADESK_VERSION"));

    let menu = Menu::new(app)?;
    for item in snapshot.build_menu() {
        append_item(app, &menu, &item)?;
    }
    Ok(menu)
}

fn append_item<R: Runtime>(
    app: &AppHandle<R>,
    menu: &Menu<R>,
    item: &MenuItem,
) -> tauri::Result<()> {
    let id = match &item.action {
        Some(action) => action.id(),
        None => format!("label:{}", item.label),
    };
    match item.kind {
        MenuItemKind::Separator => menu.append(&PredefinedMenuItem::separator(app)?),
        MenuItemKind::Checkbox { checked } => menu.append(&CheckMenuItem::with_id(
            app,
            id,
            &item.label,
            item.enabled,
            checked,
            item.accelerator,
        )?),
        MenuItemKind::Normal => menu.append(&NativeItem::with_id(
            app,
            id,
            &item.label,
            item.enabled,
            item.accelerator,
        )?),
    }
}

fn on_tray_event(app: &AppHandle, event: &TrayIconEvent) {
    let Some(state) = app.try_state::<AppState>() else {
        return;
    };
    let scale = app
        .primary_monitor()
        .ok()
        .flatten()
        .map(|m| m.scale_factor())
        .unwrap_or(1.0);

    match event {
        TrayIconEvent::Enter { rect, .. } | TrayIconEvent::Move { rect, .. } => {
            state.shell.note_tray_rect(rect, scale);
            state.hover.send(HoverInput::TrayHover);
        }
        TrayIconEvent::Click {
            rect,
            button,
            button_state: MouseButtonState::Up,
            ..
        } => {
            state.shell.note_tray_rect(rect, scale);
            match button {
                MouseButton::Left => state.hover.send(HoverInput::TrayClicked),
                // The context menu opens on its own; get the popup out of its way.
                MouseButton::Right if !state.store.read(|s| s.detached_mode) => {
                    state.hover.send(HoverInput::HideRequested)
                }
                _ => {}
            }
        }
        _ => {}
    }
}

fn handle_action(app: &AppHandle, action: MenuAction) {
    debug!(?action, "menu action");
    let Some(state) = app.try_state::<AppState>() else {
        return;
    };

    match action {
        MenuAction::ToggleWindow => state.hover.send(HoverInput::ToggleRequested),
        MenuAction::OpenInBrowser => {
            if let Some(url) = state.store.read(|s| s.current_instance().map(str::to_string)) {
                window::open_external(&url);
            }
        }
        MenuAction::SelectInstance(url) => {
            match state.store.update(|s| s.instances.select(&url)) {
                Ok(true) => {}
                Ok(false) => warn!(url = %url, "selected instance is not registered"),
                Err(e) => warn!(error = %e, "failed to save selected instance"),
            }
            state.monitor.clear_error();
            refresh_menu(app);
            load(app, |w| window::load_url(w, &url));
            state.hover.send(HoverInput::ShowRequested);
        }
        MenuAction::AddInstance => {
            change_settings(app, |s| s.instances.clear_current());
            state.monitor.clear_error();
            load(app, |w| window::load_page(w, INDEX_PAGE));
            state.hover.send(HoverInput::ShowRequested);
        }
        MenuAction::ToggleAutomaticSwitching => {
            change_settings(app, |s| s.automatic_switching = !s.automatic_switching)
        }
        MenuAction::ToggleHover => change_settings(app, |s| s.disable_hover = !s.disable_hover),
        MenuAction::ToggleStayOnTop => {
            change_settings(app, |s| s.stay_on_top = !s.stay_on_top);
            let on_top = state.store.read(|s| s.stay_on_top);
            if let Ok(w) = window::main_window(app) {
                if let Err(e) = w.set_always_on_top(on_top) {
                    warn!(error = %e, "failed to change window stacking");
                }
            }
            if on_top {
                state.hover.send(HoverInput::ShowRequested);
            }
        }
        MenuAction::ToggleShortcut => {
            change_settings(app, |s| s.shortcut_enabled = !s.shortcut_enabled);
            shortcut::apply(app, state.store.read(|s| s.shortcut_enabled));
        }
        MenuAction::ToggleDetached => {
            state.hover.send(HoverInput::HideRequested);
            change_settings(app, |s| {
                s.toggle_detached();
            });
            if let Err(e) = window::rebuild(app, &state.store) {
                warn!(error = %e, "failed to rebuild window");
            }
            // Back in tray mode the popup waits for the tray icon.
            if state.store.read(|s| s.detached_mode) {
                state.hover.send(HoverInput::ShowRequested);
            }
        }
        MenuAction::OpenRepository => window::open_external(REPOSITORY_URL),
        MenuAction::ReloadWindow => {
            if let Ok(w) = window::main_window(app) {
                if let Err(e) = w.eval("window.location.reload()") {
                    warn!(error = %e, "reload failed");
                }
            }
            state.hover.send(HoverInput::ShowRequested);
        }
        MenuAction::ResetApplication => confirm_reset(app),
        MenuAction::Quit => {
            info!("quit requested from tray");
            state.shutdown.cancel();
            app.exit(0);
        }
    }
}

/// Applies a settings change, saves it and refreshes the menu.
///
/// A failed save is logged; the change still holds for this session.
fn change_settings(app: &AppHandle, f: impl FnOnce(&mut Settings)) {
    let state = app.state::<AppState>();
    if let Err(e) = state.store.update(f) {
        warn!(error = %e, "failed to save settings");
    }
    refresh_menu(app);
}

fn load(app: &AppHandle, f: impl FnOnce(&tauri::WebviewWindow) -> anyhow::Result<()>) {
    if let Err(e) = window::main_window(app).and_then(|w| f(&w)) {
        warn!(error = %e, "failed to load page");
    }
}

enum Reset {
    Everything,
    Windows,
}

fn confirm_reset(app: &AppHandle) {
    let handle = app.clone();
    app.dialog()
        .message("Are you sure you want to reset Home Assistant Desktop?")
        .title("Reset Application")
        .buttons(MessageDialogButtons::YesNoCancelCustom(
            RESET_EVERYTHING.into(),
            RESET_WINDOWS.into(),
            "Cancel".into(),
        ))
        .show_with_result(move |result| {
            let reset = match result {
                MessageDialogResult::Yes => Reset::Everything,
                MessageDialogResult::No => Reset::Windows,
                MessageDialogResult::Custom(label) if label == RESET_EVERYTHING => {
                    Reset::Everything
                }
                MessageDialogResult::Custom(label) if label == RESET_WINDOWS => Reset::Windows,
                _ => return,
            };
            reset_and_restart(&handle, reset);
        });
}

fn reset_and_restart(app: &AppHandle, reset: Reset) {
    let state = app.state::<AppState>();
    let saved = match reset {
        Reset::Everything => {
            info!("resetting all settings");
            if let Ok(w) = window::main_window(app) {
                if let Err(e) = w.clear_all_browsing_data() {
                    warn!(error = %e, "failed to clear browsing data");
                }
            }
            state.store.reset()
        }
        Reset::Windows => {
            info!("resetting window geometry");
            state.store.update(Settings::reset_window_geometry)
        }
    };
    if let Err(e) = saved {
        warn!(error = %e, "failed to save reset settings");
    }

    state.shutdown.cancel();
    app.restart();
}
