mod commands;
mod events;
mod shell;
mod shortcut;
mod state;
mod tray;
mod window;

use std::path::PathBuf;
use std::sync::Arc;

use tauri::{Manager, RunEvent};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hadesk_availability::{AvailabilityMonitor, HttpProbe};
use hadesk_hover::{HoverInput, HoverState, hover_loop};
use hadesk_settings::{SettingsStore, default_settings_path};

use shell::TauriShell;
use state::AppState;

pub const REPOSITORY_URL: &str = "https://github.com/mrvnklm/homeassistant-desktop";

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hadesk=debug")),
        )
        .init();

    let path = default_settings_path().unwrap_or_else(|| {
        warn!("no config directory, keeping settings next to the executable");
        PathBuf::from("settings.json")
    });
    let store = Arc::new(SettingsStore::open(path));
    info!(path = %store.path().display(), "settings loaded");

    // Until an instance is picked the onboarding page stays up instead of
    // following the cursor.
    if store.read(|s| s.current_instance().is_none() && !s.disable_hover) {
        if let Err(e) = store.update(|s| s.disable_hover = true) {
            warn!(error = %e, "failed to save settings");
        }
    }

    let shutdown = CancellationToken::new();
    let exit_token = shutdown.clone();

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _args, _cwd| {
            if let Some(state) = app.try_state::<AppState>() {
                state.hover.send(HoverInput::ShowRequested);
            }
        }))
        .plugin(tauri_plugin_dialog::init())
        .plugin(shortcut::plugin())
        .setup(move |app| {
            #[cfg(target_os = "macos")]
            app.set_activation_policy(tauri::ActivationPolicy::Accessory);

            let handle = app.handle().clone();
            window::create(&handle, &store)?;

            let shell = Arc::new(TauriShell::new(handle.clone(), store.clone()));
            let (hover, hover_task) =
                hover_loop(shell.clone(), HoverState::Hidden, shutdown.child_token());
            tauri::async_runtime::spawn(hover_task.run());

            let monitor = Arc::new(AvailabilityMonitor::new(
                store.clone(),
                Arc::new(HttpProbe::new()?),
                Arc::new(hadesk_discovery::Client::new()),
            ));

            let events_handle = handle.clone();
            let events_monitor = monitor.clone();
            tauri::async_runtime::spawn(async move {
                let Some(rx) = events_monitor.take_events().await else {
                    warn!("availability events already taken");
                    return;
                };
                events::availability_loop(events_handle, rx).await;
            });

            let run_monitor = monitor.clone();
            let cancel = shutdown.clone();
            tauri::async_runtime::spawn(async move { run_monitor.run(cancel).await });

            app.manage(AppState {
                store: store.clone(),
                shell,
                hover: hover.clone(),
                monitor,
                shutdown: shutdown.clone(),
            });

            // The menu reads managed state, so the tray comes last.
            tray::create(&handle)?;

            let settings = store.snapshot();
            if settings.shortcut_enabled {
                shortcut::apply(&handle, true);
            }
            if settings.current_instance().is_none() {
                hover.send(HoverInput::ShowRequested);
            }
            info!(version = env!("HADESK_VERSION"), "started");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::instances::get_instances,
            commands::instances::ha_instance,
            commands::instances::reconnect,
        ])
        .build(tauri::generate_context!())
        .expect("error building tauri application");

    app.run(move |handle, event| {
        if let RunEvent::Exit = event {
            info!("shutting down");
            if let Some(state) = handle.try_state::<AppState>() {
                state.hover.shutdown();
            }
            exit_token.cancel();
        }
    });
}
