//! File-backed settings store.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};

use crate::error::SettingsError;
use crate::settings::Settings;

/// Settings cached in memory and persisted to a JSON file.
///
/// Reads never fail: a missing or unreadable file yields defaults. Writes
/// go straight to disk and report errors to the caller.
pub struct SettingsStore {
    path: PathBuf,
    settings: RwLock<Settings>,
}

impl SettingsStore {
    /// Opens the store at `path`, loading whatever is there.
    pub fn open(path: PathBuf) -> Self {
        let settings = load_settings(&path);
        Self {
            path,
            settings: RwLock::new(settings),
        }
    }

    /// Creates a store with the given contents without touching disk.
    /// The first mutation writes the file.
    pub fn with_settings(path: PathBuf, settings: Settings) -> Self {
        Self {
            path,
            settings: RwLock::new(settings),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a copy of the current settings.
    pub fn snapshot(&self) -> Settings {
        self.read(Settings::clone)
    }

    /// Runs `f` against the current settings.
    pub fn read<R>(&self, f: impl FnOnce(&Settings) -> R) -> R {
        let guard = self.settings.read().unwrap_or_else(PoisonError::into_inner);
        f(&*guard)
    }

    /// Applies `f` to the settings and persists the result.
    ///
    /// The in-memory copy is updated even if writing the file fails.
    pub fn update<R>(&self, f: impl FnOnce(&mut Settings) -> R) -> Result<R, SettingsError> {
        let (result, json) = {
            let mut guard = self.settings.write().unwrap_or_else(PoisonError::into_inner);
            let result = f(&mut *guard);
            (result, guard.to_json()?)
        };
        self.persist(&json)?;
        Ok(result)
    }

    /// Like [`update`](Self::update) for edits that can fail. Nothing is
    /// written when `f` returns an error.
    pub fn try_update<R>(
        &self,
        f: impl FnOnce(&mut Settings) -> Result<R, SettingsError>,
    ) -> Result<R, SettingsError> {
        let (result, json) = {
            let mut guard = self.settings.write().unwrap_or_else(PoisonError::into_inner);
            let result = f(&mut *guard)?;
            (result, guard.to_json()?)
        };
        self.persist(&json)?;
        Ok(result)
    }

    /// Drops every setting back to its default.
    pub fn reset(&self) -> Result<(), SettingsError> {
        self.update(|s| *s = Settings::default())
    }

    fn persist(&self, json: &str) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        set_permissions_0600(&self.path);
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

/// Loads settings from disk, falling back to defaults on any problem.
fn load_settings(path: &Path) -> Settings {
    if !path.exists() {
        debug!(path = %path.display(), "no settings file, using defaults");
        return Settings::default();
    }

    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read settings, using defaults");
            return Settings::default();
        }
    };

    match Settings::from_json(&data) {
        Ok(settings) => {
            debug!(
                path = %path.display(),
                instances = settings.instances.len(),
                "loaded settings"
            );
            settings
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse settings, using defaults");
            back_up(path);
            Settings::default()
        }
    }
}

/// Moves an unreadable settings file aside so the next save cannot
/// overwrite it.
fn back_up(path: &Path) {
    let backup = backup_path(path);
    match std::fs::rename(path, &backup) {
        Ok(()) => warn!(backup = %backup.display(), "kept unreadable settings as backup"),
        Err(e) => warn!(path = %path.display(), error = %e, "failed to back up settings"),
    }
}

/// `settings.json` → `settings.json.bak`.
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

fn set_permissions_0600(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
}

/// Returns the default settings file location.
pub fn default_settings_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("homeassistant-desktop").join("settings.json"))
}

/// Returns the platform-specific config directory.
fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library").join("Application Support"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join(".config"))
    }
}
