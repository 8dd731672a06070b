//! Dynamic context menu for the system tray.

use hadesk_settings::Settings;
use tracing::debug;

/// Global shortcut that toggles the window when enabled.
pub const SHORTCUT_ACCELERATOR: &str = "CommandOrControl+Alt+X";

const INSTANCE_PREFIX: &str = "instance:";

/// Actions that can be triggered from the tray context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    ToggleWindow,
    OpenInBrowser,
    /// Switch to the given registered instance.
    SelectInstance(String),
    AddInstance,
    ToggleAutomaticSwitching,
    ToggleHover,
    ToggleStayOnTop,
    ToggleShortcut,
    ToggleDetached,
    OpenRepository,
    ReloadWindow,
    ResetApplication,
    Quit,
}

impl MenuAction {
    /// Stable menu item id.
    pub fn id(&self) -> String {
        let id = match self {
            MenuAction::ToggleWindow => "toggle-window",
            MenuAction::OpenInBrowser => "open-in-browser",
            MenuAction::SelectInstance(url) => return format!("{INSTANCE_PREFIX}{url}"),
            MenuAction::AddInstance => "add-instance",
            MenuAction::ToggleAutomaticSwitching => "automatic-switching",
            MenuAction::ToggleHover => "hover-to-show",
            MenuAction::ToggleStayOnTop => "stay-on-top",
            MenuAction::ToggleShortcut => "enable-shortcut",
            MenuAction::ToggleDetached => "detached-window",
            MenuAction::OpenRepository => "open-repository",
            MenuAction::ReloadWindow => "reload-window",
            MenuAction::ResetApplication => "reset-application",
            MenuAction::Quit => "quit",
        };
        id.to_string()
    }

    /// Parses an id produced by [`id`](Self::id).
    pub fn from_id(id: &str) -> Option<Self> {
        if let Some(url) = id.strip_prefix(INSTANCE_PREFIX) {
            return Some(MenuAction::SelectInstance(url.to_string()));
        }
        let action = match id {
            "toggle-window" => MenuAction::ToggleWindow,
            "open-in-browser" => MenuAction::OpenInBrowser,
            "add-instance" => MenuAction::AddInstance,
            "automatic-switching" => MenuAction::ToggleAutomaticSwitching,
            "hover-to-show" => MenuAction::ToggleHover,
            "stay-on-top" => MenuAction::ToggleStayOnTop,
            "enable-shortcut" => MenuAction::ToggleShortcut,
            "detached-window" => MenuAction::ToggleDetached,
            "open-repository" => MenuAction::OpenRepository,
            "reload-window" => MenuAction::ReloadWindow,
            "reset-application" => MenuAction::ResetApplication,
            "quit" => MenuAction::Quit,
            _ => {
                debug!(id, "unknown menu id");
                return None;
            }
        };
        Some(action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItemKind {
    Normal,
    Checkbox { checked: bool },
    Separator,
}

/// A single menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Display text.
    pub label: String,
    /// Whether the item is enabled (clickable).
    pub enabled: bool,
    pub kind: MenuItemKind,
    /// Optional action triggered on click.
    pub action: Option<MenuAction>,
    /// Keyboard hint shown next to the label.
    pub accelerator: Option<&'static str>,
}

impl MenuItem {
    fn action(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            enabled: true,
            kind: MenuItemKind::Normal,
            action: Some(action),
            accelerator: None,
        }
    }

    fn checkbox(label: impl Into<String>, checked: bool, action: MenuAction) -> Self {
        Self {
            kind: MenuItemKind::Checkbox { checked },
            ..Self::action(label, action)
        }
    }

    fn label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: false,
            kind: MenuItemKind::Normal,
            action: None,
            accelerator: None,
        }
    }

    fn separator() -> Self {
        Self {
            kind: MenuItemKind::Separator,
            ..Self::label("")
        }
    }

    fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_separator(&self) -> bool {
        self.kind == MenuItemKind::Separator
    }

    pub fn checked(&self) -> Option<bool> {
        match self.kind {
            MenuItemKind::Checkbox { checked } => Some(checked),
            _ => None,
        }
    }
}

/// Current state used to build the context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub instances: Vec<String>,
    pub current: Option<String>,
    pub automatic_switching: bool,
    pub hover_enabled: bool,
    pub stay_on_top: bool,
    pub shortcut_enabled: bool,
    pub detached: bool,
    /// Application version without the leading `v`.
    pub version: String,
    /// Linux trays get a Show/Hide entry instead of hover.
    pub linux: bool,
}

impl Default for MenuState {
    fn default() -> Self {
        Self::from_settings(&Settings::default(), "0.0.0")
    }
}

impl MenuState {
    /// Snapshot of `settings` for the running platform.
    pub fn from_settings(settings: &Settings, version: &str) -> Self {
        Self {
            instances: settings.instances.instances().to_vec(),
            current: settings.current_instance().map(str::to_string),
            automatic_switching: settings.automatic_switching,
            hover_enabled: !settings.disable_hover,
            stay_on_top: settings.stay_on_top,
            shortcut_enabled: settings.shortcut_enabled,
            detached: settings.detached_mode,
            version: version.to_string(),
            linux: cfg!(target_os = "linux"),
        }
    }

    /// Builds the menu items from the current state.
    pub fn build_menu(&self) -> Vec<MenuItem> {
        let mut items = Vec::new();

        if self.linux {
            items.push(MenuItem::action("Show/Hide Window", MenuAction::ToggleWindow));
            items.push(MenuItem::separator());
        }

        // Instances.
        items.push(
            MenuItem::action("Open in Browser", MenuAction::OpenInBrowser)
                .enabled(self.current.is_some()),
        );
        items.push(MenuItem::separator());
        if self.instances.is_empty() {
            items.push(MenuItem::label("Not Connected..."));
        } else {
            for url in &self.instances {
                let checked = self.current.as_deref() == Some(url.as_str());
                items.push(MenuItem::checkbox(
                    url.as_str(),
                    checked,
                    MenuAction::SelectInstance(url.clone()),
                ));
            }
            items.push(MenuItem::separator());
            items.push(MenuItem::action("Add another Instance...", MenuAction::AddInstance));
            items.push(
                MenuItem::checkbox(
                    "Automatic Switching",
                    self.automatic_switching,
                    MenuAction::ToggleAutomaticSwitching,
                )
                .enabled(self.instances.len() > 1),
            );
        }
        items.push(MenuItem::separator());

        // Window behaviour.
        if !self.linux && !self.detached {
            items.push(MenuItem::checkbox(
                "Hover to Show",
                self.hover_enabled,
                MenuAction::ToggleHover,
            ));
        }
        items.push(MenuItem::checkbox(
            "Stay on Top",
            self.stay_on_top,
            MenuAction::ToggleStayOnTop,
        ));
        items.push(MenuItem {
            accelerator: Some(SHORTCUT_ACCELERATOR),
            ..MenuItem::checkbox(
                "Enable Shortcut",
                self.shortcut_enabled,
                MenuAction::ToggleShortcut,
            )
        });
        items.push(MenuItem::separator());
        items.push(MenuItem::checkbox(
            "Use detached Window",
            self.detached,
            MenuAction::ToggleDetached,
        ));
        items.push(MenuItem::separator());

        // About.
        items.push(MenuItem::label(format!("v{}", self.version)));
        items.push(MenuItem::action("Open on github.com", MenuAction::OpenRepository));
        items.push(MenuItem::separator());

        items.push(MenuItem::action("Reload Window", MenuAction::ReloadWindow));
        items.push(MenuItem::action("Reset Application...", MenuAction::ResetApplication));
        items.push(MenuItem::separator());

        items.push(MenuItem::action("Quit", MenuAction::Quit));

        items
    }
}
