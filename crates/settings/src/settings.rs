//! The settings document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::SettingsError;
use crate::instances::InstanceRegistry;

/// All persisted options.
///
/// Serialized as one flat JSON object; the instance registry contributes
/// the `allInstances` and `currentInstance` keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Fail over to another registered instance when the current one is unreachable.
    pub automatic_switching: bool,
    /// Window behaves like an ordinary window instead of a tray popup.
    pub detached_mode: bool,
    /// Hovering the tray icon does not open the window.
    pub disable_hover: bool,
    pub stay_on_top: bool,
    pub shortcut_enabled: bool,

    #[serde(flatten)]
    pub instances: InstanceRegistry,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_size: Option<[u32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_position: Option<[i32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_size_detached: Option<[u32; 2]>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            automatic_switching: true,
            detached_mode: false,
            disable_hover: false,
            stay_on_top: false,
            shortcut_enabled: false,
            instances: InstanceRegistry::default(),
            window_size: None,
            window_position: None,
            window_size_detached: None,
        }
    }
}

impl Settings {
    /// Parses a settings document and restores the registry invariants.
    ///
    /// Keys are read one at a time: a key holding the wrong type falls back
    /// to its default without discarding the rest of the document. Only a
    /// document that is not a JSON object at all is an error.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        match serde_json::from_str(json)? {
            Value::Object(map) => Ok(Self::from_map(&map)),
            _ => Err(SettingsError::NotAnObject),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let defaults = Settings::default();

        // Entries are filtered before the index is resolved, so the
        // selection is looked up by URL in the raw list.
        let raw: Vec<Value> = field(map, "allInstances", Vec::new());
        let current: Option<usize> = field(map, "currentInstance", None);
        let selected = current
            .and_then(|i| raw.get(i))
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut instances =
            InstanceRegistry::from_urls(raw.iter().filter_map(Value::as_str).map(str::to_string));
        if let Some(url) = selected {
            instances.select(&url);
        }

        Self {
            automatic_switching: field(map, "automaticSwitching", defaults.automatic_switching),
            detached_mode: field(map, "detachedMode", defaults.detached_mode),
            disable_hover: field(map, "disableHover", defaults.disable_hover),
            stay_on_top: field(map, "stayOnTop", defaults.stay_on_top),
            shortcut_enabled: field(map, "shortcutEnabled", defaults.shortcut_enabled),
            instances,
            window_size: field(map, "windowSize", None),
            window_position: field(map, "windowPosition", None),
            window_size_detached: field(map, "windowSizeDetached", None),
        }
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Registers an instance and selects it.
    ///
    /// The very first instance turns hover-to-show on. Returns true when the
    /// URL was newly added.
    pub fn add_instance(&mut self, url: &str) -> Result<bool, SettingsError> {
        let first = self.instances.is_empty();
        let added = self.instances.add(url)?;
        if added && first {
            self.disable_hover = false;
        }
        Ok(added)
    }

    pub fn current_instance(&self) -> Option<&str> {
        self.instances.current()
    }

    /// True when failover has something to fail over to.
    pub fn can_switch_automatically(&self) -> bool {
        self.automatic_switching && self.instances.len() > 1
    }

    /// Switches between tray-anchored and detached mode. Returns true when
    /// the window is now detached.
    pub fn toggle_detached(&mut self) -> bool {
        self.detached_mode = !self.detached_mode;
        self.detached_mode
    }

    /// Forgets saved window sizes and position.
    pub fn reset_window_geometry(&mut self) {
        self.window_size = None;
        self.window_position = None;
        self.window_size_detached = None;
    }
}

/// Reads `key` from the document, keeping `default` when it is missing or
/// holds something of the wrong type.
fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str, default: T) -> T {
    let Some(value) = map.get(key) else {
        return default;
    };
    match T::deserialize(value) {
        Ok(v) => v,
        Err(e) => {
            warn!(key, error = %e, "ignoring invalid setting");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert!(s.automatic_switching);
        assert!(!s.detached_mode);
        assert!(!s.disable_hover);
        assert!(!s.stay_on_top);
        assert!(s.instances.is_empty());
        assert!(s.window_size.is_none());
    }

    #[test]
    fn missing_keys_resolve_to_defaults() {
        let s = Settings::from_json(r#"{"detachedMode":true}"#).unwrap();
        assert!(s.detached_mode);
        assert!(s.automatic_switching);
        assert!(s.current_instance().is_none());
    }

    #[test]
    fn document_uses_flat_camel_case_keys() {
        let mut s = Settings::default();
        s.add_instance("https://a").unwrap();
        s.window_size = Some([420, 460]);

        let value: serde_json::Value = serde_json::from_str(&s.to_json().unwrap()).unwrap();
        assert_eq!(value["allInstances"][0], "https://a");
        assert_eq!(value["currentInstance"], 0);
        assert_eq!(value["windowSize"][1], 460);
        assert_eq!(value["automaticSwitching"], true);
        assert!(value.get("windowPosition").is_none());
        assert!(value.get("instances").is_none());
    }

    #[test]
    fn parses_full_document() {
        let json = r#"{
            "automaticSwitching": false,
            "detachedMode": true,
            "disableHover": true,
            "stayOnTop": true,
            "shortcutEnabled": true,
            "allInstances": ["https://a", "https://b"],
            "currentInstance": 1,
            "windowSize": [400, 500],
            "windowPosition": [-20, 30],
            "windowSizeDetached": [800, 600],
            "autoUpdate": true
        }"#;
        let s = Settings::from_json(json).unwrap();
        assert!(!s.automatic_switching);
        assert!(s.stay_on_top);
        assert_eq!(s.current_instance(), Some("https://b"));
        assert_eq!(s.window_position, Some([-20, 30]));
        assert_eq!(s.window_size_detached, Some([800, 600]));
    }

    #[test]
    fn invalid_current_index_is_dropped() {
        let s = Settings::from_json(r#"{"allInstances":["https://a"],"currentInstance":3}"#)
            .unwrap();
        assert!(s.current_instance().is_none());
        assert_eq!(s.instances.len(), 1);
    }

    #[test]
    fn negative_current_index_keeps_instances() {
        let s = Settings::from_json(
            r#"{"allInstances":["https://a","https://b"],"currentInstance":-1,"stayOnTop":true}"#,
        )
        .unwrap();
        assert_eq!(s.instances.instances(), ["https://a", "https://b"]);
        assert!(s.current_instance().is_none());
        assert!(s.stay_on_top);
    }

    #[test]
    fn mistyped_key_falls_back_alone() {
        let s = Settings::from_json(
            r#"{"allInstances":["https://a"],"currentInstance":0,"detachedMode":"yes","automaticSwitching":false}"#,
        )
        .unwrap();
        assert!(!s.detached_mode);
        assert!(!s.automatic_switching);
        assert_eq!(s.current_instance(), Some("https://a"));
    }

    #[test]
    fn non_string_instances_are_skipped() {
        let s = Settings::from_json(
            r#"{"allInstances":[42,"https://a",null,"https://b"],"currentInstance":3}"#,
        )
        .unwrap();
        assert_eq!(s.instances.instances(), ["https://a", "https://b"]);
        assert_eq!(s.current_instance(), Some("https://b"));
    }

    #[test]
    fn non_object_document_is_rejected() {
        assert!(matches!(
            Settings::from_json("[1, 2]"),
            Err(SettingsError::NotAnObject)
        ));
        assert!(matches!(
            Settings::from_json("{ nope"),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn first_instance_enables_hover() {
        let mut s = Settings {
            disable_hover: true,
            ..Settings::default()
        };
        assert!(s.add_instance("https://a").unwrap());
        assert!(!s.disable_hover);
    }

    #[test]
    fn later_instances_leave_hover_alone() {
        let mut s = Settings::default();
        s.add_instance("https://a").unwrap();
        s.disable_hover = true;
        s.add_instance("https://b").unwrap();
        assert!(s.disable_hover);
    }

    #[test]
    fn can_switch_needs_flag_and_two_instances() {
        let mut s = Settings::default();
        s.add_instance("https://a").unwrap();
        assert!(!s.can_switch_automatically());
        s.add_instance("https://b").unwrap();
        assert!(s.can_switch_automatically());
        s.automatic_switching = false;
        assert!(!s.can_switch_automatically());
    }

    #[test]
    fn toggle_detached_reports_new_mode() {
        let mut s = Settings::default();
        assert!(s.toggle_detached());
        assert!(s.detached_mode);
        assert!(!s.toggle_detached());
        assert!(!s.detached_mode);
    }

    #[test]
    fn reset_window_geometry_clears_only_geometry() {
        let mut s = Settings::default();
        s.add_instance("https://a").unwrap();
        s.window_size = Some([1, 2]);
        s.window_position = Some([3, 4]);
        s.window_size_detached = Some([5, 6]);
        s.reset_window_geometry();
        assert!(s.window_size.is_none());
        assert!(s.window_position.is_none());
        assert!(s.window_size_detached.is_none());
        assert_eq!(s.current_instance(), Some("https://a"));
    }
}
