//! Registry of known Home Assistant instances.
//!
//! Keeps the ordered list of server URLs (`allInstances`) and the index of
//! the selected one (`currentInstance`). The index always points into the
//! list; every mutation goes through methods that keep it that way.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SettingsError;

/// Ordered, de-duplicated list of instance URLs plus the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRegistry {
    #[serde(default, rename = "allInstances")]
    all: Vec<String>,
    #[serde(
        default,
        rename = "currentInstance",
        skip_serializing_if = "Option::is_none"
    )]
    current: Option<usize>,
}

/// Trims surrounding whitespace and trailing slashes and checks the scheme.
pub fn normalize_url(url: &str) -> Result<String, SettingsError> {
    let trimmed = url.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(SettingsError::InvalidUrl(url.to_string()));
    }
    Ok(trimmed.to_string())
}

impl InstanceRegistry {
    /// Builds a registry from a list of URLs with nothing selected.
    /// Duplicates are dropped, keeping the first occurrence.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self {
            all: urls.into_iter().map(Into::into).collect(),
            current: None,
        };
        registry.normalize();
        registry
    }

    /// All registered URLs in the order they were added.
    pub fn instances(&self) -> &[String] {
        &self.all
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.position(url).is_some()
    }

    /// The currently selected URL, if any.
    pub fn current(&self) -> Option<&str> {
        self.current.and_then(|i| self.all.get(i)).map(String::as_str)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Registers `url` and selects it.
    ///
    /// Adding a URL that is already present only selects it. Returns true
    /// when the URL was newly appended.
    pub fn add(&mut self, url: &str) -> Result<bool, SettingsError> {
        let url = normalize_url(url)?;
        if let Some(index) = self.position(&url) {
            self.current = Some(index);
            debug!(url = %url, "instance already registered, selecting it");
            return Ok(false);
        }

        self.all.push(url);
        self.current = Some(self.all.len() - 1);
        Ok(true)
    }

    /// Selects a registered URL. Unknown URLs leave the selection untouched
    /// and return false.
    pub fn select(&mut self, url: &str) -> bool {
        let found = normalize_url(url).ok().and_then(|u| self.position(&u));
        match found {
            Some(index) => {
                self.current = Some(index);
                true
            }
            None => false,
        }
    }

    /// Forgets the current selection; the list is kept.
    pub fn clear_current(&mut self) {
        self.current = None;
    }

    /// Registered URLs other than the current one, in registry order.
    pub fn others(&self) -> impl Iterator<Item = &str> {
        let current = self.current;
        self.all
            .iter()
            .enumerate()
            .filter(move |(i, _)| Some(*i) != current)
            .map(|(_, url)| url.as_str())
    }

    /// Restores the invariants after deserialization: drops duplicate URLs
    /// and an out-of-range selection. Returns true if anything changed.
    pub(crate) fn normalize(&mut self) -> bool {
        let selected = self.current().map(str::to_string);
        let before = self.all.len();

        let mut seen: Vec<String> = Vec::with_capacity(self.all.len());
        for url in self.all.drain(..) {
            if !seen.contains(&url) {
                seen.push(url);
            }
        }
        self.all = seen;

        let old_current = self.current;
        self.current = selected.and_then(|url| self.position(&url));
        before != self.all.len() || old_current != self.current
    }

    fn position(&self, url: &str) -> Option<usize> {
        self.all.iter().position(|u| u == url)
    }
}
