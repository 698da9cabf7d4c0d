//! Explicit light/dark choice overriding the OS scheme.

use crate::prefs::log_storage_error;
use crate::prefs::store::PreferenceStore;
use std::sync::Arc;

pub const THEME_PREFERENCE_KEY: &str = "bloom:theme-preference";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

pub struct ThemePreference {
    store: Arc<dyn PreferenceStore>,
    cached: Option<Theme>,
}

impl ThemePreference {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            store,
            cached: None,
        }
    }

    /// Stored choice; unrecognized values read as unset.
    pub fn get(&mut self) -> Option<Theme> {
        if self.cached.is_some() {
            return self.cached;
        }
        let stored =
            log_storage_error(THEME_PREFERENCE_KEY, "read", self.store.get(THEME_PREFERENCE_KEY))
                .flatten();
        self.cached = stored.as_deref().and_then(Theme::parse);
        self.cached
    }

    pub fn set(&mut self, theme: Theme) {
        self.cached = Some(theme);
        log_storage_error(
            THEME_PREFERENCE_KEY,
            "write",
            self.store.set(THEME_PREFERENCE_KEY, theme.as_str()),
        );
    }

    pub fn clear(&mut self) {
        self.cached = None;
        log_storage_error(
            THEME_PREFERENCE_KEY,
            "remove",
            self.store.remove(THEME_PREFERENCE_KEY),
        );
    }

    /// Effective theme: the explicit choice, else `os_default`.
    pub fn resolve(&mut self, os_default: Theme) -> Theme {
        self.get().unwrap_or(os_default)
    }

    /// Flips the effective theme and stores the result as explicit.
    pub fn toggle(&mut self, os_default: Theme) -> Theme {
        let next = self.resolve(os_default).toggled();
        self.set(next);
        next
    }
}
