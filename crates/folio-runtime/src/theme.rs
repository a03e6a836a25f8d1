#![forbid(unsafe_code)]

//! Persisted light/dark theme preference.
//!
//! At startup the stored value wins: `"dark"` selects dark, any other
//! stored value selects light. With nothing stored, the system preference
//! decides. Every toggle is written back immediately.

use std::fmt;

use crate::preferences::{PreferenceStore, StorageResult};

/// Default storage key for the theme preference.
pub const THEME_KEY: &str = "theme";

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Theme {
    /// Light background.
    #[default]
    Light,
    /// Dark background.
    Dark,
}

impl Theme {
    /// Stored and `data-theme` attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Whether this is the dark theme.
    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// Resolve the startup theme from a stored value and the system signal.
    #[must_use]
    pub fn resolve(stored: Option<&str>, system_prefers_dark: bool) -> Self {
        match stored {
            Some("dark") => Self::Dark,
            Some(_) => Self::Light,
            None if system_prefers_dark => Self::Dark,
            None => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner of the current theme and its persistence.
#[derive(Debug)]
pub struct ThemeController {
    store: PreferenceStore,
    key: String,
    theme: Theme,
}

impl ThemeController {
    /// Load the theme from `store`, falling back to the system preference.
    #[must_use]
    pub fn load(store: PreferenceStore, key: impl Into<String>, system_prefers_dark: bool) -> Self {
        let key = key.into();
        let theme = Theme::resolve(store.get(&key), system_prefers_dark);
        tracing::debug!(
            theme = theme.as_str(),
            stored = store.get(&key).is_some(),
            system_prefers_dark,
            "theme resolved"
        );
        Self { store, key, theme }
    }

    /// Current theme.
    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// Flip the theme and persist it.
    ///
    /// The in-session theme changes even when persisting fails; the error is
    /// returned so the caller can log it.
    pub fn toggle(&mut self) -> StorageResult<Theme> {
        self.set(self.theme.toggled())
    }

    /// Set and persist a specific theme.
    pub fn set(&mut self, theme: Theme) -> StorageResult<Theme> {
        self.theme = theme;
        tracing::debug!(theme = theme.as_str(), "theme changed");
        self.store.set(&self.key, theme.as_str())?;
        Ok(theme)
    }

    /// The backing preference store.
    #[must_use]
    pub fn store(&self) -> &PreferenceStore {
        &self.store
    }
}
