#![forbid(unsafe_code)]

//! Page configuration.

use std::fmt;

use crate::navigation::ScrollBehavior;
use crate::observer::{Threshold, ThresholdError};
use crate::scroll_progress::DEFAULT_SCROLL_TOP_OFFSET;
use crate::theme::THEME_KEY;

/// Tunables for a mounted [`Page`](crate::page::Page).
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    /// Visibility threshold for active-section tracking.
    pub tracking_threshold: Threshold,
    /// Visibility threshold for reveal animations.
    pub reveal_threshold: Threshold,
    /// Scroll offset past which the scroll-to-top button shows.
    pub scroll_top_offset: f64,
    /// Preference key for the theme.
    pub theme_key: String,
    /// How navigation scrolls.
    pub scroll_behavior: ScrollBehavior,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            tracking_threshold: Threshold::SECTION_TRACKING,
            reveal_threshold: Threshold::REVEAL,
            scroll_top_offset: DEFAULT_SCROLL_TOP_OFFSET,
            theme_key: THEME_KEY.to_owned(),
            scroll_behavior: ScrollBehavior::Smooth,
        }
    }
}

impl PageConfig {
    /// Set the tracking threshold from a raw fraction.
    pub fn with_tracking_threshold(mut self, value: f64) -> Result<Self, ConfigError> {
        self.tracking_threshold = Threshold::new(value).map_err(ConfigError::Threshold)?;
        Ok(self)
    }

    /// Set the reveal threshold from a raw fraction.
    pub fn with_reveal_threshold(mut self, value: f64) -> Result<Self, ConfigError> {
        self.reveal_threshold = Threshold::new(value).map_err(ConfigError::Threshold)?;
        Ok(self)
    }

    /// Set the scroll-to-top reveal offset.
    #[must_use]
    pub fn with_scroll_top_offset(mut self, offset: f64) -> Self {
        self.scroll_top_offset = offset;
        self
    }

    /// Set the theme preference key.
    #[must_use]
    pub fn with_theme_key(mut self, key: impl Into<String>) -> Self {
        self.theme_key = key.into();
        self
    }

    /// Set the navigation scroll behavior.
    #[must_use]
    pub fn with_scroll_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.scroll_behavior = behavior;
        self
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for threshold in [self.tracking_threshold, self.reveal_threshold] {
            Threshold::new(threshold.value()).map_err(ConfigError::Threshold)?;
        }
        if !(self.scroll_top_offset.is_finite() && self.scroll_top_offset >= 0.0) {
            return Err(ConfigError::ScrollTopOffset(self.scroll_top_offset));
        }
        if self.theme_key.is_empty() {
            return Err(ConfigError::EmptyThemeKey);
        }
        Ok(())
    }
}

/// Which observer a mount-time check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverRole {
    /// Drives the active section.
    Tracking,
    /// Drives reveal animations.
    Reveal,
}

impl ObserverRole {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tracking => "tracking",
            Self::Reveal => "reveal",
        }
    }
}

/// Invalid page configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A visibility threshold was outside `[0, 1]`.
    Threshold(ThresholdError),
    /// The scroll-to-top offset was negative or not finite.
    ScrollTopOffset(f64),
    /// The theme preference key was empty.
    EmptyThemeKey,
    /// An observer passed to mount reports at a different threshold than
    /// the config asks for.
    ThresholdMismatch {
        role: ObserverRole,
        expected: f64,
        actual: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Threshold(e) => write!(f, "invalid config: {e}"),
            Self::ScrollTopOffset(v) => {
                write!(f, "invalid config: scroll-to-top offset {v} must be finite and >= 0")
            }
            Self::EmptyThemeKey => write!(f, "invalid config: theme key is empty"),
            Self::ThresholdMismatch {
                role,
                expected,
                actual,
            } => write!(
                f,
                "invalid config: {} observer threshold is {actual}, expected {expected}",
                role.as_str()
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Threshold(e) => Some(e),
            _ => None,
        }
    }
}
