#![forbid(unsafe_code)]

//! Global keyboard shortcuts.
//!
//! | Keys | Action |
//! |------|--------|
//! | `Escape` | close the mobile menu (if open) |
//! | `Alt+1` .. `Alt+9` | jump to the n-th section |
//! | `Alt+D` | toggle dark mode |
//! | `Alt+T` | scroll to top |
//!
//! Resolution is pure: [`resolve`] maps a key event to an optional
//! [`ShortcutAction`] and the page decides what to do with it. Key releases
//! never resolve.

use folio_core::event::{KeyCode, KeyEvent};
use folio_core::section::{SectionId, SectionRegistry};

/// Action bound to a shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Close the mobile menu if it is open.
    CloseMenu,
    /// Navigate to a section.
    Navigate(SectionId),
    /// Flip the color theme.
    ToggleTheme,
    /// Scroll to the top of the page.
    ScrollToTop,
}

/// Map a key event to its shortcut, if any.
#[must_use]
pub fn resolve(key: &KeyEvent, registry: &SectionRegistry) -> Option<ShortcutAction> {
    if !key.is_down() {
        return None;
    }
    if key.is_escape() {
        return Some(ShortcutAction::CloseMenu);
    }
    if !key.alt() {
        return None;
    }

    match key.code {
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'd' => Some(ShortcutAction::ToggleTheme),
            't' => Some(ShortcutAction::ScrollToTop),
            digit @ '1'..='9' => {
                let position = usize::from(digit as u8 - b'1');
                registry
                    .nth(position)
                    .map(|section| ShortcutAction::Navigate(section.id.clone()))
            }
            _ => None,
        },
        _ => None,
    }
}
