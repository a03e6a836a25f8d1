#![forbid(unsafe_code)]

//! Mobile menu state.
//!
//! A single flag: whether the collapsed navigation overlay is shown. It
//! starts closed, flips on the menu button, and closes on navigation or on
//! Escape while open.

use folio_core::event::KeyEvent;

/// Open/closed state of the mobile navigation overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobileMenu {
    is_open: bool,
}

impl MobileMenu {
    /// A closed menu.
    #[must_use]
    pub const fn new() -> Self {
        Self { is_open: false }
    }

    /// Whether the overlay is shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// Flip the overlay (menu button).
    pub fn toggle_open(&mut self) -> bool {
        self.is_open = !self.is_open;
        tracing::debug!(open = self.is_open, "mobile menu toggled");
        self.is_open
    }

    /// Close the overlay. Idempotent.
    pub fn close(&mut self) {
        if self.is_open {
            tracing::debug!("mobile menu closed");
        }
        self.is_open = false;
    }

    /// Handle a cancel key: Escape closes an open menu.
    ///
    /// Returns `true` if the key closed the menu. Other keys, key releases,
    /// and Escape while closed are no-ops.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if !(self.is_open && key.is_escape() && key.is_down()) {
            return false;
        }
        self.close();
        true
    }
}
