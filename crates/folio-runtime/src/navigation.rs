#![forbid(unsafe_code)]

//! In-page navigation.
//!
//! [`Navigator`] moves the viewport to a section by asking the host for a
//! scroll. Scrolls are fire-and-forget: the navigator never waits for one to
//! finish and never updates the active section itself. The observer events
//! produced by the scroll do that later.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use folio_core::section::{SectionId, SectionRegistry};

use crate::menu::MobileMenu;

/// How the host should animate a scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Animated scroll; easing and duration are up to the host.
    #[default]
    Smooth,
    /// Jump straight to the target.
    Instant,
}

impl ScrollBehavior {
    /// The CSSOM `behavior` keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smooth => "smooth",
            Self::Instant => "instant",
        }
    }
}

/// A request for the host to scroll the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    /// Target scroll offset: the document y that should sit at the top of
    /// the viewport.
    pub top: f64,
    /// Animation style.
    pub behavior: ScrollBehavior,
}

/// Host side of navigation: section lookup and scrolling.
pub trait ScrollHost {
    /// Document y of a section's top edge, or `None` if it is not rendered.
    fn section_top(&self, id: &SectionId) -> Option<f64>;

    /// Start a scroll. Must not block.
    fn request_scroll(&mut self, request: ScrollRequest);
}

impl<H: ScrollHost + ?Sized> ScrollHost for &mut H {
    fn section_top(&self, id: &SectionId) -> Option<f64> {
        (**self).section_top(id)
    }

    fn request_scroll(&mut self, request: ScrollRequest) {
        (**self).request_scroll(request);
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// A scroll to `top` was requested.
    Scrolled {
        /// The target section.
        section: SectionId,
        /// Requested scroll offset.
        top: f64,
    },
    /// The id is unknown or its region is not rendered; nothing scrolled.
    Unresolved,
}

impl Navigation {
    /// Whether a scroll was requested.
    #[must_use]
    pub const fn scrolled(&self) -> bool {
        matches!(self, Self::Scrolled { .. })
    }
}

/// Dispatches navigation requests to a [`ScrollHost`].
pub struct Navigator<H> {
    registry: Rc<SectionRegistry>,
    host: H,
    behavior: ScrollBehavior,
}

impl<H: ScrollHost> Navigator<H> {
    /// Create a navigator using smooth scrolling.
    #[must_use]
    pub fn new(registry: Rc<SectionRegistry>, host: H) -> Self {
        Self {
            registry,
            host,
            behavior: ScrollBehavior::Smooth,
        }
    }

    /// Set the scroll behavior for subsequent requests.
    #[must_use]
    pub fn with_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Scroll so that `id`'s top aligns with the viewport top, then close
    /// the mobile menu.
    ///
    /// Unknown or unrendered targets scroll nothing. The menu is closed in
    /// every case.
    pub fn navigate_to(&mut self, id: &str, menu: &mut MobileMenu) -> Navigation {
        let outcome = self.scroll_to_section(id);
        menu.close();
        outcome
    }

    /// Scroll back to the top of the page. Leaves the menu alone.
    pub fn scroll_to_top(&mut self) {
        tracing::debug!("scroll to top requested");
        self.host.request_scroll(ScrollRequest {
            top: 0.0,
            behavior: self.behavior,
        });
    }

    fn scroll_to_section(&mut self, id: &str) -> Navigation {
        let Some(section) = self.registry.get(id) else {
            tracing::debug!(section = id, "navigation target not registered");
            return Navigation::Unresolved;
        };
        let Some(top) = self.host.section_top(&section.id) else {
            tracing::debug!(section = id, "navigation target not rendered");
            return Navigation::Unresolved;
        };

        tracing::debug!(section = id, top, behavior = self.behavior.as_str(), "navigating");
        self.host.request_scroll(ScrollRequest {
            top,
            behavior: self.behavior,
        });
        Navigation::Scrolled {
            section: section.id.clone(),
            top,
        }
    }

    /// The scroll host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the scroll host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Current scroll behavior.
    #[must_use]
    pub const fn behavior(&self) -> ScrollBehavior {
        self.behavior
    }
}

impl<H: fmt::Debug> fmt::Debug for Navigator<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("host", &self.host)
            .field("behavior", &self.behavior)
            .finish()
    }
}

/// A scroll host backed by a fixed table of section offsets that records
/// every request.
#[derive(Debug, Clone, Default)]
pub struct RecordingScrollHost {
    tops: HashMap<SectionId, f64>,
    requests: Vec<ScrollRequest>,
}

impl RecordingScrollHost {
    /// An empty host where no section is rendered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a section as rendered at `top`.
    #[must_use]
    pub fn with_section(mut self, id: impl Into<SectionId>, top: f64) -> Self {
        self.tops.insert(id.into(), top);
        self
    }

    /// Requests recorded so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> &[ScrollRequest] {
        &self.requests
    }

    /// Most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<ScrollRequest> {
        self.requests.last().copied()
    }
}

impl ScrollHost for RecordingScrollHost {
    fn section_top(&self, id: &SectionId) -> Option<f64> {
        self.tops.get(id).copied()
    }

    fn request_scroll(&mut self, request: ScrollRequest) {
        self.requests.push(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn navigator() -> Navigator<RecordingScrollHost> {
        let host = RecordingScrollHost::new()
            .with_section("hero", 0.0)
            .with_section("about", 800.0)
            .with_section("projects", 2400.0);
        Navigator::new(Rc::new(SectionRegistry::portfolio()), host)
    }

    #[test]
    fn navigate_scrolls_to_section_top() {
        let mut nav = navigator();
        let mut menu = MobileMenu::new();
        let outcome = nav.navigate_to("projects", &mut menu);
        assert_eq!(
            outcome,
            Navigation::Scrolled {
                section: SectionId::new("projects"),
                top: 2400.0
            }
        );
        assert_eq!(
            nav.host().last_request(),
            Some(ScrollRequest {
                top: 2400.0,
                behavior: ScrollBehavior::Smooth
            })
        );
    }

    #[test]
    fn navigate_closes_open_menu() {
        let mut nav = navigator();
        let mut menu = MobileMenu::new();
        menu.toggle_open();
        nav.navigate_to("about", &mut menu);
        assert!(!menu.is_open());
    }

    #[test]
    fn unknown_target_is_silent_but_closes_menu() {
        let mut nav = navigator();
        let mut menu = MobileMenu::new();
        menu.toggle_open();
        let outcome = nav.navigate_to("nonexistent", &mut menu);
        assert_eq!(outcome, Navigation::Unresolved);
        assert!(!outcome.scrolled());
        assert!(nav.host().requests().is_empty());
        assert!(!menu.is_open());
    }

    #[test]
    fn unrendered_target_is_silent() {
        let mut nav = navigator();
        let mut menu = MobileMenu::new();
        // "contact" is registered but has no region yet.
        assert_eq!(nav.navigate_to("contact", &mut menu), Navigation::Unresolved);
        assert!(nav.host().requests().is_empty());
    }

    #[test]
    fn closed_menu_stays_closed() {
        let mut nav = navigator();
        let mut menu = MobileMenu::new();
        nav.navigate_to("hero", &mut menu);
        assert!(!menu.is_open());
    }

    #[test]
    fn scroll_to_top_leaves_menu_alone() {
        let mut nav = navigator().with_behavior(ScrollBehavior::Instant);
        nav.scroll_to_top();
        assert_eq!(
            nav.host().last_request(),
            Some(ScrollRequest {
                top: 0.0,
                behavior: ScrollBehavior::Instant
            })
        );
    }

    #[test]
    fn borrowed_host_works() {
        let mut host = RecordingScrollHost::new().with_section("skills", 1600.0);
        {
            let mut nav = Navigator::new(Rc::new(SectionRegistry::portfolio()), &mut host);
            let mut menu = MobileMenu::new();
            assert!(nav.navigate_to("skills", &mut menu).scrolled());
        }
        assert_eq!(host.requests().len(), 1);
    }
}
