#![forbid(unsafe_code)]

//! Entrance-animation triggers.
//!
//! A section is revealed the first time it intersects at the reveal
//! threshold and stays revealed for the rest of the page's life. This is
//! independent of active-section tracking and usually runs on its own,
//! looser observer.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use folio_core::event::IntersectionEvent;
use folio_core::section::{SectionId, SectionRegistry};

use crate::observer::VisibilityObserver;
use crate::subscription::Subscription;

/// CSS class applied to a revealed section.
pub const REVEAL_CLASS: &str = "animate-slide-in-up";

/// Sticky record of which sections have been revealed.
#[derive(Debug, Clone)]
pub struct RevealTracker {
    registry: Rc<SectionRegistry>,
    revealed: Rc<RefCell<HashSet<SectionId>>>,
}

impl RevealTracker {
    /// Create a tracker where nothing is revealed yet.
    #[must_use]
    pub fn new(registry: Rc<SectionRegistry>) -> Self {
        Self {
            registry,
            revealed: Rc::new(RefCell::new(HashSet::new())),
        }
    }

    /// Apply one intersection event. Returns `true` on first reveal.
    pub fn apply(&self, event: &IntersectionEvent) -> bool {
        if !event.is_intersecting || !self.registry.contains(event.section.as_str()) {
            return false;
        }
        let first = self.revealed.borrow_mut().insert(event.section.clone());
        if first {
            tracing::trace!(section = %event.section, "section revealed");
        }
        first
    }

    /// Whether a section has been revealed.
    #[must_use]
    pub fn is_revealed(&self, id: &str) -> bool {
        self.revealed.borrow().contains(id)
    }

    /// Revealed sections in registry order.
    #[must_use]
    pub fn revealed(&self) -> Vec<SectionId> {
        let revealed = self.revealed.borrow();
        self.registry
            .ids()
            .filter(|id| revealed.contains(*id))
            .cloned()
            .collect()
    }

    /// Subscribe a shared copy of this tracker to an observer.
    #[must_use = "dropping the subscription stops reveal tracking"]
    pub fn attach(&self, observer: &dyn VisibilityObserver) -> Subscription {
        let tracker = self.clone();
        observer.subscribe(Box::new(move |event: &IntersectionEvent| {
            tracker.apply(event);
        }))
    }
}
