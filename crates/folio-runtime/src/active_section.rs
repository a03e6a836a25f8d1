#![forbid(unsafe_code)]

//! Active-section tracking.
//!
//! [`ActiveSectionController`] is the only writer of the active section id.
//! It consumes intersection events and applies a last-writer-wins rule:
//! every intersecting event for a registered section becomes the new active
//! section, regardless of which other sections are also on screen.
//! Non-intersecting events and unknown ids are ignored, so every event is a
//! valid transition and the state is always a registered id.
//!
//! UI code reads the value through [`ActiveSectionReader`] handles, which
//! cannot write.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use folio_core::event::IntersectionEvent;
use folio_core::section::{SectionId, SectionRegistry};

use crate::observer::VisibilityObserver;
use crate::subscription::Subscription;

/// Writer for the active section id.
pub struct ActiveSectionController {
    registry: Rc<SectionRegistry>,
    current: Rc<RefCell<SectionId>>,
}

impl ActiveSectionController {
    /// Create a controller whose active section is the registry's first.
    #[must_use]
    pub fn new(registry: Rc<SectionRegistry>) -> Self {
        let first = registry.first().id.clone();
        Self {
            registry,
            current: Rc::new(RefCell::new(first)),
        }
    }

    /// Apply one intersection event.
    ///
    /// Returns `true` if the active section changed.
    pub fn apply(&self, event: &IntersectionEvent) -> bool {
        if !event.is_intersecting {
            return false;
        }
        let Some(section) = self.registry.get(event.section.as_str()) else {
            tracing::trace!(section = %event.section, "ignoring unregistered section");
            return false;
        };

        let mut current = self.current.borrow_mut();
        if *current == section.id {
            return false;
        }
        tracing::debug!(from = %current.as_str(), to = %section.id, "active section changed");
        *current = section.id.clone();
        true
    }

    /// Current active section id.
    #[must_use]
    pub fn current(&self) -> SectionId {
        self.current.borrow().clone()
    }

    /// A read-only handle to the active section.
    #[must_use]
    pub fn reader(&self) -> ActiveSectionReader {
        ActiveSectionReader {
            current: Rc::clone(&self.current),
        }
    }

    /// Subscribe this controller to an observer's events.
    ///
    /// The controller moves into the callback; keep a [`reader`](Self::reader)
    /// first if the value needs to be read afterwards.
    #[must_use = "dropping the subscription stops tracking"]
    pub fn attach(self, observer: &dyn VisibilityObserver) -> Subscription {
        tracing::debug!(
            threshold = observer.threshold().value(),
            sections = self.registry.len(),
            "active section tracking attached"
        );
        observer.subscribe(Box::new(move |event: &IntersectionEvent| {
            self.apply(event);
        }))
    }
}

impl fmt::Debug for ActiveSectionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveSectionController")
            .field("current", &*self.current.borrow())
            .finish()
    }
}

/// Read-only view of the active section id.
#[derive(Clone)]
pub struct ActiveSectionReader {
    current: Rc<RefCell<SectionId>>,
}

impl ActiveSectionReader {
    /// Current active section id.
    #[must_use]
    pub fn current(&self) -> SectionId {
        self.current.borrow().clone()
    }

    /// Whether `id` is the active section (for menu highlighting).
    #[must_use]
    pub fn is_active(&self, id: &str) -> bool {
        self.current.borrow().as_str() == id
    }
}

impl fmt::Debug for ActiveSectionReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActiveSectionReader")
            .field(&*self.current.borrow())
            .finish()
    }
}
