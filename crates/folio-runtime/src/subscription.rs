#![forbid(unsafe_code)]

//! Subscription handles for event-loop callbacks.
//!
//! Event sources such as visibility observers keep a [`Listeners`] list and
//! hand out a [`Subscription`] for each registered callback. The handle
//! owns the registration: dropping it (or calling
//! [`Subscription::unsubscribe`]) removes the callback, after which it never
//! runs again.
//!
//! # How it works
//!
//! 1. A source calls [`Listeners::subscribe`] with a callback.
//! 2. The source calls [`Listeners::emit`] whenever it has an event.
//! 3. The consumer keeps the returned [`Subscription`] alive for as long as
//!    it wants events, typically the lifetime of a mounted page.
//!
//! Everything here is `!Send`: callbacks run on the event-loop thread that
//! owns the source, one at a time.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A unique identifier for a subscription within one [`Listeners`] list.
pub type SubId = u64;

type Callback<E> = Rc<RefCell<Box<dyn FnMut(&E)>>>;

/// Removal side of a listener list, erased over the event type so that
/// [`Subscription`] does not need a type parameter.
trait Release {
    fn release(&self, id: SubId) -> bool;
    fn is_registered(&self, id: SubId) -> bool;
}

struct ListenerSet<E> {
    next_id: SubId,
    entries: Vec<(SubId, Callback<E>)>,
}

impl<E> Release for RefCell<ListenerSet<E>> {
    fn release(&self, id: SubId) -> bool {
        let mut set = self.borrow_mut();
        let before = set.entries.len();
        set.entries.retain(|(entry_id, _)| *entry_id != id);
        set.entries.len() != before
    }

    fn is_registered(&self, id: SubId) -> bool {
        self.borrow().entries.iter().any(|(entry_id, _)| *entry_id == id)
    }
}

/// An ordered list of callbacks interested in events of type `E`.
pub struct Listeners<E: 'static> {
    inner: Rc<RefCell<ListenerSet<E>>>,
}

impl<E: 'static> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Listeners<E> {
    /// Create an empty listener list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListenerSet {
                next_id: 1,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a callback. It stays registered until the returned handle is
    /// released.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl FnMut(&E) + 'static) -> Subscription {
        let id = {
            let mut set = self.inner.borrow_mut();
            let id = set.next_id;
            set.next_id += 1;
            set.entries
                .push((id, Rc::new(RefCell::new(Box::new(callback)))));
            id
        };
        tracing::debug!(sub_id = id, "subscription started");

        let weak: Weak<RefCell<ListenerSet<E>>> = Rc::downgrade(&self.inner);
        let source: Weak<dyn Release> = weak;
        Subscription {
            id,
            source: Some(source),
        }
    }

    /// Deliver `event` to every registered callback, in subscription order.
    ///
    /// Callbacks may subscribe or unsubscribe while the event is being
    /// delivered; a callback released mid-delivery is not invoked afterwards.
    /// Returns the number of callbacks that ran.
    pub fn emit(&self, event: &E) -> usize {
        let snapshot: Vec<(SubId, Callback<E>)> = self.inner.borrow().entries.clone();

        let mut delivered = 0;
        for (id, callback) in snapshot {
            if !self.inner.is_registered(id) {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut f) => {
                    f(event);
                    delivered += 1;
                }
                Err(_) => {
                    tracing::warn!(sub_id = id, "re-entrant emit skipped for busy callback");
                }
            }
        }
        delivered
    }

    /// Remove every callback. Outstanding handles become inert.
    pub fn clear(&self) -> usize {
        let mut set = self.inner.borrow_mut();
        let count = set.entries.len();
        set.entries.clear();
        if count > 0 {
            tracing::debug!(count, "all subscriptions released");
        }
        count
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Whether no callback is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish()
    }
}

/// Handle that keeps a callback registered.
///
/// Released exactly once: by [`unsubscribe`](Self::unsubscribe) or on drop,
/// whichever comes first. Releasing after the source itself has been dropped
/// or cleared is a no-op.
pub struct Subscription {
    id: SubId,
    source: Option<Weak<dyn Release>>,
}

impl Subscription {
    /// A handle that is not attached to any source.
    #[must_use]
    pub fn detached() -> Self {
        Self { id: 0, source: None }
    }

    /// Identifier within the source's listener list.
    #[must_use]
    pub fn id(&self) -> SubId {
        self.id
    }

    /// Whether the callback is still registered with a live source.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.source
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|source| source.is_registered(self.id))
    }

    /// Release the registration now.
    ///
    /// Returns `true` if a live callback was removed.
    pub fn unsubscribe(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        let Some(source) = self.source.take().and_then(|weak| weak.upgrade()) else {
            return false;
        };
        let removed = source.release(self.id);
        if removed {
            tracing::debug!(sub_id = self.id, "subscription stopped");
        }
        removed
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
