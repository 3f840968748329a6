#![forbid(unsafe_code)]

//! Subscriber bookkeeping shared by the list's notification channels.
//!
//! Callbacks are owned by the [`Subscription`] handed back to the caller;
//! the list only keeps `Weak` references and prunes dead ones lazily when it
//! next notifies.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 3. The callback list is snapshotted before dispatch, so a callback may
//!    subscribe, unsubscribe or mutate the list without a double borrow.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<E> = dyn Fn(&E);

/// RAII guard for a registered callback. Drop it to unsubscribe.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _callback: Box<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Registration-ordered set of weakly held callbacks.
pub(crate) struct SubscriberList<E: 'static> {
    entries: RefCell<Vec<Weak<Callback<E>>>>,
}

impl<E: 'static> Default for SubscriberList<E> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }
}

impl<E: 'static> SubscriberList<E> {
    pub(crate) fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        let strong: Rc<Callback<E>> = Rc::new(callback);
        self.entries.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            _callback: Box::new(strong),
        }
    }

    /// Live callbacks in registration order; dead entries are pruned.
    fn snapshot(&self) -> Vec<Rc<Callback<E>>> {
        let mut entries = self.entries.borrow_mut();
        let mut live = Vec::with_capacity(entries.len());
        entries.retain(|weak| match weak.upgrade() {
            Some(strong) => {
                live.push(strong);
                true
            }
            None => false,
        });
        live
    }

    pub(crate) fn notify(&self, event: &E) {
        for callback in self.snapshot() {
            callback(event);
        }
    }

    pub(crate) fn live_count(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}
