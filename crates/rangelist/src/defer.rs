#![forbid(unsafe_code)]

//! Deferred notification scopes.
//!
//! While a [`DeferGuard`] is alive, every event the list would dispatch is
//! queued instead. Dropping the outermost guard flushes the queue in
//! emission order, so handlers only ever run against the list state that
//! exists after the whole batch was applied.
//!
//! ```
//! use rangelist::{EventLog, RangeList};
//!
//! let list = RangeList::new();
//! let log = EventLog::new(&list);
//! {
//!     let _batch = list.defer_events();
//!     list.push(1).unwrap();
//!     list.push(2).unwrap();
//!     assert!(log.is_empty());
//! }
//! assert_eq!(log.collection_changes().len(), 2);
//! ```
//!
//! # Invariants
//!
//! 1. Nested guards are counted; only the outermost drop flushes.
//! 2. Queued events are dispatched exactly once, in the order emitted.
//! 3. A handler that mutates the list during the flush has its change
//!    queued behind the events still pending, so records reach handlers in
//!    the order the edits happened.
//! 4. If the guard is dropped while unwinding from a panic, the queue is
//!    discarded rather than dispatched.

use std::fmt;

use crate::list::RangeList;

/// RAII guard returned by [`RangeList::defer_events`].
#[must_use = "dropping the guard flushes deferred events immediately"]
pub struct DeferGuard<T: Clone + 'static> {
    list: RangeList<T>,
}

impl<T: Clone + 'static> fmt::Debug for DeferGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferGuard")
            .field("depth", &self.list.inner.defer_depth.get())
            .field("queued", &self.list.inner.deferred.borrow().len())
            .finish()
    }
}

impl<T: Clone + 'static> Drop for DeferGuard<T> {
    fn drop(&mut self) {
        self.list.end_defer();
    }
}

impl<T: Clone + 'static> RangeList<T> {
    /// Queue notifications until the returned guard is dropped.
    pub fn defer_events(&self) -> DeferGuard<T> {
        let depth = &self.inner.defer_depth;
        depth.set(depth.get() + 1);
        DeferGuard { list: self.clone() }
    }

    /// Whether notifications are currently being queued.
    #[must_use]
    pub fn is_deferring(&self) -> bool {
        self.inner.defer_depth.get() > 0
    }

    fn end_defer(&self) {
        let depth = &self.inner.defer_depth;
        depth.set(depth.get().saturating_sub(1));
        if depth.get() > 0 {
            return;
        }

        if std::thread::panicking() {
            self.inner.deferred.borrow_mut().clear();
            return;
        }
        #[cfg(feature = "tracing")]
        {
            let queued = self.inner.deferred.borrow().len();
            if queued > 0 {
                tracing::debug!(events = queued, "flushing deferred list events");
            }
        }
        self.flush_queue();
    }
}
