#![forbid(unsafe_code)]

//! The observable list handle and its single-element operations.
//!
//! [`RangeList<T>`] is a cloneable handle to shared state, in the same shape
//! as a reactive observable: `Rc` for single-threaded shared ownership,
//! `RefCell` for the contents, and weakly held subscribers. Every clone sees
//! (and mutates) the same list.
//!
//! Range operations and deferral are implemented in sibling modules.
//!
//! # Event order
//!
//! A content-changing operation emits its property changes first
//! ([`PropertyChange::Count`] when the length changed, then
//! [`PropertyChange::Indexer`]) followed by its [`CollectionChange`].
//! Operations that change nothing emit nothing.
//!
//! # Reentrancy
//!
//! While a collection-change handler runs the list is *blocked*. Mutating it
//! from inside a handler is allowed as long as only one collection-change
//! handler is subscribed; with two or more handlers it fails with [`ListError::Reentrancy`], since
//! the other handlers would observe a list that no longer matches the
//! record they are processing.
//!
//! Every event goes through one FIFO queue. A change made from inside a
//! handler is queued behind the records already pending and dispatched once
//! the current handlers return, so records always arrive in the order the
//! edits happened.
//!
//! Handlers must not hold a borrow from [`RangeList::with`] while mutating.
//! Comparers and predicates may read the list but must not mutate it.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::change::{CollectionChange, ListEvent, PropertyChange};
use crate::config::{Comparer, NotifyMode, RangeListConfig};
use crate::error::{ListError, Result, check_index, check_insert_index};
use crate::subscribers::{SubscriberList, Subscription};

pub(crate) struct State<T> {
    pub(crate) items: Vec<T>,
    pub(crate) allow_duplicates: bool,
    pub(crate) version: u64,
}

pub(crate) struct Inner<T: 'static> {
    pub(crate) state: RefCell<State<T>>,
    pub(crate) comparer: Comparer<T>,
    pub(crate) add_mode: NotifyMode,
    pub(crate) remove_mode: NotifyMode,
    collection_subs: SubscriberList<CollectionChange<T>>,
    property_subs: SubscriberList<PropertyChange>,
    block_depth: Cell<usize>,
    pub(crate) defer_depth: Cell<usize>,
    pub(crate) deferred: RefCell<VecDeque<ListEvent<T>>>,
    flushing: Cell<bool>,
}

/// Observable list with batched range notifications.
///
/// ```
/// use rangelist::{CollectionChange, RangeList};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let list = RangeList::from_vec(vec![1, 2]);
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let s = Rc::clone(&seen);
/// let _sub = list.subscribe(move |change| s.borrow_mut().push(change.clone()));
///
/// list.add_range([3, 4, 5]).unwrap();
/// assert_eq!(
///     *seen.borrow(),
///     vec![CollectionChange::Add { items: vec![3, 4, 5], index: 2 }]
/// );
/// ```
pub struct RangeList<T: 'static> {
    pub(crate) inner: Rc<Inner<T>>,
}

impl<T: 'static> Clone for RangeList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for RangeList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("RangeList")
            .field("items", &state.items)
            .field("version", &state.version)
            .field("allow_duplicates", &state.allow_duplicates)
            .field("subscribers", &self.inner.collection_subs.live_count())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Default for RangeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + 'static> FromIterator<T> for RangeList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: Clone + PartialEq + 'static> RangeList<T> {
    /// Create an empty list with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RangeListConfig::default())
    }

    /// Create a list holding `items`, default configuration.
    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_vec_with_config(items, RangeListConfig::default())
    }
}

/// Marks the queue as draining; a panicking handler discards what is left.
struct FlushScope<'a, T: 'static>(&'a Inner<T>);

impl<T: 'static> Drop for FlushScope<'_, T> {
    fn drop(&mut self) {
        self.0.flushing.set(false);
        if std::thread::panicking() {
            self.0.deferred.borrow_mut().clear();
        }
    }
}

/// Increments the block depth for the lifetime of a collection dispatch.
struct ReentrancyBlock<'a>(&'a Cell<usize>);

impl<'a> ReentrancyBlock<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for ReentrancyBlock<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl<T: Clone + 'static> RangeList<T> {
    /// Create an empty list with `config`.
    #[must_use]
    pub fn with_config(config: RangeListConfig<T>) -> Self {
        Self::from_vec_with_config(Vec::new(), config)
    }

    /// Create a list holding `items` with `config`.
    ///
    /// With duplicates disallowed, later duplicates in `items` are dropped.
    #[must_use]
    pub fn from_vec_with_config(items: Vec<T>, config: RangeListConfig<T>) -> Self {
        let items = if config.allow_duplicates {
            items
        } else {
            config.comparer.distinct(items)
        };
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(State {
                    items,
                    allow_duplicates: config.allow_duplicates,
                    version: 0,
                }),
                comparer: config.comparer,
                add_mode: config.add_mode,
                remove_mode: config.remove_mode,
                collection_subs: SubscriberList::default(),
                property_subs: SubscriberList::default(),
                block_depth: Cell::new(0),
                defer_depth: Cell::new(0),
                deferred: RefCell::new(VecDeque::new()),
                flushing: Cell::new(false),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.borrow().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().items.is_empty()
    }

    /// Clone of the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.state.borrow().items.get(index).cloned()
    }

    /// Whether an element equal to `item` (per the comparer) is present.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.index_of(item).is_some()
    }

    /// Index of the first element equal to `item`.
    #[must_use]
    pub fn index_of(&self, item: &T) -> Option<usize> {
        let state = self.inner.state.borrow();
        self.inner.comparer.position(&state.items, item)
    }

    /// Snapshot of the contents.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.state.borrow().items.clone()
    }

    /// Access the contents by reference. `f` must not mutate the list.
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.inner.state.borrow().items)
    }

    /// Incremented once per operation that changed the contents.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.state.borrow().version
    }

    #[must_use]
    pub fn allow_duplicates(&self) -> bool {
        self.inner.state.borrow().allow_duplicates
    }

    /// Toggle duplicate suppression for subsequent operations. Existing
    /// contents are left as they are.
    pub fn set_allow_duplicates(&self, allow: bool) {
        self.inner.state.borrow_mut().allow_duplicates = allow;
    }

    /// The equality used by this list.
    #[must_use]
    pub fn comparer(&self) -> Comparer<T> {
        self.inner.comparer.clone()
    }

    /// Whether two handles refer to the same list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Subscribe to collection changes. Drop the returned guard to stop.
    pub fn subscribe(&self, callback: impl Fn(&CollectionChange<T>) + 'static) -> Subscription {
        self.inner.collection_subs.subscribe(callback)
    }

    /// Subscribe to property changes.
    pub fn subscribe_property(&self, callback: impl Fn(PropertyChange) + 'static) -> Subscription {
        self.inner
            .property_subs
            .subscribe(move |change: &PropertyChange| callback(*change))
    }

    /// Number of live collection-change subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.collection_subs.live_count()
    }

    // -----------------------------------------------------------------------
    // Single-element mutations
    // -----------------------------------------------------------------------

    /// Append `item`. Returns `false` if it was suppressed as a duplicate.
    ///
    /// # Errors
    ///
    /// [`ListError::Reentrancy`] when called from a handler while several
    /// handlers are subscribed.
    pub fn push(&self, item: T) -> Result<bool> {
        let len = self.len();
        self.insert(len, item)
    }

    /// Insert `item` at `index`. Returns `false` if it was suppressed as a
    /// duplicate.
    ///
    /// # Errors
    ///
    /// [`ListError::IndexOutOfRange`] if `index > len`, or
    /// [`ListError::Reentrancy`].
    pub fn insert(&self, index: usize, item: T) -> Result<bool> {
        {
            let state = self.inner.state.borrow();
            check_insert_index(index, state.items.len())?;
            if !state.allow_duplicates && self.inner.comparer.contains(&state.items, &item) {
                return Ok(false);
            }
        }
        self.check_reentrancy()?;
        {
            let mut state = self.inner.state.borrow_mut();
            state.items.insert(index, item.clone());
            state.version += 1;
        }
        self.essential_properties_changed();
        self.emit_change(CollectionChange::Add {
            items: vec![item],
            index,
        });
        Ok(true)
    }

    /// Remove the first element equal to `item`. Returns whether one was
    /// found.
    ///
    /// # Errors
    ///
    /// [`ListError::Reentrancy`].
    pub fn remove(&self, item: &T) -> Result<bool> {
        match self.index_of(item) {
            Some(index) => self.remove_at(index).map(|_| true),
            None => Ok(false),
        }
    }

    /// Remove and return the element at `index`.
    ///
    /// # Errors
    ///
    /// [`ListError::IndexOutOfRange`] or [`ListError::Reentrancy`].
    pub fn remove_at(&self, index: usize) -> Result<T> {
        check_index(index, self.len())?;
        self.check_reentrancy()?;
        let removed = {
            let mut state = self.inner.state.borrow_mut();
            state.version += 1;
            state.items.remove(index)
        };
        self.essential_properties_changed();
        self.emit_change(CollectionChange::Remove {
            items: vec![removed.clone()],
            index,
        });
        Ok(removed)
    }

    /// Overwrite the element at `index`.
    ///
    /// Returns `false` without emitting anything when `item` equals the
    /// current element, or when duplicates are disallowed and an equal
    /// element exists anywhere in the list.
    ///
    /// # Errors
    ///
    /// [`ListError::IndexOutOfRange`] or [`ListError::Reentrancy`].
    pub fn set(&self, index: usize, item: T) -> Result<bool> {
        {
            let state = self.inner.state.borrow();
            check_index(index, state.items.len())?;
            let unchanged = if state.allow_duplicates {
                self.inner.comparer.equals(&state.items[index], &item)
            } else {
                self.inner.comparer.contains(&state.items, &item)
            };
            if unchanged {
                return Ok(false);
            }
        }
        self.check_reentrancy()?;
        let old = {
            let mut state = self.inner.state.borrow_mut();
            state.version += 1;
            std::mem::replace(&mut state.items[index], item.clone())
        };
        self.emit(ListEvent::Property(PropertyChange::Indexer));
        self.emit_change(CollectionChange::Replace {
            new_items: vec![item],
            old_items: vec![old],
            index,
        });
        Ok(true)
    }

    /// Move the element at `old_index` so it ends up at `new_index`.
    /// Equal indices are a no-op.
    ///
    /// # Errors
    ///
    /// [`ListError::IndexOutOfRange`] or [`ListError::Reentrancy`].
    pub fn move_item(&self, old_index: usize, new_index: usize) -> Result<()> {
        let len = self.len();
        check_index(old_index, len)?;
        check_index(new_index, len)?;
        if old_index == new_index {
            return Ok(());
        }
        self.check_reentrancy()?;
        let moved = {
            let mut state = self.inner.state.borrow_mut();
            let item = state.items.remove(old_index);
            state.items.insert(new_index, item.clone());
            state.version += 1;
            item
        };
        self.emit(ListEvent::Property(PropertyChange::Indexer));
        self.emit_change(CollectionChange::Move {
            items: vec![moved],
            old_index,
            new_index,
        });
        Ok(())
    }

    /// Remove every element. A no-op on an empty list.
    ///
    /// # Errors
    ///
    /// [`ListError::Reentrancy`].
    pub fn clear(&self) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        self.check_reentrancy()?;
        {
            let mut state = self.inner.state.borrow_mut();
            state.items.clear();
            state.version += 1;
        }
        self.essential_properties_changed();
        self.emit_change(CollectionChange::Reset);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Notification plumbing
    // -----------------------------------------------------------------------

    pub(crate) fn check_reentrancy(&self) -> Result<()> {
        if self.inner.block_depth.get() > 0 && self.inner.collection_subs.live_count() > 1 {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                subscribers = self.inner.collection_subs.live_count(),
                "rejected list mutation from inside a change handler"
            );
            return Err(ListError::Reentrancy);
        }
        Ok(())
    }

    pub(crate) fn essential_properties_changed(&self) {
        self.emit(ListEvent::Property(PropertyChange::Count));
        self.emit(ListEvent::Property(PropertyChange::Indexer));
    }

    pub(crate) fn emit_change(&self, change: CollectionChange<T>) {
        self.emit(ListEvent::Collection(change));
    }

    /// Queue `event`, then flush unless a deferral scope is open.
    pub(crate) fn emit(&self, event: ListEvent<T>) {
        self.inner.deferred.borrow_mut().push_back(event);
        if self.inner.defer_depth.get() == 0 {
            self.flush_queue();
        }
    }

    /// Dispatch queued events front to back until the queue is empty.
    ///
    /// Only the outermost call drains; events emitted by handlers while it
    /// runs join the back of the queue. Draining pauses if a handler leaves
    /// a deferral scope open.
    pub(crate) fn flush_queue(&self) {
        if self.inner.flushing.replace(true) {
            return;
        }
        let _flush = FlushScope(&self.inner);
        while self.inner.defer_depth.get() == 0 {
            let next = self.inner.deferred.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            self.dispatch(&event);
        }
    }

    pub(crate) fn dispatch(&self, event: &ListEvent<T>) {
        match event {
            ListEvent::Collection(change) => {
                let _block = ReentrancyBlock::enter(&self.inner.block_depth);
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    action = ?change.action(),
                    index = ?change.index(),
                    len = change.len(),
                    "dispatch collection change"
                );
                self.inner.collection_subs.notify(change);
            }
            ListEvent::Property(change) => self.inner.property_subs.notify(change),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
