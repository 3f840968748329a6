#![forbid(unsafe_code)]

//! Subscription scopes over [`RangeList`]s.
//!
//! A [`BindingScope`] owns the subscriptions of one consumer (a view, a
//! cache, a sync task) across any number of lists and releases them together
//! when dropped or cleared.
//!
//! # Invariants
//!
//! 1. Dropping a `BindingScope` releases its subscriptions in registration
//!    order; after that none of its callbacks fire.
//! 2. `clear()` releases everything but leaves the scope usable.

use std::fmt;

use crate::change::{CollectionChange, PropertyChange};
use crate::list::RangeList;
use crate::subscribers::Subscription;

/// Owns the subscriptions of a logical consumer.
///
/// # Usage
///
/// ```
/// use rangelist::RangeList;
/// use rangelist::binding::BindingScope;
///
/// let list = RangeList::<u32>::new();
/// let mut scope = BindingScope::new();
/// scope
///     .subscribe(&list, |change| println!("{change:?}"))
///     .subscribe_property(&list, |prop| println!("{prop:?} changed"));
/// assert_eq!(scope.binding_count(), 2);
///
/// drop(scope); // both callbacks are released
/// assert_eq!(list.subscriber_count(), 0);
/// ```
pub struct BindingScope {
    subscriptions: Vec<Subscription>,
}

impl BindingScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Keep `sub` alive until the scope is dropped or cleared.
    pub fn hold(&mut self, sub: Subscription) {
        self.subscriptions.push(sub);
    }

    /// Subscribe to collection changes of `list` within this scope.
    pub fn subscribe<T: Clone + 'static>(
        &mut self,
        list: &RangeList<T>,
        callback: impl Fn(&CollectionChange<T>) + 'static,
    ) -> &mut Self {
        self.subscriptions.push(list.subscribe(callback));
        self
    }

    /// Subscribe to property changes of `list` within this scope.
    pub fn subscribe_property<T: Clone + 'static>(
        &mut self,
        list: &RangeList<T>,
        callback: impl Fn(PropertyChange) + 'static,
    ) -> &mut Self {
        self.subscriptions.push(list.subscribe_property(callback));
        self
    }

    /// Number of held subscriptions.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release all subscriptions now; the scope stays usable.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

impl Default for BindingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingScope")
            .field("binding_count", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn scope_holds_and_releases() {
        let list = RangeList::<i32>::new();
        let hits = Rc::new(Cell::new(0));

        {
            let mut scope = BindingScope::new();
            let h = Rc::clone(&hits);
            scope.subscribe(&list, move |_| h.set(h.get() + 1));
            let h = Rc::clone(&hits);
            scope.subscribe_property(&list, move |_| h.set(h.get() + 10));
            assert_eq!(scope.binding_count(), 2);

            list.push(1).unwrap();
            assert_eq!(hits.get(), 21);
        }

        list.push(2).unwrap();
        assert_eq!(hits.get(), 21, "callbacks must not fire after scope drop");
    }

    #[test]
    fn scope_spans_several_lists() {
        let names = RangeList::from_vec(vec!["a".to_string()]);
        let scores = RangeList::from_vec(vec![1, 2, 3]);
        let hits = Rc::new(Cell::new(0));

        let mut scope = BindingScope::new();
        let (h1, h2) = (Rc::clone(&hits), Rc::clone(&hits));
        scope
            .subscribe(&names, move |_| h1.set(h1.get() + 1))
            .subscribe(&scores, move |_| h2.set(h2.get() + 1));

        names.add_range(["b".to_string(), "c".to_string()]).unwrap();
        scores.remove_all(|x| x % 2 == 1).unwrap();
        assert_eq!(hits.get(), 3);

        drop(scope);
        assert_eq!(names.subscriber_count(), 0);
        assert_eq!(scores.subscriber_count(), 0);
    }

    #[test]
    fn scope_clear_is_reusable() {
        let list = RangeList::<i32>::new();
        let mut scope = BindingScope::new();

        let first = Rc::new(Cell::new(false));
        let f = Rc::clone(&first);
        scope.subscribe(&list, move |_| f.set(true));
        scope.clear();
        assert!(scope.is_empty());

        let second = Rc::new(Cell::new(false));
        let s = Rc::clone(&second);
        scope.subscribe(&list, move |_| s.set(true));

        list.push(1).unwrap();
        assert!(!first.get());
        assert!(second.get());
    }

    #[test]
    fn scope_hold_external_subscription() {
        let list = RangeList::<i32>::new();
        let mut scope = BindingScope::default();
        scope.hold(list.subscribe(|_| {}));
        assert_eq!(list.subscriber_count(), 1);
        drop(scope);
        assert_eq!(list.subscriber_count(), 0);
    }

    #[test]
    fn scope_debug_format() {
        let list = RangeList::<i32>::new();
        let mut scope = BindingScope::new();
        scope.subscribe(&list, |_| {});
        scope.subscribe(&list, |_| {});
        assert!(format!("{scope:?}").contains("binding_count: 2"));
    }
}
