#![forbid(unsafe_code)]

//! Ordered log of everything a list dispatched.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::change::{CollectionChange, ListEvent};
use crate::list::RangeList;
use crate::subscribers::Subscription;

/// Records every collection and property event of one list, interleaved in
/// dispatch order. Dropping the log unsubscribes it.
pub struct EventLog<T: 'static> {
    events: Rc<RefCell<Vec<ListEvent<T>>>>,
    _collection: Subscription,
    _property: Subscription,
}

impl<T: Clone + 'static> EventLog<T> {
    /// Start recording `list`.
    #[must_use]
    pub fn new(list: &RangeList<T>) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&events);
        let collection = list.subscribe(move |change: &CollectionChange<T>| {
            sink.borrow_mut().push(ListEvent::Collection(change.clone()));
        });
        let sink = Rc::clone(&events);
        let property = list.subscribe_property(move |change| {
            sink.borrow_mut().push(ListEvent::Property(change));
        });

        Self {
            events,
            _collection: collection,
            _property: property,
        }
    }

    /// Copy of all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<ListEvent<T>> {
        self.events.borrow().clone()
    }

    /// Only the collection changes, in order.
    #[must_use]
    pub fn collection_changes(&self) -> Vec<CollectionChange<T>> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                ListEvent::Collection(change) => Some(change.clone()),
                ListEvent::Property(_) => None,
            })
            .collect()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<ListEvent<T>> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for EventLog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("events", &self.events.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::PropertyChange;

    #[test]
    fn records_interleaved_events() {
        let list = RangeList::new();
        let log = EventLog::new(&list);
        list.push('x').unwrap();

        assert_eq!(log.len(), 3);
        assert_eq!(
            log.events()[2],
            ListEvent::Collection(CollectionChange::Add {
                items: vec!['x'],
                index: 0
            })
        );
        assert_eq!(log.events()[0], ListEvent::Property(PropertyChange::Count));
    }

    #[test]
    fn take_drains() {
        let list = RangeList::new();
        let log = EventLog::new(&list);
        list.push(1).unwrap();
        assert_eq!(log.take().len(), 3);
        assert!(log.is_empty());
    }

    #[test]
    fn dropping_log_unsubscribes() {
        let list = RangeList::<u8>::new();
        let log = EventLog::new(&list);
        assert_eq!(list.subscriber_count(), 1);
        drop(log);
        assert_eq!(list.subscriber_count(), 0);
    }
}
