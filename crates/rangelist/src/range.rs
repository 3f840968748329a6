#![forbid(unsafe_code)]

//! Batched range operations on [`RangeList`].
//!
//! Each operation mutates the list in one step and then reports the edit
//! with as few [`CollectionChange`] records as describe it exactly:
//!
//! | operation | records |
//! |-----------|---------|
//! | `insert_range` | one `Add` |
//! | `remove_range_at` | one `Remove` (`Reset` if the list emptied) |
//! | `remove_range` (by value) | one `Remove` per contiguous cluster, in removal order |
//! | `remove_all_in` | one `Remove` per run of adjacent matches |
//! | `replace_range_at` | one `Replace` per run of differing positions, then one `Add` or `Remove` for the length difference |
//!
//! Records of one operation are queued behind a deferral scope so that no
//! handler runs until the whole edit has been applied, and every record's
//! index is relative to the list as it stood when that record was produced.

use crate::change::{CollectionChange, ListEvent, PropertyChange};
use crate::config::NotifyMode;
use crate::error::{Result, check_insert_index, check_range};
use crate::list::RangeList;

impl<T: Clone + 'static> RangeList<T> {
    /// Append `items`; see [`insert_range`](Self::insert_range).
    ///
    /// # Errors
    ///
    /// [`ListError::Reentrancy`](crate::ListError::Reentrancy).
    pub fn add_range(&self, items: impl IntoIterator<Item = T>) -> Result<usize> {
        let len = self.len();
        self.insert_range(len, items)
    }

    /// Insert `items` at `index` and emit a single `Add` (or `Reset` when the
    /// list's add mode is [`NotifyMode::Reset`]).
    ///
    /// With duplicates disallowed, repeated input items and items already in
    /// the list are skipped. Returns the number of items inserted; nothing is
    /// emitted when that is zero.
    ///
    /// # Errors
    ///
    /// [`ListError::IndexOutOfRange`](crate::ListError::IndexOutOfRange) if
    /// `index > len`, or [`ListError::Reentrancy`](crate::ListError::Reentrancy).
    pub fn insert_range(&self, index: usize, items: impl IntoIterator<Item = T>) -> Result<usize> {
        let mut items: Vec<T> = items.into_iter().collect();
        {
            let state = self.inner.state.borrow();
            check_insert_index(index, state.items.len())?;
            if !state.allow_duplicates {
                let comparer = &self.inner.comparer;
                items = comparer.distinct(items);
                items.retain(|item| !comparer.contains(&state.items, item));
            }
        }
        if items.is_empty() {
            return Ok(0);
        }
        self.check_reentrancy()?;

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("insert_range", index, count = items.len()).entered();

        let inserted = items.len();
        {
            let mut state = self.inner.state.borrow_mut();
            state.items.splice(index..index, items.iter().cloned());
            state.version += 1;
        }
        self.essential_properties_changed();
        match self.inner.add_mode {
            NotifyMode::Granular => self.emit_change(CollectionChange::Add { items, index }),
            NotifyMode::Reset => self.emit_change(CollectionChange::Reset),
        }
        Ok(inserted)
    }

    /// Remove the first element equal to each of `items`, in input order.
    ///
    /// Consecutive removals at the same index form one cluster (the removed
    /// elements were adjacent) and are reported as one `Remove`. If the list
    /// ends up empty, or the remove mode is [`NotifyMode::Reset`], a single
    /// `Reset` is emitted instead. Items not found are ignored. Returns the
    /// number of elements removed.
    ///
    /// # Errors
    ///
    /// [`ListError::Reentrancy`](crate::ListError::Reentrancy).
    pub fn remove_range(&self, items: &[T]) -> Result<usize> {
        if items.is_empty() || self.is_empty() {
            return Ok(0);
        }
        if let [item] = items {
            return self.remove(item).map(usize::from);
        }
        self.check_reentrancy()?;

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("remove_range", requested = items.len()).entered();

        let mut clusters: Vec<(usize, Vec<T>)> = Vec::new();
        for item in items {
            let found = {
                let state = self.inner.state.borrow();
                self.inner.comparer.position(&state.items, item)
            };
            let Some(index) = found else {
                continue;
            };
            let removed = self.inner.state.borrow_mut().items.remove(index);
            match clusters.last_mut() {
                Some((at, cluster)) if *at == index => cluster.push(removed),
                _ => clusters.push((index, vec![removed])),
            }
        }
        if clusters.is_empty() {
            return Ok(0);
        }
        let now_empty = {
            let mut state = self.inner.state.borrow_mut();
            state.version += 1;
            state.items.is_empty()
        };
        let removed = clusters.iter().map(|(_, cluster)| cluster.len()).sum();

        let _defer = self.defer_events();
        self.essential_properties_changed();
        if now_empty || self.inner.remove_mode == NotifyMode::Reset {
            self.emit_change(CollectionChange::Reset);
        } else {
            for (index, items) in clusters {
                self.emit_change(CollectionChange::Remove { items, index });
            }
        }
        Ok(removed)
    }

    /// Remove `count` elements starting at `index` and return them.
    ///
    /// # Errors
    ///
    /// [`ListError::RangeOutOfBounds`](crate::ListError::RangeOutOfBounds)
    /// or [`ListError::Reentrancy`](crate::ListError::Reentrancy).
    pub fn remove_range_at(&self, index: usize, count: usize) -> Result<Vec<T>> {
        check_range(index, count, self.len())?;
        match count {
            0 => return Ok(Vec::new()),
            1 => return self.remove_at(index).map(|item| vec![item]),
            _ => {}
        }
        self.check_reentrancy()?;

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("remove_range_at", index, count).entered();

        let (removed, now_empty) = {
            let mut state = self.inner.state.borrow_mut();
            let removed: Vec<T> = state.items.drain(index..index + count).collect();
            state.version += 1;
            (removed, state.items.is_empty())
        };
        self.essential_properties_changed();
        if now_empty {
            self.emit_change(CollectionChange::Reset);
        } else {
            self.emit_change(CollectionChange::Remove {
                items: removed.clone(),
                index,
            });
        }
        Ok(removed)
    }

    /// Remove every element matching `pred`; see
    /// [`remove_all_in`](Self::remove_all_in).
    ///
    /// # Errors
    ///
    /// [`ListError::Reentrancy`](crate::ListError::Reentrancy).
    pub fn remove_all(&self, pred: impl FnMut(&T) -> bool) -> Result<usize> {
        let len = self.len();
        self.remove_all_in(0, len, pred)
    }

    /// Remove the elements of `index..index + count` matching `pred`.
    ///
    /// Each run of adjacent matches is reported as one `Remove`, runs in
    /// ascending order. `Count` and `Indexer` follow the records. `pred` may
    /// read the list but must not mutate it.
    ///
    /// # Errors
    ///
    /// [`ListError::RangeOutOfBounds`](crate::ListError::RangeOutOfBounds)
    /// or [`ListError::Reentrancy`](crate::ListError::Reentrancy).
    pub fn remove_all_in(
        &self,
        index: usize,
        count: usize,
        mut pred: impl FnMut(&T) -> bool,
    ) -> Result<usize> {
        let matches: Vec<bool> = {
            let state = self.inner.state.borrow();
            check_range(index, count, state.items.len())?;
            state.items[index..index + count].iter().map(&mut pred).collect()
        };
        let removed = matches.iter().filter(|m| **m).count();
        if removed == 0 {
            return Ok(0);
        }
        self.check_reentrancy()?;

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("remove_all_in", index, count, removed).entered();

        let mut runs: Vec<CollectionChange<T>> = Vec::new();
        {
            let mut state = self.inner.state.borrow_mut();
            let old = std::mem::take(&mut state.items);
            let mut kept = Vec::with_capacity(old.len() - removed);
            let mut run: Vec<T> = Vec::new();
            for (pos, item) in old.into_iter().enumerate() {
                let matched = pos >= index && pos < index + count && matches[pos - index];
                if matched {
                    run.push(item);
                    continue;
                }
                if !run.is_empty() {
                    runs.push(CollectionChange::Remove {
                        items: std::mem::take(&mut run),
                        index: kept.len(),
                    });
                }
                kept.push(item);
            }
            if !run.is_empty() {
                runs.push(CollectionChange::Remove {
                    items: run,
                    index: kept.len(),
                });
            }
            state.items = kept;
            state.version += 1;
        }

        {
            let _defer = self.defer_events();
            for change in runs {
                self.emit_change(change);
            }
        }
        self.essential_properties_changed();
        Ok(removed)
    }

    /// Replace the whole contents with a single `item`.
    ///
    /// # Errors
    ///
    /// [`ListError::Reentrancy`](crate::ListError::Reentrancy).
    pub fn replace(&self, item: T) -> Result<()> {
        let len = self.len();
        self.replace_range_at(0, len, [item])
    }

    /// Replace the whole contents with `items`.
    ///
    /// # Errors
    ///
    /// [`ListError::Reentrancy`](crate::ListError::Reentrancy).
    pub fn replace_range(&self, items: impl IntoIterator<Item = T>) -> Result<()> {
        let len = self.len();
        self.replace_range_at(0, len, items)
    }

    /// Replace the window `index..index + count` with `items`.
    ///
    /// Positions present in both the window and `items` are compared
    /// pairwise; each run of differing positions yields one `Replace`, equal
    /// positions yield nothing. A longer window then yields one `Remove` for
    /// its tail, longer input one `Add` for its tail, followed by `Count` and
    /// `Indexer`. If only replacements happened a single `Indexer` follows.
    ///
    /// With duplicates disallowed, repeated input items and items equal to an
    /// element outside the window are skipped. Empty input removes the
    /// window; an empty window at the front inserts.
    ///
    /// # Errors
    ///
    /// [`ListError::RangeOutOfBounds`](crate::ListError::RangeOutOfBounds)
    /// or [`ListError::Reentrancy`](crate::ListError::Reentrancy).
    pub fn replace_range_at(
        &self,
        index: usize,
        count: usize,
        items: impl IntoIterator<Item = T>,
    ) -> Result<()> {
        let mut items: Vec<T> = items.into_iter().collect();
        let comparer = &self.inner.comparer;
        let unchanged: Vec<bool> = {
            let state = self.inner.state.borrow();
            check_range(index, count, state.items.len())?;
            if !state.allow_duplicates {
                items = comparer.distinct(items);
                let (before, after) = (&state.items[..index], &state.items[index + count..]);
                items.retain(|item| !before.iter().chain(after).any(|x| comparer.equals(x, item)));
            }
            state.items[index..index + count]
                .iter()
                .zip(&items)
                .map(|(old, new)| comparer.equals(old, new))
                .collect()
        };
        if items.is_empty() {
            return self.remove_range_at(index, count).map(drop);
        }
        if index + count == 0 {
            return self.insert_range(0, items).map(drop);
        }
        self.check_reentrancy()?;

        #[cfg(feature = "tracing")]
        let _span =
            tracing::debug_span!("replace_range_at", index, count, added = items.len()).entered();

        let added = items.len();
        let parallel = count.min(added);
        let mut changes: Vec<CollectionChange<T>> = Vec::new();
        let mut replaced = false;
        {
            let mut state = self.inner.state.borrow_mut();
            let mut incoming = items.into_iter();
            let mut new_run: Vec<T> = Vec::new();
            let mut old_run: Vec<T> = Vec::new();

            for (offset, new) in incoming.by_ref().take(parallel).enumerate() {
                let i = index + offset;
                if unchanged[offset] {
                    flush_replaced(&mut changes, i, &mut new_run, &mut old_run);
                    continue;
                }
                let old = std::mem::replace(&mut state.items[i], new.clone());
                new_run.push(new);
                old_run.push(old);
                replaced = true;
            }
            flush_replaced(&mut changes, index + parallel, &mut new_run, &mut old_run);

            let tail = index + parallel;
            if count > added {
                let removed: Vec<T> = state.items.drain(tail..index + count).collect();
                changes.push(CollectionChange::Remove {
                    items: removed,
                    index: tail,
                });
            } else if added > count {
                let rest: Vec<T> = incoming.collect();
                state.items.splice(tail..tail, rest.iter().cloned());
                changes.push(CollectionChange::Add {
                    items: rest,
                    index: tail,
                });
            }
            if replaced || count != added {
                state.version += 1;
            }
        }

        let _defer = self.defer_events();
        for change in changes {
            self.emit_change(change);
        }
        if count != added {
            self.essential_properties_changed();
        } else if replaced {
            self.emit(ListEvent::Property(PropertyChange::Indexer));
        }
        Ok(())
    }
}

/// Push a `Replace` for the run ending just before `following`, if any.
fn flush_replaced<T>(
    changes: &mut Vec<CollectionChange<T>>,
    following: usize,
    new_run: &mut Vec<T>,
    old_run: &mut Vec<T>,
) {
    if old_run.is_empty() {
        debug_assert!(new_run.is_empty());
        return;
    }
    changes.push(CollectionChange::Replace {
        index: following - old_run.len(),
        new_items: std::mem::take(new_run),
        old_items: std::mem::take(old_run),
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::change::{CollectionChange, ListEvent, PropertyChange};
    use crate::config::{Comparer, NotifyMode, RangeListConfig};
    use crate::error::ListError;
    use crate::list::RangeList;
    use crate::recorder::EventLog;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn no_dupes() -> RangeListConfig<i32> {
        RangeListConfig::new().with_allow_duplicates(false)
    }

    fn replace(new: Vec<i32>, old: Vec<i32>, index: usize) -> CollectionChange<i32> {
        CollectionChange::Replace {
            new_items: new,
            old_items: old,
            index,
        }
    }

    const COUNT: ListEvent<i32> = ListEvent::Property(PropertyChange::Count);
    const INDEXER: ListEvent<i32> = ListEvent::Property(PropertyChange::Indexer);

    // ---- insert / add ----

    #[test]
    fn add_range_fires_one_event() {
        let list = RangeList::from_vec(vec![1]);
        let log = EventLog::new(&list);

        assert_eq!(list.add_range([2, 3, 4]).unwrap(), 3);
        assert_eq!(
            log.take(),
            vec![
                COUNT,
                INDEXER,
                ListEvent::Collection(CollectionChange::Add {
                    items: vec![2, 3, 4],
                    index: 1
                })
            ]
        );
        assert_eq!(list.version(), 1);
    }

    #[test]
    fn insert_range_in_the_middle() {
        let list = RangeList::from_vec(vec![1, 5]);
        list.insert_range(1, [2, 3, 4]).unwrap();
        assert_eq!(list.to_vec(), vec![1, 2, 3, 4, 5]);
        assert!(matches!(
            list.insert_range(7, [0]),
            Err(ListError::IndexOutOfRange { index: 7, len: 5 })
        ));
    }

    #[test]
    fn insert_range_empty_is_silent() {
        let list = RangeList::from_vec(vec![1]);
        let log = EventLog::new(&list);
        assert_eq!(list.add_range(Vec::new()).unwrap(), 0);
        assert!(log.is_empty());
        assert_eq!(list.version(), 0);
    }

    #[test]
    fn insert_range_filters_duplicates() {
        let list = RangeList::from_vec_with_config(vec![1, 2], no_dupes());
        let log = EventLog::new(&list);

        assert_eq!(list.add_range([2, 3, 3, 4, 1]).unwrap(), 2);
        assert_eq!(list.to_vec(), vec![1, 2, 3, 4]);
        assert_eq!(
            log.collection_changes(),
            vec![CollectionChange::Add {
                items: vec![3, 4],
                index: 2
            }]
        );

        assert_eq!(list.add_range([1, 4]).unwrap(), 0);
        assert_eq!(log.len(), 3, "nothing new after the first add");
    }

    #[test]
    fn add_range_reset_mode() {
        let list = RangeList::with_config(RangeListConfig::new().with_add_mode(NotifyMode::Reset));
        let log = EventLog::new(&list);
        list.add_range([1, 2]).unwrap();
        assert_eq!(log.collection_changes(), vec![CollectionChange::Reset]);
    }

    // ---- remove by value ----

    #[test]
    fn remove_range_clusters_adjacent_items() {
        let list = RangeList::from_vec(vec![0, 1, 2, 3, 4, 5, 6]);
        let log = EventLog::new(&list);

        assert_eq!(list.remove_range(&[2, 3, 5, 9]).unwrap(), 3);
        assert_eq!(list.to_vec(), vec![0, 1, 4, 6]);
        assert_eq!(
            log.take(),
            vec![
                COUNT,
                INDEXER,
                ListEvent::Collection(CollectionChange::Remove {
                    items: vec![2, 3],
                    index: 2
                }),
                ListEvent::Collection(CollectionChange::Remove {
                    items: vec![5],
                    index: 3
                }),
            ]
        );
    }

    #[test]
    fn remove_range_revisiting_an_index_keeps_every_cluster() {
        // 2 is removed at index 2, then 5 at index 4, then 3 lands on index 2
        // again; all three records must survive in removal order.
        let list = RangeList::from_vec(vec![0, 1, 2, 3, 4, 5]);
        let mut mirror = list.to_vec();
        let log = EventLog::new(&list);

        list.remove_range(&[2, 5, 3]).unwrap();
        let changes = log.collection_changes();
        assert_eq!(changes.len(), 3);
        for change in &changes {
            change.apply_to(&mut mirror);
        }
        assert_eq!(mirror, list.to_vec());
        assert_eq!(list.to_vec(), vec![0, 1, 4]);
    }

    #[test]
    fn remove_range_emptying_list_resets() {
        let list = RangeList::from_vec(vec![1, 2, 3]);
        let log = EventLog::new(&list);
        assert_eq!(list.remove_range(&[3, 1, 2]).unwrap(), 3);
        assert_eq!(log.collection_changes(), vec![CollectionChange::Reset]);
    }

    #[test]
    fn remove_range_single_item_uses_plain_remove() {
        let list = RangeList::from_vec(vec![1, 2, 3]);
        let log = EventLog::new(&list);
        assert_eq!(list.remove_range(&[3]).unwrap(), 1);
        assert_eq!(list.remove_range(&[42]).unwrap(), 0);
        assert_eq!(
            log.take(),
            vec![
                COUNT,
                INDEXER,
                ListEvent::Collection(CollectionChange::Remove {
                    items: vec![3],
                    index: 2
                })
            ]
        );
    }

    #[test]
    fn remove_range_nothing_found_is_silent() {
        let list = RangeList::from_vec(vec![1, 2]);
        let log = EventLog::new(&list);
        assert_eq!(list.remove_range(&[7, 8]).unwrap(), 0);
        assert!(log.is_empty());
        assert_eq!(list.version(), 0);
    }

    #[test]
    fn remove_range_reset_mode() {
        let list = RangeList::from_vec_with_config(
            vec![1, 2, 3, 4],
            RangeListConfig::new().with_remove_mode(NotifyMode::Reset),
        );
        let log = EventLog::new(&list);
        list.remove_range(&[1, 3]).unwrap();
        assert_eq!(log.collection_changes(), vec![CollectionChange::Reset]);
        assert_eq!(list.to_vec(), vec![2, 4]);
    }

    // ---- remove by position ----

    #[test]
    fn remove_range_at_contiguous() {
        let list = RangeList::from_vec(vec![1, 2, 3, 4, 5]);
        let log = EventLog::new(&list);

        assert_eq!(list.remove_range_at(1, 3).unwrap(), vec![2, 3, 4]);
        assert_eq!(list.remove_range_at(0, 0).unwrap(), Vec::<i32>::new());
        assert_eq!(
            log.collection_changes(),
            vec![CollectionChange::Remove {
                items: vec![2, 3, 4],
                index: 1
            }]
        );
        assert_eq!(
            list.remove_range_at(1, 2),
            Err(ListError::RangeOutOfBounds {
                index: 1,
                count: 2,
                len: 2
            })
        );
    }

    #[test]
    fn remove_range_at_everything_resets() {
        let list = RangeList::from_vec(vec![1, 2, 3]);
        let log = EventLog::new(&list);
        list.remove_range_at(0, 3).unwrap();
        assert_eq!(log.collection_changes(), vec![CollectionChange::Reset]);
        assert!(list.is_empty());
    }

    // ---- remove_all ----

    #[test]
    fn remove_all_reports_runs() {
        let list = RangeList::from_vec(vec![1, 2, 4, 6, 7, 8, 9, 10]);
        let log = EventLog::new(&list);

        assert_eq!(list.remove_all(|x| x % 2 == 0).unwrap(), 5);
        assert_eq!(list.to_vec(), vec![1, 7, 9]);
        assert_eq!(
            log.take(),
            vec![
                ListEvent::Collection(CollectionChange::Remove {
                    items: vec![2, 4, 6],
                    index: 1
                }),
                ListEvent::Collection(CollectionChange::Remove {
                    items: vec![8],
                    index: 2
                }),
                ListEvent::Collection(CollectionChange::Remove {
                    items: vec![10],
                    index: 3
                }),
                COUNT,
                INDEXER,
            ]
        );
    }

    #[test]
    fn remove_all_in_window_only() {
        let list = RangeList::from_vec(vec![0, 0, 1, 0, 0]);
        assert_eq!(list.remove_all_in(1, 3, |x| *x == 0).unwrap(), 2);
        assert_eq!(list.to_vec(), vec![0, 1, 0]);
        assert!(list.remove_all_in(2, 5, |_| true).is_err());
        assert_eq!(list.remove_all(|x| *x > 10).unwrap(), 0);
    }

    #[test]
    fn remove_all_predicate_may_read_list() {
        let list = RangeList::from_vec(vec![3, 1, 3]);
        let handle = list.clone();
        let removed = list
            .remove_all(|x| *x == handle.with(|items| items[0]))
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(list.to_vec(), vec![1]);
    }

    // ---- replace ----

    #[test]
    fn replace_range_splits_runs_on_equal_positions() {
        let list = RangeList::from_vec(vec![1, 2, 3, 4, 5]);
        let log = EventLog::new(&list);

        list.replace_range([1, 20, 30, 4, 50]).unwrap();
        assert_eq!(list.to_vec(), vec![1, 20, 30, 4, 50]);
        assert_eq!(
            log.take(),
            vec![
                ListEvent::Collection(replace(vec![20, 30], vec![2, 3], 1)),
                ListEvent::Collection(replace(vec![50], vec![5], 4)),
                INDEXER,
            ]
        );
    }

    #[test]
    fn replace_range_identical_is_silent() {
        let list = RangeList::from_vec(vec![1, 2, 3]);
        let log = EventLog::new(&list);
        list.replace_range([1, 2, 3]).unwrap();
        assert!(log.is_empty());
        assert_eq!(list.version(), 0);
    }

    #[test]
    fn replace_range_shorter_input_removes_tail() {
        let list = RangeList::from_vec(vec![1, 2, 3, 4, 5]);
        let log = EventLog::new(&list);

        list.replace_range_at(1, 3, [9]).unwrap();
        assert_eq!(list.to_vec(), vec![1, 9, 5]);
        assert_eq!(
            log.take(),
            vec![
                ListEvent::Collection(replace(vec![9], vec![2], 1)),
                ListEvent::Collection(CollectionChange::Remove {
                    items: vec![3, 4],
                    index: 2
                }),
                COUNT,
                INDEXER,
            ]
        );
    }

    #[test]
    fn replace_range_longer_input_adds_tail() {
        let list = RangeList::from_vec(vec![1, 2, 3]);
        let log = EventLog::new(&list);

        list.replace_range_at(1, 1, [2, 7, 8]).unwrap();
        assert_eq!(list.to_vec(), vec![1, 2, 7, 8, 3]);
        assert_eq!(
            log.take(),
            vec![
                ListEvent::Collection(CollectionChange::Add {
                    items: vec![7, 8],
                    index: 2
                }),
                COUNT,
                INDEXER,
            ]
        );
    }

    #[test]
    fn replace_range_empty_input_removes_window() {
        let list = RangeList::from_vec(vec![1, 2, 3]);
        list.replace_range_at(0, 2, Vec::new()).unwrap();
        assert_eq!(list.to_vec(), vec![3]);
    }

    #[test]
    fn replace_on_empty_list_inserts() {
        let list = RangeList::new();
        let log = EventLog::new(&list);
        list.replace_range([1, 2]).unwrap();
        assert_eq!(
            log.collection_changes(),
            vec![CollectionChange::Add {
                items: vec![1, 2],
                index: 0
            }]
        );
    }

    #[test]
    fn replace_single_item() {
        let list = RangeList::from_vec(vec![1, 2, 3]);
        list.replace(2).unwrap();
        assert_eq!(list.to_vec(), vec![2]);
    }

    #[test]
    fn replace_range_without_duplicates() {
        let list = RangeList::from_vec_with_config(vec![1, 2, 3, 4], no_dupes());
        // 4 lives outside the window and 5 repeats; both are dropped.
        list.replace_range_at(0, 2, [5, 4, 5, 6]).unwrap();
        assert_eq!(list.to_vec(), vec![5, 6, 3, 4]);
    }

    #[test]
    fn replace_range_out_of_bounds() {
        let list = RangeList::from_vec(vec![1]);
        assert!(list.replace_range_at(1, 1, [2]).is_err());
        assert_eq!(list.to_vec(), vec![1]);
    }

    #[test]
    fn handlers_see_final_state_for_every_record() {
        let list = RangeList::from_vec(vec![1, 2, 3, 4]);
        let handle = list.clone();
        let lens = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let l = std::rc::Rc::clone(&lens);
        let _sub = list.subscribe(move |_| l.borrow_mut().push(handle.len()));

        list.replace_range_at(0, 4, [9, 2, 8]).unwrap();
        assert_eq!(*lens.borrow(), vec![3, 3, 3]);
    }

    #[test]
    fn range_operations_rejected_while_several_handlers_listen() {
        let list = RangeList::from_vec(vec![1, 2, 3, 4]);
        let rejected = Rc::new(RefCell::new(Vec::new()));
        let tried = Rc::new(Cell::new(false));

        let (r, t, handle) = (Rc::clone(&rejected), Rc::clone(&tried), list.clone());
        let _a = list.subscribe(move |_| {
            if t.replace(true) {
                return;
            }
            let before = handle.to_vec();
            let mut r = r.borrow_mut();
            r.push(handle.remove_range(&[1, 2]) == Err(ListError::Reentrancy));
            r.push(handle.replace_range_at(0, 2, [7, 8]) == Err(ListError::Reentrancy));
            r.push(handle.remove_all(|x| *x > 2) == Err(ListError::Reentrancy));
            r.push(handle.add_range([9]) == Err(ListError::Reentrancy));
            r.push(handle.to_vec() == before);
        });
        let _b = list.subscribe(|_| {});

        list.push(5).unwrap();
        assert_eq!(*rejected.borrow(), vec![true; 5]);
        assert_eq!(list.to_vec(), vec![1, 2, 3, 4, 5]);
        assert_eq!(list.version(), 1);
    }

    #[test]
    fn comparer_may_read_the_list() {
        let slot: Rc<RefCell<Option<RangeList<i32>>>> = Rc::default();
        let reads = Rc::new(Cell::new(0));
        let (s, n) = (Rc::clone(&slot), Rc::clone(&reads));
        let comparer = Comparer::new(move |a: &i32, b: &i32| {
            if let Some(list) = s.borrow().as_ref() {
                n.set(n.get() + list.len());
            }
            a == b
        });
        let list = RangeList::from_vec_with_config(
            vec![1, 2, 3, 4],
            RangeListConfig::new().with_comparer(comparer),
        );
        *slot.borrow_mut() = Some(list.clone());

        assert_eq!(list.remove_range(&[2, 3]).unwrap(), 2);
        list.replace_range_at(0, 2, [1, 5]).unwrap();
        assert_eq!(list.to_vec(), vec![1, 5]);
        assert!(reads.get() > 0);

        // The comparer holds a handle to its own list.
        slot.borrow_mut().take();
    }
}
