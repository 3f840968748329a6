#![forbid(unsafe_code)]

//! Change records emitted by a [`RangeList`](crate::RangeList).
//!
//! A [`CollectionChange`] describes one contiguous edit. Records are emitted
//! in the order the edits happened and every index refers to the list state
//! at the moment the record was produced, so replaying records in order onto
//! a copy of the list reproduces its contents (see
//! [`CollectionChange::apply_to`]).
//!
//! [`PropertyChange`] reports the derived properties that changed alongside
//! an edit: the element count and the by-index view.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of a [`CollectionChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChangeAction {
    Add,
    Remove,
    Replace,
    Move,
    Reset,
}

/// A single contiguous edit to a list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CollectionChange<T> {
    /// `items` now occupy `index..index + items.len()`.
    Add { items: Vec<T>, index: usize },
    /// `items` previously occupied `index..index + items.len()`.
    Remove { items: Vec<T>, index: usize },
    /// The window starting at `index` changed from `old_items` to
    /// `new_items`. Both vectors have the same length.
    Replace {
        new_items: Vec<T>,
        old_items: Vec<T>,
        index: usize,
    },
    /// `items` moved from `old_index` to `new_index`.
    Move {
        items: Vec<T>,
        old_index: usize,
        new_index: usize,
    },
    /// The contents changed too much to describe; observers must re-read
    /// the whole list.
    Reset,
}

/// A derived property of the list that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PropertyChange {
    /// The number of elements changed.
    Count,
    /// At least one element-at-index value changed.
    Indexer,
}

/// Either kind of notification, in the order it was dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ListEvent<T> {
    Collection(CollectionChange<T>),
    Property(PropertyChange),
}

/// Result of replaying a [`CollectionChange`] onto a mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The mirror was updated.
    Applied,
    /// The record was a [`CollectionChange::Reset`]; the mirror must be
    /// re-read from the source list.
    NeedsReset,
    /// The record does not fit the mirror. The mirror is untouched.
    Mismatch,
}

impl<T> CollectionChange<T> {
    /// The kind of this change.
    #[must_use]
    pub fn action(&self) -> ChangeAction {
        match self {
            Self::Add { .. } => ChangeAction::Add,
            Self::Remove { .. } => ChangeAction::Remove,
            Self::Replace { .. } => ChangeAction::Replace,
            Self::Move { .. } => ChangeAction::Move,
            Self::Reset => ChangeAction::Reset,
        }
    }

    /// Number of elements the record carries (zero for `Reset`).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Add { items, .. } | Self::Remove { items, .. } | Self::Move { items, .. } => {
                items.len()
            }
            Self::Replace { new_items, .. } => new_items.len(),
            Self::Reset => 0,
        }
    }

    /// Whether the record carries no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starting index of the record, if it has one.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Add { index, .. } | Self::Remove { index, .. } | Self::Replace { index, .. } => {
                Some(*index)
            }
            Self::Move { new_index, .. } => Some(*new_index),
            Self::Reset => None,
        }
    }
}

impl<T: Clone> CollectionChange<T> {
    /// Replay this record onto `mirror`.
    ///
    /// Only positions are checked; the removed or replaced values are
    /// trusted to match.
    pub fn apply_to(&self, mirror: &mut Vec<T>) -> ApplyOutcome {
        let len = mirror.len();
        match self {
            Self::Add { items, index } => {
                if *index > len {
                    return ApplyOutcome::Mismatch;
                }
                mirror.splice(*index..*index, items.iter().cloned());
            }
            Self::Remove { items, index } => {
                let Some(end) = index.checked_add(items.len()).filter(|end| *end <= len) else {
                    return ApplyOutcome::Mismatch;
                };
                mirror.drain(*index..end);
            }
            Self::Replace {
                new_items,
                old_items,
                index,
            } => {
                if new_items.len() != old_items.len() {
                    return ApplyOutcome::Mismatch;
                }
                let Some(end) = index
                    .checked_add(new_items.len())
                    .filter(|end| *end <= len)
                else {
                    return ApplyOutcome::Mismatch;
                };
                mirror[*index..end].clone_from_slice(new_items);
            }
            Self::Move {
                items,
                old_index,
                new_index,
            } => {
                let n = items.len();
                let fits = |i: &usize| i.checked_add(n).is_some_and(|end| end <= len);
                if !fits(old_index) || !fits(new_index) {
                    return ApplyOutcome::Mismatch;
                }
                let moved: Vec<T> = mirror.drain(*old_index..*old_index + n).collect();
                mirror.splice(*new_index..*new_index, moved);
            }
            Self::Reset => return ApplyOutcome::NeedsReset,
        }
        ApplyOutcome::Applied
    }
}
