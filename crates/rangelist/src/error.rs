#![forbid(unsafe_code)]

//! Error type for list operations.

/// Failure of a [`RangeList`](crate::RangeList) operation.
///
/// A failed operation never mutates the list and never emits events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    /// A single index was outside `0..len` (or `0..=len` for insertion).
    #[error("index {index} is out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    /// The window `index..index + count` does not fit in the list.
    #[error("range {index}..{index}+{count} is out of bounds for list of length {len}")]
    RangeOutOfBounds {
        index: usize,
        count: usize,
        len: usize,
    },
    /// The list was mutated from inside a change handler while more than one
    /// collection-change handler was subscribed.
    #[error("cannot change the list during a change notification with multiple handlers")]
    Reentrancy,
}

/// Result alias used throughout the crate.
pub type Result<T, E = ListError> = std::result::Result<T, E>;

pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(ListError::IndexOutOfRange { index, len })
    }
}

pub(crate) fn check_insert_index(index: usize, len: usize) -> Result<()> {
    if index <= len {
        Ok(())
    } else {
        Err(ListError::IndexOutOfRange { index, len })
    }
}

pub(crate) fn check_range(index: usize, count: usize, len: usize) -> Result<()> {
    match index.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(ListError::RangeOutOfBounds { index, count, len }),
    }
}
