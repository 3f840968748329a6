#![forbid(unsafe_code)]

//! Construction options for [`RangeList`](crate::RangeList).
//!
//! ```
//! use rangelist::{Comparer, NotifyMode, RangeList, RangeListConfig};
//!
//! let config = RangeListConfig::new()
//!     .with_allow_duplicates(false)
//!     .with_comparer(Comparer::by_key(|s: &String| s.to_lowercase()))
//!     .with_add_mode(NotifyMode::Reset);
//! let list = RangeList::with_config(config);
//! list.push("Hello".to_string()).unwrap();
//! assert!(!list.push("HELLO".to_string()).unwrap());
//! ```

use std::fmt;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shared equality predicate used for duplicate suppression, value-based
/// removal and replace-range comparisons.
pub struct Comparer<T> {
    eq: Rc<dyn Fn(&T, &T) -> bool>,
}

impl<T> Clone for Comparer<T> {
    fn clone(&self) -> Self {
        Self {
            eq: Rc::clone(&self.eq),
        }
    }
}

impl<T: PartialEq + 'static> Default for Comparer<T> {
    fn default() -> Self {
        Self::new(|a: &T, b: &T| a == b)
    }
}

impl<T> fmt::Debug for Comparer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparer").finish_non_exhaustive()
    }
}

impl<T: 'static> Comparer<T> {
    /// Wrap an arbitrary equality predicate.
    pub fn new(eq: impl Fn(&T, &T) -> bool + 'static) -> Self {
        Self { eq: Rc::new(eq) }
    }

    /// Compare elements by a projected key.
    pub fn by_key<K: PartialEq>(key: impl Fn(&T) -> K + 'static) -> Self {
        Self::new(move |a, b| key(a) == key(b))
    }
}

impl<T> Comparer<T> {
    /// Whether `a` and `b` are considered equal.
    #[inline]
    #[must_use]
    pub fn equals(&self, a: &T, b: &T) -> bool {
        (self.eq)(a, b)
    }

    pub(crate) fn position(&self, items: &[T], item: &T) -> Option<usize> {
        items.iter().position(|x| self.equals(x, item))
    }

    pub(crate) fn contains(&self, items: &[T], item: &T) -> bool {
        self.position(items, item).is_some()
    }

    /// Keep the first occurrence of each element (quadratic, no hashing
    /// requirement on `T`).
    pub(crate) fn distinct(&self, items: Vec<T>) -> Vec<T> {
        let mut out: Vec<T> = Vec::with_capacity(items.len());
        for item in items {
            if !self.contains(&out, &item) {
                out.push(item);
            }
        }
        out
    }
}

/// How a range operation reports its change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NotifyMode {
    /// Emit range records (`Add`/`Remove`) describing the exact edit.
    #[default]
    Granular,
    /// Emit a single `Reset`.
    Reset,
}

/// Options for a [`RangeList`](crate::RangeList).
#[derive(Debug, Clone)]
pub struct RangeListConfig<T> {
    /// Whether equal elements may appear more than once. Default `true`.
    pub allow_duplicates: bool,
    /// Equality used by the list. Defaults to `PartialEq`.
    pub comparer: Comparer<T>,
    /// Notification style of `add_range`/`insert_range`.
    pub add_mode: NotifyMode,
    /// Notification style of value-based `remove_range`.
    pub remove_mode: NotifyMode,
}

impl<T: PartialEq + 'static> Default for RangeListConfig<T> {
    fn default() -> Self {
        Self {
            allow_duplicates: true,
            comparer: Comparer::default(),
            add_mode: NotifyMode::Granular,
            remove_mode: NotifyMode::Granular,
        }
    }
}

impl<T: PartialEq + 'static> RangeListConfig<T> {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> RangeListConfig<T> {
    #[must_use]
    pub fn with_allow_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicates = allow;
        self
    }

    #[must_use]
    pub fn with_comparer(mut self, comparer: Comparer<T>) -> Self {
        self.comparer = comparer;
        self
    }

    #[must_use]
    pub fn with_add_mode(mut self, mode: NotifyMode) -> Self {
        self.add_mode = mode;
        self
    }

    #[must_use]
    pub fn with_remove_mode(mut self, mode: NotifyMode) -> Self {
        self.remove_mode = mode;
        self
    }
}
