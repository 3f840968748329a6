#![forbid(unsafe_code)]

//! Observable list with batched range notifications.
//!
//! [`RangeList<T>`] is a shared, single-threaded list that reports its
//! mutations to subscribers. Bulk operations (add many, remove many,
//! replace many) report one record per contiguous edit instead of one per
//! element:
//!
//! - [`CollectionChange`]: `Add`, `Remove`, `Replace`, `Move` or `Reset`,
//!   carrying the affected elements and their starting index.
//! - [`PropertyChange`]: `Count` / `Indexer`, for consumers that only care
//!   that the length or the by-index view changed.
//! - [`DeferGuard`]: RAII scope that queues notifications and flushes them
//!   once the outermost scope ends.
//! - [`EventLog`]: ordered recording of both channels.
//! - [`binding`]: scopes that own a consumer's subscriptions.
//!
//! # Architecture
//!
//! `RangeList<T>` is an `Rc` handle over `RefCell` state, like a reactive
//! `Observable`. Subscribers are held weakly and pruned during
//! notification; the [`Subscription`] guard owns the callback. Events pass
//! through one FIFO queue per list. No borrow of the contents is held while
//! callbacks run, so handlers can read the list and, with a single
//! collection handler, mutate it; such edits are dispatched after the
//! records already pending.
//!
//! # Invariants
//!
//! 1. Replaying every [`CollectionChange`] in dispatch order onto a copy of
//!    the list (re-reading it on `Reset`) reproduces the list's contents.
//! 2. An operation that changes nothing emits nothing and leaves
//!    [`RangeList::version`] untouched.
//! 3. With duplicates disallowed, no two elements compare equal.
//! 4. A failed operation changes nothing and emits nothing.
//!
//! # Feature flags
//!
//! - `tracing`: spans around range operations and events for dispatch,
//!   deferral flushes and rejected reentrant mutations.
//! - `serde`: `Serialize`/`Deserialize` for change records and events.

pub mod binding;
pub mod change;
pub mod config;
pub mod defer;
pub mod error;
pub mod list;
mod range;
pub mod recorder;
mod subscribers;

pub use change::{ApplyOutcome, ChangeAction, CollectionChange, ListEvent, PropertyChange};
pub use config::{Comparer, NotifyMode, RangeListConfig};
pub use defer::DeferGuard;
pub use error::{ListError, Result};
pub use list::RangeList;
pub use recorder::EventLog;
pub use subscribers::Subscription;
