//! Ordered listener lists with stable removal.
//!
//! A [`ListenerList`] holds the listeners registered for one event category on
//! one node. Listeners are invoked in registration order. Each registration
//! gets a [`ListenerId`] so that it can be removed later, and a listener can
//! also be removed by identity (the same `Arc` that was registered).
//!
//! Removal of an absent listener is a silent no-op: registration APIs are
//! meant to be forgiving.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use bough_core::ListenerList;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> &'static str;
//! }
//!
//! struct Hello;
//! impl Greeter for Hello {
//!     fn greet(&self) -> &'static str { "hello" }
//! }
//!
//! let mut list: ListenerList<dyn Greeter> = ListenerList::new();
//! let id = list.add(Arc::new(Hello));
//! assert_eq!(list.len(), 1);
//! assert!(list.remove(id));
//! assert!(!list.remove(id));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one listener registration.
///
/// Ids are unique for the lifetime of the process, so an id that has been
/// removed never matches a later registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocate a fresh id, for registries that do not use a [`ListenerList`].
    pub fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value of the id.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// An ordered collection of listeners of one kind.
pub struct ListenerList<L: ?Sized> {
    entries: Vec<(ListenerId, Arc<L>)>,
}

impl<L: ?Sized> Default for ListenerList<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> Clone for ListenerList<L> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<L: ?Sized> fmt::Debug for ListenerList<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(id, _)| id))
            .finish()
    }
}

impl<L: ?Sized> ListenerList<L> {
    /// Create an empty list.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a listener and return its registration id.
    pub fn add(&mut self, listener: Arc<L>) -> ListenerId {
        let id = ListenerId::next();
        self.entries.push((id, listener));
        id
    }

    /// Remove the registration with the given id.
    ///
    /// Returns `true` if a listener was removed.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        before != self.entries.len()
    }

    /// Remove the most recent registration of `listener` (by pointer identity).
    ///
    /// Earlier registrations of the same listener stay in place.
    pub fn remove_instance(&mut self, listener: &Arc<L>) -> bool {
        match self
            .entries
            .iter()
            .rposition(|(_, entry)| Arc::ptr_eq(entry, listener))
        {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether a registration with this id is present.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }

    /// Number of registrations.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no registrations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every registration.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Copy out the listeners in registration order.
    ///
    /// Dispatch iterates over a snapshot so listeners may add or remove
    /// registrations while being notified.
    pub fn snapshot(&self) -> Vec<Arc<L>> {
        self.entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    /// Iterate over `(id, listener)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ListenerId, &Arc<L>)> {
        self.entries.iter().map(|(id, listener)| (*id, listener))
    }
}
