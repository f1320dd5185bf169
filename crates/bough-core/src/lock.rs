//! The tree lock.
//!
//! All structural mutation, layout and dispatch on a component tree happens
//! under one lock shared by the whole tree, never one lock per node. Cross-node
//! operations (coordinate translation through ancestors, listener counter
//! propagation to the root) need a consistent view of the entire tree.
//!
//! The lock is reentrant: a thread that already holds it may acquire it again.
//! Mutable access is still exclusive, so nested callbacks are expected to work
//! through the `&mut` reference they were handed. Asking for a second mutable
//! borrow on the same thread returns [`LockError::Reentered`] instead of
//! deadlocking or panicking.

use std::cell::RefCell;

use parking_lot::ReentrantMutex;

use crate::error::LockError;
use crate::logging::targets;

/// A reentrant lock guarding a whole tree of type `T`.
pub struct TreeLock<T> {
    inner: ReentrantMutex<RefCell<T>>,
}

impl<T> TreeLock<T> {
    /// Wrap a value in a new lock.
    pub fn new(value: T) -> Self {
        Self {
            inner: ReentrantMutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` with exclusive access to the tree.
    ///
    /// Blocks until no other thread holds the lock.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, LockError> {
        let guard = self.inner.lock();
        let mut value = guard.try_borrow_mut().map_err(|_| {
            tracing::debug!(target: targets::TREE, "reentrant mutable tree access refused");
            LockError::Reentered
        })?;
        Ok(f(&mut value))
    }

    /// Run `f` with shared access to the tree.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, LockError> {
        let guard = self.inner.lock();
        let value = guard.try_borrow().map_err(|_| LockError::Reentered)?;
        Ok(f(&value))
    }

    /// Whether another thread currently holds the lock.
    pub fn is_held_elsewhere(&self) -> bool {
        self.inner.try_lock().is_none()
    }

    /// Consume the lock and return the tree.
    pub fn into_inner(self) -> T {
        self.inner.into_inner().into_inner()
    }
}

impl<T: Default> Default for TreeLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

static_assertions::assert_impl_all!(TreeLock<Vec<u8>>: Send, Sync);
