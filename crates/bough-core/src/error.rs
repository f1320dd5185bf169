//! Error types for bough-core.

use thiserror::Error;

/// Errors reported by [`TreeLock`](crate::TreeLock).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockError {
    /// The tree is already borrowed by an outer call on this thread.
    #[error("tree lock re-entered while the tree is already borrowed on this thread")]
    Reentered,
}
