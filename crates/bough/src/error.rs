//! Error types for tree operations.

use bough_core::LockError;
use thiserror::Error;

use crate::tree::NodeId;

/// Errors returned by tree mutations and queries.
///
/// Structural checks run before any state is touched, so a returned error
/// always means the tree is exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The node id is unknown or the node has been destroyed.
    #[error("invalid or destroyed node {0:?}")]
    InvalidNode(NodeId),

    /// The operation needs a container but the node cannot hold children.
    #[error("node {0:?} is not a container")]
    NotAContainer(NodeId),

    /// Adding the child would make a node its own ancestor.
    #[error("adding {child:?} to {parent:?} would create a cycle")]
    Cycle {
        /// The container that was asked to take the child.
        parent: NodeId,
        /// The node that is already an ancestor of `parent` (or `parent` itself).
        child: NodeId,
    },

    /// The operation needs a window.
    #[error("node {0:?} is not a window")]
    NotAWindow(NodeId),

    /// The child kind may not live at this position in the tree.
    #[error("{child:?} cannot be added to a container: {reason}")]
    IllegalChild {
        /// The rejected node.
        child: NodeId,
        /// Why the node was rejected.
        reason: &'static str,
    },

    /// A child index outside the valid range.
    #[error("child index {index} out of range for container with {len} children")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of children at the time of the call.
        len: usize,
    },

    /// The node must be showing on screen for this query.
    #[error("node {0:?} must be showing on the screen to determine its location")]
    NotShowing(NodeId),

    /// Neither the node nor any ancestor has a locale.
    #[error("node {0:?} has no locale and no parent to inherit one from")]
    NoLocale(NodeId),

    /// The shared tree was re-borrowed on the thread that already holds it.
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
