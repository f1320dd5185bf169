//! Layout strategies.
//!
//! A container delegates sizing and child placement to an optional
//! [`LayoutStrategy`]. The strategy is told about children as they are added
//! and removed, is asked for sizes when the container's own sizes are not
//! cached, and positions the children during validation.
//!
//! The extended contract ([`ConstrainedLayoutStrategy`]) adds maximum size,
//! alignment and explicit cache invalidation. A strategy opts in by returning
//! itself from [`LayoutStrategy::constrained`].

mod flow;

pub use flow::{FlowAlignment, FlowLayout};

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bough_core::Size;

use crate::error::TreeResult;
use crate::tree::{NodeId, Tree};

/// Placement hints passed along with a child when it is added.
#[derive(Clone)]
pub enum Constraints {
    /// A named slot, e.g. a region or a card name.
    Named(Arc<str>),
    /// Strategy-specific data.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Constraints {
    /// A named slot.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::Named(name.into())
    }

    /// The slot name, for named constraints.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Custom(_) => None,
        }
    }

    /// The custom payload as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Custom(data) => data.downcast_ref::<T>(),
            Self::Named(_) => None,
        }
    }
}

impl fmt::Debug for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Sizes and positions the children of a container.
pub trait LayoutStrategy: Send + Sync {
    /// A child was added with the given constraints.
    fn add_layout_component(&self, _child: NodeId, _constraints: Option<&Constraints>) {}

    /// A child was removed.
    fn remove_layout_component(&self, _child: NodeId) {}

    /// The size the container would like to have.
    fn preferred_size(&self, tree: &Tree, container: NodeId) -> Size;

    /// The smallest size the container can usefully have.
    fn minimum_size(&self, tree: &Tree, container: NodeId) -> Size;

    /// Position the children of the container.
    fn layout_container(&self, tree: &mut Tree, container: NodeId) -> TreeResult<()>;

    /// The extended contract, if supported.
    fn constrained(&self) -> Option<&dyn ConstrainedLayoutStrategy> {
        None
    }
}

/// The extended layout contract.
pub trait ConstrainedLayoutStrategy: LayoutStrategy {
    /// The largest size the container can usefully have.
    fn maximum_size(&self, _tree: &Tree, _container: NodeId) -> Size {
        Size::MAX
    }

    /// Horizontal alignment in `0.0..=1.0`.
    fn alignment_x(&self, _tree: &Tree, _container: NodeId) -> f32 {
        0.5
    }

    /// Vertical alignment in `0.0..=1.0`.
    fn alignment_y(&self, _tree: &Tree, _container: NodeId) -> f32 {
        0.5
    }

    /// Drop any cached layout information for the container.
    fn invalidate_layout(&self, _container: NodeId) {}
}
