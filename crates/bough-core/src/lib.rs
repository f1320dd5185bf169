//! Core building blocks for bough.
//!
//! This crate holds the pieces of the component tree that do not depend on
//! the tree itself:
//!
//! - **Geometry**: integer [`Point`], [`Size`] and [`Rect`]
//! - **Listener lists**: [`ListenerList`], an ordered collection of listener
//!   handles with stable removal by id or by identity
//! - **Tree lock**: [`TreeLock`], the single reentrant lock that guards a whole
//!   component tree
//! - **Logging**: tracing targets and span names shared by every subsystem
//!
//! # Example
//!
//! ```
//! use bough_core::{Rect, TreeLock};
//!
//! let lock = TreeLock::new(Rect::new(0, 0, 10, 10));
//! lock.with(|rect| rect.width = 20).unwrap();
//! assert_eq!(lock.read(|rect| rect.width).unwrap(), 20);
//! ```

mod error;
mod geometry;
mod listener;
mod lock;
pub mod logging;

pub use error::LockError;
pub use geometry::{Point, Rect, Size};
pub use listener::{ListenerId, ListenerList};
pub use lock::TreeLock;
pub use logging::PerfSpan;
