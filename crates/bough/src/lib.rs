//! bough - the component tree of a desktop GUI toolkit.
//!
//! A [`Tree`] holds visual nodes: plain components, containers and windows.
//! Nodes are either backed by a native window (through a [`PlatformPeer`]
//! created by the [`Toolkit`]) or lightweight, drawing into and receiving
//! input through their nearest native ancestor. The crate provides:
//!
//! - tree structure with cycle checks and hierarchy listener counters that
//!   let hierarchy notifications skip uninterested subtrees
//! - a staged event pipeline with global observers, input-method routing,
//!   key shortcut processing, typed listeners and a legacy event hook
//! - redirection of native input to lightweight descendants: mouse
//!   targeting with drag grabs, synthesized enter and exit events, and
//!   lightweight focus
//! - layout, validation and size caching, with a [`FlowLayout`]
//! - a [`HeadlessToolkit`] for running without a window system
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use bough::{HeadlessToolkit, Rect, Tree};
//! use bough::widgets::Button;
//!
//! let mut tree = Tree::new(Arc::new(HeadlessToolkit::new()));
//! let window = tree.create_window();
//! let (ok, button) = Button::create(&mut tree, "OK");
//! button.add_action_listener(Arc::new(|_: &mut Tree, event: &bough::widgets::ActionEvent| {
//!     println!("{} pressed", event.command);
//! }));
//!
//! tree.set_bounds(window, Rect::new(0, 0, 200, 100)).unwrap();
//! tree.add(window, ok, None, None).unwrap();
//! tree.set_visible(window, true).unwrap();
//! assert!(tree.is_showing(ok).unwrap());
//! ```

pub mod appearance;
pub mod behavior;
pub mod config;
pub mod debug;
pub mod error;
pub mod event;
pub mod headless;
pub mod layout;
pub mod listener;
pub mod peer;
mod redirector;
mod tree;
pub mod widgets;

pub use bough_core::{ListenerId, LockError, Point, Rect, Size};

pub use appearance::{Color, CursorShape, Font, FontStyle, Locale};
pub use behavior::{
    Behavior, ClosingDecision, ClosingPolicy, ClosingStage, InputContext, KeyEventProcessor,
};
pub use config::TreeConfig;
pub use error::{TreeError, TreeResult};
pub use event::{Event, EventKind, EventMask, Modifiers};
pub use headless::{HeadlessPeer, HeadlessToolkit};
pub use layout::{ConstrainedLayoutStrategy, Constraints, FlowLayout, LayoutStrategy};
pub use listener::{Listener, ListenerCategory};
pub use peer::{Graphics, Peer, PlatformPeer, Toolkit};
pub use tree::{NodeId, NodeKind, NodeOptions, SharedTree, Tree};
