//! Widgets built on [`Behavior`](crate::Behavior).
//!
//! A widget is a behaviour object attached to an ordinary node. It enables
//! the event categories it needs, reacts to them in
//! [`Behavior::process_event`](crate::Behavior::process_event) and paints
//! itself through the node's graphics context.

mod button;

pub use button::{ActionEvent, ActionListener, Button};
