//! Platform peer and toolkit interfaces.
//!
//! A materialized node holds a [`Peer`]. Native-backed nodes hold a real
//! [`PlatformPeer`]; lightweight nodes hold the marker and draw through the
//! nearest native ancestor. Every peer method has a no-op default so that
//! bindings implement only what their window system supports.

use std::fmt;
use std::sync::Arc;

use bough_core::{Rect, Size};

use crate::appearance::{Color, CursorShape, Font};
use crate::event::Event;
use crate::tree::{NodeId, NodeKind};

/// Handle to an off-screen image owned by a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u64);

bitflags::bitflags! {
    /// Loading state of an image, as reported by [`PlatformPeer::check_image`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ImageStatus: u8 {
        /// Width is known.
        const WIDTH    = 1 << 0;
        /// Height is known.
        const HEIGHT   = 1 << 1;
        /// All pixels are available.
        const ALL_BITS = 1 << 2;
        /// Loading failed.
        const ERROR    = 1 << 3;
        /// Loading was aborted.
        const ABORT    = 1 << 4;
    }
}

/// A drawing surface handed to paint hooks.
///
/// Rasterization is not part of this crate; implementations come from the
/// platform layer.
pub trait Graphics: Send {
    /// Restrict drawing to `rect`.
    fn set_clip(&mut self, rect: Rect);
    /// The current clip, if any.
    fn clip(&self) -> Option<Rect>;
    /// Shift the origin.
    fn translate(&mut self, dx: i32, dy: i32);
    /// Set the drawing color.
    fn set_color(&mut self, color: Color);
    /// Set the text font.
    fn set_font(&mut self, font: &Font);
    /// Fill a rectangle with the current color.
    fn fill_rect(&mut self, rect: Rect);
    /// Outline a rectangle with the current color.
    fn draw_rect(&mut self, rect: Rect);
    /// Draw text with its baseline starting at `(x, y)`.
    fn draw_string(&mut self, text: &str, x: i32, y: i32);
}

/// The native window-system binding of a node.
pub trait PlatformPeer: Send + Sync {
    /// Release native resources.
    fn dispose(&self) {}
    /// Move and resize. Coordinates are relative to the native parent.
    fn set_bounds(&self, _bounds: Rect) {}
    /// Make visible.
    fn show(&self) {}
    /// Make invisible.
    fn hide(&self) {}
    /// Accept input.
    fn enable(&self) {}
    /// Refuse input.
    fn disable(&self) {}
    /// Apply an effective foreground color.
    fn set_foreground(&self, _color: Option<Color>) {}
    /// Apply an effective background color.
    fn set_background(&self, _color: Option<Color>) {}
    /// Apply an effective font.
    fn set_font(&self, _font: Option<&Font>) {}
    /// Apply a cursor shape.
    fn set_cursor(&self, _cursor: CursorShape) {}
    /// Native painting with the given graphics.
    fn paint(&self, _graphics: &mut dyn Graphics) {}
    /// A graphics context for the native surface.
    fn graphics(&self) -> Option<Box<dyn Graphics>> {
        None
    }
    /// Schedule a repaint of `rect` after `delay_ms`.
    fn repaint(&self, _delay_ms: u64, _rect: Rect) {}
    /// Native preferred size.
    fn preferred_size(&self) -> Option<Size> {
        None
    }
    /// Native minimum size.
    fn minimum_size(&self) -> Option<Size> {
        None
    }
    /// Ask the window system for keyboard focus. Returns `false` if refused.
    fn request_focus(&self) -> bool {
        true
    }
    /// Create an off-screen image.
    fn create_image(&self, _size: Size) -> Option<ImageId> {
        None
    }
    /// Start preparing an image at the given size. Returns `true` once ready.
    fn prepare_image(&self, _image: ImageId, _size: Size) -> bool {
        false
    }
    /// Report how far image preparation has progressed.
    fn check_image(&self, _image: ImageId, _size: Size) -> ImageStatus {
        ImageStatus::empty()
    }
    /// Default platform handling at the end of the dispatch pipeline.
    fn handle_event(&self, _event: &Event) {}
    /// Merge two pending paint rectangles. `None` declines the merge.
    fn coalesce_paint(&self, existing: Rect, incoming: Rect) -> Option<Rect> {
        Some(existing.union(&incoming))
    }
}

/// The peer state of a node.
#[derive(Clone, Default)]
pub enum Peer {
    /// Not materialized.
    #[default]
    None,
    /// Materialized without a native window; draws through an ancestor.
    Lightweight,
    /// Materialized with a real native window.
    Native(Arc<dyn PlatformPeer>),
}

impl Peer {
    /// Whether the node is materialized.
    #[inline]
    pub fn is_some(&self) -> bool {
        !matches!(self, Peer::None)
    }

    /// Whether this is the lightweight marker.
    #[inline]
    pub fn is_lightweight(&self) -> bool {
        matches!(self, Peer::Lightweight)
    }

    /// The native peer, if any.
    #[inline]
    pub fn native(&self) -> Option<&Arc<dyn PlatformPeer>> {
        match self {
            Peer::Native(peer) => Some(peer),
            _ => None,
        }
    }
}

impl fmt::Debug for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Peer::None => f.write_str("None"),
            Peer::Lightweight => f.write_str("Lightweight"),
            Peer::Native(_) => f.write_str("Native"),
        }
    }
}

/// Everything a toolkit needs to create a peer for a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRequest {
    /// The node being materialized.
    pub node: NodeId,
    /// Its kind.
    pub kind: NodeKind,
    /// Whether the node wants a real native window.
    pub native: bool,
    /// Bounds relative to the native parent.
    pub bounds: Rect,
    /// Initial visibility.
    pub visible: bool,
    /// Initial enablement.
    pub enabled: bool,
}

/// The toolkit: peer factory and asynchronous event sink.
pub trait Toolkit: Send + Sync {
    /// Create the peer for a node being materialized.
    fn create_peer(&self, request: &PeerRequest) -> Peer;

    /// Queue an event for later delivery.
    fn post_event(&self, event: Event);

    /// Drain queued events, oldest first.
    fn take_posted_events(&self) -> Vec<Event> {
        Vec::new()
    }

    /// Drop queued events whose source is `node`.
    fn remove_source_events(&self, _node: NodeId) {}
}
