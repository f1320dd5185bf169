//! Node records stored in the tree arena.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use bough_core::{Rect, Size};

use crate::appearance::{Color, CursorShape, Font, Locale};
use crate::behavior::{Behavior, ClosingPolicy, KeyEventProcessor};
use crate::event::EventMask;
use crate::layout::LayoutStrategy;
use crate::listener::ListenerRegistry;
use crate::peer::Peer;
use crate::redirector::LightweightRedirector;

use super::NodeId;

/// What a node is able to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// A leaf.
    #[default]
    Component,
    /// A node that holds children.
    Container,
    /// A top-level container. Windows are always native-backed and can never
    /// be added to another container.
    Window,
}

impl NodeKind {
    /// Whether nodes of this kind hold children.
    #[inline]
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Container | NodeKind::Window)
    }
}

/// Options for [`Tree::create_node`](crate::Tree::create_node).
#[derive(Clone, Default)]
pub struct NodeOptions {
    pub(crate) kind: NodeKind,
    pub(crate) native: bool,
    pub(crate) name: Option<String>,
    pub(crate) behavior: Option<Arc<dyn Behavior>>,
    pub(crate) layout: Option<Arc<dyn LayoutStrategy>>,
    pub(crate) bounds: Rect,
}

impl NodeOptions {
    /// Options for a node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            native: kind == NodeKind::Window,
            ..Default::default()
        }
    }

    /// Request a real native window for the node. Windows are always native.
    pub fn native(mut self, native: bool) -> Self {
        self.native = native || self.kind == NodeKind::Window;
        self
    }

    /// Set a diagnostic name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a behaviour.
    pub fn behavior(mut self, behavior: Arc<dyn Behavior>) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Attach a layout strategy. Ignored for leaf nodes.
    pub fn layout(mut self, layout: Arc<dyn LayoutStrategy>) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Initial bounds.
    pub fn bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }
}

impl fmt::Debug for NodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeOptions")
            .field("kind", &self.kind)
            .field("native", &self.native)
            .field("name", &self.name)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

/// State only containers carry.
#[derive(Default)]
pub(crate) struct ContainerData {
    /// Children, front to back.
    pub(crate) children: Vec<NodeId>,
    pub(crate) layout: Option<Arc<dyn LayoutStrategy>>,
    /// Descendants (excluding this node) listening for hierarchy changes.
    pub(crate) listening_children: usize,
    /// Descendants (excluding this node) listening for ancestor bounds.
    pub(crate) listening_bounds_children: usize,
    /// Present while this container is materialized with a native peer.
    pub(crate) redirector: Option<LightweightRedirector>,
    pub(crate) key_processor: Option<Arc<dyn KeyEventProcessor>>,
}

/// State only windows carry.
#[derive(Default)]
pub(crate) struct WindowData {
    pub(crate) focus_owner: Option<NodeId>,
    pub(crate) closing_policy: Option<Arc<dyn ClosingPolicy>>,
    pub(crate) opened: bool,
}

/// Keeps a native node under lightweight ancestors positioned correctly.
///
/// The subscription is owned by the native node and lists the lightweight
/// ancestors it is registered with. Dropping it from every ancestor is done
/// on dematerialization.
#[derive(Debug, Default, Clone)]
pub(crate) struct BridgeSubscription {
    pub(crate) ancestors: Vec<NodeId>,
}

pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) native: bool,
    pub(crate) bounds: Rect,
    pub(crate) visible: bool,
    pub(crate) enabled: bool,
    pub(crate) valid: bool,
    pub(crate) has_focus: bool,

    pub(crate) foreground: Option<Color>,
    pub(crate) background: Option<Color>,
    pub(crate) font: Option<Font>,
    pub(crate) cursor: Option<CursorShape>,
    pub(crate) locale: Option<Locale>,

    pub(crate) event_mask: EventMask,
    pub(crate) new_events_only: bool,
    pub(crate) input_methods_enabled: bool,
    pub(crate) listeners: ListenerRegistry,

    pub(crate) parent: Option<NodeId>,
    pub(crate) peer: Peer,
    pub(crate) peer_font: Option<Font>,
    pub(crate) behavior: Option<Arc<dyn Behavior>>,

    pub(crate) explicit_preferred: Option<Size>,
    pub(crate) explicit_minimum: Option<Size>,
    pub(crate) explicit_maximum: Option<Size>,
    pub(crate) cached_preferred: Cell<Option<Size>>,
    pub(crate) cached_minimum: Cell<Option<Size>>,

    /// Set on native nodes materialized under lightweight parents.
    pub(crate) bridge: Option<BridgeSubscription>,
    /// Set on lightweight nodes: native descendants bridged through this node.
    pub(crate) bridged: Vec<NodeId>,

    pub(crate) container: Option<ContainerData>,
    pub(crate) window: Option<WindowData>,
}

impl Node {
    pub(crate) fn new(options: NodeOptions) -> Self {
        let kind = options.kind;
        let event_mask = options
            .behavior
            .as_ref()
            .map(|behavior| behavior.enabled_events())
            .unwrap_or_default();
        let container = kind.is_container().then(|| ContainerData {
            layout: options.layout,
            ..Default::default()
        });
        Self {
            name: options.name.unwrap_or_default(),
            kind,
            native: options.native || kind == NodeKind::Window,
            bounds: options.bounds,
            visible: kind != NodeKind::Window,
            enabled: true,
            valid: false,
            has_focus: false,
            foreground: None,
            background: None,
            font: None,
            cursor: None,
            locale: None,
            new_events_only: !event_mask.is_empty(),
            event_mask,
            input_methods_enabled: true,
            listeners: ListenerRegistry::default(),
            parent: None,
            peer: Peer::None,
            peer_font: None,
            behavior: options.behavior,
            explicit_preferred: None,
            explicit_minimum: None,
            explicit_maximum: None,
            cached_preferred: Cell::new(None),
            cached_minimum: Cell::new(None),
            bridge: None,
            bridged: Vec::new(),
            container,
            window: (kind == NodeKind::Window).then(WindowData::default),
        }
    }

    /// Materialized without a native window, or unmaterialized and not
    /// asking for one.
    #[inline]
    pub(crate) fn is_lightweight(&self) -> bool {
        match self.peer {
            Peer::Lightweight => true,
            Peer::None => !self.native,
            Peer::Native(_) => false,
        }
    }

    #[inline]
    pub(crate) fn children(&self) -> &[NodeId] {
        self.container
            .as_ref()
            .map(|c| c.children.as_slice())
            .unwrap_or(&[])
    }

    /// Whether the node itself counts as listening for a hierarchy category.
    pub(crate) fn listens_for(&self, mask: EventMask) -> bool {
        self.event_mask.intersects(mask) || self.listeners.mask().intersects(mask)
    }

    /// Whether the node wants mouse input.
    pub(crate) fn wants_mouse(&self) -> bool {
        self.listens_for(EventMask::ANY_MOUSE)
    }

    pub(crate) fn clear_size_caches(&self) {
        self.cached_preferred.set(None);
        self.cached_minimum.set(None);
    }
}
