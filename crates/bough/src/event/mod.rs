//! Event types.
//!
//! Every event delivered through the tree is an [`Event`]: a source node, a
//! consumed flag, a timestamp, and an [`EventKind`] payload. The payload is a
//! sum type with one variant per category, so dispatch is a `match` with
//! exhaustiveness checking rather than a chain of type tests.
//!
//! Each concrete kind also has a numeric id (see [`Event::id`]). Ids up to
//! [`RESERVED_ID_MAX`] belong to the built-in kinds; ids above it are
//! application-defined [`CustomEvent`]s, which every node accepts.
//!
//! # Example
//!
//! ```ignore
//! use bough::event::{Event, MouseEvent, MouseEventKind};
//!
//! let mut event = Event::mouse(node, MouseEvent::new(MouseEventKind::Pressed, 5, 5));
//! tree.dispatch_event(&mut event);
//! if event.is_consumed() {
//!     // a listener handled it
//! }
//! ```

mod legacy;

pub use legacy::{LegacyEvent, LegacyEventId};

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use bough_core::{Point, Rect};

use crate::tree::NodeId;

/// Highest id reserved for built-in event kinds.
pub const RESERVED_ID_MAX: u32 = 1999;

/// First id handed out to application-defined events.
pub const FIRST_CUSTOM_ID: u32 = RESERVED_ID_MAX + 1;

bitflags::bitflags! {
    /// Event categories, used for explicit enabling and for proxying
    /// requirements up to a native host.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct EventMask: u32 {
        /// Moved, resized, shown, hidden.
        const COMPONENT        = 1 << 0;
        /// Child added, child removed.
        const CONTAINER        = 1 << 1;
        /// Focus gained, focus lost.
        const FOCUS            = 1 << 2;
        /// Key pressed, released, typed.
        const KEY              = 1 << 3;
        /// Mouse pressed, released, clicked, entered, exited.
        const MOUSE            = 1 << 4;
        /// Mouse moved, dragged.
        const MOUSE_MOTION     = 1 << 5;
        /// Window lifecycle.
        const WINDOW           = 1 << 6;
        /// Input method text and caret changes.
        const INPUT_METHOD     = 1 << 7;
        /// Paint and update.
        const PAINT            = 1 << 8;
        /// Hierarchy changes (parent, displayability, showing).
        const HIERARCHY        = 1 << 9;
        /// Ancestor moved, ancestor resized.
        const HIERARCHY_BOUNDS = 1 << 10;
    }
}

impl EventMask {
    /// Categories a native host retargets to its lightweight descendants.
    pub const PROXY: Self = Self::FOCUS
        .union(Self::KEY)
        .union(Self::MOUSE)
        .union(Self::MOUSE_MOTION);

    /// Both mouse categories.
    pub const ANY_MOUSE: Self = Self::MOUSE.union(Self::MOUSE_MOTION);
}

bitflags::bitflags! {
    /// Keyboard and mouse-button modifiers held during an input event.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u16 {
        /// Shift.
        const SHIFT   = 1 << 0;
        /// Control.
        const CTRL    = 1 << 1;
        /// Alt / Option.
        const ALT     = 1 << 2;
        /// Meta / Command / Super.
        const META    = 1 << 3;
        /// Primary mouse button.
        const BUTTON1 = 1 << 4;
        /// Middle mouse button.
        const BUTTON2 = 1 << 5;
        /// Secondary mouse button.
        const BUTTON3 = 1 << 6;
    }
}

/// Component geometry and visibility notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentEventKind {
    /// Position changed.
    Moved,
    /// Size changed.
    Resized,
    /// Became visible.
    Shown,
    /// Became hidden.
    Hidden,
}

/// Payload of a component event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentEvent {
    /// What happened.
    pub kind: ComponentEventKind,
}

/// Container membership notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerEventKind {
    /// A child was added.
    Added,
    /// A child was removed.
    Removed,
}

/// Payload of a container event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerEvent {
    /// What happened.
    pub kind: ContainerEventKind,
    /// The child that was added or removed.
    pub child: NodeId,
}

/// Focus transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusEventKind {
    /// Keyboard focus arrived.
    Gained,
    /// Keyboard focus left.
    Lost,
}

/// Payload of a focus event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusEvent {
    /// Gained or lost.
    pub kind: FocusEventKind,
    /// A temporary change, e.g. while a menu is open.
    pub temporary: bool,
}

/// Keyboard event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    /// A key went down.
    Pressed,
    /// A key went up.
    Released,
    /// A character was produced.
    Typed,
}

/// Payload of a keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Pressed, released, or typed.
    pub kind: KeyEventKind,
    /// Platform-independent virtual key code.
    pub key_code: u32,
    /// The character produced, if any.
    pub key_char: Option<char>,
    /// Modifiers held.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a key event without modifiers.
    pub fn new(kind: KeyEventKind, key_code: u32, key_char: Option<char>) -> Self {
        Self {
            kind,
            key_code,
            key_char,
            modifiers: Modifiers::empty(),
        }
    }

    /// Set the modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Mouse event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    /// A button went down.
    Pressed,
    /// A button went up.
    Released,
    /// Press and release without intervening movement out of the node.
    Clicked,
    /// The pointer entered the node.
    Entered,
    /// The pointer left the node.
    Exited,
    /// The pointer moved with no button held.
    Moved,
    /// The pointer moved with a button held.
    Dragged,
}

impl MouseEventKind {
    /// Whether this kind belongs to the motion category.
    pub fn is_motion(self) -> bool {
        matches!(self, Self::Moved | Self::Dragged)
    }
}

/// Payload of a mouse event. Coordinates are relative to the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// What happened.
    pub kind: MouseEventKind,
    /// Horizontal position relative to the source.
    pub x: i32,
    /// Vertical position relative to the source.
    pub y: i32,
    /// Modifiers and buttons held.
    pub modifiers: Modifiers,
    /// Number of consecutive clicks.
    pub click_count: u32,
    /// Whether this event should open a popup menu on this platform.
    pub popup_trigger: bool,
}

impl MouseEvent {
    /// Create a mouse event at `(x, y)`.
    pub fn new(kind: MouseEventKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::empty(),
            click_count: 0,
            popup_trigger: false,
        }
    }

    /// Set the modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the click count.
    pub fn with_click_count(mut self, click_count: u32) -> Self {
        self.click_count = click_count;
        self
    }

    /// The position as a point.
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Input method event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputMethodEventKind {
    /// Composed or committed text changed.
    TextChanged,
    /// Only the caret moved.
    CaretMoved,
}

/// Payload of an input method event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMethodEvent {
    /// What changed.
    pub kind: InputMethodEventKind,
    /// Composed plus committed text.
    pub text: String,
    /// How many leading characters of `text` are committed.
    pub committed: usize,
    /// Caret position within `text`.
    pub caret: Option<usize>,
}

/// Hierarchy event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HierarchyEventKind {
    /// Parent, displayability, or showing state changed (see the flags).
    Changed,
    /// An ancestor moved.
    AncestorMoved,
    /// An ancestor was resized.
    AncestorResized,
}

bitflags::bitflags! {
    /// What changed in a [`HierarchyEventKind::Changed`] event.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct HierarchyFlags: u8 {
        /// The changed node got a new parent or lost its parent.
        const PARENT_CHANGED         = 1 << 0;
        /// The changed node was materialized or dematerialized.
        const DISPLAYABILITY_CHANGED = 1 << 1;
        /// The changed node was shown or hidden.
        const SHOWING_CHANGED        = 1 << 2;
    }
}

/// Payload of a hierarchy event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyEvent {
    /// What happened.
    pub kind: HierarchyEventKind,
    /// The node at the top of the changed subtree.
    pub changed: NodeId,
    /// The parent of `changed` involved in the change.
    pub changed_parent: Option<NodeId>,
    /// Flags for [`HierarchyEventKind::Changed`]; empty otherwise.
    pub flags: HierarchyFlags,
}

/// Window lifecycle kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEventKind {
    /// First shown.
    Opened,
    /// The user asked to close the window.
    Closing,
    /// Disposed.
    Closed,
    /// Became the active window.
    Activated,
    /// Stopped being the active window.
    Deactivated,
}

/// Payload of a window event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEvent {
    /// What happened.
    pub kind: WindowEventKind,
}

/// Paint event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaintEventKind {
    /// Full paint of the damaged area.
    Paint,
    /// Incremental update of the damaged area.
    Update,
}

/// Payload of a paint event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintEvent {
    /// Paint or update.
    pub kind: PaintEventKind,
    /// Damaged area in source coordinates.
    pub rect: Rect,
}

/// An application-defined event carrying an arbitrary payload.
#[derive(Clone)]
pub struct CustomEvent {
    id: u32,
    payload: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
}

impl CustomEvent {
    /// Create a custom event. `code` is offset past the reserved id range.
    pub fn new<T: Any + Send + Sync>(code: u32, payload: T) -> Self {
        Self {
            id: FIRST_CUSTOM_ID.saturating_add(code),
            payload: Arc::new(payload),
            type_id: TypeId::of::<T>(),
        }
    }

    /// The event id; always above [`RESERVED_ID_MAX`].
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Check if the payload is of type `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Borrow the payload as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for CustomEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomEvent")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// The payload of an [`Event`], one variant per category.
#[derive(Debug, Clone)]
pub enum EventKind {
    /// Geometry / visibility notification.
    Component(ComponentEvent),
    /// Child added / removed.
    Container(ContainerEvent),
    /// Focus transition.
    Focus(FocusEvent),
    /// Keyboard input.
    Key(KeyEvent),
    /// Mouse input (buttons, crossing, motion).
    Mouse(MouseEvent),
    /// Input method composition.
    InputMethod(InputMethodEvent),
    /// Hierarchy change.
    Hierarchy(HierarchyEvent),
    /// Window lifecycle.
    Window(WindowEvent),
    /// Paint request.
    Paint(PaintEvent),
    /// Application-defined.
    Custom(CustomEvent),
}

/// An event addressed to a node.
#[derive(Debug, Clone)]
pub struct Event {
    source: NodeId,
    consumed: bool,
    when: u64,
    /// The payload.
    pub kind: EventKind,
}

impl Event {
    /// Create an event for `source`.
    pub fn new(source: NodeId, kind: EventKind) -> Self {
        Self {
            source,
            consumed: false,
            when: 0,
            kind,
        }
    }

    /// Component event shorthand.
    pub fn component(source: NodeId, kind: ComponentEventKind) -> Self {
        Self::new(source, EventKind::Component(ComponentEvent { kind }))
    }

    /// Focus event shorthand.
    pub fn focus(source: NodeId, kind: FocusEventKind, temporary: bool) -> Self {
        Self::new(source, EventKind::Focus(FocusEvent { kind, temporary }))
    }

    /// Key event shorthand.
    pub fn key(source: NodeId, key: KeyEvent) -> Self {
        Self::new(source, EventKind::Key(key))
    }

    /// Mouse event shorthand.
    pub fn mouse(source: NodeId, mouse: MouseEvent) -> Self {
        Self::new(source, EventKind::Mouse(mouse))
    }

    /// Window event shorthand.
    pub fn window(source: NodeId, kind: WindowEventKind) -> Self {
        Self::new(source, EventKind::Window(WindowEvent { kind }))
    }

    /// Paint event shorthand.
    pub fn paint(source: NodeId, kind: PaintEventKind, rect: Rect) -> Self {
        Self::new(source, EventKind::Paint(PaintEvent { kind, rect }))
    }

    /// Set the timestamp.
    pub fn with_when(mut self, when: u64) -> Self {
        self.when = when;
        self
    }

    /// The node the event is addressed to.
    #[inline]
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Timestamp in milliseconds; zero when unknown.
    #[inline]
    pub fn when(&self) -> u64 {
        self.when
    }

    /// Mark the event consumed. Remaining pipeline stages are skipped.
    #[inline]
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    /// Whether some stage consumed the event.
    #[inline]
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// The category this event belongs to. Custom events have none.
    pub fn category(&self) -> EventMask {
        match &self.kind {
            EventKind::Component(_) => EventMask::COMPONENT,
            EventKind::Container(_) => EventMask::CONTAINER,
            EventKind::Focus(_) => EventMask::FOCUS,
            EventKind::Key(_) => EventMask::KEY,
            EventKind::Mouse(m) if m.kind.is_motion() => EventMask::MOUSE_MOTION,
            EventKind::Mouse(_) => EventMask::MOUSE,
            EventKind::InputMethod(_) => EventMask::INPUT_METHOD,
            EventKind::Hierarchy(h) if h.kind == HierarchyEventKind::Changed => {
                EventMask::HIERARCHY
            }
            EventKind::Hierarchy(_) => EventMask::HIERARCHY_BOUNDS,
            EventKind::Window(_) => EventMask::WINDOW,
            EventKind::Paint(_) => EventMask::PAINT,
            EventKind::Custom(_) => EventMask::empty(),
        }
    }

    /// Numeric id of the concrete kind.
    pub fn id(&self) -> u32 {
        match &self.kind {
            EventKind::Component(c) => 100 + c.kind as u32,
            EventKind::Container(c) => 300 + c.kind as u32,
            EventKind::Focus(f) => 1004 + f.kind as u32,
            EventKind::Key(k) => 400 + k.kind as u32,
            EventKind::Mouse(m) => 500 + m.kind as u32,
            EventKind::InputMethod(i) => 1100 + i.kind as u32,
            EventKind::Hierarchy(h) => 1400 + h.kind as u32,
            EventKind::Window(w) => 200 + w.kind as u32,
            EventKind::Paint(p) => 800 + p.kind as u32,
            EventKind::Custom(c) => c.id(),
        }
    }

    /// Whether the event is application-defined.
    pub fn is_custom(&self) -> bool {
        self.id() > RESERVED_ID_MAX
    }

    /// The mouse payload, if any.
    pub fn as_mouse(&self) -> Option<&MouseEvent> {
        match &self.kind {
            EventKind::Mouse(m) => Some(m),
            _ => None,
        }
    }

    /// The key payload, if any.
    pub fn as_key(&self) -> Option<&KeyEvent> {
        match &self.kind {
            EventKind::Key(k) => Some(k),
            _ => None,
        }
    }

    /// Mutable key payload, if any.
    pub fn as_key_mut(&mut self) -> Option<&mut KeyEvent> {
        match &mut self.kind {
            EventKind::Key(k) => Some(k),
            _ => None,
        }
    }

    /// The focus payload, if any.
    pub fn as_focus(&self) -> Option<&FocusEvent> {
        match &self.kind {
            EventKind::Focus(f) => Some(f),
            _ => None,
        }
    }

    /// The hierarchy payload, if any.
    pub fn as_hierarchy(&self) -> Option<&HierarchyEvent> {
        match &self.kind {
            EventKind::Hierarchy(h) => Some(h),
            _ => None,
        }
    }

    /// The container payload, if any.
    pub fn as_container(&self) -> Option<&ContainerEvent> {
        match &self.kind {
            EventKind::Container(c) => Some(c),
            _ => None,
        }
    }

    /// The component payload, if any.
    pub fn as_component(&self) -> Option<&ComponentEvent> {
        match &self.kind {
            EventKind::Component(c) => Some(c),
            _ => None,
        }
    }

    /// Copy of this event readdressed to `source`, unconsumed.
    pub(crate) fn retargeted(&self, source: NodeId, kind: EventKind) -> Self {
        Self {
            source,
            consumed: false,
            when: self.when,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn node() -> NodeId {
        NodeId::from(KeyData::from_ffi(1))
    }

    #[test]
    fn motion_kinds_use_motion_category() {
        let moved = Event::mouse(node(), MouseEvent::new(MouseEventKind::Moved, 0, 0));
        let pressed = Event::mouse(node(), MouseEvent::new(MouseEventKind::Pressed, 0, 0));
        assert_eq!(moved.category(), EventMask::MOUSE_MOTION);
        assert_eq!(pressed.category(), EventMask::MOUSE);
    }

    #[test]
    fn builtin_ids_stay_in_reserved_range() {
        let events = [
            Event::component(node(), ComponentEventKind::Hidden),
            Event::focus(node(), FocusEventKind::Lost, false),
            Event::mouse(node(), MouseEvent::new(MouseEventKind::Dragged, 0, 0)),
            Event::window(node(), WindowEventKind::Deactivated),
            Event::paint(node(), PaintEventKind::Update, Rect::ZERO),
        ];
        for event in &events {
            assert!(event.id() <= RESERVED_ID_MAX);
            assert!(!event.is_custom());
        }
    }

    #[test]
    fn custom_events_are_above_reserved_range() {
        let event = Event::new(node(), EventKind::Custom(CustomEvent::new(3, "ping")));
        assert_eq!(event.id(), FIRST_CUSTOM_ID + 3);
        assert!(event.is_custom());
        assert!(event.category().is_empty());
        match &event.kind {
            EventKind::Custom(custom) => {
                assert!(custom.is::<&str>());
                assert_eq!(custom.downcast_ref::<&str>(), Some(&"ping"));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn consume_is_sticky() {
        let mut event = Event::component(node(), ComponentEventKind::Moved);
        assert!(!event.is_consumed());
        event.consume();
        assert!(event.is_consumed());
    }
}
