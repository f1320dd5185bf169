//! Typed listener traits and the per-node listener registry.
//!
//! Each event category has its own trait with one method per concrete event
//! kind. Every method has an empty default body, so an implementation only
//! overrides what it cares about. Methods receive the whole tree mutably,
//! which lets a listener restructure the tree from inside a callback without
//! re-acquiring the tree lock.
//!
//! A node keeps one ordered [`ListenerList`] per category. Registering the
//! same listener twice delivers events to it twice; removal by id or by
//! identity never disturbs other registrations.

use std::sync::Arc;

use bough_core::{ListenerId, ListenerList};

use crate::event::{Event, EventMask};
use crate::tree::Tree;

/// Geometry and visibility notifications.
pub trait ComponentListener: Send + Sync {
    /// The node's size changed.
    fn component_resized(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// The node's position changed.
    fn component_moved(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// The node became visible.
    fn component_shown(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// The node became hidden.
    fn component_hidden(&self, _tree: &mut Tree, _event: &mut Event) {}
}

/// Child membership notifications.
pub trait ContainerListener: Send + Sync {
    /// A child was added.
    fn component_added(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// A child was removed.
    fn component_removed(&self, _tree: &mut Tree, _event: &mut Event) {}
}

/// Keyboard focus transitions.
pub trait FocusListener: Send + Sync {
    /// Focus arrived.
    fn focus_gained(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// Focus left.
    fn focus_lost(&self, _tree: &mut Tree, _event: &mut Event) {}
}

/// Keyboard input.
pub trait KeyListener: Send + Sync {
    /// A character was typed.
    fn key_typed(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// A key went down.
    fn key_pressed(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// A key went up.
    fn key_released(&self, _tree: &mut Tree, _event: &mut Event) {}
}

/// Mouse buttons and crossing.
pub trait MouseListener: Send + Sync {
    /// Press followed by release on the same node.
    fn mouse_clicked(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// A button went down.
    fn mouse_pressed(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// A button went up.
    fn mouse_released(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// The pointer entered.
    fn mouse_entered(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// The pointer left.
    fn mouse_exited(&self, _tree: &mut Tree, _event: &mut Event) {}
}

/// Mouse motion.
pub trait MouseMotionListener: Send + Sync {
    /// The pointer moved with a button held.
    fn mouse_dragged(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// The pointer moved.
    fn mouse_moved(&self, _tree: &mut Tree, _event: &mut Event) {}
}

/// Input method composition.
pub trait InputMethodListener: Send + Sync {
    /// Composed or committed text changed.
    fn text_changed(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// The caret moved.
    fn caret_moved(&self, _tree: &mut Tree, _event: &mut Event) {}
}

/// Parent, displayability and showing changes anywhere above the node.
pub trait HierarchyListener: Send + Sync {
    /// Something in the ancestor chain changed; see the event flags.
    fn hierarchy_changed(&self, _tree: &mut Tree, _event: &mut Event) {}
}

/// Ancestor geometry changes.
pub trait HierarchyBoundsListener: Send + Sync {
    /// An ancestor moved.
    fn ancestor_moved(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// An ancestor was resized.
    fn ancestor_resized(&self, _tree: &mut Tree, _event: &mut Event) {}
}

/// Window lifecycle.
pub trait WindowListener: Send + Sync {
    /// The window was first shown.
    fn window_opened(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// The user asked to close the window.
    fn window_closing(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// The window was disposed.
    fn window_closed(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// The window became active.
    fn window_activated(&self, _tree: &mut Tree, _event: &mut Event) {}
    /// The window stopped being active.
    fn window_deactivated(&self, _tree: &mut Tree, _event: &mut Event) {}
}

/// Observes every event dispatched anywhere in the tree.
///
/// Global listeners see the event before any node-level stage and cannot
/// consume it.
pub trait GlobalEventListener: Send + Sync {
    /// Called for each dispatched event whose category is in the listener's mask.
    fn event_dispatched(&self, tree: &Tree, event: &Event);
}

/// Listener categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerCategory {
    /// [`ComponentListener`].
    Component,
    /// [`ContainerListener`].
    Container,
    /// [`FocusListener`].
    Focus,
    /// [`KeyListener`].
    Key,
    /// [`MouseListener`].
    Mouse,
    /// [`MouseMotionListener`].
    MouseMotion,
    /// [`InputMethodListener`].
    InputMethod,
    /// [`HierarchyListener`].
    Hierarchy,
    /// [`HierarchyBoundsListener`].
    HierarchyBounds,
    /// [`WindowListener`].
    Window,
}

impl ListenerCategory {
    /// Every category, in registry order.
    pub const ALL: [Self; 10] = [
        Self::Component,
        Self::Container,
        Self::Focus,
        Self::Key,
        Self::Mouse,
        Self::MouseMotion,
        Self::InputMethod,
        Self::Hierarchy,
        Self::HierarchyBounds,
        Self::Window,
    ];

    /// The event category this listener kind receives.
    pub fn mask(self) -> EventMask {
        match self {
            Self::Component => EventMask::COMPONENT,
            Self::Container => EventMask::CONTAINER,
            Self::Focus => EventMask::FOCUS,
            Self::Key => EventMask::KEY,
            Self::Mouse => EventMask::MOUSE,
            Self::MouseMotion => EventMask::MOUSE_MOTION,
            Self::InputMethod => EventMask::INPUT_METHOD,
            Self::Hierarchy => EventMask::HIERARCHY,
            Self::HierarchyBounds => EventMask::HIERARCHY_BOUNDS,
            Self::Window => EventMask::WINDOW,
        }
    }

    /// The listener category for an event category, if listeners exist for it.
    pub fn for_mask(mask: EventMask) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.mask() == mask)
    }
}

/// A listener of any category, ready to be registered on a node.
#[derive(Clone)]
pub enum Listener {
    /// Geometry and visibility.
    Component(Arc<dyn ComponentListener>),
    /// Child membership.
    Container(Arc<dyn ContainerListener>),
    /// Focus.
    Focus(Arc<dyn FocusListener>),
    /// Keyboard.
    Key(Arc<dyn KeyListener>),
    /// Mouse buttons and crossing.
    Mouse(Arc<dyn MouseListener>),
    /// Mouse motion.
    MouseMotion(Arc<dyn MouseMotionListener>),
    /// Input methods.
    InputMethod(Arc<dyn InputMethodListener>),
    /// Hierarchy changes.
    Hierarchy(Arc<dyn HierarchyListener>),
    /// Ancestor geometry.
    HierarchyBounds(Arc<dyn HierarchyBoundsListener>),
    /// Window lifecycle.
    Window(Arc<dyn WindowListener>),
}

impl Listener {
    /// The category of this listener.
    pub fn category(&self) -> ListenerCategory {
        match self {
            Self::Component(_) => ListenerCategory::Component,
            Self::Container(_) => ListenerCategory::Container,
            Self::Focus(_) => ListenerCategory::Focus,
            Self::Key(_) => ListenerCategory::Key,
            Self::Mouse(_) => ListenerCategory::Mouse,
            Self::MouseMotion(_) => ListenerCategory::MouseMotion,
            Self::InputMethod(_) => ListenerCategory::InputMethod,
            Self::Hierarchy(_) => ListenerCategory::Hierarchy,
            Self::HierarchyBounds(_) => ListenerCategory::HierarchyBounds,
            Self::Window(_) => ListenerCategory::Window,
        }
    }

    /// Whether both values wrap the same listener object.
    pub fn ptr_eq(&self, other: &Listener) -> bool {
        match (self, other) {
            (Self::Component(a), Self::Component(b)) => Arc::ptr_eq(a, b),
            (Self::Container(a), Self::Container(b)) => Arc::ptr_eq(a, b),
            (Self::Focus(a), Self::Focus(b)) => Arc::ptr_eq(a, b),
            (Self::Key(a), Self::Key(b)) => Arc::ptr_eq(a, b),
            (Self::Mouse(a), Self::Mouse(b)) => Arc::ptr_eq(a, b),
            (Self::MouseMotion(a), Self::MouseMotion(b)) => Arc::ptr_eq(a, b),
            (Self::InputMethod(a), Self::InputMethod(b)) => Arc::ptr_eq(a, b),
            (Self::Hierarchy(a), Self::Hierarchy(b)) => Arc::ptr_eq(a, b),
            (Self::HierarchyBounds(a), Self::HierarchyBounds(b)) => Arc::ptr_eq(a, b),
            (Self::Window(a), Self::Window(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Listener").field(&self.category()).finish()
    }
}

/// All listeners registered on one node, grouped by category.
#[derive(Debug, Default, Clone)]
pub struct ListenerRegistry {
    pub(crate) component: ListenerList<dyn ComponentListener>,
    pub(crate) container: ListenerList<dyn ContainerListener>,
    pub(crate) focus: ListenerList<dyn FocusListener>,
    pub(crate) key: ListenerList<dyn KeyListener>,
    pub(crate) mouse: ListenerList<dyn MouseListener>,
    pub(crate) mouse_motion: ListenerList<dyn MouseMotionListener>,
    pub(crate) input_method: ListenerList<dyn InputMethodListener>,
    pub(crate) hierarchy: ListenerList<dyn HierarchyListener>,
    pub(crate) hierarchy_bounds: ListenerList<dyn HierarchyBoundsListener>,
    pub(crate) window: ListenerList<dyn WindowListener>,
}

impl ListenerRegistry {
    /// Register a listener in its category's list.
    pub fn add(&mut self, listener: Listener) -> ListenerId {
        match listener {
            Listener::Component(l) => self.component.add(l),
            Listener::Container(l) => self.container.add(l),
            Listener::Focus(l) => self.focus.add(l),
            Listener::Key(l) => self.key.add(l),
            Listener::Mouse(l) => self.mouse.add(l),
            Listener::MouseMotion(l) => self.mouse_motion.add(l),
            Listener::InputMethod(l) => self.input_method.add(l),
            Listener::Hierarchy(l) => self.hierarchy.add(l),
            Listener::HierarchyBounds(l) => self.hierarchy_bounds.add(l),
            Listener::Window(l) => self.window.add(l),
        }
    }

    /// Remove a registration. Returns the category it was removed from.
    pub fn remove(&mut self, id: ListenerId) -> Option<ListenerCategory> {
        ListenerCategory::ALL.into_iter().find(|&category| match category {
            ListenerCategory::Component => self.component.remove(id),
            ListenerCategory::Container => self.container.remove(id),
            ListenerCategory::Focus => self.focus.remove(id),
            ListenerCategory::Key => self.key.remove(id),
            ListenerCategory::Mouse => self.mouse.remove(id),
            ListenerCategory::MouseMotion => self.mouse_motion.remove(id),
            ListenerCategory::InputMethod => self.input_method.remove(id),
            ListenerCategory::Hierarchy => self.hierarchy.remove(id),
            ListenerCategory::HierarchyBounds => self.hierarchy_bounds.remove(id),
            ListenerCategory::Window => self.window.remove(id),
        })
    }

    /// Remove the most recent registration of this listener object.
    pub fn remove_instance(&mut self, listener: &Listener) -> bool {
        match listener {
            Listener::Component(l) => self.component.remove_instance(l),
            Listener::Container(l) => self.container.remove_instance(l),
            Listener::Focus(l) => self.focus.remove_instance(l),
            Listener::Key(l) => self.key.remove_instance(l),
            Listener::Mouse(l) => self.mouse.remove_instance(l),
            Listener::MouseMotion(l) => self.mouse_motion.remove_instance(l),
            Listener::InputMethod(l) => self.input_method.remove_instance(l),
            Listener::Hierarchy(l) => self.hierarchy.remove_instance(l),
            Listener::HierarchyBounds(l) => self.hierarchy_bounds.remove_instance(l),
            Listener::Window(l) => self.window.remove_instance(l),
        }
    }

    /// Number of registrations in a category.
    pub fn count(&self, category: ListenerCategory) -> usize {
        match category {
            ListenerCategory::Component => self.component.len(),
            ListenerCategory::Container => self.container.len(),
            ListenerCategory::Focus => self.focus.len(),
            ListenerCategory::Key => self.key.len(),
            ListenerCategory::Mouse => self.mouse.len(),
            ListenerCategory::MouseMotion => self.mouse_motion.len(),
            ListenerCategory::InputMethod => self.input_method.len(),
            ListenerCategory::Hierarchy => self.hierarchy.len(),
            ListenerCategory::HierarchyBounds => self.hierarchy_bounds.len(),
            ListenerCategory::Window => self.window.len(),
        }
    }

    /// Whether at least one listener is registered in a category.
    #[inline]
    pub fn has(&self, category: ListenerCategory) -> bool {
        self.count(category) > 0
    }

    /// Union of the event categories that have listeners.
    pub fn mask(&self) -> EventMask {
        ListenerCategory::ALL
            .into_iter()
            .filter(|&category| self.has(category))
            .fold(EventMask::empty(), |mask, category| mask | category.mask())
    }

    /// The listeners of one category, in registration order.
    pub fn snapshot(&self, category: ListenerCategory) -> Vec<Listener> {
        match category {
            ListenerCategory::Component => wrap(&self.component, Listener::Component),
            ListenerCategory::Container => wrap(&self.container, Listener::Container),
            ListenerCategory::Focus => wrap(&self.focus, Listener::Focus),
            ListenerCategory::Key => wrap(&self.key, Listener::Key),
            ListenerCategory::Mouse => wrap(&self.mouse, Listener::Mouse),
            ListenerCategory::MouseMotion => wrap(&self.mouse_motion, Listener::MouseMotion),
            ListenerCategory::InputMethod => wrap(&self.input_method, Listener::InputMethod),
            ListenerCategory::Hierarchy => wrap(&self.hierarchy, Listener::Hierarchy),
            ListenerCategory::HierarchyBounds => {
                wrap(&self.hierarchy_bounds, Listener::HierarchyBounds)
            }
            ListenerCategory::Window => wrap(&self.window, Listener::Window),
        }
    }

    /// Drop every registration.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn wrap<L: ?Sized>(list: &ListenerList<L>, f: fn(Arc<L>) -> Listener) -> Vec<Listener> {
    list.snapshot().into_iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quiet;
    impl MouseListener for Quiet {}
    impl HierarchyListener for Quiet {}

    #[test]
    fn mask_tracks_registered_categories() {
        let mut registry = ListenerRegistry::default();
        assert!(registry.mask().is_empty());
        let id = registry.add(Listener::Mouse(Arc::new(Quiet)));
        registry.add(Listener::Hierarchy(Arc::new(Quiet)));
        assert_eq!(registry.mask(), EventMask::MOUSE | EventMask::HIERARCHY);
        assert_eq!(registry.remove(id), Some(ListenerCategory::Mouse));
        assert_eq!(registry.mask(), EventMask::HIERARCHY);
    }

    #[test]
    fn removing_unknown_is_noop() {
        let mut registry = ListenerRegistry::default();
        let id = registry.add(Listener::Mouse(Arc::new(Quiet)));
        registry.remove(id);
        assert_eq!(registry.remove(id), None);
        assert!(!registry.remove_instance(&Listener::Mouse(Arc::new(Quiet))));
    }

    #[test]
    fn duplicate_registrations_are_independent() {
        let quiet: Arc<dyn MouseListener> = Arc::new(Quiet);
        let mut registry = ListenerRegistry::default();
        registry.add(Listener::Mouse(quiet.clone()));
        registry.add(Listener::Mouse(quiet.clone()));
        assert_eq!(registry.count(ListenerCategory::Mouse), 2);
        assert!(registry.remove_instance(&Listener::Mouse(quiet)));
        assert_eq!(registry.count(ListenerCategory::Mouse), 1);
    }

    #[test]
    fn snapshot_preserves_identity_and_order() {
        let a: Arc<dyn MouseListener> = Arc::new(Quiet);
        let b: Arc<dyn MouseListener> = Arc::new(Quiet);
        let mut registry = ListenerRegistry::default();
        registry.add(Listener::Mouse(a.clone()));
        registry.add(Listener::Mouse(b.clone()));
        let snapshot = registry.snapshot(ListenerCategory::Mouse);
        assert!(snapshot[0].ptr_eq(&Listener::Mouse(a)));
        assert!(snapshot[1].ptr_eq(&Listener::Mouse(b)));
    }

    #[test]
    fn category_lookup_by_mask() {
        assert_eq!(
            ListenerCategory::for_mask(EventMask::MOUSE_MOTION),
            Some(ListenerCategory::MouseMotion)
        );
        assert_eq!(ListenerCategory::for_mask(EventMask::PAINT), None);
    }
}
