//! Pluggable per-node and per-container hooks.
//!
//! Nodes are not subclassed. Widget-specific behaviour is a [`Behavior`]
//! object attached to a node, and the shortcut/traversal, window-closing and
//! input-method stages of dispatch are likewise strategy objects registered
//! on the node that owns them.

use bough_core::Size;

use crate::event::{Event, EventMask, LegacyEvent};
use crate::peer::Graphics;
use crate::tree::{NodeId, Tree};

/// Widget behaviour attached to a node.
///
/// All hooks have default implementations, so a behaviour overrides only
/// what it needs.
pub trait Behavior: Send + Sync {
    /// Categories enabled on the node when the behaviour is attached.
    fn enabled_events(&self) -> EventMask {
        EventMask::empty()
    }

    /// Handle an event in the primary delivery stage, before typed listeners.
    ///
    /// Only called for events whose category is enabled on the node.
    fn process_event(&self, _tree: &mut Tree, _node: NodeId, _event: &mut Event) {}

    /// Paint the node.
    fn paint(&self, _tree: &Tree, _node: NodeId, _graphics: &mut dyn Graphics) {}

    /// Incrementally update the node. Defaults to a full paint.
    fn update(&self, tree: &Tree, node: NodeId, graphics: &mut dyn Graphics) {
        self.paint(tree, node, graphics);
    }

    /// Preferred size, when the behaviour knows better than the peer.
    fn preferred_size(&self, _tree: &Tree, _node: NodeId) -> Option<Size> {
        None
    }

    /// Minimum size, when the behaviour knows better than the peer.
    fn minimum_size(&self, _tree: &Tree, _node: NodeId) -> Option<Size> {
        None
    }

    /// Legacy single-method hook. Return `true` when the event was handled;
    /// unhandled events are offered to the parent.
    fn handle_event(&self, _tree: &mut Tree, _event: &mut LegacyEvent) -> bool {
        false
    }

    /// Whether legacy mouse events are produced for this node.
    ///
    /// `None` defers to [`TreeConfig::legacy_mouse_events`](crate::TreeConfig).
    fn posts_old_mouse_events(&self) -> Option<bool> {
        None
    }
}

/// Keyboard pre- and post-processing owned by a container.
///
/// Key presses and releases are offered to the nearest container with a
/// processor before listeners run (shortcuts) and again if nothing consumed
/// them (focus traversal).
pub trait KeyEventProcessor: Send + Sync {
    /// Offered before any listener. Consume to claim the event.
    fn pre_process(&self, _tree: &mut Tree, _event: &mut Event) {}

    /// Offered after listeners when the event is still unconsumed.
    fn post_process(&self, _tree: &mut Tree, _event: &mut Event) {}
}

/// Outcome of a [`ClosingPolicy`] decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosingDecision {
    /// Continue dispatching the closing event.
    #[default]
    Proceed,
    /// Stop dispatch here.
    Abort,
}

/// When a [`ClosingPolicy`] is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClosingStage {
    /// Before any window listener runs.
    BeforeListeners,
    /// After listeners, if none consumed the event.
    AfterListeners,
}

/// Decides what happens when a window is asked to close.
pub trait ClosingPolicy: Send + Sync {
    /// Called at each stage of a window-closing dispatch. Returning
    /// [`ClosingDecision::Abort`] ends the dispatch.
    fn window_closing(
        &self,
        tree: &mut Tree,
        window: NodeId,
        stage: ClosingStage,
    ) -> ClosingDecision;
}

/// The active input context for composed text input.
pub trait InputContext: Send + Sync {
    /// Offered input-method, key and focus events first. Consume to keep
    /// them from the node.
    fn dispatch_event(&self, tree: &mut Tree, event: &mut Event);
}
