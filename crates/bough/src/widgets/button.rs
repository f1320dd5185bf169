//! A push button.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bough_core::logging::targets;
use bough_core::{ListenerId, ListenerList, Rect, Size};
use parking_lot::Mutex;

use crate::appearance::Color;
use crate::behavior::Behavior;
use crate::error::TreeResult;
use crate::event::{Event, EventKind, EventMask, Modifiers, MouseEventKind};
use crate::peer::Graphics;
use crate::tree::{NodeId, NodeKind, NodeOptions, Tree};

const PADDING: i32 = 6;
const CHAR_WIDTH: i32 = 7;
const LINE_HEIGHT: i32 = 14;

/// A button was activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    /// The button's node.
    pub source: NodeId,
    /// The button's action command, its label unless set otherwise.
    pub command: String,
    /// Modifiers held when the button was released.
    pub modifiers: Modifiers,
}

/// Receives [`ActionEvent`]s.
pub trait ActionListener: Send + Sync {
    /// Called once per activation.
    fn action_performed(&self, tree: &mut Tree, event: &ActionEvent);
}

impl<F> ActionListener for F
where
    F: Fn(&mut Tree, &ActionEvent) + Send + Sync,
{
    fn action_performed(&self, tree: &mut Tree, event: &ActionEvent) {
        self(tree, event)
    }
}

/// A lightweight push button.
///
/// The button arms on a press and fires its action listeners when the
/// matching release lands inside its bounds. Releasing elsewhere disarms it
/// without firing.
///
/// ```
/// use std::sync::Arc;
/// use bough::{HeadlessToolkit, Tree};
/// use bough::widgets::Button;
///
/// let mut tree = Tree::new(Arc::new(HeadlessToolkit::new()));
/// let (node, button) = Button::create(&mut tree, "OK");
/// assert_eq!(tree.name(node).unwrap(), "OK");
/// assert_eq!(button.label(), "OK");
/// ```
pub struct Button {
    label: Mutex<String>,
    command: Mutex<Option<String>>,
    armed: AtomicBool,
    listeners: Mutex<ListenerList<dyn ActionListener>>,
}

impl Button {
    /// A button behaviour not yet attached to a node.
    pub fn new(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            label: Mutex::new(label.into()),
            command: Mutex::new(None),
            armed: AtomicBool::new(false),
            listeners: Mutex::new(ListenerList::new()),
        })
    }

    /// Create a button node in `tree`, named after its label.
    pub fn create(tree: &mut Tree, label: impl Into<String>) -> (NodeId, Arc<Self>) {
        let label = label.into();
        let button = Self::new(label.clone());
        let options = NodeOptions::new(NodeKind::Component)
            .name(label)
            .behavior(button.clone());
        (tree.create_node(options), button)
    }

    /// The current label.
    pub fn label(&self) -> String {
        self.label.lock().clone()
    }

    /// Change the label. The node is invalidated, since its preferred size
    /// depends on the label.
    pub fn set_label(&self, tree: &mut Tree, node: NodeId, label: impl Into<String>) -> TreeResult<()> {
        *self.label.lock() = label.into();
        tree.invalidate(node)?;
        tree.repaint(node)
    }

    /// The command reported in [`ActionEvent`]s.
    pub fn action_command(&self) -> String {
        self.command.lock().clone().unwrap_or_else(|| self.label())
    }

    /// Override the command. `None` reverts to the label.
    pub fn set_action_command(&self, command: Option<String>) {
        *self.command.lock() = command;
    }

    /// Whether a press is waiting for its release.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Register a listener for activations.
    pub fn add_action_listener(&self, listener: Arc<dyn ActionListener>) -> ListenerId {
        self.listeners.lock().add(listener)
    }

    /// Unregister a listener. Unknown ids are ignored.
    pub fn remove_action_listener(&self, id: ListenerId) -> bool {
        self.listeners.lock().remove(id)
    }

    /// Fire the action listeners as if the button had been clicked.
    pub fn click(&self, tree: &mut Tree, node: NodeId) {
        self.fire(tree, node, Modifiers::empty());
    }

    fn fire(&self, tree: &mut Tree, node: NodeId, modifiers: Modifiers) {
        let event = ActionEvent {
            source: node,
            command: self.action_command(),
            modifiers,
        };
        tracing::debug!(target: targets::WIDGETS, ?node, command = %event.command, "button fired");
        // Listeners may add or remove listeners.
        let listeners = self.listeners.lock().snapshot();
        for listener in listeners {
            listener.action_performed(tree, &event);
        }
    }
}

impl std::fmt::Debug for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Button")
            .field("label", &*self.label.lock())
            .field("armed", &self.is_armed())
            .finish_non_exhaustive()
    }
}

impl Behavior for Button {
    fn enabled_events(&self) -> EventMask {
        EventMask::MOUSE
    }

    fn process_event(&self, tree: &mut Tree, node: NodeId, event: &mut Event) {
        let EventKind::Mouse(mouse) = &event.kind else {
            return;
        };
        let (kind, x, y, modifiers) = (mouse.kind, mouse.x, mouse.y, mouse.modifiers);
        match kind {
            MouseEventKind::Pressed => {
                if !tree.is_enabled(node).unwrap_or(false) {
                    return;
                }
                self.armed.store(true, Ordering::Release);
                repaint(tree, node);
            }
            MouseEventKind::Released => {
                if !self.armed.swap(false, Ordering::AcqRel) {
                    return;
                }
                repaint(tree, node);
                let inside = tree
                    .size(node)
                    .is_ok_and(|size| Rect::from_origin_size(Default::default(), size).contains(x, y));
                if inside {
                    self.fire(tree, node, modifiers);
                }
            }
            _ => {}
        }
    }

    fn paint(&self, tree: &Tree, node: NodeId, graphics: &mut dyn Graphics) {
        let Ok(size) = tree.size(node) else {
            return;
        };
        let area = Rect::from_origin_size(Default::default(), size);
        let background = tree.background(node).ok().flatten().unwrap_or(Color::LIGHT_GRAY);
        let foreground = tree.foreground(node).ok().flatten().unwrap_or(Color::BLACK);

        graphics.set_color(if self.is_armed() { foreground } else { background });
        graphics.fill_rect(area);
        graphics.set_color(foreground);
        graphics.draw_rect(Rect::new(0, 0, size.width - 1, size.height - 1));
        if let Ok(Some(font)) = tree.font(node) {
            graphics.set_font(&font);
        }
        graphics.set_color(if self.is_armed() { background } else { foreground });
        graphics.draw_string(&self.label.lock(), PADDING, PADDING + LINE_HEIGHT - 3);
    }

    fn preferred_size(&self, tree: &Tree, node: NodeId) -> Option<Size> {
        let chars = self.label.lock().chars().count() as i32;
        let line = tree
            .font(node)
            .ok()
            .flatten()
            .map_or(LINE_HEIGHT, |font| i32::from(font.size()) + 2);
        Some(Size::new(chars * CHAR_WIDTH + 2 * PADDING, line + 2 * PADDING))
    }

    fn minimum_size(&self, tree: &Tree, node: NodeId) -> Option<Size> {
        self.preferred_size(tree, node)
    }
}

fn repaint(tree: &mut Tree, node: NodeId) {
    if let Err(error) = tree.repaint(node) {
        tracing::trace!(target: targets::WIDGETS, ?node, %error, "button repaint skipped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::event::MouseEvent;
    use crate::headless::HeadlessToolkit;

    fn press_release(tree: &mut Tree, node: NodeId, release_at: (i32, i32)) {
        let mut press = Event::mouse(node, MouseEvent::new(MouseEventKind::Pressed, 5, 5));
        tree.dispatch_event(&mut press).unwrap();
        let (x, y) = release_at;
        let mut release = Event::mouse(node, MouseEvent::new(MouseEventKind::Released, x, y));
        tree.dispatch_event(&mut release).unwrap();
    }

    fn counted() -> (Tree, NodeId, Arc<Button>, Arc<AtomicUsize>) {
        let mut tree = Tree::new(Arc::new(HeadlessToolkit::new()));
        let (node, button) = Button::create(&mut tree, "Apply");
        tree.set_bounds(node, Rect::new(0, 0, 60, 24)).unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        button.add_action_listener(Arc::new(move |_: &mut Tree, event: &ActionEvent| {
            assert_eq!(event.command, "Apply");
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        (tree, node, button, fired)
    }

    #[test]
    fn release_inside_fires() {
        let (mut tree, node, button, fired) = counted();
        press_release(&mut tree, node, (10, 10));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!button.is_armed());
    }

    #[test]
    fn release_outside_only_disarms() {
        let (mut tree, node, button, fired) = counted();
        press_release(&mut tree, node, (100, 10));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!button.is_armed());
    }

    #[test]
    fn disabled_button_does_not_arm() {
        let (mut tree, node, button, fired) = counted();
        tree.set_enabled(node, false).unwrap();
        press_release(&mut tree, node, (10, 10));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!button.is_armed());
    }

    #[test]
    fn preferred_size_follows_label() {
        let (tree, node, button, _) = counted();
        assert_eq!(tree.preferred_size(node).unwrap(), Size::new(5 * 7 + 12, 14 + 12));
        assert_eq!(format!("{button:?}"), "Button { label: \"Apply\", armed: false, .. }");
    }

    #[test]
    fn release_after_destroy_is_ignored() {
        let (mut tree, node, button, fired) = counted();
        let mut press = Event::mouse(node, MouseEvent::new(MouseEventKind::Pressed, 5, 5));
        tree.dispatch_event(&mut press).unwrap();
        assert!(button.is_armed());

        tree.destroy(node).unwrap();
        let mut release = Event::mouse(node, MouseEvent::new(MouseEventKind::Released, 5, 5));
        button.process_event(&mut tree, node, &mut release);
        assert!(!button.is_armed());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
