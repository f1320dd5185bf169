//! The event pipeline.
//!
//! Every event, posted or synthesized, reaches a node through
//! [`Tree::dispatch_event`]. A native container first offers it to its
//! lightweight redirector, after drags from native nodes are reported to
//! the other hosts watching them. Otherwise the event runs through five
//! stages on the node itself:
//!
//! 1. global listeners observe it
//! 2. the input context may claim key, focus and input-method events
//! 3. pre-processing: painting, focus bookkeeping, key shortcuts and the
//!    window closing policy
//! 4. delivery to the behaviour and typed listeners, or to the legacy hook
//! 5. post-processing: key traversal, the closing policy and the peer

use std::sync::Arc;

use bough_core::Rect;
use bough_core::logging::{PerfSpan, span_names, targets};

use crate::behavior::{ClosingDecision, ClosingStage, KeyEventProcessor};
use crate::error::TreeResult;
use crate::event::{
    ComponentEventKind, ContainerEventKind, Event, EventKind, EventMask, FocusEventKind,
    HierarchyEventKind, InputMethodEventKind, KeyEventKind, LegacyEvent, MouseEventKind,
    PaintEventKind, WindowEventKind,
};
use crate::listener::{GlobalEventListener, ListenerCategory};
use crate::peer::{Graphics, Peer};

use super::{Node, NodeId, Tree};

impl Tree {
    /// Dispatch `event` to its source node.
    ///
    /// Fails only when the source does not exist. A node destroyed by a
    /// listener midway ends the dispatch quietly.
    pub fn dispatch_event(&mut self, event: &mut Event) -> TreeResult<()> {
        let id = event.source();
        let node = self.node(id)?;
        let _span = PerfSpan::new(span_names::DISPATCH);
        tracing::trace!(target: targets::DISPATCH, ?id, event = event.id(), "dispatching");

        let has_redirector = node
            .container
            .as_ref()
            .is_some_and(|c| c.redirector.is_some());
        self.report_foreign_drag(event);
        if has_redirector && self.redirect(id, event)? {
            event.consume();
            if let Some(peer) = self.nodes.get(id).and_then(|n| n.peer.native()).cloned() {
                peer.handle_event(event);
            }
            return Ok(());
        }

        self.dispatch_to_self(event)?;

        if let EventKind::Component(component) = &event.kind
            && matches!(
                component.kind,
                ComponentEventKind::Resized | ComponentEventKind::Moved
            )
        {
            let kind = component.kind;
            if self.nodes.get(id).is_some_and(|n| !n.children().is_empty()) {
                self.fire_ancestor_bounds(id, kind)?;
            }
        }
        Ok(())
    }

    /// Run the pipeline on the source node only, bypassing any redirector.
    pub(crate) fn dispatch_to_self(&mut self, event: &mut Event) -> TreeResult<()> {
        let id = event.source();
        self.node(id)?;

        // Stage 1: global observers.
        let category = event.category();
        let observers: Vec<Arc<dyn GlobalEventListener>> = self
            .global_listeners
            .iter()
            .filter(|entry| entry.mask.intersects(category))
            .map(|entry| Arc::clone(&entry.listener))
            .collect();
        for observer in observers {
            observer.event_dispatched(self, event);
        }
        if !self.contains(id) {
            return Ok(());
        }

        // Stage 2: input methods.
        if self.offer_to_input_context(id, event) && event.is_consumed() {
            return Ok(());
        }
        if !self.contains(id) {
            return Ok(());
        }

        // Stage 3: pre-processing.
        match &event.kind {
            EventKind::Paint(paint) => {
                let (kind, rect) = (paint.kind, paint.rect);
                self.paint_node(id, kind, rect)?;
                return Ok(());
            }
            EventKind::Focus(focus) => {
                let (kind, temporary) = (focus.kind, focus.temporary);
                self.track_focus(id, kind, temporary)?;
            }
            EventKind::Key(key) if key.kind != KeyEventKind::Typed => {
                if let Some(processor) = self.key_processor_for(id) {
                    processor.pre_process(self, event);
                    if event.is_consumed() {
                        tracing::trace!(target: targets::DISPATCH, ?id, "key claimed by pre-processing");
                        return Ok(());
                    }
                }
            }
            EventKind::Window(window) if window.kind == WindowEventKind::Closing => {
                if self.consult_closing_policy(id, ClosingStage::BeforeListeners)
                    == ClosingDecision::Abort
                {
                    return Ok(());
                }
            }
            _ => {}
        }
        if !self.contains(id) {
            return Ok(());
        }

        // Stage 4: delivery.
        let node = self.node(id)?;
        if node.new_events_only {
            if event_enabled(node, event) {
                self.process_event(id, event)?;
            }
        } else {
            self.deliver_legacy(id, event)?;
        }
        if !self.contains(id) {
            return Ok(());
        }

        // Stage 5: post-processing.
        if !event.is_consumed() {
            match &event.kind {
                EventKind::Key(key) if key.kind != KeyEventKind::Typed => {
                    if let Some(processor) = self.key_processor_for(id) {
                        processor.post_process(self, event);
                    }
                }
                EventKind::Window(window) if window.kind == WindowEventKind::Closing => {
                    self.consult_closing_policy(id, ClosingStage::AfterListeners);
                }
                _ => {}
            }
        }
        if let Some(peer) = self.nodes.get(id).and_then(|n| n.peer.native()).cloned() {
            peer.handle_event(event);
        }
        Ok(())
    }

    /// Hand the event to the behaviour, then to the listeners of its kind.
    ///
    /// Every registered listener runs even if an earlier one consumes the
    /// event. Listeners are snapshotted first, so registrations made while
    /// delivering take effect with the next event.
    pub fn process_event(&mut self, id: NodeId, event: &mut Event) -> TreeResult<()> {
        if let Some(behavior) = self.node(id)?.behavior.clone() {
            behavior.process_event(self, id, event);
        }
        let Some(node) = self.nodes.get(id) else {
            return Ok(());
        };
        let listeners = &node.listeners;
        match &event.kind {
            EventKind::Component(component) => {
                let kind = component.kind;
                for l in listeners.component.snapshot() {
                    match kind {
                        ComponentEventKind::Resized => l.component_resized(self, event),
                        ComponentEventKind::Moved => l.component_moved(self, event),
                        ComponentEventKind::Shown => l.component_shown(self, event),
                        ComponentEventKind::Hidden => l.component_hidden(self, event),
                    }
                }
            }
            EventKind::Container(container) => {
                let kind = container.kind;
                for l in listeners.container.snapshot() {
                    match kind {
                        ContainerEventKind::Added => l.component_added(self, event),
                        ContainerEventKind::Removed => l.component_removed(self, event),
                    }
                }
            }
            EventKind::Focus(focus) => {
                let kind = focus.kind;
                for l in listeners.focus.snapshot() {
                    match kind {
                        FocusEventKind::Gained => l.focus_gained(self, event),
                        FocusEventKind::Lost => l.focus_lost(self, event),
                    }
                }
            }
            EventKind::Key(key) => {
                let kind = key.kind;
                for l in listeners.key.snapshot() {
                    match kind {
                        KeyEventKind::Typed => l.key_typed(self, event),
                        KeyEventKind::Pressed => l.key_pressed(self, event),
                        KeyEventKind::Released => l.key_released(self, event),
                    }
                }
            }
            EventKind::Mouse(mouse) if mouse.kind.is_motion() => {
                let kind = mouse.kind;
                for l in listeners.mouse_motion.snapshot() {
                    if kind == MouseEventKind::Dragged {
                        l.mouse_dragged(self, event);
                    } else {
                        l.mouse_moved(self, event);
                    }
                }
            }
            EventKind::Mouse(mouse) => {
                let kind = mouse.kind;
                for l in listeners.mouse.snapshot() {
                    match kind {
                        MouseEventKind::Clicked => l.mouse_clicked(self, event),
                        MouseEventKind::Pressed => l.mouse_pressed(self, event),
                        MouseEventKind::Released => l.mouse_released(self, event),
                        MouseEventKind::Entered => l.mouse_entered(self, event),
                        MouseEventKind::Exited => l.mouse_exited(self, event),
                        MouseEventKind::Moved | MouseEventKind::Dragged => {}
                    }
                }
            }
            EventKind::InputMethod(input) => {
                let kind = input.kind;
                for l in listeners.input_method.snapshot() {
                    match kind {
                        InputMethodEventKind::TextChanged => l.text_changed(self, event),
                        InputMethodEventKind::CaretMoved => l.caret_moved(self, event),
                    }
                }
            }
            EventKind::Hierarchy(hierarchy) => match hierarchy.kind {
                HierarchyEventKind::Changed => {
                    for l in listeners.hierarchy.snapshot() {
                        l.hierarchy_changed(self, event);
                    }
                }
                kind => {
                    for l in listeners.hierarchy_bounds.snapshot() {
                        if kind == HierarchyEventKind::AncestorMoved {
                            l.ancestor_moved(self, event);
                        } else {
                            l.ancestor_resized(self, event);
                        }
                    }
                }
            },
            EventKind::Window(window) => {
                let kind = window.kind;
                for l in listeners.window.snapshot() {
                    match kind {
                        WindowEventKind::Opened => l.window_opened(self, event),
                        WindowEventKind::Closing => l.window_closing(self, event),
                        WindowEventKind::Closed => l.window_closed(self, event),
                        WindowEventKind::Activated => l.window_activated(self, event),
                        WindowEventKind::Deactivated => l.window_deactivated(self, event),
                    }
                }
            }
            EventKind::Paint(_) | EventKind::Custom(_) => {}
        }
        Ok(())
    }

    /// Offer the event to the active input context. Returns whether it was
    /// offered.
    fn offer_to_input_context(&mut self, id: NodeId, event: &mut Event) -> bool {
        if !matches!(
            event.kind,
            EventKind::InputMethod(_) | EventKind::Key(_) | EventKind::Focus(_)
        ) {
            return false;
        }
        let Some(context) = self.input_context.clone() else {
            return false;
        };
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        let wants_keys = node.event_mask.contains(EventMask::KEY)
            || node.listeners.has(ListenerCategory::Key);
        if !node.input_methods_enabled || !wants_keys {
            return false;
        }
        context.dispatch_event(self, event);
        true
    }

    /// Keep the node's focus flag and its window's focus owner current.
    fn track_focus(&mut self, id: NodeId, kind: FocusEventKind, temporary: bool) -> TreeResult<()> {
        let window = self.window_of(id);
        let node = self.node_mut(id)?;
        node.has_focus = kind == FocusEventKind::Gained;
        let Some(data) = window
            .and_then(|w| self.nodes.get_mut(w))
            .and_then(|n| n.window.as_mut())
        else {
            return Ok(());
        };
        match kind {
            FocusEventKind::Gained => data.focus_owner = Some(id),
            FocusEventKind::Lost if !temporary && data.focus_owner == Some(id) => {
                data.focus_owner = None;
            }
            FocusEventKind::Lost => {}
        }
        tracing::trace!(target: targets::FOCUS, ?id, ?kind, temporary, "focus changed");
        Ok(())
    }

    /// The processor of the nearest container, starting at `id` itself.
    fn key_processor_for(&self, id: NodeId) -> Option<Arc<dyn KeyEventProcessor>> {
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = self.nodes.get(cur)?;
            if let Some(processor) = node.container.as_ref().and_then(|c| c.key_processor.clone()) {
                return Some(processor);
            }
            current = node.parent;
        }
        None
    }

    fn consult_closing_policy(&mut self, id: NodeId, stage: ClosingStage) -> ClosingDecision {
        let policy = self
            .nodes
            .get(id)
            .and_then(|n| n.window.as_ref())
            .and_then(|w| w.closing_policy.clone());
        match policy {
            Some(policy) => {
                let decision = policy.window_closing(self, id, stage);
                tracing::debug!(target: targets::DISPATCH, ?id, ?stage, ?decision, "closing policy consulted");
                decision
            }
            None => ClosingDecision::Proceed,
        }
    }

    /// Offer the flattened event to the legacy hook of the node and then of
    /// each ancestor until one handles it.
    fn deliver_legacy(&mut self, id: NodeId, event: &mut Event) -> TreeResult<()> {
        let node = self.node(id)?;
        let mouse_events = node
            .behavior
            .as_ref()
            .and_then(|b| b.posts_old_mouse_events())
            .unwrap_or(self.config.legacy_mouse_events);
        let Some(mut legacy) = LegacyEvent::from_event(event, mouse_events) else {
            return Ok(());
        };

        let mut target = Some(id);
        while let Some(current) = target {
            let Some(node) = self.nodes.get(current) else {
                break;
            };
            let (parent, offset) = (node.parent, node.bounds.origin());
            if let Some(behavior) = node.behavior.clone()
                && behavior.handle_event(self, &mut legacy)
            {
                event.consume();
                break;
            }
            if let Some(parent) = parent {
                legacy.translate_to(parent, offset.x, offset.y);
            }
            target = parent;
        }
        legacy.mirror_into(event);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Painting
    // ---------------------------------------------------------------------

    fn paint_node(&mut self, id: NodeId, kind: PaintEventKind, rect: Rect) -> TreeResult<()> {
        let node = self.node(id)?;
        let (graphics, offset) = match &node.peer {
            Peer::Native(peer) => (peer.graphics(), None),
            Peer::Lightweight => {
                let Some(host) = self.native_host(id) else {
                    return Ok(());
                };
                let graphics = self.node(host)?.peer.native().and_then(|p| p.graphics());
                (graphics, Some(self.native_bounds(id).origin()))
            }
            Peer::None => return Ok(()),
        };
        let Some(mut graphics) = graphics else {
            return Ok(());
        };
        if let Some(offset) = offset {
            graphics.translate(offset.x, offset.y);
        }
        graphics.set_clip(rect);
        self.paint_subtree(id, kind, graphics.as_mut());
        Ok(())
    }

    /// Paint `id`, then its visible lightweight children from back to front,
    /// each translated into its own coordinates and clipped to its bounds.
    fn paint_subtree(&self, id: NodeId, kind: PaintEventKind, graphics: &mut dyn Graphics) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if let Some(behavior) = node.behavior.as_ref() {
            match kind {
                PaintEventKind::Paint => behavior.paint(self, id, graphics),
                PaintEventKind::Update => behavior.update(self, id, graphics),
            }
        }
        for &child in node.children().iter().rev() {
            let Some(c) = self.nodes.get(child) else {
                continue;
            };
            if !c.visible || !c.is_lightweight() {
                continue;
            }
            let saved = graphics.clip();
            let clip = match saved {
                Some(clip) => match clip.intersection(&c.bounds) {
                    Some(clip) => clip,
                    None => continue,
                },
                None => c.bounds,
            };
            graphics.translate(c.bounds.x, c.bounds.y);
            graphics.set_clip(clip.translated(-c.bounds.x, -c.bounds.y));
            self.paint_subtree(child, kind, graphics);
            graphics.translate(-c.bounds.x, -c.bounds.y);
            if let Some(saved) = saved {
                graphics.set_clip(saved);
            }
        }
    }
}

/// Whether the node has asked for the event's category, by mask or by
/// registering a listener. Application-defined events are always enabled.
fn event_enabled(node: &Node, event: &Event) -> bool {
    if event.is_custom() {
        return true;
    }
    let category = event.category();
    node.event_mask.intersects(category) || node.listeners.mask().intersects(category)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::appearance::Color;
    use crate::behavior::{Behavior, ClosingPolicy};
    use crate::config::TreeConfig;
    use crate::event::{CustomEvent, KeyEvent, MouseEvent, RESERVED_ID_MAX};
    use crate::headless::{GraphicsOp, HeadlessToolkit, PeerCall};
    use crate::listener::{KeyListener, Listener, MouseListener, WindowListener};
    use crate::event::Modifiers;
    use crate::tree::Tree;
    use bough_core::Size;

    fn setup() -> (Arc<HeadlessToolkit>, Tree) {
        let toolkit = Arc::new(HeadlessToolkit::new());
        (toolkit.clone(), Tree::with_config(toolkit, TreeConfig::strict()))
    }

    #[derive(Default)]
    struct Journal(Mutex<Vec<String>>);

    impl Journal {
        fn push(&self, entry: impl Into<String>) {
            self.0.lock().push(entry.into());
        }
        fn entries(&self) -> Vec<String> {
            self.0.lock().clone()
        }
    }

    struct Keys(Arc<Journal>, &'static str);
    impl KeyListener for Keys {
        fn key_pressed(&self, _tree: &mut Tree, _event: &mut Event) {
            self.0.push(format!("{} pressed", self.1));
        }
    }

    struct Shortcuts(Arc<Journal>, bool);
    impl KeyEventProcessor for Shortcuts {
        fn pre_process(&self, _tree: &mut Tree, event: &mut Event) {
            self.0.push("pre");
            if self.1 {
                event.consume();
            }
        }
        fn post_process(&self, _tree: &mut Tree, _event: &mut Event) {
            self.0.push("post");
        }
    }

    #[test]
    fn key_events_pass_through_processor_and_listeners() {
        let (_, mut tree) = setup();
        let journal = Arc::new(Journal::default());
        let root = tree.create_container();
        let field = tree.create_component();
        tree.add(root, field, None, None).unwrap();
        tree.set_key_processor(root, Some(Arc::new(Shortcuts(journal.clone(), false))))
            .unwrap();
        tree.add_listener(field, Listener::Key(Arc::new(Keys(journal.clone(), "a"))))
            .unwrap();
        tree.add_listener(field, Listener::Key(Arc::new(Keys(journal.clone(), "b"))))
            .unwrap();

        let mut event = Event::key(field, KeyEvent::new(KeyEventKind::Pressed, 65, Some('a')));
        tree.dispatch_event(&mut event).unwrap();
        assert_eq!(journal.entries(), vec!["pre", "a pressed", "b pressed", "post"]);
    }

    #[test]
    fn consumed_pre_processing_stops_delivery() {
        let (_, mut tree) = setup();
        let journal = Arc::new(Journal::default());
        let root = tree.create_container();
        tree.set_key_processor(root, Some(Arc::new(Shortcuts(journal.clone(), true))))
            .unwrap();
        tree.add_listener(root, Listener::Key(Arc::new(Keys(journal.clone(), "root"))))
            .unwrap();

        let mut event = Event::key(root, KeyEvent::new(KeyEventKind::Pressed, 65, None));
        tree.dispatch_event(&mut event).unwrap();
        assert!(event.is_consumed());
        assert_eq!(journal.entries(), vec!["pre"]);
    }

    struct Veto;
    impl ClosingPolicy for Veto {
        fn window_closing(&self, _tree: &mut Tree, _window: NodeId, stage: ClosingStage) -> ClosingDecision {
            match stage {
                ClosingStage::BeforeListeners => ClosingDecision::Abort,
                ClosingStage::AfterListeners => ClosingDecision::Proceed,
            }
        }
    }

    struct Closing(Arc<Journal>);
    impl WindowListener for Closing {
        fn window_closing(&self, _tree: &mut Tree, _event: &mut Event) {
            self.0.push("closing");
        }
    }

    #[test]
    fn closing_policy_can_abort() {
        let (_, mut tree) = setup();
        let journal = Arc::new(Journal::default());
        let window = tree.create_window();
        tree.add_listener(window, Listener::Window(Arc::new(Closing(journal.clone()))))
            .unwrap();

        let mut event = Event::window(window, WindowEventKind::Closing);
        tree.dispatch_event(&mut event).unwrap();
        assert_eq!(journal.entries(), vec!["closing"]);

        tree.set_closing_policy(window, Some(Arc::new(Veto))).unwrap();
        let mut event = Event::window(window, WindowEventKind::Closing);
        tree.dispatch_event(&mut event).unwrap();
        assert_eq!(journal.entries(), vec!["closing"]);
    }

    struct LegacyPresses(Arc<Journal>);
    impl Behavior for LegacyPresses {
        fn handle_event(&self, _tree: &mut Tree, event: &mut LegacyEvent) -> bool {
            self.0.push(format!("{:?} at {},{}", event.id, event.x, event.y));
            event.modifiers |= Modifiers::SHIFT;
            true
        }
    }

    #[test]
    fn legacy_hook_sees_translated_events() {
        let (_, mut tree) = setup();
        let journal = Arc::new(Journal::default());
        let root = tree.create_container();
        let leaf = tree.create_component();
        tree.set_behavior(root, Some(Arc::new(LegacyPresses(journal.clone()))))
            .unwrap();
        tree.set_bounds(leaf, Rect::new(10, 20, 5, 5)).unwrap();
        tree.add(root, leaf, None, None).unwrap();

        let mut event = Event::mouse(leaf, MouseEvent::new(MouseEventKind::Pressed, 1, 2));
        tree.dispatch_event(&mut event).unwrap();
        assert!(event.is_consumed());
        assert_eq!(journal.entries(), vec!["MouseDown at 11,22"]);

        let mut key = Event::key(leaf, KeyEvent::new(KeyEventKind::Pressed, 65, Some('a')));
        tree.dispatch_event(&mut key).unwrap();
        assert!(key.as_key().unwrap().modifiers.contains(Modifiers::SHIFT));
    }

    struct Quiet;
    impl MouseListener for Quiet {}

    #[test]
    fn disabled_categories_are_not_delivered_in_new_mode() {
        let (toolkit, mut tree) = setup();
        let journal = Arc::new(Journal::default());
        let window = tree.create_window();
        tree.add_listener(window, Listener::Mouse(Arc::new(Quiet))).unwrap();
        tree.add_listener(window, Listener::Key(Arc::new(Keys(journal.clone(), "w"))))
            .unwrap();
        tree.add_notify(window);
        let peer = toolkit.peer_for(window).unwrap();
        peer.clear_calls();

        let mut event = Event::window(window, WindowEventKind::Activated);
        tree.dispatch_event(&mut event).unwrap();
        assert!(journal.entries().is_empty());
        // The peer still sees every event.
        assert_eq!(peer.calls(), vec![PeerCall::HandleEvent(event.id())]);
    }

    struct Customs(Arc<Journal>);
    impl Behavior for Customs {
        fn process_event(&self, _tree: &mut Tree, _node: NodeId, event: &mut Event) {
            match &event.kind {
                EventKind::Custom(custom) => self.0.push(format!(
                    "custom {} {:?}",
                    custom.id(),
                    custom.downcast_ref::<u8>()
                )),
                _ => self.0.push(format!("event {}", event.id())),
            }
        }
    }

    #[test]
    fn custom_events_reach_nodes_that_enabled_nothing_for_them() {
        let (_, mut tree) = setup();
        let journal = Arc::new(Journal::default());
        let node = tree.create_component();
        tree.add_listener(node, Listener::Key(Arc::new(Keys(journal.clone(), "n"))))
            .unwrap();
        tree.set_behavior(node, Some(Arc::new(Customs(journal.clone()))))
            .unwrap();

        let mut mouse = Event::mouse(node, MouseEvent::new(MouseEventKind::Pressed, 1, 1));
        tree.dispatch_event(&mut mouse).unwrap();
        assert!(journal.entries().is_empty());

        let mut custom = Event::new(node, EventKind::Custom(CustomEvent::new(4000, 7u8)));
        assert!(custom.id() > RESERVED_ID_MAX);
        tree.dispatch_event(&mut custom).unwrap();
        assert_eq!(journal.entries(), vec!["custom 6000 Some(7)"]);
    }

    struct Boxed(Color);
    impl Behavior for Boxed {
        fn paint(&self, tree: &Tree, node: NodeId, graphics: &mut dyn Graphics) {
            let size: Size = tree.size(node).unwrap_or_default();
            graphics.set_color(self.0);
            graphics.fill_rect(Rect::new(0, 0, size.width, size.height));
        }
    }

    #[test]
    fn paint_walks_lightweight_children_back_to_front() {
        let (toolkit, mut tree) = setup();
        let window = tree.create_window();
        let front = tree.create_component();
        let back = tree.create_component();
        tree.set_behavior(front, Some(Arc::new(Boxed(Color::WHITE)))).unwrap();
        tree.set_behavior(back, Some(Arc::new(Boxed(Color::BLACK)))).unwrap();
        tree.set_bounds(window, Rect::new(0, 0, 100, 100)).unwrap();
        tree.set_bounds(front, Rect::new(10, 10, 20, 20)).unwrap();
        tree.set_bounds(back, Rect::new(20, 20, 20, 20)).unwrap();
        tree.add(window, front, None, None).unwrap();
        tree.add(window, back, None, None).unwrap();
        tree.add_notify(window);

        let mut event = Event::paint(window, PaintEventKind::Paint, Rect::new(0, 0, 100, 100));
        tree.dispatch_event(&mut event).unwrap();
        let fills: Vec<_> = toolkit
            .peer_for(window)
            .unwrap()
            .painted()
            .into_iter()
            .filter(|op| matches!(op, GraphicsOp::FillRect(_) | GraphicsOp::SetColor(_)))
            .collect();
        assert_eq!(
            fills,
            vec![
                GraphicsOp::SetColor(Color::BLACK),
                GraphicsOp::FillRect(Rect::new(20, 20, 20, 20)),
                GraphicsOp::SetColor(Color::WHITE),
                GraphicsOp::FillRect(Rect::new(10, 10, 20, 20)),
            ]
        );
    }
}
