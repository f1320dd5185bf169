//! Input redirection from native hosts to lightweight descendants.
//!
//! Lightweight nodes have no native window, so the window system delivers
//! their input to the nearest native container. Each materialized native
//! container owns a [`LightweightRedirector`] that decides which lightweight
//! descendant an event is really for and re-dispatches it there:
//!
//! - mouse events go to the node under the pointer, or to the node where a
//!   drag started until the button is released
//! - enter and exit events are synthesized as the pointer crosses node
//!   boundaries, including during drags that started over another host
//! - key and focus events go to the lightweight node holding focus
//!
//! The redirector only holds state. The logic lives in an `impl Tree` block
//! because every decision needs to walk the tree.

use bough_core::Rect;
use bough_core::logging::targets;

use crate::appearance::CursorShape;
use crate::error::TreeResult;
use crate::event::{Event, EventKind, EventMask, FocusEventKind, MouseEventKind};
use crate::peer::Peer;
use crate::tree::{NodeId, Tree};

/// Redirection state of one native host.
#[derive(Debug, Clone, Default)]
pub(crate) struct LightweightRedirector {
    pub(crate) host: NodeId,
    /// Categories requested by lightweight descendants.
    pub(crate) event_mask: EventMask,
    /// The lightweight descendant holding focus.
    pub(crate) focus: Option<NodeId>,
    /// Focus requests made while an earlier request is still being settled.
    pub(crate) focus_stack: Vec<NodeId>,
    /// Where mouse events currently go.
    pub(crate) mouse_target: Option<NodeId>,
    /// The node most recently sent an enter event.
    pub(crate) last_entered: Option<NodeId>,
    pub(crate) dragging: bool,
    /// The target changed between press and release; swallow the click.
    pub(crate) orphaned_click: bool,
    /// Whether the pointer is logically inside the host.
    pub(crate) in_host: bool,
    /// The host's cursor, saved while a lightweight target shows its own.
    pub(crate) native_cursor: Option<CursorShape>,
}

impl LightweightRedirector {
    pub(crate) fn new(host: NodeId) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }
}

/// What drives an enter/exit tracking step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    /// A native mouse event on the host.
    Native(MouseEventKind),
    /// A drag that started over another host passed over this one.
    DraggedOver,
}

impl Tree {
    fn redirector(&self, host: NodeId) -> Option<&LightweightRedirector> {
        self.nodes
            .get(host)?
            .container
            .as_ref()?
            .redirector
            .as_ref()
    }

    fn redirector_mut(&mut self, host: NodeId) -> Option<&mut LightweightRedirector> {
        self.nodes
            .get_mut(host)?
            .container
            .as_mut()?
            .redirector
            .as_mut()
    }

    /// Offer a native event to the host's redirector. Returns `true` when
    /// the event was forwarded to a lightweight descendant.
    pub(crate) fn redirect(&mut self, host: NodeId, event: &mut Event) -> TreeResult<bool> {
        let Some(rd) = self.redirector(host) else {
            return Ok(false);
        };
        let mask = rd.event_mask;
        if !mask.intersects(EventMask::PROXY) {
            return Ok(false);
        }
        match &event.kind {
            EventKind::Mouse(_) if mask.intersects(EventMask::ANY_MOUSE) => {
                self.process_mouse(host, event)
            }
            EventKind::Focus(focus) => {
                let permanent_loss = focus.kind == FocusEventKind::Lost && !focus.temporary;
                let Some(target) = self.live_focus(host) else {
                    return Ok(false);
                };
                let mut retargeted = event.retargeted(target, event.kind.clone());
                self.dispatch_event(&mut retargeted)?;
                if permanent_loss && let Some(rd) = self.redirector_mut(host) {
                    rd.focus = None;
                }
                Ok(true)
            }
            EventKind::Key(_) => {
                let Some(target) = self.live_focus(host) else {
                    return Ok(false);
                };
                let mut retargeted = event.retargeted(target, event.kind.clone());
                self.dispatch_event(&mut retargeted)?;
                retargeted_key_back(&retargeted, event);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// The focused lightweight node, if it still lives under the host.
    fn live_focus(&mut self, host: NodeId) -> Option<NodeId> {
        let focus = self.redirector(host)?.focus?;
        if self.is_ancestor_of(host, focus).unwrap_or(false) {
            Some(focus)
        } else {
            if let Some(rd) = self.redirector_mut(host) {
                rd.focus = None;
            }
            None
        }
    }

    fn process_mouse(&mut self, host: NodeId, event: &mut Event) -> TreeResult<bool> {
        let Some(mouse) = event.as_mouse() else {
            return Ok(false);
        };
        let (kind, x, y) = (mouse.kind, mouse.x, mouse.y);
        let over = self.mouse_event_target(host, x, y, true);

        if kind != MouseEventKind::Released {
            self.track_mouse_enter_exit(host, over, Motion::Native(kind), event)?;
        }

        let Some(rd) = self.redirector(host) else {
            return Ok(event.is_consumed());
        };
        if rd.mouse_target.is_none()
            && matches!(kind, MouseEventKind::Moved | MouseEventKind::Pressed)
        {
            self.set_mouse_target(host, over);
        }

        let Some(rd) = self.redirector(host) else {
            return Ok(event.is_consumed());
        };
        if let Some(target) = rd.mouse_target {
            let (dragging, orphaned) = (rd.dragging, rd.orphaned_click);
            match kind {
                MouseEventKind::Entered => {}
                MouseEventKind::Exited => {
                    if !dragging {
                        self.set_mouse_target(host, None);
                    }
                }
                MouseEventKind::Pressed => {
                    if let Some(rd) = self.redirector_mut(host) {
                        rd.dragging = true;
                        rd.orphaned_click = false;
                    }
                    self.retarget_mouse(host, target, kind, event)?;
                }
                MouseEventKind::Dragged => {
                    if dragging {
                        self.retarget_mouse(host, target, kind, event)?;
                    }
                }
                MouseEventKind::Released => {
                    if let Some(rd) = self.redirector_mut(host) {
                        rd.dragging = false;
                    }
                    self.retarget_mouse(host, target, kind, event)?;
                    // The release handler may have moved or hidden the target.
                    let now = self.mouse_event_target(host, x, y, true);
                    if now != Some(target) {
                        if let Some(rd) = self.redirector_mut(host) {
                            rd.orphaned_click = true;
                        }
                        self.set_mouse_target(host, now);
                    }
                }
                MouseEventKind::Clicked => {
                    if orphaned {
                        if let Some(rd) = self.redirector_mut(host) {
                            rd.orphaned_click = false;
                        }
                    } else {
                        self.retarget_mouse(host, target, kind, event)?;
                    }
                }
                MouseEventKind::Moved => {
                    self.set_mouse_target(host, over);
                    if let Some(over) = over {
                        self.retarget_mouse(host, over, kind, event)?;
                    }
                }
            }
            event.consume();
        }

        if kind == MouseEventKind::Released && self.contains(host) {
            let now = self.mouse_event_target(host, x, y, true);
            self.track_mouse_enter_exit(host, now, Motion::Native(kind), event)?;
        }
        Ok(event.is_consumed())
    }

    /// Synthesize enter and exit events as the pointer moves between nodes.
    fn track_mouse_enter_exit(
        &mut self,
        host: NodeId,
        over: Option<NodeId>,
        motion: Motion,
        event: &mut Event,
    ) -> TreeResult<()> {
        let Some((x, y)) = event.as_mouse().map(|m| (m.x, m.y)) else {
            return Ok(());
        };
        let host_area = Rect::from_origin_size(Default::default(), self.node(host)?.bounds.size());
        let Some(rd) = self.redirector_mut(host) else {
            return Ok(());
        };

        let entering = !matches!(
            motion,
            Motion::Native(MouseEventKind::Exited | MouseEventKind::Dragged) | Motion::DraggedOver
        );
        let mut observe = None;
        if entering && !rd.in_host {
            rd.in_host = true;
            observe = Some(true);
        } else if motion == Motion::Native(MouseEventKind::Exited) {
            rd.in_host = false;
            observe = Some(false);
        }

        // A drag keeps the pointer grabbed by the node it started on.
        let grabbed = rd.dragging
            && matches!(
                motion,
                Motion::Native(MouseEventKind::Dragged | MouseEventKind::Exited)
                    | Motion::DraggedOver
            );
        let target_enter = if rd.in_host && host_area.contains(x, y) {
            Some(over.unwrap_or(host))
        } else {
            None
        };
        let last = rd.last_entered;
        if !grabbed && last != target_enter {
            rd.last_entered = target_enter;
        }

        match observe {
            Some(true) => {
                if !self.drag_observers.contains(&host) {
                    self.drag_observers.push(host);
                }
            }
            Some(false) => self.drag_observers.retain(|&h| h != host),
            None => {}
        }
        if grabbed || last == target_enter {
            return Ok(());
        }
        tracing::trace!(target: targets::REDIRECTOR, ?host, ?last, ?target_enter, "pointer crossed");

        if let Some(old) = last
            && old != host
        {
            self.retarget_mouse(host, old, MouseEventKind::Exited, event)?;
        }
        if target_enter.is_none() {
            self.retarget_mouse(host, host, MouseEventKind::Exited, event)?;
        }
        if motion == Motion::Native(MouseEventKind::Exited) {
            event.consume();
        }
        if last.is_none() {
            self.retarget_mouse(host, host, MouseEventKind::Entered, event)?;
        }
        if let Some(new) = target_enter
            && new != host
        {
            self.retarget_mouse(host, new, MouseEventKind::Entered, event)?;
        }
        if motion == Motion::Native(MouseEventKind::Entered) {
            event.consume();
        }
        Ok(())
    }

    /// Tell every other host observing drags that the pointer is dragging
    /// over it.
    pub(crate) fn report_foreign_drag(&mut self, event: &Event) {
        let Some(mouse) = event.as_mouse() else {
            return;
        };
        if mouse.kind != MouseEventKind::Dragged || self.drag_observers.is_empty() {
            return;
        }
        let source = event.source();
        if !matches!(self.nodes.get(source).map(|n| &n.peer), Some(Peer::Native(_))) {
            return;
        }
        let Ok(origin) = self.location_on_screen(source) else {
            return;
        };
        let screen = origin.translated(mouse.x, mouse.y);

        for observer in self.drag_observers.clone() {
            if observer == source || self.is_ancestor_of(observer, source).unwrap_or(false) {
                continue;
            }
            let Ok(corner) = self.location_on_screen(observer) else {
                continue;
            };
            let mut moved = mouse.clone();
            moved.x = screen.x - corner.x;
            moved.y = screen.y - corner.y;
            let over = self.mouse_event_target(observer, moved.x, moved.y, true);
            let mut proxy = event.retargeted(observer, EventKind::Mouse(moved));
            if let Err(error) = self.track_mouse_enter_exit(observer, over, Motion::DraggedOver, &mut proxy) {
                tracing::warn!(target: targets::REDIRECTOR, ?observer, %error, "drag tracking failed");
            }
        }
    }

    /// Re-send `src` to `target` as a `kind` event, in the target's
    /// coordinates. Targets no longer under the host are skipped.
    fn retarget_mouse(
        &mut self,
        host: NodeId,
        target: NodeId,
        kind: MouseEventKind,
        src: &Event,
    ) -> TreeResult<()> {
        let Some(mouse) = src.as_mouse() else {
            return Ok(());
        };
        let Some((x, y)) = self.translate_from_host(host, target, mouse.x, mouse.y) else {
            tracing::trace!(target: targets::REDIRECTOR, ?target, "target left the host; not retargeting");
            return Ok(());
        };
        let mut retargeted_mouse = mouse.clone();
        retargeted_mouse.kind = kind;
        retargeted_mouse.x = x;
        retargeted_mouse.y = y;
        let mut retargeted = src.retargeted(target, EventKind::Mouse(retargeted_mouse));
        if target == host {
            self.dispatch_to_self(&mut retargeted)?;
        } else {
            self.dispatch_event(&mut retargeted)?;
        }

        // After delivery, so the target may change its cursor in response.
        if self.contains(target)
            && let Ok(cursor) = self.cursor(target)
            && let Some(peer) = self.nodes.get(host).and_then(|n| n.peer.native())
        {
            peer.set_cursor(cursor);
        }
        Ok(())
    }

    /// Map host coordinates into `target`'s, or `None` if `target` is not
    /// (or no longer) inside `host`.
    fn translate_from_host(&self, host: NodeId, target: NodeId, x: i32, y: i32) -> Option<(i32, i32)> {
        let (mut x, mut y) = (x, y);
        let mut current = target;
        while current != host {
            let node = self.nodes.get(current)?;
            x -= node.bounds.x;
            y -= node.bounds.y;
            current = node.parent?;
        }
        Some((x, y))
    }

    /// Change the mouse target, stashing the host cursor when the first
    /// target appears and restoring it when the last one goes.
    fn set_mouse_target(&mut self, host: NodeId, target: Option<NodeId>) {
        let host_cursor = self.cursor(host).unwrap_or_default();
        let peer = self.nodes.get(host).and_then(|n| n.peer.native()).cloned();
        let Some(rd) = self.redirector_mut(host) else {
            return;
        };
        if rd.mouse_target == target {
            return;
        }
        if rd.mouse_target.is_none() {
            rd.native_cursor = Some(host_cursor);
        }
        rd.mouse_target = target;
        if target.is_none()
            && let Some(cursor) = rd.native_cursor.take()
            && let Some(peer) = peer
        {
            peer.set_cursor(cursor);
        }
        tracing::trace!(target: targets::REDIRECTOR, ?host, ?target, "mouse target changed");
    }

    /// Settle a focus request from a lightweight descendant of `host`.
    ///
    /// Returns whether the host's peer must still ask the window system for
    /// focus. When it need not, focus lost and gained events are synthesized
    /// here. A request made while an earlier one is being settled only
    /// records the requester; the earlier call hands focus to the most
    /// recent requester when it finishes.
    pub(crate) fn set_focus_request(&mut self, host: NodeId, requester: NodeId) -> TreeResult<bool> {
        let Some(rd) = self.redirector_mut(host) else {
            return Ok(true);
        };
        rd.focus_stack.push(requester);
        if rd.focus_stack.len() > 1 {
            return Ok(false);
        }
        let current = rd.focus;

        let owner = match self.window_of(host) {
            Some(window) => self.focus_owner(window)?,
            None => None,
        };
        let needs_request = match owner {
            None => true,
            Some(owner) if owner == requester => false,
            Some(owner) if owner == host => {
                let mut lost = Event::focus(host, FocusEventKind::Lost, false);
                self.dispatch_to_self(&mut lost)?;
                false
            }
            Some(owner) if Some(owner) == current => {
                let mut lost = Event::focus(owner, FocusEventKind::Lost, false);
                self.dispatch_event(&mut lost)?;
                false
            }
            Some(_) => true,
        };

        let Some(rd) = self.redirector_mut(host) else {
            return Ok(needs_request);
        };
        let winner = rd.focus_stack.last().copied().unwrap_or(requester);
        rd.focus_stack.clear();
        rd.focus = Some(winner);
        tracing::debug!(target: targets::FOCUS, ?host, ?winner, needs_request, "lightweight focus request");

        if !needs_request && owner != Some(winner) {
            let mut gained = Event::focus(winner, FocusEventKind::Gained, false);
            self.dispatch_event(&mut gained)?;
        }
        Ok(needs_request)
    }

    /// The lightweight node that should receive mouse input at `(x, y)` in
    /// `container`'s coordinates.
    ///
    /// A visible native child under the point wins and yields `None`, since
    /// it receives its own input. Otherwise children are searched front to
    /// back for a node interested in mouse input.
    pub(crate) fn mouse_event_target(
        &self,
        container: NodeId,
        x: i32,
        y: i32,
        include_self: bool,
    ) -> Option<NodeId> {
        let node = self.nodes.get(container)?;
        let hit = |child: &NodeId| {
            self.nodes
                .get(*child)
                .filter(|c| c.visible && c.bounds.contains(x, y))
        };
        if node
            .children()
            .iter()
            .filter_map(hit)
            .any(|c| !c.is_lightweight())
        {
            return None;
        }
        for &child in node.children() {
            let Some(c) = hit(&child) else {
                continue;
            };
            if c.kind.is_container() {
                if let Some(found) =
                    self.mouse_event_target(child, x - c.bounds.x, y - c.bounds.y, true)
                {
                    return Some(found);
                }
            } else if c.wants_mouse() {
                return Some(child);
            }
        }
        (include_self && node.wants_mouse()).then_some(container)
    }

    /// Drop every reference the host's redirector holds to `id`.
    pub(crate) fn forget_redirect_target(&mut self, host: NodeId, id: NodeId) {
        let Some(rd) = self.redirector_mut(host) else {
            return;
        };
        if rd.focus == Some(id) {
            rd.focus = None;
        }
        if rd.last_entered == Some(id) {
            rd.last_entered = None;
        }
        rd.focus_stack.retain(|&n| n != id);
        if rd.mouse_target == Some(id) {
            rd.dragging = false;
            self.set_mouse_target(host, None);
        }
    }
}

/// Copy key mutations made by the focused node back into the host's event.
fn retargeted_key_back(retargeted: &Event, original: &mut Event) {
    if let (Some(from), Some(to)) = (retargeted.as_key(), original.as_key_mut()) {
        to.key_char = from.key_char;
        to.modifiers = from.modifiers;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::TreeConfig;
    use crate::headless::HeadlessToolkit;
    use crate::listener::{Listener, MouseListener};

    struct Quiet;
    impl MouseListener for Quiet {}

    fn hosted() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::with_config(Arc::new(HeadlessToolkit::new()), TreeConfig::strict());
        let window = tree.create_window();
        let panel = tree.create_container();
        let button = tree.create_component();
        tree.set_bounds(window, Rect::new(0, 0, 200, 200)).unwrap();
        tree.set_bounds(panel, Rect::new(50, 50, 100, 100)).unwrap();
        tree.set_bounds(button, Rect::new(10, 10, 20, 20)).unwrap();
        tree.add(window, panel, None, None).unwrap();
        tree.add(panel, button, None, None).unwrap();
        tree.add_listener(button, Listener::Mouse(Arc::new(Quiet))).unwrap();
        tree.set_visible(window, true).unwrap();
        (tree, window, panel, button)
    }

    #[test]
    fn hit_testing_descends_into_lightweight_containers() {
        let (tree, window, _, button) = hosted();
        assert_eq!(tree.mouse_event_target(window, 65, 65, true), Some(button));
        assert_eq!(tree.mouse_event_target(window, 5, 5, true), None);
    }

    #[test]
    fn native_children_win_hit_tests() {
        let (mut tree, window, _, _) = hosted();
        let canvas = tree.create_native_component();
        tree.set_bounds(canvas, Rect::new(55, 55, 10, 10)).unwrap();
        tree.add(window, canvas, None, Some(1)).unwrap();
        assert_eq!(tree.mouse_event_target(window, 58, 58, true), None);
        assert!(tree.mouse_event_target(window, 65, 65, true).is_some());
    }

    #[test]
    fn listener_on_lightweight_is_proxied_to_host() {
        let (tree, window, _, _) = hosted();
        let mask = tree.redirector(window).unwrap().event_mask;
        assert!(mask.contains(EventMask::MOUSE));
    }

    #[test]
    fn removing_target_clears_redirector_state() {
        let (mut tree, window, panel, button) = hosted();
        let mut press = Event::mouse(window, crate::event::MouseEvent::new(MouseEventKind::Pressed, 65, 65));
        tree.dispatch_event(&mut press).unwrap();
        assert!(press.is_consumed());
        assert_eq!(tree.redirector(window).unwrap().mouse_target, Some(button));

        tree.remove(panel, button).unwrap();
        let rd = tree.redirector(window).unwrap();
        assert_eq!(rd.mouse_target, None);
        assert_eq!(rd.last_entered, None);
        assert!(!rd.dragging);
    }
}
