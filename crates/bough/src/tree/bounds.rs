//! Geometry, visibility, validation and size queries.

use bough_core::logging::{PerfSpan, span_names, targets};
use bough_core::{Point, Rect, Size};

use crate::error::TreeResult;
use crate::event::{ComponentEventKind, Event, EventMask, WindowEventKind};
use crate::listener::ListenerCategory;
use crate::peer::Peer;

use super::{NodeId, NodeKind, Tree};

impl Tree {
    /// Bounds relative to the parent. Window bounds are screen coordinates.
    pub fn bounds(&self, id: NodeId) -> TreeResult<Rect> {
        Ok(self.node(id)?.bounds)
    }

    /// Position relative to the parent.
    pub fn location(&self, id: NodeId) -> TreeResult<Point> {
        Ok(self.node(id)?.bounds.origin())
    }

    /// Current size.
    pub fn size(&self, id: NodeId) -> TreeResult<Size> {
        Ok(self.node(id)?.bounds.size())
    }

    /// Move without resizing.
    pub fn set_location(&mut self, id: NodeId, x: i32, y: i32) -> TreeResult<()> {
        let size = self.size(id)?;
        self.set_bounds(id, Rect::new(x, y, size.width, size.height))
    }

    /// Resize without moving.
    pub fn set_size(&mut self, id: NodeId, width: i32, height: i32) -> TreeResult<()> {
        let origin = self.location(id)?;
        self.set_bounds(id, Rect::new(origin.x, origin.y, width, height))
    }

    /// Move and resize.
    ///
    /// Unchanged bounds are a no-op. A size change invalidates the node and
    /// a valid parent. Resize and move notifications are posted to the
    /// toolkit when the node listens for them; otherwise containers notify
    /// their bounds-listening descendants directly.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) -> TreeResult<()> {
        let node = self.node(id)?;
        let old = node.bounds;
        if old == bounds {
            return Ok(());
        }
        let resized = old.size() != bounds.size();
        let moved = old.origin() != bounds.origin();
        let repaint_lightweight = node.peer.is_lightweight() && node.visible;

        if repaint_lightweight {
            self.repaint_in_parent(id, old);
        }
        self.node_mut(id)?.bounds = bounds;
        if let Some(peer) = self.node(id)?.peer.native().cloned() {
            peer.set_bounds(self.native_bounds(id));
        }
        if resized {
            self.invalidate(id)?;
            self.notify_component(id, ComponentEventKind::Resized)?;
        }
        if moved {
            self.notify_component(id, ComponentEventKind::Moved)?;
            self.relocate_bridged(id);
        }
        if repaint_lightweight {
            self.repaint_in_parent(id, bounds);
        }
        tracing::trace!(target: targets::TREE, ?id, %bounds, resized, moved, "bounds changed");
        Ok(())
    }

    /// Whether the node's own visible flag is set.
    pub fn is_visible(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.visible)
    }

    /// Show or hide the node.
    ///
    /// Showing a window for the first time materializes and validates it.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> TreeResult<()> {
        let node = self.node(id)?;
        if node.visible == visible {
            return Ok(());
        }
        let is_window = node.kind == NodeKind::Window;

        if visible {
            if is_window {
                if !self.node(id)?.peer.is_some() {
                    self.add_notify(id);
                }
                self.validate(id)?;
            }
            self.node_mut(id)?.visible = true;
            if let Some(peer) = self.node(id)?.peer.native().cloned() {
                peer.show();
            }
            self.fire_showing_changed(id)?;
            if self.node(id)?.peer.is_lightweight() {
                self.repaint(id)?;
            }
            self.notify_component(id, ComponentEventKind::Shown)?;
        } else {
            if let Some(peer) = self.node(id)?.peer.native().cloned() {
                peer.hide();
            }
            self.node_mut(id)?.visible = false;
            self.fire_showing_changed(id)?;
            let node = self.node(id)?;
            if node.peer.is_lightweight() {
                self.repaint_in_parent(id, node.bounds);
            }
            self.notify_component(id, ComponentEventKind::Hidden)?;
        }

        self.invalidate_valid_parent(id)?;
        self.sync_bridged_visibility(id);

        if visible && is_window {
            let first = self
                .node_mut(id)?
                .window
                .as_mut()
                .is_some_and(|window| !std::mem::replace(&mut window.opened, true));
            if first {
                self.toolkit
                    .post_event(Event::window(id, WindowEventKind::Opened));
            }
        }
        Ok(())
    }

    /// Whether the node accepts input.
    pub fn is_enabled(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.enabled)
    }

    /// Enable or disable input.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        if node.enabled == enabled {
            return Ok(());
        }
        node.enabled = enabled;
        if let Some(peer) = node.peer.native() {
            if enabled {
                peer.enable();
            } else {
                peer.disable();
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------------

    /// Whether the node's layout is up to date.
    pub fn is_valid(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.valid)
    }

    /// Mark the node as needing layout.
    ///
    /// Clears cached sizes and propagates to the parent only while the
    /// parent is still valid, so repeated calls stop after the first node.
    pub fn invalidate(&mut self, id: NodeId) -> TreeResult<()> {
        self.node(id)?;
        let mut current = Some(id);
        while let Some(cur) = current {
            let Some(node) = self.nodes.get_mut(cur) else {
                break;
            };
            node.valid = false;
            node.clear_size_caches();
            let constrained_layout = node
                .container
                .as_ref()
                .and_then(|c| c.layout.clone());
            let parent = node.parent;
            if let Some(layout) = constrained_layout
                && let Some(constrained) = layout.constrained()
            {
                constrained.invalidate_layout(cur);
            }
            current = parent.filter(|&p| self.nodes.get(p).is_some_and(|n| n.valid));
            if let Some(parent) = current {
                tracing::trace!(target: targets::LAYOUT, ?parent, "invalidation propagates");
            }
        }
        Ok(())
    }

    pub(crate) fn invalidate_valid_parent(&mut self, id: NodeId) -> TreeResult<()> {
        if let Some(parent) = self.node(id)?.parent
            && self.node(parent)?.valid
        {
            self.invalidate(parent)?;
        }
        Ok(())
    }

    /// Bring the node up to date.
    ///
    /// Leaves synchronize their peer font. Containers lay out their children
    /// and recurse into invalid child containers.
    pub fn validate(&mut self, id: NodeId) -> TreeResult<()> {
        let node = self.node(id)?;
        if node.valid {
            return Ok(());
        }
        if node.kind.is_container() {
            let _span = PerfSpan::new(span_names::VALIDATE);
            self.validate_tree(id)
        } else {
            self.validate_self(id)
        }
    }

    fn validate_self(&mut self, id: NodeId) -> TreeResult<()> {
        let font = self.font(id)?;
        let node = self.node_mut(id)?;
        if let Peer::Native(peer) = &node.peer
            && node.peer_font != font
        {
            peer.set_font(font.as_ref());
        }
        node.peer_font = font;
        node.valid = true;
        Ok(())
    }

    fn validate_tree(&mut self, id: NodeId) -> TreeResult<()> {
        if !self.node(id)?.valid {
            self.do_layout(id)?;
            let children = self.node(id)?.children().to_vec();
            for child in children {
                let node = self.node(child)?;
                if node.kind == NodeKind::Container && !node.valid {
                    self.validate_tree(child)?;
                } else {
                    self.validate(child)?;
                }
            }
        }
        self.validate_self(id)
    }

    /// Run the container's layout strategy, if any.
    pub fn do_layout(&mut self, id: NodeId) -> TreeResult<()> {
        if let Some(layout) = self.node(id)?.container.as_ref().and_then(|c| c.layout.clone()) {
            tracing::trace!(target: targets::LAYOUT, ?id, "laying out container");
            layout.layout_container(self, id)?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Sizes
    // ---------------------------------------------------------------------

    /// The preferred size.
    ///
    /// An explicit size wins; otherwise the value is computed once and cached
    /// until the next invalidation.
    pub fn preferred_size(&self, id: NodeId) -> TreeResult<Size> {
        let node = self.node(id)?;
        if let Some(size) = node.explicit_preferred.or(node.cached_preferred.get()) {
            return Ok(size);
        }
        let layout = node.container.as_ref().and_then(|c| c.layout.clone());
        let size = if let Some(layout) = layout {
            layout.preferred_size(self, id)
        } else if let Some(size) = node
            .behavior
            .as_ref()
            .and_then(|b| b.preferred_size(self, id))
            .or_else(|| node.peer.native().and_then(|p| p.preferred_size()))
        {
            size
        } else {
            self.minimum_size(id)?
        };
        node.cached_preferred.set(Some(size));
        Ok(size)
    }

    /// The minimum size.
    pub fn minimum_size(&self, id: NodeId) -> TreeResult<Size> {
        let node = self.node(id)?;
        if let Some(size) = node.explicit_minimum.or(node.cached_minimum.get()) {
            return Ok(size);
        }
        let layout = node.container.as_ref().and_then(|c| c.layout.clone());
        let size = if let Some(layout) = layout {
            layout.minimum_size(self, id)
        } else {
            node.behavior
                .as_ref()
                .and_then(|b| b.minimum_size(self, id))
                .or_else(|| node.peer.native().and_then(|p| p.minimum_size()))
                .unwrap_or_else(|| node.bounds.size())
        };
        node.cached_minimum.set(Some(size));
        Ok(size)
    }

    /// The maximum size. Unbounded unless set explicitly or reported by an
    /// extended layout strategy.
    pub fn maximum_size(&self, id: NodeId) -> TreeResult<Size> {
        let node = self.node(id)?;
        if let Some(size) = node.explicit_maximum {
            return Ok(size);
        }
        let layout = node.container.as_ref().and_then(|c| c.layout.clone());
        Ok(layout
            .as_deref()
            .and_then(|layout| layout.constrained())
            .map(|constrained| constrained.maximum_size(self, id))
            .unwrap_or(Size::MAX))
    }

    /// Fix or clear the preferred size.
    pub fn set_preferred_size(&mut self, id: NodeId, size: Option<Size>) -> TreeResult<()> {
        self.node_mut(id)?.explicit_preferred = size;
        self.invalidate(id)
    }

    /// Fix or clear the minimum size.
    pub fn set_minimum_size(&mut self, id: NodeId, size: Option<Size>) -> TreeResult<()> {
        self.node_mut(id)?.explicit_minimum = size;
        self.invalidate(id)
    }

    /// Fix or clear the maximum size.
    pub fn set_maximum_size(&mut self, id: NodeId, size: Option<Size>) -> TreeResult<()> {
        self.node_mut(id)?.explicit_maximum = size;
        self.invalidate(id)
    }

    // ---------------------------------------------------------------------
    // Repaint
    // ---------------------------------------------------------------------

    /// Schedule a repaint of the whole node.
    pub fn repaint(&self, id: NodeId) -> TreeResult<()> {
        let size = self.size(id)?;
        self.repaint_rect(id, Rect::new(0, 0, size.width, size.height))
    }

    /// Schedule a repaint of `rect`, given in the node's coordinates.
    ///
    /// Lightweight nodes forward the request to their native ancestor.
    pub fn repaint_rect(&self, id: NodeId, rect: Rect) -> TreeResult<()> {
        let mut current = id;
        let mut rect = rect;
        loop {
            let node = self.node(current)?;
            match &node.peer {
                Peer::Native(peer) => {
                    peer.repaint(self.config.repaint_delay_ms, rect);
                    return Ok(());
                }
                Peer::Lightweight => {
                    let Some(parent) = node.parent else {
                        return Ok(());
                    };
                    rect = rect.translated(node.bounds.x, node.bounds.y);
                    current = parent;
                }
                Peer::None => return Ok(()),
            }
        }
    }

    fn repaint_in_parent(&self, id: NodeId, rect: Rect) {
        if let Some(parent) = self.nodes.get(id).and_then(|n| n.parent) {
            if let Err(error) = self.repaint_rect(parent, rect) {
                tracing::trace!(target: targets::TREE, ?parent, %error, "parent repaint skipped");
            }
        }
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    /// Bounds translated through the chain of lightweight ancestors, i.e.
    /// relative to the nearest native ancestor.
    pub(crate) fn native_bounds(&self, id: NodeId) -> Rect {
        let Some(node) = self.nodes.get(id) else {
            return Rect::ZERO;
        };
        let mut rect = node.bounds;
        let mut parent = node.parent;
        while let Some(pid) = parent {
            let Some(p) = self.nodes.get(pid) else { break };
            if !p.peer.is_lightweight() {
                break;
            }
            rect = rect.translated(p.bounds.x, p.bounds.y);
            parent = p.parent;
        }
        rect
    }

    /// Post a component notification if anything listens for it; otherwise
    /// let bounds-listening descendants know directly.
    pub(crate) fn notify_component(
        &mut self,
        id: NodeId,
        kind: ComponentEventKind,
    ) -> TreeResult<()> {
        let node = self.node(id)?;
        let wants = node.listeners.has(ListenerCategory::Component)
            || node.event_mask.contains(EventMask::COMPONENT)
            || self.global_mask().contains(EventMask::COMPONENT);
        if wants {
            self.toolkit.post_event(Event::component(id, kind));
        } else if !node.children().is_empty()
            && matches!(kind, ComponentEventKind::Resized | ComponentEventKind::Moved)
        {
            self.fire_ancestor_bounds(id, kind)?;
        }
        Ok(())
    }

    /// Move native descendants bridged through this lightweight node.
    fn relocate_bridged(&self, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        for &native in &node.bridged {
            if let Some(peer) = self.nodes.get(native).and_then(|n| n.peer.native()) {
                peer.set_bounds(self.native_bounds(native));
            }
        }
    }

    /// Show or hide native descendants bridged through this lightweight node.
    fn sync_bridged_visibility(&self, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        for &native in &node.bridged {
            let Some(target) = self.nodes.get(native) else {
                continue;
            };
            if let Some(peer) = target.peer.native() {
                if self.is_showing(native).unwrap_or(false) {
                    peer.show();
                } else if target.visible {
                    peer.hide();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::TreeConfig;
    use crate::headless::{HeadlessToolkit, PeerCall};

    fn setup() -> (Arc<HeadlessToolkit>, Tree) {
        let toolkit = Arc::new(HeadlessToolkit::new());
        let tree = Tree::with_config(toolkit.clone(), TreeConfig::strict());
        (toolkit, tree)
    }

    #[test]
    fn invalidate_stops_at_invalid_parent() {
        let (_, mut tree) = setup();
        let root = tree.create_container();
        let child = tree.create_component();
        tree.add(root, child, None, None).unwrap();
        tree.validate(root).unwrap();
        assert!(tree.is_valid(root).unwrap());
        assert!(tree.is_valid(child).unwrap());

        tree.invalidate(child).unwrap();
        assert!(!tree.is_valid(child).unwrap());
        assert!(!tree.is_valid(root).unwrap());

        tree.invalidate(child).unwrap();
        assert!(!tree.is_valid(root).unwrap());
    }

    #[test]
    fn preferred_size_is_cached_until_invalidated() {
        let (_, mut tree) = setup();
        let leaf = tree.create_component();
        tree.set_bounds(leaf, Rect::new(0, 0, 10, 10)).unwrap();
        assert_eq!(tree.preferred_size(leaf).unwrap(), Size::new(10, 10));

        // Resizing invalidates, so the next query recomputes.
        tree.set_bounds(leaf, Rect::new(0, 0, 30, 10)).unwrap();
        assert_eq!(tree.preferred_size(leaf).unwrap(), Size::new(30, 10));
    }

    #[test]
    fn explicit_sizes_win() {
        let (_, mut tree) = setup();
        let leaf = tree.create_component();
        tree.set_preferred_size(leaf, Some(Size::new(7, 8))).unwrap();
        tree.set_maximum_size(leaf, Some(Size::new(70, 80))).unwrap();
        assert_eq!(tree.preferred_size(leaf).unwrap(), Size::new(7, 8));
        assert_eq!(tree.maximum_size(leaf).unwrap(), Size::new(70, 80));
        assert_eq!(tree.minimum_size(leaf).unwrap(), Size::ZERO);
    }

    #[test]
    fn lightweight_under_native_forwards_repaint() {
        let (toolkit, mut tree) = setup();
        let window = tree.create_window();
        let panel = tree.create_container();
        let leaf = tree.create_component();
        tree.set_bounds(panel, Rect::new(10, 10, 100, 100)).unwrap();
        tree.add(window, panel, None, None).unwrap();
        tree.add(panel, leaf, None, None).unwrap();
        tree.set_visible(window, true).unwrap();

        let peer = toolkit.peer_for(window).unwrap();
        peer.clear_calls();
        tree.repaint_rect(leaf, Rect::new(1, 1, 5, 5)).unwrap();
        assert_eq!(peer.calls(), vec![PeerCall::Repaint(Rect::new(11, 11, 5, 5))]);
    }

    #[test]
    fn native_child_of_lightweight_gets_translated_bounds() {
        let (toolkit, mut tree) = setup();
        let window = tree.create_window();
        let panel = tree.create_container();
        let canvas = tree.create_native_component();
        tree.set_bounds(panel, Rect::new(10, 20, 100, 100)).unwrap();
        tree.set_bounds(canvas, Rect::new(1, 2, 30, 30)).unwrap();
        tree.add(window, panel, None, None).unwrap();
        tree.add(panel, canvas, None, None).unwrap();
        tree.set_visible(window, true).unwrap();

        let peer = toolkit.peer_for(canvas).unwrap();
        assert!(peer.calls().contains(&PeerCall::SetBounds(Rect::new(11, 22, 30, 30))));

        peer.clear_calls();
        tree.set_location(panel, 50, 60).unwrap();
        assert_eq!(peer.calls(), vec![PeerCall::SetBounds(Rect::new(51, 62, 30, 30))]);
    }

    #[test]
    fn showing_window_posts_opened_once() {
        let (toolkit, mut tree) = setup();
        let window = tree.create_window();
        tree.set_visible(window, true).unwrap();
        tree.set_visible(window, false).unwrap();
        tree.set_visible(window, true).unwrap();
        let opened = toolkit
            .peek_posted()
            .iter()
            .filter(|e| e.id() == Event::window(window, WindowEventKind::Opened).id())
            .count();
        assert_eq!(opened, 1);
    }
}
