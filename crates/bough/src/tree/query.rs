//! Read-only lookups.

use bough_core::Point;

use crate::error::{TreeError, TreeResult};
use crate::event::EventMask;
use crate::peer::Peer;

use super::{NodeId, NodeKind, Tree};

impl Tree {
    /// Whether the node has no native window of its own.
    ///
    /// An unmaterialized node answers for the peer it would get.
    pub fn is_lightweight(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.is_lightweight())
    }

    /// Whether the node currently has a peer.
    pub fn is_displayable(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.peer.is_some())
    }

    /// Whether the node is visible, materialized, and every ancestor is too.
    pub fn is_showing(&self, id: NodeId) -> TreeResult<bool> {
        let node = self.node(id)?;
        if !node.visible || !node.peer.is_some() {
            return Ok(false);
        }
        let mut parent = node.parent;
        while let Some(pid) = parent {
            let Some(p) = self.nodes.get(pid) else {
                return Ok(false);
            };
            if !p.visible {
                return Ok(false);
            }
            parent = p.parent;
        }
        Ok(true)
    }

    /// The node's top-left corner in screen coordinates.
    ///
    /// Window bounds are already in screen coordinates; every other node adds
    /// its offset to its parent's.
    pub fn location_on_screen(&self, id: NodeId) -> TreeResult<Point> {
        if !self.is_showing(id)? {
            return Err(TreeError::NotShowing(id));
        }
        let mut point = Point::ZERO;
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = self.node(cur)?;
            point = point.translated(node.bounds.x, node.bounds.y);
            current = node.parent;
        }
        Ok(point)
    }

    /// The deepest visible node under `(x, y)`, given in `id`'s coordinates.
    ///
    /// Native children are hit-tested before lightweight ones. Returns `id`
    /// itself when no child contains the point, and `None` when `id` does
    /// not contain it.
    pub fn component_at(&self, id: NodeId, x: i32, y: i32) -> TreeResult<Option<NodeId>> {
        let node = self.node(id)?;
        let size = node.bounds.size();
        if x < 0 || y < 0 || x >= size.width || y >= size.height {
            return Ok(None);
        }
        for native_pass in [true, false] {
            for &child in node.children() {
                let Some(c) = self.nodes.get(child) else {
                    continue;
                };
                if c.visible && c.is_lightweight() != native_pass && c.bounds.contains(x, y) {
                    return Ok(Some(child));
                }
            }
        }
        Ok(Some(id))
    }

    /// Like [`component_at`](Self::component_at), but descends into the hit
    /// child until a leaf or an empty spot is reached.
    pub fn deepest_component_at(&self, id: NodeId, x: i32, y: i32) -> TreeResult<Option<NodeId>> {
        let mut current = id;
        let (mut x, mut y) = (x, y);
        loop {
            match self.component_at(current, x, y)? {
                Some(hit) if hit != current => {
                    let bounds = self.node(hit)?.bounds;
                    x -= bounds.x;
                    y -= bounds.y;
                    current = hit;
                }
                other => return Ok(other),
            }
        }
    }

    /// The window containing the node, which may be the node itself.
    pub fn window_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = self.nodes.get(cur)?;
            if node.kind == NodeKind::Window {
                return Some(cur);
            }
            current = node.parent;
        }
        None
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> TreeResult<bool> {
        let mut parent = self.node(id)?.parent;
        while let Some(pid) = parent {
            if pid == ancestor {
                return Ok(true);
            }
            parent = self.nodes.get(pid).and_then(|n| n.parent);
        }
        Ok(false)
    }

    /// The nearest strict ancestor that has a native peer.
    pub fn native_host(&self, id: NodeId) -> Option<NodeId> {
        let mut parent = self.nodes.get(id)?.parent;
        while let Some(pid) = parent {
            let node = self.nodes.get(pid)?;
            if matches!(node.peer, Peer::Native(_)) {
                return Some(pid);
            }
            parent = node.parent;
        }
        None
    }

    /// Categories explicitly enabled on the node.
    pub fn event_mask(&self, id: NodeId) -> TreeResult<EventMask> {
        Ok(self.node(id)?.event_mask)
    }

    /// The node's peer state.
    pub fn peer(&self, id: NodeId) -> TreeResult<&Peer> {
        Ok(&self.node(id)?.peer)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bough_core::Rect;

    use super::*;
    use crate::config::TreeConfig;
    use crate::headless::HeadlessToolkit;

    fn showing_window() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::with_config(Arc::new(HeadlessToolkit::new()), TreeConfig::strict());
        let window = tree.create_window();
        let panel = tree.create_container();
        let leaf = tree.create_component();
        tree.set_bounds(window, Rect::new(100, 200, 300, 300)).unwrap();
        tree.set_bounds(panel, Rect::new(10, 10, 100, 100)).unwrap();
        tree.set_bounds(leaf, Rect::new(5, 6, 20, 20)).unwrap();
        tree.add(window, panel, None, None).unwrap();
        tree.add(panel, leaf, None, None).unwrap();
        (tree, window, panel, leaf)
    }

    #[test]
    fn location_on_screen_needs_showing() {
        let (mut tree, window, _, leaf) = showing_window();
        assert_eq!(tree.location_on_screen(leaf), Err(TreeError::NotShowing(leaf)));
        tree.set_visible(window, true).unwrap();
        assert_eq!(tree.location_on_screen(leaf).unwrap(), Point::new(115, 216));
    }

    #[test]
    fn component_at_finds_visible_children() {
        let (mut tree, window, panel, leaf) = showing_window();
        assert_eq!(tree.component_at(window, 12, 12).unwrap(), Some(panel));
        assert_eq!(tree.deepest_component_at(window, 16, 17).unwrap(), Some(leaf));
        assert_eq!(tree.component_at(window, 1, 1).unwrap(), Some(window));
        assert_eq!(tree.component_at(window, -1, 1).unwrap(), None);

        tree.set_visible(panel, false).unwrap();
        assert_eq!(tree.component_at(window, 12, 12).unwrap(), Some(window));
    }

    #[test]
    fn ancestry_and_hosts() {
        let (mut tree, window, panel, leaf) = showing_window();
        assert!(tree.is_ancestor_of(window, leaf).unwrap());
        assert!(!tree.is_ancestor_of(leaf, leaf).unwrap());
        assert_eq!(tree.window_of(leaf), Some(window));
        assert_eq!(tree.native_host(leaf), None);
        tree.add_notify(window);
        assert_eq!(tree.native_host(leaf), Some(window));
        assert_eq!(tree.native_host(panel), Some(window));
    }
}
