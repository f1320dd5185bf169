//! Listener registration and event enabling.

use std::sync::Arc;

use bough_core::ListenerId;
use bough_core::logging::targets;

use crate::error::TreeResult;
use crate::event::EventMask;
use crate::listener::{GlobalEventListener, Listener, ListenerCategory};

use super::{GlobalEntry, NodeId, Tree};

impl Tree {
    /// Register a listener on a node.
    ///
    /// The node switches to delivering events through typed listeners, and
    /// hierarchy counters on its ancestors are updated. Registering the same
    /// listener twice yields two independent registrations.
    pub fn add_listener(&mut self, id: NodeId, listener: Listener) -> TreeResult<ListenerId> {
        let category = listener.category();
        let before = self.own_listening(id)?;
        let node = self.node_mut(id)?;
        let listener_id = node.listeners.add(listener);
        node.new_events_only = true;
        self.sync_own_listening(id, before)?;
        self.proxy_events(id, category.mask());
        tracing::trace!(target: targets::TREE, ?id, ?category, "listener added");
        Ok(listener_id)
    }

    /// Unregister a listener by id. Unknown ids are ignored.
    pub fn remove_listener(&mut self, id: NodeId, listener: ListenerId) -> TreeResult<bool> {
        let before = self.own_listening(id)?;
        let removed = self.node_mut(id)?.listeners.remove(listener);
        if removed.is_some() {
            self.sync_own_listening(id, before)?;
        }
        Ok(removed.is_some())
    }

    /// Unregister the most recent registration of `listener`, compared by identity.
    pub fn remove_listener_instance(&mut self, id: NodeId, listener: &Listener) -> TreeResult<bool> {
        let before = self.own_listening(id)?;
        let removed = self.node_mut(id)?.listeners.remove_instance(listener);
        if removed {
            self.sync_own_listening(id, before)?;
        }
        Ok(removed)
    }

    /// Snapshot of the listeners of one category, in registration order.
    pub fn listeners(&self, id: NodeId, category: ListenerCategory) -> TreeResult<Vec<Listener>> {
        Ok(self.node(id)?.listeners.snapshot(category))
    }

    /// Enable event categories without registering a listener.
    pub fn enable_events(&mut self, id: NodeId, mask: EventMask) -> TreeResult<()> {
        let before = self.own_listening(id)?;
        let node = self.node_mut(id)?;
        node.event_mask |= mask;
        node.new_events_only = true;
        self.sync_own_listening(id, before)?;
        self.proxy_events(id, mask);
        Ok(())
    }

    /// Disable event categories enabled with [`enable_events`](Self::enable_events).
    /// Categories with registered listeners keep being delivered.
    pub fn disable_events(&mut self, id: NodeId, mask: EventMask) -> TreeResult<()> {
        let before = self.own_listening(id)?;
        self.node_mut(id)?.event_mask.remove(mask);
        self.sync_own_listening(id, before)
    }

    /// Register a listener that observes every dispatched event whose
    /// category intersects `mask`.
    pub fn add_global_listener(
        &mut self,
        listener: Arc<dyn GlobalEventListener>,
        mask: EventMask,
    ) -> ListenerId {
        let id = ListenerId::next();
        self.global_listeners.push(GlobalEntry { id, mask, listener });
        id
    }

    /// Unregister a global listener. Unknown ids are ignored.
    pub fn remove_global_listener(&mut self, id: ListenerId) -> bool {
        let before = self.global_listeners.len();
        self.global_listeners.retain(|entry| entry.id != id);
        self.global_listeners.len() != before
    }

    /// Union of every global listener's mask.
    pub(crate) fn global_mask(&self) -> EventMask {
        self.global_listeners
            .iter()
            .fold(EventMask::empty(), |mask, entry| mask | entry.mask)
    }

    /// Whether the node itself listens for each counted hierarchy category.
    fn own_listening(&self, id: NodeId) -> TreeResult<[bool; 2]> {
        let node = self.node(id)?;
        Ok([
            node.listens_for(EventMask::HIERARCHY),
            node.listens_for(EventMask::HIERARCHY_BOUNDS),
        ])
    }

    /// Push a change in the node's own hierarchy listening to its ancestors.
    fn sync_own_listening(&mut self, id: NodeId, before: [bool; 2]) -> TreeResult<()> {
        let after = self.own_listening(id)?;
        let deltas = [0, 1].map(|i| isize::from(after[i]) - isize::from(before[i]));
        if let Some(parent) = self.node(id)?.parent {
            self.adjust_listening_children(parent, deltas)?;
        }
        Ok(())
    }

    /// A materialized lightweight node cannot receive input events directly,
    /// so its native host is told to redirect those categories.
    pub(crate) fn proxy_events(&mut self, id: NodeId, mask: EventMask) {
        let mask = mask & EventMask::PROXY;
        if mask.is_empty() {
            return;
        }
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.peer.is_lightweight() {
            return;
        }
        let Some(host) = self.native_host(id) else {
            return;
        };
        if let Some(redirector) = self
            .nodes
            .get_mut(host)
            .and_then(|n| n.container.as_mut())
            .and_then(|c| c.redirector.as_mut())
        {
            redirector.event_mask |= mask;
            tracing::trace!(target: targets::REDIRECTOR, ?host, ?mask, "host redirects for lightweight");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeConfig;
    use crate::event::Event;
    use crate::headless::HeadlessToolkit;
    use crate::listener::{HierarchyBoundsListener, MouseListener};
    use crate::tree::Tree;

    struct Bounds;
    impl HierarchyBoundsListener for Bounds {}

    struct Clicks;
    impl MouseListener for Clicks {}

    struct Spy;
    impl GlobalEventListener for Spy {
        fn event_dispatched(&self, _tree: &Tree, _event: &Event) {}
    }

    fn tree() -> Tree {
        Tree::with_config(Arc::new(HeadlessToolkit::new()), TreeConfig::strict())
    }

    #[test]
    fn listener_changes_reach_ancestor_counters() {
        let mut tree = tree();
        let root = tree.create_container();
        let leaf = tree.create_component();
        tree.add(root, leaf, None, None).unwrap();

        let first = tree
            .add_listener(leaf, Listener::HierarchyBounds(Arc::new(Bounds)))
            .unwrap();
        let second = tree
            .add_listener(leaf, Listener::HierarchyBounds(Arc::new(Bounds)))
            .unwrap();
        assert_eq!(
            tree.listening_children(root, ListenerCategory::HierarchyBounds).unwrap(),
            1
        );

        assert!(tree.remove_listener(leaf, first).unwrap());
        assert_eq!(
            tree.listening_children(root, ListenerCategory::HierarchyBounds).unwrap(),
            1
        );
        assert!(tree.remove_listener(leaf, second).unwrap());
        assert!(!tree.remove_listener(leaf, second).unwrap());
        assert_eq!(
            tree.listening_children(root, ListenerCategory::HierarchyBounds).unwrap(),
            0
        );
    }

    #[test]
    fn enabling_hierarchy_events_counts_as_listening() {
        let mut tree = tree();
        let root = tree.create_container();
        let leaf = tree.create_component();
        tree.add(root, leaf, None, None).unwrap();
        tree.enable_events(leaf, EventMask::HIERARCHY).unwrap();
        assert_eq!(tree.listening_children(root, ListenerCategory::Hierarchy).unwrap(), 1);
        tree.disable_events(leaf, EventMask::HIERARCHY).unwrap();
        assert_eq!(tree.listening_children(root, ListenerCategory::Hierarchy).unwrap(), 0);
    }

    #[test]
    fn remove_instance_matches_identity() {
        let mut tree = tree();
        let leaf = tree.create_component();
        let kept = Listener::Mouse(Arc::new(Clicks));
        let other = Listener::Mouse(Arc::new(Clicks));
        tree.add_listener(leaf, kept.clone()).unwrap();
        assert!(!tree.remove_listener_instance(leaf, &other).unwrap());
        assert_eq!(tree.listeners(leaf, ListenerCategory::Mouse).unwrap().len(), 1);
        assert!(tree.remove_listener_instance(leaf, &kept).unwrap());
        assert!(tree.listeners(leaf, ListenerCategory::Mouse).unwrap().is_empty());
    }

    #[test]
    fn global_listeners_register_by_mask() {
        let mut tree = tree();
        let id = tree.add_global_listener(Arc::new(Spy), EventMask::KEY);
        tree.add_global_listener(Arc::new(Spy), EventMask::MOUSE);
        assert_eq!(tree.global_mask(), EventMask::KEY | EventMask::MOUSE);
        assert!(tree.remove_global_listener(id));
        assert!(!tree.remove_global_listener(id));
        assert_eq!(tree.global_mask(), EventMask::MOUSE);
    }
}
