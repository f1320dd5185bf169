//! Child management and hierarchy listener counters.
//!
//! Every container keeps two counters: the number of descendants (not
//! counting itself) that listen for hierarchy changes, and the number that
//! listen for ancestor bounds changes. The counters are adjusted on every
//! splice and listener change and let hierarchy notifications skip subtrees
//! with nobody listening.

use bough_core::logging::targets;

use crate::error::{TreeError, TreeResult};
use crate::event::{
    ComponentEventKind, ContainerEvent, ContainerEventKind, Event, EventKind, EventMask,
    HierarchyEvent, HierarchyEventKind, HierarchyFlags,
};
use crate::layout::Constraints;
use crate::listener::ListenerCategory;

use super::{NodeId, NodeKind, Tree};

/// The two hierarchy categories tracked by the counters.
const COUNTED: [EventMask; 2] = [EventMask::HIERARCHY, EventMask::HIERARCHY_BOUNDS];

impl Tree {
    /// Add `child` to `parent`.
    ///
    /// `index` of `None` appends. A child already attached elsewhere (or to
    /// `parent` itself) is moved. All checks run before anything changes.
    #[tracing::instrument(skip(self, constraints), target = "bough::tree", level = "trace")]
    pub fn add(
        &mut self,
        parent: NodeId,
        child: NodeId,
        constraints: Option<Constraints>,
        index: Option<usize>,
    ) -> TreeResult<()> {
        let old_parent = self.check_add(parent, child, index).inspect_err(|error| {
            tracing::debug!(target: targets::TREE, ?parent, ?child, %error, "add rejected");
        })?;
        if let Some(old_parent) = old_parent {
            self.detach(old_parent, child)?;
        }

        let data = self.container_data_mut(parent)?;
        match index {
            Some(index) => data.children.insert(index, child),
            None => data.children.push(child),
        }
        self.node_mut(child)?.parent = Some(parent);

        let deltas = self.listening_deltas(child, 1);
        self.adjust_listening_children(parent, deltas)?;
        if self.node(parent)?.valid {
            self.invalidate(parent)?;
        }
        if self.node(parent)?.peer.is_some() {
            self.add_notify(child);
        }
        if let Some(layout) = self.container_data(parent)?.layout.clone() {
            layout.add_layout_component(child, constraints.as_ref());
        }

        self.fire_container_event(parent, child, ContainerEventKind::Added)?;
        self.fire_hierarchy(
            child,
            HierarchyFlags::PARENT_CHANGED,
            child,
            Some(parent),
        )?;
        tracing::debug!(target: targets::TREE, ?parent, ?child, "child added");
        Ok(())
    }

    /// Every check `add` makes, run before anything changes. Returns the
    /// child's current parent.
    fn check_add(
        &self,
        parent: NodeId,
        child: NodeId,
        index: Option<usize>,
    ) -> TreeResult<Option<NodeId>> {
        let child_node = self.node(child)?;
        let parent_node = self.node(parent)?;
        let Some(data) = parent_node.container.as_ref() else {
            return Err(TreeError::NotAContainer(parent));
        };
        if child_node.kind == NodeKind::Window {
            return Err(TreeError::IllegalChild {
                child,
                reason: "windows cannot be added to a container",
            });
        }
        if child == parent || self.is_ancestor_of(child, parent)? {
            return Err(TreeError::Cycle { parent, child });
        }
        let len = if child_node.parent == Some(parent) {
            data.children.len() - 1
        } else {
            data.children.len()
        };
        if let Some(index) = index
            && index > len
        {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        Ok(child_node.parent)
    }

    /// Remove and return the child at `index`.
    pub fn remove_at(&mut self, parent: NodeId, index: usize) -> TreeResult<NodeId> {
        let data = self.container_data(parent)?;
        let len = data.children.len();
        let Some(&child) = data.children.get(index) else {
            return Err(TreeError::IndexOutOfRange { index, len });
        };
        self.remove_child(parent, index, child, true)?;
        Ok(child)
    }

    /// Remove `child` from `parent`. Does nothing if it is not a child.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let data = self.container_data(parent)?;
        // Recently added children are the likeliest to go.
        if let Some(index) = data.children.iter().rposition(|&c| c == child) {
            self.remove_child(parent, index, child, true)?;
        }
        Ok(())
    }

    /// Remove every child, last first.
    pub fn remove_all(&mut self, parent: NodeId) -> TreeResult<()> {
        while let Some(&child) = self.container_data(parent)?.children.last() {
            let index = self.container_data(parent)?.children.len() - 1;
            self.remove_child(parent, index, child, true)?;
        }
        Ok(())
    }

    /// Detach `child` from its current parent ahead of a re-add.
    fn detach(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let data = self.container_data(parent)?;
        if let Some(index) = data.children.iter().rposition(|&c| c == child) {
            self.remove_child(parent, index, child, false)?;
        }
        Ok(())
    }

    fn remove_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
        notify_hierarchy: bool,
    ) -> TreeResult<()> {
        if self.node(child)?.peer.is_some() {
            self.remove_notify(child);
        }
        if let Some(layout) = self.container_data(parent)?.layout.clone() {
            layout.remove_layout_component(child);
        }
        self.container_data_mut(parent)?.children.remove(index);
        self.node_mut(child)?.parent = None;
        let deltas = self.listening_deltas(child, -1);
        self.adjust_listening_children(parent, deltas)?;

        self.fire_container_event(parent, child, ContainerEventKind::Removed)?;
        if notify_hierarchy {
            self.fire_hierarchy(child, HierarchyFlags::PARENT_CHANGED, child, Some(parent))?;
        }
        if self.node(parent)?.valid {
            self.invalidate(parent)?;
        }
        tracing::debug!(target: targets::TREE, ?parent, ?child, "child removed");
        Ok(())
    }

    fn fire_container_event(
        &mut self,
        parent: NodeId,
        child: NodeId,
        kind: ContainerEventKind,
    ) -> TreeResult<()> {
        let node = self.node(parent)?;
        let listening = node.listeners.has(ListenerCategory::Container)
            || node.event_mask.contains(EventMask::CONTAINER)
            || self.global_mask().contains(EventMask::CONTAINER);
        if listening {
            let mut event = Event::new(
                parent,
                EventKind::Container(ContainerEvent { kind, child }),
            );
            self.dispatch_event(&mut event)?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Listener counters
    // ---------------------------------------------------------------------

    /// Nodes in the subtree of `id`, itself included, listening for `mask`.
    pub(crate) fn num_listening(&self, id: NodeId, mask: EventMask) -> usize {
        let Some(node) = self.nodes.get(id) else {
            return 0;
        };
        let own = usize::from(node.listens_for(mask));
        let below = node.container.as_ref().map_or(0, |data| {
            if mask == EventMask::HIERARCHY {
                data.listening_children
            } else {
                data.listening_bounds_children
            }
        });
        own + below
    }

    /// Signed per-category counts for the subtree of `id`, in the order of
    /// the counters.
    pub(crate) fn listening_deltas(&self, id: NodeId, sign: isize) -> [isize; 2] {
        COUNTED.map(|mask| sign * self.num_listening(id, mask) as isize)
    }

    /// Add `deltas` to the counters of `container` and every ancestor.
    pub(crate) fn adjust_listening_children(
        &mut self,
        container: NodeId,
        deltas: [isize; 2],
    ) -> TreeResult<()> {
        if deltas == [0, 0] {
            return Ok(());
        }
        self.node(container)?;
        let mut current = Some(container);
        while let Some(id) = current {
            let Some(node) = self.nodes.get_mut(id) else {
                break;
            };
            if let Some(data) = node.container.as_mut() {
                data.listening_children = data.listening_children.saturating_add_signed(deltas[0]);
                data.listening_bounds_children =
                    data.listening_bounds_children.saturating_add_signed(deltas[1]);
            }
            current = node.parent;
        }
        tracing::trace!(target: targets::TREE, ?container, ?deltas, "listener counters adjusted");
        if self.config.verify_listener_counts {
            debug_assert!(
                self.verify_listener_counts(self.root_of(container)),
                "hierarchy listener counters out of sync"
            );
        }
        Ok(())
    }

    /// Descendants of `container`, excluding the container itself, that
    /// listen for `category`. Only hierarchy categories are counted.
    pub fn listening_children(
        &self,
        container: NodeId,
        category: ListenerCategory,
    ) -> TreeResult<usize> {
        let data = self.container_data(container)?;
        Ok(match category {
            ListenerCategory::Hierarchy => data.listening_children,
            ListenerCategory::HierarchyBounds => data.listening_bounds_children,
            _ => 0,
        })
    }

    /// Nodes in the subtree of `node`, itself included, that listen for a
    /// hierarchy `category`.
    pub fn hierarchy_listener_count(
        &self,
        node: NodeId,
        category: ListenerCategory,
    ) -> TreeResult<usize> {
        self.node(node)?;
        Ok(match category {
            ListenerCategory::Hierarchy | ListenerCategory::HierarchyBounds => {
                self.num_listening(node, category.mask())
            }
            _ => 0,
        })
    }

    /// Recount every counter in the subtree of `node` and compare.
    pub fn verify_listener_counts(&self, node: NodeId) -> bool {
        self.recount(node).is_some()
    }

    /// Exhaustive per-mask counts for the subtree, or `None` on mismatch.
    fn recount(&self, id: NodeId) -> Option<[usize; 2]> {
        let node = self.nodes.get(id)?;
        let mut below = [0usize; 2];
        for &child in node.children() {
            let counts = self.recount(child)?;
            below[0] += counts[0];
            below[1] += counts[1];
        }
        if let Some(data) = node.container.as_ref()
            && (data.listening_children != below[0]
                || data.listening_bounds_children != below[1])
        {
            tracing::warn!(
                target: targets::TREE,
                ?id,
                stored = ?(data.listening_children, data.listening_bounds_children),
                actual = ?below,
                "listener counter mismatch"
            );
            return None;
        }
        Some([
            below[0] + usize::from(node.listens_for(COUNTED[0])),
            below[1] + usize::from(node.listens_for(COUNTED[1])),
        ])
    }

    fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.nodes.get(current).and_then(|n| n.parent) {
            current = parent;
        }
        current
    }

    // ---------------------------------------------------------------------
    // Hierarchy notifications
    // ---------------------------------------------------------------------

    /// Deliver a hierarchy change to every listening node in the subtree of
    /// `id`, descendants before the node itself. Returns how many were
    /// notified.
    pub(crate) fn fire_hierarchy(
        &mut self,
        id: NodeId,
        flags: HierarchyFlags,
        changed: NodeId,
        changed_parent: Option<NodeId>,
    ) -> TreeResult<usize> {
        let node = self.node(id)?;
        let listening_below = node
            .container
            .as_ref()
            .map_or(0, |data| data.listening_children);
        let listens = node.listens_for(EventMask::HIERARCHY);
        let mut delivered = 0;
        if listening_below > 0 {
            for child in node.children().to_vec() {
                if self.contains(child) {
                    delivered += self.fire_hierarchy(child, flags, changed, changed_parent)?;
                }
            }
        }
        if listens && self.contains(id) {
            let mut event = Event::new(
                id,
                EventKind::Hierarchy(HierarchyEvent {
                    kind: HierarchyEventKind::Changed,
                    changed,
                    changed_parent,
                    flags,
                }),
            );
            self.dispatch_event(&mut event)?;
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Tell the subtree of `id` that its showing state changed.
    pub(crate) fn fire_showing_changed(&mut self, id: NodeId) -> TreeResult<()> {
        if self.node(id)?.peer.is_some() {
            let parent = self.node(id)?.parent;
            self.fire_hierarchy(id, HierarchyFlags::SHOWING_CHANGED, id, parent)?;
        }
        Ok(())
    }

    /// Deliver an ancestor moved/resized notification to every descendant of
    /// `container` listening for ancestor bounds. Returns how many were
    /// notified.
    pub(crate) fn fire_ancestor_bounds(
        &mut self,
        container: NodeId,
        kind: ComponentEventKind,
    ) -> TreeResult<usize> {
        let kind = match kind {
            ComponentEventKind::Moved => HierarchyEventKind::AncestorMoved,
            ComponentEventKind::Resized => HierarchyEventKind::AncestorResized,
            _ => return Ok(0),
        };
        let parent = self.node(container)?.parent;
        self.fire_bounds_below(container, kind, container, parent)
    }

    fn fire_bounds_below(
        &mut self,
        id: NodeId,
        kind: HierarchyEventKind,
        changed: NodeId,
        changed_parent: Option<NodeId>,
    ) -> TreeResult<usize> {
        let node = self.node(id)?;
        let listening_below = node
            .container
            .as_ref()
            .map_or(0, |data| data.listening_bounds_children);
        if listening_below == 0 {
            return Ok(0);
        }
        let mut delivered = 0;
        for child in node.children().to_vec() {
            let Some(child_node) = self.nodes.get(child) else {
                continue;
            };
            if child_node.listens_for(EventMask::HIERARCHY_BOUNDS) {
                let mut event = Event::new(
                    child,
                    EventKind::Hierarchy(HierarchyEvent {
                        kind,
                        changed,
                        changed_parent,
                        flags: HierarchyFlags::empty(),
                    }),
                );
                self.dispatch_event(&mut event)?;
                delivered += 1;
            }
            if self.contains(child) {
                delivered += self.fire_bounds_below(child, kind, changed, changed_parent)?;
            }
        }
        Ok(delivered)
    }
}
