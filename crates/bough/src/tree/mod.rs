//! The component tree.
//!
//! All nodes of one tree live in a single arena owned by [`Tree`] and are
//! addressed by [`NodeId`]. Parent links are plain ids, so the tree never
//! forms reference cycles. Operations that span several nodes (coordinate
//! translation, listener counter propagation, event retargeting) walk the
//! arena directly.
//!
//! The tree is split over several files, each adding an `impl Tree` block:
//!
//! - `appearance`: colors, fonts, cursors and locales with parent fallback
//! - `bounds`: geometry, visibility, invalidation, validation and sizes
//! - `notify`: materialization and dematerialization
//! - `container`: add, remove and listener counter propagation
//! - `listeners`: listener registration and event enabling
//! - `dispatch`: the event pipeline
//! - `focus`: focus requests
//! - `queue`: posted events and coalescing
//! - `query`: read-only lookups

mod appearance;
mod bounds;
mod container;
mod dispatch;
mod focus;
mod listeners;
mod node;
mod notify;
mod query;
mod queue;
mod shared;

pub use node::{NodeKind, NodeOptions};
pub use shared::SharedTree;

pub(crate) use node::Node;

use std::fmt;
use std::sync::Arc;

use bough_core::ListenerId;
use bough_core::logging::targets;
use slotmap::{SlotMap, new_key_type};

use crate::behavior::{Behavior, ClosingPolicy, InputContext, KeyEventProcessor};
use crate::config::TreeConfig;
use crate::error::{TreeError, TreeResult};
use crate::event::EventMask;
use crate::layout::LayoutStrategy;
use crate::listener::GlobalEventListener;
use crate::peer::Toolkit;

new_key_type! {
    /// Handle to a node in a [`Tree`].
    ///
    /// Ids stay valid until the node is destroyed. A destroyed id is never
    /// reused for a different node.
    pub struct NodeId;
}

impl NodeId {
    /// The raw numeric value of the id.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}

pub(crate) struct GlobalEntry {
    pub(crate) id: ListenerId,
    pub(crate) mask: EventMask,
    pub(crate) listener: Arc<dyn GlobalEventListener>,
}

/// A tree of visual nodes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use bough::{HeadlessToolkit, Rect, Tree};
///
/// let mut tree = Tree::new(Arc::new(HeadlessToolkit::new()));
/// let window = tree.create_window();
/// let panel = tree.create_container();
/// let label = tree.create_component();
/// tree.add(window, panel, None, None).unwrap();
/// tree.add(panel, label, None, None).unwrap();
/// tree.set_bounds(label, Rect::new(5, 5, 40, 10)).unwrap();
/// assert_eq!(tree.parent(label).unwrap(), Some(panel));
/// ```
pub struct Tree {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    pub(crate) toolkit: Arc<dyn Toolkit>,
    pub(crate) config: TreeConfig,
    pub(crate) global_listeners: Vec<GlobalEntry>,
    pub(crate) input_context: Option<Arc<dyn InputContext>>,
    /// Native hosts currently observing drags that started elsewhere.
    pub(crate) drag_observers: Vec<NodeId>,
}

impl Tree {
    /// Create an empty tree using `toolkit` for peers and posted events.
    pub fn new(toolkit: Arc<dyn Toolkit>) -> Self {
        Self::with_config(toolkit, TreeConfig::default())
    }

    /// Create an empty tree with explicit configuration.
    pub fn with_config(toolkit: Arc<dyn Toolkit>, config: TreeConfig) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            toolkit,
            config,
            global_listeners: Vec::new(),
            input_context: None,
            drag_observers: Vec::new(),
        }
    }

    /// The configuration in effect.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// The toolkit this tree posts to.
    pub fn toolkit(&self) -> &Arc<dyn Toolkit> {
        &self.toolkit
    }

    // ---------------------------------------------------------------------
    // Creation and destruction
    // ---------------------------------------------------------------------

    /// Create a detached node.
    pub fn create_node(&mut self, options: NodeOptions) -> NodeId {
        let kind = options.kind;
        let id = self.nodes.insert(Node::new(options));
        tracing::trace!(target: targets::TREE, ?id, ?kind, "created node");
        id
    }

    /// Create a detached lightweight leaf.
    pub fn create_component(&mut self) -> NodeId {
        self.create_node(NodeOptions::new(NodeKind::Component))
    }

    /// Create a detached lightweight container.
    pub fn create_container(&mut self) -> NodeId {
        self.create_node(NodeOptions::new(NodeKind::Container))
    }

    /// Create a detached native-backed leaf.
    pub fn create_native_component(&mut self) -> NodeId {
        self.create_node(NodeOptions::new(NodeKind::Component).native(true))
    }

    /// Create a detached native-backed container.
    pub fn create_native_container(&mut self) -> NodeId {
        self.create_node(NodeOptions::new(NodeKind::Container).native(true))
    }

    /// Create a hidden top-level window.
    pub fn create_window(&mut self) -> NodeId {
        self.create_node(NodeOptions::new(NodeKind::Window))
    }

    /// Detach, dematerialize and free a node and its whole subtree.
    #[tracing::instrument(skip(self), target = "bough::tree", level = "trace")]
    pub fn destroy(&mut self, id: NodeId) -> TreeResult<()> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.remove(parent, id)?;
        }
        if self.node(id)?.peer.is_some() {
            self.remove_notify(id);
        }

        let mut doomed = Vec::new();
        self.collect_subtree(id, &mut doomed);
        for node in doomed {
            self.drag_observers.retain(|&host| host != node);
            self.toolkit.remove_source_events(node);
            self.nodes.remove(node);
        }
        self.forget_focus_owner_outside_tree();
        tracing::debug!(target: targets::TREE, ?id, "destroyed subtree");
        Ok(())
    }

    /// Children first, then `id`.
    fn collect_subtree(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.nodes.get(id) {
            for &child in node.children() {
                self.collect_subtree(child, out);
            }
            out.push(id);
        }
    }

    fn forget_focus_owner_outside_tree(&mut self) {
        let stale: Vec<NodeId> = self
            .nodes
            .iter()
            .filter_map(|(id, node)| {
                let owner = node.window.as_ref()?.focus_owner?;
                (!self.nodes.contains_key(owner)).then_some(id)
            })
            .collect();
        for window in stale {
            if let Some(data) = self.nodes.get_mut(window).and_then(|n| n.window.as_mut()) {
                data.focus_owner = None;
            }
        }
    }

    /// Whether the id refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes without a parent, in arena order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    // ---------------------------------------------------------------------
    // Node access
    // ---------------------------------------------------------------------

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> TreeResult<&Node> {
        self.nodes.get(id).ok_or(TreeError::InvalidNode(id))
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut Node> {
        self.nodes.get_mut(id).ok_or(TreeError::InvalidNode(id))
    }

    pub(crate) fn container_data(&self, id: NodeId) -> TreeResult<&node::ContainerData> {
        self.node(id)?
            .container
            .as_ref()
            .ok_or(TreeError::NotAContainer(id))
    }

    pub(crate) fn container_data_mut(
        &mut self,
        id: NodeId,
    ) -> TreeResult<&mut node::ContainerData> {
        self.node_mut(id)?
            .container
            .as_mut()
            .ok_or(TreeError::NotAContainer(id))
    }

    // ---------------------------------------------------------------------
    // Simple properties
    // ---------------------------------------------------------------------

    /// The node's kind.
    pub fn kind(&self, id: NodeId) -> TreeResult<NodeKind> {
        Ok(self.node(id)?.kind)
    }

    /// The node's diagnostic name.
    pub fn name(&self, id: NodeId) -> TreeResult<&str> {
        Ok(&self.node(id)?.name)
    }

    /// Set the node's diagnostic name.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> TreeResult<()> {
        self.node_mut(id)?.name = name.into();
        Ok(())
    }

    /// The parent container, if attached.
    pub fn parent(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Children, front to back. Leaves have none.
    pub fn children(&self, id: NodeId) -> TreeResult<&[NodeId]> {
        Ok(self.node(id)?.children())
    }

    /// Number of children.
    pub fn child_count(&self, id: NodeId) -> TreeResult<usize> {
        Ok(self.node(id)?.children().len())
    }

    /// The attached behaviour.
    pub fn behavior(&self, id: NodeId) -> TreeResult<Option<Arc<dyn Behavior>>> {
        Ok(self.node(id)?.behavior.clone())
    }

    /// Attach or detach a behaviour. The behaviour's enabled categories are
    /// enabled on the node, and those only the previous behaviour asked for
    /// are disabled.
    pub fn set_behavior(
        &mut self,
        id: NodeId,
        behavior: Option<Arc<dyn Behavior>>,
    ) -> TreeResult<()> {
        let enabled = behavior
            .as_ref()
            .map(|b| b.enabled_events())
            .unwrap_or_default();
        let stale = self
            .node(id)?
            .behavior
            .as_ref()
            .map(|b| b.enabled_events())
            .unwrap_or_default()
            .difference(enabled);
        if !stale.is_empty() {
            self.disable_events(id, stale)?;
        }
        self.node_mut(id)?.behavior = behavior;
        if !enabled.is_empty() {
            self.enable_events(id, enabled)?;
        }
        self.invalidate(id)
    }

    /// The container's layout strategy.
    pub fn layout(&self, id: NodeId) -> TreeResult<Option<Arc<dyn LayoutStrategy>>> {
        Ok(self.container_data(id)?.layout.clone())
    }

    /// Replace the container's layout strategy. Existing children are not
    /// re-registered with the new strategy.
    pub fn set_layout(
        &mut self,
        id: NodeId,
        layout: Option<Arc<dyn LayoutStrategy>>,
    ) -> TreeResult<()> {
        self.container_data_mut(id)?.layout = layout;
        self.invalidate(id)
    }

    /// Install the shortcut/traversal processor consulted for key events at
    /// and below this container.
    pub fn set_key_processor(
        &mut self,
        id: NodeId,
        processor: Option<Arc<dyn KeyEventProcessor>>,
    ) -> TreeResult<()> {
        self.container_data_mut(id)?.key_processor = processor;
        Ok(())
    }

    /// Install the window's closing policy.
    pub fn set_closing_policy(
        &mut self,
        id: NodeId,
        policy: Option<Arc<dyn ClosingPolicy>>,
    ) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        let window = node.window.as_mut().ok_or(TreeError::NotAWindow(id))?;
        window.closing_policy = policy;
        Ok(())
    }

    /// Install or clear the active input context.
    pub fn set_input_context(&mut self, context: Option<Arc<dyn InputContext>>) {
        self.input_context = context;
    }

    /// Whether input methods are enabled for the node.
    pub fn input_methods_enabled(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.input_methods_enabled)
    }

    /// Enable or disable input methods for the node.
    pub fn set_input_methods_enabled(&mut self, id: NodeId, enabled: bool) -> TreeResult<()> {
        self.node_mut(id)?.input_methods_enabled = enabled;
        Ok(())
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("nodes", &self.nodes.len())
            .field("config", &self.config)
            .field("global_listeners", &self.global_listeners.len())
            .finish_non_exhaustive()
    }
}
