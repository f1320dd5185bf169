//! Materialization: creating and releasing platform peers.
//!
//! A node is materialized when it (or an ancestor) is attached to something
//! displayable. Native-backed nodes get a [`PlatformPeer`](crate::PlatformPeer);
//! lightweight nodes get the lightweight marker and route input through the
//! redirector of their nearest native container.

use bough_core::logging::{PerfSpan, span_names, targets};

use crate::event::{Event, EventKind, EventMask, HierarchyEvent, HierarchyEventKind, HierarchyFlags};
use crate::peer::{Peer, PeerRequest};
use crate::redirector::LightweightRedirector;

use super::node::BridgeSubscription;
use super::{NodeId, Tree};

impl Tree {
    /// Materialize a node and its subtree.
    ///
    /// Nodes that already have a peer keep it. Unknown ids are ignored.
    pub fn add_notify(&mut self, id: NodeId) {
        let _span = PerfSpan::new(span_names::ADD_NOTIFY);
        self.materialize(id);
    }

    /// Release the peers of a node and its subtree. The nodes stay in the
    /// tree and can be materialized again.
    pub fn remove_notify(&mut self, id: NodeId) {
        let _span = PerfSpan::new(span_names::REMOVE_NOTIFY);
        self.dematerialize(id);
    }

    fn materialize(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.peer.is_some() {
            let request = PeerRequest {
                node: id,
                kind: node.kind,
                native: node.native,
                bounds: self.native_bounds(id),
                visible: node.visible,
                enabled: node.enabled,
            };
            let peer = match self.toolkit.create_peer(&request) {
                Peer::None => Peer::Lightweight,
                peer => peer,
            };
            tracing::trace!(target: targets::PEER, ?id, ?peer, "peer created");
            if let Some(node) = self.nodes.get_mut(id) {
                node.peer = peer;
            }
        }

        let Some(node) = self.nodes.get(id) else {
            return;
        };
        match node.peer.clone() {
            Peer::Lightweight => {
                let mask = node.event_mask | node.listeners.mask();
                self.proxy_events(id, mask);
            }
            Peer::Native(peer) => {
                if node.visible {
                    peer.show();
                }
                if !node.enabled {
                    peer.disable();
                }
                if let Err(error) = self.push_appearance(id) {
                    tracing::warn!(target: targets::PEER, ?id, %error, "appearance not applied");
                }
                self.install_bridge(id);
                if let Some(data) = self.nodes.get_mut(id).and_then(|n| n.container.as_mut()) {
                    data.redirector = Some(LightweightRedirector::new(id));
                }
            }
            Peer::None => {}
        }

        if let Err(error) = self.invalidate(id) {
            tracing::warn!(target: targets::TREE, ?id, %error, "invalidate failed");
        }
        let mut flags = HierarchyFlags::DISPLAYABILITY_CHANGED;
        if self.is_showing(id).unwrap_or(false) {
            flags |= HierarchyFlags::SHOWING_CHANGED;
        }
        self.notify_displayability(id, flags);

        let children = self
            .nodes
            .get(id)
            .map(|n| n.children().to_vec())
            .unwrap_or_default();
        for child in children {
            self.materialize(child);
        }
    }

    fn dematerialize(&mut self, id: NodeId) {
        let Ok(was_showing) = self.is_showing(id) else {
            return;
        };
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        for child in node.children().to_vec() {
            self.dematerialize(child);
        }

        if let Some(data) = self.nodes.get_mut(id).and_then(|n| n.container.as_mut()) {
            data.redirector = None;
        }
        self.drag_observers.retain(|&host| host != id);
        if let Some(host) = self.native_host(id) {
            self.forget_redirect_target(host, id);
        }
        self.release_bridge(id);
        if let Some(window) = self.window_of(id)
            && let Some(data) = self.nodes.get_mut(window).and_then(|n| n.window.as_mut())
            && data.focus_owner == Some(id)
        {
            data.focus_owner = None;
        }

        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.has_focus = false;
        node.peer_font = None;
        let peer = std::mem::take(&mut node.peer);
        if let Peer::Native(peer) = &peer {
            peer.hide();
        }
        self.toolkit.remove_source_events(id);
        if let Peer::Native(peer) = peer {
            peer.dispose();
            tracing::trace!(target: targets::PEER, ?id, "peer disposed");
        }

        let mut flags = HierarchyFlags::DISPLAYABILITY_CHANGED;
        if was_showing {
            flags |= HierarchyFlags::SHOWING_CHANGED;
        }
        self.notify_displayability(id, flags);
    }

    fn notify_displayability(&mut self, id: NodeId, flags: HierarchyFlags) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.listens_for(EventMask::HIERARCHY) {
            return;
        }
        let mut event = Event::new(
            id,
            EventKind::Hierarchy(HierarchyEvent {
                kind: HierarchyEventKind::Changed,
                changed: id,
                changed_parent: node.parent,
                flags,
            }),
        );
        if let Err(error) = self.dispatch_event(&mut event) {
            tracing::warn!(target: targets::TREE, ?id, %error, "displayability event not delivered");
        }
    }

    /// Subscribe a native node to every lightweight ancestor between it and
    /// its native parent, so that moves and visibility changes of those
    /// ancestors reach the peer.
    fn install_bridge(&mut self, id: NodeId) {
        let mut ancestors = Vec::new();
        let mut parent = self.nodes.get(id).and_then(|n| n.parent);
        while let Some(pid) = parent {
            let Some(p) = self.nodes.get(pid) else { break };
            if !p.peer.is_lightweight() {
                break;
            }
            ancestors.push(pid);
            parent = p.parent;
        }
        if ancestors.is_empty() {
            return;
        }
        for &ancestor in &ancestors {
            if let Some(node) = self.nodes.get_mut(ancestor) {
                node.bridged.push(id);
            }
        }
        tracing::trace!(target: targets::PEER, ?id, depth = ancestors.len(), "native bridged");
        if let Some(node) = self.nodes.get_mut(id) {
            node.bridge = Some(BridgeSubscription { ancestors });
        }
    }

    fn release_bridge(&mut self, id: NodeId) {
        let Some(bridge) = self.nodes.get_mut(id).and_then(|n| n.bridge.take()) else {
            return;
        };
        for ancestor in bridge.ancestors {
            if let Some(node) = self.nodes.get_mut(ancestor) {
                node.bridged.retain(|&n| n != id);
            }
        }
    }
}
