//! Keyboard focus requests.

use bough_core::logging::targets;

use crate::error::TreeResult;
use crate::peer::Peer;

use super::{NodeId, Tree};

impl Tree {
    /// Ask for keyboard focus.
    ///
    /// Native nodes ask their peer. Lightweight nodes go through the
    /// redirector of their native host, which decides whether the host's
    /// peer must be asked at all. Returns `false` for unmaterialized nodes
    /// and when the window system refuses.
    #[tracing::instrument(skip(self), target = "bough::focus", level = "trace")]
    pub fn request_focus(&mut self, id: NodeId) -> TreeResult<bool> {
        let granted = match self.node(id)?.peer.clone() {
            Peer::None => false,
            Peer::Native(peer) => peer.request_focus(),
            Peer::Lightweight => match self.native_host(id) {
                Some(host) => {
                    if self.set_focus_request(host, id)? {
                        self.node(host)?
                            .peer
                            .native()
                            .is_some_and(|peer| peer.request_focus())
                    } else {
                        true
                    }
                }
                None => false,
            },
        };
        tracing::debug!(target: targets::FOCUS, ?id, granted, "focus requested");
        Ok(granted)
    }

    /// The node holding focus within `window`.
    pub fn focus_owner(&self, window: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self
            .node(window)?
            .window
            .as_ref()
            .and_then(|data| data.focus_owner))
    }

    /// Whether the node holds keyboard focus.
    pub fn has_focus(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.has_focus)
    }
}
