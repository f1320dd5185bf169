//! An in-process toolkit with recording peers.
//!
//! [`HeadlessToolkit`] queues posted events in memory and hands out
//! [`HeadlessPeer`]s that remember every call made on them. It is what a tree
//! runs on when there is no window system, and what tests use to observe
//! peer traffic.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use bough_core::logging::targets;
use bough_core::{Point, Rect, Size};
use parking_lot::Mutex;

use crate::appearance::{Color, CursorShape, Font};
use crate::event::Event;
use crate::peer::{Graphics, ImageId, ImageStatus, Peer, PeerRequest, PlatformPeer, Toolkit};
use crate::tree::NodeId;

/// A call recorded by a [`HeadlessPeer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerCall {
    /// `dispose`.
    Dispose,
    /// `set_bounds`.
    SetBounds(Rect),
    /// `show`.
    Show,
    /// `hide`.
    Hide,
    /// `enable`.
    Enable,
    /// `disable`.
    Disable,
    /// `set_foreground`.
    SetForeground(Option<Color>),
    /// `set_background`.
    SetBackground(Option<Color>),
    /// `set_font`.
    SetFont(Option<Font>),
    /// `set_cursor`.
    SetCursor(CursorShape),
    /// `repaint`.
    Repaint(Rect),
    /// `request_focus`.
    RequestFocus,
    /// `create_image`.
    CreateImage(Size),
    /// `handle_event`, with the event id.
    HandleEvent(u32),
}

/// A drawing operation recorded by [`HeadlessGraphics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsOp {
    /// Clip changed.
    SetClip(Rect),
    /// Origin shifted.
    Translate(i32, i32),
    /// Color changed.
    SetColor(Color),
    /// Font changed.
    SetFont(Font),
    /// Rectangle filled, in surface coordinates.
    FillRect(Rect),
    /// Rectangle outlined, in surface coordinates.
    DrawRect(Rect),
    /// Text drawn, in surface coordinates.
    DrawString(String, i32, i32),
}

/// A graphics context that records operations instead of drawing.
#[derive(Debug, Default)]
pub struct HeadlessGraphics {
    clip: Option<Rect>,
    origin: Point,
    log: Arc<Mutex<Vec<GraphicsOp>>>,
}

impl HeadlessGraphics {
    /// Create a context with its own log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context appending to a shared log.
    pub fn with_log(log: Arc<Mutex<Vec<GraphicsOp>>>) -> Self {
        Self {
            clip: None,
            origin: Point::ZERO,
            log,
        }
    }

    /// Operations recorded so far.
    pub fn ops(&self) -> Vec<GraphicsOp> {
        self.log.lock().clone()
    }

    fn record(&self, op: GraphicsOp) {
        self.log.lock().push(op);
    }
}

impl Graphics for HeadlessGraphics {
    fn set_clip(&mut self, rect: Rect) {
        let rect = rect.translated(self.origin.x, self.origin.y);
        self.clip = Some(rect);
        self.record(GraphicsOp::SetClip(rect));
    }

    fn clip(&self) -> Option<Rect> {
        self.clip
            .map(|clip| clip.translated(-self.origin.x, -self.origin.y))
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        self.origin = self.origin.translated(dx, dy);
        self.record(GraphicsOp::Translate(dx, dy));
    }

    fn set_color(&mut self, color: Color) {
        self.record(GraphicsOp::SetColor(color));
    }

    fn set_font(&mut self, font: &Font) {
        self.record(GraphicsOp::SetFont(font.clone()));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.record(GraphicsOp::FillRect(rect.translated(self.origin.x, self.origin.y)));
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.record(GraphicsOp::DrawRect(rect.translated(self.origin.x, self.origin.y)));
    }

    fn draw_string(&mut self, text: &str, x: i32, y: i32) {
        self.record(GraphicsOp::DrawString(
            text.to_owned(),
            x + self.origin.x,
            y + self.origin.y,
        ));
    }
}

/// A peer that records every call.
#[derive(Debug)]
pub struct HeadlessPeer {
    node: NodeId,
    calls: Mutex<Vec<PeerCall>>,
    painted: Arc<Mutex<Vec<GraphicsOp>>>,
    grants_focus: AtomicBool,
    next_image: AtomicU64,
}

impl HeadlessPeer {
    /// Create a peer for `node`.
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            calls: Mutex::new(Vec::new()),
            painted: Arc::new(Mutex::new(Vec::new())),
            grants_focus: AtomicBool::new(true),
            next_image: AtomicU64::new(1),
        }
    }

    /// The node this peer belongs to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<PeerCall> {
        self.calls.lock().clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Drawing operations made through graphics contexts from this peer.
    pub fn painted(&self) -> Vec<GraphicsOp> {
        self.painted.lock().clone()
    }

    /// Whether native focus requests succeed.
    pub fn set_grants_focus(&self, grants: bool) {
        self.grants_focus.store(grants, Ordering::Relaxed);
    }

    fn record(&self, call: PeerCall) {
        tracing::trace!(target: targets::PEER, node = ?self.node, ?call, "peer call");
        self.calls.lock().push(call);
    }
}

impl PlatformPeer for HeadlessPeer {
    fn dispose(&self) {
        self.record(PeerCall::Dispose);
    }

    fn set_bounds(&self, bounds: Rect) {
        self.record(PeerCall::SetBounds(bounds));
    }

    fn show(&self) {
        self.record(PeerCall::Show);
    }

    fn hide(&self) {
        self.record(PeerCall::Hide);
    }

    fn enable(&self) {
        self.record(PeerCall::Enable);
    }

    fn disable(&self) {
        self.record(PeerCall::Disable);
    }

    fn set_foreground(&self, color: Option<Color>) {
        self.record(PeerCall::SetForeground(color));
    }

    fn set_background(&self, color: Option<Color>) {
        self.record(PeerCall::SetBackground(color));
    }

    fn set_font(&self, font: Option<&Font>) {
        self.record(PeerCall::SetFont(font.cloned()));
    }

    fn set_cursor(&self, cursor: CursorShape) {
        self.record(PeerCall::SetCursor(cursor));
    }

    fn graphics(&self) -> Option<Box<dyn Graphics>> {
        Some(Box::new(HeadlessGraphics::with_log(Arc::clone(&self.painted))))
    }

    fn repaint(&self, _delay_ms: u64, rect: Rect) {
        self.record(PeerCall::Repaint(rect));
    }

    fn request_focus(&self) -> bool {
        self.record(PeerCall::RequestFocus);
        self.grants_focus.load(Ordering::Relaxed)
    }

    fn create_image(&self, size: Size) -> Option<ImageId> {
        self.record(PeerCall::CreateImage(size));
        Some(ImageId(self.next_image.fetch_add(1, Ordering::Relaxed)))
    }

    fn prepare_image(&self, _image: ImageId, _size: Size) -> bool {
        true
    }

    fn check_image(&self, _image: ImageId, _size: Size) -> ImageStatus {
        ImageStatus::WIDTH | ImageStatus::HEIGHT | ImageStatus::ALL_BITS
    }

    fn handle_event(&self, event: &Event) {
        self.record(PeerCall::HandleEvent(event.id()));
    }
}

/// A toolkit without a window system.
#[derive(Debug, Default)]
pub struct HeadlessToolkit {
    queue: Mutex<VecDeque<Event>>,
    peers: Mutex<HashMap<NodeId, Arc<HeadlessPeer>>>,
}

impl HeadlessToolkit {
    /// Create a toolkit with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent native peer created for `node`.
    pub fn peer_for(&self, node: NodeId) -> Option<Arc<HeadlessPeer>> {
        self.peers.lock().get(&node).cloned()
    }

    /// Number of queued events.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Copies of the queued events, oldest first.
    pub fn peek_posted(&self) -> Vec<Event> {
        self.queue.lock().iter().cloned().collect()
    }
}

impl Toolkit for HeadlessToolkit {
    fn create_peer(&self, request: &PeerRequest) -> Peer {
        if !request.native {
            return Peer::Lightweight;
        }
        let peer = Arc::new(HeadlessPeer::new(request.node));
        peer.set_bounds(request.bounds);
        self.peers.lock().insert(request.node, Arc::clone(&peer));
        tracing::debug!(target: targets::PEER, node = ?request.node, kind = ?request.kind, "created headless peer");
        Peer::Native(peer)
    }

    fn post_event(&self, event: Event) {
        self.queue.lock().push_back(event);
    }

    fn take_posted_events(&self) -> Vec<Event> {
        self.queue.lock().drain(..).collect()
    }

    fn remove_source_events(&self, node: NodeId) {
        self.queue.lock().retain(|event| event.source() != node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ComponentEventKind;
    use crate::tree::NodeKind;
    use slotmap::KeyData;

    fn node(n: u64) -> NodeId {
        NodeId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn lightweight_requests_get_the_marker() {
        let toolkit = HeadlessToolkit::new();
        let request = PeerRequest {
            node: node(1),
            kind: NodeKind::Component,
            native: false,
            bounds: Rect::ZERO,
            visible: true,
            enabled: true,
        };
        assert!(toolkit.create_peer(&request).is_lightweight());
        assert!(toolkit.peer_for(node(1)).is_none());
    }

    #[test]
    fn queue_drops_events_of_removed_source() {
        let toolkit = HeadlessToolkit::new();
        toolkit.post_event(Event::component(node(1), ComponentEventKind::Moved));
        toolkit.post_event(Event::component(node(2), ComponentEventKind::Moved));
        toolkit.remove_source_events(node(1));
        let drained = toolkit.take_posted_events();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].source(), node(2));
        assert_eq!(toolkit.pending(), 0);
    }

    #[test]
    fn graphics_records_in_surface_coordinates() {
        let mut graphics = HeadlessGraphics::new();
        graphics.translate(10, 20);
        graphics.set_clip(Rect::new(0, 0, 5, 5));
        graphics.fill_rect(Rect::new(1, 1, 2, 2));
        assert_eq!(graphics.clip(), Some(Rect::new(0, 0, 5, 5)));
        assert_eq!(
            graphics.ops(),
            vec![
                GraphicsOp::Translate(10, 20),
                GraphicsOp::SetClip(Rect::new(10, 20, 5, 5)),
                GraphicsOp::FillRect(Rect::new(11, 21, 2, 2)),
            ]
        );
    }
}
