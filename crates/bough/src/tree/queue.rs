//! Draining and coalescing posted events.

use bough_core::logging::{PerfSpan, span_names, targets};

use crate::error::TreeResult;
use crate::event::{Event, EventKind, MouseEventKind};

use super::Tree;

impl Tree {
    /// Dispatch every event posted to the toolkit, including events posted
    /// while dispatching. Returns how many were dispatched.
    ///
    /// With [`TreeConfig::coalesce_events`](crate::TreeConfig) set, runs of
    /// compatible events for the same source are merged first. Events whose
    /// source has been destroyed are dropped.
    pub fn flush_events(&mut self) -> TreeResult<usize> {
        let _span = PerfSpan::new(span_names::FLUSH);
        let mut dispatched = 0;
        loop {
            let mut batch = self.toolkit.take_posted_events();
            if batch.is_empty() {
                break;
            }
            if self.config.coalesce_events {
                batch = self.coalesce(batch);
            }
            for mut event in batch {
                if !self.contains(event.source()) {
                    tracing::trace!(target: targets::DISPATCH, id = event.id(), "dropping event for destroyed node");
                    continue;
                }
                self.dispatch_event(&mut event)?;
                dispatched += 1;
            }
        }
        Ok(dispatched)
    }

    fn coalesce(&self, events: Vec<Event>) -> Vec<Event> {
        let before = events.len();
        let mut out: Vec<Event> = Vec::with_capacity(before);
        for event in events {
            if let Some(last) = out.last_mut()
                && last.source() == event.source()
                && last.id() == event.id()
                && let Some(merged) = self.merge(last, &event)
            {
                *last = merged;
                continue;
            }
            out.push(event);
        }
        if out.len() != before {
            tracing::trace!(target: targets::DISPATCH, before, after = out.len(), "coalesced posted events");
        }
        out
    }

    /// Merge two consecutive events with the same id and source.
    fn merge(&self, existing: &Event, incoming: &Event) -> Option<Event> {
        match (&existing.kind, &incoming.kind) {
            (EventKind::Mouse(old), EventKind::Mouse(new))
                if matches!(new.kind, MouseEventKind::Moved | MouseEventKind::Dragged)
                    && old.modifiers == new.modifiers =>
            {
                Some(incoming.clone())
            }
            (EventKind::Paint(old), EventKind::Paint(new)) => {
                let rect = match self
                    .nodes
                    .get(existing.source())
                    .and_then(|n| n.peer.native())
                {
                    Some(peer) => peer.coalesce_paint(old.rect, new.rect)?,
                    None if old.rect.contains_rect(&new.rect) => old.rect,
                    None if new.rect.contains_rect(&old.rect) => new.rect,
                    None => return None,
                };
                let mut merged = existing.clone();
                if let EventKind::Paint(paint) = &mut merged.kind {
                    paint.rect = rect;
                }
                Some(merged)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bough_core::Rect;

    use super::*;
    use crate::config::TreeConfig;
    use crate::event::{MouseEvent, PaintEventKind};
    use crate::headless::HeadlessToolkit;
    use crate::peer::Toolkit;

    fn tree(coalesce: bool) -> (Arc<HeadlessToolkit>, Tree) {
        let toolkit = Arc::new(HeadlessToolkit::new());
        let config = TreeConfig {
            coalesce_events: coalesce,
            ..TreeConfig::strict()
        };
        (toolkit.clone(), Tree::with_config(toolkit, config))
    }

    #[test]
    fn moves_collapse_to_the_latest() {
        let (toolkit, mut tree) = tree(true);
        let leaf = tree.create_component();
        for x in 0..5 {
            toolkit.post_event(Event::mouse(leaf, MouseEvent::new(MouseEventKind::Moved, x, 0)));
        }
        toolkit.post_event(Event::mouse(leaf, MouseEvent::new(MouseEventKind::Pressed, 4, 0)));
        let batch = tree.coalesce(toolkit.take_posted_events());
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].as_mouse().map(|m| m.x), Some(4));
    }

    #[test]
    fn contained_paints_merge_without_peer() {
        let (_, mut tree) = tree(true);
        let leaf = tree.create_component();
        let outer = Event::paint(leaf, PaintEventKind::Paint, Rect::new(0, 0, 50, 50));
        let inner = Event::paint(leaf, PaintEventKind::Paint, Rect::new(5, 5, 5, 5));
        let apart = Event::paint(leaf, PaintEventKind::Paint, Rect::new(60, 60, 5, 5));
        let batch = tree.coalesce(vec![outer, inner, apart]);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn flush_skips_destroyed_sources() {
        let (toolkit, mut tree) = tree(false);
        let kept = tree.create_component();
        let gone = tree.create_component();
        toolkit.post_event(Event::mouse(kept, MouseEvent::new(MouseEventKind::Moved, 0, 0)));
        toolkit.post_event(Event::mouse(gone, MouseEvent::new(MouseEventKind::Moved, 0, 0)));
        tree.nodes.remove(gone);
        assert_eq!(tree.flush_events().unwrap(), 1);
        assert_eq!(toolkit.pending(), 0);
    }
}
