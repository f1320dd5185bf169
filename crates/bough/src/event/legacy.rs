//! Old-style single-record events.
//!
//! Nodes that never registered a typed listener or enabled a category still
//! receive input through the legacy path: the event is flattened into a
//! [`LegacyEvent`] and offered to [`Behavior::handle_event`]. Unhandled
//! legacy events travel to the parent with their coordinates translated.
//!
//! [`Behavior::handle_event`]: crate::Behavior::handle_event

use crate::tree::NodeId;

use super::{
    Event, EventKind, FocusEventKind, KeyEventKind, Modifiers, MouseEventKind, WindowEventKind,
};

/// Kind of a legacy event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyEventId {
    /// Key went down.
    KeyPress,
    /// Key went up.
    KeyRelease,
    /// Mouse button went down.
    MouseDown,
    /// Mouse button went up.
    MouseUp,
    /// Pointer moved.
    MouseMove,
    /// Pointer dragged.
    MouseDrag,
    /// Pointer entered.
    MouseEnter,
    /// Pointer left.
    MouseExit,
    /// Focus arrived.
    GotFocus,
    /// Focus left.
    LostFocus,
    /// Window close requested.
    WindowDestroy,
}

/// A flattened event record for the legacy hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyEvent {
    /// What happened.
    pub id: LegacyEventId,
    /// The node currently handling the event.
    pub target: NodeId,
    /// Horizontal position relative to `target`.
    pub x: i32,
    /// Vertical position relative to `target`.
    pub y: i32,
    /// Key code, for key events.
    pub key: u32,
    /// Character produced, for key events.
    pub key_char: Option<char>,
    /// Modifiers held.
    pub modifiers: Modifiers,
    /// Click count, for mouse events.
    pub click_count: u32,
}

impl LegacyEvent {
    /// Flatten `event`.
    ///
    /// Mouse events only convert when `mouse_events` is set. Typed keys,
    /// clicks and categories without a legacy form return `None`.
    pub fn from_event(event: &Event, mouse_events: bool) -> Option<Self> {
        let blank = |id| Self {
            id,
            target: event.source(),
            x: 0,
            y: 0,
            key: 0,
            key_char: None,
            modifiers: Modifiers::empty(),
            click_count: 0,
        };

        match &event.kind {
            EventKind::Key(key) => {
                let id = match key.kind {
                    KeyEventKind::Pressed => LegacyEventId::KeyPress,
                    KeyEventKind::Released => LegacyEventId::KeyRelease,
                    KeyEventKind::Typed => return None,
                };
                Some(Self {
                    key: key.key_code,
                    key_char: key.key_char,
                    modifiers: key.modifiers,
                    ..blank(id)
                })
            }
            EventKind::Mouse(mouse) if mouse_events => {
                let id = match mouse.kind {
                    MouseEventKind::Pressed => LegacyEventId::MouseDown,
                    MouseEventKind::Released => LegacyEventId::MouseUp,
                    MouseEventKind::Moved => LegacyEventId::MouseMove,
                    MouseEventKind::Dragged => LegacyEventId::MouseDrag,
                    MouseEventKind::Entered => LegacyEventId::MouseEnter,
                    MouseEventKind::Exited => LegacyEventId::MouseExit,
                    MouseEventKind::Clicked => return None,
                };
                Some(Self {
                    x: mouse.x,
                    y: mouse.y,
                    modifiers: mouse.modifiers,
                    click_count: mouse.click_count,
                    ..blank(id)
                })
            }
            EventKind::Focus(focus) => Some(blank(match focus.kind {
                FocusEventKind::Gained => LegacyEventId::GotFocus,
                FocusEventKind::Lost => LegacyEventId::LostFocus,
            })),
            EventKind::Window(window) if window.kind == WindowEventKind::Closing => {
                Some(blank(LegacyEventId::WindowDestroy))
            }
            _ => None,
        }
    }

    /// Readdress to `target`, shifting coordinates by `(dx, dy)`.
    pub fn translate_to(&mut self, target: NodeId, dx: i32, dy: i32) {
        self.target = target;
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_add(dy);
    }

    /// Copy key char and modifier changes back into the event they came from.
    pub fn mirror_into(&self, event: &mut Event) {
        if let Some(key) = event.as_key_mut() {
            key.key_char = self.key_char;
            key.modifiers = self.modifiers;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyEvent, MouseEvent};
    use slotmap::KeyData;

    fn node() -> NodeId {
        NodeId::from(KeyData::from_ffi(1))
    }

    #[test]
    fn mouse_conversion_is_opt_in() {
        let event = Event::mouse(node(), MouseEvent::new(MouseEventKind::Pressed, 3, 4));
        assert!(LegacyEvent::from_event(&event, false).is_none());
        let legacy = LegacyEvent::from_event(&event, true).unwrap();
        assert_eq!(legacy.id, LegacyEventId::MouseDown);
        assert_eq!((legacy.x, legacy.y), (3, 4));
    }

    #[test]
    fn typed_keys_have_no_legacy_form() {
        let event = Event::key(node(), KeyEvent::new(KeyEventKind::Typed, 0, Some('a')));
        assert!(LegacyEvent::from_event(&event, true).is_none());
    }

    #[test]
    fn key_mutation_is_mirrored_back() {
        let mut event = Event::key(node(), KeyEvent::new(KeyEventKind::Pressed, 65, Some('a')));
        let mut legacy = LegacyEvent::from_event(&event, true).unwrap();
        legacy.key_char = Some('A');
        legacy.modifiers = Modifiers::SHIFT;
        legacy.mirror_into(&mut event);
        let key = event.as_key().unwrap();
        assert_eq!(key.key_char, Some('A'));
        assert_eq!(key.modifiers, Modifiers::SHIFT);
    }
}
