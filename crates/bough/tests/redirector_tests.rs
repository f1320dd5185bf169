//! Input redirection from native hosts to lightweight children.

use std::sync::Arc;

use bough::event::{FocusEventKind, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use bough::headless::PeerCall;
use bough::listener::{FocusListener, KeyListener, MouseListener, MouseMotionListener};
use bough::{CursorShape, Event, HeadlessToolkit, Listener, NodeId, Rect, Size, Tree};
use parking_lot::Mutex;

type Log = Arc<Mutex<Vec<String>>>;

struct Recorder {
    name: &'static str,
    log: Log,
}

impl Recorder {
    fn push(&self, what: &str, event: &Event) {
        let entry = match event.as_mouse() {
            Some(mouse) if what != "entered" && what != "exited" => {
                format!("{} {what} {},{}", self.name, mouse.x, mouse.y)
            }
            _ => format!("{} {what}", self.name),
        };
        self.log.lock().push(entry);
    }
}

impl MouseListener for Recorder {
    fn mouse_pressed(&self, _tree: &mut Tree, event: &mut Event) {
        self.push("pressed", event);
    }
    fn mouse_released(&self, _tree: &mut Tree, event: &mut Event) {
        self.push("released", event);
    }
    fn mouse_clicked(&self, _tree: &mut Tree, event: &mut Event) {
        self.push("clicked", event);
    }
    fn mouse_entered(&self, _tree: &mut Tree, event: &mut Event) {
        self.push("entered", event);
    }
    fn mouse_exited(&self, _tree: &mut Tree, event: &mut Event) {
        self.push("exited", event);
    }
}

impl MouseMotionListener for Recorder {
    fn mouse_dragged(&self, _tree: &mut Tree, event: &mut Event) {
        self.push("dragged", event);
    }
}

impl FocusListener for Recorder {
    fn focus_gained(&self, _tree: &mut Tree, event: &mut Event) {
        self.push("gained", event);
    }
    fn focus_lost(&self, _tree: &mut Tree, event: &mut Event) {
        self.push("lost", event);
    }
}

impl KeyListener for Recorder {
    fn key_pressed(&self, _tree: &mut Tree, event: &mut Event) {
        self.push("key", event);
    }
}

fn record(tree: &mut Tree, node: NodeId, name: &'static str, log: &Log) {
    let recorder = Arc::new(Recorder {
        name,
        log: log.clone(),
    });
    tree.add_listener(node, Listener::Mouse(recorder.clone())).unwrap();
    tree.add_listener(node, Listener::MouseMotion(recorder.clone())).unwrap();
    tree.add_listener(node, Listener::Focus(recorder.clone())).unwrap();
    tree.add_listener(node, Listener::Key(recorder)).unwrap();
}

struct Host {
    toolkit: Arc<HeadlessToolkit>,
    tree: Tree,
    window: NodeId,
    l1: NodeId,
    l2: NodeId,
    log: Log,
}

/// Honours `RUST_LOG`, e.g. `RUST_LOG=bough::redirector=trace`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A window at `origin` hosting L1 over x in [0, 10) and L2 over [10, 20).
fn host_at(origin: (i32, i32)) -> Host {
    init_tracing();
    let toolkit = Arc::new(HeadlessToolkit::new());
    let mut tree = Tree::new(toolkit.clone());
    let log = Log::default();
    let window = tree.create_window();
    let l1 = tree.create_component();
    let l2 = tree.create_component();
    tree.set_bounds(window, Rect::new(origin.0, origin.1, 20, 20)).unwrap();
    tree.set_bounds(l1, Rect::new(0, 0, 10, 20)).unwrap();
    tree.set_bounds(l2, Rect::new(10, 0, 10, 20)).unwrap();
    tree.add(window, l1, None, None).unwrap();
    tree.add(window, l2, None, None).unwrap();
    record(&mut tree, l1, "L1", &log);
    record(&mut tree, l2, "L2", &log);
    tree.set_visible(window, true).unwrap();
    Host {
        toolkit,
        tree,
        window,
        l1,
        l2,
        log,
    }
}

fn native_mouse(tree: &mut Tree, host: NodeId, kind: MouseEventKind, x: i32, y: i32) -> Event {
    let mut event = Event::mouse(host, MouseEvent::new(kind, x, y));
    tree.dispatch_event(&mut event).unwrap();
    event
}

fn drain(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.lock())
}

#[test]
fn test_drag_stays_with_pressed_child() {
    let Host {
        mut tree,
        window,
        log,
        ..
    } = host_at((0, 0));

    native_mouse(&mut tree, window, MouseEventKind::Pressed, 5, 5);
    native_mouse(&mut tree, window, MouseEventKind::Dragged, 12, 5);
    native_mouse(&mut tree, window, MouseEventKind::Dragged, 15, 5);
    let during = drain(&log);
    assert_eq!(
        during,
        ["L1 entered", "L1 pressed 5,5", "L1 dragged 12,5", "L1 dragged 15,5"]
    );
    assert!(during.iter().all(|entry| !entry.starts_with("L2")));

    native_mouse(&mut tree, window, MouseEventKind::Released, 15, 5);
    assert_eq!(
        drain(&log),
        ["L1 released 15,5", "L1 exited", "L2 entered"]
    );
}

#[test]
fn test_click_after_orphaned_release_is_swallowed() {
    let Host {
        mut tree,
        window,
        log,
        ..
    } = host_at((0, 0));

    native_mouse(&mut tree, window, MouseEventKind::Pressed, 5, 5);
    native_mouse(&mut tree, window, MouseEventKind::Released, 15, 5);
    drain(&log);
    let click = native_mouse(&mut tree, window, MouseEventKind::Clicked, 15, 5);
    assert!(click.is_consumed());
    assert!(drain(&log).is_empty());

    // The next click on the same child goes through again.
    native_mouse(&mut tree, window, MouseEventKind::Pressed, 15, 5);
    native_mouse(&mut tree, window, MouseEventKind::Released, 15, 5);
    native_mouse(&mut tree, window, MouseEventKind::Clicked, 15, 5);
    assert_eq!(
        drain(&log),
        ["L2 pressed 5,5", "L2 released 5,5", "L2 clicked 5,5"]
    );
}

#[test]
fn test_enter_exit_between_children_keeps_host_entered() {
    let Host {
        mut tree,
        window,
        log,
        ..
    } = host_at((0, 0));
    record(&mut tree, window, "host", &log);

    native_mouse(&mut tree, window, MouseEventKind::Entered, 5, 5);
    native_mouse(&mut tree, window, MouseEventKind::Moved, 5, 5);
    assert_eq!(drain(&log), ["host entered", "L1 entered"]);

    native_mouse(&mut tree, window, MouseEventKind::Moved, 15, 5);
    assert_eq!(drain(&log), ["L1 exited", "L2 entered"]);

    native_mouse(&mut tree, window, MouseEventKind::Exited, 25, 5);
    assert_eq!(drain(&log), ["L2 exited", "host exited"]);
}

#[test]
fn test_press_on_unbounded_child_does_not_overflow() {
    let Host {
        mut tree,
        window,
        log,
        ..
    } = host_at((0, 0));
    tree.set_bounds(window, Rect::new(0, 0, 100, 20)).unwrap();
    let wide = tree.create_component();
    tree.set_bounds(wide, Rect::new(10, 0, Size::MAX.width, 20)).unwrap();
    tree.add(window, wide, None, Some(0)).unwrap();
    record(&mut tree, wide, "wide", &log);
    drain(&log);

    native_mouse(&mut tree, window, MouseEventKind::Pressed, 50, 5);
    assert_eq!(drain(&log), ["wide entered", "wide pressed 40,5"]);
}

#[test]
fn test_native_crossing_events_are_consumed() {
    let Host {
        mut tree,
        window,
        toolkit,
        ..
    } = host_at((0, 0));
    let entered = native_mouse(&mut tree, window, MouseEventKind::Entered, 5, 5);
    assert!(entered.is_consumed());
    let peer = toolkit.peer_for(window).unwrap();
    assert!(
        peer.calls()
            .iter()
            .any(|call| matches!(call, PeerCall::HandleEvent(_)))
    );
}

#[test]
fn test_cursor_is_stashed_and_restored() {
    let Host {
        mut tree,
        window,
        l1,
        toolkit,
        ..
    } = host_at((0, 0));
    tree.set_cursor(l1, Some(CursorShape::Hand)).unwrap();
    let peer = toolkit.peer_for(window).unwrap();
    peer.clear_calls();

    native_mouse(&mut tree, window, MouseEventKind::Pressed, 5, 5);
    native_mouse(&mut tree, window, MouseEventKind::Released, 5, 5);
    let cursors = |calls: Vec<PeerCall>| -> Vec<CursorShape> {
        calls
            .into_iter()
            .filter_map(|call| match call {
                PeerCall::SetCursor(cursor) => Some(cursor),
                _ => None,
            })
            .collect()
    };
    assert_eq!(cursors(peer.calls()).last(), Some(&CursorShape::Hand));

    peer.clear_calls();
    native_mouse(&mut tree, window, MouseEventKind::Exited, 30, 5);
    assert_eq!(cursors(peer.calls()).last(), Some(&CursorShape::Arrow));
}

#[test]
fn test_drag_from_another_host_crosses_children() {
    init_tracing();
    let toolkit = Arc::new(HeadlessToolkit::new());
    let mut tree = Tree::new(toolkit);
    let log = Log::default();

    let source = tree.create_window();
    tree.set_bounds(source, Rect::new(0, 0, 50, 50)).unwrap();
    tree.set_visible(source, true).unwrap();

    let target = tree.create_window();
    let a = tree.create_component();
    let b = tree.create_component();
    tree.set_bounds(target, Rect::new(100, 0, 20, 20)).unwrap();
    tree.set_bounds(a, Rect::new(0, 0, 10, 20)).unwrap();
    tree.set_bounds(b, Rect::new(10, 0, 10, 20)).unwrap();
    tree.add(target, a, None, None).unwrap();
    tree.add(target, b, None, None).unwrap();
    record(&mut tree, a, "A", &log);
    record(&mut tree, b, "B", &log);
    tree.set_visible(target, true).unwrap();

    native_mouse(&mut tree, target, MouseEventKind::Entered, 5, 5);
    assert_eq!(drain(&log), ["A entered"]);

    // Screen x 115 is target-local x 15.
    native_mouse(&mut tree, source, MouseEventKind::Dragged, 115, 5);
    assert_eq!(drain(&log), ["A exited", "B entered"]);

    native_mouse(&mut tree, target, MouseEventKind::Exited, 25, 5);
    assert_eq!(drain(&log), ["B exited"]);
    native_mouse(&mut tree, source, MouseEventKind::Dragged, 105, 5);
    assert!(drain(&log).is_empty());
}

#[test]
fn test_focus_handoff_between_lightweight_children() {
    let Host {
        mut tree,
        window,
        l1,
        l2,
        log,
        toolkit,
    } = host_at((0, 0));
    let peer = toolkit.peer_for(window).unwrap();

    // The window is not focused yet, so the first request goes native.
    assert!(tree.request_focus(l1).unwrap());
    assert!(peer.calls().contains(&PeerCall::RequestFocus));
    let mut gained = Event::focus(window, FocusEventKind::Gained, false);
    tree.dispatch_event(&mut gained).unwrap();
    assert_eq!(drain(&log), ["L1 gained"]);
    assert_eq!(tree.focus_owner(window).unwrap(), Some(l1));

    peer.clear_calls();
    assert!(tree.request_focus(l2).unwrap());
    assert_eq!(drain(&log), ["L1 lost", "L2 gained"]);
    assert!(!peer.calls().contains(&PeerCall::RequestFocus));
    assert_eq!(tree.focus_owner(window).unwrap(), Some(l2));
    assert!(tree.has_focus(l2).unwrap());
    assert!(!tree.has_focus(l1).unwrap());

    let mut key = Event::key(window, KeyEvent::new(KeyEventKind::Pressed, 65, Some('a')));
    tree.dispatch_event(&mut key).unwrap();
    assert_eq!(drain(&log), ["L2 key"]);
}

#[test]
fn test_removing_focused_child_forgets_it() {
    let Host {
        mut tree,
        window,
        l1,
        log,
        ..
    } = host_at((0, 0));
    tree.request_focus(l1).unwrap();
    tree.remove(window, l1).unwrap();
    drain(&log);

    let mut key = Event::key(window, KeyEvent::new(KeyEventKind::Pressed, 65, Some('a')));
    tree.dispatch_event(&mut key).unwrap();
    assert!(drain(&log).is_empty());
    assert!(!key.is_consumed());
}
