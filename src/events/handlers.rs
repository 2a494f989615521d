use std::cell::RefCell;
use std::rc::Rc;

use crate::events::{ControlEvent, EventKind};

/// Capability interface for objects that want to hear about a control's
/// events without being part of the control itself.
///
/// Every method defaults to doing nothing; implement the ones you need.
pub trait ControlObserver {
    /// Mouse kinds, including clicks, hover and the wheel.
    fn on_mouse(&mut self, _event: &mut ControlEvent) {}

    fn on_key(&mut self, _event: &mut ControlEvent) {}

    fn on_focus(&mut self, _event: &mut ControlEvent) {}

    fn on_drag(&mut self, _event: &mut ControlEvent) {}

    fn on_touch(&mut self, _event: &mut ControlEvent) {}
}

/// Handle returned by [`Tree::subscribe`](crate::tree::Tree::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&mut ControlEvent)>;

/// Everything listening to one control's events.
#[derive(Default)]
pub struct Handlers {
    observers: Vec<Rc<RefCell<dyn ControlObserver>>>,
    bare: Vec<(EventKind, Box<dyn FnMut()>)>,
    subscribers: Vec<(SubscriptionId, EventKind, Subscriber)>,
    next_subscription: u64,
}

impl Handlers {
    pub fn add_observer(&mut self, observer: Rc<RefCell<dyn ControlObserver>>) {
        if !self.observers.iter().any(|o| Rc::ptr_eq(o, &observer)) {
            self.observers.push(observer);
        }
    }

    pub fn remove_observer(&mut self, observer: &Rc<RefCell<dyn ControlObserver>>) {
        self.observers.retain(|o| !Rc::ptr_eq(o, observer));
    }

    /// Register a handler that takes no arguments.
    pub fn connect_bare(&mut self, kind: EventKind, handler: Box<dyn FnMut()>) {
        self.bare.push((kind, handler));
    }

    pub fn subscribe(&mut self, kind: EventKind, subscriber: Subscriber) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, kind, subscriber));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(s, _, _)| *s != id);
        self.subscribers.len() != before
    }

    pub fn clear(&mut self) {
        self.observers.clear();
        self.bare.clear();
        self.subscribers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty() && self.bare.is_empty() && self.subscribers.is_empty()
    }

    /// Deliver to observers, then to bare handlers for the event's kind.
    pub(crate) fn signal(&mut self, event: &mut ControlEvent) {
        for observer in &self.observers {
            // An observer already borrowed further up the stack is skipped.
            let Ok(mut observer) = observer.try_borrow_mut() else {
                continue;
            };
            match event.kind {
                EventKind::MouseEnter
                | EventKind::MouseLeave
                | EventKind::MouseMove
                | EventKind::MouseHover
                | EventKind::MouseDown
                | EventKind::MouseUp
                | EventKind::Click
                | EventKind::DoubleClick
                | EventKind::MouseWheel => observer.on_mouse(event),
                EventKind::KeyDown | EventKind::KeyPress | EventKind::KeyUp => {
                    observer.on_key(event)
                }
                EventKind::GotFocus
                | EventKind::LostFocus
                | EventKind::EnterFocus
                | EventKind::LeaveFocus => observer.on_focus(event),
                EventKind::DragStart
                | EventKind::DragEnd
                | EventKind::DragDrop
                | EventKind::DragEnter
                | EventKind::DragLeave
                | EventKind::DragOver => observer.on_drag(event),
                EventKind::MultiTouch | EventKind::MultiTouchEnd => observer.on_touch(event),
            }
        }
        for (kind, handler) in self.bare.iter_mut() {
            if *kind == event.kind {
                handler();
            }
        }
    }

    pub(crate) fn notify_subscribers(&mut self, event: &mut ControlEvent) {
        for (_, kind, subscriber) in self.subscribers.iter_mut() {
            if *kind == event.kind {
                subscriber(event);
            }
        }
    }
}
