//! Bubbling dispatch.
//!
//! At each control on the path the event goes, in order, to the widget
//! behavior, the built-in Tab navigation (key-down only), the observers and
//! bare handlers, and finally the typed subscribers. The behavior sees every
//! event and checks `used` itself; the remaining steps are skipped once the
//! event is used. Either way the event moves on to the parent: `used` only
//! suppresses reactions, never the traversal.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::events::{
    ControlEvent, ControlObserver, DragEvent, EventData, EventKind, Key, KeyEvent, MouseEvent,
    SubscriptionId, TouchEvent,
};
use crate::tree::{ControlId, Tree};

impl Tree {
    /// Attach an observer to a control. Attaching the same observer twice
    /// has no effect.
    pub fn attach_observer(
        &mut self,
        id: ControlId,
        observer: Rc<RefCell<dyn ControlObserver>>,
    ) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.handlers.add_observer(observer);
                true
            }
            None => false,
        }
    }

    pub fn detach_observer(&mut self, id: ControlId, observer: &Rc<RefCell<dyn ControlObserver>>) {
        if let Some(node) = self.node_mut(id) {
            node.handlers.remove_observer(observer);
        }
    }

    /// Register a handler that does not care about the event payload.
    pub fn connect_bare(
        &mut self,
        id: ControlId,
        kind: EventKind,
        handler: impl FnMut() + 'static,
    ) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.handlers.connect_bare(kind, Box::new(handler));
                true
            }
            None => false,
        }
    }

    pub fn subscribe(
        &mut self,
        id: ControlId,
        kind: EventKind,
        subscriber: impl FnMut(&mut ControlEvent) + 'static,
    ) -> Option<SubscriptionId> {
        self.node_mut(id)
            .map(|node| node.handlers.subscribe(kind, Box::new(subscriber)))
    }

    pub fn unsubscribe(&mut self, id: ControlId, subscription: SubscriptionId) -> bool {
        self.node_mut(id)
            .is_some_and(|node| node.handlers.unsubscribe(subscription))
    }

    /// Raise an event on `id`. Bubbling kinds then continue up the parent
    /// chain regardless of whether a handler used the event.
    pub fn raise_event(&mut self, id: ControlId, event: &mut ControlEvent) {
        let mut current = Some(id);
        while let Some(control) = current {
            if !self.contains(control) {
                break;
            }
            let parent = self.parent(control);
            event.current = control;
            self.deliver(control, event);
            if !event.kind.bubbles() {
                break;
            }
            current = parent;
        }
    }

    fn deliver(&mut self, id: ControlId, event: &mut ControlEvent) {
        self.with_behavior(id, |behavior, tree| behavior.event(tree, id, event));
        if !event.is_used() && event.kind == EventKind::KeyDown {
            if let Some(key) = event.as_key().copied() {
                if key.key == Key::Tab {
                    self.handle_tab_key(id, &key, event);
                }
            }
        }
        if !event.is_used() {
            if let Some(node) = self.node_mut(id) {
                node.handlers.signal(event);
            }
        }
        if !event.is_used() {
            if let Some(node) = self.node_mut(id) {
                node.handlers.notify_subscribers(event);
            }
        }
    }

    fn is_tab_stop(&self, id: ControlId) -> bool {
        self.can_focus(id)
            && self.control(id).is_some_and(|c| c.tab_index >= 0)
            && self.is_visible(id)
            && self.is_enabled(id)
    }

    /// Move focus to the next tab stop under the root, ordered by tab index
    /// then render order. Shift moves backwards. Both directions wrap.
    fn handle_tab_key(&mut self, id: ControlId, key: &KeyEvent, event: &mut ControlEvent) {
        let root = self.root_of(id);
        let order = self.descendants(root);
        let key_of = |tree: &Tree, position: usize, control: ControlId| {
            let tab_index = tree.control(control).map_or(-1, |c| c.tab_index);
            (tab_index, position)
        };

        let mut stops: Vec<((i32, usize), ControlId)> = order
            .iter()
            .enumerate()
            .filter(|&(_, &c)| self.is_tab_stop(c))
            .map(|(position, &c)| (key_of(self, position, c), c))
            .collect();
        if stops.is_empty() {
            return;
        }
        stops.sort_by_key(|&(k, _)| k);

        let backward = key.modifiers.shift;
        let len = stops.len();
        let pick = match stops.iter().position(|&(_, c)| c == id) {
            Some(i) if backward => (i + len - 1) % len,
            Some(i) => (i + 1) % len,
            None => {
                let own_position = order.iter().position(|&c| c == id).unwrap_or(0);
                let own = key_of(self, own_position, id);
                if backward {
                    stops.iter().rposition(|&(k, _)| k < own).unwrap_or(len - 1)
                } else {
                    stops.iter().position(|&(k, _)| k > own).unwrap_or(0)
                }
            }
        };

        let target = stops[pick].1;
        debug!("tab from {:?} to {:?}", id, target);
        self.focus(target);
        event.use_event();
    }

    /// Raise a mouse event and hand it back so the caller can inspect `used`.
    pub fn raise_mouse(&mut self, id: ControlId, kind: EventKind, mouse: MouseEvent) -> ControlEvent {
        let mut event = ControlEvent::new(kind, EventData::Mouse(mouse), id);
        self.raise_event(id, &mut event);
        event
    }

    pub fn raise_key(&mut self, id: ControlId, kind: EventKind, key: KeyEvent) -> ControlEvent {
        let mut event = ControlEvent::new(kind, EventData::Key(key), id);
        self.raise_event(id, &mut event);
        event
    }

    pub fn raise_drag(&mut self, id: ControlId, kind: EventKind, drag: DragEvent) -> ControlEvent {
        let mut event = ControlEvent::new(kind, EventData::Drag(drag), id);
        self.raise_event(id, &mut event);
        event
    }

    pub fn raise_touch(&mut self, id: ControlId, kind: EventKind, touch: TouchEvent) -> ControlEvent {
        let mut event = ControlEvent::new(kind, EventData::Touch(touch), id);
        self.raise_event(id, &mut event);
        event
    }
}
