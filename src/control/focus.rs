//! Focus transfer and the modal stack.

use crate::events::{ControlEvent, EventData, EventKind, FocusEvent};
use crate::tree::{ControlId, Tree};

impl Tree {
    pub fn focused_control(&self) -> Option<ControlId> {
        self.ctx.focus.focused()
    }

    pub fn has_focus(&self, id: ControlId) -> bool {
        self.ctx.focus.has_focus(id)
    }

    /// True if `id` or one of its descendants holds focus.
    pub fn contains_focus(&self, id: ControlId) -> bool {
        match self.ctx.focus.focused() {
            Some(focused) => focused == id || self.is_ancestor(id, focused),
            None => false,
        }
    }

    /// Request input focus.
    ///
    /// Does nothing if the control cannot take focus, already has it, or is
    /// disabled or hidden.
    pub fn focus(&mut self, id: ControlId) -> bool {
        if !self.can_focus(id)
            || self.has_focus(id)
            || !self.is_enabled(id)
            || !self.is_visible(id)
        {
            return false;
        }
        self.set_focus(Some(id));
        self.invalidate(id);
        true
    }

    /// Give up focus if this control or a descendant holds it.
    pub fn unfocus(&mut self, id: ControlId) -> bool {
        if !self.contains_focus(id) {
            return false;
        }
        self.set_focus(None);
        self.invalidate(id);
        true
    }

    /// Clear focus held inside `id`'s subtree if the focused control is no
    /// longer effectively visible and enabled, e.g. after a move under a
    /// hidden parent.
    pub(crate) fn release_unreachable_focus(&mut self, id: ControlId) {
        let Some(focused) = self.ctx.focus.focused() else {
            return;
        };
        if self.contains_focus(id) && (!self.is_visible(focused) || !self.is_enabled(focused)) {
            self.unfocus(id);
        }
    }

    /// Move focus, raising the focus events.
    ///
    /// `LostFocus` and `GotFocus` bubble from the old and new focus.
    /// `LeaveFocus` and `EnterFocus` go directly to each control whose
    /// ancestry stops or starts containing the focus.
    pub fn set_focus(&mut self, target: Option<ControlId>) {
        let target = target.filter(|&t| self.contains(t));
        let previous = self.ctx.focus.focused();
        if previous == target {
            return;
        }
        self.ctx.focus.replace(target);

        let previous = previous.filter(|&p| self.contains(p));
        let old_chain = previous.map(|p| self.ancestry(p)).unwrap_or_default();
        let new_chain = target.map(|t| self.ancestry(t)).unwrap_or_default();
        let data = FocusEvent {
            got_focus: target,
            lost_focus: previous,
        };

        if let Some(old) = previous {
            let mut event = ControlEvent::new(EventKind::LostFocus, EventData::Focus(data), old);
            self.raise_event(old, &mut event);
        }
        for &control in old_chain.iter().filter(|c| !new_chain.contains(c)) {
            let mut event =
                ControlEvent::new(EventKind::LeaveFocus, EventData::Focus(data), control);
            self.raise_event(control, &mut event);
        }
        for &control in new_chain.iter().filter(|c| !old_chain.contains(c)) {
            let mut event =
                ControlEvent::new(EventKind::EnterFocus, EventData::Focus(data), control);
            self.raise_event(control, &mut event);
        }
        if let Some(new) = target {
            let mut event = ControlEvent::new(EventKind::GotFocus, EventData::Focus(data), new);
            self.raise_event(new, &mut event);
        }
    }

    /// Restrict input to `id` and its descendants until the matching
    /// [`Tree::pop_modal`].
    pub fn push_modal(&mut self, id: ControlId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.ctx.focus.push_modal(id);
        true
    }

    pub fn pop_modal(&mut self) -> Option<ControlId> {
        self.ctx.focus.pop_modal()
    }

    pub fn modal_control(&self) -> Option<ControlId> {
        self.ctx.focus.modal_control()
    }

    /// Whether the modal filter lets input reach `id`.
    pub fn accepts_input(&self, id: ControlId) -> bool {
        match self.modal_control() {
            Some(modal) => modal == id || self.is_ancestor(modal, id),
            None => true,
        }
    }
}
