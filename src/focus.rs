//! Focus and modal bookkeeping.
//!
//! Only one control can have input focus at a time. The manager only records
//! state; the tree performs the transfer and delivers the focus events (see
//! `Tree::set_focus`).

use crate::tree::ControlId;

#[derive(Debug, Default)]
pub struct FocusManager {
    focused: Option<ControlId>,
    modal_stack: Vec<ControlId>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The control that currently has input focus, if any.
    pub fn focused(&self) -> Option<ControlId> {
        self.focused
    }

    pub fn has_focus(&self, id: ControlId) -> bool {
        self.focused == Some(id)
    }

    /// Record a new focus owner and return the previous one.
    pub(crate) fn replace(&mut self, id: Option<ControlId>) -> Option<ControlId> {
        std::mem::replace(&mut self.focused, id)
    }

    pub(crate) fn push_modal(&mut self, id: ControlId) {
        self.modal_stack.retain(|&m| m != id);
        self.modal_stack.push(id);
    }

    pub(crate) fn pop_modal(&mut self) -> Option<ControlId> {
        self.modal_stack.pop()
    }

    /// Topmost modal control.
    pub fn modal_control(&self) -> Option<ControlId> {
        self.modal_stack.last().copied()
    }

    /// Drop every claim a control holds. Returns true if it had focus.
    pub(crate) fn relinquish(&mut self, id: ControlId) -> bool {
        self.modal_stack.retain(|&m| m != id);
        if self.focused == Some(id) {
            self.focused = None;
            return true;
        }
        false
    }

    pub(crate) fn reset(&mut self) {
        self.focused = None;
        self.modal_stack.clear();
    }
}
