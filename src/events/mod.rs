//! Input events and their dispatch.
//!
//! Events are created by the input manager (or by the tree itself for focus
//! changes) and raised on a target control. Bubbling kinds then travel up the
//! parent chain; see [`Tree::raise_event`](crate::tree::Tree::raise_event).

mod dispatch;
mod handlers;

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

pub use handlers::{ControlObserver, Handlers, SubscriptionId};

use crate::geometry::{Ray, Vec2};
use crate::tree::ControlId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseEnter,
    MouseLeave,
    MouseMove,
    MouseHover,
    MouseDown,
    MouseUp,
    Click,
    DoubleClick,
    MouseWheel,
    KeyDown,
    KeyPress,
    KeyUp,
    GotFocus,
    LostFocus,
    /// Sent directly to each control whose subtree starts containing focus
    EnterFocus,
    /// Sent directly to each control whose subtree stops containing focus
    LeaveFocus,
    DragStart,
    DragEnd,
    DragDrop,
    DragEnter,
    DragLeave,
    DragOver,
    MultiTouch,
    MultiTouchEnd,
}

impl EventKind {
    /// Whether the event travels up the parent chain after the target.
    pub fn bubbles(self) -> bool {
        !matches!(self, EventKind::EnterFocus | EventKind::LeaveFocus)
    }
}

bitflags! {
    /// Mouse buttons held during an event
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct MouseButtons: u8 {
        const LEFT = 0b001;
        const RIGHT = 0b010;
        const MIDDLE = 0b100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub buttons: MouseButtons,
    /// Screen position in pixels
    pub position: Vec2,
    pub move_delta: Vec2,
    pub clicks: u32,
    pub wheel_delta: f32,
    pub ray: Option<Ray>,
}

impl MouseEvent {
    pub fn at(position: Vec2) -> Self {
        Self {
            buttons: MouseButtons::empty(),
            position,
            move_delta: Vec2::ZERO,
            clicks: 0,
            wheel_delta: 0.0,
            ray: None,
        }
    }

    pub fn with_buttons(mut self, buttons: MouseButtons) -> Self {
        self.buttons = buttons;
        self
    }
}

/// Keyboard modifier state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

/// Named keys for special keyboard keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    /// Text produced by a key press, if any
    pub character: Option<char>,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            character: None,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusEvent {
    pub got_focus: Option<ControlId>,
    pub lost_focus: Option<ControlId>,
}

/// Phase of the drag state machine owned by the input manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    None,
    Dragging,
    Denied,
    Cancelled,
    CancelledNoTarget,
    Dropped,
}

#[derive(Clone)]
pub struct DragEvent {
    pub state: DragState,
    /// Application payload carried by the drag
    pub data: Option<Rc<dyn Any>>,
    pub position: Vec2,
    pub target: Option<ControlId>,
    pub ray: Option<Ray>,
}

impl fmt::Debug for DragEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragEvent")
            .field("state", &self.state)
            .field("has_data", &self.data.is_some())
            .field("position", &self.position)
            .field("target", &self.target)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
    Stationary,
    Ended,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub finger_id: u32,
    pub position: Vec2,
    pub phase: TouchPhase,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TouchEvent {
    pub touches: Vec<Touch>,
}

#[derive(Debug, Clone)]
pub enum EventData {
    None,
    Mouse(MouseEvent),
    Key(KeyEvent),
    Focus(FocusEvent),
    Drag(DragEvent),
    Touch(TouchEvent),
}

/// One event in flight.
///
/// The same instance is handed to every control on the bubble path, so a
/// handler further up sees `used` set by a handler further down.
#[derive(Debug, Clone)]
pub struct ControlEvent {
    pub kind: EventKind,
    pub data: EventData,
    /// Control the event was raised on
    pub source: ControlId,
    /// Control currently handling the event
    pub current: ControlId,
    used: bool,
}

impl ControlEvent {
    pub fn new(kind: EventKind, data: EventData, source: ControlId) -> Self {
        Self {
            kind,
            data,
            source,
            current: source,
            used: false,
        }
    }

    /// Suppress the default reactions of the controls still to come. The
    /// event keeps bubbling.
    pub fn use_event(&mut self) {
        self.used = true;
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn as_mouse(&self) -> Option<&MouseEvent> {
        match &self.data {
            EventData::Mouse(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<&KeyEvent> {
        match &self.data {
            EventData::Key(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_focus(&self) -> Option<&FocusEvent> {
        match &self.data {
            EventData::Focus(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_drag(&self) -> Option<&DragEvent> {
        match &self.data {
            EventData::Drag(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_touch(&self) -> Option<&TouchEvent> {
        match &self.data {
            EventData::Touch(t) => Some(t),
            _ => None,
        }
    }
}
