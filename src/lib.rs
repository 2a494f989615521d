//! A retained-mode control tree for game UIs.
//!
//! Controls live in a [`Tree`] that mirrors an external scene graph through
//! the [`HostHierarchy`](host::HostHierarchy) adapter. The tree provides
//! anchored layout, bubbling input events with focus and modal handling,
//! and version-stamped invalidation that tells a renderer which geometry to
//! rebuild.
//!
//! ```
//! use gantry::prelude::*;
//!
//! let mut tree = Tree::with_config(UiConfig::new().screen_size(800.0, 600.0));
//! let window = tree.create_control("window");
//! tree.set_size(window, Vec2::new(400.0, 300.0));
//!
//! let body = tree.create_child(window, "body").unwrap();
//! tree.set_size(body, Vec2::new(380.0, 280.0));
//! tree.set_relative_position(body, Vec2::new(10.0, 10.0));
//! tree.set_anchor(body, AnchorStyle::ALL);
//!
//! tree.set_size(window, Vec2::new(500.0, 400.0));
//! assert_eq!(tree.size(body), Vec2::new(480.0, 380.0));
//! ```

pub mod config;
pub mod context;
pub mod control;
pub mod error;
pub mod events;
pub mod focus;
pub mod frame;
pub mod geometry;
pub mod host;
pub mod jobs;
pub mod layout;
pub mod render;
pub mod transform;
pub mod tree;
pub mod widgets;

pub mod prelude {
    pub use crate::config::UiConfig;
    pub use crate::control::{ControlNode, Notification, Property};
    pub use crate::error::{Result, TreeError};
    pub use crate::events::{
        ControlEvent, ControlObserver, DragEvent, DragState, EventData, EventKind, FocusEvent, Key,
        KeyEvent, Modifiers, MouseButtons, MouseEvent, SubscriptionId, Touch, TouchEvent,
        TouchPhase,
    };
    pub use crate::geometry::{Color, Padding, Pivot, Plane, Ray, Rect, Vec2, Vec3};
    pub use crate::host::{HostHandle, HostHierarchy, SceneGraph};
    pub use crate::layout::{AnchorStyle, Margins};
    pub use crate::render::{MaterialId, RenderData, Vertex};
    pub use crate::transform::Transform;
    pub use crate::tree::{ControlId, Tree};
    pub use crate::widgets::{Orientation, Panel, RangeControl, WidgetBehavior};
}
