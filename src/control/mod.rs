//! Control nodes and the read side of their state.
//!
//! A [`ControlNode`] holds the state every control shares: geometry,
//! visibility, hierarchy links and cache bookkeeping. Widget-specific logic
//! lives in an attached [`WidgetBehavior`](crate::widgets::WidgetBehavior).
//!
//! All mutation goes through [`Tree`] methods so that every change bumps the
//! control's version, invalidates its render data and raises a
//! [`Notification`].

mod bounds;
mod focus;
mod hierarchy;
mod properties;

use std::cell::Cell;

use crate::geometry::{
    relative_from_local, world_to_pixels, Color, Pivot, Rect, Vec2, Vec3,
};
use crate::host::HostHandle;
use crate::layout::{AnchorLayout, AnchorStyle};
use crate::tree::{ControlId, Tree};

/// A property whose change raises [`Notification::PropertyChanged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Name,
    Size,
    MinimumSize,
    MaximumSize,
    Position,
    Pivot,
    Anchor,
    ZOrder,
    Visible,
    Enabled,
    Interactive,
    Opacity,
    Color,
    CanFocus,
    TabIndex,
    AutoFocus,
    ClipChildren,
}

/// Change notifications observable through [`Tree::listen`] and
/// [`Tree::listen_all`].
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    ControlAdded {
        parent: ControlId,
        child: ControlId,
    },
    /// `child` is `None` when reconciliation drops a child whose control was
    /// already destroyed.
    ControlRemoved {
        parent: ControlId,
        child: Option<ControlId>,
    },
    ZOrderChanged {
        id: ControlId,
        old: i32,
        new: i32,
    },
    PropertyChanged {
        id: ControlId,
        property: Property,
    },
}

/// z-order of a control that has not been placed among siblings yet.
pub const Z_ORDER_UNSET: i32 = -1;

/// The state shared by every control.
#[derive(Debug)]
pub struct ControlNode {
    pub name: String,
    pub host: Option<HostHandle>,
    pub parent: Option<ControlId>,
    /// Children in ascending z-order
    pub children: Vec<ControlId>,

    pub size: Vec2,
    pub min_size: Vec2,
    /// A zero component means unbounded on that axis
    pub max_size: Vec2,
    /// Host-space offset of the pivot from the parent's pivot (world units, y-up)
    pub local_position: Vec3,
    pub pivot: Pivot,
    pub z_order: i32,

    pub is_visible: bool,
    pub is_enabled: bool,
    pub is_interactive: bool,
    pub opacity: f32,
    pub color: Color,

    pub can_focus: bool,
    pub tab_index: i32,
    pub auto_focus: bool,

    pub clip_children: bool,
    pub render_group: bool,

    pub(crate) anchor: AnchorStyle,
    pub(crate) layout: Option<AnchorLayout>,
    pub(crate) version: u64,
    pub(crate) invalidated: bool,
    pub(crate) disposing: bool,
    pub(crate) rendering: bool,
    pub(crate) cached_relative: Cell<Option<(u64, Vec2)>>,
    pub(crate) cached_corners: Cell<Option<(u64, [Vec3; 4])>>,
}

impl ControlNode {
    pub fn new(name: impl Into<String>, host: Option<HostHandle>) -> Self {
        Self {
            name: name.into(),
            host,
            parent: None,
            children: Vec::new(),
            size: Vec2::ZERO,
            min_size: Vec2::ZERO,
            max_size: Vec2::ZERO,
            local_position: Vec3::ZERO,
            pivot: Pivot::TopLeft,
            z_order: Z_ORDER_UNSET,
            is_visible: true,
            is_enabled: true,
            is_interactive: true,
            opacity: 1.0,
            color: Color::WHITE,
            can_focus: false,
            tab_index: -1,
            auto_focus: false,
            clip_children: false,
            render_group: false,
            anchor: AnchorStyle::default(),
            layout: None,
            version: 0,
            invalidated: true,
            disposing: false,
            rendering: false,
            cached_relative: Cell::new(None),
            cached_corners: Cell::new(None),
        }
    }

    pub fn anchor(&self) -> AnchorStyle {
        self.anchor
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_invalid(&self) -> bool {
        self.invalidated
    }

    pub fn is_disposing(&self) -> bool {
        self.disposing
    }

    pub(crate) fn clear_caches(&self) {
        self.cached_relative.set(None);
        self.cached_corners.set(None);
    }
}

/// Clamp a size to `[min, max]`, treating zero max components as unbounded.
pub fn clamp_size(size: Vec2, min: Vec2, max: Vec2) -> Vec2 {
    let mut out = size.max(min);
    if max.x > 0.0 {
        out.x = out.x.min(max.x.max(min.x));
    }
    if max.y > 0.0 {
        out.y = out.y.min(max.y.max(min.y));
    }
    out
}

impl Tree {
    pub fn version(&self, id: ControlId) -> u64 {
        self.control(id).map_or(0, |c| c.version)
    }

    pub fn is_invalid(&self, id: ControlId) -> bool {
        self.control(id).is_some_and(|c| c.invalidated)
    }

    pub fn size(&self, id: ControlId) -> Vec2 {
        self.control(id).map_or(Vec2::ZERO, |c| c.size)
    }

    pub fn anchor(&self, id: ControlId) -> AnchorStyle {
        self.control(id).map_or(AnchorStyle::empty(), |c| c.anchor)
    }

    pub fn units_per_pixel(&self) -> f32 {
        self.config().world_units_per_pixel()
    }

    /// Size of the parent, or of the screen for a top-level control.
    pub fn parent_size(&self, id: ControlId) -> Vec2 {
        match self.parent(id).and_then(|p| self.control(p)) {
            Some(parent) => parent.size,
            None => self.config().screen_size,
        }
    }

    pub(crate) fn parent_pivot(&self, id: ControlId) -> Pivot {
        self.parent(id)
            .and_then(|p| self.control(p))
            .map_or(Pivot::TopLeft, |p| p.pivot)
    }

    /// Upper-left corner relative to the parent's upper-left corner, in
    /// pixels, y-down.
    ///
    /// Cached until the control's version changes.
    pub fn relative_position(&self, id: ControlId) -> Vec2 {
        let Some(control) = self.control(id) else {
            return Vec2::ZERO;
        };
        if let Some((version, cached)) = control.cached_relative.get() {
            if version == control.version {
                return cached;
            }
        }
        let local = world_to_pixels(control.local_position, self.units_per_pixel());
        let relative = relative_from_local(
            local,
            control.pivot,
            control.size,
            self.parent_pivot(id),
            self.parent_size(id),
        );
        control
            .cached_relative
            .set(Some((control.version, relative)));
        relative
    }

    /// Bounds relative to the parent's upper-left corner.
    pub fn bounds(&self, id: ControlId) -> Rect {
        Rect::from_origin_size(self.relative_position(id), self.size(id))
    }

    /// Visible only if the control and all of its ancestors are.
    pub fn is_visible(&self, id: ControlId) -> bool {
        let chain = self.ancestry(id);
        !chain.is_empty()
            && chain
                .iter()
                .all(|&c| self.control(c).is_some_and(|c| c.is_visible))
    }

    /// Enabled only if the control and all of its ancestors are.
    pub fn is_enabled(&self, id: ControlId) -> bool {
        let chain = self.ancestry(id);
        !chain.is_empty()
            && chain
                .iter()
                .all(|&c| self.control(c).is_some_and(|c| c.is_enabled))
    }

    /// Product of the opacities up the parent chain. Not cached.
    pub fn effective_opacity(&self, id: ControlId) -> f32 {
        self.ancestry(id)
            .iter()
            .filter_map(|&c| self.control(c))
            .map(|c| c.opacity)
            .product()
    }

    /// The control's color with its alpha scaled by the effective opacity.
    pub fn effective_color(&self, id: ControlId) -> Color {
        let color = self.control(id).map_or(Color::WHITE, |c| c.color);
        color.with_alpha(color.a * self.effective_opacity(id))
    }

    /// Whether the control can take focus at all: the explicit flag plus
    /// interactivity.
    pub fn can_focus(&self, id: ControlId) -> bool {
        self.control(id)
            .is_some_and(|c| c.can_focus && c.is_interactive)
    }

    /// Nearest ancestor-or-self flagged as a render group.
    pub fn render_group_of(&self, id: ControlId) -> Option<ControlId> {
        self.ancestry(id)
            .into_iter()
            .find(|&c| self.control(c).is_some_and(|c| c.render_group))
    }

    /// Find a control by name in a subtree, depth first.
    pub fn find_by_name(&self, root: ControlId, name: &str) -> Option<ControlId> {
        self.descendants(root)
            .into_iter()
            .find(|&c| self.control(c).is_some_and(|c| c.name == name))
    }
}
