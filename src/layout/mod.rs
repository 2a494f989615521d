//! Anchored layout.
//!
//! Each control pins some of its edges to its parent's edges. The anchor
//! layout snapshots the current distances into margins ([`snapshot`]) and,
//! when the parent resizes, replays them against the new parent size
//! ([`arrange_size`], then [`arrange_position`]).
//!
//! Margins are either pixel distances from the parent's edges or, with
//! [`AnchorStyle::PROPORTIONAL`], fractions of the parent's size.

mod anchor;

use bitflags::bitflags;

use crate::geometry::Vec2;

bitflags! {
    /// Which parent edges a control follows when the parent resizes
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct AnchorStyle: u8 {
        const TOP = 1 << 0;
        const BOTTOM = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        /// Center horizontally, ignoring the left and right margins for position
        const CENTER_HORIZONTAL = 1 << 4;
        /// Center vertically, ignoring the top and bottom margins for position
        const CENTER_VERTICAL = 1 << 5;
        /// Margins are fractions of the parent size
        const PROPORTIONAL = 1 << 6;

        const ALL = Self::TOP.bits() | Self::BOTTOM.bits() | Self::LEFT.bits() | Self::RIGHT.bits();
        const CENTER = Self::CENTER_HORIZONTAL.bits() | Self::CENTER_VERTICAL.bits();
    }
}

impl AnchorStyle {
    pub fn has_center(self) -> bool {
        self.intersects(Self::CENTER)
    }

    pub fn is_proportional(self) -> bool {
        self.contains(Self::PROPORTIONAL)
    }
}

impl Default for AnchorStyle {
    fn default() -> Self {
        Self::TOP | Self::LEFT
    }
}

/// Distances from the parent's edges.
///
/// In proportional mode `left`/`top` are the fractional positions of the
/// near edges and `right`/`bottom` of the far edges, all measured from the
/// parent's upper-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Per-control layout state, created on first use.
#[derive(Debug, Default)]
pub struct AnchorLayout {
    pub(crate) margins: Option<Margins>,
    pub(crate) suspend_count: u32,
    pub(crate) pending_layout: bool,
    pub(crate) performing_layout: bool,
    pub(crate) layout_passes: u64,
}

impl AnchorLayout {
    pub fn margins(&self) -> Option<Margins> {
        self.margins
    }

    pub fn is_suspended(&self) -> bool {
        self.suspend_count > 0
    }

    pub fn is_layout_pending(&self) -> bool {
        self.pending_layout
    }

    /// Number of layout passes actually executed.
    pub fn layout_passes(&self) -> u64 {
        self.layout_passes
    }
}

fn ratio(value: f32, total: f32) -> f32 {
    if total > 0.0 {
        value / total
    } else {
        0.0
    }
}

/// Capture margins from a control's bounds inside its parent.
pub fn snapshot(anchor: AnchorStyle, position: Vec2, size: Vec2, parent: Vec2) -> Margins {
    if anchor.is_proportional() {
        Margins {
            left: ratio(position.x, parent.x),
            top: ratio(position.y, parent.y),
            right: ratio(position.x + size.x, parent.x),
            bottom: ratio(position.y + size.y, parent.y),
        }
    } else {
        Margins {
            left: position.x,
            top: position.y,
            right: parent.x - size.x - position.x,
            bottom: parent.y - size.y - position.y,
        }
    }
}

/// Size implied by the margins: stretched on axes anchored to both edges,
/// unchanged otherwise.
pub fn arrange_size(anchor: AnchorStyle, margins: &Margins, size: Vec2, parent: Vec2) -> Vec2 {
    let proportional = anchor.is_proportional();
    let mut out = size;
    if anchor.contains(AnchorStyle::LEFT | AnchorStyle::RIGHT) {
        out.x = if proportional {
            (margins.right - margins.left) * parent.x
        } else {
            parent.x - margins.left - margins.right
        };
    }
    if anchor.contains(AnchorStyle::TOP | AnchorStyle::BOTTOM) {
        out.y = if proportional {
            (margins.bottom - margins.top) * parent.y
        } else {
            parent.y - margins.top - margins.bottom
        };
    }
    out.max(Vec2::ZERO)
}

/// Upper-left position implied by the margins for a control of `size`.
pub fn arrange_position(
    anchor: AnchorStyle,
    margins: &Margins,
    position: Vec2,
    size: Vec2,
    parent: Vec2,
) -> Vec2 {
    let proportional = anchor.is_proportional();
    let x = if anchor.contains(AnchorStyle::CENTER_HORIZONTAL) {
        (parent.x - size.x) * 0.5
    } else if anchor.contains(AnchorStyle::LEFT) {
        if proportional {
            margins.left * parent.x
        } else {
            margins.left
        }
    } else if anchor.contains(AnchorStyle::RIGHT) {
        if proportional {
            margins.right * parent.x - size.x
        } else {
            parent.x - margins.right - size.x
        }
    } else {
        position.x
    };
    let y = if anchor.contains(AnchorStyle::CENTER_VERTICAL) {
        (parent.y - size.y) * 0.5
    } else if anchor.contains(AnchorStyle::TOP) {
        if proportional {
            margins.top * parent.y
        } else {
            margins.top
        }
    } else if anchor.contains(AnchorStyle::BOTTOM) {
        if proportional {
            margins.bottom * parent.y - size.y
        } else {
            parent.y - margins.bottom - size.y
        }
    } else {
        position.y
    };
    Vec2::new(x, y)
}
