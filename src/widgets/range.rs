//! A value within a range, shown by an indicator child that fills the
//! control in proportion to the value.

use log::warn;

use crate::control::Property;
use crate::error::Result;
use crate::events::{ControlEvent, EventKind, Key};
use crate::geometry::Vec2;
use crate::tree::{ControlId, Tree};
use crate::widgets::{impl_behavior_any, WidgetBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Horizontal,
    /// Fills from the bottom up
    Vertical,
}

#[derive(Debug, Clone)]
pub struct RangeControl {
    min: f32,
    max: f32,
    value: f32,
    step: f32,
    pub orientation: Orientation,
    pub indicator: Option<ControlId>,
    /// Set while the indicator is hidden because the range is empty.
    hid_indicator: bool,
}

impl Default for RangeControl {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            value: 0.0,
            step: 1.0,
            orientation: Orientation::Horizontal,
            indicator: None,
            hid_indicator: false,
        }
    }
}

impl RangeControl {
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            value: min,
            ..Self::default()
        }
    }

    pub fn step(mut self, step: f32) -> Self {
        self.step = step.max(0.0);
        self.value = self.constrain(self.value);
        self
    }

    pub fn value(mut self, value: f32) -> Self {
        self.value = self.constrain(value);
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn indicator(mut self, indicator: ControlId) -> Self {
        self.indicator = Some(indicator);
        self
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn current(&self) -> f32 {
        self.value
    }

    fn is_degenerate(&self) -> bool {
        (self.max - self.min).abs() <= f32::EPSILON
    }

    /// Clamp to the range and snap to the nearest step.
    fn constrain(&self, value: f32) -> f32 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        let mut v = value.clamp(lo, hi);
        if self.step > 0.0 && !self.is_degenerate() {
            v = lo + ((v - lo) / self.step).round() * self.step;
            v = v.clamp(lo, hi);
        }
        v
    }

    /// Position of the value in the range, `0..=1`. Zero for an empty range.
    pub fn fraction(&self) -> f32 {
        if self.is_degenerate() {
            return 0.0;
        }
        ((self.value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Attach a range behavior to `id` and lay out its indicator.
    pub fn install(tree: &mut Tree, id: ControlId, range: RangeControl) -> Result<()> {
        tree.set_behavior(id, range)?;
        tree.with_behavior_as::<RangeControl, _>(id, |range, tree| {
            range.layout_indicator(tree, id)
        })
    }

    /// Returns whether the stored value changed.
    pub fn set_value(tree: &mut Tree, id: ControlId, value: f32) -> Result<bool> {
        tree.with_behavior_as::<RangeControl, _>(id, |range, tree| {
            let value = range.constrain(value);
            if (value - range.value).abs() <= f32::EPSILON {
                return false;
            }
            range.value = value;
            range.layout_indicator(tree, id);
            tree.invalidate(id);
            true
        })
    }

    pub fn set_range(tree: &mut Tree, id: ControlId, min: f32, max: f32) -> Result<()> {
        tree.with_behavior_as::<RangeControl, _>(id, |range, tree| {
            range.min = min;
            range.max = max;
            range.value = range.constrain(range.value);
            range.layout_indicator(tree, id);
            tree.invalidate(id);
        })
    }

    pub fn value_of(tree: &Tree, id: ControlId) -> Option<f32> {
        tree.behavior::<RangeControl>(id).map(|r| r.value)
    }

    /// Size and place the indicator for the current value. An empty range
    /// hides it until the range is non-empty again.
    fn layout_indicator(&mut self, tree: &mut Tree, id: ControlId) {
        let Some(indicator) = self.indicator.filter(|&i| tree.contains(i)) else {
            return;
        };
        if self.is_degenerate() {
            warn!(
                "range on {:?} has min == max ({}); hiding its indicator",
                id, self.min
            );
            self.hid_indicator = tree.set_visible(indicator, false) || self.hid_indicator;
            return;
        }
        if std::mem::take(&mut self.hid_indicator) {
            tree.set_visible(indicator, true);
        }

        let track = tree.size(id);
        let fraction = self.fraction();
        let (size, position) = match self.orientation {
            Orientation::Horizontal => (Vec2::new(track.x * fraction, track.y), Vec2::ZERO),
            Orientation::Vertical => {
                let height = track.y * fraction;
                (
                    Vec2::new(track.x, height),
                    Vec2::new(0.0, track.y - height),
                )
            }
        };
        tree.set_size(indicator, size);
        tree.set_relative_position(indicator, position);
    }

    fn nudge(&mut self, tree: &mut Tree, id: ControlId, direction: f32) {
        let step = if self.step > 0.0 {
            self.step
        } else {
            (self.max - self.min).abs() / 10.0
        };
        let value = self.constrain(self.value + step * direction);
        if value != self.value {
            self.value = value;
            self.layout_indicator(tree, id);
            tree.invalidate(id);
        }
    }
}

impl WidgetBehavior for RangeControl {
    fn on_property_changed(&mut self, tree: &mut Tree, id: ControlId, property: Property) {
        if property == Property::Size {
            self.layout_indicator(tree, id);
        }
    }

    fn event(&mut self, tree: &mut Tree, id: ControlId, event: &mut ControlEvent) {
        if event.is_used() || event.current != id {
            return;
        }
        let direction = match event.kind {
            EventKind::MouseWheel => match event.as_mouse() {
                Some(m) if m.wheel_delta > 0.0 => 1.0,
                Some(m) if m.wheel_delta < 0.0 => -1.0,
                _ => return,
            },
            EventKind::KeyDown => match event.as_key().map(|k| k.key) {
                Some(Key::Right | Key::Up) => 1.0,
                Some(Key::Left | Key::Down) => -1.0,
                _ => return,
            },
            _ => return,
        };
        self.nudge(tree, id, direction);
        event.use_event();
    }

    impl_behavior_any!();
}
