//! Property setters.
//!
//! Every setter follows the same sequence: compare against the current value
//! and bail out if nothing changed, store the new value, run the
//! property-specific side effects and raise a notification, then invalidate.
//! Setters return `true` when the value changed; a stale id is treated as
//! "nothing changed".

use crate::control::{clamp_size, Notification, Property};
use crate::geometry::{local_from_relative, pixels_to_world, world_to_pixels, Color, Pivot, Vec2, Vec3};
use crate::jobs::JobType;
use crate::tree::{ControlId, Tree};

impl Tree {
    /// Bump the version, drop cached geometry and mark the render data dirty.
    ///
    /// Ignored while the tree shuts down.
    pub fn invalidate(&mut self, id: ControlId) {
        if self.ctx.is_shutting_down() || !self.contains(id) {
            return;
        }
        let version = self.ctx.next_version();
        if let Some(control) = self.control_mut(id) {
            control.version = version;
            control.invalidated = true;
            control.clear_caches();
        }
        let group = self.render_group_of(id);
        self.ctx.mark_dirty(group);
    }

    /// Raise a property notification and forward it to the behavior.
    pub(crate) fn property_changed(&mut self, id: ControlId, property: Property) {
        self.notify(id, Notification::PropertyChanged { id, property });
        self.with_behavior(id, |behavior, tree| {
            behavior.on_property_changed(tree, id, property)
        });
    }

    /// Notify and invalidate every descendant of `id`, whose effective value
    /// of `property` derives from `id`.
    fn cascade_to_descendants(&mut self, id: ControlId, property: Property) {
        for descendant in self.descendants(id).into_iter().skip(1) {
            self.property_changed(descendant, property);
            self.invalidate(descendant);
        }
    }

    pub fn set_name(&mut self, id: ControlId, name: &str) -> bool {
        match self.control_mut(id) {
            Some(c) if c.name != name => c.name = name.to_string(),
            _ => return false,
        }
        self.property_changed(id, Property::Name);
        self.invalidate(id);
        true
    }

    /// Minimum size reported by the behavior, falling back to `min_size`.
    pub fn calculate_minimum_size(&self, id: ControlId) -> Vec2 {
        let Some(node) = self.node(id) else {
            return Vec2::ZERO;
        };
        match &node.behavior {
            Some(behavior) => behavior.calculate_minimum_size(self, id),
            None => node.control.min_size,
        }
    }

    /// Resize, clamped to the minimum and maximum size.
    ///
    /// Changes of a pixel or less are ignored.
    pub fn set_size(&mut self, id: ControlId, size: Vec2) -> bool {
        self.resize(id, size, false)
    }

    pub(crate) fn resize(&mut self, id: ControlId, size: Vec2, force: bool) -> bool {
        let Some(control) = self.control(id) else {
            return false;
        };
        let current = control.size;
        let max = control.max_size;
        let clamped = clamp_size(size, self.calculate_minimum_size(id), max);
        let delta = clamped - current;
        if delta.length_squared() <= 1.0 && !(force && delta != Vec2::ZERO) {
            return false;
        }
        if let Some(control) = self.control_mut(id) {
            control.size = clamped;
        }
        self.on_size_changed(id);
        true
    }

    fn on_size_changed(&mut self, id: ControlId) {
        // The pivot offset depends on the size, so layout must not read a
        // stale relative position.
        if let Some(c) = self.control(id) {
            c.clear_caches();
        }
        self.reset_layout(id, false);
        if self.anchor(id).has_center() {
            self.perform_layout(id);
        }
        self.property_changed(id, Property::Size);
        self.invalidate(id);

        let children = self.children(id).to_vec();
        for &child in &children {
            if let Some(c) = self.control(child) {
                c.clear_caches();
            }
        }
        for child in children {
            self.perform_layout(child);
        }
    }

    pub fn set_min_size(&mut self, id: ControlId, min: Vec2) -> bool {
        match self.control_mut(id) {
            Some(c) if c.min_size != min => c.min_size = min,
            _ => return false,
        }
        self.property_changed(id, Property::MinimumSize);
        self.invalidate(id);
        let size = self.size(id);
        self.resize(id, size, true);
        true
    }

    pub fn set_max_size(&mut self, id: ControlId, max: Vec2) -> bool {
        match self.control_mut(id) {
            Some(c) if c.max_size != max => c.max_size = max,
            _ => return false,
        }
        self.property_changed(id, Property::MaximumSize);
        self.invalidate(id);
        let size = self.size(id);
        self.resize(id, size, true);
        true
    }

    /// Move the control so its upper-left corner sits at `position` relative
    /// to the parent's upper-left corner (pixels, y-down).
    pub fn set_relative_position(&mut self, id: ControlId, position: Vec2) -> bool {
        let Some(control) = self.control(id) else {
            return false;
        };
        let upp = self.units_per_pixel();
        let current_local = control.local_position;
        let local = local_from_relative(
            position,
            control.pivot,
            control.size,
            self.parent_pivot(id),
            self.parent_size(id),
        );
        if (local - world_to_pixels(current_local, upp)).length_squared() <= f32::EPSILON {
            return false;
        }
        let world = pixels_to_world(local, upp);
        self.write_local_position(id, Vec3::new(world.x, world.y, current_local.z));
        true
    }

    /// Move the control's pivot to `position`, in host units relative to the
    /// parent's pivot.
    pub fn set_local_position(&mut self, id: ControlId, position: Vec3) -> bool {
        match self.control(id) {
            Some(c) if (c.local_position - position).length_squared() > f32::EPSILON * f32::EPSILON => {}
            _ => return false,
        }
        self.write_local_position(id, position);
        true
    }

    fn write_local_position(&mut self, id: ControlId, position: Vec3) {
        let host = match self.control_mut(id) {
            Some(c) => {
                c.local_position = position;
                c.host
            }
            None => return,
        };
        if let Some(host) = host {
            self.host.set_local_position(host, position);
        }
        self.on_position_changed(id);
    }

    pub(crate) fn on_position_changed(&mut self, id: ControlId) {
        for descendant in self.descendants(id) {
            if let Some(c) = self.control(descendant) {
                c.clear_caches();
            }
        }
        self.reset_layout(id, false);
        self.property_changed(id, Property::Position);
        self.invalidate(id);
    }

    /// Change the pivot without moving the control on screen.
    pub fn set_pivot(&mut self, id: ControlId, pivot: Pivot) -> bool {
        match self.control(id) {
            Some(c) if c.pivot != pivot => {}
            _ => return false,
        }
        let relative = self.relative_position(id);
        if let Some(c) = self.control_mut(id) {
            c.pivot = pivot;
            c.clear_caches();
        }
        self.set_relative_position(id, relative);
        for &child in self.children(id) {
            if let Some(c) = self.control(child) {
                c.clear_caches();
            }
        }
        self.property_changed(id, Property::Pivot);
        self.invalidate(id);
        true
    }

    pub fn set_visible(&mut self, id: ControlId, visible: bool) -> bool {
        match self.control_mut(id) {
            Some(c) if c.is_visible != visible => c.is_visible = visible,
            _ => return false,
        }
        self.property_changed(id, Property::Visible);
        self.invalidate(id);
        self.cascade_to_descendants(id, Property::Visible);

        if !self.is_visible(id) && self.contains_focus(id) {
            self.set_focus(None);
        }
        if visible {
            self.queue_auto_focus(id);
        }
        true
    }

    pub fn set_enabled(&mut self, id: ControlId, enabled: bool) -> bool {
        match self.control_mut(id) {
            Some(c) if c.is_enabled != enabled => c.is_enabled = enabled,
            _ => return false,
        }
        self.property_changed(id, Property::Enabled);
        self.invalidate(id);
        self.cascade_to_descendants(id, Property::Enabled);

        if !self.is_enabled(id) && self.contains_focus(id) {
            self.set_focus(None);
        }
        if enabled {
            self.queue_auto_focus(id);
        }
        true
    }

    /// Schedule next-frame focus for auto-focus controls in a subtree that
    /// just became visible and enabled.
    fn queue_auto_focus(&mut self, id: ControlId) {
        if !self.is_visible(id) || !self.is_enabled(id) {
            return;
        }
        for descendant in self.descendants(id) {
            let wants_focus = self
                .control(descendant)
                .is_some_and(|c| c.auto_focus && c.is_visible && c.is_enabled);
            if wants_focus && self.can_focus(descendant) {
                self.ctx.jobs.push(descendant, JobType::Focus);
            }
        }
    }

    pub fn set_interactive(&mut self, id: ControlId, interactive: bool) -> bool {
        match self.control_mut(id) {
            Some(c) if c.is_interactive != interactive => c.is_interactive = interactive,
            _ => return false,
        }
        self.property_changed(id, Property::Interactive);
        self.invalidate(id);

        if !interactive && self.has_focus(id) {
            self.set_focus(None);
        }
        true
    }

    /// Set the control's own opacity, clamped to `0..=1`.
    pub fn set_opacity(&mut self, id: ControlId, opacity: f32) -> bool {
        let opacity = opacity.clamp(0.0, 1.0);
        match self.control_mut(id) {
            Some(c) if (c.opacity - opacity).abs() > f32::EPSILON => c.opacity = opacity,
            _ => return false,
        }
        self.property_changed(id, Property::Opacity);
        self.invalidate(id);
        self.cascade_to_descendants(id, Property::Opacity);
        true
    }

    pub fn set_color(&mut self, id: ControlId, color: Color) -> bool {
        match self.control_mut(id) {
            Some(c) if c.color != color => c.color = color,
            _ => return false,
        }
        self.property_changed(id, Property::Color);
        self.invalidate(id);
        self.cascade_to_descendants(id, Property::Color);
        true
    }

    pub fn set_can_focus(&mut self, id: ControlId, can_focus: bool) -> bool {
        match self.control_mut(id) {
            Some(c) if c.can_focus != can_focus => c.can_focus = can_focus,
            _ => return false,
        }
        if !can_focus && self.has_focus(id) {
            self.set_focus(None);
        }
        self.property_changed(id, Property::CanFocus);
        self.invalidate(id);
        true
    }

    pub fn set_tab_index(&mut self, id: ControlId, tab_index: i32) -> bool {
        match self.control_mut(id) {
            Some(c) if c.tab_index != tab_index => c.tab_index = tab_index,
            _ => return false,
        }
        self.property_changed(id, Property::TabIndex);
        self.invalidate(id);
        true
    }

    /// Auto-focus controls request focus one frame after they become
    /// visible and enabled.
    pub fn set_auto_focus(&mut self, id: ControlId, auto_focus: bool) -> bool {
        match self.control_mut(id) {
            Some(c) if c.auto_focus != auto_focus => c.auto_focus = auto_focus,
            _ => return false,
        }
        self.property_changed(id, Property::AutoFocus);
        self.invalidate(id);
        if auto_focus {
            self.queue_auto_focus(id);
        }
        true
    }

    pub fn set_clip_children(&mut self, id: ControlId, clip: bool) -> bool {
        match self.control_mut(id) {
            Some(c) if c.clip_children != clip => c.clip_children = clip,
            _ => return false,
        }
        self.property_changed(id, Property::ClipChildren);
        self.invalidate(id);
        true
    }

    /// Flag a control as a render group: invalidating anything inside it
    /// queues the group in [`UiContext::take_dirty_render_groups`].
    ///
    /// [`UiContext::take_dirty_render_groups`]: crate::context::UiContext::take_dirty_render_groups
    pub fn set_render_group(&mut self, id: ControlId, render_group: bool) -> bool {
        match self.control_mut(id) {
            Some(c) if c.render_group != render_group => c.render_group = render_group,
            _ => return false,
        }
        if !render_group {
            self.ctx.forget_group(id);
        }
        self.invalidate(id);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::UiConfig;
    use crate::widgets::{impl_behavior_any, WidgetBehavior};

    fn tree() -> Tree {
        Tree::with_config(UiConfig::new().screen_size(800.0, 600.0))
    }

    #[test]
    fn test_unchanged_value_does_not_bump_version() {
        let mut tree = tree();
        let id = tree.create_control("a");
        tree.set_opacity(id, 0.5);
        let version = tree.version(id);
        assert!(!tree.set_opacity(id, 0.5));
        assert_eq!(tree.version(id), version);
    }

    #[test]
    fn test_sub_pixel_resize_ignored() {
        let mut tree = tree();
        let id = tree.create_control("a");
        tree.set_size(id, Vec2::new(100.0, 100.0));
        assert!(!tree.set_size(id, Vec2::new(100.5, 100.5)));
        assert_eq!(tree.size(id), Vec2::new(100.0, 100.0));
    }

    /// Records the version a control had when its size hook ran.
    #[derive(Default)]
    struct SizeWatcher {
        seen: Option<u64>,
    }

    impl WidgetBehavior for SizeWatcher {
        fn on_property_changed(&mut self, tree: &mut Tree, id: ControlId, property: Property) {
            if property == Property::Size {
                self.seen = Some(tree.version(id));
            }
        }

        impl_behavior_any!();
    }

    #[test]
    fn test_resize_notifies_before_invalidating() {
        let mut tree = tree();
        let id = tree.create_control("a");
        tree.set_behavior(id, SizeWatcher::default()).unwrap();
        let before = tree.version(id);

        assert!(tree.set_size(id, Vec2::new(120.0, 40.0)));
        assert_eq!(tree.behavior::<SizeWatcher>(id).and_then(|w| w.seen), Some(before));
        assert!(tree.version(id) > before);
    }

    #[test]
    fn test_min_size_reclamps() {
        let mut tree = tree();
        let id = tree.create_control("a");
        tree.set_size(id, Vec2::new(10.0, 10.0));
        tree.set_min_size(id, Vec2::new(50.0, 20.0));
        assert_eq!(tree.size(id), Vec2::new(50.0, 20.0));
    }

    #[test]
    fn test_relative_position_round_trip_with_pivot() {
        let mut tree = tree();
        let id = tree.create_control("a");
        tree.set_size(id, Vec2::new(100.0, 40.0));
        tree.set_pivot(id, Pivot::MiddleCenter);
        tree.set_relative_position(id, Vec2::new(30.0, 70.0));
        assert!(tree.relative_position(id).approx_eq(Vec2::new(30.0, 70.0), 0.01));

        // Changing the pivot keeps the control in place.
        tree.set_pivot(id, Pivot::BottomRight);
        assert!(tree.relative_position(id).approx_eq(Vec2::new(30.0, 70.0), 0.01));
    }

    #[test]
    fn test_position_writes_through_to_host() {
        let mut tree = tree();
        let id = tree.create_control("a");
        tree.set_relative_position(id, Vec2::new(300.0, 150.0));
        let host = tree.control(id).and_then(|c| c.host).unwrap();
        let upp = tree.units_per_pixel();
        let world = tree.host().local_position(host);
        assert!((world.x - 300.0 * upp).abs() < 1e-5);
        assert!((world.y + 150.0 * upp).abs() < 1e-5);
    }

    #[test]
    fn test_color_change_notifies_descendants() {
        let mut tree = tree();
        let root = tree.create_control("root");
        let child = tree.create_child(root, "child").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        tree.listen(child, move |n| log.borrow_mut().push(n.clone()));

        let before = tree.version(child);
        tree.set_color(root, Color::BLACK);
        assert!(tree.version(child) > before);
        assert!(seen.borrow().contains(&Notification::PropertyChanged {
            id: child,
            property: Property::Color,
        }));
    }

    #[test]
    fn test_invalidate_ignored_during_shutdown() {
        let mut tree = tree();
        let id = tree.create_control("a");
        let version = tree.version(id);
        tree.ctx.begin_shutdown();
        tree.invalidate(id);
        assert_eq!(tree.version(id), version);
    }
}
