use log::trace;

use crate::control::Property;
use crate::geometry::{pixels_to_world, world_to_pixels, Vec2, Vec3};
use crate::layout::{arrange_position, arrange_size, snapshot, AnchorLayout, AnchorStyle, Margins};
use crate::tree::{ControlId, Tree};

impl Tree {
    /// Layout state of a control, if it has been created yet.
    pub fn anchor_layout(&self, id: ControlId) -> Option<&AnchorLayout> {
        self.control(id).and_then(|c| c.layout.as_ref())
    }

    pub fn margins(&self, id: ControlId) -> Option<Margins> {
        self.anchor_layout(id).and_then(|l| l.margins)
    }

    /// Number of layout passes a control has executed.
    pub fn layout_pass_count(&self, id: ControlId) -> u64 {
        self.anchor_layout(id).map_or(0, |l| l.layout_passes)
    }

    fn layout_mut(&mut self, id: ControlId) -> Option<&mut AnchorLayout> {
        self.control_mut(id)
            .map(|c| c.layout.get_or_insert_with(AnchorLayout::default))
    }

    pub fn set_anchor(&mut self, id: ControlId, anchor: AnchorStyle) -> bool {
        match self.control_mut(id) {
            Some(c) if c.anchor != anchor => c.anchor = anchor,
            _ => return false,
        }
        self.reset_layout(id, false);
        if anchor.has_center() {
            self.perform_layout(id);
        }
        self.property_changed(id, Property::Anchor);
        self.invalidate(id);
        true
    }

    /// Snapshot the control's current bounds into its margins.
    ///
    /// Unless forced, this refuses to run while a layout pass is in progress
    /// on the control, while its layout is suspended, or when it has no
    /// anchor.
    pub fn reset_layout(&mut self, id: ControlId, force: bool) {
        if self.ctx.is_shutting_down() {
            return;
        }
        let Some(control) = self.control(id) else {
            return;
        };
        let anchor = control.anchor;
        if !force {
            let busy = control
                .layout
                .as_ref()
                .is_some_and(|l| l.performing_layout || l.suspend_count > 0);
            if busy || anchor.is_empty() {
                return;
            }
        }
        let margins = snapshot(
            anchor,
            self.relative_position(id),
            self.size(id),
            self.parent_size(id),
        );
        if let Some(layout) = self.layout_mut(id) {
            layout.margins = Some(margins);
        }
    }

    /// Reapply the margins against the parent's current size: size first,
    /// then position from the resulting size.
    ///
    /// While suspended the request is remembered and replayed by
    /// [`Tree::resume_layout`].
    pub fn perform_layout(&mut self, id: ControlId) {
        if self.ctx.is_shutting_down() {
            return;
        }
        let anchor = self.anchor(id);
        if anchor.is_empty() {
            if let Some(layout) = self.control_mut(id).and_then(|c| c.layout.as_mut()) {
                layout.pending_layout = false;
            }
            return;
        }
        let Some(layout) = self.layout_mut(id) else {
            return;
        };
        if layout.performing_layout {
            return;
        }
        if layout.suspend_count > 0 {
            layout.pending_layout = true;
            return;
        }
        if layout.margins.is_none() {
            self.reset_layout(id, true);
        }

        let Some(layout) = self.layout_mut(id) else {
            return;
        };
        let Some(margins) = layout.margins else {
            return;
        };
        layout.performing_layout = true;
        layout.pending_layout = false;
        layout.layout_passes += 1;
        trace!("layout pass on {:?}", id);

        let round = anchor.is_proportional() && self.config().pixel_perfect;
        let parent = self.parent_size(id);

        let mut size = arrange_size(anchor, &margins, self.size(id), parent);
        if round {
            size = size.round();
        }
        self.set_size(id, size);

        let mut position =
            arrange_position(anchor, &margins, self.relative_position(id), self.size(id), parent);
        if round {
            position = position.round();
        }
        self.set_relative_position(id, position);

        if let Some(layout) = self.layout_mut(id) {
            layout.performing_layout = false;
        }
    }

    /// Defer layout on a control and its whole subtree. Calls nest.
    pub fn suspend_layout(&mut self, id: ControlId) {
        for control in self.descendants(id) {
            if let Some(layout) = self.layout_mut(control) {
                layout.suspend_count += 1;
            }
        }
    }

    /// Undo one [`Tree::suspend_layout`]. Controls whose suspension ends run
    /// one layout pass if any was requested meanwhile.
    pub fn resume_layout(&mut self, id: ControlId) {
        for control in self.descendants(id) {
            let run = match self.layout_mut(control) {
                Some(layout) if layout.suspend_count > 0 => {
                    layout.suspend_count -= 1;
                    layout.suspend_count == 0 && layout.pending_layout
                }
                _ => false,
            };
            if run {
                self.perform_layout(control);
            }
        }
    }

    /// Ask for a layout pass during the next late update.
    pub fn request_layout(&mut self, id: ControlId) {
        if let Some(layout) = self.layout_mut(id) {
            layout.pending_layout = true;
        }
    }

    /// Run every requested layout pass whose control is not suspended.
    pub(crate) fn flush_pending_layouts(&mut self) {
        for id in self.render_order() {
            let due = self
                .anchor_layout(id)
                .is_some_and(|l| l.pending_layout && l.suspend_count == 0);
            if due {
                self.perform_layout(id);
            }
        }
    }

    /// Resize the render surface. Host positions are rescaled so every
    /// control keeps its pixel placement, then top-level controls re-run
    /// their anchors against the new screen.
    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        let new_size = Vec2::new(width, height);
        if self.config().screen_size == new_size {
            return;
        }
        let old_upp = self.units_per_pixel();
        self.ctx.config_mut().screen_size = new_size;
        let new_upp = self.units_per_pixel();

        for id in self.render_order() {
            let Some(control) = self.control(id) else {
                continue;
            };
            let local = control.local_position;
            let host = control.host;
            let pixels = world_to_pixels(local, old_upp);
            let world = pixels_to_world(pixels, new_upp);
            let position = Vec3::new(world.x, world.y, local.z);
            if let Some(c) = self.control_mut(id) {
                c.local_position = position;
                c.clear_caches();
            }
            if let Some(host) = host {
                self.host.set_local_position(host, position);
            }
            self.invalidate(id);
        }

        for root in self.roots.clone() {
            self.perform_layout(root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::widgets::{impl_behavior_any, WidgetBehavior};

    /// Tries to re-run its own layout whenever it is resized.
    #[derive(Default)]
    struct Relayout {
        resizes: u32,
    }

    impl WidgetBehavior for Relayout {
        fn on_property_changed(&mut self, tree: &mut Tree, id: ControlId, property: Property) {
            if property == Property::Size {
                self.resizes += 1;
                tree.reset_layout(id, false);
                tree.perform_layout(id);
            }
        }

        impl_behavior_any!();
    }

    fn tree() -> Tree {
        Tree::with_config(UiConfig::new().screen_size(800.0, 600.0))
    }

    fn stretched_child(tree: &mut Tree) -> (ControlId, ControlId) {
        let parent = tree.create_control("parent");
        tree.set_size(parent, Vec2::new(400.0, 300.0));
        let child = tree.create_child(parent, "child").unwrap();
        tree.set_size(child, Vec2::new(380.0, 280.0));
        tree.set_relative_position(child, Vec2::new(10.0, 10.0));
        tree.set_anchor(child, AnchorStyle::ALL);
        (parent, child)
    }

    #[test]
    fn test_parent_resize_stretches_child() {
        let mut tree = tree();
        let (parent, child) = stretched_child(&mut tree);
        tree.set_size(parent, Vec2::new(500.0, 400.0));
        assert_eq!(tree.size(child), Vec2::new(480.0, 380.0));
        assert!(tree
            .relative_position(child)
            .approx_eq(Vec2::new(10.0, 10.0), 0.01));
    }

    #[test]
    fn test_nested_suspend_needs_matching_resume() {
        let mut tree = tree();
        let (parent, child) = stretched_child(&mut tree);
        let passes = tree.layout_pass_count(child);

        tree.suspend_layout(parent);
        tree.suspend_layout(parent);
        tree.set_size(parent, Vec2::new(600.0, 400.0));
        tree.resume_layout(parent);
        assert_eq!(tree.layout_pass_count(child), passes);
        assert_eq!(tree.size(child), Vec2::new(380.0, 280.0));

        tree.resume_layout(parent);
        assert_eq!(tree.layout_pass_count(child), passes + 1);
        assert_eq!(tree.size(child), Vec2::new(580.0, 380.0));
    }

    #[test]
    fn test_center_anchor_recenters_on_resize() {
        let mut tree = tree();
        let parent = tree.create_control("parent");
        tree.set_size(parent, Vec2::new(400.0, 300.0));
        let child = tree.create_child(parent, "child").unwrap();
        tree.set_size(child, Vec2::new(100.0, 100.0));
        tree.set_anchor(child, AnchorStyle::CENTER);
        assert!(tree
            .relative_position(child)
            .approx_eq(Vec2::new(150.0, 100.0), 0.01));

        tree.set_size(child, Vec2::new(200.0, 100.0));
        assert!(tree
            .relative_position(child)
            .approx_eq(Vec2::new(100.0, 100.0), 0.01));
    }

    #[test]
    fn test_pixel_perfect_rounds_proportional_layout() {
        let mut tree = Tree::with_config(UiConfig::new().screen_size(800.0, 600.0).pixel_perfect(true));
        let parent = tree.create_control("parent");
        tree.set_size(parent, Vec2::new(300.0, 300.0));
        let child = tree.create_child(parent, "child").unwrap();
        tree.set_size(child, Vec2::new(100.0, 100.0));
        tree.set_relative_position(child, Vec2::new(100.0, 100.0));
        tree.set_anchor(child, AnchorStyle::ALL | AnchorStyle::PROPORTIONAL);

        tree.set_size(parent, Vec2::new(310.0, 310.0));
        let pos = tree.relative_position(child);
        assert!((pos.x - pos.x.round()).abs() < 0.01);
        assert_eq!(tree.size(child), tree.size(child).round());
    }

    #[test]
    fn test_screen_resize_relayouts_roots() {
        let mut tree = tree();
        let root = tree.create_control("root");
        tree.set_size(root, Vec2::new(800.0, 600.0));
        tree.set_anchor(root, AnchorStyle::ALL);

        tree.set_screen_size(1024.0, 768.0);
        assert_eq!(tree.size(root), Vec2::new(1024.0, 768.0));
        assert!(tree.relative_position(root).approx_eq(Vec2::ZERO, 0.01));
    }

    #[test]
    fn test_screen_resize_keeps_pixel_placement() {
        let mut tree = tree();
        let a = tree.create_control("a");
        tree.set_relative_position(a, Vec2::new(120.0, 90.0));
        tree.set_screen_size(1024.0, 768.0);
        assert!(tree
            .relative_position(a)
            .approx_eq(Vec2::new(120.0, 90.0), 0.01));
    }

    #[test]
    fn test_layout_pass_is_not_reentrant() {
        let mut tree = tree();
        let (parent, child) = stretched_child(&mut tree);
        tree.set_behavior(child, Relayout::default()).unwrap();
        let margins = tree.margins(child);
        let passes = tree.layout_pass_count(child);

        tree.set_size(parent, Vec2::new(500.0, 400.0));
        assert_eq!(tree.behavior::<Relayout>(child).map(|r| r.resizes), Some(1));
        assert_eq!(tree.layout_pass_count(child), passes + 1);
        assert_eq!(tree.margins(child), margins);
        assert_eq!(tree.size(child), Vec2::new(480.0, 380.0));
    }

    #[test]
    fn test_unanchored_request_is_dropped() {
        let mut tree = tree();
        let id = tree.create_control("free");
        tree.request_layout(id);
        tree.flush_pending_layouts();
        assert!(tree.anchor_layout(id).is_some_and(|l| !l.pending_layout));
        assert_eq!(tree.layout_pass_count(id), 0);
    }
}
