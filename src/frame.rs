//! Per-frame ticks.
//!
//! The host calls [`Tree::update`] early in the frame and
//! [`Tree::late_update`] once everything has moved. Update reconciles each
//! control against the host; late update flushes deferred layout and runs
//! the work queued for this frame (auto-focus).

use log::{debug, error, warn};

use crate::geometry::Vec3;
use crate::jobs::JobType;
use crate::tree::{ControlId, Tree};

impl Tree {
    /// Early phase: make work queued last frame due, drop controls whose
    /// host object died, then reconcile every control's children and
    /// position against the host.
    ///
    /// One control failing does not stop the others from updating.
    pub fn update(&mut self) {
        if self.ctx.is_shutting_down() {
            return;
        }
        self.ctx.jobs.promote();
        self.teardown_dead_hosts();

        for id in self.render_order() {
            if !self.contains(id) {
                continue;
            }
            if let Err(err) = self.update_control_hierarchy(id) {
                error!("hierarchy update failed for {:?}: {}", id, err);
                continue;
            }
            self.sync_host_position(id);
        }
    }

    /// Pick up a position the host changed directly.
    fn sync_host_position(&mut self, id: ControlId) {
        let Some(control) = self.control(id) else {
            return;
        };
        let Some(host) = control.host else {
            return;
        };
        let live = self.host.local_position(host);
        let moved: Vec3 = live - control.local_position;
        if moved.length_squared() <= f32::EPSILON * f32::EPSILON {
            return;
        }
        if let Some(c) = self.control_mut(id) {
            c.local_position = live;
        }
        self.on_position_changed(id);
        for child in self.children(id).to_vec() {
            self.request_layout(child);
        }
    }

    /// Late phase: run pending layout passes, then the jobs due this frame.
    pub fn late_update(&mut self) {
        if self.ctx.is_shutting_down() {
            return;
        }
        self.flush_pending_layouts();

        for job in self.ctx.jobs.take_ready() {
            match job.job_type {
                JobType::Focus => {
                    if !self.contains(job.control) {
                        warn!("deferred focus for destroyed control {:?}", job.control);
                        continue;
                    }
                    debug!("deferred focus for {:?}", job.control);
                    self.focus(job.control);
                }
            }
        }
    }

    /// Run both phases.
    pub fn tick(&mut self) {
        self.update();
        self.late_update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;

    #[test]
    fn test_auto_focus_waits_one_frame() {
        let mut tree = Tree::new();
        let id = tree.create_control("field");
        tree.set_can_focus(id, true);
        tree.set_visible(id, false);
        tree.set_auto_focus(id, true);

        tree.set_visible(id, true);
        assert!(!tree.has_focus(id));

        // Queued this frame, promoted by the next update.
        tree.late_update();
        assert!(!tree.has_focus(id));
        tree.tick();
        assert!(tree.has_focus(id));
    }

    #[test]
    fn test_auto_focus_dropped_for_destroyed_control() {
        let mut tree = Tree::new();
        let id = tree.create_control("field");
        tree.set_can_focus(id, true);
        tree.set_auto_focus(id, true);
        tree.destroy(id);
        tree.tick();
        tree.tick();
        assert_eq!(tree.focused_control(), None);
    }

    #[test]
    fn test_external_move_picked_up() {
        let mut tree = Tree::new();
        let parent = tree.create_control("parent");
        tree.set_size(parent, Vec2::new(100.0, 100.0));
        let host = tree.control(parent).and_then(|c| c.host).unwrap();
        let upp = tree.units_per_pixel();
        let version = tree.version(parent);

        tree.host_mut()
            .set_local_position(host, Vec3::new(40.0 * upp, -30.0 * upp, 0.0));
        tree.update();
        assert!(tree.version(parent) > version);
        assert!(tree
            .relative_position(parent)
            .approx_eq(Vec2::new(40.0, 30.0), 0.01));
    }

    #[test]
    fn test_update_tears_down_dead_hosts() {
        let mut tree = Tree::new();
        let id = tree.create_control("a");
        let host = tree.control(id).and_then(|c| c.host).unwrap();
        tree.host_mut().destroy(host);
        tree.update();
        assert!(!tree.contains(id));
    }

    #[test]
    fn test_quiet_frame_does_not_bump_versions() {
        let mut tree = Tree::new();
        let root = tree.create_control("root");
        let child = tree.create_child(root, "child").unwrap();
        tree.tick();
        let versions = (tree.version(root), tree.version(child));
        tree.tick();
        assert_eq!((tree.version(root), tree.version(child)), versions);
    }
}
