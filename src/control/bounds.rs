//! World-space geometry and hit-testing primitives.
//!
//! The input manager picks the target control; these queries only answer
//! whether and where a ray hits a given candidate.

use crate::geometry::{pixels_to_world, Plane, Ray, Rect, Vec2, Vec3};
use crate::tree::{ControlId, Tree};

impl Tree {
    /// Pivot position in host space: the sum of local positions up the chain.
    pub fn world_position(&self, id: ControlId) -> Vec3 {
        self.ancestry(id)
            .iter()
            .filter_map(|&c| self.control(c))
            .fold(Vec3::ZERO, |acc, c| acc + c.local_position)
    }

    /// Upper-left corner in host space.
    pub fn upper_left(&self, id: ControlId) -> Vec3 {
        let Some(control) = self.control(id) else {
            return Vec3::ZERO;
        };
        let offset = control.pivot.upper_left_offset(control.size);
        self.world_position(id) + pixels_to_world(offset, self.units_per_pixel())
    }

    /// Host-space corners: upper-left, upper-right, bottom-right, bottom-left.
    ///
    /// Cached until the control's version changes.
    pub fn corners(&self, id: ControlId) -> [Vec3; 4] {
        let Some(control) = self.control(id) else {
            return [Vec3::ZERO; 4];
        };
        if let Some((version, corners)) = control.cached_corners.get() {
            if version == control.version {
                return corners;
            }
        }
        let upp = self.units_per_pixel();
        let ul = self.upper_left(id);
        let size = control.size;
        let corners = [
            ul,
            ul + pixels_to_world(Vec2::new(size.x, 0.0), upp),
            ul + pixels_to_world(size, upp),
            ul + pixels_to_world(Vec2::new(0.0, size.y), upp),
        ];
        control.cached_corners.set(Some((control.version, corners)));
        corners
    }

    /// Bounds in screen pixels (upper-left origin, y-down).
    pub fn screen_rect(&self, id: ControlId) -> Rect {
        let origin = self
            .ancestry(id)
            .iter()
            .map(|&c| self.relative_position(c))
            .fold(Vec2::ZERO, |acc, p| acc + p);
        Rect::from_origin_size(origin, self.size(id))
    }

    /// Whether `ray` hits the control's rectangle and lies inside every
    /// clipping ancestor. Non-interactive controls are never hit.
    pub fn hit_test(&self, id: ControlId, ray: &Ray) -> bool {
        self.hit_position(id, ray).is_some()
    }

    /// Where `ray` hits the control, in pixels relative to its upper-left
    /// corner (y-down).
    pub fn hit_position(&self, id: ControlId, ray: &Ray) -> Option<Vec2> {
        if !self.control(id)?.is_interactive {
            return None;
        }
        let plane_z = self.world_position(id).z;
        let point = ray.intersect_z_plane(plane_z)?;
        let screen = self.world_to_screen(point);

        if !self.screen_rect(id).contains(screen) {
            return None;
        }
        let mut ancestor = self.parent(id);
        while let Some(a) = ancestor {
            if self.control(a).is_some_and(|c| c.clip_children)
                && !self.screen_rect(a).contains(screen)
            {
                return None;
            }
            ancestor = self.parent(a);
        }

        Some(screen - self.screen_rect(id).origin())
    }

    /// Host-space point to screen pixels. Top-level controls measure from
    /// the host origin, which sits at the screen's upper-left corner.
    fn world_to_screen(&self, point: Vec3) -> Vec2 {
        let upp = self.units_per_pixel();
        if upp <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(point.x / upp, -point.y / upp)
    }

    /// Inward-facing planes along the four edges of a clipping control.
    ///
    /// Empty if the control does not clip its children.
    pub fn clipping_planes(&self, id: ControlId) -> Vec<Plane> {
        if !self.control(id).is_some_and(|c| c.clip_children) {
            return Vec::new();
        }
        let [ul, ur, _, bl] = self.corners(id);
        vec![
            Plane::from_normal_and_point(Vec3::new(1.0, 0.0, 0.0), ul),
            Plane::from_normal_and_point(Vec3::new(-1.0, 0.0, 0.0), ur),
            Plane::from_normal_and_point(Vec3::new(0.0, -1.0, 0.0), ul),
            Plane::from_normal_and_point(Vec3::new(0.0, 1.0, 0.0), bl),
        ]
    }
}
